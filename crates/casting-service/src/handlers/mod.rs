//! HTTP request handlers for the casting service.

pub mod actors;
pub mod health;
pub mod metrics;
pub mod movies;

pub use actors::{create_actor, delete_actor, get_actor, list_actors, update_actor};
pub use health::health_check;
pub use metrics::metrics_handler;
pub use movies::{
    cast_actor, create_movie, delete_movie, get_movie, list_movie_actors, list_movies,
    update_movie,
};

use crate::errors::ApiError;
use serde::de::DeserializeOwned;

/// Parse a JSON request body.
///
/// Any body that is not valid JSON for `T` is `InvalidRequestBody` (422),
/// regardless of content type.
pub(crate) fn parse_body<T: DeserializeOwned>(body: &[u8]) -> Result<T, ApiError> {
    if body.is_empty() {
        return Err(ApiError::InvalidRequestBody(
            "Request body is required".to_string(),
        ));
    }

    serde_json::from_slice(body).map_err(|e| {
        tracing::debug!(target: "casting.handlers", error = %e, "Request body rejected");
        ApiError::InvalidRequestBody(format!("Request body is invalid: {e}"))
    })
}
