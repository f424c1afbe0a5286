//! Actor handlers.

use crate::errors::ApiError;
use crate::handlers::parse_body;
use crate::models::{ActorPatch, ActorResponse, ActorsResponse, DeletedResponse, NewActor};
use crate::routes::AppState;
use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use tracing::instrument;

fn actor_not_found(id: i64) -> ApiError {
    ApiError::NotFound(format!("Actor {id} not found"))
}

/// GET /actors
#[instrument(skip_all, name = "casting.handlers.list_actors")]
pub async fn list_actors(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ActorsResponse>, ApiError> {
    let actors = state.store.list_actors().await?;

    Ok(Json(ActorsResponse {
        success: true,
        actors,
    }))
}

/// GET /actors/:id
#[instrument(skip_all, name = "casting.handlers.get_actor", fields(actor_id = id))]
pub async fn get_actor(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<ActorResponse>, ApiError> {
    let actor = state
        .store
        .get_actor(id)
        .await?
        .ok_or_else(|| actor_not_found(id))?;

    Ok(Json(ActorResponse {
        success: true,
        actor,
    }))
}

/// POST /actors
///
/// Requires `create:actor`. Responds 201 with the stored actor.
#[instrument(skip_all, name = "casting.handlers.create_actor")]
pub async fn create_actor(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<(StatusCode, Json<ActorResponse>), ApiError> {
    let new_actor: NewActor = parse_body(&body)?;
    new_actor.validate().map_err(ApiError::InvalidRequestBody)?;

    let actor = state.store.create_actor(new_actor).await?;
    tracing::info!(target: "casting.handlers.actors", actor_id = actor.id, "Actor created");

    Ok((
        StatusCode::CREATED,
        Json(ActorResponse {
            success: true,
            actor,
        }),
    ))
}

/// PATCH /actors/:id
#[instrument(skip_all, name = "casting.handlers.update_actor", fields(actor_id = id))]
pub async fn update_actor(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    body: Bytes,
) -> Result<Json<ActorResponse>, ApiError> {
    let patch: ActorPatch = parse_body(&body)?;
    patch.validate().map_err(ApiError::InvalidRequestBody)?;

    let actor = state
        .store
        .update_actor(id, patch)
        .await?
        .ok_or_else(|| actor_not_found(id))?;
    tracing::info!(target: "casting.handlers.actors", actor_id = id, "Actor updated");

    Ok(Json(ActorResponse {
        success: true,
        actor,
    }))
}

/// DELETE /actors/:id
///
/// Also removes the actor from every movie's cast.
#[instrument(skip_all, name = "casting.handlers.delete_actor", fields(actor_id = id))]
pub async fn delete_actor(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<DeletedResponse>, ApiError> {
    if !state.store.delete_actor(id).await? {
        return Err(actor_not_found(id));
    }
    tracing::info!(target: "casting.handlers.actors", actor_id = id, "Actor deleted");

    Ok(Json(DeletedResponse {
        success: true,
        deleted: id,
    }))
}
