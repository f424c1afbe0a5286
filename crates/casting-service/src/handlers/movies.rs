//! Movie handlers.
//!
//! Authorization is applied by the route layer; handlers only see requests
//! that already passed the gate.

use crate::errors::ApiError;
use crate::handlers::parse_body;
use crate::models::{
    ActorsResponse, DeletedResponse, MoviePatch, MovieResponse, MoviesResponse, NewMovie,
};
use crate::repositories::CastOutcome;
use crate::routes::AppState;
use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use tracing::instrument;

fn movie_not_found(id: i64) -> ApiError {
    ApiError::NotFound(format!("Movie {id} not found"))
}

/// GET /movies
#[instrument(skip_all, name = "casting.handlers.list_movies")]
pub async fn list_movies(
    State(state): State<Arc<AppState>>,
) -> Result<Json<MoviesResponse>, ApiError> {
    let movies = state.store.list_movies().await?;

    Ok(Json(MoviesResponse {
        success: true,
        movies,
    }))
}

/// GET /movies/:id
#[instrument(skip_all, name = "casting.handlers.get_movie", fields(movie_id = id))]
pub async fn get_movie(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<MovieResponse>, ApiError> {
    let movie = state
        .store
        .get_movie(id)
        .await?
        .ok_or_else(|| movie_not_found(id))?;

    Ok(Json(MovieResponse {
        success: true,
        movie,
    }))
}

/// POST /movies
///
/// Requires `create:movie`. Responds 201 with the stored movie.
#[instrument(skip_all, name = "casting.handlers.create_movie")]
pub async fn create_movie(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<(StatusCode, Json<MovieResponse>), ApiError> {
    let new_movie: NewMovie = parse_body(&body)?;
    new_movie.validate().map_err(ApiError::InvalidRequestBody)?;

    let movie = state.store.create_movie(new_movie).await?;
    tracing::info!(target: "casting.handlers.movies", movie_id = movie.id, "Movie created");

    Ok((
        StatusCode::CREATED,
        Json(MovieResponse {
            success: true,
            movie,
        }),
    ))
}

/// PATCH /movies/:id
#[instrument(skip_all, name = "casting.handlers.update_movie", fields(movie_id = id))]
pub async fn update_movie(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    body: Bytes,
) -> Result<Json<MovieResponse>, ApiError> {
    let patch: MoviePatch = parse_body(&body)?;
    patch.validate().map_err(ApiError::InvalidRequestBody)?;

    let movie = state
        .store
        .update_movie(id, patch)
        .await?
        .ok_or_else(|| movie_not_found(id))?;
    tracing::info!(target: "casting.handlers.movies", movie_id = id, "Movie updated");

    Ok(Json(MovieResponse {
        success: true,
        movie,
    }))
}

/// DELETE /movies/:id
#[instrument(skip_all, name = "casting.handlers.delete_movie", fields(movie_id = id))]
pub async fn delete_movie(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<DeletedResponse>, ApiError> {
    if !state.store.delete_movie(id).await? {
        return Err(movie_not_found(id));
    }
    tracing::info!(target: "casting.handlers.movies", movie_id = id, "Movie deleted");

    Ok(Json(DeletedResponse {
        success: true,
        deleted: id,
    }))
}

/// GET /movies/:id/actors
#[instrument(skip_all, name = "casting.handlers.list_movie_actors", fields(movie_id = id))]
pub async fn list_movie_actors(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<ActorsResponse>, ApiError> {
    let actors = state
        .store
        .movie_actors(id)
        .await?
        .ok_or_else(|| movie_not_found(id))?;

    Ok(Json(ActorsResponse {
        success: true,
        actors,
    }))
}

/// PUT /movies/:id/actors/:actor_id
///
/// Requires `update:movie`. Idempotent; responds with the movie's cast.
#[instrument(skip_all, name = "casting.handlers.cast_actor", fields(movie_id = id, actor_id = actor_id))]
pub async fn cast_actor(
    State(state): State<Arc<AppState>>,
    Path((id, actor_id)): Path<(i64, i64)>,
) -> Result<Json<ActorsResponse>, ApiError> {
    match state.store.cast_actor(id, actor_id).await? {
        CastOutcome::Cast => {}
        CastOutcome::MovieNotFound => return Err(movie_not_found(id)),
        CastOutcome::ActorNotFound => {
            return Err(ApiError::NotFound(format!("Actor {actor_id} not found")))
        }
    }
    tracing::info!(target: "casting.handlers.movies", movie_id = id, actor_id, "Actor cast");

    let actors = state
        .store
        .movie_actors(id)
        .await?
        .ok_or_else(|| movie_not_found(id))?;

    Ok(Json(ActorsResponse {
        success: true,
        actors,
    }))
}
