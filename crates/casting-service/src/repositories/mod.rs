//! Entity storage for movies, actors, and casting.
//!
//! Handlers only see the [`EntityStore`] trait. `main` picks the
//! implementation: [`PgEntityStore`] when a database URL is configured,
//! [`MemoryEntityStore`] otherwise.

pub mod memory;
pub mod postgres;

pub use memory::MemoryEntityStore;
pub use postgres::PgEntityStore;

use crate::errors::ApiError;
use crate::models::{Actor, ActorPatch, Movie, MoviePatch, NewActor, NewMovie};

/// Result of casting an actor in a movie.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CastOutcome {
    /// The association exists now (it may have existed before).
    Cast,
    MovieNotFound,
    ActorNotFound,
}

/// Storage operations behind the protected endpoints.
///
/// Lookups of a missing id return `None` (or `false` for deletes); errors are
/// reserved for storage failures.
#[async_trait::async_trait]
pub trait EntityStore: Send + Sync {
    /// Verify the backing store is reachable.
    async fn ping(&self) -> Result<(), ApiError>;

    async fn list_movies(&self) -> Result<Vec<Movie>, ApiError>;

    async fn get_movie(&self, id: i64) -> Result<Option<Movie>, ApiError>;

    async fn create_movie(&self, movie: NewMovie) -> Result<Movie, ApiError>;

    async fn update_movie(&self, id: i64, patch: MoviePatch) -> Result<Option<Movie>, ApiError>;

    /// Delete a movie and its cast associations.
    async fn delete_movie(&self, id: i64) -> Result<bool, ApiError>;

    /// Actors cast in a movie, or `None` if the movie does not exist.
    async fn movie_actors(&self, movie_id: i64) -> Result<Option<Vec<Actor>>, ApiError>;

    /// Cast an actor in a movie. Idempotent.
    async fn cast_actor(&self, movie_id: i64, actor_id: i64) -> Result<CastOutcome, ApiError>;

    async fn list_actors(&self) -> Result<Vec<Actor>, ApiError>;

    async fn get_actor(&self, id: i64) -> Result<Option<Actor>, ApiError>;

    async fn create_actor(&self, actor: NewActor) -> Result<Actor, ApiError>;

    async fn update_actor(&self, id: i64, patch: ActorPatch) -> Result<Option<Actor>, ApiError>;

    /// Delete an actor and its cast associations.
    async fn delete_actor(&self, id: i64) -> Result<bool, ApiError>;
}
