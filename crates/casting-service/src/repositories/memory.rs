//! In-memory entity store.
//!
//! Used when no database is configured and by tests. Ids are assigned
//! sequentially from 1 and never reused.

use super::{CastOutcome, EntityStore};
use crate::errors::ApiError;
use crate::models::{Actor, ActorPatch, Movie, MoviePatch, NewActor, NewMovie};
use std::collections::{BTreeMap, BTreeSet};
use tokio::sync::RwLock;

#[derive(Default)]
struct Tables {
    movies: BTreeMap<i64, Movie>,
    actors: BTreeMap<i64, Actor>,
    /// `(movie_id, actor_id)` pairs.
    cast: BTreeSet<(i64, i64)>,
    last_movie_id: i64,
    last_actor_id: i64,
}

/// Entity store held entirely in process memory.
#[derive(Default)]
pub struct MemoryEntityStore {
    tables: RwLock<Tables>,
}

impl MemoryEntityStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl EntityStore for MemoryEntityStore {
    async fn ping(&self) -> Result<(), ApiError> {
        Ok(())
    }

    async fn list_movies(&self) -> Result<Vec<Movie>, ApiError> {
        Ok(self.tables.read().await.movies.values().cloned().collect())
    }

    async fn get_movie(&self, id: i64) -> Result<Option<Movie>, ApiError> {
        Ok(self.tables.read().await.movies.get(&id).cloned())
    }

    async fn create_movie(&self, movie: NewMovie) -> Result<Movie, ApiError> {
        let mut tables = self.tables.write().await;
        tables.last_movie_id += 1;

        let movie = Movie {
            id: tables.last_movie_id,
            title: movie.title,
            release_date: movie.release_date,
        };
        tables.movies.insert(movie.id, movie.clone());
        Ok(movie)
    }

    async fn update_movie(&self, id: i64, patch: MoviePatch) -> Result<Option<Movie>, ApiError> {
        let mut tables = self.tables.write().await;
        let Some(movie) = tables.movies.get_mut(&id) else {
            return Ok(None);
        };

        if let Some(title) = patch.title {
            movie.title = title;
        }
        if let Some(release_date) = patch.release_date {
            movie.release_date = Some(release_date);
        }
        Ok(Some(movie.clone()))
    }

    async fn delete_movie(&self, id: i64) -> Result<bool, ApiError> {
        let mut tables = self.tables.write().await;
        if tables.movies.remove(&id).is_none() {
            return Ok(false);
        }
        tables.cast.retain(|(movie_id, _)| *movie_id != id);
        Ok(true)
    }

    async fn movie_actors(&self, movie_id: i64) -> Result<Option<Vec<Actor>>, ApiError> {
        let tables = self.tables.read().await;
        if !tables.movies.contains_key(&movie_id) {
            return Ok(None);
        }

        let actors = tables
            .cast
            .range((movie_id, i64::MIN)..=(movie_id, i64::MAX))
            .filter_map(|(_, actor_id)| tables.actors.get(actor_id).cloned())
            .collect();
        Ok(Some(actors))
    }

    async fn cast_actor(&self, movie_id: i64, actor_id: i64) -> Result<CastOutcome, ApiError> {
        let mut tables = self.tables.write().await;
        if !tables.movies.contains_key(&movie_id) {
            return Ok(CastOutcome::MovieNotFound);
        }
        if !tables.actors.contains_key(&actor_id) {
            return Ok(CastOutcome::ActorNotFound);
        }
        tables.cast.insert((movie_id, actor_id));
        Ok(CastOutcome::Cast)
    }

    async fn list_actors(&self) -> Result<Vec<Actor>, ApiError> {
        Ok(self.tables.read().await.actors.values().cloned().collect())
    }

    async fn get_actor(&self, id: i64) -> Result<Option<Actor>, ApiError> {
        Ok(self.tables.read().await.actors.get(&id).cloned())
    }

    async fn create_actor(&self, actor: NewActor) -> Result<Actor, ApiError> {
        let mut tables = self.tables.write().await;
        tables.last_actor_id += 1;

        let actor = Actor {
            id: tables.last_actor_id,
            name: actor.name,
            age: actor.age,
            gender: actor.gender,
        };
        tables.actors.insert(actor.id, actor.clone());
        Ok(actor)
    }

    async fn update_actor(&self, id: i64, patch: ActorPatch) -> Result<Option<Actor>, ApiError> {
        let mut tables = self.tables.write().await;
        let Some(actor) = tables.actors.get_mut(&id) else {
            return Ok(None);
        };

        if let Some(name) = patch.name {
            actor.name = name;
        }
        if let Some(age) = patch.age {
            actor.age = age;
        }
        if let Some(gender) = patch.gender {
            actor.gender = gender;
        }
        Ok(Some(actor.clone()))
    }

    async fn delete_actor(&self, id: i64) -> Result<bool, ApiError> {
        let mut tables = self.tables.write().await;
        if tables.actors.remove(&id).is_none() {
            return Ok(false);
        }
        tables.cast.retain(|(_, actor_id)| *actor_id != id);
        Ok(true)
    }
}
