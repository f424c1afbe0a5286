//! PostgreSQL entity store.
//!
//! # Security
//!
//! - All queries use parameterized statements (SQL injection safe)
//! - Row contents are not logged

use super::{CastOutcome, EntityStore};
use crate::errors::ApiError;
use crate::models::{Actor, ActorPatch, Movie, MoviePatch, NewActor, NewMovie};
use chrono::NaiveDate;
use sqlx::PgPool;
use tracing::instrument;

/// Entity store backed by the `movies`, `actors`, and `movies_actors` tables.
#[derive(Clone)]
pub struct PgEntityStore {
    pool: PgPool,
}

impl PgEntityStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Apply pending migrations from the workspace `migrations/` directory.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Database` if a migration fails.
    pub async fn migrate(&self) -> Result<(), ApiError> {
        sqlx::migrate!("../../migrations")
            .run(&self.pool)
            .await
            .map_err(|e| ApiError::Database(e.to_string()))
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait::async_trait]
impl EntityStore for PgEntityStore {
    async fn ping(&self) -> Result<(), ApiError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    #[instrument(skip_all)]
    async fn list_movies(&self) -> Result<Vec<Movie>, ApiError> {
        let rows: Vec<MovieRow> =
            sqlx::query_as("SELECT id, title, release_date FROM movies ORDER BY id")
                .fetch_all(&self.pool)
                .await?;

        Ok(rows.into_iter().map(Movie::from).collect())
    }

    #[instrument(skip_all, fields(movie_id = id))]
    async fn get_movie(&self, id: i64) -> Result<Option<Movie>, ApiError> {
        let row: Option<MovieRow> =
            sqlx::query_as("SELECT id, title, release_date FROM movies WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(row.map(Movie::from))
    }

    #[instrument(skip_all)]
    async fn create_movie(&self, movie: NewMovie) -> Result<Movie, ApiError> {
        let row: MovieRow = sqlx::query_as(
            r#"
            INSERT INTO movies (title, release_date)
            VALUES ($1, $2)
            RETURNING id, title, release_date
            "#,
        )
        .bind(movie.title)
        .bind(movie.release_date)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!(target: "casting.repositories.movies", movie_id = row.id, "Movie created");
        Ok(row.into())
    }

    #[instrument(skip_all, fields(movie_id = id))]
    async fn update_movie(&self, id: i64, patch: MoviePatch) -> Result<Option<Movie>, ApiError> {
        let row: Option<MovieRow> = sqlx::query_as(
            r#"
            UPDATE movies
            SET title = COALESCE($2, title),
                release_date = COALESCE($3, release_date)
            WHERE id = $1
            RETURNING id, title, release_date
            "#,
        )
        .bind(id)
        .bind(patch.title)
        .bind(patch.release_date)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Movie::from))
    }

    #[instrument(skip_all, fields(movie_id = id))]
    async fn delete_movie(&self, id: i64) -> Result<bool, ApiError> {
        // movies_actors rows go with it (ON DELETE CASCADE)
        let result = sqlx::query("DELETE FROM movies WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip_all, fields(movie_id = movie_id))]
    async fn movie_actors(&self, movie_id: i64) -> Result<Option<Vec<Actor>>, ApiError> {
        if !exists(&self.pool, "SELECT EXISTS (SELECT 1 FROM movies WHERE id = $1)", movie_id)
            .await?
        {
            return Ok(None);
        }

        let rows: Vec<ActorRow> = sqlx::query_as(
            r#"
            SELECT a.id, a.name, a.age, a.gender
            FROM actors a
            JOIN movies_actors ma ON ma.actor_id = a.id
            WHERE ma.movie_id = $1
            ORDER BY a.id
            "#,
        )
        .bind(movie_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(Some(rows.into_iter().map(Actor::from).collect()))
    }

    #[instrument(skip_all, fields(movie_id = movie_id, actor_id = actor_id))]
    async fn cast_actor(&self, movie_id: i64, actor_id: i64) -> Result<CastOutcome, ApiError> {
        if !exists(&self.pool, "SELECT EXISTS (SELECT 1 FROM movies WHERE id = $1)", movie_id)
            .await?
        {
            return Ok(CastOutcome::MovieNotFound);
        }
        if !exists(&self.pool, "SELECT EXISTS (SELECT 1 FROM actors WHERE id = $1)", actor_id)
            .await?
        {
            return Ok(CastOutcome::ActorNotFound);
        }

        sqlx::query(
            r#"
            INSERT INTO movies_actors (movie_id, actor_id)
            VALUES ($1, $2)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(movie_id)
        .bind(actor_id)
        .execute(&self.pool)
        .await?;

        Ok(CastOutcome::Cast)
    }

    #[instrument(skip_all)]
    async fn list_actors(&self) -> Result<Vec<Actor>, ApiError> {
        let rows: Vec<ActorRow> =
            sqlx::query_as("SELECT id, name, age, gender FROM actors ORDER BY id")
                .fetch_all(&self.pool)
                .await?;

        Ok(rows.into_iter().map(Actor::from).collect())
    }

    #[instrument(skip_all, fields(actor_id = id))]
    async fn get_actor(&self, id: i64) -> Result<Option<Actor>, ApiError> {
        let row: Option<ActorRow> =
            sqlx::query_as("SELECT id, name, age, gender FROM actors WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(row.map(Actor::from))
    }

    #[instrument(skip_all)]
    async fn create_actor(&self, actor: NewActor) -> Result<Actor, ApiError> {
        let row: ActorRow = sqlx::query_as(
            r#"
            INSERT INTO actors (name, age, gender)
            VALUES ($1, $2, $3)
            RETURNING id, name, age, gender
            "#,
        )
        .bind(actor.name)
        .bind(actor.age)
        .bind(actor.gender)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!(target: "casting.repositories.actors", actor_id = row.id, "Actor created");
        Ok(row.into())
    }

    #[instrument(skip_all, fields(actor_id = id))]
    async fn update_actor(&self, id: i64, patch: ActorPatch) -> Result<Option<Actor>, ApiError> {
        let row: Option<ActorRow> = sqlx::query_as(
            r#"
            UPDATE actors
            SET name = COALESCE($2, name),
                age = COALESCE($3, age),
                gender = COALESCE($4, gender)
            WHERE id = $1
            RETURNING id, name, age, gender
            "#,
        )
        .bind(id)
        .bind(patch.name)
        .bind(patch.age)
        .bind(patch.gender)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Actor::from))
    }

    #[instrument(skip_all, fields(actor_id = id))]
    async fn delete_actor(&self, id: i64) -> Result<bool, ApiError> {
        let result = sqlx::query("DELETE FROM actors WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

async fn exists(pool: &PgPool, query: &str, id: i64) -> Result<bool, ApiError> {
    let (found,): (bool,) = sqlx::query_as(query).bind(id).fetch_one(pool).await?;
    Ok(found)
}

#[derive(sqlx::FromRow)]
struct MovieRow {
    id: i64,
    title: String,
    release_date: Option<NaiveDate>,
}

impl From<MovieRow> for Movie {
    fn from(row: MovieRow) -> Self {
        Movie {
            id: row.id,
            title: row.title,
            release_date: row.release_date,
        }
    }
}

#[derive(sqlx::FromRow)]
struct ActorRow {
    id: i64,
    name: String,
    age: i32,
    gender: String,
}

impl From<ActorRow> for Actor {
    fn from(row: ActorRow) -> Self {
        Actor {
            id: row.id,
            name: row.name,
            age: row.age,
            gender: row.gender,
        }
    }
}
