//! Casting service models.
//!
//! Entities, request bodies, and response envelopes. Success responses carry
//! `"success": true` next to the payload.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Upper bound accepted for an actor's age.
pub const MAX_ACTOR_AGE: i32 = 150;

/// Upper bound on title, name, and gender lengths (matches the column widths).
pub const MAX_TEXT_LENGTH: usize = 120;

// ============================================================================
// Entities
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Movie {
    pub id: i64,
    pub title: String,
    /// Calendar date, serialized as `YYYY-MM-DD`.
    pub release_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub id: i64,
    pub name: String,
    pub age: i32,
    pub gender: String,
}

// ============================================================================
// Request bodies
// ============================================================================

/// Body of `POST /movies`.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewMovie {
    pub title: String,
    #[serde(default)]
    pub release_date: Option<NaiveDate>,
}

/// Body of `PATCH /movies/:id`. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MoviePatch {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub release_date: Option<NaiveDate>,
}

/// Body of `POST /actors`.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewActor {
    pub name: String,
    pub age: i32,
    pub gender: String,
}

/// Body of `PATCH /actors/:id`. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ActorPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub age: Option<i32>,
    #[serde(default)]
    pub gender: Option<String>,
}

fn check_text(field: &str, value: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err(format!("{field} must not be empty"));
    }
    if value.chars().count() > MAX_TEXT_LENGTH {
        return Err(format!(
            "{field} must be at most {MAX_TEXT_LENGTH} characters"
        ));
    }
    Ok(())
}

fn check_age(age: i32) -> Result<(), String> {
    if !(0..=MAX_ACTOR_AGE).contains(&age) {
        return Err(format!("age must be between 0 and {MAX_ACTOR_AGE}"));
    }
    Ok(())
}

impl NewMovie {
    /// Check field contents after deserialization.
    pub fn validate(&self) -> Result<(), String> {
        check_text("title", &self.title)
    }
}

impl MoviePatch {
    pub fn validate(&self) -> Result<(), String> {
        if self.title.is_none() && self.release_date.is_none() {
            return Err("at least one field must be provided".to_string());
        }
        if let Some(title) = &self.title {
            check_text("title", title)?;
        }
        Ok(())
    }
}

impl NewActor {
    pub fn validate(&self) -> Result<(), String> {
        check_text("name", &self.name)?;
        check_age(self.age)?;
        check_text("gender", &self.gender)
    }
}

impl ActorPatch {
    pub fn validate(&self) -> Result<(), String> {
        if self.name.is_none() && self.age.is_none() && self.gender.is_none() {
            return Err("at least one field must be provided".to_string());
        }
        if let Some(name) = &self.name {
            check_text("name", name)?;
        }
        if let Some(age) = self.age {
            check_age(age)?;
        }
        if let Some(gender) = &self.gender {
            check_text("gender", gender)?;
        }
        Ok(())
    }
}

// ============================================================================
// Responses
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoviesResponse {
    pub success: bool,
    pub movies: Vec<Movie>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MovieResponse {
    pub success: bool,
    pub movie: Movie,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActorsResponse {
    pub success: bool,
    pub actors: Vec<Actor>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActorResponse {
    pub success: bool,
    pub actor: Actor,
}

/// Returned by every `DELETE`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeletedResponse {
    pub success: bool,
    pub deleted: i64,
}

/// Health check response.
///
/// Returned by the `/health` endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Service health status ("healthy" or "unhealthy").
    pub status: String,

    /// Entity store status ("healthy" or "unhealthy").
    pub store: String,
}
