//! Movies and actors API integration tests.
//!
//! Runs the full router over the in-memory store, with tokens signed by the
//! fixture key and verified through an in-process key provider.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use anyhow::Result;
use casting_test_utils::{StaticKeys, TestCastingServer, TestKeypair, TestTokenBuilder};
use reqwest::{Method, StatusCode};
use serde_json::{json, Value};

/// Client that signs a fresh token carrying `scope` for every request.
struct Caller<'a> {
    server: &'a TestCastingServer,
    token: String,
}

impl<'a> Caller<'a> {
    fn with_scope(server: &'a TestCastingServer, scope: &str) -> Self {
        let token = TestTokenBuilder::new()
            .for_user("auth0|casting-director")
            .with_scope(scope)
            .sign_with(&TestKeypair::primary());
        Self { server, token }
    }

    fn authenticated(server: &'a TestCastingServer) -> Self {
        let token = TestTokenBuilder::new().sign_with(&TestKeypair::primary());
        Self { server, token }
    }

    async fn send(&self, method: Method, path: &str, body: Option<Value>) -> Result<reqwest::Response> {
        let mut request = reqwest::Client::new()
            .request(method, format!("{}{}", self.server.url(), path))
            .bearer_auth(&self.token);
        if let Some(body) = body {
            request = request.json(&body);
        }
        Ok(request.send().await?)
    }
}

async fn spawn() -> Result<TestCastingServer> {
    TestCastingServer::spawn(StaticKeys::primary()).await
}

// ============================================================================
// Movies
// ============================================================================

#[tokio::test]
async fn test_create_movie_with_scope_returns_201() -> Result<()> {
    let server = spawn().await?;
    let producer = Caller::with_scope(&server, "create:movie");

    let response = producer
        .send(
            Method::POST,
            "/movies",
            Some(json!({"title": "Casablanca", "release_date": "1942-11-26"})),
        )
        .await?;

    assert_eq!(response.status(), StatusCode::CREATED);
    let body: Value = response.json().await?;
    assert_eq!(body["success"], true);
    assert_eq!(body["movie"]["title"], "Casablanca");
    assert_eq!(body["movie"]["release_date"], "1942-11-26");
    assert!(body["movie"]["id"].is_i64());
    Ok(())
}

#[tokio::test]
async fn test_create_movie_with_other_scope_is_forbidden_and_stores_nothing() -> Result<()> {
    let server = spawn().await?;
    let assistant = Caller::with_scope(&server, "create:actor");

    let response = assistant
        .send(Method::POST, "/movies", Some(json!({"title": "Casablanca"})))
        .await?;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert!(server.store().list_movies().await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_reads_need_only_a_valid_token() -> Result<()> {
    let server = spawn().await?;
    Caller::with_scope(&server, "create:movie")
        .send(Method::POST, "/movies", Some(json!({"title": "Metropolis"})))
        .await?;

    let reader = Caller::authenticated(&server);

    let response = reader.send(Method::GET, "/movies", None).await?;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await?;
    assert_eq!(body["movies"].as_array().unwrap().len(), 1);
    assert_eq!(body["movies"][0]["title"], "Metropolis");

    let id = body["movies"][0]["id"].as_i64().unwrap();
    let response = reader.send(Method::GET, &format!("/movies/{id}"), None).await?;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await?;
    assert_eq!(body["movie"]["title"], "Metropolis");
    assert!(body["movie"]["release_date"].is_null());
    Ok(())
}

#[tokio::test]
async fn test_invalid_bodies_are_422() -> Result<()> {
    let server = spawn().await?;
    let producer = Caller::with_scope(&server, "create:movie");

    for body in [
        json!({}),
        json!({"title": ""}),
        json!({"title": "Casablanca", "budget": 950000}),
        json!({"title": "Casablanca", "release_date": "November 1942"}),
        json!("Casablanca"),
    ] {
        let response = producer.send(Method::POST, "/movies", Some(body.clone())).await?;
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY, "{body}");

        let error: Value = response.json().await?;
        assert_eq!(error["code"], "invalid_request_body", "{body}");
    }

    let response = producer.send(Method::POST, "/movies", None).await?;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    Ok(())
}

#[tokio::test]
async fn test_authorization_is_checked_before_the_body() -> Result<()> {
    let server = spawn().await?;
    let reader = Caller::authenticated(&server);

    let response = reader
        .send(Method::POST, "/movies", Some(json!({"nonsense": true})))
        .await?;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    Ok(())
}

#[tokio::test]
async fn test_missing_movie_is_404() -> Result<()> {
    let server = spawn().await?;
    let reader = Caller::authenticated(&server);

    let response = reader.send(Method::GET, "/movies/999", None).await?;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: Value = response.json().await?;
    assert_eq!(body["code"], "not_found");
    assert_eq!(body["description"], "Movie 999 not found");
    Ok(())
}

#[tokio::test]
async fn test_update_and_delete_movie() -> Result<()> {
    let server = spawn().await?;
    let producer = Caller::with_scope(&server, "create:movie update:movie delete:movie");

    let created: Value = producer
        .send(Method::POST, "/movies", Some(json!({"title": "Nosferatu"})))
        .await?
        .json()
        .await?;
    let id = created["movie"]["id"].as_i64().unwrap();

    let response = producer
        .send(
            Method::PATCH,
            &format!("/movies/{id}"),
            Some(json!({"release_date": "1922-03-04"})),
        )
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await?;
    assert_eq!(body["movie"]["title"], "Nosferatu");
    assert_eq!(body["movie"]["release_date"], "1922-03-04");

    let response = producer
        .send(Method::PATCH, &format!("/movies/{id}"), Some(json!({})))
        .await?;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let response = producer.send(Method::DELETE, &format!("/movies/{id}"), None).await?;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await?;
    assert_eq!(body, json!({"success": true, "deleted": id}));

    let response = producer.send(Method::DELETE, &format!("/movies/{id}"), None).await?;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn test_delete_requires_delete_scope() -> Result<()> {
    let server = spawn().await?;
    let producer = Caller::with_scope(&server, "create:movie update:movie");

    let created: Value = producer
        .send(Method::POST, "/movies", Some(json!({"title": "Sunrise"})))
        .await?
        .json()
        .await?;
    let id = created["movie"]["id"].as_i64().unwrap();

    let response = producer.send(Method::DELETE, &format!("/movies/{id}"), None).await?;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert!(server.store().get_movie(id).await?.is_some());
    Ok(())
}

// ============================================================================
// Actors and casting
// ============================================================================

#[tokio::test]
async fn test_actor_lifecycle() -> Result<()> {
    let server = spawn().await?;
    let director = Caller::with_scope(&server, "create:actor update:actor delete:actor");

    let response = director
        .send(
            Method::POST,
            "/actors",
            Some(json!({"name": "Ingrid Bergman", "age": 27, "gender": "female"})),
        )
        .await?;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body: Value = response.json().await?;
    let id = body["actor"]["id"].as_i64().unwrap();
    assert_eq!(body["actor"]["name"], "Ingrid Bergman");

    let response = director
        .send(Method::PATCH, &format!("/actors/{id}"), Some(json!({"age": 28})))
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await?;
    assert_eq!(body["actor"]["age"], 28);
    assert_eq!(body["actor"]["gender"], "female");

    let response = director
        .send(Method::PATCH, &format!("/actors/{id}"), Some(json!({"age": -1})))
        .await?;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let response = director.send(Method::GET, "/actors", None).await?;
    let body: Value = response.json().await?;
    assert_eq!(body["actors"].as_array().unwrap().len(), 1);

    let response = director.send(Method::DELETE, &format!("/actors/{id}"), None).await?;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await?;
    assert_eq!(body["deleted"], id);

    let response = director.send(Method::GET, &format!("/actors/{id}"), None).await?;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn test_cast_actor_in_movie() -> Result<()> {
    let server = spawn().await?;
    let producer = Caller::with_scope(&server, "create:movie create:actor update:movie");

    let movie: Value = producer
        .send(Method::POST, "/movies", Some(json!({"title": "Casablanca"})))
        .await?
        .json()
        .await?;
    let movie_id = movie["movie"]["id"].as_i64().unwrap();
    let actor: Value = producer
        .send(
            Method::POST,
            "/actors",
            Some(json!({"name": "Humphrey Bogart", "age": 42, "gender": "male"})),
        )
        .await?
        .json()
        .await?;
    let actor_id = actor["actor"]["id"].as_i64().unwrap();

    // Casting twice leaves a single entry
    for _ in 0..2 {
        let response = producer
            .send(Method::PUT, &format!("/movies/{movie_id}/actors/{actor_id}"), None)
            .await?;
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = Caller::authenticated(&server)
        .send(Method::GET, &format!("/movies/{movie_id}/actors"), None)
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await?;
    let cast = body["actors"].as_array().unwrap();
    assert_eq!(cast.len(), 1);
    assert_eq!(cast[0]["name"], "Humphrey Bogart");

    let response = producer
        .send(Method::PUT, &format!("/movies/{movie_id}/actors/999"), None)
        .await?;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: Value = response.json().await?;
    assert_eq!(body["description"], "Actor 999 not found");
    Ok(())
}

#[tokio::test]
async fn test_cast_requires_update_movie_scope() -> Result<()> {
    let server = spawn().await?;
    let actor_agent = Caller::with_scope(&server, "update:actor");

    let response = actor_agent
        .send(Method::PUT, "/movies/1/actors/1", None)
        .await?;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    Ok(())
}

#[tokio::test]
async fn test_non_numeric_id_is_rejected_after_authorization() -> Result<()> {
    let server = spawn().await?;

    let response = reqwest::get(format!("{}/movies/abc", server.url())).await?;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = Caller::authenticated(&server)
        .send(Method::GET, "/movies/abc", None)
        .await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    Ok(())
}
