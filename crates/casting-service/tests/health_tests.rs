//! Health and metrics endpoint integration tests.
//!
//! Tests the public endpoints using the `TestCastingServer` harness.

use casting_test_utils::{StaticKeys, TestCastingServer, TestKeypair, TestTokenBuilder};

/// Test that health endpoint returns 200 and healthy status.
#[tokio::test]
async fn test_health_endpoint_returns_200() -> Result<(), anyhow::Error> {
    let server = TestCastingServer::spawn(StaticKeys::primary()).await?;
    let client = reqwest::Client::new();

    let response = client
        .get(format!("{}/health", server.url()))
        .send()
        .await?;

    assert_eq!(response.status(), 200);

    let body: serde_json::Value = response.json().await?;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["store"], "healthy");

    Ok(())
}

/// Test that health endpoint returns JSON content type.
#[tokio::test]
async fn test_health_endpoint_returns_json() -> Result<(), anyhow::Error> {
    let server = TestCastingServer::spawn(StaticKeys::primary()).await?;
    let client = reqwest::Client::new();

    let response = client
        .get(format!("{}/health", server.url()))
        .send()
        .await?;

    let content_type = response
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok());

    assert!(
        content_type.is_some_and(|ct| ct.contains("application/json")),
        "Expected application/json content type, got {:?}",
        content_type
    );

    Ok(())
}

/// Health does not consult the key provider.
#[tokio::test]
async fn test_health_endpoint_ignores_authorization_header() -> Result<(), anyhow::Error> {
    let keys = StaticKeys::primary();
    let server = TestCastingServer::spawn(keys.clone()).await?;

    let response = reqwest::Client::new()
        .get(format!("{}/health", server.url()))
        .header("Authorization", "Bearer not-a-token")
        .send()
        .await?;

    assert_eq!(response.status(), 200);
    assert_eq!(keys.lookup_count(), 0);

    Ok(())
}

/// Metrics endpoint exposes Prometheus text format.
#[tokio::test]
async fn test_metrics_endpoint_returns_text() -> Result<(), anyhow::Error> {
    let server = TestCastingServer::spawn(StaticKeys::primary()).await?;

    let response = reqwest::get(format!("{}/metrics", server.url())).await?;

    assert_eq!(response.status(), 200);
    // Harness recorder is not installed globally, so the body may be empty
    let _body = response.text().await?;

    Ok(())
}

/// Test that non-existent routes return 404.
#[tokio::test]
async fn test_unknown_route_returns_404() -> Result<(), anyhow::Error> {
    let server = TestCastingServer::spawn(StaticKeys::primary()).await?;
    let token = TestTokenBuilder::new().sign_with(&TestKeypair::primary());

    let response = reqwest::Client::new()
        .get(format!("{}/directors", server.url()))
        .bearer_auth(token)
        .send()
        .await?;

    assert_eq!(response.status(), 404);

    Ok(())
}

/// Unsupported methods on a known path are 405, not an auth failure.
#[tokio::test]
async fn test_unsupported_method_returns_405() -> Result<(), anyhow::Error> {
    let server = TestCastingServer::spawn(StaticKeys::primary()).await?;

    let response = reqwest::Client::new()
        .put(format!("{}/movies", server.url()))
        .send()
        .await?;

    assert_eq!(response.status(), 405);

    Ok(())
}

fn header_value(response: &reqwest::Response, name: &str) -> String {
    response
        .headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_ascii_lowercase()
}

/// Browser preflight is answered without a token or a key lookup.
#[tokio::test]
async fn test_cors_preflight_bypasses_authorization() -> Result<(), anyhow::Error> {
    let keys = StaticKeys::primary();
    let server = TestCastingServer::spawn(keys.clone()).await?;

    let response = reqwest::Client::new()
        .request(reqwest::Method::OPTIONS, format!("{}/movies/1", server.url()))
        .header("Origin", "https://casting-frontend.example.com")
        .header("Access-Control-Request-Method", "DELETE")
        .header("Access-Control-Request-Headers", "authorization,content-type")
        .send()
        .await?;

    assert_eq!(response.status(), 200);
    assert_eq!(header_value(&response, "access-control-allow-origin"), "*");

    let allowed_headers = header_value(&response, "access-control-allow-headers");
    assert!(allowed_headers.contains("authorization"), "{allowed_headers}");
    assert!(allowed_headers.contains("content-type"), "{allowed_headers}");

    let allowed_methods = header_value(&response, "access-control-allow-methods");
    for method in ["get", "post", "patch", "put", "delete", "options"] {
        assert!(allowed_methods.contains(method), "{allowed_methods}");
    }

    assert_eq!(keys.lookup_count(), 0);

    Ok(())
}

/// Rejections still carry CORS headers so browsers can read the error body.
#[tokio::test]
async fn test_cors_headers_on_rejected_request() -> Result<(), anyhow::Error> {
    let server = TestCastingServer::spawn(StaticKeys::primary()).await?;

    let response = reqwest::Client::new()
        .get(format!("{}/movies", server.url()))
        .header("Origin", "https://casting-frontend.example.com")
        .send()
        .await?;

    assert_eq!(response.status(), 401);
    assert_eq!(header_value(&response, "access-control-allow-origin"), "*");

    Ok(())
}
