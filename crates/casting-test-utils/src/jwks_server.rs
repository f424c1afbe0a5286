//! Mock JWKS endpoint backed by wiremock.

use crate::crypto_fixtures::{jwks_document, TestKeypair};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate, Times};

/// Path the mock serves the key set on.
pub const JWKS_PATH: &str = "/.well-known/jwks.json";

/// A running mock identity provider that publishes a key set.
///
/// When created with [`TestJwksServer::expecting`], the expected fetch count
/// is verified when the server is dropped.
pub struct TestJwksServer {
    server: MockServer,
}

impl TestJwksServer {
    /// Serve `keys` with no expectation on the number of fetches.
    pub async fn start(keys: &[&TestKeypair]) -> Self {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(JWKS_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(jwks_document(keys)))
            .mount(&server)
            .await;
        Self { server }
    }

    /// Serve `keys` and require exactly/within `expected_fetches` requests.
    pub async fn expecting(keys: &[&TestKeypair], expected_fetches: impl Into<Times>) -> Self {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(JWKS_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(jwks_document(keys)))
            .expect(expected_fetches)
            .mount(&server)
            .await;
        Self { server }
    }

    /// Answer every fetch with `status` and an empty body.
    pub async fn failing(status: u16) -> Self {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(JWKS_PATH))
            .respond_with(ResponseTemplate::new(status))
            .mount(&server)
            .await;
        Self { server }
    }

    /// Full URL of the key set.
    pub fn jwks_url(&self) -> String {
        format!("{}{}", self.server.uri(), JWKS_PATH)
    }

    /// Number of key set requests received so far.
    pub async fn fetch_count(&self) -> usize {
        self.server
            .received_requests()
            .await
            .map(|requests| requests.len())
            .unwrap_or(0)
    }

    /// Access the underlying mock server (e.g. to swap key sets).
    pub fn server(&self) -> &MockServer {
        &self.server
    }
}
