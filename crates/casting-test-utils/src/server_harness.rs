//! Test server harness for E2E testing
//!
//! Provides `TestCastingServer` for spawning real casting service instances
//! in tests, backed by the in-memory store.

use crate::token_builders::{TEST_AUDIENCE, TEST_ISSUER};
use casting_service::auth::{AuthGate, JwksClient, KeyProvider, TokenVerifier};
use casting_service::repositories::{EntityStore, MemoryEntityStore};
use casting_service::routes::{self, AppState};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Test harness for spawning the casting service in E2E tests.
///
/// # Example
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_health_flow_e2e() -> Result<()> {
///     let server = TestCastingServer::spawn(StaticKeys::primary()).await?;
///
///     let response = reqwest::get(format!("{}/health", server.url())).await?;
///
///     assert_eq!(response.status(), 200);
///     Ok(())
/// }
/// ```
pub struct TestCastingServer {
    addr: SocketAddr,
    store: Arc<dyn EntityStore>,
    _handle: JoinHandle<()>,
}

impl TestCastingServer {
    /// Spawn a server whose tokens are verified against `keys`.
    ///
    /// The server will:
    /// - Bind to a random available port (127.0.0.1:0)
    /// - Require audience `TEST_AUDIENCE` and issuer `TEST_ISSUER`
    /// - Start the HTTP server in the background
    pub async fn spawn(keys: Arc<dyn KeyProvider>) -> Result<Self, anyhow::Error> {
        let store: Arc<dyn EntityStore> = Arc::new(MemoryEntityStore::new());
        Self::spawn_with_store(keys, store).await
    }

    /// Spawn a server that fetches keys from a JWKS URL (e.g. a `TestJwksServer`).
    pub async fn spawn_with_jwks_url(jwks_url: String) -> Result<Self, anyhow::Error> {
        let jwks_client = Arc::new(JwksClient::with_settings(
            jwks_url,
            Duration::from_secs(600),
            Duration::from_secs(2),
        ));
        Self::spawn(jwks_client).await
    }

    /// Spawn a server over an explicit store.
    pub async fn spawn_with_store(
        keys: Arc<dyn KeyProvider>,
        store: Arc<dyn EntityStore>,
    ) -> Result<Self, anyhow::Error> {
        let verifier = Arc::new(TokenVerifier::new(
            keys,
            TEST_AUDIENCE.to_string(),
            TEST_ISSUER.to_string(),
        ));
        let state = Arc::new(AppState {
            store: store.clone(),
            gate: Arc::new(AuthGate::new(verifier)),
        });

        // Not installed globally: several servers may run in one test binary
        let metrics_handle = PrometheusBuilder::new().build_recorder().handle();

        let app = routes::build_routes(state, metrics_handle);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .map_err(|e| anyhow::anyhow!("Failed to bind test server: {}", e))?;

        let addr = listener
            .local_addr()
            .map_err(|e| anyhow::anyhow!("Failed to get local address: {}", e))?;

        let handle = tokio::spawn(async move {
            let make_service = app.into_make_service_with_connect_info::<SocketAddr>();
            if let Err(e) = axum::serve(listener, make_service).await {
                eprintln!("Test server error: {}", e);
            }
        });

        Ok(Self {
            addr,
            store,
            _handle: handle,
        })
    }

    /// Get the base URL of the test server.
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Get the socket address.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Direct access to the store, for seeding and assertions.
    pub fn store(&self) -> &Arc<dyn EntityStore> {
        &self.store
    }
}

impl Drop for TestCastingServer {
    fn drop(&mut self) {
        self._handle.abort();
    }
}
