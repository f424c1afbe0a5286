//! HTTP routes for the casting service.
//!
//! Defines the Axum router and application state.

use crate::auth::{scopes, AuthGate, Requirement};
use crate::handlers;
use crate::middleware::{http_metrics_middleware, require_permission, PermissionState};
use crate::repositories::EntityStore;
use axum::{
    http::{header, Method},
    middleware,
    routing::{delete, get, patch, post, put, MethodRouter},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Movie and actor storage.
    pub store: Arc<dyn EntityStore>,

    /// Authorization gate shared by every protected route.
    pub gate: Arc<AuthGate>,
}

/// Attach a permission check to a single method route.
fn guarded(
    route: MethodRouter<Arc<AppState>>,
    gate: &Arc<AuthGate>,
    requirement: Requirement,
) -> MethodRouter<Arc<AppState>> {
    route.route_layer(middleware::from_fn_with_state(
        PermissionState {
            gate: gate.clone(),
            requirement,
        },
        require_permission,
    ))
}

/// Browser access from any origin; preflight requests are answered here and
/// never reach the permission layer.
fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
}

/// Build the application routes.
///
/// Creates an Axum router with:
/// - `/health`, `/metrics` - public
/// - `/movies...`, `/actors...` - every method guarded by its own requirement
/// - TraceLayer for request logging
/// - 30 second request timeout
/// - CORS for any origin
/// - HTTP metrics on every response
pub fn build_routes(state: Arc<AppState>, metrics_handle: PrometheusHandle) -> Router {
    use Requirement::{Authenticated, Scope};

    let gate = state.gate.clone();

    let public_routes = Router::new()
        .route("/health", get(handlers::health_check))
        .with_state(state.clone());

    let metrics_routes = Router::new()
        .route("/metrics", get(handlers::metrics_handler))
        .with_state(metrics_handle);

    let protected_routes = Router::new()
        .route(
            "/movies",
            guarded(get(handlers::list_movies), &gate, Authenticated).merge(guarded(
                post(handlers::create_movie),
                &gate,
                Scope(scopes::CREATE_MOVIE),
            )),
        )
        .route(
            "/movies/:id",
            guarded(get(handlers::get_movie), &gate, Authenticated)
                .merge(guarded(
                    patch(handlers::update_movie),
                    &gate,
                    Scope(scopes::UPDATE_MOVIE),
                ))
                .merge(guarded(
                    delete(handlers::delete_movie),
                    &gate,
                    Scope(scopes::DELETE_MOVIE),
                )),
        )
        .route(
            "/movies/:id/actors",
            guarded(get(handlers::list_movie_actors), &gate, Authenticated),
        )
        .route(
            "/movies/:id/actors/:actor_id",
            guarded(
                put(handlers::cast_actor),
                &gate,
                Scope(scopes::UPDATE_MOVIE),
            ),
        )
        .route(
            "/actors",
            guarded(get(handlers::list_actors), &gate, Authenticated).merge(guarded(
                post(handlers::create_actor),
                &gate,
                Scope(scopes::CREATE_ACTOR),
            )),
        )
        .route(
            "/actors/:id",
            guarded(get(handlers::get_actor), &gate, Authenticated)
                .merge(guarded(
                    patch(handlers::update_actor),
                    &gate,
                    Scope(scopes::UPDATE_ACTOR),
                ))
                .merge(guarded(
                    delete(handlers::delete_actor),
                    &gate,
                    Scope(scopes::DELETE_ACTOR),
                )),
        )
        .with_state(state);

    // Outermost last: metrics see timeouts as well as handler responses
    public_routes
        .merge(metrics_routes)
        .merge(protected_routes)
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(Duration::from_secs(30)))
        .layer(cors_layer())
        .layer(middleware::from_fn(http_metrics_middleware))
}
