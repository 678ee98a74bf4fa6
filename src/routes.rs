//! Top-level router assembly.

use axum::{routing::get, Router};
use tower::Layer;
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};
use tower_http::trace::TraceLayer;

use crate::api::handlers::health_handler;
use crate::api::routes::api_routes;
use crate::state::AppState;

/// Constructs the application router with all routes and middleware.
///
/// Trailing slashes are normalized away, so `/api/newsletters/1/send/` and
/// `/api/newsletters/1/send` hit the same handler.
pub fn app_router(state: AppState) -> NormalizePath<Router> {
    let router = Router::new()
        .route("/healthz", get(health_handler))
        .nest("/api", api_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    NormalizePathLayer::trim_trailing_slash().layer(router)
}
