//! HTTP API
//!
//! - [`health`] - liveness and database check
//! - [`menu_groups`] - menu group CRUD and category memberships
//! - [`categories`] - category registry and item placement
//! - [`config`] - session-less configuration reads and writes
//! - [`sessions`] - edit sessions (edit, adjust, commit, discard)
//! - [`sync`] - payload preview, sync, clear, sync records
//!
//! Every handler answers with the [`ApiResponse`](shared::ApiResponse)
//! envelope; errors go through [`AppError`](shared::AppError).

pub mod categories;
pub mod config;
pub mod health;
pub mod menu_groups;
pub mod sessions;
pub mod sync;

use axum::{Router, middleware};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use crate::core::ServerState;

/// Access log line per request
async fn log_request(
    request: http::Request<axum::body::Body>,
    next: middleware::Next,
) -> http::Response<axum::body::Body> {
    let method = request.method().clone();
    let uri = request.uri().clone();

    let response = next.run(request).await;

    tracing::info!(target: "http_access", "{} {} {}", method, uri, response.status());
    response
}

/// All routes, without state
pub fn build_app() -> Router<ServerState> {
    Router::<ServerState>::new()
        .merge(health::router())
        .merge(menu_groups::router())
        .merge(categories::router())
        .merge(config::router())
        .merge(sessions::router())
        .merge(sync::router())
}

/// Routes with state and the HTTP middleware stack
pub fn build_router(state: ServerState) -> Router {
    build_app()
        .with_state(state)
        .layer(middleware::from_fn(log_request))
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
}
