//! Edit session API
//!
//! One in-memory session per menu group. Edits stay pending until commit.
//!
//! | Path | Method | Description |
//! |------|--------|-------------|
//! | /api/menu-groups/{id}/session | POST | Open (or join) the session |
//! | /api/menu-groups/{id}/session | GET | Snapshot of pending edits |
//! | /api/menu-groups/{id}/session | DELETE | Close, dropping pending edits |
//! | /api/menu-groups/{id}/session/edits | PATCH | Stage edits |
//! | /api/menu-groups/{id}/session/adjust | POST | Percentage price change over the whole menu |
//! | /api/menu-groups/{id}/session/commit | POST | Persist pending edits |
//! | /api/menu-groups/{id}/session/discard | POST | Drop pending edits |
//! | /api/menu-groups/{id}/session/reload | POST | Re-read committed overrides |

mod handler;

use axum::{
    Router,
    routing::{patch, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/menu-groups/{id}/session", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route(
            "/",
            post(handler::open).get(handler::snapshot).delete(handler::close),
        )
        .route("/edits", patch(handler::edit))
        .route("/adjust", post(handler::adjust))
        .route("/commit", post(handler::commit))
        .route("/discard", post(handler::discard))
        .route("/reload", post(handler::reload))
}
