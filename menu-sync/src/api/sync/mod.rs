//! Platform sync API
//!
//! | Path | Method | Description |
//! |------|--------|-------------|
//! | /api/menu-groups/{id}/sync/preview | GET | Payload that a sync would push |
//! | /api/menu-groups/{id}/sync | POST | Build and push the menu |
//! | /api/menu-groups/{id}/sync/clear | POST | Push an empty menu |
//! | /api/menu-groups/{id}/sync/records | GET | Per-entity sync status |

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/menu-groups/{id}/sync", post(handler::sync))
        .route("/api/menu-groups/{id}/sync/preview", get(handler::preview))
        .route("/api/menu-groups/{id}/sync/clear", post(handler::clear))
        .route("/api/menu-groups/{id}/sync/records", get(handler::records))
}
