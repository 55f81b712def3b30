//! Configuration persistence API
//!
//! Session-less reads and writes of item and modifier overrides.
//!
//! | Path | Method | Description |
//! |------|--------|-------------|
//! | /api/menu-groups/{id}/config | GET | Items with effective configuration |
//! | /api/menu-groups/{id}/config | PUT | Save item rows |
//! | /api/menu-groups/{id}/items/{item_id}/modifiers | GET | Modifier options of one item |
//! | /api/menu-groups/{id}/modifiers | PUT | Save modifier rows |

mod handler;

use axum::{
    Router,
    routing::{get, put},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route(
            "/api/menu-groups/{id}/config",
            get(handler::get_config).put(handler::save_config),
        )
        .route(
            "/api/menu-groups/{id}/items/{item_id}/modifiers",
            get(handler::get_modifier_config),
        )
        .route("/api/menu-groups/{id}/modifiers", put(handler::save_modifier_config))
}
