//! Category registry API

mod handler;

use axum::{
    Router,
    routing::{get, post, put},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/categories", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list).post(handler::create_custom))
        // Must be before /{id}
        .route("/import", post(handler::import_system))
        .route("/{id}", get(handler::get_by_id))
        .route("/{id}/items", get(handler::list_items))
        .route(
            "/{id}/items/{item_id}",
            put(handler::assign_item).delete(handler::unassign_item),
        )
}
