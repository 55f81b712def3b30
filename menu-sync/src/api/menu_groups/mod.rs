//! Menu group API
//!
//! CRUD plus the ordered category memberships of each menu group.

mod handler;

use axum::{
    Router,
    routing::{delete, get, put},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/menu-groups", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list).post(handler::create))
        .route("/{id}", get(handler::get_by_id).put(handler::update).delete(handler::delete))
        .route("/{id}/categories", get(handler::list_memberships).post(handler::add_category))
        // Static segments before /{category_id}
        .route("/{id}/categories/available", get(handler::available_categories))
        .route("/{id}/categories/order", put(handler::reorder_categories))
        .route("/{id}/categories/{category_id}", delete(handler::remove_category))
}
