//! Category Registry API Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Serialize;
use shared::models::{CustomCategoryCreate, MenuCategory};

use crate::core::ServerState;
use crate::menu::registry::ImportSummary;
use crate::utils::{ApiResponse, AppResult};

#[derive(Debug, Serialize)]
pub struct ItemPlacement {
    pub category_id: i64,
    pub pos_item_id: i64,
    /// False when the request changed nothing
    pub changed: bool,
}

/// GET /api/categories - system and custom
pub async fn list(State(state): State<ServerState>) -> AppResult<ApiResponse<Vec<MenuCategory>>> {
    Ok(ApiResponse::success(state.registry().load_registry().await?))
}

/// GET /api/categories/{id}
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<ApiResponse<MenuCategory>> {
    Ok(ApiResponse::success(state.registry().get(id).await?))
}

/// POST /api/categories - custom category
pub async fn create_custom(
    State(state): State<ServerState>,
    Json(payload): Json<CustomCategoryCreate>,
) -> AppResult<ApiResponse<MenuCategory>> {
    Ok(ApiResponse::success(state.registry().create_custom_category(payload).await?))
}

/// POST /api/categories/import - mirror POS categories
pub async fn import_system(State(state): State<ServerState>) -> AppResult<ApiResponse<ImportSummary>> {
    Ok(ApiResponse::success(state.registry().import_system_categories().await?))
}

/// GET /api/categories/{id}/items
pub async fn list_items(State(state): State<ServerState>, Path(id): Path<i64>) -> AppResult<ApiResponse<Vec<i64>>> {
    Ok(ApiResponse::success(state.registry().items(id).await?))
}

/// PUT /api/categories/{id}/items/{item_id}
pub async fn assign_item(
    State(state): State<ServerState>,
    Path((category_id, pos_item_id)): Path<(i64, i64)>,
) -> AppResult<ApiResponse<ItemPlacement>> {
    let changed = state.registry().assign_item(category_id, pos_item_id).await?;
    Ok(ApiResponse::success(ItemPlacement {
        category_id,
        pos_item_id,
        changed,
    }))
}

/// DELETE /api/categories/{id}/items/{item_id}
pub async fn unassign_item(
    State(state): State<ServerState>,
    Path((category_id, pos_item_id)): Path<(i64, i64)>,
) -> AppResult<ApiResponse<ItemPlacement>> {
    let changed = state.registry().unassign_item(category_id, pos_item_id).await?;
    Ok(ApiResponse::success(ItemPlacement {
        category_id,
        pos_item_id,
        changed,
    }))
}
