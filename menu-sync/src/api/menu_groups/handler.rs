//! Menu Group API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use shared::models::{
    CategoryMembership, MembershipDetail, MenuCategory, MenuGroup, MenuGroupCreate, MenuGroupUpdate,
};

use crate::core::ServerState;
use crate::menu::registry::RemovalOutcome;
use crate::utils::{ApiResponse, AppResult};

#[derive(Debug, Deserialize)]
pub struct AddCategoryRequest {
    pub category_id: i64,
}

#[derive(Debug, Deserialize)]
pub struct ReorderRequest {
    pub category_ids: Vec<i64>,
}

#[derive(Debug, Deserialize)]
pub struct RemoveCategoryQuery {
    /// Origin the caller believes the category has
    #[serde(default)]
    pub system: bool,
}

/// GET /api/menu-groups
pub async fn list(State(state): State<ServerState>) -> AppResult<ApiResponse<Vec<MenuGroup>>> {
    Ok(ApiResponse::success(state.menu_groups().list().await?))
}

/// GET /api/menu-groups/{id}
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<ApiResponse<MenuGroup>> {
    Ok(ApiResponse::success(state.menu_groups().get(id).await?))
}

/// POST /api/menu-groups
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<MenuGroupCreate>,
) -> AppResult<ApiResponse<MenuGroup>> {
    Ok(ApiResponse::success(state.menu_groups().create(payload).await?))
}

/// PUT /api/menu-groups/{id}
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<MenuGroupUpdate>,
) -> AppResult<ApiResponse<MenuGroup>> {
    Ok(ApiResponse::success(state.menu_groups().update(id, payload).await?))
}

/// DELETE /api/menu-groups/{id} - local only, the platform keeps its copy
pub async fn delete(State(state): State<ServerState>, Path(id): Path<i64>) -> AppResult<ApiResponse<()>> {
    state.menu_groups().delete(id).await?;
    state.sessions.close(id);
    Ok(ApiResponse::ok())
}

/// GET /api/menu-groups/{id}/categories
pub async fn list_memberships(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<ApiResponse<Vec<MembershipDetail>>> {
    state.menu_groups().get(id).await?;
    Ok(ApiResponse::success(state.registry().memberships(id).await?))
}

/// GET /api/menu-groups/{id}/categories/available
pub async fn available_categories(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<ApiResponse<Vec<MenuCategory>>> {
    Ok(ApiResponse::success(state.registry().available_to_add(id).await?))
}

/// POST /api/menu-groups/{id}/categories
pub async fn add_category(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<AddCategoryRequest>,
) -> AppResult<ApiResponse<CategoryMembership>> {
    let membership = state.registry().add_category_to_menu(id, payload.category_id).await?;
    Ok(ApiResponse::success(membership))
}

/// PUT /api/menu-groups/{id}/categories/order
pub async fn reorder_categories(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<ReorderRequest>,
) -> AppResult<ApiResponse<Vec<MembershipDetail>>> {
    Ok(ApiResponse::success(state.registry().reorder(id, &payload.category_ids).await?))
}

/// DELETE /api/menu-groups/{id}/categories/{category_id}?system=bool
pub async fn remove_category(
    State(state): State<ServerState>,
    Path((id, category_id)): Path<(i64, i64)>,
    Query(query): Query<RemoveCategoryQuery>,
) -> AppResult<ApiResponse<RemovalOutcome>> {
    let outcome = state
        .registry()
        .remove_category_from_menu(id, category_id, query.system)
        .await?;
    Ok(ApiResponse::success(outcome))
}
