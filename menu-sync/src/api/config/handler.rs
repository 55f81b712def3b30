use axum::{
    Json,
    extract::{Path, State},
};
use serde::Deserialize;
use shared::models::{
    ItemConfigInput, MenuConfig, ModifierConfigInput, ModifierConfigView, SaveConfigResult,
};

use crate::core::ServerState;
use crate::utils::{ApiResponse, AppResult, ErrorCode};

#[derive(Debug, Deserialize)]
pub struct SaveConfigRequest {
    pub items: Vec<ItemConfigInput>,
}

#[derive(Debug, Deserialize)]
pub struct SaveModifierConfigRequest {
    pub modifiers: Vec<ModifierConfigInput>,
}

/// GET /api/menu-groups/{id}/config
pub async fn get_config(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<ApiResponse<MenuConfig>> {
    Ok(ApiResponse::success(state.config_api().get_config(id).await?))
}

/// PUT /api/menu-groups/{id}/config
pub async fn save_config(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<SaveConfigRequest>,
) -> AppResult<ApiResponse<SaveConfigResult>> {
    let result = state.config_api().save_config(id, payload.items).await?;
    saved(&state, id, result).await
}

/// GET /api/menu-groups/{id}/items/{item_id}/modifiers
pub async fn get_modifier_config(
    State(state): State<ServerState>,
    Path((id, item_id)): Path<(i64, i64)>,
) -> AppResult<ApiResponse<ModifierConfigView>> {
    Ok(ApiResponse::success(
        state.config_api().get_modifier_config(item_id, id).await?,
    ))
}

/// PUT /api/menu-groups/{id}/modifiers
pub async fn save_modifier_config(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<SaveModifierConfigRequest>,
) -> AppResult<ApiResponse<SaveConfigResult>> {
    let result = state
        .config_api()
        .save_modifier_config(payload.modifiers, id)
        .await?;
    saved(&state, id, result).await
}

/// Bring an open session in line with the new committed values
async fn saved(
    state: &ServerState,
    menu_group_id: i64,
    result: SaveConfigResult,
) -> AppResult<ApiResponse<SaveConfigResult>> {
    state.sessions.refresh(menu_group_id, state.store.as_ref()).await?;
    if result.is_partial() {
        tracing::warn!(
            menu_group_id,
            failed = result.failures.len(),
            "Configuration saved with failures"
        );
        return Ok(ApiResponse::partial(ErrorCode::PartialSaveFailure, result));
    }
    Ok(ApiResponse::success(result))
}
