use axum::extract::{Path, State};
use serde::Serialize;
use shared::models::SyncRecord;
use shared::platform::{PlatformMenuPayload, SyncResult};

use crate::core::ServerState;
use crate::menu::BuildStats;
use crate::utils::{ApiResponse, AppResult, ErrorCode};

#[derive(Debug, Serialize)]
pub struct SyncPreview {
    pub payload: PlatformMenuPayload,
    pub stats: BuildStats,
}

/// GET /api/menu-groups/{id}/sync/preview - nothing is pushed
pub async fn preview(State(state): State<ServerState>, Path(id): Path<i64>) -> AppResult<ApiResponse<SyncPreview>> {
    let (payload, stats) = state.orchestrator().build_payload(id).await?;
    Ok(ApiResponse::success(SyncPreview { payload, stats }))
}

/// POST /api/menu-groups/{id}/sync
pub async fn sync(State(state): State<ServerState>, Path(id): Path<i64>) -> AppResult<ApiResponse<SyncResult>> {
    let result = state.orchestrator().sync_menu_group(id).await?;
    Ok(respond(result))
}

/// POST /api/menu-groups/{id}/sync/clear
pub async fn clear(State(state): State<ServerState>, Path(id): Path<i64>) -> AppResult<ApiResponse<SyncResult>> {
    let result = state.orchestrator().clear(id).await?;
    Ok(respond(result))
}

/// GET /api/menu-groups/{id}/sync/records
pub async fn records(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<ApiResponse<Vec<SyncRecord>>> {
    Ok(ApiResponse::success(state.orchestrator().records(id).await?))
}

fn respond(result: SyncResult) -> ApiResponse<SyncResult> {
    if result.success {
        ApiResponse::success(result)
    } else {
        ApiResponse::partial(ErrorCode::PartialSyncFailure, result)
    }
}
