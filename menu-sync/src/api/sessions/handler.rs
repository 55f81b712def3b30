//! Edit Session API Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shared::models::serde_helpers::double_option;
use shared::models::{EntityRef, ModifierOption, OverridePatch};

use crate::core::ServerState;
use crate::menu::session::PendingEdit;
use crate::menu::view::load_modifiers;
use crate::menu::{
    AdjustmentSummary, CommitSummary, EditSession, MenuError, MenuView, SessionState,
    apply_percent_adjustment,
};
use crate::utils::{ApiResponse, AppResult, ErrorCode};

/// Pending state of a session
#[derive(Debug, Serialize)]
pub struct SessionSnapshot {
    pub menu_group_id: i64,
    pub state: SessionState,
    pub pending_count: usize,
    pub pending: Vec<PendingEdit>,
}

impl From<&EditSession> for SessionSnapshot {
    fn from(session: &EditSession) -> Self {
        Self {
            menu_group_id: session.menu_group_id(),
            state: session.state(),
            pending_count: session.pending_count(),
            pending: session.pending(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct EditRequest {
    pub edits: Vec<EntityEdit>,
}

/// One staged change; absent fields are left alone, `price_override: null` resets to base
#[derive(Debug, Deserialize)]
pub struct EntityEdit {
    pub entity: EntityRef,
    #[serde(default)]
    pub enabled: Option<bool>,
    #[serde(default, with = "double_option")]
    pub price_override: Option<Option<i64>>,
}

#[derive(Debug, Deserialize)]
pub struct AdjustRequest {
    /// Signed percentage, e.g. `10` or `-12.5`
    pub percent: Decimal,
}

#[derive(Debug, Serialize)]
pub struct AdjustResponse {
    pub adjusted: AdjustmentSummary,
    pub session: SessionSnapshot,
}

#[derive(Debug, Serialize)]
pub struct DiscardResponse {
    pub discarded: usize,
    pub session: SessionSnapshot,
}

/// POST /api/menu-groups/{id}/session
pub async fn open(State(state): State<ServerState>, Path(id): Path<i64>) -> AppResult<ApiResponse<SessionSnapshot>> {
    state.menu_groups().get(id).await?;
    let session = state.sessions.open(id, state.store.as_ref()).await?;
    let snapshot = SessionSnapshot::from(&*session.lock());
    Ok(ApiResponse::success(snapshot))
}

/// GET /api/menu-groups/{id}/session
pub async fn snapshot(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<ApiResponse<SessionSnapshot>> {
    let session = state.sessions.require(id)?;
    let snapshot = SessionSnapshot::from(&*session.lock());
    Ok(ApiResponse::success(snapshot))
}

/// DELETE /api/menu-groups/{id}/session
pub async fn close(State(state): State<ServerState>, Path(id): Path<i64>) -> AppResult<ApiResponse<()>> {
    state.sessions.require(id)?;
    state.sessions.close(id);
    tracing::info!(menu_group_id = id, "Edit session closed");
    Ok(ApiResponse::ok())
}

/// PATCH /api/menu-groups/{id}/session/edits
pub async fn edit(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<EditRequest>,
) -> AppResult<ApiResponse<SessionSnapshot>> {
    let edits: Vec<_> = payload
        .edits
        .into_iter()
        .map(|e| {
            let patch = OverridePatch {
                enabled: e.enabled,
                price_override: e.price_override,
            };
            (e.entity.in_menu(id), patch)
        })
        .collect();

    let session = state.sessions.require(id)?;
    let mut guard = session.lock();
    guard.apply_edits(&edits)?;
    Ok(ApiResponse::success(SessionSnapshot::from(&*guard)))
}

/// POST /api/menu-groups/{id}/session/adjust
///
/// Applies to every item and modifier option currently in the menu.
pub async fn adjust(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<AdjustRequest>,
) -> AppResult<ApiResponse<AdjustResponse>> {
    let session = state.sessions.require(id)?;

    // Catalog reads happen before the session is locked
    let view = MenuView::load(&state.pool, state.catalog.as_ref(), id).await?;
    let modifiers = load_modifiers(
        state.catalog.as_ref(),
        &view.item_ids(),
        state.config.modifier_fetch_concurrency,
    )
    .await;
    let mut options: Vec<ModifierOption> = modifiers.into_values().flatten().collect();
    options.sort_by_key(|o| (o.pos_item_id, o.modifier_group_id, o.modifier_option_id));

    let mut guard = session.lock();
    let adjusted = apply_percent_adjustment(&mut guard, &view.items, &options, payload.percent)?;
    tracing::info!(
        menu_group_id = id,
        percent = %payload.percent,
        items = adjusted.items,
        modifier_options = adjusted.modifier_options,
        "Price adjustment staged"
    );
    Ok(ApiResponse::success(AdjustResponse {
        adjusted,
        session: SessionSnapshot::from(&*guard),
    }))
}

/// POST /api/menu-groups/{id}/session/commit
pub async fn commit(State(state): State<ServerState>, Path(id): Path<i64>) -> AppResult<ApiResponse<CommitSummary>> {
    let summary = state.sessions.commit(id, state.store.as_ref()).await?;
    if summary.is_partial() {
        return Ok(ApiResponse::partial(ErrorCode::PartialSaveFailure, summary));
    }
    Ok(ApiResponse::success(summary))
}

/// POST /api/menu-groups/{id}/session/discard
pub async fn discard(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<ApiResponse<DiscardResponse>> {
    let session = state.sessions.require(id)?;
    let mut guard = session.lock();
    let discarded = guard.discard()?;
    Ok(ApiResponse::success(DiscardResponse {
        discarded,
        session: SessionSnapshot::from(&*guard),
    }))
}

/// POST /api/menu-groups/{id}/session/reload
pub async fn reload(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<ApiResponse<SessionSnapshot>> {
    let session = state.sessions.require(id)?;
    let committed = state.store.list_for_menu(id).await?;
    let mut guard = session.lock();
    if guard.state() == SessionState::Committing {
        return Err(MenuError::SaveInFlight(id).into());
    }
    guard.replace_committed(committed);
    Ok(ApiResponse::success(SessionSnapshot::from(&*guard)))
}
