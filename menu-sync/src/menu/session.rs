//! Edit session (dirty-change tracker)
//!
//! Uncommitted edits for one menu group, layered over the committed
//! overrides:
//!
//! ```text
//! effective value = pending patch  →  committed override  →  base / enabled
//! ```
//!
//! Lifecycle: `Clean → Dirty → Committing → Clean | Error`. A session in
//! `Committing` rejects another commit; that guard is the only protection
//! against double saves. Two sessions on the same menu group are
//! last-writer-wins.
//!
//! The session never reads or writes catalog base data. Base prices are
//! passed in by the caller when an effective price is resolved.

use dashmap::DashMap;
use parking_lot::Mutex;
use serde::Serialize;
use shared::ErrorCode;
use shared::models::{
    CompositeKey, ConfigOverride, KeyFailure, OverridePatch, OverrideScope,
};
use std::collections::HashMap;
use std::sync::Arc;

use super::error::{MenuError, MenuResult};
use super::store::{KeyOutcome, OverrideStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Clean,
    Dirty,
    Committing,
    /// Last commit left failed keys pending
    Error,
}

/// Result of a commit
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CommitSummary {
    pub items_changed: usize,
    pub modifier_options_changed: usize,
    pub created: usize,
    pub updated: usize,
    /// Keys that were not persisted; they stay pending
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<KeyFailure>,
}

impl CommitSummary {
    pub fn is_partial(&self) -> bool {
        !self.failures.is_empty()
    }
}

/// Snapshot of pending patches handed to the store by a commit
#[derive(Debug)]
pub struct CommitBatch {
    pub menu_group_id: i64,
    pub items: Vec<(CompositeKey, OverridePatch)>,
    pub modifier_options: Vec<(CompositeKey, OverridePatch)>,
}

impl CommitBatch {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty() && self.modifier_options.is_empty()
    }

    /// Issue item and modifier-option batches as two concurrent calls
    pub async fn execute(self, store: &dyn OverrideStore) -> (Self, Vec<KeyOutcome>, Vec<KeyOutcome>) {
        let (item_outcomes, modifier_outcomes) = tokio::join!(
            store.batch_upsert(self.items.clone()),
            store.batch_upsert(self.modifier_options.clone()),
        );
        (self, item_outcomes, modifier_outcomes)
    }
}

/// Pending edit as exposed over the API
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PendingEdit {
    pub key: CompositeKey,
    pub patch: OverridePatch,
}

#[derive(Debug)]
pub struct EditSession {
    menu_group_id: i64,
    state: SessionState,
    pending: HashMap<CompositeKey, OverridePatch>,
    committed: HashMap<CompositeKey, ConfigOverride>,
}

impl EditSession {
    /// Empty session over the given committed overrides
    pub fn new(menu_group_id: i64, committed: Vec<ConfigOverride>) -> Self {
        Self {
            menu_group_id,
            state: SessionState::Clean,
            pending: HashMap::new(),
            committed: committed
                .into_iter()
                .filter(|o| o.key.menu_group_id == menu_group_id)
                .map(|o| (o.key, o))
                .collect(),
        }
    }

    /// Session loaded with the store's committed overrides for the menu group
    pub async fn open(menu_group_id: i64, store: &dyn OverrideStore) -> MenuResult<Self> {
        let committed = store.list_for_menu(menu_group_id).await?;
        Ok(Self::new(menu_group_id, committed))
    }

    pub fn menu_group_id(&self) -> i64 {
        self.menu_group_id
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn is_dirty(&self, key: &CompositeKey) -> bool {
        self.pending.contains_key(key)
    }

    /// Pending edits, sorted by key
    pub fn pending(&self) -> Vec<PendingEdit> {
        let mut edits: Vec<_> = self
            .pending
            .iter()
            .map(|(key, patch)| PendingEdit {
                key: *key,
                patch: *patch,
            })
            .collect();
        edits.sort_by_key(|e| e.key);
        edits
    }

    pub fn committed(&self, key: &CompositeKey) -> Option<&ConfigOverride> {
        self.committed.get(key)
    }

    fn check_key(&self, key: &CompositeKey) -> MenuResult<()> {
        if key.menu_group_id != self.menu_group_id {
            return Err(MenuError::validation(
                ErrorCode::InvalidRequest,
                format!(
                    "Key {key} belongs to menu group {}, session edits menu group {}",
                    key.menu_group_id, self.menu_group_id
                ),
            ));
        }
        Ok(())
    }

    fn check_edit(&self, key: &CompositeKey, patch: &OverridePatch) -> MenuResult<()> {
        self.check_key(key)?;
        if let Some(price) = patch.price_override.flatten()
            && price < 0
        {
            return Err(MenuError::validation(
                ErrorCode::ValueOutOfRange,
                format!("Price override for {key} must not be negative"),
            ));
        }
        Ok(())
    }

    /// Store one or both fields in the pending patch for `key`
    pub fn set_field(&mut self, key: CompositeKey, patch: OverridePatch) -> MenuResult<()> {
        self.check_edit(&key, &patch)?;
        self.stage(key, patch);
        Ok(())
    }

    /// Stage several edits; one invalid edit rejects all of them
    pub fn apply_edits(&mut self, edits: &[(CompositeKey, OverridePatch)]) -> MenuResult<usize> {
        for (key, patch) in edits {
            self.check_edit(key, patch)?;
        }
        for (key, patch) in edits {
            self.stage(*key, *patch);
        }
        Ok(self.pending.len())
    }

    fn stage(&mut self, key: CompositeKey, patch: OverridePatch) {
        if patch.is_empty() {
            return;
        }
        self.pending.entry(key).or_default().merge(&patch);
        if self.state != SessionState::Committing {
            self.state = SessionState::Dirty;
        }
    }

    pub fn set_enabled(&mut self, key: CompositeKey, enabled: bool) -> MenuResult<()> {
        self.set_field(key, OverridePatch::enabled(enabled))
    }

    /// `None` resets to base price
    pub fn set_price(&mut self, key: CompositeKey, price: Option<i64>) -> MenuResult<()> {
        self.set_field(key, OverridePatch::price(price))
    }

    /// Pending value, else committed value, else `true`
    pub fn effective_enabled(&self, key: &CompositeKey) -> bool {
        if let Some(enabled) = self.pending.get(key).and_then(|p| p.enabled) {
            return enabled;
        }
        self.committed.get(key).is_none_or(|o| o.enabled)
    }

    /// Pending override, else committed override; `None` means base price
    pub fn effective_price_override(&self, key: &CompositeKey) -> Option<i64> {
        if let Some(price) = self.pending.get(key).and_then(|p| p.price_override) {
            return price;
        }
        self.committed.get(key).and_then(|o| o.price_override)
    }

    /// Effective price: the override if one resolves, else `base_price`
    pub fn effective_price(&self, key: &CompositeKey, base_price: i64) -> i64 {
        self.effective_price_override(key).unwrap_or(base_price)
    }

    /// Drop all pending edits
    pub fn discard(&mut self) -> MenuResult<usize> {
        if self.state == SessionState::Committing {
            return Err(MenuError::SaveInFlight(self.menu_group_id));
        }
        let dropped = self.pending.len();
        self.pending.clear();
        self.state = SessionState::Clean;
        Ok(dropped)
    }

    /// Replace the committed snapshot with what the store holds now
    pub async fn reload(&mut self, store: &dyn OverrideStore) -> MenuResult<()> {
        if self.state == SessionState::Committing {
            return Err(MenuError::SaveInFlight(self.menu_group_id));
        }
        self.replace_committed(store.list_for_menu(self.menu_group_id).await?);
        Ok(())
    }

    pub(crate) fn replace_committed(&mut self, committed: Vec<ConfigOverride>) {
        let menu_group_id = self.menu_group_id;
        self.committed = committed
            .into_iter()
            .filter(|o| o.key.menu_group_id == menu_group_id)
            .map(|o| (o.key, o))
            .collect();
    }

    /// Enter `Committing` and snapshot the pending patches
    pub fn begin_commit(&mut self) -> MenuResult<CommitBatch> {
        if self.state == SessionState::Committing {
            return Err(MenuError::SaveInFlight(self.menu_group_id));
        }
        let mut batch = CommitBatch {
            menu_group_id: self.menu_group_id,
            items: Vec::new(),
            modifier_options: Vec::new(),
        };
        for (key, patch) in &self.pending {
            match key.scope() {
                OverrideScope::Item => batch.items.push((*key, *patch)),
                OverrideScope::ModifierOption => batch.modifier_options.push((*key, *patch)),
            }
        }
        batch.items.sort_by_key(|(k, _)| *k);
        batch.modifier_options.sort_by_key(|(k, _)| *k);
        self.state = SessionState::Committing;
        Ok(batch)
    }

    /// Fold store outcomes back into the session and leave `Committing`
    ///
    /// Applied keys leave the pending map unless they were edited again
    /// while the commit ran; failed keys stay pending.
    pub fn finish_commit(
        &mut self,
        batch: &CommitBatch,
        item_outcomes: Vec<KeyOutcome>,
        modifier_outcomes: Vec<KeyOutcome>,
    ) -> CommitSummary {
        let sent: HashMap<CompositeKey, OverridePatch> = batch
            .items
            .iter()
            .chain(batch.modifier_options.iter())
            .copied()
            .collect();

        let mut summary = CommitSummary::default();
        for outcome in item_outcomes.into_iter().chain(modifier_outcomes) {
            let key = outcome.key();
            let value = match outcome {
                KeyOutcome::Created(value) => {
                    summary.created += 1;
                    value
                }
                KeyOutcome::Updated(value) => {
                    summary.updated += 1;
                    value
                }
                KeyOutcome::Failed { key, detail } => {
                    summary.failures.push(KeyFailure {
                        key,
                        message: detail,
                    });
                    continue;
                }
            };

            match key.scope() {
                OverrideScope::Item => summary.items_changed += 1,
                OverrideScope::ModifierOption => summary.modifier_options_changed += 1,
            }
            if self.pending.get(&key) == sent.get(&key) {
                self.pending.remove(&key);
            }
            self.committed.insert(key, value);
        }

        self.state = if !summary.failures.is_empty() {
            SessionState::Error
        } else if self.pending.is_empty() {
            SessionState::Clean
        } else {
            SessionState::Dirty
        };

        tracing::info!(
            menu_group_id = self.menu_group_id,
            items = summary.items_changed,
            modifier_options = summary.modifier_options_changed,
            failed = summary.failures.len(),
            "Edit session committed"
        );
        summary
    }

    /// Leave `Committing` without store outcomes; every pending edit stays pending
    ///
    /// The store may have applied part of the batch, so the committed
    /// snapshot can lag until the next reload or commit.
    pub fn abort_commit(&mut self) {
        if self.state != SessionState::Committing {
            return;
        }
        self.state = if self.pending.is_empty() {
            SessionState::Clean
        } else {
            SessionState::Dirty
        };
        tracing::warn!(
            menu_group_id = self.menu_group_id,
            pending = self.pending.len(),
            "Commit abandoned before completion, edits kept pending"
        );
    }

    /// Flush pending edits into the store
    pub async fn commit(&mut self, store: &dyn OverrideStore) -> MenuResult<CommitSummary> {
        let batch = self.begin_commit()?;
        if batch.is_empty() {
            self.state = SessionState::Clean;
            return Ok(CommitSummary::default());
        }
        let guard = CommitGuard::new(SessionHandle::Exclusive(self));
        let (batch, items, modifiers) = batch.execute(store).await;
        Ok(guard.finish(&batch, items, modifiers))
    }
}

enum SessionHandle<'a> {
    Exclusive(&'a mut EditSession),
    Shared(&'a Mutex<EditSession>),
}

impl SessionHandle<'_> {
    fn with<R>(&mut self, f: impl FnOnce(&mut EditSession) -> R) -> R {
        match self {
            Self::Exclusive(session) => f(&mut **session),
            Self::Shared(session) => f(&mut *session.lock()),
        }
    }
}

/// A commit between `begin_commit` and `finish_commit`
///
/// Dropped without `finish` (the awaiting future was cancelled), it
/// calls `abort_commit` so the session cannot stay in `Committing`.
struct CommitGuard<'a> {
    session: SessionHandle<'a>,
    finished: bool,
}

impl<'a> CommitGuard<'a> {
    fn new(session: SessionHandle<'a>) -> Self {
        Self {
            session,
            finished: false,
        }
    }

    fn finish(
        mut self,
        batch: &CommitBatch,
        item_outcomes: Vec<KeyOutcome>,
        modifier_outcomes: Vec<KeyOutcome>,
    ) -> CommitSummary {
        self.finished = true;
        self.session
            .with(|s| s.finish_commit(batch, item_outcomes, modifier_outcomes))
    }
}

impl Drop for CommitGuard<'_> {
    fn drop(&mut self) {
        if !self.finished {
            self.session.with(EditSession::abort_commit);
        }
    }
}

/// Open edit sessions, one per menu group
///
/// Each session sits behind its own mutex; the lock is never held across
/// a store call.
#[derive(Default)]
pub struct SessionRegistry {
    sessions: DashMap<i64, Arc<Mutex<EditSession>>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Existing session for the menu group, or a fresh one loaded from the store
    pub async fn open(
        &self,
        menu_group_id: i64,
        store: &dyn OverrideStore,
    ) -> MenuResult<Arc<Mutex<EditSession>>> {
        if let Some(session) = self.get(menu_group_id) {
            return Ok(session);
        }
        let session = EditSession::open(menu_group_id, store).await?;
        Ok(self
            .sessions
            .entry(menu_group_id)
            .or_insert_with(|| Arc::new(Mutex::new(session)))
            .clone())
    }

    pub fn get(&self, menu_group_id: i64) -> Option<Arc<Mutex<EditSession>>> {
        self.sessions.get(&menu_group_id).map(|s| s.clone())
    }

    pub fn require(&self, menu_group_id: i64) -> MenuResult<Arc<Mutex<EditSession>>> {
        self.get(menu_group_id).ok_or_else(|| {
            MenuError::NotFound(
                ErrorCode::EditSessionNotFound,
                format!("No edit session open for menu group {menu_group_id}"),
            )
        })
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Drop the session (and its pending edits)
    pub fn close(&self, menu_group_id: i64) -> bool {
        self.sessions.remove(&menu_group_id).is_some()
    }

    /// Commit a shared session without holding its lock across the store calls
    ///
    /// Cancelling the returned future leaves the session `Dirty` with its
    /// edits still pending.
    pub async fn commit(&self, menu_group_id: i64, store: &dyn OverrideStore) -> MenuResult<CommitSummary> {
        let session = self.require(menu_group_id)?;
        let batch = session.lock().begin_commit()?;
        if batch.is_empty() {
            let mut guard = session.lock();
            return Ok(guard.finish_commit(&batch, vec![], vec![]));
        }
        let guard = CommitGuard::new(SessionHandle::Shared(&*session));
        let (batch, items, modifiers) = batch.execute(store).await;
        Ok(guard.finish(&batch, items, modifiers))
    }

    /// Re-read committed overrides of a menu group into its open session, if any
    pub async fn refresh(&self, menu_group_id: i64, store: &dyn OverrideStore) -> MenuResult<()> {
        let Some(session) = self.get(menu_group_id) else {
            return Ok(());
        };
        let committed = store.list_for_menu(menu_group_id).await?;
        session.lock().replace_committed(committed);
        Ok(())
    }
}
