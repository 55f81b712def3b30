//! Configuration Override Store
//!
//! Committed overrides keyed by [`CompositeKey`]. A key with no stored row
//! resolves to `enabled = true, price_override = None`.

use async_trait::async_trait;
use shared::models::{CompositeKey, ConfigOverride, OverridePatch};
use shared::util::now_millis;
use sqlx::SqlitePool;

use super::error::MenuResult;
use crate::db::repository::config_override;

/// Result of applying one patch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpsertOutcome {
    Created(ConfigOverride),
    Updated(ConfigOverride),
}

impl UpsertOutcome {
    pub fn value(&self) -> &ConfigOverride {
        match self {
            Self::Created(v) | Self::Updated(v) => v,
        }
    }
}

/// Per-key result of a batch upsert
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyOutcome {
    Created(ConfigOverride),
    Updated(ConfigOverride),
    Failed { key: CompositeKey, detail: String },
}

impl KeyOutcome {
    pub fn key(&self) -> CompositeKey {
        match self {
            Self::Created(v) | Self::Updated(v) => v.key,
            Self::Failed { key, .. } => *key,
        }
    }
}

impl From<UpsertOutcome> for KeyOutcome {
    fn from(outcome: UpsertOutcome) -> Self {
        match outcome {
            UpsertOutcome::Created(v) => Self::Created(v),
            UpsertOutcome::Updated(v) => Self::Updated(v),
        }
    }
}

#[async_trait]
pub trait OverrideStore: Send + Sync {
    async fn get(&self, key: &CompositeKey) -> MenuResult<Option<ConfigOverride>>;

    async fn list_for_menu(&self, menu_group_id: i64) -> MenuResult<Vec<ConfigOverride>>;

    /// Merge `patch` into the stored override, or create one from the default
    async fn upsert(&self, key: CompositeKey, patch: OverridePatch) -> MenuResult<UpsertOutcome>;

    /// Apply every patch on its own; one key failing never blocks the others
    async fn batch_upsert(&self, patches: Vec<(CompositeKey, OverridePatch)>) -> Vec<KeyOutcome> {
        let mut outcomes = Vec::with_capacity(patches.len());
        for (key, patch) in patches {
            match self.upsert(key, patch).await {
                Ok(outcome) => outcomes.push(outcome.into()),
                Err(e) => {
                    tracing::warn!(key = %key, error = %e, "Override upsert failed");
                    outcomes.push(KeyOutcome::Failed {
                        key,
                        detail: e.to_string(),
                    });
                }
            }
        }
        outcomes
    }

    async fn delete_for_menu(&self, menu_group_id: i64) -> MenuResult<u64>;
}

/// SQLite-backed store (`config_override` table)
#[derive(Clone)]
pub struct SqliteOverrideStore {
    pool: SqlitePool,
}

impl SqliteOverrideStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OverrideStore for SqliteOverrideStore {
    async fn get(&self, key: &CompositeKey) -> MenuResult<Option<ConfigOverride>> {
        Ok(config_override::find(&self.pool, key).await?)
    }

    async fn list_for_menu(&self, menu_group_id: i64) -> MenuResult<Vec<ConfigOverride>> {
        Ok(config_override::find_for_menu(&self.pool, menu_group_id).await?)
    }

    async fn upsert(&self, key: CompositeKey, patch: OverridePatch) -> MenuResult<UpsertOutcome> {
        let (value, created) = config_override::upsert(&self.pool, &key, &patch, now_millis()).await?;
        Ok(if created {
            UpsertOutcome::Created(value)
        } else {
            UpsertOutcome::Updated(value)
        })
    }

    async fn delete_for_menu(&self, menu_group_id: i64) -> MenuResult<u64> {
        Ok(config_override::delete_for_menu(&self.pool, menu_group_id).await?)
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::menu::error::MenuError;
    use shared::ErrorCode;
    use std::collections::HashSet;

    /// Store that refuses writes for selected keys
    pub struct FlakyStore<S> {
        pub inner: S,
        pub failing: parking_lot::Mutex<HashSet<CompositeKey>>,
    }

    impl<S: OverrideStore> FlakyStore<S> {
        pub fn new(inner: S, failing: impl IntoIterator<Item = CompositeKey>) -> Self {
            Self {
                inner,
                failing: parking_lot::Mutex::new(failing.into_iter().collect()),
            }
        }

        pub fn heal(&self) {
            self.failing.lock().clear();
        }
    }

    #[async_trait]
    impl<S: OverrideStore> OverrideStore for FlakyStore<S> {
        async fn get(&self, key: &CompositeKey) -> MenuResult<Option<ConfigOverride>> {
            self.inner.get(key).await
        }

        async fn list_for_menu(&self, menu_group_id: i64) -> MenuResult<Vec<ConfigOverride>> {
            self.inner.list_for_menu(menu_group_id).await
        }

        async fn upsert(&self, key: CompositeKey, patch: OverridePatch) -> MenuResult<UpsertOutcome> {
            if self.failing.lock().contains(&key) {
                return Err(MenuError::validation(
                    ErrorCode::InternalError,
                    format!("write refused for {key}"),
                ));
            }
            self.inner.upsert(key, patch).await
        }

        async fn delete_for_menu(&self, menu_group_id: i64) -> MenuResult<u64> {
            self.inner.delete_for_menu(menu_group_id).await
        }
    }

    /// Store whose writes stall for `delay` before reaching `inner`
    pub struct SlowStore<S> {
        pub inner: S,
        pub delay: std::time::Duration,
    }

    #[async_trait]
    impl<S: OverrideStore> OverrideStore for SlowStore<S> {
        async fn get(&self, key: &CompositeKey) -> MenuResult<Option<ConfigOverride>> {
            self.inner.get(key).await
        }

        async fn list_for_menu(&self, menu_group_id: i64) -> MenuResult<Vec<ConfigOverride>> {
            self.inner.list_for_menu(menu_group_id).await
        }

        async fn upsert(&self, key: CompositeKey, patch: OverridePatch) -> MenuResult<UpsertOutcome> {
            tokio::time::sleep(self.delay).await;
            self.inner.upsert(key, patch).await
        }

        async fn delete_for_menu(&self, menu_group_id: i64) -> MenuResult<u64> {
            self.inner.delete_for_menu(menu_group_id).await
        }
    }
}
