//! Configuration persistence API
//!
//! Read and write per-menu item / modifier option configuration without an
//! edit session. Reads merge catalog data, committed overrides and sync
//! records; writes are full replacements of both override fields per key.

use shared::ErrorCode;
use shared::models::{
    CompositeKey, ConfigSummary, ItemConfig, ItemConfigInput, KeyFailure, MenuConfig,
    ModifierConfig, ModifierConfigInput, ModifierConfigView, OverridePatch, SaveConfigResult,
    SyncRecord, SyncStatus,
};
use sqlx::SqlitePool;
use std::collections::HashMap;
use std::sync::Arc;

use super::error::{MenuError, MenuResult};
use super::store::{KeyOutcome, OverrideStore};
use super::view::{MenuView, OverrideIndex};
use crate::catalog::CatalogSource;
use crate::db::repository::{menu_group, sync_record};

#[derive(Clone)]
pub struct ConfigApi {
    pool: SqlitePool,
    catalog: Arc<dyn CatalogSource>,
    store: Arc<dyn OverrideStore>,
}

impl ConfigApi {
    pub fn new(pool: SqlitePool, catalog: Arc<dyn CatalogSource>, store: Arc<dyn OverrideStore>) -> Self {
        Self {
            pool,
            catalog,
            store,
        }
    }

    /// Items of a menu group with their effective configuration
    pub async fn get_config(&self, menu_group_id: i64) -> MenuResult<MenuConfig> {
        let view = MenuView::load(&self.pool, self.catalog.as_ref(), menu_group_id).await?;
        let overrides = OverrideIndex::new(self.store.list_for_menu(menu_group_id).await?);
        let records = self.records(menu_group_id).await?;

        let mut summary = ConfigSummary::default();
        let items = view
            .items
            .into_iter()
            .map(|item| {
                let key = CompositeKey::item(item.pos_item_id, menu_group_id);
                let enabled = overrides.enabled(&key);
                let price_override = overrides.price_override(&key);
                let effective_price = price_override.unwrap_or(item.base_price);
                summary.record(enabled, item.base_price, effective_price);
                let record = records.get(&key);
                ItemConfig {
                    pos_item_id: item.pos_item_id,
                    name: item.name,
                    category_id: item.category_id,
                    base_price: item.base_price,
                    enabled,
                    price_override,
                    effective_price,
                    has_override: overrides.get(&key).is_some(),
                    sync_status: record.map(|r| r.status).unwrap_or_default(),
                    sync_error: record.and_then(|r| r.error_detail.clone()),
                    last_synced_at: record.and_then(|r| r.last_synced_at),
                }
            })
            .collect();

        Ok(MenuConfig { items, summary })
    }

    /// Persist item rows; each row replaces both fields of its override
    ///
    /// A negative price rejects the whole request. Store failures are per
    /// key and reported alongside the counts.
    pub async fn save_config(&self, menu_group_id: i64, items: Vec<ItemConfigInput>) -> MenuResult<SaveConfigResult> {
        self.require_menu_group(menu_group_id).await?;
        let patches = items
            .into_iter()
            .map(|row| {
                let key = CompositeKey::item(row.pos_item_id, menu_group_id);
                validate_price(&key, row.price_override)?;
                Ok((key, OverridePatch::full(row.enabled, row.price_override)))
            })
            .collect::<MenuResult<Vec<_>>>()?;
        self.save(menu_group_id, patches).await
    }

    /// Modifier options of one item with their effective configuration
    pub async fn get_modifier_config(&self, item_id: i64, menu_group_id: i64) -> MenuResult<ModifierConfigView> {
        self.require_menu_group(menu_group_id).await?;
        let options = self.catalog.list_modifier_options(item_id).await?;
        let overrides = OverrideIndex::new(self.store.list_for_menu(menu_group_id).await?);
        let records = self.records(menu_group_id).await?;

        let mut summary = ConfigSummary::default();
        let modifiers = options
            .into_iter()
            .map(|option| {
                let key = CompositeKey::modifier(
                    option.pos_item_id,
                    option.modifier_group_id,
                    option.modifier_option_id,
                    menu_group_id,
                );
                let enabled = overrides.enabled(&key);
                let price_override = overrides.price_override(&key);
                let effective_price = price_override.unwrap_or(option.base_price);
                summary.record(enabled, option.base_price, effective_price);
                let record = records.get(&key);
                ModifierConfig {
                    pos_item_id: option.pos_item_id,
                    modifier_group_id: option.modifier_group_id,
                    modifier_option_id: option.modifier_option_id,
                    name: option.name,
                    group_name: option.group_name,
                    base_price: option.base_price,
                    enabled,
                    price_override,
                    effective_price,
                    has_override: overrides.get(&key).is_some(),
                    sync_status: record.map(|r| r.status).unwrap_or(SyncStatus::Unsynced),
                    sync_error: record.and_then(|r| r.error_detail.clone()),
                }
            })
            .collect();

        Ok(ModifierConfigView { modifiers, summary })
    }

    pub async fn save_modifier_config(
        &self,
        modifiers: Vec<ModifierConfigInput>,
        menu_group_id: i64,
    ) -> MenuResult<SaveConfigResult> {
        self.require_menu_group(menu_group_id).await?;
        let patches = modifiers
            .into_iter()
            .map(|row| {
                let key = CompositeKey::modifier(
                    row.pos_item_id,
                    row.modifier_group_id,
                    row.modifier_option_id,
                    menu_group_id,
                );
                validate_price(&key, row.price_override)?;
                Ok((key, OverridePatch::full(row.enabled, row.price_override)))
            })
            .collect::<MenuResult<Vec<_>>>()?;
        self.save(menu_group_id, patches).await
    }

    async fn save(&self, menu_group_id: i64, patches: Vec<(CompositeKey, OverridePatch)>) -> MenuResult<SaveConfigResult> {
        let mut result = SaveConfigResult::default();
        for outcome in self.store.batch_upsert(patches).await {
            match outcome {
                KeyOutcome::Created(_) => result.created_count += 1,
                KeyOutcome::Updated(_) => result.updated_count += 1,
                KeyOutcome::Failed { key, detail } => result.failures.push(KeyFailure { key, message: detail }),
            }
        }
        tracing::info!(
            menu_group_id,
            created = result.created_count,
            updated = result.updated_count,
            failed = result.failures.len(),
            "Configuration saved"
        );
        Ok(result)
    }

    async fn records(&self, menu_group_id: i64) -> MenuResult<HashMap<CompositeKey, SyncRecord>> {
        Ok(sync_record::find_for_menu(&self.pool, menu_group_id)
            .await?
            .into_iter()
            .map(|r| (r.key, r))
            .collect())
    }

    async fn require_menu_group(&self, menu_group_id: i64) -> MenuResult<()> {
        if !menu_group::exists(&self.pool, menu_group_id).await? {
            return Err(MenuError::menu_group_not_found(menu_group_id));
        }
        Ok(())
    }
}

fn validate_price(key: &CompositeKey, price: Option<i64>) -> MenuResult<()> {
    if let Some(price) = price
        && price < 0
    {
        return Err(MenuError::validation(
            ErrorCode::ValueOutOfRange,
            format!("Price override for {key} must not be negative"),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::StaticCatalog;
    use crate::db::repository::test_support::{seed_menu_group, test_pool};
    use crate::db::repository::{membership, menu_category};
    use crate::menu::store::SqliteOverrideStore;
    use crate::menu::store::test_support::FlakyStore;
    use shared::models::{CategoryOrigin, MenuCategory, ModifierOption};

    fn catalog() -> StaticCatalog {
        StaticCatalog::default()
            .with_item(1, "Burger", 1000, 5)
            .with_item(2, "Fries", 400, 5)
            .with_modifier(ModifierOption {
                pos_item_id: 1,
                modifier_group_id: 7,
                modifier_option_id: 71,
                name: "Cheese".into(),
                base_price: 100,
                group_name: Some("Extras".into()),
            })
    }

    async fn seed(pool: &SqlitePool) {
        seed_menu_group(pool, 1, "Lunch").await;
        let mut conn = pool.acquire().await.unwrap();
        menu_category::insert(
            &mut conn,
            &MenuCategory {
                id: 10,
                name: "Mains".into(),
                origin: CategoryOrigin::Custom,
                source_category_id: None,
                created_at: 1,
                updated_at: 1,
            },
        )
        .await
        .unwrap();
        for item in [1, 2] {
            menu_category::add_item(&mut conn, 10, item, 1).await.unwrap();
        }
        membership::append(&mut conn, 1, 10).await.unwrap();
    }

    async fn api() -> ConfigApi {
        let pool = test_pool().await;
        seed(&pool).await;
        ConfigApi::new(pool.clone(), Arc::new(catalog()), Arc::new(SqliteOverrideStore::new(pool)))
    }

    #[tokio::test]
    async fn test_get_config_defaults() {
        let api = api().await;
        let config = api.get_config(1).await.unwrap();
        assert_eq!(config.items.len(), 2);
        assert!(config.items.iter().all(|i| i.enabled && !i.has_override));
        assert_eq!(config.items[0].effective_price, 1000);
        assert_eq!(config.items[0].sync_status, SyncStatus::Unsynced);
        assert_eq!(
            config.summary,
            ConfigSummary {
                total: 2,
                enabled: 2,
                disabled: 0,
                custom_price: 0
            }
        );
    }

    #[tokio::test]
    async fn test_save_then_get() {
        let api = api().await;
        let result = api
            .save_config(
                1,
                vec![
                    ItemConfigInput {
                        pos_item_id: 1,
                        enabled: true,
                        price_override: Some(1200),
                    },
                    ItemConfigInput {
                        pos_item_id: 2,
                        enabled: false,
                        price_override: None,
                    },
                ],
            )
            .await
            .unwrap();
        assert_eq!((result.created_count, result.updated_count), (2, 0));

        let config = api.get_config(1).await.unwrap();
        assert_eq!(config.items[0].effective_price, 1200);
        assert!(config.items[0].has_override);
        assert!(!config.items[1].enabled);
        assert_eq!(config.summary.disabled, 1);
        assert_eq!(config.summary.custom_price, 1);

        // Full replacement clears the price back to base
        let result = api
            .save_config(
                1,
                vec![ItemConfigInput {
                    pos_item_id: 1,
                    enabled: true,
                    price_override: None,
                }],
            )
            .await
            .unwrap();
        assert_eq!(result.updated_count, 1);
        assert_eq!(api.get_config(1).await.unwrap().items[0].effective_price, 1000);
    }

    #[tokio::test]
    async fn test_negative_price_rejects_whole_request() {
        let api = api().await;
        let err = api
            .save_config(
                1,
                vec![
                    ItemConfigInput {
                        pos_item_id: 1,
                        enabled: false,
                        price_override: None,
                    },
                    ItemConfigInput {
                        pos_item_id: 2,
                        enabled: true,
                        price_override: Some(-5),
                    },
                ],
            )
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::ValueOutOfRange);
        assert!(api.get_config(1).await.unwrap().items.iter().all(|i| !i.has_override));
    }

    #[tokio::test]
    async fn test_partial_store_failure_is_reported() {
        let pool = test_pool().await;
        seed(&pool).await;
        let bad = CompositeKey::item(2, 1);
        let api = ConfigApi::new(
            pool.clone(),
            Arc::new(catalog()),
            Arc::new(FlakyStore::new(SqliteOverrideStore::new(pool), [bad])),
        );
        let result = api
            .save_config(
                1,
                vec![
                    ItemConfigInput {
                        pos_item_id: 1,
                        enabled: false,
                        price_override: None,
                    },
                    ItemConfigInput {
                        pos_item_id: 2,
                        enabled: false,
                        price_override: None,
                    },
                ],
            )
            .await
            .unwrap();
        assert_eq!(result.created_count, 1);
        assert!(result.is_partial());
        assert_eq!(result.failures[0].key, bad);
    }

    #[tokio::test]
    async fn test_modifier_config_round_trip() {
        let api = api().await;
        let view = api.get_modifier_config(1, 1).await.unwrap();
        assert_eq!(view.modifiers.len(), 1);
        assert_eq!(view.modifiers[0].group_name.as_deref(), Some("Extras"));
        assert_eq!(view.modifiers[0].effective_price, 100);

        let result = api
            .save_modifier_config(
                vec![ModifierConfigInput {
                    pos_item_id: 1,
                    modifier_group_id: 7,
                    modifier_option_id: 71,
                    enabled: true,
                    price_override: Some(0),
                }],
                1,
            )
            .await
            .unwrap();
        assert_eq!(result.created_count, 1);

        let view = api.get_modifier_config(1, 1).await.unwrap();
        assert_eq!(view.modifiers[0].effective_price, 0);
        assert_eq!(view.summary.custom_price, 1);
        // Item config is a separate key space
        assert!(api.get_config(1).await.unwrap().items.iter().all(|i| !i.has_override));
    }

    #[tokio::test]
    async fn test_unknown_menu_group() {
        let api = api().await;
        assert_eq!(
            api.save_config(9, vec![]).await.unwrap_err().code(),
            ErrorCode::MenuGroupNotFound
        );
        assert_eq!(
            api.get_modifier_config(1, 9).await.unwrap_err().code(),
            ErrorCode::MenuGroupNotFound
        );
        assert_eq!(api.get_config(9).await.unwrap_err().code(), ErrorCode::MenuGroupNotFound);
    }
}
