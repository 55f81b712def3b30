//! Sync Orchestrator
//!
//! Builds the full menu document of a menu group from memberships,
//! category items, catalog data and committed overrides, pushes it to the
//! platform, and records the outcome per entity.
//!
//! Build order:
//!
//! ```text
//! memberships (sort order)
//!   → category items
//!     → skip disabled items
//!     → effective price
//!     → modifier options (bounded fan-out, enabled only, own effective price)
//! → service availability
//! ```

use serde::Serialize;
use shared::ErrorCode;
use shared::models::{CompositeKey, EntityRef, SyncRecord, SyncStatus};
use shared::platform::{
    PlatformCategory, PlatformItem, PlatformMenu, PlatformMenuPayload,
    PlatformModifierGroup, PlatformModifierOption, SyncResult,
};
use shared::util::now_millis;
use sqlx::SqlitePool;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use super::error::{MenuError, MenuResult};
use super::store::OverrideStore;
use super::view::{MenuView, OverrideIndex, load_modifiers};
use crate::catalog::CatalogSource;
use crate::db::repository::{menu_group, sync_record};
use crate::platform::PlatformAdapter;

/// Counters gathered while building a payload
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BuildStats {
    pub item_count: usize,
    pub category_count: usize,
    pub skipped_count: usize,
    pub custom_price_count: usize,
    pub modifier_option_count: usize,
    /// Every item and modifier option placed in the payload
    #[serde(skip)]
    pub entities: Vec<EntityRef>,
}

#[derive(Clone)]
pub struct SyncOrchestrator {
    pool: SqlitePool,
    catalog: Arc<dyn CatalogSource>,
    platform: Arc<dyn PlatformAdapter>,
    store: Arc<dyn OverrideStore>,
    modifier_concurrency: usize,
}

impl SyncOrchestrator {
    pub fn new(
        pool: SqlitePool,
        catalog: Arc<dyn CatalogSource>,
        platform: Arc<dyn PlatformAdapter>,
        store: Arc<dyn OverrideStore>,
        modifier_concurrency: usize,
    ) -> Self {
        Self {
            pool,
            catalog,
            platform,
            store,
            modifier_concurrency,
        }
    }

    /// Assemble the document for a menu group without sending it
    pub async fn build_payload(&self, menu_group_id: i64) -> MenuResult<(PlatformMenuPayload, BuildStats)> {
        let view = MenuView::load(&self.pool, self.catalog.as_ref(), menu_group_id).await?;
        let overrides = OverrideIndex::new(self.store.list_for_menu(menu_group_id).await?);
        let mut stats = BuildStats::default();

        // Items: enablement and effective price
        let mut items = Vec::new();
        for item in &view.items {
            let key = EntityRef::Item {
                item_id: item.pos_item_id,
            }
            .in_menu(menu_group_id);
            if !overrides.enabled(&key) {
                stats.skipped_count += 1;
                continue;
            }
            let price = overrides.effective_price(&key, item.base_price);
            if price != item.base_price {
                stats.custom_price_count += 1;
            }
            items.push(PlatformItem {
                id: item.pos_item_id,
                title: item.name.clone(),
                price,
                modifier_group_ids: Vec::new(),
            });
            stats.entities.push(key.entity);
        }

        // Modifier options of the enabled items
        let item_ids: Vec<i64> = items.iter().map(|i| i.id).collect();
        let mut modifiers = load_modifiers(self.catalog.as_ref(), &item_ids, self.modifier_concurrency).await;
        let mut modifier_groups = Vec::new();
        for item in &mut items {
            let options = modifiers.remove(&item.id).unwrap_or_default();
            let mut groups: Vec<PlatformModifierGroup> = Vec::new();
            for option in options {
                let entity = EntityRef::ModifierOption {
                    item_id: option.pos_item_id,
                    modifier_group_id: option.modifier_group_id,
                    modifier_option_id: option.modifier_option_id,
                };
                let key = entity.in_menu(menu_group_id);
                if !overrides.enabled(&key) {
                    continue;
                }
                let platform_option = PlatformModifierOption {
                    modifier_option_id: option.modifier_option_id,
                    title: option.name,
                    price: overrides.effective_price(&key, option.base_price),
                };
                match groups
                    .iter_mut()
                    .find(|g| g.modifier_group_id == option.modifier_group_id)
                {
                    Some(group) => group.options.push(platform_option),
                    None => groups.push(PlatformModifierGroup {
                        item_id: item.id,
                        modifier_group_id: option.modifier_group_id,
                        title: option
                            .group_name
                            .unwrap_or_else(|| format!("Modifier group {}", option.modifier_group_id)),
                        options: vec![platform_option],
                    }),
                }
                stats.modifier_option_count += 1;
                stats.entities.push(entity);
            }
            item.modifier_group_ids = groups.iter().map(|g| g.modifier_group_id).collect();
            modifier_groups.extend(groups);
        }

        // Categories in membership order; empty ones are still sent
        let enabled: HashSet<i64> = items.iter().map(|i| i.id).collect();
        let categories: Vec<PlatformCategory> = view
            .categories
            .iter()
            .map(|c| PlatformCategory {
                id: c.category.id,
                title: c.category.name.clone(),
                item_ids: c.item_ids.iter().copied().filter(|id| enabled.contains(id)).collect(),
            })
            .collect();

        stats.item_count = items.len();
        stats.category_count = categories.len();

        let payload = PlatformMenuPayload {
            menus: vec![PlatformMenu {
                id: view.menu_group.id,
                title: view.menu_group.name.clone(),
                service_availability: view.menu_group.service_availability.clone(),
                category_ids: categories.iter().map(|c| c.id).collect(),
            }],
            categories,
            items,
            modifier_groups,
        };

        tracing::debug!(
            menu_group_id,
            items = stats.item_count,
            categories = stats.category_count,
            skipped = stats.skipped_count,
            modifier_options = stats.modifier_option_count,
            "Menu payload built"
        );
        Ok((payload, stats))
    }

    /// Push a built payload and record the outcome of every entity
    ///
    /// An adapter failure is returned as a single error and records nothing.
    pub async fn submit(
        &self,
        menu_group_id: i64,
        payload: &PlatformMenuPayload,
        stats: BuildStats,
    ) -> MenuResult<SyncResult> {
        let response = self.platform.push_menu(menu_group_id, payload).await?;
        let synced_at = now_millis();

        let mut entity_errors: HashMap<EntityRef, String> = response
            .entity_errors
            .iter()
            .map(|e| (e.entity, e.message.clone()))
            .collect();
        // A refusal without entity detail fails every entity
        let blanket_error = (!response.success && entity_errors.is_empty()).then(|| {
            if response.message.is_empty() {
                "Rejected by platform".to_string()
            } else {
                response.message.clone()
            }
        });

        let mut failed_writes = 0;
        for entity in &stats.entities {
            let error = entity_errors.remove(entity).or_else(|| blanket_error.clone());
            let record = SyncRecord {
                key: entity.in_menu(menu_group_id),
                status: if error.is_some() {
                    SyncStatus::Error
                } else {
                    SyncStatus::Success
                },
                error_detail: error,
                last_synced_at: Some(synced_at),
            };
            if let Err(e) = sync_record::upsert(&self.pool, &record).await {
                failed_writes += 1;
                tracing::warn!(key = %record.key, error = %e, "Failed to write sync record");
            }
        }
        if !entity_errors.is_empty() {
            tracing::warn!(
                menu_group_id,
                count = entity_errors.len(),
                "Platform reported errors for entities not in the payload"
            );
        }
        // The accepted document replaced the platform copy; anything left out is gone
        if response.success {
            let current: HashSet<CompositeKey> =
                stats.entities.iter().map(|e| e.in_menu(menu_group_id)).collect();
            match sync_record::reset_missing(&self.pool, menu_group_id, &current).await {
                Ok(0) => {}
                Ok(reset) => tracing::debug!(menu_group_id, reset, "Stale sync records reset"),
                Err(e) => {
                    failed_writes += 1;
                    tracing::warn!(menu_group_id, error = %e, "Failed to reset stale sync records");
                }
            }
        }

        let success = response.success && response.entity_errors.is_empty();
        let result = SyncResult {
            menu_group_id,
            success,
            message: response.message,
            item_count: stats.item_count,
            category_count: stats.category_count,
            skipped_count: stats.skipped_count,
            custom_price_count: stats.custom_price_count,
            modifier_option_count: stats.modifier_option_count,
            synced_at,
            errors: response.entity_errors,
        };

        if success {
            tracing::info!(
                menu_group_id,
                items = result.item_count,
                categories = result.category_count,
                failed_writes,
                "Menu synced"
            );
        } else {
            tracing::warn!(
                menu_group_id,
                errors = result.errors.len(),
                message = %result.message,
                failed_writes,
                "Menu sync finished with errors"
            );
        }
        Ok(result)
    }

    /// Build and push the menu of one group
    pub async fn sync_menu_group(&self, menu_group_id: i64) -> MenuResult<SyncResult> {
        self.require_menu_group(menu_group_id).await?;
        let (payload, stats) = self.build_payload(menu_group_id).await?;
        self.submit(menu_group_id, &payload, stats).await
    }

    /// Replace the platform's copy with an empty document
    ///
    /// There is no delete endpoint; an empty push is how a menu is cleared.
    /// Local sync records go back to `unsynced` once the platform accepts it.
    pub async fn clear(&self, menu_group_id: i64) -> MenuResult<SyncResult> {
        self.require_menu_group(menu_group_id).await?;
        let response = self
            .platform
            .push_menu(menu_group_id, &PlatformMenuPayload::empty())
            .await?;
        if response.success {
            let reset = sync_record::reset_for_menu(&self.pool, menu_group_id).await?;
            tracing::info!(menu_group_id, reset, "Menu cleared on platform");
        } else {
            tracing::warn!(
                menu_group_id,
                message = %response.message,
                "Platform refused the clear, sync records kept"
            );
        }

        Ok(SyncResult {
            menu_group_id,
            success: response.success,
            message: response.message,
            synced_at: now_millis(),
            errors: response.entity_errors,
            ..Default::default()
        })
    }

    /// Sync records of a menu group
    pub async fn records(&self, menu_group_id: i64) -> MenuResult<Vec<SyncRecord>> {
        self.require_menu_group(menu_group_id).await?;
        Ok(sync_record::find_for_menu(&self.pool, menu_group_id).await?)
    }

    async fn require_menu_group(&self, menu_group_id: i64) -> MenuResult<()> {
        if menu_group_id <= 0 {
            return Err(MenuError::validation(
                ErrorCode::MenuGroupNotSelected,
                "Select a menu group first",
            ));
        }
        if !menu_group::exists(&self.pool, menu_group_id).await? {
            return Err(MenuError::menu_group_not_found(menu_group_id));
        }
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::platform::PlatformError;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use shared::platform::PlatformPushResponse;

    /// Platform stub that records every push and answers with a canned response
    #[derive(Default)]
    pub struct RecordingPlatform {
        pub pushes: Mutex<Vec<(i64, PlatformMenuPayload)>>,
        pub response: Mutex<Option<PlatformPushResponse>>,
        pub unreachable: bool,
    }

    impl RecordingPlatform {
        pub fn responding(response: PlatformPushResponse) -> Self {
            Self {
                response: Mutex::new(Some(response)),
                ..Default::default()
            }
        }

        pub fn unreachable() -> Self {
            Self {
                unreachable: true,
                ..Default::default()
            }
        }

        pub fn last_push(&self) -> Option<(i64, PlatformMenuPayload)> {
            self.pushes.lock().last().cloned()
        }
    }

    #[async_trait]
    impl PlatformAdapter for RecordingPlatform {
        async fn push_menu(
            &self,
            menu_group_id: i64,
            payload: &PlatformMenuPayload,
        ) -> Result<PlatformPushResponse, PlatformError> {
            if self.unreachable {
                return Err(PlatformError::Unreachable("connection refused".into()));
            }
            self.pushes.lock().push((menu_group_id, payload.clone()));
            Ok(self
                .response
                .lock()
                .clone()
                .unwrap_or_else(PlatformPushResponse::accepted))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::RecordingPlatform;
    use super::*;
    use crate::catalog::StaticCatalog;
    use crate::catalog::test_support::FlakyCatalog;
    use crate::db::repository::test_support::{seed_menu_group, test_pool};
    use crate::db::repository::{membership, menu_category};
    use crate::menu::store::SqliteOverrideStore;
    use shared::models::{
        CategoryOrigin, CompositeKey, MenuCategory, ModifierOption, OverridePatch,
    };
    use shared::platform::{PlatformEntityError, PlatformPushResponse};

    fn option(item_id: i64, group_id: i64, option_id: i64, price: i64) -> ModifierOption {
        ModifierOption {
            pos_item_id: item_id,
            modifier_group_id: group_id,
            modifier_option_id: option_id,
            name: format!("Option {option_id}"),
            base_price: price,
            group_name: Some(format!("Group {group_id}")),
        }
    }

    fn catalog() -> StaticCatalog {
        StaticCatalog::default()
            .with_item(1, "Burger", 1000, 5)
            .with_item(2, "Fries", 400, 5)
            .with_item(3, "Cola", 300, 6)
            .with_modifier(option(1, 7, 71, 0))
            .with_modifier(option(1, 7, 72, 150))
            .with_modifier(option(1, 8, 81, 50))
    }

    async fn seed_category(pool: &SqlitePool, id: i64, name: &str, items: &[i64]) {
        let mut conn = pool.acquire().await.unwrap();
        menu_category::insert(
            &mut conn,
            &MenuCategory {
                id,
                name: name.to_string(),
                origin: CategoryOrigin::Custom,
                source_category_id: None,
                created_at: 1,
                updated_at: 1,
            },
        )
        .await
        .unwrap();
        for item in items {
            menu_category::add_item(&mut conn, id, *item, 1).await.unwrap();
        }
        membership::append(&mut conn, 1, id).await.unwrap();
    }

    struct Fixture {
        pool: SqlitePool,
        store: Arc<SqliteOverrideStore>,
        platform: Arc<RecordingPlatform>,
        orchestrator: SyncOrchestrator,
    }

    async fn fixture_with(catalog: impl CatalogSource + 'static, platform: RecordingPlatform) -> Fixture {
        let pool = test_pool().await;
        seed_menu_group(&pool, 1, "Lunch").await;
        seed_category(&pool, 10, "Mains", &[1, 2]).await;
        seed_category(&pool, 20, "Drinks", &[3]).await;
        seed_category(&pool, 30, "Empty", &[]).await;
        let store = Arc::new(SqliteOverrideStore::new(pool.clone()));
        let platform = Arc::new(platform);
        let orchestrator = SyncOrchestrator::new(
            pool.clone(),
            Arc::new(catalog),
            platform.clone(),
            store.clone(),
            4,
        );
        Fixture {
            pool,
            store,
            platform,
            orchestrator,
        }
    }

    async fn fixture() -> Fixture {
        fixture_with(catalog(), RecordingPlatform::default()).await
    }

    #[tokio::test]
    async fn test_build_payload_structure() {
        let f = fixture().await;
        let (payload, stats) = f.orchestrator.build_payload(1).await.unwrap();

        assert_eq!(payload.menus.len(), 1);
        assert_eq!(payload.menus[0].category_ids, vec![10, 20, 30]);
        assert_eq!(payload.categories[0].item_ids, vec![1, 2]);
        assert!(payload.categories[2].item_ids.is_empty());
        assert_eq!(payload.items.len(), 3);
        assert_eq!(payload.items[0].modifier_group_ids, vec![7, 8]);
        assert_eq!(payload.modifier_groups.len(), 2);
        assert_eq!(payload.modifier_groups[0].title, "Group 7");
        assert_eq!(payload.modifier_groups[0].options.len(), 2);

        assert_eq!(stats.item_count, 3);
        assert_eq!(stats.category_count, 3);
        assert_eq!(stats.skipped_count, 0);
        assert_eq!(stats.custom_price_count, 0);
        assert_eq!(stats.modifier_option_count, 3);
        assert_eq!(stats.entities.len(), 6);
    }

    #[tokio::test]
    async fn test_disabled_items_and_options_are_excluded() {
        let f = fixture().await;
        f.store.upsert(CompositeKey::item(2, 1), OverridePatch::enabled(false)).await.unwrap();
        f.store.upsert(CompositeKey::item(1, 1), OverridePatch::price(Some(1100))).await.unwrap();
        f.store
            .upsert(CompositeKey::modifier(1, 7, 72, 1), OverridePatch::enabled(false))
            .await
            .unwrap();
        f.store
            .upsert(CompositeKey::modifier(1, 8, 81, 1), OverridePatch::price(Some(75)))
            .await
            .unwrap();

        let (payload, stats) = f.orchestrator.build_payload(1).await.unwrap();
        let ids: Vec<_> = payload.items.iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![1, 3]);
        assert_eq!(payload.categories[0].item_ids, vec![1]);
        assert_eq!(payload.items[0].price, 1100);
        assert_eq!(stats.skipped_count, 1);
        assert_eq!(stats.custom_price_count, 1);

        let group7 = &payload.modifier_groups[0];
        assert_eq!(group7.options.len(), 1);
        assert_eq!(group7.options[0].modifier_option_id, 71);
        assert_eq!(payload.modifier_groups[1].options[0].price, 75);
    }

    #[tokio::test]
    async fn test_modifier_failure_does_not_block_payload() {
        let f = fixture_with(
            FlakyCatalog::failing_modifiers(catalog(), [1]),
            RecordingPlatform::default(),
        )
        .await;
        let (payload, stats) = f.orchestrator.build_payload(1).await.unwrap();
        assert_eq!(payload.items.len(), 3);
        assert!(payload.modifier_groups.is_empty());
        assert!(payload.items[0].modifier_group_ids.is_empty());
        assert_eq!(stats.modifier_option_count, 0);
    }

    #[tokio::test]
    async fn test_sync_records_success_per_entity() {
        let f = fixture().await;
        let result = f.orchestrator.sync_menu_group(1).await.unwrap();
        assert!(result.success);
        assert_eq!(result.item_count, 3);
        assert_eq!(result.category_count, 3);

        let (menu_group_id, pushed) = f.platform.last_push().unwrap();
        assert_eq!(menu_group_id, 1);
        assert_eq!(pushed.items.len(), 3);

        let records = f.orchestrator.records(1).await.unwrap();
        assert_eq!(records.len(), 6);
        assert!(records.iter().all(|r| r.status == SyncStatus::Success));
    }

    #[tokio::test]
    async fn test_entity_errors_recorded_without_aborting_others() {
        let response = PlatformPushResponse {
            success: false,
            message: "1 entity rejected".into(),
            entity_errors: vec![PlatformEntityError {
                entity: EntityRef::Item { item_id: 2 },
                message: "price too low".into(),
            }],
        };
        let f = fixture_with(catalog(), RecordingPlatform::responding(response)).await;
        let result = f.orchestrator.sync_menu_group(1).await.unwrap();
        assert!(!result.success);
        assert_eq!(result.errors.len(), 1);

        let records = sync_record::find_for_menu(&f.pool, 1).await.unwrap();
        assert_eq!(records.len(), 6);
        let failed: Vec<_> = records.iter().filter(|r| r.status == SyncStatus::Error).collect();
        assert_eq!(failed.len(), 1);
        assert_eq!(failed[0].key, CompositeKey::item(2, 1));
        assert_eq!(failed[0].error_detail.as_deref(), Some("price too low"));
    }

    #[tokio::test]
    async fn test_blanket_rejection_marks_every_entity() {
        let response = PlatformPushResponse {
            success: false,
            message: "menu schema invalid".into(),
            entity_errors: vec![],
        };
        let f = fixture_with(catalog(), RecordingPlatform::responding(response)).await;
        let result = f.orchestrator.sync_menu_group(1).await.unwrap();
        assert!(!result.success);
        let records = sync_record::find_for_menu(&f.pool, 1).await.unwrap();
        assert!(records.iter().all(|r| r.status == SyncStatus::Error
            && r.error_detail.as_deref() == Some("menu schema invalid")));
    }

    #[tokio::test]
    async fn test_unreachable_platform_is_aggregate_error() {
        let f = fixture_with(catalog(), RecordingPlatform::unreachable()).await;
        let err = f.orchestrator.sync_menu_group(1).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::PlatformUnavailable);
        assert!(sync_record::find_for_menu(&f.pool, 1).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_menu_group_must_be_selected_and_exist() {
        let f = fixture().await;
        let err = f.orchestrator.sync_menu_group(0).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::MenuGroupNotSelected);
        let err = f.orchestrator.sync_menu_group(404).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::MenuGroupNotFound);
        assert!(f.platform.last_push().is_none());
    }

    #[tokio::test]
    async fn test_clear_pushes_empty_document_and_resets_records() {
        let f = fixture().await;
        f.orchestrator.sync_menu_group(1).await.unwrap();

        let result = f.orchestrator.clear(1).await.unwrap();
        assert!(result.success);
        let (_, pushed) = f.platform.last_push().unwrap();
        assert!(pushed.is_empty());

        let records = f.orchestrator.records(1).await.unwrap();
        assert_eq!(records.len(), 6);
        assert!(records.iter().all(|r| r.status == SyncStatus::Unsynced && r.error_detail.is_none()));
    }

    #[tokio::test]
    async fn test_resync_resets_entities_left_out_of_payload() {
        let f = fixture().await;
        f.orchestrator.sync_menu_group(1).await.unwrap();
        f.store.upsert(CompositeKey::item(2, 1), OverridePatch::enabled(false)).await.unwrap();
        f.store
            .upsert(CompositeKey::modifier(1, 7, 72, 1), OverridePatch::enabled(false))
            .await
            .unwrap();

        let result = f.orchestrator.sync_menu_group(1).await.unwrap();
        assert!(result.success);

        let records = f.orchestrator.records(1).await.unwrap();
        assert_eq!(records.len(), 6);
        for r in &records {
            let left_out = r.key == CompositeKey::item(2, 1) || r.key == CompositeKey::modifier(1, 7, 72, 1);
            let expected = if left_out { SyncStatus::Unsynced } else { SyncStatus::Success };
            assert_eq!(r.status, expected, "{}", r.key);
        }
    }

    #[tokio::test]
    async fn test_rejected_resync_keeps_records_of_left_out_entities() {
        let f = fixture().await;
        f.orchestrator.sync_menu_group(1).await.unwrap();
        f.store.upsert(CompositeKey::item(2, 1), OverridePatch::enabled(false)).await.unwrap();
        *f.platform.response.lock() = Some(PlatformPushResponse {
            success: false,
            message: "menu schema invalid".into(),
            entity_errors: vec![],
        });

        f.orchestrator.sync_menu_group(1).await.unwrap();

        let records = f.orchestrator.records(1).await.unwrap();
        let fries = records.iter().find(|r| r.key == CompositeKey::item(2, 1)).unwrap();
        assert_eq!(fries.status, SyncStatus::Success);
    }

    #[tokio::test]
    async fn test_refused_clear_keeps_records() {
        let f = fixture().await;
        f.orchestrator.sync_menu_group(1).await.unwrap();
        *f.platform.response.lock() = Some(PlatformPushResponse {
            success: false,
            message: "menu locked".into(),
            entity_errors: vec![],
        });

        let result = f.orchestrator.clear(1).await.unwrap();
        assert!(!result.success);
        assert_eq!(result.message, "menu locked");

        let records = f.orchestrator.records(1).await.unwrap();
        assert_eq!(records.len(), 6);
        assert!(records.iter().all(|r| r.status == SyncStatus::Success));
    }
}
