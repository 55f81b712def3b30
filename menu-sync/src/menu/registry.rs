//! Category Registry & Membership Manager
//!
//! The registry holds every category the engine knows about:
//!
//! - **system** categories mirror a POS category (`source_category_id`)
//!   and are never hard-deleted here, only unlinked from menus
//! - **custom** categories are created by operators and hard-deleted when
//!   removed from a menu
//!
//! Memberships place registry categories into menu groups in a dense,
//! caller-controlled order.

use serde::Serialize;
use shared::ErrorCode;
use shared::models::{
    CategoryMembership, CategoryOrigin, CustomCategoryCreate, ItemFilter, MembershipDetail,
    MenuCategory,
};
use shared::util::{now_millis, snowflake_id};
use sqlx::SqlitePool;
use std::collections::HashSet;
use std::sync::Arc;

use super::error::{MenuError, MenuResult};
use crate::catalog::CatalogSource;
use crate::db::repository::{RepoError, membership, menu_category, menu_group};

/// Result of a POS category import
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub created: usize,
    pub renamed: usize,
    pub unchanged: usize,
}

/// Result of removing a category from a menu
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RemovalOutcome {
    pub menu_group_id: i64,
    pub category_id: i64,
    /// True when the category itself was deleted (custom origin)
    pub category_deleted: bool,
}

#[derive(Clone)]
pub struct CategoryRegistry {
    pool: SqlitePool,
    catalog: Arc<dyn CatalogSource>,
    tenant_id: String,
}

impl CategoryRegistry {
    pub fn new(pool: SqlitePool, catalog: Arc<dyn CatalogSource>, tenant_id: impl Into<String>) -> Self {
        Self {
            pool,
            catalog,
            tenant_id: tenant_id.into(),
        }
    }

    /// Every registry category, system first
    pub async fn load_registry(&self) -> MenuResult<Vec<MenuCategory>> {
        Ok(menu_category::find_all(&self.pool).await?)
    }

    pub async fn get(&self, category_id: i64) -> MenuResult<MenuCategory> {
        menu_category::find_by_id(&self.pool, category_id)
            .await?
            .ok_or_else(|| MenuError::category_not_found(category_id))
    }

    /// Mirror POS categories into the registry
    ///
    /// Matches on `source_category_id` only. A POS rename renames the linked
    /// registry row; a custom category with the same name is left alone.
    pub async fn import_system_categories(&self) -> MenuResult<ImportSummary> {
        let pos_categories = self.catalog.list_categories(&self.tenant_id).await?;
        let mut summary = ImportSummary::default();
        let now = now_millis();

        for pos in pos_categories {
            match menu_category::find_by_source(&self.pool, pos.id).await? {
                Some(existing) if existing.name == pos.name => summary.unchanged += 1,
                Some(existing) => {
                    menu_category::rename(&self.pool, existing.id, &pos.name, now).await?;
                    tracing::info!(
                        category_id = existing.id,
                        from = %existing.name,
                        to = %pos.name,
                        "System category renamed"
                    );
                    summary.renamed += 1;
                }
                None => {
                    let category = MenuCategory {
                        id: snowflake_id(),
                        name: pos.name,
                        origin: CategoryOrigin::System,
                        source_category_id: Some(pos.id),
                        created_at: now,
                        updated_at: now,
                    };
                    let mut conn = self.pool.acquire().await.map_err(RepoError::from)?;
                    menu_category::insert(&mut conn, &category).await?;
                    summary.created += 1;
                }
            }
        }

        tracing::info!(
            tenant_id = %self.tenant_id,
            created = summary.created,
            renamed = summary.renamed,
            unchanged = summary.unchanged,
            "System categories imported"
        );
        Ok(summary)
    }

    /// Registry categories not yet in the menu group
    pub async fn available_to_add(&self, menu_group_id: i64) -> MenuResult<Vec<MenuCategory>> {
        self.require_menu_group(menu_group_id).await?;
        Ok(membership::available_for_menu(&self.pool, menu_group_id).await?)
    }

    /// Create a custom category, optionally seeded with items
    pub async fn create_custom_category(&self, data: CustomCategoryCreate) -> MenuResult<MenuCategory> {
        let name = data.name.trim();
        if name.is_empty() {
            return Err(MenuError::validation(
                ErrorCode::CategoryNameEmpty,
                "Category name must not be empty",
            ));
        }
        if let Some(existing) = menu_category::find_by_name(&self.pool, name).await? {
            return Err(MenuError::Duplicate(
                ErrorCode::CategoryNameExists,
                format!("Category '{}' already exists", existing.name),
            ));
        }

        let now = now_millis();
        let category = MenuCategory {
            id: snowflake_id(),
            name: name.to_string(),
            origin: CategoryOrigin::Custom,
            source_category_id: None,
            created_at: now,
            updated_at: now,
        };

        let mut tx = self.pool.begin().await.map_err(RepoError::from)?;
        menu_category::insert(&mut tx, &category).await?;
        for pos_item_id in &data.item_ids {
            menu_category::add_item(&mut tx, category.id, *pos_item_id, now).await?;
        }
        tx.commit().await.map_err(RepoError::from)?;

        tracing::info!(category_id = category.id, name = %category.name, items = data.item_ids.len(), "Custom category created");
        Ok(category)
    }

    /// Item ids placed in a category
    pub async fn items(&self, category_id: i64) -> MenuResult<Vec<i64>> {
        self.get(category_id).await?;
        Ok(menu_category::item_ids(&self.pool, category_id).await?)
    }

    /// Place a catalog item in a category; returns false if it was already there
    pub async fn assign_item(&self, category_id: i64, pos_item_id: i64) -> MenuResult<bool> {
        self.get(category_id).await?;
        let mut conn = self.pool.acquire().await.map_err(RepoError::from)?;
        Ok(menu_category::add_item(&mut conn, category_id, pos_item_id, now_millis()).await?)
    }

    /// Returns false if the item was not in the category
    pub async fn unassign_item(&self, category_id: i64, pos_item_id: i64) -> MenuResult<bool> {
        self.get(category_id).await?;
        Ok(menu_category::remove_item(&self.pool, category_id, pos_item_id).await?)
    }

    /// Append a category to the end of a menu's order
    ///
    /// A system category also picks up the catalog items of its POS
    /// category. No override is created for them.
    pub async fn add_category_to_menu(
        &self,
        menu_group_id: i64,
        category_id: i64,
    ) -> MenuResult<CategoryMembership> {
        self.require_menu_group(menu_group_id).await?;
        let category = self.get(category_id).await?;
        if membership::find(&self.pool, menu_group_id, category_id).await?.is_some() {
            return Err(already_in_menu(menu_group_id, category_id));
        }

        // Fetched before the transaction opens so a catalog failure changes nothing
        let catalog_items = match category.source_category_id {
            Some(source) => self.catalog.list_items(&ItemFilter::category(source)).await?,
            None => Vec::new(),
        };

        let now = now_millis();
        let mut tx = self.pool.begin().await.map_err(RepoError::from)?;
        let created = membership::append(&mut tx, menu_group_id, category_id)
            .await
            .map_err(|e| match e {
                RepoError::Duplicate(_) => already_in_menu(menu_group_id, category_id),
                other => other.into(),
            })?;
        let mut propagated = 0;
        for item in &catalog_items {
            if menu_category::add_item(&mut tx, category_id, item.pos_item_id, now).await? {
                propagated += 1;
            }
        }
        tx.commit().await.map_err(RepoError::from)?;

        tracing::info!(
            menu_group_id,
            category_id,
            origin = %category.origin,
            sort_order = created.sort_order,
            propagated,
            "Category added to menu"
        );
        Ok(created)
    }

    /// Unlink a category from a menu
    ///
    /// Custom categories are deleted outright (item associations and every
    /// other membership go with them). The caller states the origin it
    /// expects; a mismatch is rejected so a system category is never
    /// deleted by accident.
    pub async fn remove_category_from_menu(
        &self,
        menu_group_id: i64,
        category_id: i64,
        is_system_origin: bool,
    ) -> MenuResult<RemovalOutcome> {
        let category = self.get(category_id).await?;
        if category.is_system() != is_system_origin {
            return Err(MenuError::validation(
                ErrorCode::CategoryOriginMismatch,
                format!(
                    "Category {category_id} is {}, request expected {}",
                    category.origin,
                    if is_system_origin { "system" } else { "custom" }
                ),
            ));
        }

        let mut tx = self.pool.begin().await.map_err(RepoError::from)?;
        if !membership::delete(&mut tx, menu_group_id, category_id).await? {
            return Err(MenuError::NotFound(
                ErrorCode::CategoryNotInMenu,
                format!("Category {category_id} is not in menu group {menu_group_id}"),
            ));
        }
        let category_deleted = if category.is_system() {
            false
        } else {
            menu_category::delete(&mut tx, category_id).await?
        };
        tx.commit().await.map_err(RepoError::from)?;

        tracing::info!(menu_group_id, category_id, category_deleted, "Category removed from menu");
        Ok(RemovalOutcome {
            menu_group_id,
            category_id,
            category_deleted,
        })
    }

    /// Rewrite the membership order of a menu
    ///
    /// `category_ids` must be exactly the current membership set, each id
    /// once. Applied in one transaction.
    pub async fn reorder(&self, menu_group_id: i64, category_ids: &[i64]) -> MenuResult<Vec<MembershipDetail>> {
        self.require_menu_group(menu_group_id).await?;
        let current: HashSet<i64> = membership::category_ids(&self.pool, menu_group_id)
            .await?
            .into_iter()
            .collect();
        let requested: HashSet<i64> = category_ids.iter().copied().collect();

        if requested.len() != category_ids.len() {
            return Err(MenuError::InvariantViolation(
                ErrorCode::MembershipOrderMismatch,
                "Category order contains duplicate ids".to_string(),
            ));
        }
        if requested != current {
            let mut missing: Vec<_> = current.difference(&requested).copied().collect();
            let mut unknown: Vec<_> = requested.difference(&current).copied().collect();
            missing.sort_unstable();
            unknown.sort_unstable();
            return Err(MenuError::InvariantViolation(
                ErrorCode::MembershipOrderMismatch,
                format!(
                    "Category order must list every membership exactly once (missing: {missing:?}, not in menu: {unknown:?})"
                ),
            ));
        }

        membership::reorder(&self.pool, menu_group_id, category_ids).await?;
        self.memberships(menu_group_id).await
    }

    /// Ordered memberships with category data
    pub async fn memberships(&self, menu_group_id: i64) -> MenuResult<Vec<MembershipDetail>> {
        Ok(membership::list_for_menu(&self.pool, menu_group_id).await?)
    }

    async fn require_menu_group(&self, menu_group_id: i64) -> MenuResult<()> {
        if !menu_group::exists(&self.pool, menu_group_id).await? {
            return Err(MenuError::menu_group_not_found(menu_group_id));
        }
        Ok(())
    }
}

fn already_in_menu(menu_group_id: i64, category_id: i64) -> MenuError {
    MenuError::Duplicate(
        ErrorCode::CategoryAlreadyInMenu,
        format!("Category {category_id} is already in menu group {menu_group_id}"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::StaticCatalog;
    use crate::catalog::test_support::FlakyCatalog;
    use crate::db::repository::config_override;
    use crate::db::repository::test_support::{seed_menu_group, test_pool};
    use crate::menu::{ConfigApi, SqliteOverrideStore};

    fn catalog() -> StaticCatalog {
        StaticCatalog::default()
            .with_category(100, "Mains")
            .with_category(200, "Drinks")
            .with_item(1, "Burger", 1000, 100)
            .with_item(2, "Pasta", 1200, 100)
            .with_item(3, "Cola", 300, 200)
    }

    async fn registry_with(catalog: impl CatalogSource + 'static) -> (CategoryRegistry, SqlitePool) {
        let pool = test_pool().await;
        seed_menu_group(&pool, 1, "Lunch").await;
        seed_menu_group(&pool, 2, "Dinner").await;
        (CategoryRegistry::new(pool.clone(), Arc::new(catalog), "tenant"), pool)
    }

    async fn system_category(registry: &CategoryRegistry, source: i64) -> MenuCategory {
        registry
            .load_registry()
            .await
            .unwrap()
            .into_iter()
            .find(|c| c.source_category_id == Some(source))
            .unwrap()
    }

    fn custom(name: &str) -> CustomCategoryCreate {
        CustomCategoryCreate {
            name: name.to_string(),
            item_ids: vec![],
        }
    }

    #[tokio::test]
    async fn test_import_is_idempotent_and_follows_renames() {
        let (registry, pool) = registry_with(catalog()).await;
        let first = registry.import_system_categories().await.unwrap();
        assert_eq!(first.created, 2);
        let again = registry.import_system_categories().await.unwrap();
        assert_eq!(again, ImportSummary { created: 0, renamed: 0, unchanged: 2 });

        let mains = system_category(&registry, 100).await;
        let renamed = CategoryRegistry::new(
            pool,
            Arc::new(StaticCatalog::default().with_category(100, "Main Dishes")),
            "tenant",
        );
        let summary = renamed.import_system_categories().await.unwrap();
        assert_eq!(summary.renamed, 1);
        let after = renamed.get(mains.id).await.unwrap();
        assert_eq!(after.name, "Main Dishes");
        assert_eq!(after.origin, CategoryOrigin::System);
    }

    #[tokio::test]
    async fn test_custom_name_never_reclassifies() {
        let (registry, _pool) = registry_with(catalog()).await;
        let specials = registry.create_custom_category(custom("Specials")).await.unwrap();

        // A POS category that happens to share the custom name
        let registry = CategoryRegistry::new(
            registry.pool.clone(),
            Arc::new(catalog().with_category(300, "Specials")),
            "tenant",
        );
        registry.import_system_categories().await.unwrap();

        let still_custom = registry.get(specials.id).await.unwrap();
        assert_eq!(still_custom.origin, CategoryOrigin::Custom);
        assert_eq!(still_custom.source_category_id, None);
        let linked = system_category(&registry, 300).await;
        assert_ne!(linked.id, specials.id);
    }

    #[tokio::test]
    async fn test_create_custom_category_validation() {
        let (registry, _pool) = registry_with(catalog()).await;
        registry.import_system_categories().await.unwrap();

        let err = registry.create_custom_category(custom("   ")).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::CategoryNameEmpty);

        // Case-insensitive against system names too
        let err = registry.create_custom_category(custom("mains")).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::CategoryNameExists);

        let created = registry
            .create_custom_category(CustomCategoryCreate {
                name: " Chef's picks ".into(),
                item_ids: vec![2, 1],
            })
            .await
            .unwrap();
        assert_eq!(created.name, "Chef's picks");
        assert_eq!(registry.items(created.id).await.unwrap(), vec![1, 2]);
        assert_eq!(registry.load_registry().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_assign_and_unassign_items() {
        let (registry, _pool) = registry_with(catalog()).await;
        let specials = registry.create_custom_category(custom("Specials")).await.unwrap();
        assert!(registry.assign_item(specials.id, 3).await.unwrap());
        assert!(!registry.assign_item(specials.id, 3).await.unwrap());
        assert!(registry.unassign_item(specials.id, 3).await.unwrap());
        assert!(!registry.unassign_item(specials.id, 3).await.unwrap());
        assert!(matches!(
            registry.assign_item(999, 1).await,
            Err(MenuError::NotFound(ErrorCode::CategoryNotFound, _))
        ));
    }

    #[tokio::test]
    async fn test_add_system_category_propagates_items() {
        let (registry, _pool) = registry_with(catalog()).await;
        registry.import_system_categories().await.unwrap();
        let mains = system_category(&registry, 100).await;
        let drinks = system_category(&registry, 200).await;

        let first = registry.add_category_to_menu(1, mains.id).await.unwrap();
        let second = registry.add_category_to_menu(1, drinks.id).await.unwrap();
        assert_eq!((first.sort_order, second.sort_order), (0, 1));
        assert_eq!(registry.items(mains.id).await.unwrap(), vec![1, 2]);

        let err = registry.add_category_to_menu(1, mains.id).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::CategoryAlreadyInMenu);

        let available = registry.available_to_add(1).await.unwrap();
        assert!(available.is_empty());
        assert_eq!(registry.available_to_add(2).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_add_system_category_writes_no_overrides() {
        let (registry, pool) = registry_with(catalog()).await;
        registry.import_system_categories().await.unwrap();
        let mains = system_category(&registry, 100).await;
        registry.add_category_to_menu(1, mains.id).await.unwrap();

        assert!(config_override::find_for_menu(&pool, 1).await.unwrap().is_empty());

        let api = ConfigApi::new(
            pool.clone(),
            Arc::new(catalog()),
            Arc::new(SqliteOverrideStore::new(pool)),
        );
        let config = api.get_config(1).await.unwrap();
        assert_eq!(config.items.len(), 2);
        assert!(config.items.iter().all(|i| i.enabled && !i.has_override));
    }

    #[tokio::test]
    async fn test_add_category_catalog_failure_changes_nothing() {
        let (registry, pool) = registry_with(catalog()).await;
        registry.import_system_categories().await.unwrap();
        let mains = system_category(&registry, 100).await;

        let down = CategoryRegistry::new(pool, Arc::new(FlakyCatalog::down()), "tenant");
        let err = down.add_category_to_menu(1, mains.id).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::CatalogUnavailable);
        assert!(down.memberships(1).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_remove_custom_category_deletes_everywhere() {
        let (registry, _pool) = registry_with(catalog()).await;
        let specials = registry
            .create_custom_category(CustomCategoryCreate {
                name: "Specials".into(),
                item_ids: vec![1],
            })
            .await
            .unwrap();
        registry.add_category_to_menu(1, specials.id).await.unwrap();
        registry.add_category_to_menu(2, specials.id).await.unwrap();

        let outcome = registry.remove_category_from_menu(1, specials.id, false).await.unwrap();
        assert!(outcome.category_deleted);
        assert!(registry.memberships(2).await.unwrap().is_empty());
        assert!(matches!(registry.get(specials.id).await, Err(MenuError::NotFound(..))));
    }

    #[tokio::test]
    async fn test_remove_system_category_only_unlinks() {
        let (registry, _pool) = registry_with(catalog()).await;
        registry.import_system_categories().await.unwrap();
        let mains = system_category(&registry, 100).await;
        registry.add_category_to_menu(1, mains.id).await.unwrap();
        registry.add_category_to_menu(2, mains.id).await.unwrap();

        // Origin mismatch is rejected and changes nothing
        let err = registry.remove_category_from_menu(1, mains.id, false).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::CategoryOriginMismatch);
        assert_eq!(registry.memberships(1).await.unwrap().len(), 1);

        let outcome = registry.remove_category_from_menu(1, mains.id, true).await.unwrap();
        assert!(!outcome.category_deleted);
        assert!(registry.memberships(1).await.unwrap().is_empty());
        assert_eq!(registry.memberships(2).await.unwrap().len(), 1);
        assert_eq!(registry.get(mains.id).await.unwrap().origin, CategoryOrigin::System);

        let err = registry.remove_category_from_menu(1, mains.id, true).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::CategoryNotInMenu);
    }

    #[tokio::test]
    async fn test_reorder_requires_exact_set() {
        let (registry, _pool) = registry_with(catalog()).await;
        let mut ids = Vec::new();
        for name in ["A", "B", "C"] {
            let c = registry.create_custom_category(custom(name)).await.unwrap();
            registry.add_category_to_menu(1, c.id).await.unwrap();
            ids.push(c.id);
        }
        let (a, b, c) = (ids[0], ids[1], ids[2]);

        for bad in [vec![a, b], vec![a, b, c, c], vec![a, b, 999], vec![a, a, b]] {
            let err = registry.reorder(1, &bad).await.unwrap_err();
            assert!(matches!(err, MenuError::InvariantViolation(ErrorCode::MembershipOrderMismatch, _)));
        }
        let unchanged: Vec<_> = registry.memberships(1).await.unwrap().iter().map(|m| m.category.id).collect();
        assert_eq!(unchanged, vec![a, b, c]);

        let reordered = registry.reorder(1, &[c, a, b]).await.unwrap();
        let order: Vec<_> = reordered.iter().map(|m| (m.category.id, m.sort_order)).collect();
        assert_eq!(order, vec![(c, 0), (a, 1), (b, 2)]);
    }

    #[tokio::test]
    async fn test_unknown_menu_group() {
        let (registry, _pool) = registry_with(catalog()).await;
        let c = registry.create_custom_category(custom("A")).await.unwrap();
        assert!(matches!(
            registry.add_category_to_menu(42, c.id).await,
            Err(MenuError::NotFound(ErrorCode::MenuGroupNotFound, _))
        ));
        assert!(registry.available_to_add(42).await.is_err());
    }
}
