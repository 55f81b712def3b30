//! Menu view: what a menu group contains right now
//!
//! Memberships in order, the items placed in each category, and the
//! catalog data of those items. Shared by the configuration API, the bulk
//! adjustment and the sync orchestrator.

use futures::stream::{self, StreamExt};
use serde::Serialize;
use shared::models::{
    CatalogItem, CompositeKey, ConfigOverride, ItemFilter, MenuCategory, MenuGroup, ModifierOption,
};
use sqlx::SqlitePool;
use std::collections::{HashMap, HashSet};

use super::error::{MenuError, MenuResult};
use crate::catalog::CatalogSource;
use crate::db::repository::{membership, menu_category, menu_group};

#[derive(Debug, Clone, Serialize)]
pub struct ViewCategory {
    pub category: MenuCategory,
    pub sort_order: i32,
    /// Items present in the catalog, ascending id
    pub item_ids: Vec<i64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MenuView {
    pub menu_group: MenuGroup,
    pub categories: Vec<ViewCategory>,
    /// Each item once, in order of first appearance
    pub items: Vec<CatalogItem>,
}

impl MenuView {
    /// Assemble the view of a menu group
    ///
    /// Items still associated locally but gone from the catalog are left
    /// out. A catalog failure fails the whole load.
    pub async fn load(
        pool: &SqlitePool,
        catalog: &dyn CatalogSource,
        menu_group_id: i64,
    ) -> MenuResult<Self> {
        let menu_group = menu_group::find_by_id(pool, menu_group_id)
            .await?
            .ok_or_else(|| MenuError::menu_group_not_found(menu_group_id))?;

        let memberships = membership::list_for_menu(pool, menu_group_id).await?;
        let mut placed = Vec::with_capacity(memberships.len());
        let mut ordered_ids = Vec::new();
        let mut seen = HashSet::new();
        for m in memberships {
            let item_ids = menu_category::item_ids(pool, m.category.id).await?;
            for id in &item_ids {
                if seen.insert(*id) {
                    ordered_ids.push(*id);
                }
            }
            placed.push((m, item_ids));
        }

        let mut by_id: HashMap<i64, CatalogItem> = if ordered_ids.is_empty() {
            HashMap::new()
        } else {
            catalog
                .list_items(&ItemFilter::ids(ordered_ids.clone()))
                .await?
                .into_iter()
                .map(|item| (item.pos_item_id, item))
                .collect()
        };

        let missing = ordered_ids.iter().filter(|id| !by_id.contains_key(id)).count();
        if missing > 0 {
            tracing::debug!(menu_group_id, missing, "Placed items missing from catalog");
        }

        let categories = placed
            .into_iter()
            .map(|(m, item_ids)| ViewCategory {
                category: m.category,
                sort_order: m.sort_order,
                item_ids: item_ids.into_iter().filter(|id| by_id.contains_key(id)).collect(),
            })
            .collect();
        let items = ordered_ids
            .into_iter()
            .filter_map(|id| by_id.remove(&id))
            .collect();

        Ok(Self {
            menu_group,
            categories,
            items,
        })
    }

    pub fn menu_group_id(&self) -> i64 {
        self.menu_group.id
    }

    pub fn item(&self, pos_item_id: i64) -> Option<&CatalogItem> {
        self.items.iter().find(|i| i.pos_item_id == pos_item_id)
    }

    pub fn item_ids(&self) -> Vec<i64> {
        self.items.iter().map(|i| i.pos_item_id).collect()
    }
}

/// Modifier options of many items with at most `concurrency` requests in flight
///
/// One item's failure is logged and yields an empty list for that item;
/// the others are unaffected.
pub async fn load_modifiers(
    catalog: &dyn CatalogSource,
    item_ids: &[i64],
    concurrency: usize,
) -> HashMap<i64, Vec<ModifierOption>> {
    stream::iter(item_ids.iter().copied())
        .map(|item_id| async move {
            match catalog.list_modifier_options(item_id).await {
                Ok(options) => (item_id, options),
                Err(e) => {
                    tracing::warn!(item_id, error = %e, "Failed to load modifier options, treating as none");
                    (item_id, Vec::new())
                }
            }
        })
        .buffered(concurrency.max(1))
        .collect()
        .await
}

/// Committed overrides of one menu group, resolved with defaults
#[derive(Debug, Default)]
pub struct OverrideIndex(HashMap<CompositeKey, ConfigOverride>);

impl OverrideIndex {
    pub fn new(overrides: Vec<ConfigOverride>) -> Self {
        Self(overrides.into_iter().map(|o| (o.key, o)).collect())
    }

    pub fn get(&self, key: &CompositeKey) -> Option<&ConfigOverride> {
        self.0.get(key)
    }

    pub fn enabled(&self, key: &CompositeKey) -> bool {
        self.0.get(key).is_none_or(|o| o.enabled)
    }

    pub fn price_override(&self, key: &CompositeKey) -> Option<i64> {
        self.0.get(key).and_then(|o| o.price_override)
    }

    pub fn effective_price(&self, key: &CompositeKey, base_price: i64) -> i64 {
        self.price_override(key).unwrap_or(base_price)
    }
}
