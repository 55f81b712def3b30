//! In-memory catalog snapshot

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use shared::models::{CatalogItem, ItemFilter, ModifierOption, PosCategory};
use std::collections::HashMap;
use std::path::Path;

use super::{CatalogError, CatalogSource};

/// Catalog file layout (`CATALOG_FILE`)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogSnapshot {
    #[serde(default)]
    pub categories: Vec<PosCategory>,
    #[serde(default)]
    pub items: Vec<CatalogItem>,
    #[serde(default)]
    pub modifier_options: Vec<ModifierOption>,
}

/// Catalog served from memory
///
/// Ignores the tenant argument: a snapshot holds exactly one tenant.
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    categories: Vec<PosCategory>,
    items: Vec<CatalogItem>,
    modifiers: HashMap<i64, Vec<ModifierOption>>,
}

impl StaticCatalog {
    pub fn new(snapshot: CatalogSnapshot) -> Self {
        let mut modifiers: HashMap<i64, Vec<ModifierOption>> = HashMap::new();
        for option in snapshot.modifier_options {
            modifiers.entry(option.pos_item_id).or_default().push(option);
        }
        Self {
            categories: snapshot.categories,
            items: snapshot.items,
            modifiers,
        }
    }

    /// Load a JSON snapshot from disk
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| CatalogError::Snapshot(format!("{}: {e}", path.display())))?;
        let snapshot: CatalogSnapshot = serde_json::from_str(&raw)
            .map_err(|e| CatalogError::Snapshot(format!("{}: {e}", path.display())))?;
        tracing::info!(
            path = %path.display(),
            categories = snapshot.categories.len(),
            items = snapshot.items.len(),
            modifier_options = snapshot.modifier_options.len(),
            "Catalog snapshot loaded"
        );
        Ok(Self::new(snapshot))
    }

    pub fn with_category(mut self, id: i64, name: &str) -> Self {
        self.categories.push(PosCategory {
            id,
            name: name.to_string(),
        });
        self
    }

    pub fn with_item(mut self, pos_item_id: i64, name: &str, base_price: i64, category_id: i64) -> Self {
        self.items.push(CatalogItem {
            pos_item_id,
            name: name.to_string(),
            base_price,
            category_id,
        });
        self
    }

    pub fn with_modifier(mut self, option: ModifierOption) -> Self {
        self.modifiers.entry(option.pos_item_id).or_default().push(option);
        self
    }
}

#[async_trait]
impl CatalogSource for StaticCatalog {
    async fn list_categories(&self, _tenant: &str) -> Result<Vec<PosCategory>, CatalogError> {
        Ok(self.categories.clone())
    }

    async fn list_items(&self, filter: &ItemFilter) -> Result<Vec<CatalogItem>, CatalogError> {
        Ok(self
            .items
            .iter()
            .filter(|item| filter.matches(item))
            .cloned()
            .collect())
    }

    async fn list_modifier_options(&self, item_id: i64) -> Result<Vec<ModifierOption>, CatalogError> {
        Ok(self.modifiers.get(&item_id).cloned().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn test_builder_and_filters() {
        let catalog = StaticCatalog::default()
            .with_category(10, "Mains")
            .with_item(1, "Burger", 1000, 10)
            .with_item(2, "Fries", 400, 20);

        assert_eq!(catalog.list_categories("t").await.unwrap().len(), 1);
        assert_eq!(catalog.list_items(&ItemFilter::category(10)).await.unwrap().len(), 1);
        assert_eq!(catalog.list_items(&ItemFilter::default()).await.unwrap().len(), 2);
        assert!(catalog.list_modifier_options(1).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{
                "categories": [{{"id": 10, "name": "Mains"}}],
                "items": [{{"pos_item_id": 1, "name": "Burger", "base_price": 1000, "category_id": 10}}],
                "modifier_options": [
                    {{"pos_item_id": 1, "modifier_group_id": 5, "modifier_option_id": 1, "name": "Cheese", "base_price": 100, "group_name": "Extras"}},
                    {{"pos_item_id": 1, "modifier_group_id": 5, "modifier_option_id": 2, "name": "Bacon", "base_price": 150}}
                ]
            }}"#
        )
        .unwrap();

        let catalog = StaticCatalog::from_file(file.path()).unwrap();
        let options = catalog.list_modifier_options(1).await.unwrap();
        assert_eq!(options.len(), 2);
        assert_eq!(options[0].group_name.as_deref(), Some("Extras"));
    }

    #[test]
    fn test_from_file_missing() {
        let err = StaticCatalog::from_file("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, CatalogError::Snapshot(_)));
    }
}
