//! Catalog Models
//!
//! Entities owned by the Catalog Service. The menu engine only reads them.

use serde::{Deserialize, Serialize};

/// POS category as exposed by the Catalog Service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PosCategory {
    pub id: i64,
    pub name: String,
}

/// Catalog item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogItem {
    pub pos_item_id: i64,
    pub name: String,
    /// Base price in minor units
    pub base_price: i64,
    /// POS category the item belongs to
    pub category_id: i64,
}

/// Modifier option of a catalog item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModifierOption {
    pub pos_item_id: i64,
    pub modifier_group_id: i64,
    pub modifier_option_id: i64,
    pub name: String,
    /// Base price in minor units
    pub base_price: i64,
    /// Display name of the modifier group (e.g. "Size")
    #[serde(default)]
    pub group_name: Option<String>,
}

/// Filter for `list_items`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemFilter {
    /// Restrict to items of this POS category
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<i64>,
    /// Restrict to these item ids
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_ids: Option<Vec<i64>>,
}

impl ItemFilter {
    pub fn category(category_id: i64) -> Self {
        Self {
            category_id: Some(category_id),
            item_ids: None,
        }
    }

    pub fn ids(item_ids: Vec<i64>) -> Self {
        Self {
            category_id: None,
            item_ids: Some(item_ids),
        }
    }

    /// Whether an item passes this filter
    pub fn matches(&self, item: &CatalogItem) -> bool {
        if let Some(category_id) = self.category_id
            && item.category_id != category_id
        {
            return false;
        }
        if let Some(ids) = &self.item_ids
            && !ids.contains(&item.pos_item_id)
        {
            return false;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: i64, category_id: i64) -> CatalogItem {
        CatalogItem {
            pos_item_id: id,
            name: format!("Item {id}"),
            base_price: 100,
            category_id,
        }
    }

    #[test]
    fn test_item_filter_matches() {
        assert!(ItemFilter::default().matches(&item(1, 10)));
        assert!(ItemFilter::category(10).matches(&item(1, 10)));
        assert!(!ItemFilter::category(11).matches(&item(1, 10)));
        assert!(ItemFilter::ids(vec![1, 2]).matches(&item(2, 10)));
        assert!(!ItemFilter::ids(vec![1, 2]).matches(&item(3, 10)));
    }

    #[test]
    fn test_modifier_option_group_name_defaults() {
        let json = r#"{"pos_item_id":1,"modifier_group_id":2,"modifier_option_id":3,"name":"Large","base_price":50}"#;
        let option: ModifierOption = serde_json::from_str(json).unwrap();
        assert_eq!(option.group_name, None);
        assert_eq!(option.base_price, 50);
    }
}
