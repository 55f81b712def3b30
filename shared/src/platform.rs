//! Remote platform menu document
//!
//! Full-replace payload pushed to the delivery platform. Every id is
//! tenant-local; translating ids into the platform's namespace is the
//! adapter's job.

use crate::models::{EntityRef, ServiceAvailability};
use serde::{Deserialize, Serialize};

/// `{menus[], categories[], items[], modifier_groups[]}`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformMenuPayload {
    pub menus: Vec<PlatformMenu>,
    pub categories: Vec<PlatformCategory>,
    pub items: Vec<PlatformItem>,
    pub modifier_groups: Vec<PlatformModifierGroup>,
}

impl PlatformMenuPayload {
    /// Empty document of the same shape (used to clear a menu)
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.menus.is_empty()
            && self.categories.is_empty()
            && self.items.is_empty()
            && self.modifier_groups.is_empty()
    }

    /// Number of modifier options across all groups
    pub fn modifier_option_count(&self) -> usize {
        self.modifier_groups.iter().map(|g| g.options.len()).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformMenu {
    pub id: i64,
    pub title: String,
    pub service_availability: ServiceAvailability,
    /// Category ids in display order
    pub category_ids: Vec<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformCategory {
    pub id: i64,
    pub title: String,
    pub item_ids: Vec<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformItem {
    pub id: i64,
    pub title: String,
    /// Effective price in minor units
    pub price: i64,
    pub modifier_group_ids: Vec<i64>,
}

/// Modifier group as attached to one item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformModifierGroup {
    pub item_id: i64,
    pub modifier_group_id: i64,
    pub title: String,
    pub options: Vec<PlatformModifierOption>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformModifierOption {
    pub modifier_option_id: i64,
    pub title: String,
    pub price: i64,
}

/// Platform answer to a menu push
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformPushResponse {
    pub success: bool,
    #[serde(default)]
    pub message: String,
    /// Entities the platform rejected; everything else was accepted
    #[serde(default)]
    pub entity_errors: Vec<PlatformEntityError>,
}

impl PlatformPushResponse {
    pub fn accepted() -> Self {
        Self {
            success: true,
            message: "OK".to_string(),
            entity_errors: vec![],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformEntityError {
    pub entity: EntityRef,
    pub message: String,
}

/// Aggregate result of a sync / clear
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncResult {
    pub menu_group_id: i64,
    pub success: bool,
    pub message: String,
    pub item_count: usize,
    pub category_count: usize,
    /// Items left out because they are disabled
    pub skipped_count: usize,
    /// Items whose effective price differs from base
    pub custom_price_count: usize,
    pub modifier_option_count: usize,
    pub synced_at: i64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<PlatformEntityError>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_payload_keeps_shape() {
        let json = serde_json::to_value(PlatformMenuPayload::empty()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"menus":[],"categories":[],"items":[],"modifier_groups":[]})
        );
        assert!(PlatformMenuPayload::empty().is_empty());
    }

    #[test]
    fn test_push_response_defaults() {
        let r: PlatformPushResponse = serde_json::from_str(r#"{"success":true}"#).unwrap();
        assert!(r.success);
        assert!(r.entity_errors.is_empty());

        let r: PlatformPushResponse = serde_json::from_str(
            r#"{"success":false,"message":"bad","entity_errors":[{"entity":{"scope":"item","item_id":3},"message":"price too low"}]}"#,
        )
        .unwrap();
        assert_eq!(r.entity_errors[0].entity, EntityRef::Item { item_id: 3 });
    }
}
