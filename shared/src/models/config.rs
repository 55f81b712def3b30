//! Configuration persistence API DTOs

use super::config_override::SyncStatus;
use super::key::CompositeKey;
use serde::{Deserialize, Serialize};

/// Item configuration within a menu group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemConfig {
    pub pos_item_id: i64,
    pub name: String,
    pub category_id: i64,
    pub base_price: i64,
    pub enabled: bool,
    pub price_override: Option<i64>,
    /// `price_override` if present, else `base_price`
    pub effective_price: i64,
    /// Whether an override row is stored for this item
    pub has_override: bool,
    pub sync_status: SyncStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sync_error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_synced_at: Option<i64>,
}

/// Modifier option configuration within a menu group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModifierConfig {
    pub pos_item_id: i64,
    pub modifier_group_id: i64,
    pub modifier_option_id: i64,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_name: Option<String>,
    pub base_price: i64,
    pub enabled: bool,
    pub price_override: Option<i64>,
    pub effective_price: i64,
    pub has_override: bool,
    pub sync_status: SyncStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sync_error: Option<String>,
}

/// Counts over a configuration view
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigSummary {
    pub total: usize,
    pub enabled: usize,
    pub disabled: usize,
    /// Entries whose effective price differs from base
    pub custom_price: usize,
}

impl ConfigSummary {
    pub fn record(&mut self, enabled: bool, base_price: i64, effective_price: i64) {
        self.total += 1;
        if enabled {
            self.enabled += 1;
        } else {
            self.disabled += 1;
        }
        if effective_price != base_price {
            self.custom_price += 1;
        }
    }
}

/// `get_config` response
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuConfig {
    pub items: Vec<ItemConfig>,
    pub summary: ConfigSummary,
}

/// `get_modifier_config` response
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModifierConfigView {
    pub modifiers: Vec<ModifierConfig>,
    pub summary: ConfigSummary,
}

/// One item row in a `save_config` request (full replacement of both fields)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemConfigInput {
    pub pos_item_id: i64,
    pub enabled: bool,
    #[serde(default)]
    pub price_override: Option<i64>,
}

/// One modifier option row in a `save_modifier_config` request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModifierConfigInput {
    pub pos_item_id: i64,
    pub modifier_group_id: i64,
    pub modifier_option_id: i64,
    pub enabled: bool,
    #[serde(default)]
    pub price_override: Option<i64>,
}

/// Key that failed to persist
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyFailure {
    pub key: CompositeKey,
    pub message: String,
}

/// Result of a save call
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveConfigResult {
    pub updated_count: usize,
    pub created_count: usize,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<KeyFailure>,
}

impl SaveConfigResult {
    pub fn is_partial(&self) -> bool {
        !self.failures.is_empty()
    }
}
