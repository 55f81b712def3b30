//! Configuration Overrides and Sync Records

use super::key::CompositeKey;
use super::serde_helpers::double_option;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Committed override of an entity's enablement / price within one menu group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigOverride {
    pub key: CompositeKey,
    pub enabled: bool,
    /// `None` means "use base price"
    pub price_override: Option<i64>,
    pub updated_at: i64,
}

impl ConfigOverride {
    /// Override a key resolves to when nothing is stored
    pub fn default_for(key: CompositeKey) -> Self {
        Self {
            key,
            enabled: true,
            price_override: None,
            updated_at: 0,
        }
    }

    /// Merge a partial patch into this override
    pub fn apply(&mut self, patch: &OverridePatch) {
        if let Some(enabled) = patch.enabled {
            self.enabled = enabled;
        }
        if let Some(price) = patch.price_override {
            self.price_override = price;
        }
    }
}

/// Partial override
///
/// Absent fields leave the stored value untouched. For `price_override`,
/// `Some(None)` clears the override back to base price.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverridePatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "double_option"
    )]
    pub price_override: Option<Option<i64>>,
}

impl OverridePatch {
    pub fn enabled(enabled: bool) -> Self {
        Self {
            enabled: Some(enabled),
            price_override: None,
        }
    }

    pub fn price(price: Option<i64>) -> Self {
        Self {
            enabled: None,
            price_override: Some(price),
        }
    }

    /// Full replacement of both fields
    pub fn full(enabled: bool, price_override: Option<i64>) -> Self {
        Self {
            enabled: Some(enabled),
            price_override: Some(price_override),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.enabled.is_none() && self.price_override.is_none()
    }

    /// Layer `other` on top of `self`; fields set in `other` win
    pub fn merge(&mut self, other: &OverridePatch) {
        if other.enabled.is_some() {
            self.enabled = other.enabled;
        }
        if other.price_override.is_some() {
            self.price_override = other.price_override;
        }
    }
}

/// Per-entity sync status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncStatus {
    #[default]
    Unsynced,
    Success,
    Error,
}

impl SyncStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unsynced => "unsynced",
            Self::Success => "success",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SyncStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "unsynced" => Ok(Self::Unsynced),
            "success" => Ok(Self::Success),
            "error" => Ok(Self::Error),
            other => Err(format!("unknown sync status: {other}")),
        }
    }
}

/// Outcome of the last sync for one entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncRecord {
    pub key: CompositeKey,
    pub status: SyncStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_detail: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_synced_at: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_patch_merges_fields() {
        let key = CompositeKey::item(1, 1);
        let mut o = ConfigOverride::default_for(key);
        o.apply(&OverridePatch::price(Some(900)));
        assert!(o.enabled);
        assert_eq!(o.price_override, Some(900));

        o.apply(&OverridePatch::enabled(false));
        assert!(!o.enabled);
        assert_eq!(o.price_override, Some(900));

        o.apply(&OverridePatch::price(None));
        assert_eq!(o.price_override, None);
    }

    #[test]
    fn test_patch_merge_later_wins() {
        let mut p = OverridePatch::enabled(false);
        p.merge(&OverridePatch::price(Some(10)));
        p.merge(&OverridePatch::enabled(true));
        assert_eq!(p, OverridePatch::full(true, Some(10)));
        assert!(!p.is_empty());
        assert!(OverridePatch::default().is_empty());
    }

    #[test]
    fn test_sync_status_parse() {
        assert_eq!("error".parse::<SyncStatus>().unwrap(), SyncStatus::Error);
        assert!("pending".parse::<SyncStatus>().is_err());
        assert_eq!(SyncStatus::default(), SyncStatus::Unsynced);
    }
}
