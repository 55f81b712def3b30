//! Category Registry Models

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Where a registry category comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryOrigin {
    /// Mirrors a POS category (linked through `source_category_id`)
    System,
    /// Created by an operator for delivery menus only
    Custom,
}

impl CategoryOrigin {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::System => "system",
            Self::Custom => "custom",
        }
    }
}

impl fmt::Display for CategoryOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CategoryOrigin {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "system" => Ok(Self::System),
            "custom" => Ok(Self::Custom),
            other => Err(format!("unknown category origin: {other}")),
        }
    }
}

/// Registry category (remote category representation)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuCategory {
    pub id: i64,
    pub name: String,
    pub origin: CategoryOrigin,
    /// POS category this one mirrors. Present iff `origin == System`.
    pub source_category_id: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl MenuCategory {
    pub fn is_system(&self) -> bool {
        self.origin == CategoryOrigin::System
    }
}

/// Create custom category payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomCategoryCreate {
    pub name: String,
    /// Catalog items placed in the category right away
    #[serde(default)]
    pub item_ids: Vec<i64>,
}

/// `(menu_group_id, category_id)` membership
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryMembership {
    pub menu_group_id: i64,
    pub category_id: i64,
    pub sort_order: i32,
}

/// Membership joined with its category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MembershipDetail {
    pub menu_group_id: i64,
    pub sort_order: i32,
    pub category: MenuCategory,
    /// Number of catalog items associated with the category
    pub item_count: i64,
}
