//! Domain models
//!
//! - [`catalog`]: read-only entities owned by the Catalog Service
//! - [`category`]: registry categories and menu memberships
//! - [`menu_group`]: menus and their weekly service availability
//! - [`key`]: composite identity of configurable entities
//! - [`config_override`]: enablement / price overrides and sync records
//! - [`config`]: configuration persistence API DTOs

pub mod catalog;
pub mod category;
pub mod config;
pub mod config_override;
pub mod key;
pub mod menu_group;
pub mod serde_helpers;

pub use catalog::{CatalogItem, ItemFilter, ModifierOption, PosCategory};
pub use category::{
    CategoryMembership, CategoryOrigin, CustomCategoryCreate, MenuCategory, MembershipDetail,
};
pub use config::{
    ConfigSummary, ItemConfig, ItemConfigInput, KeyFailure, MenuConfig, ModifierConfig,
    ModifierConfigInput, ModifierConfigView, SaveConfigResult,
};
pub use config_override::{ConfigOverride, OverridePatch, SyncRecord, SyncStatus};
pub use key::{CompositeKey, EntityRef, InvalidKeyString, OverrideScope};
pub use menu_group::{
    MenuGroup, MenuGroupCreate, MenuGroupUpdate, ServiceAvailability, TimeRange, Weekday,
};
