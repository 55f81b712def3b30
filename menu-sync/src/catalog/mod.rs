//! Catalog Service client
//!
//! The catalog (POS categories, items, modifier options) is owned by an
//! external service; the engine only reads it through [`CatalogSource`].
//!
//! - [`HttpCatalogClient`]: JSON over HTTP
//! - [`StaticCatalog`]: in-memory snapshot, optionally loaded from a file

mod http;
mod static_catalog;

pub use http::HttpCatalogClient;
pub use static_catalog::{CatalogSnapshot, StaticCatalog};

use async_trait::async_trait;
use shared::models::{CatalogItem, ItemFilter, ModifierOption, PosCategory};
use thiserror::Error;

/// Catalog access errors
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Catalog request failed: {0}")]
    Request(String),

    #[error("Catalog returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Failed to decode catalog response: {0}")]
    Decode(String),

    #[error("Failed to load catalog snapshot: {0}")]
    Snapshot(String),
}

/// Read-only view of the tenant catalog
#[async_trait]
pub trait CatalogSource: Send + Sync {
    async fn list_categories(&self, tenant: &str) -> Result<Vec<PosCategory>, CatalogError>;

    async fn list_items(&self, filter: &ItemFilter) -> Result<Vec<CatalogItem>, CatalogError>;

    async fn list_modifier_options(&self, item_id: i64) -> Result<Vec<ModifierOption>, CatalogError>;
}
