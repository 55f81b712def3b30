//! Menu Sync - menu reconciliation engine for delivery platforms
//!
//! Merges read-only catalog data (items, categories, modifier options)
//! with per-menu-group configuration overrides, and pushes the resulting
//! menu document to a third-party delivery platform.
//!
//! # Module structure
//!
//! ```text
//! menu-sync/src/
//! ├── core/          # config, state, server, startup errors
//! ├── catalog/       # Catalog Service client
//! ├── platform/      # delivery platform adapter
//! ├── db/            # SQLite pool, migrations, repositories
//! ├── menu/          # registry, overrides, edit sessions, sync orchestration
//! ├── api/           # HTTP routes and handlers
//! └── utils/         # logging, error re-exports
//! ```

pub mod api;
pub mod catalog;
pub mod core;
pub mod db;
pub mod menu;
pub mod platform;
pub mod utils;

pub use api::build_router;
pub use core::{Config, Server, ServerState};
pub use utils::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};

pub use utils::logger::{init_logger, init_logger_with_file};

/// Load `.env`, read the configuration and install the logger
pub fn setup_environment() -> Config {
    // A missing .env is normal in production
    let dotenv_loaded = dotenv::dotenv().is_ok();
    let config = Config::from_env();
    init_logger_with_file(Some(&config.log_level), config.log_dir.as_deref());
    tracing::debug!(dotenv_loaded, "Environment loaded");
    config
}
