//! Menu reconciliation engine
//!
//! - [`key`]: composite identity of configurable entities
//! - [`store`]: committed overrides ([`OverrideStore`])
//! - [`registry`]: registry categories and menu memberships
//! - [`menu_group`]: menu group CRUD and availability validation
//! - [`price_adjust`]: bulk percentage price changes
//! - [`session`]: uncommitted edits per menu group
//! - [`orchestrator`]: payload build, push and sync bookkeeping
//! - [`config_api`]: session-less configuration reads and writes

pub mod config_api;
pub mod error;
pub mod menu_group;
pub mod orchestrator;
pub mod price_adjust;
pub mod registry;
pub mod session;
pub mod store;
pub mod view;

pub use shared::models::key;

pub use config_api::ConfigApi;
pub use error::{MenuError, MenuResult};
pub use menu_group::MenuGroupManager;
pub use orchestrator::{BuildStats, SyncOrchestrator};
pub use price_adjust::{AdjustmentSummary, apply_percent_adjustment};
pub use registry::CategoryRegistry;
pub use session::{CommitSummary, EditSession, SessionRegistry, SessionState};
pub use store::{KeyOutcome, OverrideStore, SqliteOverrideStore, UpsertOutcome};
pub use view::MenuView;
