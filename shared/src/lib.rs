//! Shared types for the menu sync workspace
//!
//! Domain models (categories, menu groups, overrides, sync records),
//! the remote platform payload document, and the unified error system
//! used by the engine and its HTTP surface.

pub mod error;
pub mod models;
pub mod platform;
pub mod util;

// Re-exports
pub use axum::Json;
pub use http;
pub use serde::{Deserialize, Serialize};

pub use error::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};
