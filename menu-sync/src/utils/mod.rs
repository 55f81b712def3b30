//! Utilities
//!
//! - [`logger`] - tracing subscriber setup
//! - Re-exports of the unified error types from `shared::error`

pub mod logger;

pub use shared::error::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};
