//! Menu engine errors
//!
//! `MenuError` is what every engine operation returns. It converts into
//! [`AppError`] at the API boundary, carrying the domain error code.

use shared::{AppError, ErrorCode};
use thiserror::Error;

use crate::catalog::CatalogError;
use crate::db::repository::RepoError;
use crate::platform::PlatformError;

#[derive(Debug, Error)]
pub enum MenuError {
    /// Bad input; nothing was changed
    #[error("{1}")]
    Validation(ErrorCode, String),

    #[error("{1}")]
    NotFound(ErrorCode, String),

    #[error("{1}")]
    Duplicate(ErrorCode, String),

    /// Structural invariant violation (e.g. reorder id set mismatch); nothing was changed
    #[error("{1}")]
    InvariantViolation(ErrorCode, String),

    /// A commit for this session is already running
    #[error("A save is already in progress for menu group {0}")]
    SaveInFlight(i64),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Platform(#[from] PlatformError),

    #[error(transparent)]
    Repo(#[from] RepoError),
}

impl MenuError {
    pub fn validation(code: ErrorCode, msg: impl Into<String>) -> Self {
        Self::Validation(code, msg.into())
    }

    pub fn menu_group_not_found(id: i64) -> Self {
        Self::NotFound(ErrorCode::MenuGroupNotFound, format!("Menu group {id} not found"))
    }

    pub fn category_not_found(id: i64) -> Self {
        Self::NotFound(ErrorCode::CategoryNotFound, format!("Category {id} not found"))
    }

    /// Error code this error maps to at the API boundary
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Validation(code, _)
            | Self::NotFound(code, _)
            | Self::Duplicate(code, _)
            | Self::InvariantViolation(code, _) => *code,
            Self::SaveInFlight(_) => ErrorCode::SaveInFlight,
            Self::Catalog(_) => ErrorCode::CatalogUnavailable,
            Self::Platform(PlatformError::Rejected { .. }) => ErrorCode::PlatformRejected,
            Self::Platform(_) => ErrorCode::PlatformUnavailable,
            Self::Repo(RepoError::NotFound(_)) => ErrorCode::NotFound,
            Self::Repo(RepoError::Duplicate(_)) => ErrorCode::AlreadyExists,
            Self::Repo(RepoError::Validation(_)) => ErrorCode::ValidationFailed,
            Self::Repo(RepoError::Database(_)) => ErrorCode::DatabaseError,
        }
    }
}

impl From<MenuError> for AppError {
    fn from(err: MenuError) -> Self {
        let code = err.code();
        match err {
            MenuError::Catalog(e) => {
                tracing::warn!(error = %e, "Catalog call failed");
                AppError::upstream(code, "catalog", e.to_string())
            }
            MenuError::Platform(e) => {
                tracing::warn!(error = %e, "Platform call failed");
                AppError::upstream(code, "platform", e.to_string())
            }
            MenuError::SaveInFlight(menu_group_id) => {
                AppError::with_message(code, err.to_string()).with_detail("menu_group_id", menu_group_id)
            }
            other => AppError::with_message(code, other.to_string()),
        }
    }
}

pub type MenuResult<T> = Result<T, MenuError>;
