//! Repository Module
//!
//! SQLite access for the menu sync tables. Every function takes the pool
//! (or an open transaction) explicitly; no repository holds state.

pub mod config_override;
pub mod membership;
pub mod menu_category;
pub mod menu_group;
pub mod sync_record;

use shared::models::{CompositeKey, EntityRef, OverrideScope};
use shared::{AppError, ErrorCode};
use thiserror::Error;

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<sqlx::Error> for RepoError {
    fn from(err: sqlx::Error) -> Self {
        if let Some(db_err) = err.as_database_error()
            && db_err.is_unique_violation()
        {
            return RepoError::Duplicate(db_err.message().to_string());
        }
        RepoError::Database(err.to_string())
    }
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound(msg) => AppError::with_message(ErrorCode::NotFound, msg),
            RepoError::Duplicate(msg) => AppError::with_message(ErrorCode::AlreadyExists, msg),
            RepoError::Database(msg) => AppError::database(msg),
            RepoError::Validation(msg) => AppError::validation(msg),
        }
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;

/// Column values of a composite key: `(scope, item_id, modifier_group_id, modifier_option_id, menu_group_id)`
///
/// Item-scope keys store 0 in the modifier columns so the primary key stays
/// NULL-free.
pub(crate) fn key_columns(key: &CompositeKey) -> (&'static str, i64, i64, i64, i64) {
    let (group, option) = match key.entity {
        EntityRef::Item { .. } => (0, 0),
        EntityRef::ModifierOption {
            modifier_group_id,
            modifier_option_id,
            ..
        } => (modifier_group_id, modifier_option_id),
    };
    (
        key.scope().as_str(),
        key.item_id(),
        group,
        option,
        key.menu_group_id,
    )
}

/// Rebuild a composite key from stored columns
pub(crate) fn key_from_columns(
    scope: &str,
    item_id: i64,
    modifier_group_id: i64,
    modifier_option_id: i64,
    menu_group_id: i64,
) -> RepoResult<CompositeKey> {
    let scope: OverrideScope = scope
        .parse()
        .map_err(|e: shared::models::InvalidKeyString| RepoError::Database(e.to_string()))?;
    Ok(match scope {
        OverrideScope::Item => CompositeKey::item(item_id, menu_group_id),
        OverrideScope::ModifierOption => CompositeKey::modifier(
            item_id,
            modifier_group_id,
            modifier_option_id,
            menu_group_id,
        ),
    })
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_columns_round_trip() {
        for key in [CompositeKey::item(7, 3), CompositeKey::modifier(7, 8, 9, 3)] {
            let (scope, item, group, option, menu) = key_columns(&key);
            assert_eq!(key_from_columns(scope, item, group, option, menu).unwrap(), key);
        }
        assert_eq!(key_columns(&CompositeKey::item(7, 3)), ("item", 7, 0, 0, 3));
        assert!(key_from_columns("bogus", 1, 0, 0, 1).is_err());
    }

    #[test]
    fn test_repo_error_to_app_error() {
        let err: AppError = RepoError::Duplicate("x".into()).into();
        assert_eq!(err.code, ErrorCode::AlreadyExists);
        let err: AppError = RepoError::Database("boom".into()).into();
        assert_eq!(err.code, ErrorCode::DatabaseError);
    }
}
