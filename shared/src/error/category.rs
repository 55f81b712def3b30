//! Error category classification

use super::codes::ErrorCode;
use serde::{Deserialize, Serialize};

/// Error category classification based on error code ranges
///
/// - 0xxx-5xxx: General errors
/// - 6xxx: Catalog errors
/// - 7xxx: Menu errors
/// - 8xxx: Sync errors
/// - 9xxx: System errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// General errors (0xxx)
    General,
    /// Catalog and category registry errors (6xxx)
    Catalog,
    /// Menu group and edit session errors (7xxx)
    Menu,
    /// Remote platform sync errors (8xxx)
    Sync,
    /// System errors (9xxx)
    System,
}

impl ErrorCategory {
    /// Determine category from error code value
    pub fn from_code(code: u16) -> Self {
        match code {
            6000..7000 => Self::Catalog,
            7000..8000 => Self::Menu,
            8000..9000 => Self::Sync,
            9000.. => Self::System,
            _ => Self::General,
        }
    }

    /// Get the string name for this category
    pub fn name(&self) -> &'static str {
        match self {
            Self::General => "general",
            Self::Catalog => "catalog",
            Self::Menu => "menu",
            Self::Sync => "sync",
            Self::System => "system",
        }
    }
}

impl ErrorCode {
    /// Get the category for this error code
    pub fn category(&self) -> ErrorCategory {
        ErrorCategory::from_code(self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_from_code() {
        assert_eq!(ErrorCategory::from_code(0), ErrorCategory::General);
        assert_eq!(ErrorCategory::from_code(999), ErrorCategory::General);
        assert_eq!(ErrorCategory::from_code(6101), ErrorCategory::Catalog);
        assert_eq!(ErrorCategory::from_code(7201), ErrorCategory::Menu);
        assert_eq!(ErrorCategory::from_code(8001), ErrorCategory::Sync);
        assert_eq!(ErrorCategory::from_code(9001), ErrorCategory::System);
        assert_eq!(ErrorCategory::from_code(10000), ErrorCategory::System);
    }

    #[test]
    fn test_error_code_category() {
        assert_eq!(ErrorCode::NotFound.category(), ErrorCategory::General);
        assert_eq!(ErrorCode::CategoryNameExists.category(), ErrorCategory::Catalog);
        assert_eq!(ErrorCode::SaveInFlight.category(), ErrorCategory::Menu);
        assert_eq!(ErrorCode::PlatformRejected.category(), ErrorCategory::Sync);
        assert_eq!(ErrorCode::DatabaseError.category(), ErrorCategory::System);
    }

    #[test]
    fn test_category_serde() {
        let json = serde_json::to_string(&ErrorCategory::Catalog).unwrap();
        assert_eq!(json, "\"catalog\"");
    }
}
