//! Unified error codes
//!
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 6xxx: Catalog and category registry errors
//! - 7xxx: Menu group, membership and edit session errors
//! - 8xxx: Remote platform sync errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values for efficient serialization
/// and cross-language compatibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Unknown error
    Unknown = 1,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Resource already exists
    AlreadyExists = 4,
    /// Invalid request
    InvalidRequest = 5,
    /// Required field missing
    RequiredField = 7,
    /// Value out of range
    ValueOutOfRange = 8,

    // ==================== 6xxx: Catalog ====================
    /// Catalog item not found
    ItemNotFound = 6001,
    /// Modifier option not found
    ModifierOptionNotFound = 6002,
    /// Catalog service unreachable or returned an error
    CatalogUnavailable = 6003,
    /// Category not found
    CategoryNotFound = 6101,
    /// Category name already exists
    CategoryNameExists = 6103,
    /// Category name is empty
    CategoryNameEmpty = 6104,
    /// Category origin does not match the request
    CategoryOriginMismatch = 6105,

    // ==================== 7xxx: Menu ====================
    /// Menu group not found
    MenuGroupNotFound = 7001,
    /// No menu group selected
    MenuGroupNotSelected = 7002,
    /// Service availability is malformed
    InvalidServiceAvailability = 7003,
    /// Category is already part of the menu group
    CategoryAlreadyInMenu = 7101,
    /// Category is not part of the menu group
    CategoryNotInMenu = 7102,
    /// Reorder ids do not match current memberships
    MembershipOrderMismatch = 7103,
    /// A save is already in flight for this session
    SaveInFlight = 7201,
    /// Edit session not found
    EditSessionNotFound = 7202,
    /// Some overrides failed to persist
    PartialSaveFailure = 7203,

    // ==================== 8xxx: Sync ====================
    /// Remote platform unreachable
    PlatformUnavailable = 8001,
    /// Remote platform rejected the menu document
    PlatformRejected = 8002,
    /// Some entities failed to sync
    PartialSyncFailure = 8003,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
    /// Database error
    DatabaseError = 9002,
    /// Network error
    NetworkError = 9003,
    /// Operation timeout
    TimeoutError = 9004,
    /// Configuration error
    ConfigError = 9005,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Check if this is a success code
    #[inline]
    pub const fn is_success(&self) -> bool {
        matches!(self, ErrorCode::Success)
    }

    /// Get the developer-facing English message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::Success => "Operation completed successfully",
            ErrorCode::Unknown => "An unknown error occurred",
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::AlreadyExists => "Resource already exists",
            ErrorCode::InvalidRequest => "Invalid request",
            ErrorCode::RequiredField => "Required field is missing",
            ErrorCode::ValueOutOfRange => "Value is out of range",

            // Catalog
            ErrorCode::ItemNotFound => "Item not found",
            ErrorCode::ModifierOptionNotFound => "Modifier option not found",
            ErrorCode::CatalogUnavailable => "Catalog service is unavailable",
            ErrorCode::CategoryNotFound => "Category not found",
            ErrorCode::CategoryNameExists => "Category name already exists",
            ErrorCode::CategoryNameEmpty => "Category name must not be empty",
            ErrorCode::CategoryOriginMismatch => "Category origin does not match",

            // Menu
            ErrorCode::MenuGroupNotFound => "Menu group not found",
            ErrorCode::MenuGroupNotSelected => "No menu group selected",
            ErrorCode::InvalidServiceAvailability => "Service availability is invalid",
            ErrorCode::CategoryAlreadyInMenu => "Category is already in the menu",
            ErrorCode::CategoryNotInMenu => "Category is not in the menu",
            ErrorCode::MembershipOrderMismatch => {
                "Category order does not match current memberships"
            }
            ErrorCode::SaveInFlight => "A save is already in progress",
            ErrorCode::EditSessionNotFound => "Edit session not found",
            ErrorCode::PartialSaveFailure => "Some changes could not be saved",

            // Sync
            ErrorCode::PlatformUnavailable => "Delivery platform is unavailable",
            ErrorCode::PlatformRejected => "Delivery platform rejected the menu",
            ErrorCode::PartialSyncFailure => "Some entities failed to sync",

            // System
            ErrorCode::InternalError => "Internal server error",
            ErrorCode::DatabaseError => "Database error",
            ErrorCode::NetworkError => "Network error",
            ErrorCode::TimeoutError => "Operation timed out",
            ErrorCode::ConfigError => "Configuration error",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error when converting from an invalid u16 to ErrorCode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            // General
            0 => Ok(ErrorCode::Success),
            1 => Ok(ErrorCode::Unknown),
            2 => Ok(ErrorCode::ValidationFailed),
            3 => Ok(ErrorCode::NotFound),
            4 => Ok(ErrorCode::AlreadyExists),
            5 => Ok(ErrorCode::InvalidRequest),
            7 => Ok(ErrorCode::RequiredField),
            8 => Ok(ErrorCode::ValueOutOfRange),

            // Catalog
            6001 => Ok(ErrorCode::ItemNotFound),
            6002 => Ok(ErrorCode::ModifierOptionNotFound),
            6003 => Ok(ErrorCode::CatalogUnavailable),
            6101 => Ok(ErrorCode::CategoryNotFound),
            6103 => Ok(ErrorCode::CategoryNameExists),
            6104 => Ok(ErrorCode::CategoryNameEmpty),
            6105 => Ok(ErrorCode::CategoryOriginMismatch),

            // Menu
            7001 => Ok(ErrorCode::MenuGroupNotFound),
            7002 => Ok(ErrorCode::MenuGroupNotSelected),
            7003 => Ok(ErrorCode::InvalidServiceAvailability),
            7101 => Ok(ErrorCode::CategoryAlreadyInMenu),
            7102 => Ok(ErrorCode::CategoryNotInMenu),
            7103 => Ok(ErrorCode::MembershipOrderMismatch),
            7201 => Ok(ErrorCode::SaveInFlight),
            7202 => Ok(ErrorCode::EditSessionNotFound),
            7203 => Ok(ErrorCode::PartialSaveFailure),

            // Sync
            8001 => Ok(ErrorCode::PlatformUnavailable),
            8002 => Ok(ErrorCode::PlatformRejected),
            8003 => Ok(ErrorCode::PartialSyncFailure),

            // System
            9001 => Ok(ErrorCode::InternalError),
            9002 => Ok(ErrorCode::DatabaseError),
            9003 => Ok(ErrorCode::NetworkError),
            9004 => Ok(ErrorCode::TimeoutError),
            9005 => Ok(ErrorCode::ConfigError),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
