//! HTTP status code mapping for error codes

use super::codes::ErrorCode;
use http::StatusCode;

impl ErrorCode {
    /// Get the appropriate HTTP status code for this error code
    pub fn http_status(&self) -> StatusCode {
        match self {
            // Success
            Self::Success => StatusCode::OK,

            // 404 Not Found
            Self::NotFound
            | Self::ItemNotFound
            | Self::ModifierOptionNotFound
            | Self::CategoryNotFound
            | Self::MenuGroupNotFound
            | Self::EditSessionNotFound
            | Self::CategoryNotInMenu => StatusCode::NOT_FOUND,

            // 409 Conflict
            Self::AlreadyExists
            | Self::CategoryNameExists
            | Self::CategoryAlreadyInMenu
            | Self::SaveInFlight => StatusCode::CONFLICT,

            // 207 Multi-Status: the batch was applied partially
            Self::PartialSaveFailure | Self::PartialSyncFailure => StatusCode::MULTI_STATUS,

            // 502 Bad Gateway: an upstream collaborator failed
            Self::CatalogUnavailable | Self::PlatformUnavailable | Self::PlatformRejected => {
                StatusCode::BAD_GATEWAY
            }

            // 503 Service Unavailable (transient errors, client can retry)
            Self::NetworkError | Self::TimeoutError => StatusCode::SERVICE_UNAVAILABLE,

            // 500 Internal Server Error
            Self::Unknown | Self::InternalError | Self::DatabaseError | Self::ConfigError => {
                StatusCode::INTERNAL_SERVER_ERROR
            }

            // 400 Bad Request (default for validation errors)
            _ => StatusCode::BAD_REQUEST,
        }
    }
}
