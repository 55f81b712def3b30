//! Startup errors
//!
//! Request-time failures use [`shared::AppError`]; these only occur while
//! the server is being assembled.

use thiserror::Error;

use crate::catalog::CatalogError;
use crate::platform::PlatformError;

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Failed to prepare work directory {path}: {source}")]
    WorkDir {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Database initialization failed: {0}")]
    Database(#[from] shared::AppError),

    #[error("Catalog client initialization failed: {0}")]
    Catalog(#[from] CatalogError),

    #[error("Platform adapter initialization failed: {0}")]
    Platform(#[from] PlatformError),

    #[error("HTTP server error: {0}")]
    Http(#[source] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ServerError>;
