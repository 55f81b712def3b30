//! Remote Platform Adapter
//!
//! The delivery platform accepts a complete menu document per menu group and
//! replaces whatever it held before. There is no incremental update and no
//! delete: clearing a menu means pushing an empty document.

mod http;

pub use http::HttpPlatformAdapter;

use async_trait::async_trait;
use shared::platform::{PlatformMenuPayload, PlatformPushResponse};
use thiserror::Error;

/// Adapter-level failures (the push as a whole did not go through)
#[derive(Debug, Error)]
pub enum PlatformError {
    #[error("Platform unreachable: {0}")]
    Unreachable(String),

    #[error("Platform rejected the request with status {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("Failed to decode platform response: {0}")]
    Decode(String),
}

#[async_trait]
pub trait PlatformAdapter: Send + Sync {
    /// Full-replace push of one menu group's document
    async fn push_menu(
        &self,
        menu_group_id: i64,
        payload: &PlatformMenuPayload,
    ) -> Result<PlatformPushResponse, PlatformError>;
}
