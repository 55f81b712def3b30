//! HttpPlatformAdapter: pushes menu documents over HTTP

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use shared::platform::{PlatformMenuPayload, PlatformPushResponse};
use std::time::Duration;

use super::{PlatformAdapter, PlatformError};

/// `PUT {base}/menus/{menu_group_id}` with the full document as JSON body
pub struct HttpPlatformAdapter {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl HttpPlatformAdapter {
    pub fn new(
        base_url: impl Into<String>,
        token: Option<String>,
        timeout: Duration,
    ) -> Result<Self, PlatformError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| PlatformError::Unreachable(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token,
        })
    }

    fn menu_url(&self, menu_group_id: i64) -> String {
        format!("{}/menus/{menu_group_id}", self.base_url)
    }
}

#[async_trait]
impl PlatformAdapter for HttpPlatformAdapter {
    async fn push_menu(
        &self,
        menu_group_id: i64,
        payload: &PlatformMenuPayload,
    ) -> Result<PlatformPushResponse, PlatformError> {
        let mut request = self.client.put(self.menu_url(menu_group_id)).json(payload);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| PlatformError::Unreachable(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| PlatformError::Unreachable(e.to_string()))?;

        if status.is_success() {
            if body.trim().is_empty() {
                return Ok(PlatformPushResponse::accepted());
            }
            return serde_json::from_str(&body).map_err(|e| PlatformError::Decode(e.to_string()));
        }

        // 422 carries per-entity errors in the regular response shape
        if status == StatusCode::UNPROCESSABLE_ENTITY
            && let Ok(parsed) = serde_json::from_str::<PlatformPushResponse>(&body)
        {
            return Ok(parsed);
        }

        Err(PlatformError::Rejected {
            status: status.as_u16(),
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_menu_url() {
        let adapter =
            HttpPlatformAdapter::new("https://platform.example/v1/", None, Duration::from_secs(1)).unwrap();
        assert_eq!(adapter.menu_url(42), "https://platform.example/v1/menus/42");
    }

    #[tokio::test]
    async fn test_unreachable() {
        let adapter = HttpPlatformAdapter::new("http://127.0.0.1:9", None, Duration::from_millis(200)).unwrap();
        let err = adapter
            .push_menu(1, &PlatformMenuPayload::empty())
            .await
            .unwrap_err();
        assert!(matches!(err, PlatformError::Unreachable(_)));
    }
}
