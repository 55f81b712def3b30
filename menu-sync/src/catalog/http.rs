//! HttpCatalogClient: reqwest client for the Catalog Service

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use shared::models::{CatalogItem, ItemFilter, ModifierOption, PosCategory};
use std::time::Duration;

use super::{CatalogError, CatalogSource};

/// HTTP client for the Catalog Service
///
/// | Operation | Request |
/// |-----------|---------|
/// | `list_categories` | `GET {base}/tenants/{tenant}/categories` |
/// | `list_items` | `GET {base}/items?category_id=..&ids=1,2` |
/// | `list_modifier_options` | `GET {base}/items/{id}/modifier-options` |
pub struct HttpCatalogClient {
    client: Client,
    base_url: String,
}

impl HttpCatalogClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, CatalogError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| CatalogError::Request(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, CatalogError> {
        let response = request
            .send()
            .await
            .map_err(|e| CatalogError::Request(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(CatalogError::Status { status, body });
        }

        response
            .json()
            .await
            .map_err(|e| CatalogError::Decode(e.to_string()))
    }
}

#[async_trait]
impl CatalogSource for HttpCatalogClient {
    async fn list_categories(&self, tenant: &str) -> Result<Vec<PosCategory>, CatalogError> {
        let url = format!("{}/tenants/{tenant}/categories", self.base_url);
        self.get_json(self.client.get(url)).await
    }

    async fn list_items(&self, filter: &ItemFilter) -> Result<Vec<CatalogItem>, CatalogError> {
        let mut query: Vec<(&str, String)> = Vec::new();
        if let Some(category_id) = filter.category_id {
            query.push(("category_id", category_id.to_string()));
        }
        if let Some(ids) = &filter.item_ids {
            if ids.is_empty() {
                return Ok(vec![]);
            }
            let joined = ids.iter().map(i64::to_string).collect::<Vec<_>>().join(",");
            query.push(("ids", joined));
        }

        let url = format!("{}/items", self.base_url);
        self.get_json(self.client.get(url).query(&query)).await
    }

    async fn list_modifier_options(&self, item_id: i64) -> Result<Vec<ModifierOption>, CatalogError> {
        let url = format!("{}/items/{item_id}/modifier-options", self.base_url);
        self.get_json(self.client.get(url)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = HttpCatalogClient::new("http://catalog.local/", Duration::from_secs(1)).unwrap();
        assert_eq!(client.base_url, "http://catalog.local");
    }

    #[tokio::test]
    async fn test_empty_id_filter_short_circuits() {
        // Unroutable address: any request would fail
        let client = HttpCatalogClient::new("http://127.0.0.1:9", Duration::from_millis(50)).unwrap();
        let items = client.list_items(&ItemFilter::ids(vec![])).await.unwrap();
        assert!(items.is_empty());
    }

    #[tokio::test]
    async fn test_unreachable_is_request_error() {
        let client = HttpCatalogClient::new("http://127.0.0.1:9", Duration::from_millis(200)).unwrap();
        let err = client.list_modifier_options(1).await.unwrap_err();
        assert!(matches!(err, CatalogError::Request(_)));
    }
}
