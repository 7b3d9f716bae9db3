//! Video catalog API client.
//!
//! Search is paginated: the first page reports how many pages exist, the rest
//! are fetched in small concurrent groups with a pause between groups. API
//! keys are rotated round-robin per request.

use crate::core::cleaner::normalize;
use crate::models::config::CatalogConfig;
use crate::models::media::CatalogEntry;
use crate::services::VideoCatalog;
use crate::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Search page payload.
#[derive(Debug, Deserialize)]
struct SearchPage {
    data: Vec<CatalogEntry>,
    metadata: PageMetadata,
}

/// Pagination metadata.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PageMetadata {
    max_page: u32,
}

/// Rename request payload.
#[derive(Debug, Serialize)]
struct RenameRequest<'a> {
    name: &'a str,
}

/// Video catalog API client.
pub struct StreamCatalogClient {
    config: CatalogConfig,
    client: reqwest::Client,
    next_key: AtomicUsize,
}

impl StreamCatalogClient {
    /// Create a new client. Fails when no API key is configured.
    pub fn new(config: CatalogConfig) -> Result<Self> {
        if config.api_keys.is_empty() {
            return Err(crate::Error::CatalogApiKeyMissing);
        }
        Ok(Self {
            config,
            client: reqwest::Client::new(),
            next_key: AtomicUsize::new(0),
        })
    }

    /// Next API key in rotation.
    fn api_key(&self) -> &str {
        let index = self.next_key.fetch_add(1, Ordering::Relaxed) % self.config.api_keys.len();
        &self.config.api_keys[index]
    }

    async fn fetch_page(&self, query: &str, page: u32, per_page: u32) -> Result<SearchPage> {
        let resp = self
            .client
            .get(&self.config.base_url)
            .query(&[
                ("page", page.to_string()),
                ("perPage", per_page.to_string()),
                ("search", query.to_string()),
            ])
            .header("api-token", self.api_key())
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(resp)
    }

    /// Fetch every page of a search.
    ///
    /// With `exact`, only entries whose normalized name contains the
    /// normalized query are kept.
    pub async fn search_all(&self, query: &str, exact: bool) -> Result<Vec<CatalogEntry>> {
        let per_page = self.config.per_page;
        let first = self.fetch_page(query, 1, per_page).await?;
        let max_page = first.metadata.max_page;
        let mut videos = first.data;

        let remaining: Vec<u32> = (2..=max_page).collect();
        let groups: Vec<&[u32]> = remaining.chunks(self.config.page_batch.max(1)).collect();
        for (i, group) in groups.iter().enumerate() {
            let pages = futures::future::join_all(
                group.iter().map(|page| self.fetch_page(query, *page, per_page)),
            )
            .await;
            for page in pages {
                videos.extend(page?.data);
            }
            if i + 1 < groups.len() {
                tokio::time::sleep(self.config.page_delay()).await;
            }
        }

        if exact && !query.is_empty() {
            let wanted = normalize(query);
            videos.retain(|v| normalize(&v.name).contains(&wanted));
        }

        tracing::info!("Found {} videos for search: \"{}\"", videos.len(), query);
        Ok(videos)
    }

    /// Check that the catalog answers with the configured key.
    pub async fn health_check(&self) -> Result<bool> {
        match self.fetch_page("", 1, 1).await {
            Ok(_) => Ok(true),
            Err(e) => {
                tracing::debug!("Catalog health check failed: {}", e);
                Ok(false)
            }
        }
    }
}

#[async_trait]
impl VideoCatalog for StreamCatalogClient {
    async fn search(&self, query: &str) -> Result<Vec<CatalogEntry>> {
        self.search_all(query, false).await
    }

    async fn rename(&self, id: &str, new_name: &str) -> Result<bool> {
        let url = format!("{}/{}", self.config.base_url, id);
        let resp = self
            .client
            .patch(&url)
            .header("api-token", self.api_key())
            .json(&RenameRequest { name: new_name })
            .send()
            .await?;

        if resp.status().is_success() {
            tracing::info!("Video renamed: {}", new_name);
            Ok(true)
        } else {
            tracing::error!("Rename failed [{}]: HTTP {}", id, resp.status());
            Ok(false)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(keys: &[&str]) -> CatalogConfig {
        CatalogConfig {
            api_keys: keys.iter().map(|k| k.to_string()).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_requires_api_key() {
        assert!(matches!(
            StreamCatalogClient::new(config(&[])),
            Err(crate::Error::CatalogApiKeyMissing)
        ));
    }

    #[test]
    fn test_api_key_rotation() {
        let client = StreamCatalogClient::new(config(&["a", "b", "c"])).unwrap();
        let keys: Vec<String> = (0..4).map(|_| client.api_key().to_string()).collect();
        assert_eq!(keys, vec!["a", "b", "c", "a"]);
    }

    #[test]
    fn test_search_page_deserialize() {
        let json = r#"{"data":[{"id":"1","name":"Movie 2003"}],"metadata":{"maxPage":4}}"#;
        let page: SearchPage = serde_json::from_str(json).unwrap();
        assert_eq!(page.data.len(), 1);
        assert_eq!(page.metadata.max_page, 4);
    }
}
