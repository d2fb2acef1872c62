use crate::error::{CatalogError, Result};
use crate::store::push_id_with_counter;
use crate::store::traits::KvStore;
use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::sync::atomic::AtomicU64;
use std::time::Duration;
use tracing::{debug, warn};

/// REST-backed key-value store client
///
/// Speaks the hosted realtime-database convention: each path maps to
/// `{base_url}/{path}.json`, GET reads the subtree, PUT replaces it and
/// DELETE (or a PUT of null) removes it.
pub struct RestKvStore {
    client: Client,
    base_url: String,
    counter: AtomicU64,
}

impl RestKvStore {
    /// Create a new REST store client for a database base URL
    pub fn new(base_url: impl Into<String>) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            counter: AtomicU64::new(0),
        })
    }

    fn url_for(&self, path: &str) -> String {
        format!("{}/{}.json", self.base_url, path.trim_matches('/'))
    }
}

#[async_trait]
impl KvStore for RestKvStore {
    async fn get(&self, path: &str) -> Result<Option<Value>> {
        let url = self.url_for(path);
        debug!("GET {}", url);

        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            warn!("store returned status {} for GET {}", response.status(), url);
            return Err(CatalogError::store(format!(
                "GET {} failed with status {}",
                path,
                response.status()
            )));
        }

        let value: Value = response.json().await?;
        if value.is_null() {
            return Ok(None);
        }
        Ok(Some(value))
    }

    async fn put(&self, path: &str, value: Value) -> Result<()> {
        if value.is_null() {
            return self.delete(path).await;
        }
        let url = self.url_for(path);
        debug!("PUT {}", url);

        let response = self.client.put(&url).json(&value).send().await?;
        if !response.status().is_success() {
            warn!("store returned status {} for PUT {}", response.status(), url);
            return Err(CatalogError::store(format!(
                "PUT {} failed with status {}",
                path,
                response.status()
            )));
        }
        Ok(())
    }

    async fn delete(&self, path: &str) -> Result<()> {
        let url = self.url_for(path);
        debug!("DELETE {}", url);

        let response = self.client.delete(&url).send().await?;
        if !response.status().is_success() {
            warn!(
                "store returned status {} for DELETE {}",
                response.status(),
                url
            );
            return Err(CatalogError::store(format!(
                "DELETE {} failed with status {}",
                path,
                response.status()
            )));
        }
        Ok(())
    }

    fn push_id(&self) -> String {
        push_id_with_counter(&self.counter)
    }

    fn backend_name(&self) -> &'static str {
        "rest"
    }
}
