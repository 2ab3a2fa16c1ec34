use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::debug;

use super::dto::{CategorySelection, ProductRecord};
use crate::config::CatalogConfig;

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("unexpected response shape from {url}: {source}")]
    Parse {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

impl FetchError {
    pub fn url(&self) -> &str {
        match self {
            FetchError::Network { url, .. } | FetchError::Parse { url, .. } => url,
        }
    }
}

/// Read access to the remote product catalog.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    async fn products(&self, category: &CategorySelection)
        -> Result<Vec<ProductRecord>, FetchError>;
    async fn categories(&self) -> Result<Vec<String>, FetchError>;
}

/// Catalog service reached over HTTP.
#[derive(Clone)]
pub struct HttpCatalog {
    http: Client,
    base_url: String,
}

impl HttpCatalog {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(http: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { http, base_url }
    }

    pub fn from_config(config: &CatalogConfig) -> anyhow::Result<Self> {
        let mut builder = Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        Ok(Self::with_client(builder.build()?, &config.base_url))
    }

    pub fn products_url(&self, category: &CategorySelection) -> String {
        match category {
            CategorySelection::All => format!("{}/products", self.base_url),
            CategorySelection::Named(name) => {
                format!("{}/products/category/{}", self.base_url, name)
            }
        }
    }

    pub fn categories_url(&self) -> String {
        format!("{}/products/categories", self.base_url)
    }

    async fn fetch_body(&self, url: &str) -> reqwest::Result<String> {
        self.http
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await
    }

    async fn get_json<T: DeserializeOwned>(&self, url: String) -> Result<T, FetchError> {
        let body = match self.fetch_body(&url).await {
            Ok(b) => b,
            Err(source) => return Err(FetchError::Network { url, source }),
        };
        debug!(url = %url, bytes = body.len(), "catalog response");
        serde_json::from_str(&body).map_err(|source| FetchError::Parse { url, source })
    }
}

#[async_trait]
impl CatalogSource for HttpCatalog {
    async fn products(
        &self,
        category: &CategorySelection,
    ) -> Result<Vec<ProductRecord>, FetchError> {
        self.get_json(self.products_url(category)).await
    }

    async fn categories(&self) -> Result<Vec<String>, FetchError> {
        self.get_json(self.categories_url()).await
    }
}
