use serde::Deserialize;

pub const DEFAULT_CATALOG_URL: &str = "https://fakestoreapi.com";

#[derive(Debug, Clone, Deserialize)]
pub struct CatalogConfig {
    pub base_url: String,
    pub timeout_secs: Option<u64>,
    pub offer_seed: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: Option<String>,
    pub catalog: CatalogConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(var: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let catalog = CatalogConfig {
            base_url: var("CATALOG_BASE_URL").unwrap_or_else(|| DEFAULT_CATALOG_URL.into()),
            timeout_secs: parse_opt(&var, "CATALOG_TIMEOUT_SECS")?,
            offer_seed: parse_opt(&var, "OFFER_SEED")?,
        };
        let database_url = var("DATABASE_URL").filter(|v| !v.is_empty());
        Ok(Self {
            database_url,
            catalog,
        })
    }
}

fn parse_opt(var: &impl Fn(&str) -> Option<String>, key: &str) -> anyhow::Result<Option<u64>> {
    var(key)
        .map(|v| {
            v.parse::<u64>()
                .map_err(|e| anyhow::anyhow!("invalid {key}={v:?}: {e}"))
        })
        .transpose()
}
