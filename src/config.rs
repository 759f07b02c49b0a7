//! # Aggregator configuration
//!
//! Configuration is loaded with precedence: Env vars > Config file > Defaults
//!
//! # Example config file (scoutlink.toml)
//! ```toml
//! [sources]
//! search_index_url = "http://search.internal:9200"
//! partner_a_url = "https://frc-api.example.org/v3"
//! partner_b_url = "https://ftc-api.example.org/v2"
//!
//! [paging]
//! default_page_size = 25
//! max_page_size = 100
//! ```

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

/// Main configuration for the aggregation core.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregatorConfig {
    /// Upstream source endpoints
    pub sources: SourcesConfig,
    /// Single-record lookup behavior
    pub lookup: LookupConfig,
    /// List pagination bounds
    pub paging: PagingConfig,
    /// Reconciled-record cache sizing
    pub cache: CacheConfig,
}

impl AggregatorConfig {
    /// Load configuration with precedence: Env > File > Defaults
    ///
    /// # Arguments
    /// * `config_path` - Optional path to TOML config file
    pub fn load(config_path: Option<&str>) -> Result<Self, ConfigError> {
        let mut figment = Figment::new().merge(Serialized::defaults(AggregatorConfig::default()));

        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        figment = figment.merge(Env::prefixed("SCOUTLINK_").split("__"));

        figment.extract().map_err(ConfigError::from)
    }
}

/// Endpoints for the three upstream source families.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourcesConfig {
    /// Authoritative full-text search index
    pub search_index_url: String,
    /// Partner results API serving the FRC program
    pub partner_a_url: String,
    /// Partner results API serving the FTC program
    pub partner_b_url: String,
    /// Local override store
    pub local_store_url: String,
    /// Per-call upstream timeout in milliseconds
    pub timeout_ms: u64,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            search_index_url: "http://localhost:9200".to_string(),
            partner_a_url: "http://localhost:8081".to_string(),
            partner_b_url: "http://localhost:8082".to_string(),
            local_store_url: "http://localhost:8083".to_string(),
            timeout_ms: 5_000,
        }
    }
}

/// Retry behavior for primary single-record lookups.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LookupConfig {
    /// Additional attempts against the primary source after a transport
    /// failure (0 = fail on the first error)
    pub retries: u32,
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self { retries: 1 }
    }
}

/// Page size bounds for list queries.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PagingConfig {
    /// Page size used when the caller does not ask for one
    pub default_page_size: u64,
    /// Upper bound on caller-requested page sizes
    pub max_page_size: u64,
}

impl PagingConfig {
    /// Effective page size for a request, bounded to `1..=max_page_size`.
    pub fn effective_page_size(&self, requested: Option<u64>) -> u64 {
        requested
            .unwrap_or(self.default_page_size)
            .min(self.max_page_size)
            .max(1)
    }
}

impl Default for PagingConfig {
    fn default() -> Self {
        Self {
            default_page_size: 25,
            max_page_size: 100,
        }
    }
}

/// Sizing for the reconciled-record cache.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Maximum cached records per entity kind
    pub capacity: usize,
    /// Entry time-to-live in seconds
    pub ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: 4_096,
            ttl_secs: 300,
        }
    }
}

/// Configuration error.
#[derive(Debug)]
pub struct ConfigError {
    pub message: String,
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "configuration error: {}", self.message)
    }
}

impl std::error::Error for ConfigError {}

impl From<figment::Error> for ConfigError {
    fn from(e: figment::Error) -> Self {
        Self {
            message: e.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = AggregatorConfig::default();
        assert_eq!(config.paging.default_page_size, 25);
        assert_eq!(config.lookup.retries, 1);
        assert_eq!(config.cache.ttl_secs, 300);
    }

    #[test]
    fn toml_layer_overrides_defaults() {
        let figment = Figment::new()
            .merge(Serialized::defaults(AggregatorConfig::default()))
            .merge(Toml::string(
                r#"
                [paging]
                default_page_size = 10

                [sources]
                search_index_url = "http://search:9200"
                "#,
            ));
        let config: AggregatorConfig = figment.extract().unwrap();
        assert_eq!(config.paging.default_page_size, 10);
        assert_eq!(config.paging.max_page_size, 100);
        assert_eq!(config.sources.search_index_url, "http://search:9200");
    }

    #[test]
    fn effective_page_size_is_bounded() {
        let paging = PagingConfig::default();
        assert_eq!(paging.effective_page_size(None), 25);
        assert_eq!(paging.effective_page_size(Some(10)), 10);
        assert_eq!(paging.effective_page_size(Some(10_000)), 100);
        assert_eq!(paging.effective_page_size(Some(0)), 1);
    }
}
