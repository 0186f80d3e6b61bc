//! Persistent application configuration model and defaults.

/// Root configuration persisted to `config.toml`.
#[derive(Debug, Clone, Default, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct Config {
    #[serde(default)]
    /// Collection source preferences.
    pub collection: CollectionConfig,
    #[serde(default)]
    /// Online cover art and reference link lookup.
    pub enrichment: EnrichmentConfig,
    #[serde(default)]
    /// Terminal logging preferences.
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct CollectionConfig {
    /// Path to the comma-separated collection export.
    #[serde(default = "default_collection_path")]
    pub path: String,
}

/// Metadata service endpoints and request preferences.
#[derive(Debug, Clone, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct EnrichmentConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_discogs_api_base")]
    pub discogs_api_base: String,
    #[serde(default = "default_wikipedia_api_base")]
    pub wikipedia_api_base: String,
    #[serde(default = "default_wikipedia_page_base")]
    pub wikipedia_page_base: String,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Requested page-image thumbnail edge, in pixels.
    #[serde(default = "default_thumbnail_size")]
    pub thumbnail_size: u32,
}

#[derive(Debug, Clone, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct LoggingConfig {
    /// One of `error`, `warn`, `info`, `debug`, `trace`.
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_true() -> bool {
    true
}

fn default_collection_path() -> String {
    "collection.csv".to_string()
}

fn default_discogs_api_base() -> String {
    "https://api.discogs.com".to_string()
}

fn default_wikipedia_api_base() -> String {
    "https://en.wikipedia.org/w/api.php".to_string()
}

fn default_wikipedia_page_base() -> String {
    "https://en.wikipedia.org/wiki".to_string()
}

fn default_user_agent() -> String {
    "VinylCollectionApp/1.0".to_string()
}

fn default_thumbnail_size() -> u32 {
    500
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for CollectionConfig {
    fn default() -> Self {
        Self {
            path: default_collection_path(),
        }
    }
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            discogs_api_base: default_discogs_api_base(),
            wikipedia_api_base: default_wikipedia_api_base(),
            wikipedia_page_base: default_wikipedia_page_base(),
            user_agent: default_user_agent(),
            thumbnail_size: default_thumbnail_size(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl LoggingConfig {
    /// Parsed level filter; unknown names fall back to `Info`.
    pub fn level_filter(&self) -> log::LevelFilter {
        self.level.trim().parse().unwrap_or(log::LevelFilter::Info)
    }
}

/// Clamps numeric settings and restores empty endpoints to their defaults.
pub fn sanitize_config(config: Config) -> Config {
    fn non_empty_or(value: String, fallback: fn() -> String) -> String {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            fallback()
        } else {
            trimmed.to_string()
        }
    }

    fn base_url_or(value: String, fallback: fn() -> String) -> String {
        non_empty_or(value.trim().trim_end_matches('/').to_string(), fallback)
    }

    let enrichment = config.enrichment;
    Config {
        collection: CollectionConfig {
            path: non_empty_or(config.collection.path, default_collection_path),
        },
        enrichment: EnrichmentConfig {
            enabled: enrichment.enabled,
            discogs_api_base: base_url_or(enrichment.discogs_api_base, default_discogs_api_base),
            wikipedia_api_base: base_url_or(
                enrichment.wikipedia_api_base,
                default_wikipedia_api_base,
            ),
            wikipedia_page_base: base_url_or(
                enrichment.wikipedia_page_base,
                default_wikipedia_page_base,
            ),
            user_agent: non_empty_or(enrichment.user_agent, default_user_agent),
            thumbnail_size: enrichment.thumbnail_size.clamp(50, 2000),
        },
        logging: config.logging,
    }
}
