//! Application configuration structures.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Remote feed endpoints and HTTP behavior
    #[serde(default)]
    pub feeds: FeedConfig,

    /// Snapshot cache TTL policy
    #[serde(default)]
    pub cache: CacheConfig,

    /// Background refresh scheduling
    #[serde(default)]
    pub refresh: RefreshConfig,

    /// Vendor API endpoints and credentials
    #[serde(default)]
    pub vendors: VendorConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Write the configuration as TOML, creating parent directories.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        url::Url::parse(&self.feeds.conference_url)
            .map_err(|e| AppError::validation(format!("feeds.conference_url: {e}")))?;
        url::Url::parse(&self.feeds.acceptance_url)
            .map_err(|e| AppError::validation(format!("feeds.acceptance_url: {e}")))?;
        if self.feeds.user_agent.trim().is_empty() {
            return Err(AppError::validation("feeds.user_agent is empty"));
        }
        if self.feeds.timeout_secs == 0 {
            return Err(AppError::validation("feeds.timeout_secs must be > 0"));
        }
        if self.cache.conference_ttl_hours == 0 {
            return Err(AppError::validation(
                "cache.conference_ttl_hours must be > 0",
            ));
        }
        if self.cache.acceptance_ttl_hours == 0 {
            return Err(AppError::validation(
                "cache.acceptance_ttl_hours must be > 0",
            ));
        }
        if self.refresh.interval_hours == 0 {
            return Err(AppError::validation("refresh.interval_hours must be > 0"));
        }
        Ok(())
    }
}

/// Remote feed endpoints and HTTP client settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    /// URL of the conference metadata feed
    #[serde(default = "defaults::conference_url")]
    pub conference_url: String,

    /// URL of the acceptance-rate feed
    #[serde(default = "defaults::acceptance_url")]
    pub acceptance_url: String,

    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            conference_url: defaults::conference_url(),
            acceptance_url: defaults::acceptance_url(),
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
        }
    }
}

/// Snapshot cache TTL policy, one TTL per data kind.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// TTL for the conference snapshot, in hours
    #[serde(default = "defaults::snapshot_ttl")]
    pub conference_ttl_hours: u64,

    /// TTL for the acceptance snapshot, in hours
    #[serde(default = "defaults::snapshot_ttl")]
    pub acceptance_ttl_hours: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            conference_ttl_hours: defaults::snapshot_ttl(),
            acceptance_ttl_hours: defaults::snapshot_ttl(),
        }
    }
}

/// Background refresh scheduling.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshConfig {
    /// Hours between refresh runs
    #[serde(default = "defaults::refresh_interval")]
    pub interval_hours: u64,

    /// Run one refresh immediately at scheduler start
    #[serde(default = "defaults::run_on_start")]
    pub run_on_start: bool,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            interval_hours: defaults::refresh_interval(),
            run_on_start: defaults::run_on_start(),
        }
    }
}

/// Vendor API endpoints and credentials.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VendorConfig {
    /// LaTeX OCR endpoint
    #[serde(default = "defaults::ocr_endpoint")]
    pub ocr_endpoint: String,

    /// OCR auth token, absent disables the client
    #[serde(default)]
    pub ocr_token: Option<String>,

    /// Publication ranking lookup endpoint
    #[serde(default = "defaults::ranking_endpoint")]
    pub ranking_endpoint: String,

    /// Ranking lookup secret key, absent disables the client
    #[serde(default)]
    pub ranking_key: Option<String>,
}

impl Default for VendorConfig {
    fn default() -> Self {
        Self {
            ocr_endpoint: defaults::ocr_endpoint(),
            ocr_token: None,
            ranking_endpoint: defaults::ranking_endpoint(),
            ranking_key: None,
        }
    }
}

mod defaults {
    // Feed defaults
    pub fn conference_url() -> String {
        "https://ccfddl.github.io/conference/allconf.yml".into()
    }
    pub fn acceptance_url() -> String {
        "https://ccfddl.github.io/conference/allacc.yml".into()
    }
    pub fn user_agent() -> String {
        "Mozilla/5.0 (compatible; confwatch/1.0)".into()
    }
    pub fn timeout() -> u64 {
        30
    }

    // Cache defaults: 7 days for both kinds
    pub fn snapshot_ttl() -> u64 {
        168
    }

    // Refresh defaults: daily
    pub fn refresh_interval() -> u64 {
        24
    }
    pub fn run_on_start() -> bool {
        true
    }

    // Vendor defaults
    pub fn ocr_endpoint() -> String {
        "https://server.simpletex.net/api/latex_ocr".into()
    }
    pub fn ranking_endpoint() -> String {
        "https://www.easyscholar.cc/open/getPublicationRank".into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_default_config_ok() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn validate_rejects_empty_feed_url() {
        let mut config = Config::default();
        config.feeds.conference_url = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_zero_ttl() {
        let mut config = Config::default();
        config.cache.conference_ttl_hours = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_zero_interval() {
        let mut config = Config::default();
        config.refresh.interval_hours = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = Config::default();
        config.refresh.interval_hours = 6;
        config.save(&path).unwrap();

        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded.refresh.interval_hours, 6);
        assert!(loaded.validate().is_ok());
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let toml = "[refresh]\ninterval_hours = 12\n";
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.refresh.interval_hours, 12);
        assert_eq!(config.cache.conference_ttl_hours, 168);
        assert!(!config.feeds.conference_url.is_empty());
    }
}
