//! Configuration module for flaghunt
//!
//! All settings have defaults matching the original deployment, so a config
//! file is only needed to point the crawler at a different site or to tune
//! the worker pool and retry policy.

use crate::ConfigError;
use serde::Deserialize;
use std::path::Path;
use url::Url;

/// Main configuration structure for flaghunt
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub retry: RetryConfig,
    #[serde(default)]
    pub site: SiteConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CrawlerConfig {
    /// Number of concurrent worker tasks per batch
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Crawl stops once this many flags have been collected
    #[serde(default = "default_target_flags")]
    pub target_flags: usize,

    /// Per-request timeout in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

/// Retry policy for transient server errors (HTTP 500/503)
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RetryConfig {
    /// Maximum fetch attempts per URL, including the first
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Initial backoff in milliseconds, doubled after each failed attempt
    #[serde(default = "default_backoff_ms")]
    pub backoff_ms: u64,
}

/// Target site configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SiteConfig {
    /// Site origin; relative anchors are resolved against this
    #[serde(default = "default_origin")]
    pub origin: String,

    /// Path of the login form, relative to the origin
    #[serde(default = "default_login_path")]
    pub login_path: String,

    /// Only anchors whose path starts with this prefix are followed
    #[serde(default = "default_link_prefix")]
    pub link_prefix: String,
}

fn default_workers() -> usize {
    10
}

fn default_target_flags() -> usize {
    5
}

fn default_request_timeout_secs() -> u64 {
    5
}

fn default_max_attempts() -> u32 {
    5
}

fn default_backoff_ms() -> u64 {
    250
}

fn default_origin() -> String {
    "https://project2.5700.network".to_string()
}

fn default_login_path() -> String {
    "/accounts/login/".to_string()
}

fn default_link_prefix() -> String {
    "/fakebook/".to_string()
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            workers: default_workers(),
            target_flags: default_target_flags(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            backoff_ms: default_backoff_ms(),
        }
    }
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            origin: default_origin(),
            login_path: default_login_path(),
            link_prefix: default_link_prefix(),
        }
    }
}

impl SiteConfig {
    /// Returns the absolute URL of the login form
    pub fn login_url(&self) -> Result<Url, url::ParseError> {
        Url::parse(&self.origin)?.join(&self.login_path)
    }
}

/// Loads and validates configuration from a TOML file
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let contents = std::fs::read_to_string(path)?;
    let config: Config = toml::from_str(&contents)?;
    validate_config(&config)?;
    Ok(config)
}

/// Validates a configuration, whether loaded or defaulted
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.crawler.workers == 0 {
        return Err(ConfigError::Validation(
            "crawler.workers must be at least 1".to_string(),
        ));
    }

    if config.crawler.target_flags == 0 {
        return Err(ConfigError::Validation(
            "crawler.target_flags must be at least 1".to_string(),
        ));
    }

    if config.retry.max_attempts == 0 {
        return Err(ConfigError::Validation(
            "retry.max_attempts must be at least 1".to_string(),
        ));
    }

    let origin = Url::parse(&config.site.origin)
        .map_err(|e| ConfigError::Validation(format!("site.origin is not a valid URL: {}", e)))?;
    if origin.host_str().is_none() {
        return Err(ConfigError::Validation(
            "site.origin must include a host".to_string(),
        ));
    }

    if !config.site.link_prefix.starts_with('/') {
        return Err(ConfigError::Validation(
            "site.link_prefix must start with '/'".to_string(),
        ));
    }

    Ok(())
}
