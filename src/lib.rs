//! Flaghunt: a bounded concurrent flag-hunting crawler
//!
//! This crate implements a web crawler that logs into a site, then explores
//! its link graph breadth-first with a fixed-size worker pool until a target
//! number of embedded secret flags have been discovered.

pub mod config;
pub mod crawler;
pub mod output;
pub mod session;
pub mod state;

use thiserror::Error;

/// Main error type for flaghunt operations
#[derive(Debug, Error)]
pub enum HuntError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("Login failed at {url}")]
    LoginFailed { url: String },

    #[error("Login form is missing a csrfmiddlewaretoken field")]
    CsrfTokenMissing,

    #[error("Gave up on {url} after {attempts} attempts")]
    RetryExhausted { url: String, attempts: u32 },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// Result type alias for flaghunt operations
pub type Result<T> = std::result::Result<T, HuntError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{CrawlOutcome, CrawlReport};
pub use session::CrawlSession;
