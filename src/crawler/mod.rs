//! Crawler module for web page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching with a capped retry policy
//! - Pattern-based link and flag extraction
//! - Batch scheduling over a fixed-size worker pool

mod engine;
mod fetcher;
mod scanner;

pub use engine::{CrawlEngine, CrawlOutcome, CrawlReport, EngineState};
pub use fetcher::{build_http_client, fetch_page, FetchResult};
pub use scanner::{PageScanner, ScanOutcome};

use crate::config::Config;
use crate::session::CrawlSession;
use crate::Result;

/// Runs a complete crawl from an authenticated session
///
/// Seeds the engine with the session's already-fetched first page, then
/// drains the link graph until the target flag count is reached or the
/// frontier runs dry.
pub async fn crawl(config: Config, session: CrawlSession) -> Result<CrawlReport> {
    let engine = CrawlEngine::new(config, session.client)?;
    engine.seed(&session.seed_url, &session.seed_body);
    Ok(engine.run().await)
}
