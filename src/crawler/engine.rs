//! Crawl engine - worker-pool scheduling and termination
//!
//! The engine drains the frontier with batches of up to W concurrent
//! "process one frontier item" tasks. Each batch is raced: as soon as any
//! task finishes, the stop condition is re-checked and the rest of the
//! batch is cancelled best-effort. That wastes some in-flight work per
//! iteration, but keeps concurrency bounded at W while letting the
//! termination check fire promptly after every piece of progress.
//!
//! Results a cancelled-too-late task already applied to shared state stay
//! applied, so the final flag count may overshoot the target; that is
//! allowed. A worker that was cancelled after dequeueing its URL puts the
//! URL back via a drop guard, so no page is ever lost to cancellation.

use crate::config::{Config, RetryConfig};
use crate::crawler::fetcher::{fetch_page, FetchResult};
use crate::crawler::scanner::PageScanner;
use crate::state::{FlagVault, Frontier};
use crate::Result;
use reqwest::Client;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinSet;

/// Lifecycle of one crawl run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    /// Dispatching batches
    Running,
    /// Stop condition reached; in-flight batch being wound down
    Draining,
    /// No more work will be dispatched
    Stopped,
}

/// Why the crawl ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrawlOutcome {
    /// The target flag count was reached
    TargetReached,
    /// The frontier drained to empty with no work in flight before the
    /// target was reached
    FrontierExhausted,
}

/// Final accounting for one crawl run
#[derive(Debug)]
pub struct CrawlReport {
    pub outcome: CrawlOutcome,
    /// Collected flags in discovery order (may exceed the target)
    pub flags: Vec<String>,
    pub elapsed: Duration,
}

/// Owns the worker pool and the shared crawl state for one run
pub struct CrawlEngine {
    config: Arc<Config>,
    client: Client,
    frontier: Arc<Frontier>,
    vault: Arc<FlagVault>,
    scanner: Arc<PageScanner>,
}

impl CrawlEngine {
    /// Creates an engine around an already-authenticated HTTP client
    pub fn new(config: Config, client: Client) -> Result<Self> {
        let scanner = Arc::new(PageScanner::new(&config.site)?);
        Ok(Self {
            config: Arc::new(config),
            client,
            frontier: Arc::new(Frontier::new()),
            vault: Arc::new(FlagVault::new()),
            scanner,
        })
    }

    /// Seeds the crawl from the already-fetched first page
    ///
    /// The seed page is scanned once, outside the pool: its URL goes to the
    /// visited set (never to the queue), its links go to the frontier, and
    /// its flag, if any, goes straight to the vault.
    pub fn seed(&self, seed_url: &str, seed_body: &str) {
        self.frontier.mark_visited(seed_url);

        let outcome = self.scanner.scan(seed_body);
        for link in &outcome.links {
            self.frontier.try_enqueue(link);
        }
        if let Some(flag) = outcome.flag {
            let count = self.vault.append(flag.clone());
            tracing::info!(
                "Found secret flag {}/{}: {}",
                count,
                self.config.crawler.target_flags,
                flag
            );
        }

        tracing::info!(
            "Seeded frontier with {} URLs from {}",
            self.frontier.queued_len(),
            seed_url
        );
    }

    /// Runs batches of workers until the target flag count is reached or
    /// the frontier is exhausted
    pub async fn run(&self) -> CrawlReport {
        let start = Instant::now();
        let target = self.config.crawler.target_flags;
        let workers = self.config.crawler.workers;
        let mut state = EngineState::Running;
        tracing::debug!("Engine state: {:?}", state);

        let outcome = loop {
            if self.vault.count() >= target {
                break CrawlOutcome::TargetReached;
            }
            if self.frontier.is_empty() {
                // No batch is in flight at this point, so an empty queue
                // means no further progress is possible
                break CrawlOutcome::FrontierExhausted;
            }

            // Dispatch up to W tasks, but never more than the queue holds:
            // surplus tasks would no-op instantly, win the completion race,
            // and get the one real fetch aborted every iteration
            let batch_size = workers.min(self.frontier.queued_len()).max(1);
            let mut batch = JoinSet::new();
            for _ in 0..batch_size {
                batch.spawn(process_one(
                    self.client.clone(),
                    Arc::clone(&self.frontier),
                    Arc::clone(&self.vault),
                    Arc::clone(&self.scanner),
                    self.config.retry.clone(),
                    target,
                ));
            }

            // Re-check the stop condition as soon as any task completes
            if let Some(first) = batch.join_next().await {
                log_task_result(first);
            }

            if state == EngineState::Running && self.vault.count() >= target {
                state = EngineState::Draining;
                tracing::debug!("Engine state: {:?}", state);
            }

            // Cancel the rest of the batch best-effort and wait it out.
            // Tasks past their last await point still land their results.
            batch.abort_all();
            while let Some(res) = batch.join_next().await {
                log_task_result(res);
            }
        };

        state = EngineState::Stopped;
        tracing::debug!("Engine state: {:?}", state);

        let report = CrawlReport {
            outcome,
            flags: self.vault.flags(),
            elapsed: start.elapsed(),
        };
        tracing::info!(
            "Crawl stopped ({:?}): {} flags, {} URLs visited, {:.3}s",
            report.outcome,
            report.flags.len(),
            self.frontier.visited_len(),
            report.elapsed.as_secs_f64()
        );
        report
    }

    /// Shared frontier, exposed for seeding checks and tests
    pub fn frontier(&self) -> &Frontier {
        &self.frontier
    }

    /// Shared flag vault, exposed for progress checks and tests
    pub fn vault(&self) -> &FlagVault {
        &self.vault
    }
}

/// Returns a dequeued URL to the frontier unless disarmed.
///
/// Covers the window between dequeue and scan: if the task is aborted while
/// its fetch is in flight, the future is dropped and the guard puts the URL
/// back so a later batch can finish the job.
struct RequeueGuard {
    frontier: Arc<Frontier>,
    url: Option<String>,
}

impl RequeueGuard {
    fn disarm(&mut self) {
        self.url = None;
    }
}

impl Drop for RequeueGuard {
    fn drop(&mut self) {
        if let Some(url) = self.url.take() {
            tracing::debug!("Returning {} to the frontier after cancellation", url);
            self.frontier.requeue(url);
        }
    }
}

/// One worker iteration: pop a URL, fetch it, scan it, push what it finds.
///
/// An empty frontier is a no-op, not an error; the engine polls again next
/// batch. A fetch failure fails only this task and drops the URL.
async fn process_one(
    client: Client,
    frontier: Arc<Frontier>,
    vault: Arc<FlagVault>,
    scanner: Arc<PageScanner>,
    retry: RetryConfig,
    target: usize,
) -> Result<()> {
    let Some(url) = frontier.try_dequeue() else {
        return Ok(());
    };

    let mut guard = RequeueGuard {
        frontier: Arc::clone(&frontier),
        url: Some(url.clone()),
    };
    let fetched = fetch_page(&client, &url, &retry).await;
    guard.disarm();

    match fetched? {
        FetchResult::Success { body, .. } => {
            let outcome = scanner.scan(&body);
            for link in &outcome.links {
                frontier.try_enqueue(link);
            }
            if let Some(flag) = outcome.flag {
                let count = vault.append(flag.clone());
                tracing::info!("Found secret flag {}/{}: {}", count, target, flag);
            }
        }
        FetchResult::Skip { status } => {
            tracing::debug!("Skipping {} (HTTP {})", url, status);
        }
        FetchResult::Unknown { status } => {
            tracing::warn!("Unknown status code {} for {}", status, url);
        }
    }

    Ok(())
}

fn log_task_result(res: std::result::Result<Result<()>, tokio::task::JoinError>) {
    match res {
        Ok(Ok(())) => {}
        Ok(Err(e)) => tracing::warn!("Worker task failed: {}", e),
        Err(e) if e.is_cancelled() => {}
        Err(e) => tracing::error!("Worker task panicked: {}", e),
    }
}
