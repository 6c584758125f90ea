//! Flaghunt main entry point
//!
//! Command-line interface for the flag-hunting crawler: authenticate, seed,
//! crawl until the target flag count is reached, print the report.

use anyhow::Context;
use clap::Parser;
use flaghunt::config::{load_config, validate_config, Config};
use flaghunt::crawler::crawl;
use flaghunt::output::print_report;
use flaghunt::session::login;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Flaghunt: a bounded concurrent flag-hunting crawler
#[derive(Parser, Debug)]
#[command(name = "flaghunt")]
#[command(version)]
#[command(about = "Crawl an authenticated site until the secret flags are found", long_about = None)]
struct Cli {
    /// Account username
    username: String,

    /// Account password
    password: String,

    /// Path to an optional TOML configuration file
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let config = match &cli.config {
        Some(path) => load_config(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => {
            let config = Config::default();
            validate_config(&config)?;
            config
        }
    };

    tracing::info!(
        "Starting crawl: {} workers, target {} flags, site {}",
        config.crawler.workers,
        config.crawler.target_flags,
        config.site.origin
    );

    let session = login(&config, &cli.username, &cli.password)
        .await
        .context("login failed")?;

    let report = crawl(config, session).await?;
    print_report(&report);

    Ok(())
}

/// Sets up the tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("flaghunt=info,warn"),
            1 => EnvFilter::new("flaghunt=debug,info"),
            2 => EnvFilter::new("flaghunt=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}
