//! Stylesift main entry point
//!
//! This is the command-line interface for the Stylesift site crawler and
//! feature auditor.

use chrono::Utc;
use clap::Parser;
use std::path::{Path, PathBuf};
use stylesift::audit::run_audit;
use stylesift::config::{load_config_with_hash, Config};
use stylesift::crawler::crawl;
use stylesift::output::{
    generate_markdown_report, print_audit_report, print_statistics, CrawlStatistics, ReportMeta,
};
use tracing_subscriber::EnvFilter;

/// Stylesift: a single-site stylesheet auditor
///
/// Stylesift crawls every same-origin page reachable from a seed URL,
/// downloads the pages and their stylesheets, and reports which modern
/// CSS and HTML features the site uses.
#[derive(Parser, Debug)]
#[command(name = "stylesift")]
#[command(version)]
#[command(about = "Crawl a site and audit its CSS and HTML features", long_about = None)]
struct Cli {
    /// Absolute http(s) URL to start crawling from
    #[arg(value_name = "SEED_URL")]
    seed: String,

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
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let (config, config_hash) = load_configuration(cli.config.as_deref())?;

    let summary = match crawl(&config, &cli.seed).await {
        Ok(summary) => summary,
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            return Err(e.into());
        }
    };

    let stats = CrawlStatistics::from_summary(&summary);
    if !cli.quiet {
        print_statistics(&stats);
    }

    // The gate has closed, so every file in the destination is final
    let report = match run_audit(&summary.destination) {
        Ok(report) => report,
        Err(e) => {
            tracing::error!("Audit failed: {}", e);
            return Err(e.into());
        }
    };
    print_audit_report(&report);

    if let Some(report_path) = &config.output.report_path {
        let meta = ReportMeta {
            start_url: summary.start_url.to_string(),
            destination: summary.destination.display().to_string(),
            generated_at: Utc::now(),
            config_hash,
        };
        generate_markdown_report(&report, &stats, &meta, Path::new(report_path))?;
        tracing::info!("Markdown report written to: {}", report_path);
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("stylesift=info,warn"),
            1 => EnvFilter::new("stylesift=debug,info"),
            2 => EnvFilter::new("stylesift=trace,debug"),
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

/// Loads the configuration file if one was given, otherwise the defaults
fn load_configuration(
    path: Option<&Path>,
) -> Result<(Config, Option<String>), Box<dyn std::error::Error>> {
    let Some(path) = path else {
        tracing::debug!("No configuration file given, using defaults");
        return Ok((Config::default(), None));
    };

    tracing::info!("Loading configuration from: {}", path.display());
    match load_config_with_hash(path) {
        Ok((config, hash)) => {
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            Ok((config, Some(hash)))
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            Err(e.into())
        }
    }
}
