//! Crawler module for discovering and downloading a site
//!
//! This module contains the core crawling logic, including:
//! - Streaming HTTP downloads to disk
//! - HTML parsing and link extraction
//! - Bounded concurrent task scheduling
//! - Completion tracking over dynamically discovered work
//! - Overall crawl coordination

mod coordinator;
mod fetcher;
mod gate;
mod parser;
mod scheduler;
mod session;

pub use coordinator::{accept_anchor, accept_stylesheet, run_crawl, Coordinator, CrawlSummary};
pub use fetcher::{build_http_client, local_file_name, Fetcher};
pub use gate::{CompletionGate, TaskGuard};
pub use parser::{parse_page, DiscoveredLink, ParsedPage};
pub use scheduler::Scheduler;
pub use session::{CrawlSession, FileCounters, VisitedSet};

use crate::config::Config;
use crate::Result;

/// Runs a complete crawl operation
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Validate the seed URL and derive the session origin
/// 2. Build the HTTP client
/// 3. Create the destination folder
/// 4. Fetch pages and stylesheets, following same-origin links
/// 5. Return once every dispatched task has settled
///
/// # Arguments
///
/// * `config` - The crawler configuration
/// * `seed` - The absolute seed URL
///
/// # Returns
///
/// * `Ok(CrawlSummary)` - Crawl finished; individual failures are in the records
/// * `Err(SiftError)` - The seed was malformed or the session could not start
pub async fn crawl(config: &Config, seed: &str) -> Result<CrawlSummary> {
    run_crawl(config, seed).await
}
