//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the logic that coordinates all aspects of a crawl:
//! - Deriving the session (origin, destination folder) from the seed
//! - Deciding which discovered links become tasks
//! - Dispatching page and stylesheet tasks without duplicates
//! - Waiting for the transitive closure of dispatched work

use crate::config::{Config, CrawlerConfig};
use crate::crawler::fetcher::{build_http_client, Fetcher};
use crate::crawler::parser::{parse_page, DiscoveredLink, ParsedPage};
use crate::crawler::scheduler::Scheduler;
use crate::crawler::session::CrawlSession;
use crate::state::{CrawlTask, DownloadRecord, ResourceKind};
use crate::url::{extension, without_fragment, Origin};
use crate::Result;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};
use url::Url;

/// Result of a finished crawl
#[derive(Debug, Clone)]
pub struct CrawlSummary {
    /// Seed URL as requested
    pub start_url: Url,

    /// Directory the downloads were written to
    pub destination: std::path::PathBuf,

    /// Every settled download, in completion order
    pub records: Vec<DownloadRecord>,

    /// Number of tasks dispatched (equals `records.len()` once settled)
    pub dispatched: usize,

    /// Wall-clock time from first dispatch to gate close
    pub elapsed: Duration,
}

/// Main crawler coordinator structure
///
/// Shared behind an `Arc` by every running task.
pub struct Coordinator {
    crawler_config: CrawlerConfig,
    session: CrawlSession,
    fetcher: Fetcher,
    scheduler: Scheduler,
}

impl Coordinator {
    /// Creates a new coordinator instance
    ///
    /// # Arguments
    ///
    /// * `config` - The crawler configuration
    /// * `seed` - The absolute seed URL
    ///
    /// # Returns
    ///
    /// * `Ok(Arc<Coordinator>)` - Ready to run
    /// * `Err(SiftError)` - The seed is malformed or the client failed to build
    pub fn new(config: &Config, seed: &str) -> Result<Arc<Self>> {
        let session = CrawlSession::new(seed, Path::new(&config.output.root_dir))?;
        let client = build_http_client(&config.crawler, &config.user_agent)?;
        let fetcher = Fetcher::new(
            client,
            Duration::from_secs(config.crawler.fetch_timeout_secs),
        );
        let scheduler = Scheduler::new(config.crawler.max_concurrent_fetches as usize);

        Ok(Arc::new(Self {
            crawler_config: config.crawler.clone(),
            session,
            fetcher,
            scheduler,
        }))
    }

    pub fn session(&self) -> &CrawlSession {
        &self.session
    }

    /// Runs the crawl to completion
    ///
    /// 1. Creates the destination folder
    /// 2. Dispatches the seed page
    /// 3. Waits until every transitively dispatched task has settled
    ///
    /// Only a failure to create the destination folder is returned as an
    /// error; individual fetch failures end up in the summary's records.
    pub async fn run(self: &Arc<Self>) -> Result<CrawlSummary> {
        let destination = self.session.destination();
        tokio::fs::create_dir_all(destination).await?;

        tracing::info!(
            "Crawling {} (origin {}) into {}",
            self.session.start_url(),
            self.session.origin(),
            destination.display()
        );

        let start_time = Instant::now();
        self.enqueue(CrawlTask::seed(self.session.start_url().clone()));
        self.scheduler.wait_idle().await;

        let records = self.session.take_records();
        let seed_saved = records
            .iter()
            .any(|record| record.url == *self.session.start_url() && record.is_saved());
        if !seed_saved {
            tracing::error!(
                "Seed page {} could not be fetched; nothing was crawled",
                self.session.start_url()
            );
        }

        tracing::info!(
            "Crawl completed: {} tasks settled in {:?}",
            records.len(),
            start_time.elapsed()
        );

        Ok(CrawlSummary {
            start_url: self.session.start_url().clone(),
            destination: destination.to_path_buf(),
            records,
            dispatched: self.scheduler.dispatched(),
            elapsed: start_time.elapsed(),
        })
    }

    /// Claims a URL in the visited set and dispatches its task
    ///
    /// Returns false if the URL had already been claimed. Claiming and
    /// dispatching happen before the calling task settles, which keeps the
    /// completion gate open for the new task.
    fn enqueue(self: &Arc<Self>, task: CrawlTask) -> bool {
        if !self.session.visited().insert(&task.url) {
            tracing::trace!("Already visited: {}", task.url);
            return false;
        }

        tracing::debug!("Dispatching {} {}", task.kind, task.url);
        let coordinator = Arc::clone(self);
        self.scheduler.dispatch(async move {
            coordinator.process(task).await;
        });
        true
    }

    /// Fetches one task and, for pages, follows its links
    ///
    /// Links are resolved against the URL the page was finally served from.
    /// A page that redirected outside the session origin is discarded and
    /// not followed.
    async fn process(self: &Arc<Self>, task: CrawlTask) {
        let mut record = self.fetcher.fetch(&task, &self.session).await;

        if record.was_redirected() {
            if !self.session.origin().contains(&record.final_url) {
                record = self.reject_off_origin(record).await;
            } else {
                // Later links to the redirect target are already covered
                self.session.visited().insert(&record.final_url);
            }
        }

        if task.kind.is_recursive() {
            if let Some(path) = record.path() {
                match read_page(path).await {
                    Ok(html) => {
                        let parsed = parse_page(&html, &record.final_url);
                        self.handle_discovered_links(&record.final_url, &parsed);
                    }
                    Err(e) => {
                        tracing::warn!(
                            "Failed to read saved page {}: {}",
                            path.display(),
                            e
                        );
                    }
                }
            }
        }

        self.session.record(record);
    }

    /// Turns a page that redirected to another origin into a failed record
    ///
    /// Stylesheets may come from any origin and are kept.
    async fn reject_off_origin(&self, record: DownloadRecord) -> DownloadRecord {
        if !record.kind.is_recursive() {
            return record;
        }

        tracing::warn!(
            "{} redirected outside {} to {}; not following",
            record.url,
            self.session.origin(),
            record.final_url
        );
        if let Some(path) = record.path() {
            if let Err(e) = tokio::fs::remove_file(path).await {
                tracing::warn!("Could not remove {}: {}", path.display(), e);
            }
        }

        let reason = format!("redirected outside origin to {}", record.final_url);
        DownloadRecord::failed(record.url, record.kind, reason)
            .with_final_url(record.final_url)
            .with_referrer(record.referrer)
    }

    /// Applies exclusion rules and dispatches accepted links
    ///
    /// Returns the number of new tasks dispatched.
    fn handle_discovered_links(
        self: &Arc<Self>,
        page_url: &Url,
        parsed: &ParsedPage,
    ) -> usize {
        let mut dispatched = 0;

        for link in &parsed.stylesheets {
            if !accept_stylesheet(link) || self.skips(&link.url) {
                tracing::trace!("Skipping stylesheet {} on {}", link.href, page_url);
                continue;
            }
            let url = without_fragment(link.url.clone());
            let task = CrawlTask::discovered(url, ResourceKind::Stylesheet, page_url);
            if self.enqueue(task) {
                dispatched += 1;
            }
        }

        for link in &parsed.anchors {
            if !accept_anchor(link, self.session.origin()) || self.skips(&link.url) {
                tracing::trace!("Skipping anchor {} on {}", link.href, page_url);
                continue;
            }
            let url = without_fragment(link.url.clone());
            let task = CrawlTask::discovered(url, ResourceKind::Page, page_url);
            if self.enqueue(task) {
                dispatched += 1;
            }
        }

        tracing::debug!("{} new tasks from {}", dispatched, page_url);
        dispatched
    }

    /// Returns true if the URL names a payload that cannot be audited
    fn skips(&self, url: &Url) -> bool {
        extension(url).map_or(false, |ext| self.crawler_config.skips_extension(&ext))
    }
}

/// Returns true if an anchor should be crawled as a page
///
/// Excludes fragment-only links, `mailto:` links, non-http(s) schemes and
/// anything outside the session origin.
pub fn accept_anchor(link: &DiscoveredLink, origin: &Origin) -> bool {
    if link.href.starts_with('#') {
        return false;
    }
    if link
        .href
        .get(..7)
        .map_or(false, |scheme| scheme.eq_ignore_ascii_case("mailto:"))
    {
        return false;
    }
    if link.url.scheme() != "http" && link.url.scheme() != "https" {
        return false;
    }
    origin.contains(&link.url)
}

/// Returns true if a stylesheet link should be downloaded
///
/// Excludes protocol-relative hrefs (`//cdn...`) and hrefs carrying a
/// fragment marker.
pub fn accept_stylesheet(link: &DiscoveredLink) -> bool {
    if link.href.starts_with("//") || link.href.contains('#') {
        return false;
    }
    link.url.scheme() == "http" || link.url.scheme() == "https"
}

/// Reads a saved page, replacing invalid UTF-8
async fn read_page(path: &Path) -> std::io::Result<String> {
    let bytes = tokio::fs::read(path).await?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Runs a complete crawl for a seed URL
///
/// # Example
///
/// ```no_run
/// use stylesift::config::Config;
/// use stylesift::crawler::run_crawl;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let summary = run_crawl(&Config::default(), "https://example.com/").await?;
/// println!("{} downloads", summary.records.len());
/// # Ok(())
/// # }
/// ```
pub async fn run_crawl(config: &Config, seed: &str) -> Result<CrawlSummary> {
    let coordinator = Coordinator::new(config, seed)?;
    coordinator.run().await
}
