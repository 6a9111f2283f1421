//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building HTTP clients with proper user agent strings
//! - Streaming GET requests written straight to disk
//! - Deterministic, collision-free local filenames
//! - Converting every failure into a failed download record

use crate::config::{CrawlerConfig, UserAgentConfig};
use crate::crawler::session::CrawlSession;
use crate::state::{CrawlTask, DownloadRecord, ResourceKind};
use crate::url::last_segment;
use crate::FetchError;
use futures::StreamExt;
use reqwest::{redirect::Policy, Client};
use std::path::Path;
use std::time::Duration;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use url::Url;

/// Builds an HTTP client with proper configuration
///
/// The overall per-fetch deadline is enforced by [`Fetcher`] so that it
/// also covers writing the body to disk; the client only bounds connecting.
///
/// # Example
///
/// ```no_run
/// use stylesift::config::Config;
/// use stylesift::crawler::build_http_client;
///
/// let config = Config::default();
/// let client = build_http_client(&config.crawler, &config.user_agent).unwrap();
/// ```
pub fn build_http_client(
    crawler: &CrawlerConfig,
    user_agent: &UserAgentConfig,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent.header_value())
        .connect_timeout(Duration::from_secs(crawler.connect_timeout_secs))
        .redirect(Policy::limited(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Downloads resources to the session's destination folder
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
    timeout: Duration,
}

impl Fetcher {
    /// Creates a fetcher with a per-fetch deadline
    pub fn new(client: Client, timeout: Duration) -> Self {
        Self { client, timeout }
    }

    /// Fetches a task's URL and saves the body
    ///
    /// # Request Flow
    ///
    /// 1. Claim the next sequence number for the task's kind and derive the
    ///    local filename
    /// 2. Send GET; any non-2xx status is a failure
    /// 3. Stream the body chunk by chunk into the file
    /// 4. Flush and report the number of bytes written and the final URL
    ///    after redirects
    ///
    /// The whole flow runs under the configured timeout. On any failure the
    /// error is logged with the URL, a partially written file is removed,
    /// and a failed record is returned; nothing is propagated.
    pub async fn fetch(&self, task: &CrawlTask, session: &CrawlSession) -> DownloadRecord {
        let sequence = session.next_sequence(task.kind);
        let file_name = local_file_name(session.folder(), sequence, task.kind, &task.url);
        let path = session.destination().join(file_name);

        let result = match tokio::time::timeout(self.timeout, self.download(&task.url, &path)).await
        {
            Ok(result) => result,
            Err(_) => Err(FetchError::Timeout {
                url: task.url.to_string(),
            }),
        };

        match result {
            Ok((final_url, bytes)) => {
                tracing::debug!(
                    "Saved {} {} ({} bytes) to {}",
                    task.kind,
                    task.url,
                    bytes,
                    path.display()
                );
                DownloadRecord::saved(task.url.clone(), task.kind, path, bytes)
                    .with_final_url(final_url)
                    .with_referrer(task.referrer.clone())
            }
            Err(e) => {
                match &task.referrer {
                    Some(referrer) => tracing::warn!(
                        "Failed to fetch {} {} (linked from {}): {}",
                        task.kind,
                        task.url,
                        referrer,
                        e
                    ),
                    None => tracing::warn!("Failed to fetch {} {}: {}", task.kind, task.url, e),
                }
                discard_partial(&path).await;
                DownloadRecord::failed(task.url.clone(), task.kind, e.to_string())
                    .with_referrer(task.referrer.clone())
            }
        }
    }

    /// Streams the response body for `url` into `path`
    ///
    /// Returns the URL the body was served from once redirects were followed,
    /// along with the number of bytes written.
    async fn download(&self, url: &Url, path: &Path) -> Result<(Url, u64), FetchError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|source| FetchError::Http {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let write_error = |source: std::io::Error| FetchError::Write {
            path: path.display().to_string(),
            source,
        };

        let final_url = response.url().clone();
        let mut file = File::create(path).await.map_err(write_error)?;
        let mut stream = response.bytes_stream();
        let mut written: u64 = 0;

        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|source| FetchError::Http {
                url: url.to_string(),
                source,
            })?;
            file.write_all(&chunk).await.map_err(write_error)?;
            written += chunk.len() as u64;
        }

        file.flush().await.map_err(write_error)?;
        Ok((final_url, written))
    }
}

/// Removes a file left behind by a failed download, if any
async fn discard_partial(path: &Path) {
    match tokio::fs::remove_file(path).await {
        Ok(()) => tracing::debug!("Removed partial download {}", path.display()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => tracing::warn!(
            "Could not remove partial download {}: {}",
            path.display(),
            e
        ),
    }
}

/// Derives the local filename for a download
///
/// Format: `{folder}_{sequence}_{base_name}` where `base_name` is the last
/// path segment of the URL with unsafe characters replaced by `_`, or
/// `index` when the path has no segment. Pages always end in `.html`;
/// stylesheets keep their extension and get `.css` only when they have none.
///
/// # Examples
///
/// ```
/// use stylesift::crawler::local_file_name;
/// use stylesift::ResourceKind;
/// use url::Url;
///
/// let url = Url::parse("https://example.com/css/style.css?v=3").unwrap();
/// assert_eq!(
///     local_file_name("example_com", 2, ResourceKind::Stylesheet, &url),
///     "example_com_2_style.css"
/// );
///
/// let url = Url::parse("https://example.com/").unwrap();
/// assert_eq!(
///     local_file_name("example_com", 1, ResourceKind::Page, &url),
///     "example_com_1_index.html"
/// );
/// ```
pub fn local_file_name(folder: &str, sequence: u64, kind: ResourceKind, url: &Url) -> String {
    let base = last_segment(url)
        .map(sanitize_segment)
        .filter(|segment| !segment.is_empty() && segment.chars().any(|c| c != '.'))
        .unwrap_or_else(|| "index".to_string());

    let base = match kind {
        ResourceKind::Page if !base.to_ascii_lowercase().ends_with(".html") => {
            format!("{}.html", base)
        }
        ResourceKind::Stylesheet if !has_extension(&base) => {
            format!("{}.{}", base, kind.default_extension())
        }
        _ => base,
    };

    format!("{}_{}_{}", folder, sequence, base)
}

/// Replaces characters that are unsafe in filenames
fn sanitize_segment(segment: &str) -> String {
    segment
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

fn has_extension(name: &str) -> bool {
    matches!(name.rsplit_once('.'), Some((stem, ext)) if !stem.is_empty() && !ext.is_empty())
}
