//! Per-crawl shared state
//!
//! A [`CrawlSession`] is created for one crawl invocation and holds the only
//! mutable state shared between tasks: the visited set, the two filename
//! counters and the collected download records.

use crate::state::{DownloadRecord, ResourceKind};
use crate::url::{folder_name, normalize, parse_http_url, Origin};
use crate::UrlError;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};
use url::Url;

/// Set of normalized URLs already dispatched
///
/// URLs are normalized on the way in, so `/docs`, `/docs/` and `/docs#top`
/// share one entry while the caller keeps the URL it will actually request.
#[derive(Debug, Default)]
pub struct VisitedSet {
    inner: Mutex<HashSet<String>>,
}

impl VisitedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a URL, returning true if it was not present
    ///
    /// Check and insert happen under one lock acquisition, so of two
    /// concurrent discoveries of the same URL exactly one gets `true`.
    pub fn insert(&self, url: &Url) -> bool {
        let key = visit_key(url);
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key)
    }

    pub fn contains(&self, url: &Url) -> bool {
        let key = visit_key(url);
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(&key)
    }

    pub fn len(&self) -> usize {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn visit_key(url: &Url) -> String {
    normalize(url.clone()).into()
}

/// Independent per-kind sequence numbers for download filenames
#[derive(Debug, Default)]
pub struct FileCounters {
    pages: AtomicU64,
    stylesheets: AtomicU64,
}

impl FileCounters {
    /// Returns the next number for the given kind, starting at 1
    pub fn next(&self, kind: ResourceKind) -> u64 {
        let counter = match kind {
            ResourceKind::Page => &self.pages,
            ResourceKind::Stylesheet => &self.stylesheets,
        };
        counter.fetch_add(1, Ordering::Relaxed) + 1
    }
}

/// Root container for one crawl invocation
#[derive(Debug)]
pub struct CrawlSession {
    start_url: Url,
    origin: Origin,
    folder: String,
    destination: PathBuf,
    visited: VisitedSet,
    counters: FileCounters,
    records: Mutex<Vec<DownloadRecord>>,
}

impl CrawlSession {
    /// Creates a session for a seed URL
    ///
    /// # Arguments
    ///
    /// * `seed` - The absolute seed URL
    /// * `root_dir` - Directory under which the site folder is placed
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlSession)` - The seed is a valid absolute http(s) URL; its
    ///   path is kept as written
    /// * `Err(UrlError)` - The seed could not be parsed
    pub fn new(seed: &str, root_dir: &Path) -> Result<Self, UrlError> {
        let start_url = parse_http_url(seed)?;
        let origin = Origin::of(&start_url)?;
        let folder = folder_name(&start_url).ok_or(UrlError::MissingDomain)?;
        let destination = root_dir.join(&folder);

        Ok(Self {
            start_url,
            origin,
            folder,
            destination,
            visited: VisitedSet::new(),
            counters: FileCounters::default(),
            records: Mutex::new(Vec::new()),
        })
    }

    pub fn start_url(&self) -> &Url {
        &self.start_url
    }

    pub fn origin(&self) -> &Origin {
        &self.origin
    }

    /// Folder name derived from the seed host, e.g. `example_com`
    pub fn folder(&self) -> &str {
        &self.folder
    }

    /// Directory downloads are written to
    pub fn destination(&self) -> &Path {
        &self.destination
    }

    pub fn visited(&self) -> &VisitedSet {
        &self.visited
    }

    /// Claims the next filename sequence number for a kind
    pub fn next_sequence(&self, kind: ResourceKind) -> u64 {
        self.counters.next(kind)
    }

    /// Stores a settled download
    pub fn record(&self, record: DownloadRecord) {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(record);
    }

    /// Takes all records collected so far
    pub fn take_records(&self) -> Vec<DownloadRecord> {
        std::mem::take(&mut *self.records.lock().unwrap_or_else(PoisonError::into_inner))
    }
}
