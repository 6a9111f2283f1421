use crate::state::ResourceKind;
use chrono::{DateTime, Utc};
use std::path::PathBuf;
use url::Url;

/// Outcome of a settled download
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadOutcome {
    /// Body was written to disk in full
    Saved {
        /// Local file the body was written to
        path: PathBuf,
        /// Number of body bytes written
        bytes: u64,
    },

    /// The fetch or the write failed; no file is left behind
    Failed {
        /// Human readable failure reason
        reason: String,
    },
}

/// Result of one completed fetch
#[derive(Debug, Clone)]
pub struct DownloadRecord {
    pub url: Url,

    /// URL the body was served from after redirects; `url` otherwise
    pub final_url: Url,

    pub kind: ResourceKind,

    /// Page the link was found on (None for the seed)
    pub referrer: Option<Url>,

    pub outcome: DownloadOutcome,
    pub finished_at: DateTime<Utc>,
}

impl DownloadRecord {
    /// Records a successful download
    pub fn saved(url: Url, kind: ResourceKind, path: PathBuf, bytes: u64) -> Self {
        Self {
            final_url: url.clone(),
            url,
            kind,
            referrer: None,
            outcome: DownloadOutcome::Saved { path, bytes },
            finished_at: Utc::now(),
        }
    }

    /// Records a failed download
    pub fn failed(url: Url, kind: ResourceKind, reason: impl Into<String>) -> Self {
        Self {
            final_url: url.clone(),
            url,
            kind,
            referrer: None,
            outcome: DownloadOutcome::Failed {
                reason: reason.into(),
            },
            finished_at: Utc::now(),
        }
    }

    /// Sets the URL the response was finally served from
    pub fn with_final_url(mut self, final_url: Url) -> Self {
        self.final_url = final_url;
        self
    }

    /// Sets the page the link was discovered on
    pub fn with_referrer(mut self, referrer: Option<Url>) -> Self {
        self.referrer = referrer;
        self
    }

    pub fn was_redirected(&self) -> bool {
        self.final_url != self.url
    }

    /// The saved file, if the download succeeded
    pub fn path(&self) -> Option<&PathBuf> {
        match &self.outcome {
            DownloadOutcome::Saved { path, .. } => Some(path),
            DownloadOutcome::Failed { .. } => None,
        }
    }

    pub fn is_saved(&self) -> bool {
        matches!(self.outcome, DownloadOutcome::Saved { .. })
    }
}
