//! Statistics over a finished crawl
//!
//! This module provides functionality for summarizing download records and
//! displaying them on the console.

use crate::crawler::CrawlSummary;
use crate::state::{DownloadOutcome, ResourceKind};
use std::collections::BTreeMap;
use std::time::Duration;

/// Download counts for one resource kind
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KindCounts {
    pub saved: u64,
    pub failed: u64,
    pub bytes: u64,
}

impl KindCounts {
    pub fn total(&self) -> u64 {
        self.saved + self.failed
    }
}

/// Crawl statistics summary
#[derive(Debug, Clone, Default)]
pub struct CrawlStatistics {
    pub pages: KindCounts,
    pub stylesheets: KindCounts,

    /// Failure reasons and how often each occurred
    pub failures: BTreeMap<String, u64>,

    pub elapsed: Duration,
}

impl CrawlStatistics {
    /// Builds statistics from a crawl summary
    pub fn from_summary(summary: &CrawlSummary) -> Self {
        let mut stats = Self {
            elapsed: summary.elapsed,
            ..Self::default()
        };

        for record in &summary.records {
            let counts = match record.kind {
                ResourceKind::Page => &mut stats.pages,
                ResourceKind::Stylesheet => &mut stats.stylesheets,
            };

            match &record.outcome {
                DownloadOutcome::Saved { bytes, .. } => {
                    counts.saved += 1;
                    counts.bytes += bytes;
                }
                DownloadOutcome::Failed { reason } => {
                    counts.failed += 1;
                    *stats.failures.entry(failure_class(reason)).or_insert(0) += 1;
                }
            }
        }

        stats
    }

    pub fn total_failed(&self) -> u64 {
        self.pages.failed + self.stylesheets.failed
    }

    /// Percentage of tasks that were saved
    pub fn success_rate(&self) -> f64 {
        let total = self.pages.total() + self.stylesheets.total();
        if total == 0 {
            return 0.0;
        }
        (self.pages.saved + self.stylesheets.saved) as f64 / total as f64 * 100.0
    }
}

/// Groups failure messages by their leading phrase
///
/// `HTTP 404 for https://...` and `HTTP 404 for https://...other` both
/// become `HTTP 404`; messages without a URL are kept whole.
fn failure_class(reason: &str) -> String {
    reason
        .split(" for ")
        .next()
        .unwrap_or(reason)
        .trim()
        .to_string()
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &CrawlStatistics) {
    println!("=== Crawl Statistics ===\n");

    println!("Downloads:");
    println!(
        "  Pages: {} saved, {} failed ({} bytes)",
        stats.pages.saved, stats.pages.failed, stats.pages.bytes
    );
    println!(
        "  Stylesheets: {} saved, {} failed ({} bytes)",
        stats.stylesheets.saved, stats.stylesheets.failed, stats.stylesheets.bytes
    );
    println!("  Elapsed: {:.2}s", stats.elapsed.as_secs_f64());
    println!();

    if !stats.failures.is_empty() {
        println!("Failure Summary:");
        let mut failure_counts: Vec<_> = stats.failures.iter().collect();
        failure_counts.sort_by(|a, b| b.1.cmp(a.1));

        for (reason, count) in failure_counts {
            println!("  {}: {}", reason, count);
        }
        println!();
    }

    println!("Success Rate: {:.1}%", stats.success_rate());
}
