//! Output module for crawl statistics and audit reports
//!
//! This module handles:
//! - Summarizing download records into statistics
//! - Printing the feature audit to the console
//! - Writing the feature audit as markdown

mod console;
mod markdown;
pub mod stats;

pub use console::print_audit_report;
pub use markdown::{format_markdown_report, generate_markdown_report, ReportMeta};
pub use stats::{print_statistics, CrawlStatistics, KindCounts};
