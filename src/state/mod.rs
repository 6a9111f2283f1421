//! State module for crawl work items and their results
//!
//! # Components
//!
//! - `ResourceKind`: Whether a URL is a page (parsed for links) or a stylesheet
//! - `CrawlTask`: A pending fetch dispatched by the coordinator
//! - `DownloadRecord`: The settled result of one task

mod download;
mod task;

// Re-export main types
pub use download::{DownloadOutcome, DownloadRecord};
pub use task::{CrawlTask, ResourceKind};
