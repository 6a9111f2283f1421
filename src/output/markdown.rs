//! Markdown audit report generation
//!
//! This module renders the feature audit, together with the crawl
//! statistics it was produced from, as a markdown document.

use crate::audit::{AuditReport, FileType};
use crate::output::stats::CrawlStatistics;
use chrono::{DateTime, Utc};
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Run details printed at the top of the report
#[derive(Debug, Clone)]
pub struct ReportMeta {
    pub start_url: String,
    pub destination: String,
    pub generated_at: DateTime<Utc>,

    /// SHA-256 of the configuration file, when one was used
    pub config_hash: Option<String>,
}

/// Writes the markdown report to `output_path`
pub fn generate_markdown_report(
    report: &AuditReport,
    stats: &CrawlStatistics,
    meta: &ReportMeta,
    output_path: &Path,
) -> std::io::Result<()> {
    let markdown = format_markdown_report(report, stats, meta);

    let mut file = File::create(output_path)?;
    file.write_all(markdown.as_bytes())?;

    Ok(())
}

/// Formats the audit report as markdown
pub fn format_markdown_report(
    report: &AuditReport,
    stats: &CrawlStatistics,
    meta: &ReportMeta,
) -> String {
    let mut md = String::new();

    md.push_str("# Stylesift Feature Audit\n\n");

    md.push_str("## Run Information\n\n");
    md.push_str(&format!("- **Seed**: {}\n", meta.start_url));
    md.push_str(&format!("- **Folder**: {}\n", meta.destination));
    md.push_str(&format!(
        "- **Generated**: {}\n",
        meta.generated_at.to_rfc3339()
    ));
    if let Some(hash) = &meta.config_hash {
        md.push_str(&format!("- **Config Hash**: {}\n", hash));
    }
    md.push('\n');

    md.push_str("## Downloads\n\n");
    md.push_str("| Kind | Saved | Failed | Bytes |\n");
    md.push_str("|------|-------|--------|-------|\n");
    md.push_str(&format!(
        "| Pages | {} | {} | {} |\n",
        stats.pages.saved, stats.pages.failed, stats.pages.bytes
    ));
    md.push_str(&format!(
        "| Stylesheets | {} | {} | {} |\n\n",
        stats.stylesheets.saved, stats.stylesheets.failed, stats.stylesheets.bytes
    ));

    for file_type in [FileType::Css, FileType::Html] {
        let file_count = report.files_of(file_type).count();
        md.push_str(&format!(
            "## {} Features ({} files)\n\n",
            file_type, file_count
        ));
        md.push_str("| Feature | Present | Files |\n");
        md.push_str("|---------|---------|-------|\n");

        for total in report.totals.iter().filter(|t| t.file_type == file_type) {
            let mark = if total.is_present() { "yes" } else { "no" };
            md.push_str(&format!(
                "| {} | {} | {} |\n",
                escape_cell(&total.label),
                mark,
                total.files
            ));
        }
        md.push('\n');
    }

    if !report.files.is_empty() {
        md.push_str("## Per-File Results\n\n");
        for audit in &report.files {
            md.push_str(&format!("### {}\n\n", audit.display_name()));

            let present: Vec<&str> = audit.present().map(|hit| hit.label.as_str()).collect();
            let absent: Vec<&str> = audit.absent().map(|hit| hit.label.as_str()).collect();

            md.push_str(&format!("- **Present**: {}\n", join_or_none(&present)));
            md.push_str(&format!("- **Absent**: {}\n\n", join_or_none(&absent)));
        }
    }

    md.push_str("## Media Queries\n\n");
    if report.media_queries.is_empty() {
        md.push_str("No media queries found.\n");
    } else {
        md.push_str("| File | Line | Query |\n");
        md.push_str("|------|------|-------|\n");
        for line in &report.media_queries {
            let file = line
                .path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default();
            md.push_str(&format!(
                "| {} | {} | `{}` |\n",
                file,
                line.line_number,
                escape_cell(&line.text)
            ));
        }
    }

    md
}

fn join_or_none(labels: &[&str]) -> String {
    if labels.is_empty() {
        "none".to_string()
    } else {
        labels.join(", ")
    }
}

/// Escapes characters that would break a markdown table cell
fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|")
}
