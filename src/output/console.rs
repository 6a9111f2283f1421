//! Console rendering of the feature audit

use crate::audit::{AuditReport, FileType};

/// Prints the audit report to stdout
///
/// Sections: per-file presence and absence, aggregate presence per feature
/// table, then every media query line.
pub fn print_audit_report(report: &AuditReport) {
    println!("=== Feature Audit ===\n");

    if report.is_empty() {
        println!("No CSS or HTML files were downloaded.\n");
    }

    for audit in &report.files {
        println!("{} [{}]", audit.display_name(), audit.file_type);
        for hit in &audit.features {
            match hit.first_line {
                Some(line) => println!(
                    "  + {} ({} lines, first at line {})",
                    hit.label, hit.lines, line
                ),
                None => println!("  - {}", hit.label),
            }
        }
        println!();
    }

    for file_type in [FileType::Css, FileType::Html] {
        let file_count = report.files_of(file_type).count();
        println!("{} Summary ({} files):", file_type, file_count);
        for total in report.totals.iter().filter(|t| t.file_type == file_type) {
            let status = if total.is_present() {
                "present"
            } else {
                "absent"
            };
            println!("  {:<28} {:<8} ({} files)", total.label, status, total.files);
        }
        println!();
    }

    println!("Media Queries ({}):", report.media_queries.len());
    for line in &report.media_queries {
        let file = line
            .path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        println!("  {}:{}: {}", file, line.line_number, line.text);
    }
}
