//! Static feature audit over downloaded files
//!
//! The auditor reads every `*.css` and `*.html` file in a folder, applies
//! the matching detector table line by line and collects media query lines
//! into their own section. It only needs read access and must run after the
//! crawl's completion gate has closed.

mod detectors;
mod report;

pub use detectors::{css_detectors, html_detectors, Detector, MEDIA_QUERY_MARKER};
pub use report::{AuditReport, FeatureHit, FeatureTotal, FileAudit, FileType, MediaQueryLine};

use crate::AuditError;
use regex::Regex;
use std::path::{Path, PathBuf};

/// Applies detector tables to files
#[derive(Debug, Clone)]
pub struct Auditor {
    css: Vec<Detector>,
    html: Vec<Detector>,
    media_query: Regex,
}

impl Auditor {
    /// Creates an auditor with the built-in detector tables
    pub fn new() -> Result<Self, AuditError> {
        Self::with_detectors(css_detectors()?, html_detectors()?)
    }

    /// Creates an auditor with custom detector tables
    pub fn with_detectors(css: Vec<Detector>, html: Vec<Detector>) -> Result<Self, AuditError> {
        Ok(Self {
            css,
            html,
            media_query: Regex::new(MEDIA_QUERY_MARKER)?,
        })
    }

    fn table(&self, file_type: FileType) -> &[Detector] {
        match file_type {
            FileType::Css => &self.css,
            FileType::Html => &self.html,
        }
    }

    /// Audits every CSS and HTML file directly inside `dir`
    ///
    /// Files are processed in name order so reports are stable between runs.
    pub fn audit_dir(&self, dir: &Path) -> Result<AuditReport, AuditError> {
        let mut report = AuditReport::default();

        for (path, file_type) in list_audit_files(dir)? {
            let content = read_lossy(&path)?;
            let (audit, media_queries) = self.audit_content(&path, file_type, &content);
            report.files.push(audit);
            report.media_queries.extend(media_queries);
        }

        report.totals = self.totals(&report.files);
        tracing::info!(
            "Audited {} files in {} ({} media query lines)",
            report.files.len(),
            dir.display(),
            report.media_queries.len()
        );

        Ok(report)
    }

    /// Scans one file's content line by line
    pub fn audit_content(
        &self,
        path: &Path,
        file_type: FileType,
        content: &str,
    ) -> (FileAudit, Vec<MediaQueryLine>) {
        let table = self.table(file_type);
        let mut features: Vec<FeatureHit> = table
            .iter()
            .map(|detector| FeatureHit {
                label: detector.label.clone(),
                lines: 0,
                first_line: None,
            })
            .collect();
        let mut media_queries = Vec::new();

        for (index, line) in content.lines().enumerate() {
            let line_number = index + 1;

            for (detector, hit) in table.iter().zip(features.iter_mut()) {
                if detector.matches(line) {
                    hit.lines += 1;
                    hit.first_line.get_or_insert(line_number);
                }
            }

            if self.media_query.is_match(line) {
                media_queries.push(MediaQueryLine {
                    path: path.to_path_buf(),
                    line_number,
                    text: line.trim().to_string(),
                });
            }
        }

        let audit = FileAudit {
            path: path.to_path_buf(),
            file_type,
            features,
        };
        (audit, media_queries)
    }

    /// Counts, per detector, how many files contain the feature
    fn totals(&self, files: &[FileAudit]) -> Vec<FeatureTotal> {
        let mut totals = Vec::new();

        for file_type in [FileType::Css, FileType::Html] {
            for (index, detector) in self.table(file_type).iter().enumerate() {
                let files = files
                    .iter()
                    .filter(|audit| audit.file_type == file_type)
                    .filter(|audit| audit.features[index].is_present())
                    .count();
                totals.push(FeatureTotal {
                    label: detector.label.clone(),
                    file_type,
                    files,
                });
            }
        }

        totals
    }
}

/// Audits a folder with the built-in detector tables
///
/// # Example
///
/// ```no_run
/// use stylesift::audit::run_audit;
/// use std::path::Path;
///
/// let report = run_audit(Path::new("example_com")).unwrap();
/// println!("{} files audited", report.files.len());
/// ```
pub fn run_audit(dir: &Path) -> Result<AuditReport, AuditError> {
    Auditor::new()?.audit_dir(dir)
}

/// Lists `*.css` and `*.html` files in a folder, sorted by path
fn list_audit_files(dir: &Path) -> Result<Vec<(PathBuf, FileType)>, AuditError> {
    let io_error = |source: std::io::Error| AuditError::Io {
        path: dir.display().to_string(),
        source,
    };

    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(io_error)? {
        let path = entry.map_err(io_error)?.path();
        if !path.is_file() {
            continue;
        }
        let file_type = path
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(FileType::from_extension);
        if let Some(file_type) = file_type {
            files.push((path, file_type));
        }
    }

    files.sort();
    Ok(files)
}

/// Reads a file, replacing invalid UTF-8
fn read_lossy(path: &Path) -> Result<String, AuditError> {
    let bytes = std::fs::read(path).map_err(|source| AuditError::Io {
        path: path.display().to_string(),
        source,
    })?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
