//! Audit report types

use std::fmt;
use std::path::PathBuf;

/// Type of an audited file, decided by its extension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FileType {
    Css,
    Html,
}

impl FileType {
    /// Classifies a file by extension (case-insensitive)
    pub fn from_extension(extension: &str) -> Option<Self> {
        if extension.eq_ignore_ascii_case("css") {
            Some(Self::Css)
        } else if extension.eq_ignore_ascii_case("html") {
            Some(Self::Html)
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Css => "CSS",
            Self::Html => "HTML",
        }
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Presence of one feature in one file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureHit {
    pub label: String,

    /// Number of lines the feature was found on
    pub lines: usize,

    /// 1-based line number of the first occurrence
    pub first_line: Option<usize>,
}

impl FeatureHit {
    pub fn is_present(&self) -> bool {
        self.lines > 0
    }
}

/// Audit result for a single file
#[derive(Debug, Clone)]
pub struct FileAudit {
    pub path: PathBuf,
    pub file_type: FileType,

    /// One entry per detector, in table order
    pub features: Vec<FeatureHit>,
}

impl FileAudit {
    pub fn present(&self) -> impl Iterator<Item = &FeatureHit> {
        self.features.iter().filter(|hit| hit.is_present())
    }

    pub fn absent(&self) -> impl Iterator<Item = &FeatureHit> {
        self.features.iter().filter(|hit| !hit.is_present())
    }

    /// File name without the directory, for display
    pub fn display_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}

/// Aggregate presence of one feature across all files of a type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureTotal {
    pub label: String,
    pub file_type: FileType,

    /// Number of files containing the feature
    pub files: usize,
}

impl FeatureTotal {
    pub fn is_present(&self) -> bool {
        self.files > 0
    }
}

/// A line containing a media query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaQueryLine {
    pub path: PathBuf,
    pub line_number: usize,

    /// The line, trimmed
    pub text: String,
}

/// Complete audit over a download folder
#[derive(Debug, Clone, Default)]
pub struct AuditReport {
    /// Per-file results sorted by path
    pub files: Vec<FileAudit>,

    /// Per-feature totals, CSS table first then HTML table
    pub totals: Vec<FeatureTotal>,

    /// Every media query line, in file then line order
    pub media_queries: Vec<MediaQueryLine>,
}

impl AuditReport {
    pub fn files_of(&self, file_type: FileType) -> impl Iterator<Item = &FileAudit> {
        self.files
            .iter()
            .filter(move |audit| audit.file_type == file_type)
    }

    /// Looks up the aggregate for a feature label
    pub fn total(&self, file_type: FileType, label: &str) -> Option<&FeatureTotal> {
        self.totals
            .iter()
            .find(|total| total.file_type == file_type && total.label == label)
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}
