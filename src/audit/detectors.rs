//! Detector tables for the feature audit
//!
//! Each detector pairs a label with a regular expression applied to single
//! lines. CSS and HTML files use separate tables.

use regex::Regex;

/// CSS feature detectors as `(label, pattern)`
const CSS_DETECTORS: &[(&str, &str)] = &[
    ("CSS Grid", r"display\s*:\s*(inline-)?grid\b"),
    ("Subgrid", r"\bsubgrid\b"),
    ("Flexbox", r"display\s*:\s*(inline-)?flex\b"),
    ("Gap", r"(^|[\s;{])(row-|column-)?gap\s*:"),
    ("Custom properties", r"(^|[\s;{(])--[A-Za-z0-9_-]+\s*:|var\(\s*--"),
    ("calc()", r"\bcalc\("),
    ("clamp()", r"\bclamp\("),
    ("min()/max()", r"\b(min|max)\("),
    ("Container queries", r"@container\b|container-type\s*:"),
    ("Cascade layers", r"@layer\b"),
    ("@supports", r"@supports\b"),
    (":has()", r":has\("),
    (":is()/:where()", r":(is|where)\("),
    ("CSS nesting", r"^\s*&"),
    ("aspect-ratio", r"aspect-ratio\s*:"),
    ("object-fit", r"object-fit\s*:"),
    ("Logical properties", r"(margin|padding|inset|border)-(inline|block)(-start|-end)?\s*:"),
    ("position: sticky", r"position\s*:\s*sticky\b"),
    ("Scroll snap", r"scroll-snap-(type|align)\s*:"),
    ("Dynamic viewport units", r"\d(dvh|svh|lvh|dvw|svw|lvw)\b"),
    ("Animations", r"@keyframes\b|\banimation(-name)?\s*:"),
    ("Transitions", r"\btransition(-property)?\s*:"),
    ("prefers-color-scheme", r"prefers-color-scheme"),
    ("prefers-reduced-motion", r"prefers-reduced-motion"),
];

/// HTML feature detectors as `(label, pattern)`, matched case-insensitively
const HTML_DETECTORS: &[(&str, &str)] = &[
    ("Viewport meta", r#"<meta[^>]+name\s*=\s*["']?viewport"#),
    ("<header>/<footer>", r"<(header|footer)[\s>]"),
    ("<main>", r"<main[\s>]"),
    ("<nav>", r"<nav[\s>]"),
    ("<article>/<section>", r"<(article|section)[\s>]"),
    ("<picture>", r"<picture[\s>]"),
    ("srcset", r"\bsrcset\s*="),
    ("Lazy loading", r#"\bloading\s*=\s*["']?lazy"#),
    ("<dialog>", r"<dialog[\s>]"),
    ("<details>/<summary>", r"<details[\s>]"),
    ("<template>", r"<template[\s>]"),
    ("<style> blocks", r"<style[\s>]"),
    ("Inline styles", r"\sstyle\s*="),
    ("ARIA attributes", r"\baria-[a-z]+\s*="),
    ("Resource hints", r#"rel\s*=\s*["']?(preload|preconnect|prefetch|dns-prefetch)"#),
];

/// Marker for lines collected into the media query section
pub const MEDIA_QUERY_MARKER: &str = r"@media\b";

/// A labelled line pattern
#[derive(Debug, Clone)]
pub struct Detector {
    pub label: String,
    pub pattern: Regex,
}

impl Detector {
    pub fn new(label: &str, pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            label: label.to_string(),
            pattern: Regex::new(pattern)?,
        })
    }

    /// Returns true if the line contains the feature
    pub fn matches(&self, line: &str) -> bool {
        self.pattern.is_match(line)
    }
}

/// Builds the CSS detector table
pub fn css_detectors() -> Result<Vec<Detector>, regex::Error> {
    CSS_DETECTORS
        .iter()
        .map(|(label, pattern)| Detector::new(label, pattern))
        .collect()
}

/// Builds the HTML detector table
pub fn html_detectors() -> Result<Vec<Detector>, regex::Error> {
    HTML_DETECTORS
        .iter()
        .map(|(label, pattern)| Detector::new(label, &format!("(?i){}", pattern)))
        .collect()
}
