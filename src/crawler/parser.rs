//! HTML parser for extracting anchors and stylesheet links
//!
//! Parsing is pure and never fails: `scraper` recovers from malformed markup
//! and any `href` that is empty or cannot be resolved is simply left out.

use scraper::{Html, Selector};
use url::Url;

/// A link found in a page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredLink {
    /// The `href` attribute as written, trimmed
    pub href: String,

    /// The href resolved against the page's base URL
    pub url: Url,
}

/// Links extracted from an HTML page
#[derive(Debug, Clone, Default)]
pub struct ParsedPage {
    /// `<link rel="stylesheet" href="...">` targets
    pub stylesheets: Vec<DiscoveredLink>,

    /// `<a href="...">` targets
    pub anchors: Vec<DiscoveredLink>,
}

/// Parses HTML content and extracts stylesheet and anchor links
///
/// Every href is resolved against `base_url`, the URL of the page the
/// content was fetched from. No filtering beyond resolvability is done
/// here; exclusion rules belong to the coordinator.
///
/// # Example
///
/// ```
/// use stylesift::crawler::parse_page;
/// use url::Url;
///
/// let html = r#"<link rel="stylesheet" href="s.css"><a href="/about">About</a>"#;
/// let base_url = Url::parse("https://example.com/docs/").unwrap();
/// let parsed = parse_page(html, &base_url);
/// assert_eq!(parsed.stylesheets[0].url.as_str(), "https://example.com/docs/s.css");
/// assert_eq!(parsed.anchors[0].url.as_str(), "https://example.com/about");
/// ```
pub fn parse_page(html: &str, base_url: &Url) -> ParsedPage {
    let document = Html::parse_document(html);

    ParsedPage {
        stylesheets: extract_stylesheets(&document, base_url),
        anchors: extract_anchors(&document, base_url),
    }
}

/// Extracts `<a href>` targets
fn extract_anchors(document: &Html, base_url: &Url) -> Vec<DiscoveredLink> {
    let Ok(selector) = Selector::parse("a[href]") else {
        return Vec::new();
    };

    document
        .select(&selector)
        .filter_map(|element| element.value().attr("href"))
        .filter_map(|href| resolve_link(href, base_url))
        .collect()
}

/// Extracts stylesheet `<link>` targets
///
/// `rel` is a space separated token list matched case-insensitively, so
/// `rel="Stylesheet"` and `rel="alternate stylesheet"` both count.
fn extract_stylesheets(document: &Html, base_url: &Url) -> Vec<DiscoveredLink> {
    let Ok(selector) = Selector::parse("link[rel][href]") else {
        return Vec::new();
    };

    document
        .select(&selector)
        .filter(|element| {
            element.value().attr("rel").map_or(false, |rel| {
                rel.split_ascii_whitespace()
                    .any(|token| token.eq_ignore_ascii_case("stylesheet"))
            })
        })
        .filter_map(|element| element.value().attr("href"))
        .filter_map(|href| resolve_link(href, base_url))
        .collect()
}

/// Resolves an href against the base URL
///
/// Returns None for empty hrefs and hrefs `Url::join` rejects.
fn resolve_link(href: &str, base_url: &Url) -> Option<DiscoveredLink> {
    let href = href.trim();
    if href.is_empty() {
        return None;
    }

    let url = base_url.join(href).ok()?;
    Some(DiscoveredLink {
        href: href.to_string(),
        url,
    })
}
