/// Crawl work item definitions
use std::fmt;
use url::Url;

/// The kind of resource a task fetches
///
/// Pages and stylesheets have independent filename counters and only pages
/// are parsed for further links.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    /// An HTML page; recursed into after download
    Page,

    /// A linked stylesheet; downloaded only
    Stylesheet,
}

impl ResourceKind {
    /// Returns true if the downloaded content should be parsed for links
    pub fn is_recursive(&self) -> bool {
        matches!(self, Self::Page)
    }

    /// The extension enforced on saved files of this kind
    pub fn default_extension(&self) -> &'static str {
        match self {
            Self::Page => "html",
            Self::Stylesheet => "css",
        }
    }

    /// Short lowercase label for logs and reports
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Page => "page",
            Self::Stylesheet => "stylesheet",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A pending unit of work
///
/// Created when a link is accepted into the visited set and consumed exactly
/// once when its fetch settles. Tasks are never retried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlTask {
    /// Absolute target URL as linked, without its fragment
    ///
    /// This is the URL requested; the visited set normalizes its own key.
    pub url: Url,

    /// What to do with the fetched content
    pub kind: ResourceKind,

    /// URL of the page the link was found on (None for the seed)
    pub referrer: Option<Url>,
}

impl CrawlTask {
    /// Creates the task for the seed page
    pub fn seed(url: Url) -> Self {
        Self {
            url,
            kind: ResourceKind::Page,
            referrer: None,
        }
    }

    /// Creates a task for a link discovered on `referrer`
    pub fn discovered(url: Url, kind: ResourceKind, referrer: &Url) -> Self {
        Self {
            url,
            kind,
            referrer: Some(referrer.clone()),
        }
    }
}
