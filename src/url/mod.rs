//! URL handling module for Stylesift
//!
//! This module provides URL normalization, folder naming, and the
//! same-origin boundary used throughout a crawl session.

mod domain;
mod normalize;
mod path;

use crate::UrlError;
use std::fmt;
use url::Url;

// Re-export main functions
pub use domain::{extract_domain, folder_name};
pub use normalize::{normalize, normalize_url, parse_http_url, without_fragment};
pub use path::{extension, last_segment};

/// The scheme + host (+ port) boundary of a crawl session
///
/// Fixed from the seed URL for the whole session: every discovered link is
/// compared against this origin, never against the origin of the page it
/// was found on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Origin {
    serialized: String,
}

impl Origin {
    /// Derives the origin of a seed URL
    ///
    /// # Returns
    ///
    /// * `Ok(Origin)` - The seed has a scheme and host
    /// * `Err(UrlError)` - The URL has an opaque origin (no host)
    pub fn of(url: &Url) -> Result<Self, UrlError> {
        let origin = url.origin();
        if !origin.is_tuple() {
            return Err(UrlError::MissingDomain);
        }

        Ok(Self {
            serialized: origin.ascii_serialization(),
        })
    }

    /// Returns true if the URL lies inside this origin
    ///
    /// Equivalent to a prefix match against the origin string that also
    /// requires the match to end on the authority boundary, so
    /// `https://a.com.evil.net/` is not inside `https://a.com`.
    ///
    /// # Examples
    ///
    /// ```
    /// use url::Url;
    /// use stylesift::url::Origin;
    ///
    /// let origin = Origin::of(&Url::parse("https://a.com/").unwrap()).unwrap();
    /// assert!(origin.contains(&Url::parse("https://a.com/y").unwrap()));
    /// assert!(!origin.contains(&Url::parse("https://b.com/x").unwrap()));
    /// ```
    pub fn contains(&self, url: &Url) -> bool {
        url.origin().ascii_serialization() == self.serialized
    }

    /// The serialized origin, e.g. `https://example.com:8443`
    pub fn as_str(&self) -> &str {
        &self.serialized
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.serialized)
    }
}
