use crate::{UrlError, UrlResult};
use url::Url;

/// Parses an absolute http(s) URL and drops its fragment
///
/// Used for the seed URL: anything that is not an absolute http(s) URL with
/// a host is rejected here, before any request is made. The path is kept as
/// written, so the result can be requested and used as a base for relative
/// links.
///
/// # Examples
///
/// ```
/// use stylesift::url::parse_http_url;
///
/// let url = parse_http_url("https://EXAMPLE.COM/docs/#intro").unwrap();
/// assert_eq!(url.as_str(), "https://example.com/docs/");
/// ```
pub fn parse_http_url(url_str: &str) -> UrlResult<Url> {
    let mut url = Url::parse(url_str.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    if url.host_str().map_or(true, str::is_empty) {
        return Err(UrlError::MissingDomain);
    }

    url.set_fragment(None);
    Ok(url)
}

/// Parses a URL string into its visited-set form
///
/// # Examples
///
/// ```
/// use stylesift::url::normalize_url;
///
/// let url = normalize_url("https://EXAMPLE.COM/docs/#intro").unwrap();
/// assert_eq!(url.as_str(), "https://example.com/docs");
/// ```
pub fn normalize_url(url_str: &str) -> UrlResult<Url> {
    parse_http_url(url_str).map(normalize)
}

/// Strips the fragment, keeping everything else as written
///
/// This is the form a discovered link is fetched with and the base its
/// page's own links are resolved against.
pub fn without_fragment(mut url: Url) -> Url {
    url.set_fragment(None);
    url
}

/// Normalizes an already absolute URL into its visited-set form
///
/// The result is only a deduplication key. Requests and link resolution use
/// the URL as written, since `/docs/` and `/docs` resolve relative links
/// differently.
///
/// # Normalization Steps
///
/// 1. Remove fragment (everything after #)
/// 2. Collapse repeated slashes in the path
/// 3. Remove trailing slash (except for root /)
/// 4. Remove an empty query string (trailing ?)
///
/// Host lowercasing and dot-segment removal are already performed by
/// [`Url::parse`] and [`Url::join`].
pub fn normalize(mut url: Url) -> Url {
    url.set_fragment(None);

    if url.has_host() {
        let path = normalize_path(url.path());
        url.set_path(&path);
    }

    if url.query() == Some("") {
        url.set_query(None);
    }

    url
}

/// Collapses empty segments and removes the trailing slash
fn normalize_path(path: &str) -> String {
    let segments: Vec<&str> = path
        .split('/')
        .filter(|segment| !segment.is_empty())
        .collect();

    if segments.is_empty() {
        return "/".to_string();
    }

    format!("/{}", segments.join("/"))
}
