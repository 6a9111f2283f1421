use url::Url;

/// Returns the last non-empty path segment of a URL
///
/// `https://example.com/css/site.css?v=1` yields `site.css`; a root or
/// directory-only path yields `None`.
pub fn last_segment(url: &Url) -> Option<&str> {
    url.path_segments()?
        .filter(|segment| !segment.is_empty())
        .last()
}

/// Returns the lowercase extension of the last path segment, if any
pub fn extension(url: &Url) -> Option<String> {
    let segment = last_segment(url)?;
    let (stem, ext) = segment.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}
