use url::Url;

/// Extracts the lowercase host from a URL
pub fn extract_domain(url: &Url) -> Option<String> {
    url.host_str().map(|h| h.to_lowercase())
}

/// Derives the download folder name for a site
///
/// The host with every `.` replaced by `_`; characters that are not safe in
/// a directory name (IPv6 brackets and colons) are replaced as well.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use stylesift::url::folder_name;
///
/// let url = Url::parse("https://www.example.com/path").unwrap();
/// assert_eq!(folder_name(&url), Some("www_example_com".to_string()));
/// ```
pub fn folder_name(url: &Url) -> Option<String> {
    let domain = extract_domain(url)?;
    let name: String = domain
        .chars()
        .filter(|c| *c != '[' && *c != ']')
        .map(|c| if c == '.' || c == ':' { '_' } else { c })
        .collect();

    if name.is_empty() {
        None
    } else {
        Some(name)
    }
}
