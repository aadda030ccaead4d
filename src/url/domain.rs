use url::Url;

/// Extracts the authority (host plus effective port) from a URL
///
/// The host is lowercased. The port is the explicit port if present, otherwise
/// the scheme's default, so `https://x.io` and `https://x.io:443` share an
/// authority while `http://127.0.0.1:8080` and `http://127.0.0.1:9090` do not.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use docs_crawler::url::extract_authority;
///
/// let url = Url::parse("https://X.io/docs").unwrap();
/// assert_eq!(extract_authority(&url), Some("x.io:443".to_string()));
/// ```
pub fn extract_authority(url: &Url) -> Option<String> {
    let host = url.host_str()?.to_lowercase();
    match url.port_or_known_default() {
        Some(port) => Some(format!("{}:{}", host, port)),
        None => Some(host),
    }
}
