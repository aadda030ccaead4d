use crate::UrlError;
use std::fmt;
use url::Url;

/// A normalized, crawlable URL
///
/// # Normalization Steps
///
/// 1. Parse the URL as an absolute URL; reject if malformed
/// 2. Require an `http` or `https` scheme
/// 3. Require a host (scheme, host and port are otherwise preserved)
/// 4. Remove the fragment (everything after #)
/// 5. Remove trailing slashes from the path, except for the root path `/`
///
/// The query string is kept. Two targets are equal iff their normalized
/// serializations are equal.
///
/// # Examples
///
/// ```
/// use docs_crawler::url::CrawlTarget;
///
/// let target = CrawlTarget::parse("https://x.io/docs/intro/#setup").unwrap();
/// assert_eq!(target.as_str(), "https://x.io/docs/intro");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CrawlTarget {
    url: Url,
}

impl CrawlTarget {
    /// Parses and normalizes a URL string
    pub fn parse(url_str: &str) -> Result<Self, UrlError> {
        let url = Url::parse(url_str.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;
        Self::from_url(url)
    }

    /// Normalizes an already-parsed URL
    pub fn from_url(mut url: Url) -> Result<Self, UrlError> {
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(UrlError::InvalidScheme(format!(
                "Only HTTP and HTTPS schemes are supported, got: {}",
                url.scheme()
            )));
        }

        if url.host_str().map_or(true, str::is_empty) {
            return Err(UrlError::MissingHost);
        }

        url.set_fragment(None);

        let path = url.path();
        if path.len() > 1 && path.ends_with('/') {
            let trimmed = path.trim_end_matches('/');
            let trimmed = if trimmed.is_empty() { "/" } else { trimmed }.to_string();
            url.set_path(&trimmed);
        }

        Ok(Self { url })
    }

    /// The normalized URL as a string
    pub fn as_str(&self) -> &str {
        self.url.as_str()
    }

    /// The normalized URL
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// The URL path component (always starts with `/`)
    pub fn path(&self) -> &str {
        self.url.path()
    }
}

impl fmt::Display for CrawlTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.url.as_str())
    }
}

/// Returns the URL serialized without its fragment
pub fn strip_fragment(url: &Url) -> String {
    let mut url = url.clone();
    url.set_fragment(None);
    url.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remove_fragment() {
        let target = CrawlTarget::parse("https://x.io/docs/intro#setup").unwrap();
        assert_eq!(target.as_str(), "https://x.io/docs/intro");
    }

    #[test]
    fn test_remove_trailing_slash() {
        let target = CrawlTarget::parse("https://x.io/docs/intro/").unwrap();
        assert_eq!(target.as_str(), "https://x.io/docs/intro");
    }

    #[test]
    fn test_remove_repeated_trailing_slashes() {
        let target = CrawlTarget::parse("https://x.io/docs//").unwrap();
        assert_eq!(target.as_str(), "https://x.io/docs");
    }

    #[test]
    fn test_keep_root_slash() {
        let target = CrawlTarget::parse("https://x.io/").unwrap();
        assert_eq!(target.as_str(), "https://x.io/");

        let target = CrawlTarget::parse("https://x.io").unwrap();
        assert_eq!(target.as_str(), "https://x.io/");
    }

    #[test]
    fn test_keep_query() {
        let target = CrawlTarget::parse("https://x.io/docs/?v=2#top").unwrap();
        assert_eq!(target.as_str(), "https://x.io/docs?v=2");
    }

    #[test]
    fn test_keep_scheme_and_port() {
        let target = CrawlTarget::parse("http://127.0.0.1:8080/docs/").unwrap();
        assert_eq!(target.as_str(), "http://127.0.0.1:8080/docs");
    }

    #[test]
    fn test_equal_after_normalization() {
        let a = CrawlTarget::parse("https://x.io/docs/a/").unwrap();
        let b = CrawlTarget::parse("https://x.io/docs/a#part").unwrap();
        let c = CrawlTarget::parse("https://x.io/docs/a").unwrap();
        assert_eq!(a, b);
        assert_eq!(b, c);
    }

    #[test]
    fn test_invalid_scheme() {
        let result = CrawlTarget::parse("ftp://x.io/file");
        assert!(matches!(result.unwrap_err(), UrlError::InvalidScheme(_)));
    }

    #[test]
    fn test_malformed_url() {
        assert!(matches!(
            CrawlTarget::parse("not a url").unwrap_err(),
            UrlError::Parse(_)
        ));
        assert!(CrawlTarget::parse("/relative/path").is_err());
    }

    #[test]
    fn test_strip_fragment() {
        let url = Url::parse("https://x.io/docs/#top").unwrap();
        assert_eq!(strip_fragment(&url), "https://x.io/docs/");
    }
}
