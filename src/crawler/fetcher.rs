//! Static HTTP fetcher
//!
//! This module handles plain HTTP retrieval for server-rendered sites:
//! - Building the shared HTTP client with the configured user agent and timeout
//! - GET requests to fetch page content
//! - Error classification into per-page errors
//! - Link extraction from the returned HTML

use crate::config::CrawlConfig;
use crate::crawler::parser::parse_html;
use crate::crawler::{FetchResult, PageFetcher};
use crate::url::CrawlTarget;
use crate::PageError;
use async_trait::async_trait;
use reqwest::{header::CONTENT_TYPE, Client};
use std::time::Duration;

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `user_agent` - The User-Agent header value
/// * `timeout` - Total request timeout
///
/// # Example
///
/// ```no_run
/// use docs_crawler::crawler::build_http_client;
/// use std::time::Duration;
///
/// let client = build_http_client("DocsCrawler/1.0", Duration::from_secs(30)).unwrap();
/// ```
pub fn build_http_client(user_agent: &str, timeout: Duration) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent)
        .timeout(timeout)
        .connect_timeout(timeout.min(Duration::from_secs(10)))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches pages with a single HTTP GET each
pub struct StaticFetcher {
    client: Client,
    timeout: Duration,
}

impl StaticFetcher {
    /// Creates a fetcher using the configured user agent and request timeout
    pub fn new(config: &CrawlConfig) -> Result<Self, reqwest::Error> {
        let timeout = config.request_timeout();
        Ok(Self {
            client: build_http_client(&config.user_agent, timeout)?,
            timeout,
        })
    }

    fn classify(&self, target: &CrawlTarget, error: reqwest::Error) -> PageError {
        if error.is_timeout() {
            PageError::Timeout {
                url: target.to_string(),
                seconds: self.timeout.as_secs(),
            }
        } else {
            PageError::Network {
                url: target.to_string(),
                source: error,
            }
        }
    }
}

#[async_trait]
impl PageFetcher for StaticFetcher {
    fn name(&self) -> &'static str {
        "static"
    }

    /// Fetches a URL with a single GET request
    ///
    /// # Request Flow
    ///
    /// 1. Send GET request (redirects are followed)
    /// 2. Non-2xx status → `PageError::Http`
    /// 3. Content-Type present but not HTML → `PageError::NotHtml`
    /// 4. Parse the body and extract content links, resolved against the
    ///    final URL after redirects
    async fn fetch(&self, target: &CrawlTarget) -> Result<FetchResult, PageError> {
        let response = self
            .client
            .get(target.as_str())
            .send()
            .await
            .map_err(|e| self.classify(target, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(PageError::Http {
                url: target.to_string(),
                status: status.as_u16(),
            });
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_ascii_lowercase();

        if !content_type.is_empty() && !content_type.contains("html") {
            return Err(PageError::NotHtml {
                url: target.to_string(),
                content_type,
            });
        }

        let final_url = response.url().clone();
        let body = response.text().await.map_err(|e| self.classify(target, e))?;

        let parsed = parse_html(&body, &final_url);
        tracing::debug!(
            "Fetched {} ({} bytes, {} links, title: {:?})",
            target,
            body.len(),
            parsed.links.len(),
            parsed.title
        );

        Ok(FetchResult {
            target: target.clone(),
            final_url: final_url.to_string(),
            content: body,
            links: parsed.links,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn fetcher() -> StaticFetcher {
        let mut config = CrawlConfig::new("http://127.0.0.1/", "./out");
        config.request_timeout_secs = 1;
        StaticFetcher::new(&config).unwrap()
    }

    #[test]
    fn test_build_http_client() {
        let client = build_http_client("TestCrawler/1.0", Duration::from_secs(5));
        assert!(client.is_ok());
    }

    #[tokio::test]
    async fn test_fetch_html_page() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/docs/intro"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_raw(
                        r#"<html><body><nav><a href="/docs/menu">Menu</a></nav>
                        <a href="setup">Setup</a></body></html>"#,
                        "text/html",
                    ),
            )
            .mount(&server)
            .await;

        let target = CrawlTarget::parse(&format!("{}/docs/intro", server.uri())).unwrap();
        let result = fetcher().fetch(&target).await.unwrap();

        assert_eq!(result.target, target);
        assert!(result.content.contains("Setup"));
        assert_eq!(result.links, vec![format!("{}/docs/setup", server.uri())]);
    }

    #[tokio::test]
    async fn test_fetch_http_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let target = CrawlTarget::parse(&format!("{}/docs/missing", server.uri())).unwrap();
        let error = fetcher().fetch(&target).await.unwrap_err();
        assert!(matches!(error, PageError::Http { status: 404, .. }));
    }

    #[tokio::test]
    async fn test_fetch_non_html() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_raw("{}", "application/json"),
            )
            .mount(&server)
            .await;

        let target = CrawlTarget::parse(&format!("{}/docs/data", server.uri())).unwrap();
        let error = fetcher().fetch(&target).await.unwrap_err();
        assert!(matches!(error, PageError::NotHtml { .. }));
    }

    #[tokio::test]
    async fn test_fetch_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_raw("<html></html>", "text/html")
                    .set_delay(Duration::from_secs(3)),
            )
            .mount(&server)
            .await;

        let target = CrawlTarget::parse(&format!("{}/docs/slow", server.uri())).unwrap();
        let error = fetcher().fetch(&target).await.unwrap_err();
        assert!(matches!(error, PageError::Timeout { seconds: 1, .. }));
    }
}
