//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock documentation sites and test the
//! full crawl cycle end-to-end with the static engine, plus an in-memory
//! fetcher over a fixed link graph for ordering and failure semantics.

use async_trait::async_trait;
use docs_crawler::config::{CrawlConfig, Engine};
use docs_crawler::crawler::{crawl, Coordinator, FetchResult, PageFetcher};
use docs_crawler::output::{StopReason, SUMMARY_FILE_NAME};
use docs_crawler::url::CrawlTarget;
use docs_crawler::{CrawlError, PageError};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a static-engine configuration for the given base URL
fn create_test_config(base_url: &str, output: &Path) -> CrawlConfig {
    let mut config = CrawlConfig::new(base_url, output);
    config.engine = Engine::Static;
    config.request_timeout_secs = 5;
    config.wait_seconds = 0.0;
    config
}

async fn mount_page(server: &MockServer, page_path: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(page_path))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/html"))
        .mount(server)
        .await;
}

fn read_summary(dir: &Path) -> serde_json::Value {
    let content = std::fs::read_to_string(dir.join(SUMMARY_FILE_NAME))
        .expect("Summary file should exist");
    serde_json::from_str(&content).expect("Summary should be valid JSON")
}

#[tokio::test]
async fn test_full_crawl_static_site() {
    let server = MockServer::start().await;
    let base = server.uri();
    let output = TempDir::new().unwrap();

    mount_page(
        &server,
        "/docs",
        r#"<html><head><title>Docs</title></head><body>
            <nav><a href="/docs/nav-only">Nav</a></nav>
            <main>
                <a href="/docs/intro">Intro</a>
                <a href="/docs/guide/">Guide</a>
                <a href="/blog/1">Blog</a>
                <a href="https://elsewhere.example/docs/x">Elsewhere</a>
            </main>
        </body></html>"#
            .to_string(),
    )
    .await;
    mount_page(
        &server,
        "/docs/intro",
        r##"<html><body>
            <a href="#setup">Setup</a>
            <a href="guide/setup">Setup guide</a>
            <a href="/docs/intro/">Self</a>
        </body></html>"##
            .to_string(),
    )
    .await;
    mount_page(
        &server,
        "/docs/guide",
        "<html><body><p>Guide</p></body></html>".to_string(),
    )
    .await;
    mount_page(
        &server,
        "/docs/guide/setup",
        r#"<html><body><a href="/docs">Home</a></body></html>"#.to_string(),
    )
    .await;

    let config = create_test_config(&format!("{}/docs", base), output.path());
    let summary = crawl(config).await.expect("Crawl should succeed");

    assert_eq!(summary.pages_downloaded, 4);
    assert_eq!(summary.pages_saved, 4);
    assert_eq!(summary.stop_reason, Some(StopReason::Exhausted));

    // Output mirrors the URL path hierarchy
    for file in ["docs.html", "docs/intro.html", "docs/guide.html", "docs/guide/setup.html"] {
        assert!(output.path().join(file).is_file(), "{} should exist", file);
    }
    assert!(!output.path().join("docs/nav-only.html").exists());
    assert!(!output.path().join("blog").exists());

    let json = read_summary(output.path());
    assert_eq!(json["base_url"], format!("{}/docs", base));
    assert_eq!(json["pages_downloaded"], 4);
    assert_eq!(json["engine"], "static");
    assert_eq!(json["stop_reason"], "exhausted");

    let visited: Vec<String> = json["visited_urls"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_str().unwrap().to_string())
        .collect();
    let mut sorted = visited.clone();
    sorted.sort();
    assert_eq!(visited, sorted);
    assert!(visited.contains(&format!("{}/docs/guide/setup", base)));
}

#[tokio::test]
async fn test_budget_termination() {
    let server = MockServer::start().await;
    let base = server.uri();
    let output = TempDir::new().unwrap();

    let links: String = (1..10)
        .map(|i| format!(r#"<a href="/docs/page{}">Page {}</a>"#, i, i))
        .collect();
    mount_page(&server, "/docs", format!("<html><body>{}</body></html>", links)).await;
    for i in 1..10 {
        mount_page(
            &server,
            &format!("/docs/page{}", i),
            "<html><body>page</body></html>".to_string(),
        )
        .await;
    }

    let mut config = create_test_config(&format!("{}/docs", base), output.path());
    config.max_pages = 3;

    let summary = crawl(config).await.expect("Crawl should succeed");

    assert_eq!(summary.pages_downloaded, 3);
    assert_eq!(summary.stop_reason, Some(StopReason::BudgetReached));

    let json = read_summary(output.path());
    assert_eq!(json["pages_downloaded"], 3);
    assert_eq!(json["max_pages"], 3);
    assert_eq!(json["visited_urls"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_broken_page_does_not_abort_crawl() {
    let server = MockServer::start().await;
    let base = server.uri();
    let output = TempDir::new().unwrap();

    mount_page(
        &server,
        "/docs",
        r#"<html><body>
            <a href="/docs/missing">Missing</a>
            <a href="/docs/ok">Ok</a>
        </body></html>"#
            .to_string(),
    )
    .await;
    mount_page(
        &server,
        "/docs/ok",
        "<html><body>fine</body></html>".to_string(),
    )
    .await;

    let config = create_test_config(&format!("{}/docs", base), output.path());
    let summary = crawl(config).await.expect("Crawl should succeed");

    assert_eq!(summary.pages_downloaded, 3);
    assert_eq!(summary.pages_saved, 2);
    assert_eq!(summary.pages_failed, 1);
    assert!(summary.failed_urls[0].error.contains("404"));
    assert!(output.path().join("docs/ok.html").is_file());
}

#[tokio::test]
async fn test_unreachable_seed_writes_no_summary() {
    let server = MockServer::start().await;
    let output = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let config = create_test_config(&format!("{}/docs", server.uri()), output.path());
    let result = crawl(config).await;

    assert!(matches!(result, Err(CrawlError::SeedUnreachable(_))));
    assert!(!output.path().join(SUMMARY_FILE_NAME).exists());
}

#[tokio::test]
async fn test_unwritable_output_is_fatal() {
    let output = TempDir::new().unwrap();
    let occupied = output.path().join("occupied");
    std::fs::write(&occupied, "not a directory").unwrap();

    let config = create_test_config("http://127.0.0.1:9/docs", &occupied);
    let result = crawl(config).await;

    assert!(matches!(result, Err(CrawlError::OutputDir { .. })));
}

/// Serves a fixed link graph from memory; listed failures time out
struct SiteGraph {
    pages: HashMap<String, Vec<String>>,
    failing: Vec<String>,
    fetched: Mutex<Vec<String>>,
}

impl SiteGraph {
    fn new(edges: &[(&str, &[&str])]) -> Self {
        Self {
            pages: edges
                .iter()
                .map(|(page, links)| {
                    (
                        page.to_string(),
                        links.iter().map(|l| l.to_string()).collect(),
                    )
                })
                .collect(),
            failing: Vec::new(),
            fetched: Mutex::new(Vec::new()),
        }
    }

    fn failing(mut self, url: &str) -> Self {
        self.failing.push(url.to_string());
        self
    }

    fn fetched(&self) -> Vec<String> {
        self.fetched.lock().unwrap().clone()
    }

    fn position(&self, url: &str) -> usize {
        self.fetched()
            .iter()
            .position(|u| u == url)
            .unwrap_or_else(|| panic!("{} was never fetched", url))
    }
}

#[async_trait]
impl PageFetcher for SiteGraph {
    fn name(&self) -> &'static str {
        "site-graph"
    }

    async fn fetch(&self, target: &CrawlTarget) -> Result<FetchResult, PageError> {
        self.fetched.lock().unwrap().push(target.to_string());

        if self.failing.iter().any(|u| u == target.as_str()) {
            return Err(PageError::Timeout {
                url: target.to_string(),
                seconds: 30,
            });
        }

        Ok(FetchResult {
            target: target.clone(),
            final_url: target.to_string(),
            content: format!("<html><body>{}</body></html>", target),
            links: self.pages.get(target.as_str()).cloned().unwrap_or_default(),
        })
    }
}

fn graph_config(output: &Path) -> CrawlConfig {
    let mut config = CrawlConfig::new("https://x.io/docs", output);
    config.max_pages = 50;
    config
}

#[tokio::test]
async fn test_bfs_ordering() {
    let output = TempDir::new().unwrap();
    let site = SiteGraph::new(&[
        ("https://x.io/docs", &["https://x.io/docs/a", "https://x.io/docs/b"]),
        ("https://x.io/docs/a", &["https://x.io/docs/c"]),
    ]);

    let summary = Coordinator::new(graph_config(output.path()))
        .unwrap()
        .run(&site)
        .await
        .unwrap();

    assert_eq!(summary.pages_downloaded, 4);
    let c = site.position("https://x.io/docs/c");
    assert!(c > site.position("https://x.io/docs/a"));
    assert!(c > site.position("https://x.io/docs/b"));
}

#[tokio::test]
async fn test_bfs_ordering_with_concurrency() {
    let output = TempDir::new().unwrap();
    let site = SiteGraph::new(&[
        (
            "https://x.io/docs",
            &["https://x.io/docs/a", "https://x.io/docs/b", "https://x.io/docs/d"],
        ),
        ("https://x.io/docs/a", &["https://x.io/docs/c"]),
    ]);

    let mut config = graph_config(output.path());
    config.concurrency = 2;

    Coordinator::new(config).unwrap().run(&site).await.unwrap();

    let c = site.position("https://x.io/docs/c");
    assert!(c > site.position("https://x.io/docs/d"));
}

#[tokio::test]
async fn test_failure_isolation() {
    let output = TempDir::new().unwrap();
    let site = SiteGraph::new(&[
        (
            "https://x.io/docs",
            &["https://x.io/docs/a", "https://x.io/docs/b", "https://x.io/docs/c"],
        ),
    ])
    .failing("https://x.io/docs/b");

    let summary = Coordinator::new(graph_config(output.path()))
        .unwrap()
        .run(&site)
        .await
        .unwrap();

    assert_eq!(summary.pages_downloaded, 4);
    assert_eq!(summary.pages_failed, 1);
    assert!(summary
        .visited_urls
        .contains(&"https://x.io/docs/b".to_string()));
    assert!(output.path().join("docs/a.html").is_file());
    assert!(output.path().join("docs/c.html").is_file());
    assert!(!output.path().join("docs/b.html").exists());
}

#[tokio::test]
async fn test_dedup_across_normalization_variants() {
    let output = TempDir::new().unwrap();
    let site = SiteGraph::new(&[
        (
            "https://x.io/docs",
            &[
                "https://x.io/docs/a",
                "https://x.io/docs/a/",
                "https://x.io/docs/a#part",
                "https://x.io/docs/",
            ],
        ),
        (
            "https://x.io/docs/a",
            &["https://x.io/docs/a#other", "https://x.io/docs/b/"],
        ),
        ("https://x.io/docs/b", &["https://x.io/docs/a/"]),
    ]);

    let summary = Coordinator::new(graph_config(output.path()))
        .unwrap()
        .run(&site)
        .await
        .unwrap();

    assert_eq!(
        site.fetched(),
        vec!["https://x.io/docs", "https://x.io/docs/a", "https://x.io/docs/b"]
    );
    assert_eq!(summary.pages_downloaded, 3);
}

#[tokio::test]
async fn test_dotted_directory_and_child_both_saved() {
    let output = TempDir::new().unwrap();
    let site = SiteGraph::new(&[
        ("https://x.io/docs", &["https://x.io/docs/v1.2/"]),
        ("https://x.io/docs/v1.2", &["https://x.io/docs/v1.2/intro"]),
    ]);

    let summary = Coordinator::new(graph_config(output.path()))
        .unwrap()
        .run(&site)
        .await
        .unwrap();

    assert_eq!(summary.pages_downloaded, 3);
    assert_eq!(summary.pages_saved, 3);
    assert_eq!(summary.pages_failed, 0);
    assert!(output.path().join("docs/v1.2.html").is_file());
    assert!(output.path().join("docs/v1.2/intro.html").is_file());
}
