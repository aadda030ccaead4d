//! Rendered fetcher backed by headless Chromium
//!
//! Client-rendered documentation sites ship an empty shell in the raw HTTP
//! response; only a browser engine produces the real DOM. One browser process
//! is shared by the whole crawl, and every fetch gets its own tab which is
//! closed as soon as the fetch finishes, on every path.

use crate::config::CrawlConfig;
use crate::crawler::{FetchResult, PageFetcher};
use crate::url::CrawlTarget;
use crate::{CrawlError, PageError};
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::handler::viewport::Viewport;
use chromiumoxide::Page;
use futures::StreamExt;
use std::future::Future;
use std::ops::Deref;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tokio::task::JoinHandle;

/// Collects the resolved href of every anchor in the rendered DOM
const LINKS_SCRIPT: &str = r#"
    Array.from(document.querySelectorAll('a'))
        .map(anchor => anchor.href)
        .filter(href => href && href.startsWith('http'))
"#;

/// Resource-timing entry count once the document has loaded, -1 before that
const ACTIVITY_SCRIPT: &str = r#"
    document.readyState === 'complete'
        ? performance.getEntriesByType('resource').length
        : -1
"#;

/// How long resource activity must stay flat to count as idle
const IDLE_WINDOW: Duration = Duration::from_millis(500);

/// Interval between activity samples
const IDLE_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// A running browser and the task driving its CDP connection
struct BrowserSession {
    browser: Browser,
    handler: JoinHandle<()>,
}

/// Fetches pages by rendering them in a shared headless browser
pub struct RenderedFetcher {
    session: RwLock<Option<BrowserSession>>,
    navigation_timeout: Duration,
    idle_timeout: Duration,
    settle_delay: Duration,
}

impl RenderedFetcher {
    /// Launches the browser for this crawl
    ///
    /// Fails with [`CrawlError::BrowserLaunch`] if no usable Chrome/Chromium
    /// can be started.
    pub async fn launch(config: &CrawlConfig) -> Result<Self, CrawlError> {
        let settings = &config.browser;

        let mut builder = BrowserConfig::builder()
            .window_size(settings.viewport_width, settings.viewport_height)
            .viewport(Some(Viewport {
                width: settings.viewport_width,
                height: settings.viewport_height,
                ..Default::default()
            }))
            .no_sandbox()
            .arg("--disable-dev-shm-usage")
            .arg("--disable-gpu")
            .arg(format!("--user-agent={}", config.user_agent));

        if !settings.headless {
            builder = builder.with_head();
        }

        if let Some(executable) = &settings.chrome_executable {
            builder = builder.chrome_executable(executable);
        }

        let browser_config = builder.build().map_err(CrawlError::BrowserLaunch)?;

        let (browser, mut handler) = Browser::launch(browser_config)
            .await
            .map_err(|e| CrawlError::BrowserLaunch(e.to_string()))?;

        let handler = tokio::spawn(async move { while handler.next().await.is_some() {} });

        tracing::info!(
            "Launched headless browser ({}x{})",
            settings.viewport_width,
            settings.viewport_height
        );

        Ok(Self {
            session: RwLock::new(Some(BrowserSession { browser, handler })),
            navigation_timeout: config.navigation_timeout(),
            idle_timeout: config.idle_timeout(),
            settle_delay: config.settle_delay(),
        })
    }

    /// Opens a fresh tab
    ///
    /// Takes the session read lock, so concurrent fetches open tabs in
    /// parallel; only `shutdown` takes it exclusively.
    async fn open_tab(&self, target: &CrawlTarget) -> Result<PageGuard, PageError> {
        let session = self.session.read().await;
        let session = session
            .as_ref()
            .ok_or_else(|| PageError::Browser("browser has been shut down".to_string()))?;

        let page = with_timeout(
            target,
            self.navigation_timeout,
            session.browser.new_page("about:blank"),
        )
        .await?
        .map_err(|e| PageError::Browser(format!("failed to open tab: {}", e)))?;

        Ok(PageGuard::new(page, target.to_string()))
    }

    /// Navigates the tab and reads the rendered DOM
    async fn render(&self, page: &Page, target: &CrawlTarget) -> Result<FetchResult, PageError> {
        with_timeout(target, self.navigation_timeout, page.goto(target.as_str()))
            .await?
            .map_err(|e| PageError::Navigation {
                url: target.to_string(),
                message: e.to_string(),
            })?;

        wait_for_network_idle(page, self.idle_timeout).await;

        if !self.settle_delay.is_zero() {
            tokio::time::sleep(self.settle_delay).await;
        }

        with_timeout(target, self.navigation_timeout, read_rendered(page, target)).await?
    }
}

#[async_trait]
impl PageFetcher for RenderedFetcher {
    fn name(&self) -> &'static str {
        "rendered"
    }

    async fn fetch(&self, target: &CrawlTarget) -> Result<FetchResult, PageError> {
        let tab = self.open_tab(target).await?;
        let result = self.render(&tab, target).await;
        tab.close().await;
        result
    }

    /// Closes the browser; later fetches fail with `PageError::Browser`
    async fn shutdown(&self) -> Result<(), PageError> {
        let Some(mut session) = self.session.write().await.take() else {
            return Ok(());
        };

        let closed = session
            .browser
            .close()
            .await
            .map(|_| ())
            .map_err(|e| PageError::Browser(format!("failed to close browser: {}", e)));

        if let Err(e) = session.browser.wait().await {
            tracing::debug!("Browser process wait failed: {}", e);
        }
        session.handler.abort();

        tracing::info!("Browser closed");
        closed
    }
}

/// Reads the rendered HTML, final URL and anchor hrefs from a loaded tab
async fn read_rendered(page: &Page, target: &CrawlTarget) -> Result<FetchResult, PageError> {
    let browser_error = |e: chromiumoxide::error::CdpError| PageError::Browser(e.to_string());

    let content = page.content().await.map_err(browser_error)?;

    let links = page
        .evaluate(LINKS_SCRIPT)
        .await
        .map_err(browser_error)?
        .into_value::<Vec<String>>()
        .map_err(|e| PageError::Browser(format!("unexpected link list: {}", e)))?;

    let final_url = page
        .url()
        .await
        .map_err(browser_error)?
        .unwrap_or_else(|| target.to_string());

    tracing::debug!(
        "Rendered {} ({} bytes, {} links)",
        target,
        content.len(),
        links.len()
    );

    Ok(FetchResult {
        target: target.clone(),
        final_url,
        content,
        links,
    })
}

/// Waits until resource loading has been flat for [`IDLE_WINDOW`]
///
/// Bounded by `limit`; giving up is not an error, the page is read as-is.
async fn wait_for_network_idle(page: &Page, limit: Duration) {
    let deadline = Instant::now() + limit;
    let mut last_count: Option<i64> = None;
    let mut stable_since = Instant::now();

    loop {
        let count = match page.evaluate(ACTIVITY_SCRIPT).await {
            Ok(result) => result.into_value::<i64>().ok(),
            Err(_) => None,
        };

        let now = Instant::now();
        match count {
            Some(n) if n >= 0 && last_count == Some(n) => {
                if now.duration_since(stable_since) >= IDLE_WINDOW {
                    return;
                }
            }
            _ => {
                last_count = count;
                stable_since = now;
            }
        }

        if now >= deadline {
            tracing::debug!("Network did not go idle within {:?}", limit);
            return;
        }

        tokio::time::sleep(IDLE_POLL_INTERVAL).await;
    }
}

/// Runs a browser operation under a timeout, mapping expiry to a page error
async fn with_timeout<F: Future>(
    target: &CrawlTarget,
    limit: Duration,
    operation: F,
) -> Result<F::Output, PageError> {
    tokio::time::timeout(limit, operation)
        .await
        .map_err(|_| PageError::Timeout {
            url: target.to_string(),
            seconds: limit.as_secs(),
        })
}

/// Owns a browser tab and guarantees it is closed
///
/// [`close`](Self::close) is the normal path. If the guard is dropped without
/// it (for example when the fetch future is cancelled), the tab is closed on a
/// spawned task instead.
struct PageGuard {
    page: Page,
    url: String,
    closed: bool,
}

impl PageGuard {
    fn new(page: Page, url: String) -> Self {
        Self {
            page,
            url,
            closed: false,
        }
    }

    async fn close(mut self) {
        self.closed = true;
        if let Err(e) = self.page.clone().close().await {
            tracing::debug!("Failed to close tab for {}: {}", self.url, e);
        }
    }
}

impl Deref for PageGuard {
    type Target = Page;

    fn deref(&self) -> &Page {
        &self.page
    }
}

impl Drop for PageGuard {
    fn drop(&mut self) {
        if self.closed {
            return;
        }

        let page = self.page.clone();
        let url = std::mem::take(&mut self.url);

        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    if let Err(e) = page.close().await {
                        tracing::debug!("Deferred tab close failed for {}: {}", url, e);
                    }
                });
            }
            Err(_) => tracing::warn!("Tab for {} leaked: no runtime to close it", url),
        }
    }
}
