use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// Default output directory for crawled pages
pub const DEFAULT_OUTPUT_DIR: &str = "./data/docs/";

/// Default page budget
pub const DEFAULT_MAX_PAGES: usize = 100;

/// Default settle delay after the page goes idle (seconds)
pub const DEFAULT_WAIT_SECONDS: f64 = 2.0;

/// Default user agent for both fetch engines
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 Documentation Browser Crawler";

/// Upper bound for concurrent fetches within one batch
pub const MAX_CONCURRENCY: usize = 16;

/// Page fetch strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Engine {
    /// Plain HTTP GET and HTML parse
    Static,
    /// Headless Chromium executing page scripts
    #[default]
    Rendered,
}

impl fmt::Display for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Static => f.write_str("static"),
            Self::Rendered => f.write_str("rendered"),
        }
    }
}

/// Top-level layout of a TOML configuration file
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    #[serde(default)]
    pub crawl: CrawlSettings,
}

/// Partially specified crawl settings
///
/// Used both for the `[crawl]` table of a config file and for command-line
/// overrides. Unset fields fall back to the next layer and finally to the
/// built-in defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct CrawlSettings {
    /// Base URL of the documentation to crawl
    pub base_url: Option<String>,

    /// Directory to save downloaded pages
    pub output_dir: Option<PathBuf>,

    /// Maximum number of pages to visit
    pub max_pages: Option<usize>,

    /// Settle delay after the page goes idle (seconds)
    pub wait: Option<f64>,

    /// Page fetch strategy
    pub engine: Option<Engine>,

    /// Maximum number of fetches in flight at once
    pub concurrency: Option<usize>,

    /// Static fetch request timeout (seconds)
    pub request_timeout: Option<u64>,

    /// Rendered fetch navigation timeout (seconds)
    pub navigation_timeout: Option<u64>,

    /// Upper bound on the network-idle wait (seconds)
    pub idle_timeout: Option<u64>,

    /// Fixed delay between batches (milliseconds)
    pub delay_ms: Option<u64>,

    /// Wall-clock budget for the whole crawl (seconds)
    pub max_duration: Option<u64>,

    /// User agent sent by both engines
    pub user_agent: Option<String>,

    /// Browser viewport width (pixels)
    pub viewport_width: Option<u32>,

    /// Browser viewport height (pixels)
    pub viewport_height: Option<u32>,

    /// Path to a Chrome/Chromium executable (auto-detected when unset)
    pub chrome_executable: Option<PathBuf>,

    /// Run the browser without a visible window
    pub headless: Option<bool>,
}

impl CrawlSettings {
    /// Layers `overrides` on top of `self`; set fields in `overrides` win
    pub fn merge(self, overrides: CrawlSettings) -> CrawlSettings {
        CrawlSettings {
            base_url: overrides.base_url.or(self.base_url),
            output_dir: overrides.output_dir.or(self.output_dir),
            max_pages: overrides.max_pages.or(self.max_pages),
            wait: overrides.wait.or(self.wait),
            engine: overrides.engine.or(self.engine),
            concurrency: overrides.concurrency.or(self.concurrency),
            request_timeout: overrides.request_timeout.or(self.request_timeout),
            navigation_timeout: overrides.navigation_timeout.or(self.navigation_timeout),
            idle_timeout: overrides.idle_timeout.or(self.idle_timeout),
            delay_ms: overrides.delay_ms.or(self.delay_ms),
            max_duration: overrides.max_duration.or(self.max_duration),
            user_agent: overrides.user_agent.or(self.user_agent),
            viewport_width: overrides.viewport_width.or(self.viewport_width),
            viewport_height: overrides.viewport_height.or(self.viewport_height),
            chrome_executable: overrides.chrome_executable.or(self.chrome_executable),
            headless: overrides.headless.or(self.headless),
        }
    }
}

/// Fully resolved crawl configuration
#[derive(Debug, Clone, Serialize)]
pub struct CrawlConfig {
    /// Base URL of the documentation to crawl (also the scope prefix)
    pub base_url: String,

    /// Root directory for saved pages and the run summary
    pub output_dir: PathBuf,

    /// Maximum number of pages to visit
    pub max_pages: usize,

    /// Settle delay after the page goes idle (seconds)
    pub wait_seconds: f64,

    /// Page fetch strategy
    pub engine: Engine,

    /// Maximum number of fetches in flight at once
    pub concurrency: usize,

    /// Static fetch request timeout (seconds)
    pub request_timeout_secs: u64,

    /// Rendered fetch navigation timeout (seconds)
    pub navigation_timeout_secs: u64,

    /// Upper bound on the network-idle wait (seconds)
    pub idle_timeout_secs: u64,

    /// Fixed delay between batches (milliseconds)
    pub delay_ms: u64,

    /// Wall-clock budget for the whole crawl (seconds)
    pub max_duration_secs: Option<u64>,

    /// User agent sent by both engines
    pub user_agent: String,

    /// Browser settings for the rendered engine
    pub browser: BrowserSettings,
}

/// Headless browser settings
#[derive(Debug, Clone, Serialize)]
pub struct BrowserSettings {
    pub viewport_width: u32,
    pub viewport_height: u32,
    pub chrome_executable: Option<PathBuf>,
    pub headless: bool,
}

impl Default for BrowserSettings {
    fn default() -> Self {
        Self {
            viewport_width: 1280,
            viewport_height: 800,
            chrome_executable: None,
            headless: true,
        }
    }
}

impl CrawlConfig {
    /// Creates a configuration with defaults for everything but the target
    pub fn new(base_url: impl Into<String>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_url: base_url.into(),
            output_dir: output_dir.into(),
            max_pages: DEFAULT_MAX_PAGES,
            wait_seconds: DEFAULT_WAIT_SECONDS,
            engine: Engine::default(),
            concurrency: 1,
            request_timeout_secs: 30,
            navigation_timeout_secs: 30,
            idle_timeout_secs: 10,
            delay_ms: 0,
            max_duration_secs: None,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            browser: BrowserSettings::default(),
        }
    }

    /// Settle delay applied after the page goes idle
    pub fn settle_delay(&self) -> Duration {
        Duration::from_secs_f64(self.wait_seconds)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn navigation_timeout(&self) -> Duration {
        Duration::from_secs(self.navigation_timeout_secs)
    }

    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_secs)
    }

    /// Delay between consecutive batches
    pub fn inter_batch_delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }

    /// Wall-clock budget for the whole crawl, if any
    pub fn max_duration(&self) -> Option<Duration> {
        self.max_duration_secs.map(Duration::from_secs)
    }
}
