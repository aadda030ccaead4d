//! Docs-Crawler main entry point
//!
//! This is the command-line interface for the documentation-site crawler.

use anyhow::Context;
use clap::Parser;
use docs_crawler::config::{load_config_with_hash, resolve, CrawlConfig, CrawlSettings, Engine};
use docs_crawler::crawler::crawl;
use docs_crawler::output::print_summary;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Docs-Crawler: a scoped documentation-site crawler
///
/// Crawls every page under a base URL breadth-first, staying on the same host
/// and path prefix, and saves each page under the output directory at a path
/// mirroring its URL. A crawl_summary.json is written when the crawl ends.
#[derive(Parser, Debug)]
#[command(name = "docs-crawler")]
#[command(version = "1.0.0")]
#[command(about = "A scoped documentation-site crawler", long_about = None)]
struct Cli {
    /// Base URL of the documentation to crawl
    #[arg(long)]
    url: Option<String>,

    /// Directory to save downloaded pages [default: ./data/docs/]
    #[arg(long, value_name = "DIR")]
    output: Option<PathBuf>,

    /// Maximum number of pages to visit [default: 100]
    #[arg(long)]
    max_pages: Option<usize>,

    /// Seconds to wait after the page goes idle (rendered engine) [default: 2]
    #[arg(long, value_name = "SECONDS")]
    wait: Option<f64>,

    /// Page fetch strategy [default: rendered]
    #[arg(long, value_enum)]
    engine: Option<Engine>,

    /// Path to a TOML configuration file ([crawl] table)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Maximum number of concurrent fetches [default: 1]
    #[arg(long)]
    concurrency: Option<usize>,

    /// Fixed delay between batches in milliseconds [default: 0]
    #[arg(long, value_name = "MS")]
    delay_ms: Option<u64>,

    /// Stop the crawl after this many seconds
    #[arg(long, value_name = "SECONDS")]
    max_duration: Option<u64>,

    /// Static fetch request timeout in seconds [default: 30]
    #[arg(long, value_name = "SECONDS")]
    request_timeout: Option<u64>,

    /// Rendered fetch navigation timeout in seconds [default: 30]
    #[arg(long, value_name = "SECONDS")]
    navigation_timeout: Option<u64>,

    /// Path to the Chrome/Chromium executable (auto-detected by default)
    #[arg(long, value_name = "PATH")]
    chrome_executable: Option<PathBuf>,

    /// Show the browser window instead of running headless
    #[arg(long)]
    headed: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

impl Cli {
    /// Settings given on the command line; they override the config file
    fn overrides(&self) -> CrawlSettings {
        CrawlSettings {
            base_url: self.url.clone(),
            output_dir: self.output.clone(),
            max_pages: self.max_pages,
            wait: self.wait,
            engine: self.engine,
            concurrency: self.concurrency,
            request_timeout: self.request_timeout,
            navigation_timeout: self.navigation_timeout,
            delay_ms: self.delay_ms,
            max_duration: self.max_duration,
            chrome_executable: self.chrome_executable.clone(),
            headless: self.headed.then_some(false),
            ..Default::default()
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let config = match load_settings(&cli) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Invalid configuration: {:#}", e);
            return Err(e);
        }
    };

    tracing::info!(
        "Crawling {} into {} (max {} pages)",
        config.base_url,
        config.output_dir.display(),
        config.max_pages
    );

    match crawl(config).await {
        Ok(summary) => {
            if !cli.quiet {
                println!();
                print_summary(&summary);
            }
            Ok(())
        }
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            Err(e.into())
        }
    }
}

/// Layers defaults, the optional config file and command-line flags
fn load_settings(cli: &Cli) -> anyhow::Result<CrawlConfig> {
    let file_settings = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (settings, hash) = load_config_with_hash(path)
                .with_context(|| format!("failed to load {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            settings
        }
        None => CrawlSettings::default(),
    };

    let config = resolve(file_settings.merge(cli.overrides()))?;
    Ok(config)
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("docs_crawler=info,warn"),
            1 => EnvFilter::new("docs_crawler=debug,info"),
            2 => EnvFilter::new("docs_crawler=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}
