//! Human-readable end-of-run report

use crate::output::summary::CrawlSummary;
use std::fmt::Write;

/// Prints a crawl summary to stdout
pub fn print_summary(summary: &CrawlSummary) {
    print!("{}", render_summary(summary));
}

/// Renders the end-of-run report as text
pub fn render_summary(summary: &CrawlSummary) -> String {
    let mut out = String::new();
    // Writing to a String cannot fail
    let _ = write_report(&mut out, summary);
    out
}

fn write_report(out: &mut String, summary: &CrawlSummary) -> std::fmt::Result {
    writeln!(out, "=== Crawl Summary ===\n")?;

    writeln!(out, "Overview:")?;
    writeln!(out, "  Base URL: {}", summary.base_url)?;
    writeln!(out, "  Output directory: {}", summary.output_directory)?;
    writeln!(out, "  Engine: {}", summary.engine)?;
    if let Some(reason) = summary.stop_reason {
        writeln!(out, "  Stopped: {}", reason)?;
    }
    writeln!(out, "  Elapsed: {:.1}s", summary.elapsed_time_seconds)?;
    writeln!(out)?;

    writeln!(out, "Pages:")?;
    writeln!(out, "  Visited: {} (budget {})", summary.pages_downloaded, summary.max_pages)?;
    writeln!(out, "  Saved: {}", summary.pages_saved)?;
    writeln!(out, "  Failed: {}", summary.pages_failed)?;
    writeln!(out)?;

    if !summary.failed_urls.is_empty() {
        writeln!(out, "Failures ({}):", summary.failed_urls.len())?;
        for failed in &summary.failed_urls {
            writeln!(out, "  - {}: {}", failed.url, failed.error)?;
        }
        writeln!(out)?;
    }

    writeln!(
        out,
        "Success Rate: {:.1}% ({} / {} pages captured)",
        summary.success_rate(),
        summary.pages_saved,
        summary.pages_downloaded
    )
}
