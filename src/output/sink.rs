//! Page sink: persists fetched pages under the output root
//!
//! The directory layout mirrors the URL path hierarchy and is the input
//! contract of the downstream content extractor, so the mapping rules here
//! must stay stable.

use crate::output::summary::{CrawlSummary, OutputError, OutputResult};
use crate::url::CrawlTarget;
use crate::{CrawlError, PageError};
use std::fs;
use std::path::{Path, PathBuf};

/// File name used for a URL with an empty path
pub const INDEX_FILE_NAME: &str = "index.html";

/// File name of the run summary in the output root
pub const SUMMARY_FILE_NAME: &str = "crawl_summary.json";

/// Extension appended to paths that do not already end in an HTML extension
const HTML_EXTENSION: &str = "html";

/// Final-segment extensions kept as-is
const KNOWN_EXTENSIONS: &[&str] = &["html", "htm"];

/// Writes pages and the run summary to an output directory
#[derive(Debug)]
pub struct PageSink {
    root: PathBuf,
    finalized: bool,
}

impl PageSink {
    /// Opens (creating if needed) the output root
    ///
    /// Fails if the directory cannot be created or written to; this is a
    /// startup error.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self, CrawlError> {
        let root = root.into();

        fs::create_dir_all(&root).map_err(|source| CrawlError::OutputDir {
            path: root.clone(),
            source,
        })?;

        let write_test = root.join(".docs-crawler-write-test");
        fs::write(&write_test, b"").map_err(|source| CrawlError::OutputDir {
            path: root.clone(),
            source,
        })?;
        let _ = fs::remove_file(&write_test);

        Ok(Self {
            root,
            finalized: false,
        })
    }

    /// The output root
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Maps a target to its location under the output root
    ///
    /// The URL path has its leading and trailing slashes stripped and is used
    /// as a relative file path; an empty path maps to [`INDEX_FILE_NAME`].
    /// Unless the last segment already ends in `.html` or `.htm`, `.html` is
    /// appended, so dotted directory names such as `v1.2` stay directories.
    /// Query strings do not take part in the mapping.
    pub fn path_for(&self, target: &CrawlTarget) -> PathBuf {
        self.root.join(relative_path(target.path()))
    }

    /// Saves page content, creating parent directories as needed
    ///
    /// # Returns
    ///
    /// * `Ok(PathBuf)` - Where the page was written
    /// * `Err(PageError::Write)` - The page could not be written
    pub fn save(&self, target: &CrawlTarget, content: &str) -> Result<PathBuf, PageError> {
        let path = self.path_for(target);

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| PageError::Write {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        fs::write(&path, content).map_err(|source| PageError::Write {
            path: path.clone(),
            source,
        })?;

        tracing::debug!("Saved {} -> {}", target, path.display());
        Ok(path)
    }

    /// Writes the run summary to [`SUMMARY_FILE_NAME`]
    ///
    /// May only succeed once per sink.
    pub fn finalize(&mut self, summary: &CrawlSummary) -> OutputResult<PathBuf> {
        if self.finalized {
            return Err(OutputError::AlreadyFinalized);
        }

        let path = self.root.join(SUMMARY_FILE_NAME);
        let json = serde_json::to_string_pretty(summary)?;
        fs::write(&path, json)?;
        self.finalized = true;

        tracing::info!("Wrote crawl summary to {}", path.display());
        Ok(path)
    }
}

/// Relative file path for a URL path
fn relative_path(url_path: &str) -> PathBuf {
    let trimmed = url_path.trim_matches('/');
    if trimmed.is_empty() {
        return PathBuf::from(INDEX_FILE_NAME);
    }

    let mut path: PathBuf = trimmed
        .split('/')
        .filter(|segment| !segment.is_empty() && *segment != "." && *segment != "..")
        .collect();

    if path.as_os_str().is_empty() {
        return PathBuf::from(INDEX_FILE_NAME);
    }

    let has_html_extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            KNOWN_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        });

    if !has_html_extension {
        let mut file_name = path
            .file_name()
            .map(|name| name.to_os_string())
            .unwrap_or_default();
        file_name.push(".");
        file_name.push(HTML_EXTENSION);
        path.set_file_name(file_name);
    }

    path
}
