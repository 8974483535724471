//! Entry discovery.
//!
//! Walks the content directory for marker pages, derives each entry's date from
//! its `YYYY/MM/DD` path segment and attaches the summaries from its companion
//! file.

use std::path::{Path, PathBuf};

use coinpress_core::{
    Config, Entry, SiteIndex,
    entry::{date_from_path, normalize_path},
};
use thiserror::Error;
use tracing::{debug, info, warn};
use walkdir::{DirEntry, WalkDir};

use crate::summary::{SummaryError, SummaryExtractor};

/// Content collection errors.
#[derive(Debug, Error)]
pub enum CollectorError {
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Directory walk error.
    #[error("walk error: {0}")]
    Walk(#[from] walkdir::Error),

    /// Summary extraction error.
    #[error("summary error: {0}")]
    Summary(#[from] SummaryError),
}

/// Result type for collector operations.
pub type Result<T> = std::result::Result<T, CollectorError>;

/// A marker page that could not be turned into an entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedPage {
    /// Site-root-relative path of the page.
    pub path: String,

    /// Why it was dropped.
    pub reason: String,
}

/// Outcome of a content scan.
#[derive(Debug, Default)]
pub struct ScanReport {
    /// Discovered entries, most recent first.
    pub index: SiteIndex,

    /// Marker pages dropped for lacking a valid date segment.
    pub skipped: Vec<SkippedPage>,
}

/// Collects dated entries from the content tree.
#[derive(Debug)]
pub struct EntryCollector {
    config: Config,
    root: PathBuf,
    summaries: SummaryExtractor,
}

impl EntryCollector {
    /// Create a collector for the site rooted at `root`.
    pub fn new(config: Config, root: impl Into<PathBuf>) -> Result<Self> {
        let summaries = SummaryExtractor::new(&config.summary)?;
        Ok(Self {
            config,
            root: root.into(),
            summaries,
        })
    }

    /// Collect all entries, most recent first.
    pub fn collect(&self) -> Result<SiteIndex> {
        self.scan().map(|report| report.index)
    }

    /// Collect all entries and report the marker pages that were dropped.
    pub fn scan(&self) -> Result<ScanReport> {
        let content_dir = self.config.content_dir(&self.root);
        info!(dir = %content_dir.display(), "collecting entries");

        if !content_dir.is_dir() {
            warn!(dir = %content_dir.display(), "content directory does not exist");
            return Ok(ScanReport::default());
        }

        let mut pages = self.find_marker_pages(&content_dir)?;
        // Paths embed YYYY/MM/DD, so descending path order is descending date order.
        pages.sort_by(|a, b| b.0.cmp(&a.0));
        info!(count = pages.len(), "found marker pages");

        let mut entries = Vec::with_capacity(pages.len());
        let mut skipped = Vec::new();

        for (relative, source) in pages {
            let date = match date_from_path(&relative) {
                Ok(date) => date,
                Err(e) => {
                    warn!(path = %relative, error = %e, "skipping page without a valid date");
                    skipped.push(SkippedPage {
                        path: relative,
                        reason: e.to_string(),
                    });
                    continue;
                }
            };

            let date_str = date.format("%Y-%m-%d").to_string();
            let summary_path = self.config.summary_path(&self.root, &date_str);
            let summaries = self.summaries.extract_file(&summary_path)?;
            debug!(date = %date_str, summaries = summaries.len(), "collected entry");

            entries.push(Entry {
                date,
                url: format!("/{relative}"),
                summaries,
                source_path: source,
            });
        }

        let index = SiteIndex::new(entries);
        info!(
            entries = index.len(),
            skipped = skipped.len(),
            latest = ?index.latest().map(Entry::date_str),
            "entry collection complete"
        );

        Ok(ScanReport { index, skipped })
    }

    /// Find marker pages under `dir` as (root-relative `/` path, filesystem path) pairs.
    fn find_marker_pages(&self, dir: &Path) -> Result<Vec<(String, PathBuf)>> {
        let marker = self.config.content.marker.as_str();
        let mut pages = Vec::new();

        let walker = WalkDir::new(dir)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !is_hidden(e));

        for entry in walker {
            let entry = entry?;
            if !entry.file_type().is_file() || entry.file_name() != marker {
                continue;
            }

            let path = entry.into_path();
            let relative = path.strip_prefix(&self.root).unwrap_or(&path);
            let relative = normalize_path(relative);
            let relative = relative.trim_start_matches("./").trim_start_matches('/');
            pages.push((relative.to_string(), path));
        }

        Ok(pages)
    }
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.file_name().to_string_lossy().starts_with('.')
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    fn page(root: &Path, rel: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "<html><body></body></html>").unwrap();
    }

    fn collector(root: &Path) -> EntryCollector {
        EntryCollector::new(Config::default(), root).unwrap()
    }

    #[test]
    fn test_collects_entries_latest_first() {
        let root = TempDir::new().unwrap();
        page(root.path(), "content/2026/01/24/index.html");
        page(root.path(), "content/2026/01/25/index.html");
        page(root.path(), "content/2025/12/31/index.html");

        let index = collector(root.path()).collect().unwrap();
        let dates: Vec<_> = index.entries().iter().map(Entry::date_str).collect();
        assert_eq!(dates, vec!["2026-01-25", "2026-01-24", "2025-12-31"]);

        let latest = index.latest().unwrap();
        assert_eq!(latest.url, "/content/2026/01/25/index.html");
        assert_eq!(
            latest.source_path,
            root.path().join("content/2026/01/25/index.html")
        );
    }

    #[test]
    fn test_attaches_summaries() {
        let root = TempDir::new().unwrap();
        page(root.path(), "content/2026/01/25/index.html");
        page(root.path(), "content/2026/01/24/index.html");
        fs::write(
            root.path().join("2026-01-25.md"),
            "- 摘要：比特币 ETF 净流出\n- 摘要：稳定币峰会\n",
        )
        .unwrap();

        let index = collector(root.path()).collect().unwrap();
        assert_eq!(
            index.entries()[0].summaries,
            vec!["比特币 ETF 净流出", "稳定币峰会"]
        );
        assert_eq!(index.entries()[1].summaries, vec!["暂无摘要"]);
    }

    #[test]
    fn test_skips_pages_without_date() {
        let root = TempDir::new().unwrap();
        page(root.path(), "content/2026/01/25/index.html");
        page(root.path(), "content/about/index.html");
        page(root.path(), "content/2026/02/30/index.html");

        let report = collector(root.path()).scan().unwrap();
        assert_eq!(report.index.len(), 1);
        assert_eq!(report.skipped.len(), 2);
        let skipped: Vec<_> = report.skipped.iter().map(|s| s.path.as_str()).collect();
        assert!(skipped.contains(&"content/about/index.html"));
        assert!(skipped.contains(&"content/2026/02/30/index.html"));
    }

    #[test]
    fn test_ignores_other_files_and_hidden_dirs() {
        let root = TempDir::new().unwrap();
        page(root.path(), "content/2026/01/25/index.html");
        page(root.path(), "content/2026/01/25/chart.html");
        page(root.path(), "content/.drafts/2026/01/26/index.html");

        let index = collector(root.path()).collect().unwrap();
        assert_eq!(index.len(), 1);
        assert_eq!(index.latest().unwrap().date_str(), "2026-01-25");
    }

    #[test]
    fn test_empty_or_missing_content_dir() {
        let root = TempDir::new().unwrap();
        assert!(collector(root.path()).collect().unwrap().is_empty());

        fs::create_dir_all(root.path().join("content/2026/01/25")).unwrap();
        assert!(collector(root.path()).collect().unwrap().is_empty());
    }

    #[test]
    fn test_custom_marker_and_dirs() {
        let root = TempDir::new().unwrap();
        page(root.path(), "reports/2026/01/25/report.html");
        page(root.path(), "reports/2026/01/24/index.html");
        fs::create_dir_all(root.path().join("notes")).unwrap();
        fs::write(root.path().join("notes/2026-01-25.md"), "- Summary: ok\n").unwrap();

        let mut config = Config::default();
        config.content.dir = "reports".to_string();
        config.content.marker = "report.html".to_string();
        config.content.summaries_dir = "notes".to_string();

        let index = EntryCollector::new(config, root.path())
            .unwrap()
            .collect()
            .unwrap();
        assert_eq!(index.len(), 1);
        assert_eq!(index.latest().unwrap().url, "/reports/2026/01/25/report.html");
        assert_eq!(index.latest().unwrap().summaries, vec!["ok"]);
    }
}
