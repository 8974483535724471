//! Dated entries and the ordered site index.

use std::{
    path::{Path, PathBuf},
    sync::LazyLock,
};

use chrono::{Datelike, NaiveDate};
use regex::Regex;

use crate::error::{CoreError, Result};

static DATE_SEGMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d{4})/(\d{2})/(\d{2})").expect("valid date pattern"));

/// Convert a relative path to a `/`-separated string regardless of platform.
#[must_use]
pub fn normalize_path(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

/// Derive an entry date from the first `YYYY/MM/DD` segment of a path.
///
/// The segment must also name a real calendar day.
pub fn date_from_path(path: &str) -> Result<NaiveDate> {
    let caps = DATE_SEGMENT
        .captures(path)
        .ok_or_else(|| CoreError::entry_path(path, "no YYYY/MM/DD segment"))?;

    let part = |i: usize| -> Result<u32> {
        caps[i]
            .parse()
            .map_err(|_| CoreError::entry_path(path, "non-numeric date segment"))
    };
    let year = i32::try_from(part(1)?)
        .map_err(|_| CoreError::entry_path(path, "year out of range"))?;

    NaiveDate::from_ymd_opt(year, part(2)?, part(3)?).ok_or_else(|| {
        CoreError::entry_path(
            path,
            format!("{}-{}-{} is not a calendar date", &caps[1], &caps[2], &caps[3]),
        )
    })
}

/// A single dated report discovered in the content tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// Report date.
    pub date: NaiveDate,

    /// Absolute URL path of the report page, e.g. `/content/2026/01/25/index.html`.
    pub url: String,

    /// Short summary lines, never empty once extracted.
    pub summaries: Vec<String>,

    /// Location of the report page on disk.
    pub source_path: PathBuf,
}

impl Entry {
    /// Build an entry from a site-root-relative page path.
    pub fn from_relative(
        relative: &Path,
        source_path: impl Into<PathBuf>,
        summaries: Vec<String>,
    ) -> Result<Self> {
        let normalized = normalize_path(relative);
        let date = date_from_path(&normalized)?;

        Ok(Self {
            date,
            url: format!("/{}", normalized.trim_start_matches('/')),
            summaries,
            source_path: source_path.into(),
        })
    }

    /// Date formatted as `YYYY-MM-DD`.
    #[must_use]
    pub fn date_str(&self) -> String {
        self.date.format("%Y-%m-%d").to_string()
    }

    /// First summary line, if any.
    #[must_use]
    pub fn first_summary(&self) -> Option<&str> {
        self.summaries.first().map(String::as_str)
    }

    /// Week of the month, 1-based: days 1-7 are week 1, 8-14 week 2, and so on.
    #[must_use]
    pub fn week_of_month(&self) -> u32 {
        (self.date.day() - 1) / 7 + 1
    }
}

/// Entries ordered most recent first.
///
/// The first entry is the latest; the rest are past entries.
#[derive(Debug, Clone, Default)]
pub struct SiteIndex {
    entries: Vec<Entry>,
}

impl SiteIndex {
    /// Create an index, ordering entries by URL descending.
    ///
    /// URLs embed `YYYY/MM/DD`, so this is also descending date order.
    #[must_use]
    pub fn new(mut entries: Vec<Entry>) -> Self {
        entries.sort_by(|a, b| b.url.cmp(&a.url));
        Self { entries }
    }

    /// All entries, most recent first.
    #[must_use]
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// The most recent entry.
    #[must_use]
    pub fn latest(&self) -> Option<&Entry> {
        self.entries.first()
    }

    /// Every entry except the latest.
    #[must_use]
    pub fn past(&self) -> &[Entry] {
        self.entries.get(1..).unwrap_or_default()
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the index has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
