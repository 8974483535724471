//! Summary extraction from `<YYYY-MM-DD>.md` companion files.
//!
//! A summary is a bullet line carrying one of the configured labels:
//!
//! ```text
//! - **摘要**：比特币 ETF 单日净流出 4.2 亿美元
//! * Summary: Tether reports record 2025 profit
//! ```

use std::{fs, io, path::Path};

use coinpress_core::config::SummaryConfig;
use regex::Regex;
use thiserror::Error;
use tracing::{debug, warn};

/// Summary extraction errors.
#[derive(Debug, Error)]
pub enum SummaryError {
    /// IO error other than a missing file.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// The configured labels did not produce a valid pattern.
    #[error("invalid summary pattern: {0}")]
    Pattern(#[from] regex::Error),
}

/// Result type for summary operations.
pub type Result<T> = std::result::Result<T, SummaryError>;

const ELLIPSIS: &str = "...";

/// Extracts labelled summary bullets from raw text.
#[derive(Debug, Clone)]
pub struct SummaryExtractor {
    pattern: Regex,
    max_lines: usize,
    max_chars: usize,
    placeholder: String,
}

impl SummaryExtractor {
    /// Build an extractor for the configured labels and limits.
    pub fn new(config: &SummaryConfig) -> Result<Self> {
        let labels = config
            .labels
            .iter()
            .map(|l| regex::escape(l))
            .collect::<Vec<_>>()
            .join("|");

        let pattern = Regex::new(&format!(
            r"(?m)^[ \t]*[-*+][ \t]+(?:\*\*)?(?:{labels})(?:\*\*)?[ \t]*[:：](?:\*\*)?[ \t]*(.+)$"
        ))?;

        Ok(Self {
            pattern,
            max_lines: config.max_lines,
            max_chars: config.max_chars,
            placeholder: config.placeholder.clone(),
        })
    }

    /// Extract summaries from text, falling back to the placeholder.
    #[must_use]
    pub fn extract(&self, text: &str) -> Vec<String> {
        let summaries: Vec<String> = self
            .pattern
            .captures_iter(text)
            .filter_map(|caps| caps.get(1))
            .map(|m| m.as_str().trim())
            .filter(|s| !s.is_empty())
            .take(self.max_lines)
            .map(|s| truncate(s, self.max_chars))
            .collect();

        if summaries.is_empty() {
            self.placeholder()
        } else {
            summaries
        }
    }

    /// Extract summaries from a file.
    ///
    /// A missing file or one that is not UTF-8 yields the placeholder.
    pub fn extract_file(&self, path: &Path) -> Result<Vec<String>> {
        let bytes = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no summary file");
                return Ok(self.placeholder());
            }
            Err(e) => return Err(e.into()),
        };

        match String::from_utf8(bytes) {
            Ok(text) => Ok(self.extract(&text)),
            Err(e) => {
                warn!(
                    path = %path.display(),
                    error = %e.utf8_error(),
                    "summary file is not UTF-8, using placeholder"
                );
                Ok(self.placeholder())
            }
        }
    }

    /// The single-element placeholder sequence.
    #[must_use]
    pub fn placeholder(&self) -> Vec<String> {
        vec![self.placeholder.clone()]
    }
}

/// Cut `s` to at most `max_chars` characters, ending in an ellipsis when cut.
#[must_use]
pub fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        return s.to_string();
    }

    let keep = max_chars.saturating_sub(ELLIPSIS.len());
    let mut out: String = s.chars().take(keep).collect();
    out.push_str(ELLIPSIS);
    out
}
