//! Portal page generation.
//!
//! Renders the landing page: the latest entry with all of its summaries, then
//! a grid of the most recent past entries with their first summary line.

use chrono::Datelike;
use coinpress_core::{Config, Entry, SiteIndex};
use thiserror::Error;
use tracing::debug;

use crate::template::{TemplateContext, TemplateError, TemplateRegistry, escape_html};

/// Portal generation errors.
#[derive(Debug, Error)]
pub enum PortalError {
    /// Template error.
    #[error("template error: {0}")]
    Template(#[from] TemplateError),

    /// The index has no entries to feature.
    #[error("no entries to render")]
    Empty,
}

/// Result type for portal generation.
pub type Result<T> = std::result::Result<T, PortalError>;

/// Generator value embedded in `<meta name="generator">`.
pub const GENERATOR: &str = concat!("coinpress ", env!("CARGO_PKG_VERSION"));

/// Portal page generator.
#[derive(Debug)]
pub struct PortalGenerator {
    templates: TemplateRegistry,
    config: Config,
}

impl PortalGenerator {
    /// Create a new portal generator with the built-in templates.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            templates: TemplateRegistry::new(),
            config,
        }
    }

    /// Create a generator with custom templates.
    #[must_use]
    pub fn with_templates(config: Config, templates: TemplateRegistry) -> Self {
        Self { templates, config }
    }

    /// Past entries shown in the archive grid.
    #[must_use]
    pub fn archive_entries<'a>(&self, index: &'a SiteIndex) -> &'a [Entry] {
        let past = index.past();
        &past[..past.len().min(self.config.portal.archive_limit)]
    }

    /// Render the portal page.
    pub fn generate(&self, index: &SiteIndex) -> Result<String> {
        let latest = index.latest().ok_or(PortalError::Empty)?;
        debug!(latest = %latest.date_str(), "generating portal page");

        let latest_summaries = latest
            .summaries
            .iter()
            .map(|s| {
                format!(
                    r#"                        <li class="summary-line">{}</li>"#,
                    escape_html(s)
                )
            })
            .collect::<Vec<_>>()
            .join("\n");

        let archive = self.archive_entries(index);
        let archive_items = if archive.is_empty() {
            self.templates
                .render("portal_empty", &TemplateContext::new())?
        } else {
            archive
                .iter()
                .map(|entry| self.archive_card(entry))
                .collect::<std::result::Result<String, _>>()?
        };

        let ctx = TemplateContext::new()
            .with_var("lang", escape_html(&self.config.site.lang))
            .with_var("title", escape_html(&self.config.site.title))
            .with_var("tagline", escape_html(&self.config.site.tagline))
            .with_var("generator", GENERATOR)
            .with_var("latest_url", escape_html(&latest.url))
            .with_var("latest_date", latest.date_str())
            .with_var("latest_summaries", latest_summaries)
            .with_var("archive_items", archive_items.trim_end())
            // Taken from the data, not the clock, so reruns are byte-identical.
            .with_var("year", latest.date.year().to_string())
            .with_var("copyright", escape_html(&self.config.site.copyright));

        Ok(self.templates.render("portal", &ctx)?)
    }

    fn archive_card(&self, entry: &Entry) -> std::result::Result<String, TemplateError> {
        let ctx = TemplateContext::new()
            .with_var("url", escape_html(&entry.url))
            .with_var("date", entry.date_str())
            .with_var(
                "summary",
                escape_html(entry.first_summary().unwrap_or(&self.config.summary.placeholder)),
            );
        self.templates.render("portal_card", &ctx)
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;
    use crate::template::Template;

    fn entry(date: &str, summaries: &[&str]) -> Entry {
        let rel = format!("content/{}/index.html", date.replace('-', "/"));
        Entry::from_relative(
            Path::new(&rel),
            rel.clone(),
            summaries.iter().map(ToString::to_string).collect(),
        )
        .unwrap()
    }

    fn index_of(n: u32) -> SiteIndex {
        SiteIndex::new(
            (1..=n)
                .map(|d| entry(&format!("2026-01-{d:02}"), &[format!("day {d}").as_str()]))
                .collect(),
        )
    }

    #[test]
    fn test_generate_portal() {
        let index = SiteIndex::new(vec![
            entry("2026-01-25", &["BTC ETF outflow", "Whale exits ETH"]),
            entry("2026-01-24", &["Tether profit"]),
        ]);
        let html = PortalGenerator::new(Config::default()).generate(&index).unwrap();

        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains(r#"<html lang="zh-CN">"#));
        assert!(html.contains(r#"href="/content/2026/01/25/index.html""#));
        assert!(html.contains("加密货币市场日报 - 2026-01-25"));
        assert!(html.contains(r#"<li class="summary-line">BTC ETF outflow</li>"#));
        assert!(html.contains(r#"<li class="summary-line">Whale exits ETH</li>"#));
        assert!(html.contains(r#"href="/content/2026/01/24/index.html""#));
        assert!(html.contains("Tether profit"));
        assert!(html.contains("&copy; 2026 Crypto Insights."));
        assert!(!html.contains("暂无更多历史记录"));
    }

    #[test]
    fn test_archive_grid_size() {
        let generator = PortalGenerator::new(Config::default());
        for total in [1, 2, 5, 9, 10, 20] {
            let index = index_of(total);
            let html = generator.generate(&index).unwrap();
            let cards = html.matches("archive-card").count();
            assert_eq!(cards, (total as usize - 1).min(8), "total = {total}");
        }
    }

    #[test]
    fn test_archive_grid_shows_most_recent_past() {
        let generator = PortalGenerator::new(Config::default());
        let index = index_of(12);
        let dates: Vec<_> = generator
            .archive_entries(&index)
            .iter()
            .map(Entry::date_str)
            .collect();
        assert_eq!(dates.first().map(String::as_str), Some("2026-01-11"));
        assert_eq!(dates.last().map(String::as_str), Some("2026-01-04"));
    }

    #[test]
    fn test_single_entry_shows_empty_archive() {
        let index = index_of(1);
        let html = PortalGenerator::new(Config::default()).generate(&index).unwrap();
        assert!(html.contains("暂无更多历史记录"));
    }

    #[test]
    fn test_summaries_are_escaped() {
        let index = SiteIndex::new(vec![entry("2026-01-25", &["<script>alert(1)</script>"])]);
        let html = PortalGenerator::new(Config::default()).generate(&index).unwrap();
        assert!(html.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
        assert!(!html.contains("<script>alert(1)"));
    }

    #[test]
    fn test_empty_index_is_an_error() {
        let result = PortalGenerator::new(Config::default()).generate(&SiteIndex::default());
        assert!(matches!(result, Err(PortalError::Empty)));
    }

    #[test]
    fn test_custom_card_template() {
        let mut templates = TemplateRegistry::new();
        templates.register(Template::new("portal_card", "[{{ date }}]"));
        let generator = PortalGenerator::with_templates(Config::default(), templates);

        let html = generator.generate(&index_of(3)).unwrap();
        assert!(html.contains("[2026-01-02][2026-01-01]"));
    }

    #[test]
    fn test_output_is_deterministic() {
        let generator = PortalGenerator::new(Config::default());
        let index = index_of(4);
        assert_eq!(
            generator.generate(&index).unwrap(),
            generator.generate(&index).unwrap()
        );
    }
}
