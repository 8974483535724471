//! Navigation sidebar rendering.
//!
//! Every entry page carries a sidebar listing the most recent entries and a
//! collapsible year / month / week / day archive of the older ones. The sidebar
//! is rendered from the [`SiteIndex`] on each run and placed between
//! [`NAV_START`] and [`NAV_END`]; the previous block is discarded, never patched.

use std::collections::BTreeMap;

use chrono::Datelike;
use coinpress_core::{Config, Entry, SiteIndex};
use thiserror::Error;

use crate::template::{TemplateContext, TemplateError, TemplateRegistry, escape_html};

/// Opening marker of the generated sidebar block.
pub const NAV_START: &str = "<!-- coinpress:nav:start -->";

/// Closing marker of the generated sidebar block.
pub const NAV_END: &str = "<!-- coinpress:nav:end -->";

/// Navigation rendering errors.
#[derive(Debug, Error)]
pub enum NavError {
    /// Template error.
    #[error("template error: {0}")]
    Template(#[from] TemplateError),

    /// A start marker without a matching end marker.
    #[error("nav start marker without end marker")]
    UnbalancedMarkers,
}

/// Result type for navigation rendering.
pub type Result<T> = std::result::Result<T, NavError>;

type WeekMap<'a> = BTreeMap<u32, Vec<&'a Entry>>;
type MonthMap<'a> = BTreeMap<u32, WeekMap<'a>>;
type YearMap<'a> = BTreeMap<i32, MonthMap<'a>>;

/// Sidebar renderer.
#[derive(Debug)]
pub struct NavRenderer {
    templates: TemplateRegistry,
    recent_limit: usize,
    home_url: String,
}

impl NavRenderer {
    /// Create a renderer with the built-in templates.
    #[must_use]
    pub fn new(config: &Config) -> Self {
        Self::with_templates(config, TemplateRegistry::new())
    }

    /// Create a renderer with custom templates.
    #[must_use]
    pub fn with_templates(config: &Config, templates: TemplateRegistry) -> Self {
        let home_url = match config.portal.output.trim_start_matches('/') {
            "index.html" => "/".to_string(),
            other => format!("/{other}"),
        };

        Self {
            templates,
            recent_limit: config.nav.recent_limit,
            home_url,
        }
    }

    /// Render the sidebar as seen from the page at `current_url`.
    pub fn render(&self, index: &SiteIndex, current_url: &str) -> Result<String> {
        let entries = index.entries();
        let split = entries.len().min(self.recent_limit);
        let (recent, older) = entries.split_at(split);

        let recent_items = recent
            .iter()
            .map(|e| format!("        <li>{}</li>", nav_link(e, current_url)))
            .collect::<Vec<_>>()
            .join("\n");

        let mut ctx = TemplateContext::new()
            .with_var("home_url", escape_html(&self.home_url))
            .with_var("recent_items", recent_items);

        if !older.is_empty() {
            ctx.insert("archive", archive_html(older, current_url));
        }

        Ok(self.templates.render("nav", &ctx)?)
    }
}

/// Link to an entry, highlighted when it is the page being viewed.
fn nav_link(entry: &Entry, current_url: &str) -> String {
    let active = entry.url == current_url;
    format!(
        r#"<a class="nav-link{}" href="{}"{} title="{}">{}</a>"#,
        if active { " active" } else { "" },
        escape_html(&entry.url),
        if active { r#" aria-current="page""# } else { "" },
        escape_html(entry.first_summary().unwrap_or_default()),
        entry.date_str()
    )
}

/// Group entries by year, month and week of month.
fn group_archive(entries: &[Entry]) -> YearMap<'_> {
    let mut years = YearMap::new();
    for entry in entries {
        years
            .entry(entry.date.year())
            .or_default()
            .entry(entry.date.month())
            .or_default()
            .entry(entry.week_of_month())
            .or_default()
            .push(entry);
    }
    years
}

/// Render the collapsible archive, newest branch first.
///
/// Branches containing the current page start open.
fn archive_html(entries: &[Entry], current_url: &str) -> String {
    let open = |hit: bool| if hit { " open" } else { "" };

    let mut html = String::from(
        "    <section class=\"nav-archive\">\n        <h2 class=\"nav-heading\">历史归档</h2>\n",
    );

    for (year, months) in group_archive(entries).iter().rev() {
        let year_hit = months
            .values()
            .flat_map(|w| w.values().flatten())
            .any(|e| e.url == current_url);
        html.push_str(&format!(
            "        <details class=\"nav-year\"{}>\n            <summary>{year} 年</summary>\n",
            open(year_hit)
        ));

        for (month, weeks) in months.iter().rev() {
            let month_hit = weeks.values().flatten().any(|e| e.url == current_url);
            html.push_str(&format!(
                "            <details class=\"nav-month\"{}>\n                <summary>{month:02} 月</summary>\n",
                open(month_hit)
            ));

            for (week, days) in weeks.iter().rev() {
                let week_hit = days.iter().any(|e| e.url == current_url);
                html.push_str(&format!(
                    "                <details class=\"nav-week\"{}>\n                    <summary>第 {week} 周</summary>\n                    <ul class=\"nav-days\">\n",
                    open(week_hit)
                ));
                for day in days {
                    html.push_str(&format!(
                        "                        <li>{}</li>\n",
                        nav_link(day, current_url)
                    ));
                }
                html.push_str("                    </ul>\n                </details>\n");
            }
            html.push_str("            </details>\n");
        }
        html.push_str("        </details>\n");
    }

    html.push_str("    </section>");
    html
}

/// Place `sidebar` into `page`, between the nav markers.
///
/// An existing marked block is replaced wholesale. Without markers the block is
/// inserted before `</body>`. Returns `Ok(None)` when the page has neither.
pub fn splice_nav(page: &str, sidebar: &str) -> Result<Option<String>> {
    let block = format!("{NAV_START}\n{sidebar}\n{NAV_END}");

    if let Some(start) = page.find(NAV_START) {
        let end = page[start..]
            .find(NAV_END)
            .map(|i| start + i + NAV_END.len())
            .ok_or(NavError::UnbalancedMarkers)?;

        let mut out = String::with_capacity(page.len() + block.len());
        out.push_str(&page[..start]);
        out.push_str(&block);
        out.push_str(&page[end..]);
        return Ok(Some(out));
    }

    // ASCII lowercasing keeps byte offsets intact.
    let Some(body_end) = page.to_ascii_lowercase().rfind("</body>") else {
        return Ok(None);
    };

    let mut out = String::with_capacity(page.len() + block.len() + 1);
    out.push_str(&page[..body_end]);
    out.push_str(&block);
    out.push('\n');
    out.push_str(&page[body_end..]);
    Ok(Some(out))
}

/// Whether a page already carries the nav markers.
#[must_use]
pub fn has_nav_markers(page: &str) -> bool {
    page.find(NAV_START)
        .is_some_and(|start| page[start..].contains(NAV_END))
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;

    fn entry(date: &str) -> Entry {
        let rel = format!("content/{}/index.html", date.replace('-', "/"));
        Entry::from_relative(Path::new(&rel), rel.clone(), vec![format!("news {date}")]).unwrap()
    }

    fn url(date: &str) -> String {
        format!("/content/{}/index.html", date.replace('-', "/"))
    }

    /// Twelve entries: 2026-01-10..=2026-01-01, 2025-12-31, 2025-12-15.
    fn sample_index() -> SiteIndex {
        let mut entries: Vec<_> = (1..=10).map(|d| entry(&format!("2026-01-{d:02}"))).collect();
        entries.push(entry("2025-12-31"));
        entries.push(entry("2025-12-15"));
        SiteIndex::new(entries)
    }

    #[test]
    fn test_recent_list_holds_eight_most_recent() {
        let renderer = NavRenderer::new(&Config::default());
        let html = renderer.render(&sample_index(), &url("2026-01-10")).unwrap();

        let recent = html.split("nav-archive").next().unwrap();
        assert_eq!(recent.matches("nav-link").count(), 8);
        assert!(recent.contains(&url("2026-01-10")));
        assert!(recent.contains(&url("2026-01-03")));
        assert!(!recent.contains(&url("2026-01-02")));
    }

    #[test]
    fn test_archive_groups_older_entries() {
        let renderer = NavRenderer::new(&Config::default());
        let html = renderer.render(&sample_index(), &url("2026-01-10")).unwrap();

        let archive = html.split("nav-archive").nth(1).unwrap();
        assert_eq!(archive.matches("nav-link").count(), 4);
        assert_eq!(archive.matches("class=\"nav-year\"").count(), 2);
        assert!(archive.contains("<summary>2026 年</summary>"));
        assert!(archive.contains("<summary>2025 年</summary>"));
        assert!(archive.contains("<summary>12 月</summary>"));
        assert!(archive.contains("<summary>第 5 周</summary>"));
        assert!(archive.contains("<summary>第 3 周</summary>"));
        // Newest year first.
        assert!(archive.find("2026 年").unwrap() < archive.find("2025 年").unwrap());
        // Nothing in the archive is current, so nothing is open.
        assert!(!archive.contains(" open"));
    }

    #[test]
    fn test_current_entry_is_highlighted() {
        let renderer = NavRenderer::new(&Config::default());
        let html = renderer.render(&sample_index(), &url("2026-01-05")).unwrap();

        assert_eq!(html.matches("aria-current=\"page\"").count(), 1);
        assert!(html.contains(&format!(
            r#"<a class="nav-link active" href="{}" aria-current="page""#,
            url("2026-01-05")
        )));
    }

    #[test]
    fn test_archive_branch_of_current_entry_is_open() {
        let renderer = NavRenderer::new(&Config::default());
        let html = renderer.render(&sample_index(), &url("2025-12-15")).unwrap();

        assert!(html.contains("<details class=\"nav-year\" open>\n            <summary>2025 年"));
        assert!(html.contains("<details class=\"nav-month\" open>\n                <summary>12 月"));
        assert!(html.contains("<details class=\"nav-week\" open>\n                    <summary>第 3 周"));
        assert!(html.contains("<details class=\"nav-week\">\n                    <summary>第 5 周"));
        assert!(html.contains("<details class=\"nav-year\">\n            <summary>2026 年"));
    }

    #[test]
    fn test_small_index_has_no_archive() {
        let index = SiteIndex::new(vec![entry("2026-01-25"), entry("2026-01-24")]);
        let html = NavRenderer::new(&Config::default())
            .render(&index, &url("2026-01-25"))
            .unwrap();
        assert!(!html.contains("nav-archive"));
        assert!(html.contains(r#"<a class="nav-home" href="/">"#));
    }

    #[test]
    fn test_home_url_follows_portal_output() {
        let mut config = Config::default();
        config.portal.output = "portal.html".to_string();
        let html = NavRenderer::new(&config)
            .render(&SiteIndex::new(vec![entry("2026-01-25")]), "")
            .unwrap();
        assert!(html.contains(r#"href="/portal.html""#));
    }

    #[test]
    fn test_splice_inserts_before_body_end() {
        let page = "<html><body><main>report</main></BODY></html>";
        let out = splice_nav(page, "<nav>x</nav>").unwrap().unwrap();
        assert_eq!(
            out,
            format!("<html><body><main>report</main>{NAV_START}\n<nav>x</nav>\n{NAV_END}\n</BODY></html>")
        );
        assert!(has_nav_markers(&out));
    }

    #[test]
    fn test_splice_replaces_existing_block() {
        let page = format!("<body><aside>{NAV_START}\n<nav>old</nav>\n{NAV_END}</aside><main/></body>");
        let out = splice_nav(&page, "<nav>new</nav>").unwrap().unwrap();
        assert_eq!(
            out,
            format!("<body><aside>{NAV_START}\n<nav>new</nav>\n{NAV_END}</aside><main/></body>")
        );
    }

    #[test]
    fn test_splice_is_idempotent() {
        let page = "<html><body><p>r</p></body></html>";
        let once = splice_nav(page, "<nav>a</nav>").unwrap().unwrap();
        let twice = splice_nav(&once, "<nav>a</nav>").unwrap().unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_splice_without_anchor() {
        assert!(splice_nav("<p>fragment</p>", "<nav/>").unwrap().is_none());
    }

    #[test]
    fn test_splice_unbalanced_markers() {
        let page = format!("<body>{NAV_START}<nav>old</nav></body>");
        assert!(matches!(
            splice_nav(&page, "<nav/>"),
            Err(NavError::UnbalancedMarkers)
        ));
        assert!(!has_nav_markers(&page));
    }
}
