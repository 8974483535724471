//! Site configuration management.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

/// Main configuration structure for Coinpress.
///
/// Every section has defaults, so an empty `coinpress.toml` describes the
/// stock portal layout.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Site-wide settings.
    #[serde(default)]
    pub site: SiteConfig,

    /// Where entry pages and summary files live.
    #[serde(default)]
    pub content: ContentConfig,

    /// Summary extraction settings.
    #[serde(default)]
    pub summary: SummaryConfig,

    /// Portal page settings.
    #[serde(default)]
    pub portal: PortalConfig,

    /// Navigation sidebar settings.
    #[serde(default)]
    pub nav: NavConfig,

    /// Routing config settings.
    #[serde(default)]
    pub routing: RoutingConfig,
}

/// Site-wide configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Portal title.
    #[serde(default = "default_title")]
    pub title: String,

    /// Line shown under the portal heading.
    #[serde(default = "default_tagline")]
    pub tagline: String,

    /// Language code for the `<html lang>` attribute.
    #[serde(default = "default_lang")]
    pub lang: String,

    /// Copyright holder printed in the footer.
    #[serde(default = "default_copyright")]
    pub copyright: String,
}

/// Content tree configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentConfig {
    /// Content directory, relative to the site root.
    #[serde(default = "default_content_dir")]
    pub dir: String,

    /// File name whose presence marks a dated entry directory.
    #[serde(default = "default_marker")]
    pub marker: String,

    /// Directory holding `<YYYY-MM-DD>.md` summary files, relative to the site root.
    #[serde(default = "default_summaries_dir")]
    pub summaries_dir: String,
}

/// Summary extraction configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryConfig {
    /// Labels that mark a bullet line as a summary.
    #[serde(default = "default_labels")]
    pub labels: Vec<String>,

    /// Maximum number of summaries per entry.
    #[serde(default = "default_max_lines")]
    pub max_lines: usize,

    /// Maximum summary width in characters, ellipsis included.
    #[serde(default = "default_max_chars")]
    pub max_chars: usize,

    /// Text used when an entry has no summaries.
    #[serde(default = "default_placeholder")]
    pub placeholder: String,
}

/// Portal page configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortalConfig {
    /// Output file, relative to the site root.
    #[serde(default = "default_portal_output")]
    pub output: String,

    /// Number of past entries shown in the archive grid.
    #[serde(default = "default_recent_limit")]
    pub archive_limit: usize,
}

/// Navigation sidebar configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NavConfig {
    /// Number of entries listed before the collapsible archive.
    #[serde(default = "default_recent_limit")]
    pub recent_limit: usize,
}

/// Routing config (`vercel.json`) settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutingConfig {
    /// Output file, relative to the site root.
    #[serde(default = "default_routing_path")]
    pub path: String,

    /// Value of the `cleanUrls` flag.
    #[serde(default = "default_true")]
    pub clean_urls: bool,

    /// Whether to emit the `/` and `/latest` rewrites.
    #[serde(default = "default_true")]
    pub rewrites: bool,
}

// Default value functions
fn default_title() -> String {
    "Crypto Insights Portal".to_string()
}

fn default_tagline() -> String {
    "每日加密货币市场深度分析与宏观动态追踪".to_string()
}

fn default_lang() -> String {
    "zh-CN".to_string()
}

fn default_copyright() -> String {
    "Crypto Insights".to_string()
}

fn default_content_dir() -> String {
    "content".to_string()
}

fn default_marker() -> String {
    "index.html".to_string()
}

fn default_summaries_dir() -> String {
    ".".to_string()
}

fn default_labels() -> Vec<String> {
    vec!["摘要".to_string(), "Summary".to_string()]
}

fn default_max_lines() -> usize {
    3
}

fn default_max_chars() -> usize {
    80
}

fn default_placeholder() -> String {
    "暂无摘要".to_string()
}

fn default_portal_output() -> String {
    "index.html".to_string()
}

fn default_recent_limit() -> usize {
    8
}

fn default_routing_path() -> String {
    "vercel.json".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            tagline: default_tagline(),
            lang: default_lang(),
            copyright: default_copyright(),
        }
    }
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            dir: default_content_dir(),
            marker: default_marker(),
            summaries_dir: default_summaries_dir(),
        }
    }
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            labels: default_labels(),
            max_lines: default_max_lines(),
            max_chars: default_max_chars(),
            placeholder: default_placeholder(),
        }
    }
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            output: default_portal_output(),
            archive_limit: default_recent_limit(),
        }
    }
}

impl Default for NavConfig {
    fn default() -> Self {
        Self {
            recent_limit: default_recent_limit(),
        }
    }
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            path: default_routing_path(),
            clean_urls: true,
            rewrites: true,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(CoreError::config(format!(
                "Configuration file not found: {}",
                path.display()
            )));
        }

        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content).map_err(|e| {
            CoreError::config_with_source(
                format!("Failed to parse config file: {}", path.display()),
                e,
            )
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Load configuration using the config crate, with `COINPRESS__*` overrides.
    ///
    /// A missing file is not an error; defaults fill every unset key.
    pub fn load_with_env(path: &Path) -> Result<Self> {
        Self::load_layered(path, Self::environment())
    }

    /// The `COINPRESS__SECTION__KEY` environment source.
    fn environment() -> config::Environment {
        config::Environment::with_prefix("COINPRESS")
            .separator("__")
            .try_parsing(true)
    }

    fn load_layered(path: &Path, env: config::Environment) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::from(path).required(false))
            .add_source(env)
            .build()?;

        let config: Config = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.site.title.is_empty() {
            return Err(CoreError::config("site.title cannot be empty"));
        }

        if self.content.marker.is_empty() || self.content.marker.contains(['/', '\\']) {
            return Err(CoreError::config("content.marker must be a plain file name"));
        }

        if self.summary.labels.is_empty() || self.summary.labels.iter().any(String::is_empty) {
            return Err(CoreError::config("summary.labels must be non-empty"));
        }

        if self.summary.max_lines == 0 {
            return Err(CoreError::config("summary.max_lines must be at least 1"));
        }

        // Room for at least one character plus the ellipsis.
        if self.summary.max_chars < 4 {
            return Err(CoreError::config("summary.max_chars must be at least 4"));
        }

        if self.nav.recent_limit == 0 {
            return Err(CoreError::config("nav.recent_limit must be at least 1"));
        }

        if self.portal.archive_limit == 0 {
            tracing::warn!("portal.archive_limit is 0, the archive grid will always be empty");
        }

        Ok(())
    }

    /// Content directory under the given site root.
    #[must_use]
    pub fn content_dir(&self, root: &Path) -> PathBuf {
        root.join(&self.content.dir)
    }

    /// Summary file location for an entry date under the given site root.
    #[must_use]
    pub fn summary_path(&self, root: &Path, date: &str) -> PathBuf {
        root.join(&self.content.summaries_dir).join(format!("{date}.md"))
    }

    /// Portal page location under the given site root.
    #[must_use]
    pub fn portal_path(&self, root: &Path) -> PathBuf {
        root.join(&self.portal.output)
    }

    /// Routing config location under the given site root.
    #[must_use]
    pub fn routing_path(&self, root: &Path) -> PathBuf {
        root.join(&self.routing.path)
    }
}
