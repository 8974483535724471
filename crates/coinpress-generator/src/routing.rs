//! Routing config (`vercel.json`) generation.

use coinpress_core::{Config, SiteIndex};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Routing config errors.
#[derive(Debug, Error)]
pub enum RoutingError {
    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The index has no latest entry to alias.
    #[error("no entries to route")]
    Empty,
}

/// Result type for routing operations.
pub type Result<T> = std::result::Result<T, RoutingError>;

/// A single `source -> destination` rewrite.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rewrite {
    pub source: String,
    pub destination: String,
}

/// The routing config document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoutingConfigFile {
    pub clean_urls: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rewrites: Option<Vec<Rewrite>>,
}

/// Builds the routing config from the site index.
#[derive(Debug)]
pub struct RoutingGenerator {
    config: Config,
}

impl RoutingGenerator {
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Build the routing document: `/` to the portal, `/latest` to the newest entry.
    pub fn build(&self, index: &SiteIndex) -> Result<RoutingConfigFile> {
        let latest = index.latest().ok_or(RoutingError::Empty)?;

        let rewrites = self.config.routing.rewrites.then(|| {
            vec![
                Rewrite {
                    source: "/".to_string(),
                    destination: format!("/{}", self.config.portal.output.trim_start_matches('/')),
                },
                Rewrite {
                    source: "/latest".to_string(),
                    destination: latest.url.clone(),
                },
            ]
        });

        Ok(RoutingConfigFile {
            clean_urls: self.config.routing.clean_urls,
            rewrites,
        })
    }

    /// Render the routing document as pretty JSON with a trailing newline.
    pub fn generate(&self, index: &SiteIndex) -> Result<String> {
        let mut json = serde_json::to_string_pretty(&self.build(index)?)?;
        json.push('\n');
        Ok(json)
    }
}
