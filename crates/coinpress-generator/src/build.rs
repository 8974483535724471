//! Regeneration orchestration.
//!
//! A single linear pass: collect entries, write the portal, refresh every entry
//! page's sidebar, write the routing config. With no entries nothing is written.

use std::{
    fs, io,
    path::{Path, PathBuf},
    time::Instant,
};

use coinpress_core::{Config, SiteIndex};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::{
    collector::{CollectorError, EntryCollector},
    nav::{NavError, NavRenderer, splice_nav},
    portal::{PortalError, PortalGenerator},
    routing::{RoutingError, RoutingGenerator},
};

/// Build errors.
#[derive(Debug, Error)]
pub enum BuildError {
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Collector error.
    #[error("collector error: {0}")]
    Collector(#[from] CollectorError),

    /// Portal generation error.
    #[error("portal error: {0}")]
    Portal(#[from] PortalError),

    /// Navigation error in a specific page.
    #[error("navigation error in {path}: {source}")]
    Nav {
        path: PathBuf,
        #[source]
        source: NavError,
    },

    /// Routing config error.
    #[error("routing error: {0}")]
    Routing(#[from] RoutingError),
}

/// Result type for build operations.
pub type Result<T> = std::result::Result<T, BuildError>;

/// Build statistics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildStats {
    /// Number of entries discovered.
    pub entries: usize,

    /// Entry pages whose sidebar changed.
    pub pages_updated: usize,

    /// Entry pages already up to date.
    pub pages_unchanged: usize,

    /// Entry pages with no place to put a sidebar.
    pub pages_skipped: usize,

    /// Whether the portal page was (re)written.
    pub portal_written: bool,

    /// Whether the routing config was (re)written.
    pub routing_written: bool,

    /// Build duration in milliseconds.
    pub duration_ms: u64,
}

/// Outcome of refreshing one entry page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PageUpdate {
    Updated,
    Unchanged,
    Skipped,
}

/// Site regenerator.
#[derive(Debug)]
pub struct Regenerator {
    config: Config,
    root: PathBuf,
}

impl Regenerator {
    /// Create a regenerator for the site rooted at `root`.
    #[must_use]
    pub fn new(config: Config, root: impl Into<PathBuf>) -> Self {
        Self {
            config,
            root: root.into(),
        }
    }

    /// Execute the full regeneration pass.
    pub fn build(&self) -> Result<BuildStats> {
        let start = Instant::now();
        info!(root = %self.root.display(), "starting regeneration");

        let index = EntryCollector::new(self.config.clone(), &self.root)?.collect()?;
        let mut stats = BuildStats {
            entries: index.len(),
            ..BuildStats::default()
        };

        let Some(latest) = index.latest() else {
            info!(
                dir = %self.config.content_dir(&self.root).display(),
                "no entries found, leaving output untouched"
            );
            return Ok(stats);
        };
        info!(entries = index.len(), latest = %latest.date_str(), "detected entries");

        stats.portal_written = self.write_portal(&index)?;
        self.refresh_pages(&index, &mut stats)?;
        stats.routing_written = self.write_routing(&index)?;

        stats.duration_ms = start.elapsed().as_millis() as u64;

        info!(
            entries = stats.entries,
            pages_updated = stats.pages_updated,
            pages_unchanged = stats.pages_unchanged,
            pages_skipped = stats.pages_skipped,
            duration_ms = stats.duration_ms,
            "regeneration complete"
        );

        Ok(stats)
    }

    /// Write the portal page.
    fn write_portal(&self, index: &SiteIndex) -> Result<bool> {
        let html = PortalGenerator::new(self.config.clone()).generate(index)?;
        let path = self.config.portal_path(&self.root);
        let written = write_if_changed(&path, &html)?;
        info!(path = %path.display(), written, "portal page");
        Ok(written)
    }

    /// Refresh the sidebar of every entry page.
    fn refresh_pages(&self, index: &SiteIndex, stats: &mut BuildStats) -> Result<()> {
        let renderer = NavRenderer::new(&self.config);

        for entry in index.entries() {
            match self.refresh_page(&renderer, index, &entry.url, &entry.source_path)? {
                PageUpdate::Updated => stats.pages_updated += 1,
                PageUpdate::Unchanged => stats.pages_unchanged += 1,
                PageUpdate::Skipped => stats.pages_skipped += 1,
            }
        }

        Ok(())
    }

    fn refresh_page(
        &self,
        renderer: &NavRenderer,
        index: &SiteIndex,
        url: &str,
        path: &Path,
    ) -> Result<PageUpdate> {
        let nav_err = |source| BuildError::Nav {
            path: path.to_path_buf(),
            source,
        };

        let page = match fs::read_to_string(path) {
            Ok(page) => page,
            Err(e) if e.kind() == io::ErrorKind::InvalidData => {
                warn!(path = %path.display(), "page is not UTF-8, skipping");
                return Ok(PageUpdate::Skipped);
            }
            Err(e) => return Err(e.into()),
        };
        let sidebar = renderer.render(index, url).map_err(nav_err)?;

        let Some(updated) = splice_nav(&page, &sidebar).map_err(nav_err)? else {
            warn!(path = %path.display(), "page has no nav markers or </body>, skipping");
            return Ok(PageUpdate::Skipped);
        };

        if updated == page {
            debug!(path = %path.display(), "sidebar unchanged");
            return Ok(PageUpdate::Unchanged);
        }

        fs::write(path, updated)?;
        debug!(path = %path.display(), "sidebar updated");
        Ok(PageUpdate::Updated)
    }

    /// Write the routing config.
    fn write_routing(&self, index: &SiteIndex) -> Result<bool> {
        let json = RoutingGenerator::new(self.config.clone()).generate(index)?;
        let path = self.config.routing_path(&self.root);
        let written = write_if_changed(&path, &json)?;
        info!(path = %path.display(), written, "routing config");
        Ok(written)
    }
}

/// Write `contents` unless the file already holds exactly those bytes.
fn write_if_changed(path: &Path, contents: &str) -> io::Result<bool> {
    match fs::read(path) {
        Ok(existing) if existing == contents.as_bytes() => return Ok(false),
        Ok(_) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => return Err(e),
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, contents)?;
    Ok(true)
}
