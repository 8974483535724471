//! Command implementations.

pub mod build;
pub mod check;
pub mod verify;

use std::path::{Path, PathBuf};

use color_eyre::eyre::{Result, WrapErr};
use coinpress_core::Config;

/// Resolve `path` against the site root unless it is already absolute.
pub(crate) fn resolve(root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    }
}

/// Load the site configuration, applying `COINPRESS__*` overrides.
///
/// A missing file is not an error: every setting has a default.
pub(crate) fn load_config(root: &Path, config_path: &Path) -> Result<Config> {
    let path = resolve(root, config_path);
    if !path.exists() {
        tracing::debug!(path = %path.display(), "no config file, using defaults");
    }

    let config = Config::load_with_env(&path)
        .wrap_err_with(|| format!("Failed to load configuration from {}", path.display()))?;
    tracing::debug!(?config, "Loaded configuration");
    Ok(config)
}
