//! Build command - regenerates the portal, sidebars and routing config

use std::path::Path;

use color_eyre::eyre::{Result, WrapErr};
use coinpress_generator::{BuildStats, Regenerator};

use super::load_config;

/// Run the build command.
///
/// Regenerates every output of the site rooted at `root`.
pub fn run(root: &Path, config_path: &Path) -> Result<BuildStats> {
    tracing::info!(?root, ?config_path, "Starting build");

    let config = load_config(root, config_path)?;
    let stats = Regenerator::new(config, root)
        .build()
        .wrap_err("Build failed")?;

    println!();
    if stats.entries == 0 {
        println!("  No entries found, nothing to do.");
        println!();
        return Ok(stats);
    }

    println!("  Build completed successfully!");
    println!();
    println!("  Entries:    {}", stats.entries);
    println!("  Updated:    {}", stats.pages_updated);
    println!("  Unchanged:  {}", stats.pages_unchanged);
    println!("  Skipped:    {}", stats.pages_skipped);
    println!("  Portal:     {}", written(stats.portal_written));
    println!("  Routing:    {}", written(stats.routing_written));
    println!();
    println!("  Duration:   {}ms", stats.duration_ms);
    println!();

    tracing::info!(?stats, "Build completed successfully");

    Ok(stats)
}

fn written(flag: bool) -> &'static str {
    if flag { "written" } else { "unchanged" }
}
