//! Verify command - check downloaded or generated images

use std::path::Path;

use color_eyre::eyre::{Result, WrapErr, bail};
use coinpress_generator::AssetVerifier;

use super::resolve;

/// Run the verify command.
///
/// Fails when any file in `dir` is too small or not a recognised image.
pub fn run(root: &Path, dir: &Path, min_size: u64) -> Result<()> {
    let dir = resolve(root, dir);
    tracing::info!(dir = %dir.display(), min_size, "Verifying images");

    let report = AssetVerifier::new()
        .with_min_size(min_size)
        .verify(&dir)
        .wrap_err("Image verification failed")?;

    println!("Verifying images in {}...", report.dir.display());
    for asset in &report.assets {
        let mark = if asset.status.is_ok() { "✓" } else { "✗" };
        println!("  {mark} {asset}");
    }

    let failed = report.failures().count();
    if failed > 0 {
        bail!("{failed} of {} image(s) failed verification", report.assets.len());
    }

    println!();
    println!("✓ All {} image(s) valid", report.assets.len());
    Ok(())
}
