//! Check command - validate configuration and content

use std::{fs, path::Path};

use color_eyre::eyre::{Result, bail};
use coinpress_core::Config;
use coinpress_generator::{
    EntryCollector, ScanReport,
    nav::{has_nav_markers, splice_nav},
};

use super::{load_config, resolve};

/// Validation result.
#[derive(Debug, Default)]
struct ValidationResult {
    errors: Vec<String>,
    warnings: Vec<String>,
}

impl ValidationResult {
    fn add_error(&mut self, msg: impl Into<String>) {
        self.errors.push(msg.into());
    }

    fn add_warning(&mut self, msg: impl Into<String>) {
        self.warnings.push(msg.into());
    }

    fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// Run the check command.
///
/// Validates configuration and every entry page without writing anything.
pub fn run(root: &Path, config_path: &Path, strict: bool) -> Result<()> {
    tracing::info!(?root, ?config_path, strict, "Checking configuration and content");

    let mut result = ValidationResult::default();

    println!("Checking configuration...");
    let config = match load_config(root, config_path) {
        Ok(c) => {
            if resolve(root, config_path).exists() {
                println!("  ✓ Configuration valid");
            } else {
                println!("  ✓ No configuration file, using defaults");
            }
            c
        }
        Err(e) => {
            result.add_error(format!("Configuration error: {e:#}"));
            println!("  ✗ Configuration invalid: {e:#}");
            return report(&result, strict);
        }
    };

    println!("\nChecking entries...");
    let scan = EntryCollector::new(config.clone(), root)?.scan()?;
    check_entries(&scan, &mut result);

    if !scan.index.is_empty() {
        println!("\nChecking summaries...");
        check_summaries(root, &config, &scan, &mut result);

        println!("\nChecking entry pages...");
        check_pages(&scan, &mut result);
    }

    println!("\nChecking outputs...");
    check_outputs(root, &config, &mut result);

    report(&result, strict)
}

/// Print the summary and decide the exit status.
fn report(result: &ValidationResult, strict: bool) -> Result<()> {
    println!();
    println!("Summary:");
    println!("  Errors:   {}", result.errors.len());
    println!("  Warnings: {}", result.warnings.len());

    if result.has_errors() {
        println!();
        println!("Errors:");
        for err in &result.errors {
            println!("  ✗ {err}");
        }
    }

    if result.has_warnings() {
        println!();
        println!("Warnings:");
        for warn in &result.warnings {
            println!("  ⚠ {warn}");
        }
    }

    if result.has_errors() {
        bail!("Validation failed with {} error(s)", result.errors.len());
    }

    if strict && result.has_warnings() {
        bail!(
            "Validation failed with {} warning(s) (strict mode)",
            result.warnings.len()
        );
    }

    println!();
    println!("✓ All checks passed");

    Ok(())
}

/// Report discovered and dropped entries.
fn check_entries(scan: &ScanReport, result: &mut ValidationResult) {
    match scan.index.latest() {
        Some(latest) => println!(
            "  ✓ {} entries found, latest {}",
            scan.index.len(),
            latest.date_str()
        ),
        None => {
            result.add_warning("No entries found, build will not write anything");
            println!("  ⚠ No entries found");
        }
    }

    for skipped in &scan.skipped {
        result.add_warning(format!("{}: ignored, {}", skipped.path, skipped.reason));
    }
    if !scan.skipped.is_empty() {
        println!("  ⚠ {} page(s) without a valid date", scan.skipped.len());
    }
}

/// Warn about entries whose summary file is missing.
fn check_summaries(root: &Path, config: &Config, scan: &ScanReport, result: &mut ValidationResult) {
    let mut missing = 0;

    for entry in scan.index.entries() {
        let path = config.summary_path(root, &entry.date_str());
        if !path.is_file() {
            result.add_warning(format!(
                "{}: summary file missing, placeholder will be shown",
                path.display()
            ));
            missing += 1;
        }
    }

    if missing == 0 {
        println!("  ✓ All {} entries have summaries", scan.index.len());
    } else {
        println!("  ⚠ {missing} entries without a summary file");
    }
}

/// Check that every entry page can take a sidebar.
fn check_pages(scan: &ScanReport, result: &mut ValidationResult) {
    let mut marked = 0;

    for entry in scan.index.entries() {
        let path = &entry.source_path;
        let page = match fs::read_to_string(path) {
            Ok(p) => p,
            Err(e) => {
                result.add_error(format!("{}: Failed to read file: {e}", path.display()));
                continue;
            }
        };

        if has_nav_markers(&page) {
            marked += 1;
            continue;
        }

        match splice_nav(&page, "") {
            Ok(Some(_)) => result.add_warning(format!(
                "{}: no nav markers, sidebar will be inserted before </body>",
                path.display()
            )),
            Ok(None) => result.add_warning(format!(
                "{}: no nav markers or </body>, page will be skipped",
                path.display()
            )),
            Err(e) => result.add_error(format!("{}: {e}", path.display())),
        }
    }

    println!(
        "  ✓ {marked}/{} entry pages carry nav markers",
        scan.index.len()
    );
}

/// Check that the output paths are writable files.
fn check_outputs(root: &Path, config: &Config, result: &mut ValidationResult) {
    let portal = config.portal_path(root);
    if portal.is_dir() {
        result.add_error(format!(
            "Portal output exists but is a directory: {}",
            portal.display()
        ));
    }

    let routing = config.routing_path(root);
    if routing.is_dir() {
        result.add_error(format!(
            "Routing config exists but is a directory: {}",
            routing.display()
        ));
    } else if let Ok(existing) = fs::read_to_string(&routing) {
        if serde_json::from_str::<serde_json::Value>(&existing).is_err() {
            result.add_warning(format!(
                "{}: not valid JSON, it will be replaced",
                routing.display()
            ));
        }
    }

    println!("  ✓ Output paths checked");
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    fn write(root: &Path, rel: &str, contents: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    #[test]
    fn test_check_clean_site() {
        let root = TempDir::new().unwrap();
        write(root.path(), "content/2026/01/25/index.html", "<body></body>");
        write(root.path(), "2026-01-25.md", "- 摘要: ok\n");

        crate::cmd::build::run(root.path(), Path::new("coinpress.toml")).unwrap();
        assert!(run(root.path(), Path::new("coinpress.toml"), true).is_ok());
    }

    #[test]
    fn test_check_warnings_fail_only_in_strict_mode() {
        let root = TempDir::new().unwrap();
        write(root.path(), "content/2026/01/25/index.html", "<body></body>");
        write(root.path(), "content/2026/13/01/index.html", "<body></body>");

        assert!(run(root.path(), Path::new("coinpress.toml"), false).is_ok());
        assert!(run(root.path(), Path::new("coinpress.toml"), true).is_err());
    }

    #[test]
    fn test_check_unbalanced_markers_is_an_error() {
        let root = TempDir::new().unwrap();
        write(
            root.path(),
            "content/2026/01/25/index.html",
            "<body><!-- coinpress:nav:start --></body>",
        );

        assert!(run(root.path(), Path::new("coinpress.toml"), false).is_err());
    }

    #[test]
    fn test_check_invalid_config_is_an_error() {
        let root = TempDir::new().unwrap();
        write(root.path(), "coinpress.toml", "[nav]\nrecent_limit = 0\n");

        assert!(run(root.path(), Path::new("coinpress.toml"), false).is_err());
    }
}
