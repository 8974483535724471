//! Coinpress CLI
//!
//! Regenerates a static crypto-news portal from its dated entry pages.
//!
//! This is the binary entry point. The library functionality is in `lib.rs`.

use std::path::PathBuf;

use clap::Parser;
use color_eyre::eyre::Result;

/// Command-line interface for Coinpress.
#[derive(Parser)]
#[command(
    name = "coinpress",
    version,
    about = "Regenerate a static crypto-news portal"
)]
struct Cli {
    /// Path to configuration file, relative to the site root
    #[arg(short, long, default_value = "coinpress.toml")]
    config: PathBuf,

    /// Site root directory
    #[arg(short, long, default_value = ".")]
    root: PathBuf,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

/// Available CLI commands.
#[derive(clap::Subcommand)]
enum Commands {
    /// Regenerate the portal, entry sidebars and routing config
    Build,
    /// Validate configuration and content
    Check {
        /// Treat warnings as errors
        #[arg(long)]
        strict: bool,
    },
    /// Verify downloaded or generated images
    Verify {
        /// Directory holding the images, relative to the site root
        #[arg(short, long, default_value = "imgs")]
        dir: PathBuf,
        /// Minimum accepted file size in bytes
        #[arg(long, default_value_t = coinpress_generator::assets::DEFAULT_MIN_SIZE)]
        min_size: u64,
    },
}

fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    coinpress::init_tracing(cli.verbose);

    match cli.command {
        Commands::Build => {
            coinpress::cmd::build::run(&cli.root, &cli.config)?;
        }
        Commands::Check { strict } => {
            coinpress::cmd::check::run(&cli.root, &cli.config, strict)?;
        }
        Commands::Verify { dir, min_size } => {
            coinpress::cmd::verify::run(&cli.root, &dir, min_size)?;
        }
    }

    Ok(())
}
