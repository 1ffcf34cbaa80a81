//! buildspec - bootstraps native dependencies from source.
//!
//! Reads `build.spec.xml`, then for each listed package:
//! - downloads and unpacks the source archive
//! - applies the manifest's patches
//! - runs `./configure`, `make` and `make install`

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use buildspec::config::Config;
use buildspec::orchestrator::Workspace;

#[derive(Parser)]
#[command(name = "buildspec")]
#[command(about = "Build third-party source packages from a build.spec.xml manifest")]
#[command(
    after_help = "QUICK START:\n  buildspec preflight   Check host tools and the manifest\n  buildspec show tasks  Print what would run\n  buildspec build       Fetch, patch, configure, build and install"
)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Manifest to use instead of searching parent directories
    #[arg(long, global = true)]
    manifest: Option<PathBuf>,

    /// Directory tasks resolve against (default: the manifest's directory)
    #[arg(long, global = true)]
    root: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run every task in the manifest (default)
    Build,

    /// Show information
    Show {
        #[command(subcommand)]
        what: ShowTarget,
    },

    /// Check host tools and the manifest before building
    Preflight {
        /// Fail if any checks fail (exit code 1)
        #[arg(long)]
        strict: bool,
    },
}

#[derive(Subcommand)]
enum ShowTarget {
    /// Show parsed tasks and the commands they would run
    Tasks {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show current configuration
    Config,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .without_time()
        .init();

    let start = std::env::current_dir()?;
    let workspace = Workspace::locate(cli.manifest.as_deref(), cli.root.as_deref(), &start)?;
    let config = Config::load(&workspace.root)?;

    match cli.command.unwrap_or(Commands::Build) {
        Commands::Build => {
            commands::cmd_build(&workspace, &config)?;
        }

        Commands::Show { what } => {
            let show_target = match what {
                ShowTarget::Tasks { json } => commands::show::ShowTarget::Tasks { json },
                ShowTarget::Config => commands::show::ShowTarget::Config,
            };
            commands::cmd_show(&workspace, show_target, &config)?;
        }

        Commands::Preflight { strict } => {
            commands::cmd_preflight(&workspace, &config, strict)?;
        }
    }

    Ok(())
}
