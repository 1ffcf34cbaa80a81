//! Build command - runs every task in the manifest.

use anyhow::Result;
use std::time::Instant;

use buildspec::config::Config;
use buildspec::orchestrator::{self, Workspace};
use buildspec::runner::SystemRunner;
use buildspec::timing::format_duration;

/// Execute the build command.
pub fn cmd_build(workspace: &Workspace, config: &Config) -> Result<()> {
    println!("=== buildspec ===");
    println!("Manifest: {}", workspace.manifest.display());
    println!("Root:     {}", workspace.root.display());

    let start = Instant::now();
    orchestrator::run_manifest(workspace, config, &mut SystemRunner)?;

    println!("\nAll tasks complete in {}", format_duration(start.elapsed()));
    Ok(())
}
