//! Show command - displays information.

use anyhow::Result;

use buildspec::config::Config;
use buildspec::orchestrator::{self, Workspace};

/// Show target for the show command.
pub enum ShowTarget {
    /// Show parsed tasks and the commands they would run
    Tasks { json: bool },
    /// Show configuration
    Config,
}

/// Execute the show command.
pub fn cmd_show(workspace: &Workspace, target: ShowTarget, config: &Config) -> Result<()> {
    match target {
        ShowTarget::Tasks { json } => {
            let plans = orchestrator::plan_manifest(workspace)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&plans)?);
                return Ok(());
            }

            println!("{} task(s) from {}\n", plans.len(), workspace.manifest.display());
            for (index, plan) in plans.iter().enumerate() {
                println!("{}. {}", index + 1, plan.source);
                println!("   into:      {}", plan.dest_dir.display());
                for target in plan.patches.keys() {
                    println!("   patch:     {}", target);
                }
                for (key, value) in &plan.env {
                    println!("   env:       {}={}", key, value);
                }
                println!("   configure: {}", plan.configure.join(" "));
                println!(
                    "   build:     {} -j{} && {} install",
                    config.make, config.jobs, config.make
                );
            }
        }
        ShowTarget::Config => {
            config.print();
            println!();
            println!("Manifest: {}", workspace.manifest.display());
            println!("Root:     {}", workspace.root.display());
        }
    }
    Ok(())
}
