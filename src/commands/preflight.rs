//! Preflight command - runs preflight checks.

use anyhow::Result;

use buildspec::config::Config;
use buildspec::orchestrator::Workspace;
use buildspec::preflight;

/// Execute the preflight command.
pub fn cmd_preflight(workspace: &Workspace, config: &Config, strict: bool) -> Result<()> {
    if strict {
        preflight::run_preflight_or_fail(workspace, config)?;
    } else {
        let report = preflight::run_preflight(workspace, config);
        report.print();
        if !report.all_passed() {
            println!("Some checks failed. Use --strict to fail the run.");
        }
    }
    Ok(())
}
