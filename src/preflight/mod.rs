//! Preflight checks.
//!
//! Validates host tools and the manifest before any task runs.
//! Run with `buildspec preflight` to check everything is ready.

mod host_tools;
mod types;

use std::fs;

use crate::config::Config;
use crate::error::{BuildError, Result};
use crate::orchestrator::{plan_manifest, Workspace};

pub use types::{CheckResult, CheckStatus, PreflightReport};

/// Run all preflight checks.
pub fn run_preflight(workspace: &Workspace, config: &Config) -> PreflightReport {
    let mut checks = Vec::new();

    println!("Running preflight checks...\n");

    println!("Checking host tools...");
    checks.extend(host_tools::check_host_tools(config));

    println!("Checking manifest...");
    checks.extend(check_workspace(workspace));

    println!();

    PreflightReport { checks }
}

/// Run preflight and fail if any check fails.
pub fn run_preflight_or_fail(workspace: &Workspace, config: &Config) -> Result<()> {
    let report = run_preflight(workspace, config);
    report.print();

    if !report.all_passed() {
        return Err(BuildError::Preflight {
            failed: report.fail_count(),
        });
    }

    println!("All preflight checks passed!\n");
    Ok(())
}

/// The manifest must parse, every task must plan, and the root must exist.
fn check_workspace(workspace: &Workspace) -> Vec<CheckResult> {
    let mut results = Vec::new();

    match plan_manifest(workspace) {
        Ok(plans) => results.push(CheckResult::pass_with(
            "manifest",
            &format!("{} ({} task(s))", workspace.manifest.display(), plans.len()),
        )),
        Err(e) => results.push(CheckResult::fail("manifest", &e.to_string())),
    }

    match fs::metadata(&workspace.root) {
        Ok(meta) if meta.is_dir() => results.push(CheckResult::pass("root directory")),
        Ok(_) => results.push(CheckResult::fail(
            "root directory",
            &format!("{} is not a directory", workspace.root.display()),
        )),
        Err(e) => results.push(CheckResult::fail(
            "root directory",
            &format!("{}: {}", workspace.root.display(), e),
        )),
    }

    results
}
