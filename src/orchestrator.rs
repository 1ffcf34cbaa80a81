//! Entry point logic: locate the manifest, parse it, run every task.

use std::path::{Path, PathBuf};
use std::time::Instant;

use tracing::info;

use crate::config::Config;
use crate::error::Result;
use crate::executor::{Executor, TaskPlan};
use crate::manifest;
use crate::runner::ToolRunner;
use crate::spec::InstallTask;
use crate::timing::format_duration;

/// Where the manifest lives and which directory tasks resolve against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workspace {
    pub manifest: PathBuf,
    pub root: PathBuf,
}

impl Workspace {
    /// Use `manifest` if given, otherwise search upward from `start`.
    ///
    /// The root defaults to the manifest's directory. Relative paths are
    /// resolved against `start`, so `start` should be absolute.
    pub fn locate(manifest: Option<&Path>, root: Option<&Path>, start: &Path) -> Result<Self> {
        let manifest = match manifest {
            Some(path) => start.join(path),
            None => manifest::find_manifest(start)?,
        };
        let root = match root {
            Some(root) => start.join(root),
            None => manifest
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| start.to_path_buf()),
        };
        Ok(Self { manifest, root })
    }

    pub fn load_tasks(&self) -> Result<Vec<InstallTask>> {
        manifest::load(&self.manifest)
    }
}

/// Run `tasks` one after another. The first failure stops the run.
pub fn run_tasks(
    tasks: &[InstallTask],
    root: &Path,
    config: &Config,
    runner: &mut dyn ToolRunner,
) -> Result<()> {
    let mut executor = Executor::new(runner, config, root);
    let total = tasks.len();

    for (index, task) in tasks.iter().enumerate() {
        println!("\n=== Task {}/{}: {} ===", index + 1, total, task.source);
        let start = Instant::now();
        executor.run(task)?;
        info!(source = %task.source, "task complete");
        println!("  Done in {}", format_duration(start.elapsed()));
    }
    Ok(())
}

/// Parse and execute the workspace manifest. Returns the manifest path used.
pub fn run_manifest(
    workspace: &Workspace,
    config: &Config,
    runner: &mut dyn ToolRunner,
) -> Result<PathBuf> {
    info!(manifest = %workspace.manifest.display(), root = %workspace.root.display(), "loading manifest");
    let tasks = workspace.load_tasks()?;
    println!(
        "Loaded {} task(s) from {}",
        tasks.len(),
        workspace.manifest.display()
    );

    run_tasks(&tasks, &workspace.root, config, runner)?;
    Ok(workspace.manifest.clone())
}

/// Derive every task's plan without running anything.
pub fn plan_manifest(workspace: &Workspace) -> Result<Vec<TaskPlan>> {
    workspace
        .load_tasks()?
        .iter()
        .map(|task| TaskPlan::new(task, &workspace.root))
        .collect()
}
