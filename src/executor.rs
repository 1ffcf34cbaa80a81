//! Task execution: fetch, extract, patch, configure, build, install.
//!
//! Option translation happens up front in [`TaskPlan::new`], on a private
//! copy of the task's options. The recognized keys are consumed:
//!
//! | key        | effect                                             |
//! |------------|----------------------------------------------------|
//! | `cd`       | download/extract directory, relative to the root   |
//! | `prefix`   | `--prefix=<root>/<value>` configure argument       |
//! | `cppflags` | `CPPFLAGS=-I<value>` for configure/build/install   |
//! | `rpath`    | `LDFLAGS=-L<value> -Wl,-rpath,<value>` likewise    |
//!
//! Every remaining bare flag becomes `--<key>`. Remaining keys with values are
//! not passed to configure.
//!
//! Stages run strictly in order. The first failure aborts the task and leaves
//! whatever earlier stages produced on disk.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info, info_span};

use crate::archive;
use crate::config::Config;
use crate::error::{BuildError, Result, Stage};
use crate::paths;
use crate::process::{Cmd, CommandResult};
use crate::runner::ToolRunner;
use crate::spec::{InstallTask, OptionMap, OptionValue};
use crate::timing::Timer;

/// Everything a task will do, derived before any side effect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskPlan {
    pub source: String,
    /// Directory the archive is downloaded to and extracted in.
    pub dest_dir: PathBuf,
    /// Downloaded archive path.
    pub archive: PathBuf,
    /// Configure command line, program first.
    pub configure: Vec<String>,
    /// Environment overrides for configure, build and install.
    pub env: BTreeMap<String, String>,
    pub patches: BTreeMap<String, String>,
}

impl TaskPlan {
    /// Translate a task's options against the orchestrator root.
    pub fn new(task: &InstallTask, root: &Path) -> Result<Self> {
        let mut options = task.options.clone();

        let cd = take_value(&mut options, "cd")?;
        let dest_dir = paths::dest_dir(root, cd.as_deref());
        let archive = dest_dir.join(task.archive_name());

        let mut env = BTreeMap::new();
        if let Some(include) = take_value(&mut options, "cppflags")? {
            env.insert("CPPFLAGS".to_string(), format!("-I{}", include));
        }
        if let Some(rpath) = take_value(&mut options, "rpath")? {
            env.insert(
                "LDFLAGS".to_string(),
                format!("-L{0} -Wl,-rpath,{0}", rpath),
            );
        }

        let mut configure = Vec::new();
        if cfg!(windows) {
            configure.push("bash".to_string());
        }
        configure.push("./configure".to_string());
        if let Some(prefix) = take_value(&mut options, "prefix")? {
            configure.push(format!("--prefix={}", root.join(prefix).display()));
        }
        configure.extend(options.flags().map(|flag| format!("--{}", flag)));

        Ok(Self {
            source: task.source.clone(),
            dest_dir,
            archive,
            configure,
            env,
            patches: task.patches.clone(),
        })
    }
}

/// Remove a value-carrying option. A bare flag under this key is an error.
fn take_value(options: &mut OptionMap, key: &str) -> Result<Option<String>> {
    match options.remove(key) {
        None => Ok(None),
        Some(OptionValue::Value(value)) => Ok(Some(value)),
        Some(OptionValue::Flag) => Err(BuildError::InvalidOption {
            key: key.to_string(),
            reason: "requires a value but was given as a bare flag".to_string(),
        }),
    }
}

/// Runs install tasks through the stage pipeline.
pub struct Executor<'a> {
    runner: &'a mut dyn ToolRunner,
    config: &'a Config,
    root: PathBuf,
}

impl<'a> Executor<'a> {
    pub fn new(runner: &'a mut dyn ToolRunner, config: &'a Config, root: &Path) -> Self {
        Self {
            runner,
            config,
            root: root.to_path_buf(),
        }
    }

    /// Execute one task's full pipeline.
    pub fn run(&mut self, task: &InstallTask) -> Result<()> {
        let span = info_span!("task", source = %task.source);
        let _enter = span.enter();

        let plan = TaskPlan::new(task, &self.root)?;
        debug!(?plan, "task plan");

        fs::create_dir_all(&plan.dest_dir).map_err(|e| BuildError::io(&plan.dest_dir, e))?;

        self.stage(
            Stage::Fetch,
            Cmd::new(&self.config.downloader)
                .arg("-O")
                .arg_path(&plan.archive)
                .arg(&plan.source),
        )?;

        self.stage(
            Stage::Extract,
            Cmd::new("tar")
                .arg("xf")
                .arg_path(&plan.archive)
                .arg("-C")
                .arg_path(&plan.dest_dir),
        )?;

        let root_name =
            archive::top_level_dir(&mut *self.runner, &plan.archive, self.config.stage_timeout)?;
        let src_dir = plan.dest_dir.join(&root_name);
        info!(dir = %src_dir.display(), "extraction root");

        for (target, body) in &plan.patches {
            self.stage(
                Stage::Patch,
                Cmd::new("patch").arg(target).stdin(body.as_str()).dir(&src_dir),
            )?;
        }

        self.stage(
            Stage::Configure,
            Cmd::new(&plan.configure[0])
                .args(&plan.configure[1..])
                .dir(&src_dir)
                .envs(plan.env.clone()),
        )?;

        self.stage(
            Stage::Build,
            Cmd::new(&self.config.make)
                .arg(format!("-j{}", self.config.jobs))
                .dir(&src_dir)
                .envs(plan.env.clone()),
        )?;

        self.stage(
            Stage::Install,
            Cmd::new(&self.config.make)
                .arg("install")
                .dir(&src_dir)
                .envs(plan.env.clone()),
        )?;

        Ok(())
    }

    fn stage(&mut self, stage: Stage, cmd: Cmd) -> Result<CommandResult> {
        info!(stage = %stage, command = %cmd.display(), "running stage");
        println!("  [{}] {}", stage, cmd.display());

        let timer = Timer::start(stage.as_str());
        let result = self
            .runner
            .run(stage, cmd.timeout(self.config.stage_timeout))
            .map_err(|source| BuildError::Tool { stage, source })?;
        timer.finish();
        Ok(result)
    }
}
