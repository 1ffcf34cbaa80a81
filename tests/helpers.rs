//! Shared test utilities for buildspec tests.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitStatus;

use buildspec::process::{Cmd, CommandResult};
use buildspec::runner::ToolRunner;
use buildspec::{Stage, ToolError};
use tempfile::TempDir;

/// Scratch orchestrator root, removed on drop.
pub struct TestEnv {
    /// Temporary directory (kept alive for lifetime of TestEnv)
    pub _temp_dir: TempDir,
    pub root: PathBuf,
}

impl TestEnv {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let root = temp_dir.path().to_path_buf();
        Self {
            _temp_dir: temp_dir,
            root,
        }
    }

    /// Write `build.spec.xml` into the root and return its path.
    pub fn write_manifest(&self, text: &str) -> PathBuf {
        let path = self.root.join(buildspec::manifest::MANIFEST_NAME);
        fs::write(&path, text).expect("Failed to write manifest");
        path
    }
}

/// One invocation seen by [`RecordingRunner`].
#[derive(Debug, Clone)]
pub struct Invocation {
    pub stage: Stage,
    pub cmd: Cmd,
}

/// Records every invocation instead of spawning processes.
///
/// Answers `tar tf` with `listing` and fails the first invocation of
/// `fail_at`, if set.
pub struct RecordingRunner {
    pub listing: String,
    pub fail_at: Option<Stage>,
    pub calls: Vec<Invocation>,
}

impl RecordingRunner {
    pub fn new(listing: &str) -> Self {
        Self {
            listing: listing.to_string(),
            fail_at: None,
            calls: Vec::new(),
        }
    }

    pub fn failing_at(listing: &str, stage: Stage) -> Self {
        Self {
            fail_at: Some(stage),
            ..Self::new(listing)
        }
    }

    pub fn stages(&self) -> Vec<Stage> {
        self.calls.iter().map(|c| c.stage).collect()
    }

    pub fn calls_for(&self, stage: Stage) -> Vec<&Cmd> {
        self.calls
            .iter()
            .filter(|c| c.stage == stage)
            .map(|c| &c.cmd)
            .collect()
    }

    /// Commands run for `stage`, as shell-style strings.
    pub fn lines_for(&self, stage: Stage) -> Vec<String> {
        self.calls_for(stage).iter().map(|c| c.display()).collect()
    }
}

impl ToolRunner for RecordingRunner {
    fn run(&mut self, stage: Stage, cmd: Cmd) -> Result<CommandResult, ToolError> {
        let program = cmd.program().to_string();
        self.calls.push(Invocation { stage, cmd });

        if self.fail_at == Some(stage) {
            self.fail_at = None;
            return Err(ToolError::Exit {
                program,
                code: 2,
                stderr: format!("simulated {} failure", stage),
            });
        }

        let stdout = if stage == Stage::List {
            self.listing.clone()
        } else {
            String::new()
        };
        Ok(CommandResult {
            status: success(),
            stdout,
            stderr: String::new(),
        })
    }
}

#[cfg(unix)]
fn success() -> ExitStatus {
    use std::os::unix::process::ExitStatusExt;
    ExitStatus::from_raw(0)
}

#[cfg(windows)]
fn success() -> ExitStatus {
    use std::os::windows::process::ExitStatusExt;
    ExitStatus::from_raw(0)
}

/// Listing for a well-formed archive rooted at `name`.
pub fn listing_for(name: &str) -> String {
    format!("{0}/\n{0}/configure\n{0}/Makefile.in\n{0}/src/main.c\n", name)
}

pub fn assert_dir_exists(path: &Path) {
    assert!(path.is_dir(), "Expected directory to exist: {}", path.display());
}
