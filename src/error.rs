//! Error types for buildspec.
//!
//! Nothing here is recovered locally: any error aborts the current task and
//! the rest of the run.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Pipeline stage that invoked an external tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Fetch,
    List,
    Extract,
    Patch,
    Configure,
    Build,
    Install,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Fetch => "fetch",
            Stage::List => "list",
            Stage::Extract => "extract",
            Stage::Patch => "patch",
            Stage::Configure => "configure",
            Stage::Build => "build",
            Stage::Install => "install",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure of a single external process.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("failed to execute '{program}'. Is it installed?")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("'{program}' failed (exit code {code}){}", stderr_suffix(.stderr))]
    Exit {
        program: String,
        code: i32,
        stderr: String,
    },

    #[error("'{program}' timed out after {}s", .after.as_secs())]
    TimedOut { program: String, after: Duration },
}

fn stderr_suffix(stderr: &str) -> String {
    let stderr = stderr.trim();
    if stderr.is_empty() {
        String::new()
    } else {
        format!(":\n{}", stderr)
    }
}

/// Errors produced while discovering, parsing or executing a manifest.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("no build.spec.xml found in {} or any parent directory", .start.display())]
    ManifestNotFound { start: PathBuf },

    #[error("invalid manifest: {0}")]
    Parse(String),

    #[error(
        "archive {} must contain exactly one top-level directory, found {}: [{}]",
        .archive.display(),
        .roots.len(),
        .roots.join(", ")
    )]
    ArchiveStructure { archive: PathBuf, roots: Vec<String> },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("preflight failed: {failed} check(s) failed")]
    Preflight { failed: usize },

    #[error("option '{key}' {reason}")]
    InvalidOption { key: String, reason: String },

    #[error("{stage} stage failed: {source}")]
    Tool {
        stage: Stage,
        #[source]
        source: ToolError,
    },

    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl BuildError {
    /// Stage tag for external tool failures.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            BuildError::Tool { stage, .. } => Some(*stage),
            _ => None,
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        BuildError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T, E = BuildError> = std::result::Result<T, E>;
