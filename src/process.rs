//! Centralized external command execution.
//!
//! Every tool the pipeline drives (downloader, archiver, patcher, configure,
//! make) goes through [`Cmd`]. Environment overrides and stdin are attached to
//! the single child process; the parent environment is never modified.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

use crate::error::ToolError;

/// Result of a command execution.
#[derive(Debug, Clone)]
pub struct CommandResult {
    /// Exit status of the command.
    pub status: ExitStatus,
    /// Captured stdout (empty when output was inherited).
    pub stdout: String,
    /// Captured stderr (empty when output was inherited).
    pub stderr: String,
}

impl CommandResult {
    /// Returns true if the command exited successfully.
    pub fn success(&self) -> bool {
        self.status.success()
    }

    /// Get the exit code, or -1 if terminated by signal.
    pub fn code(&self) -> i32 {
        self.status.code().unwrap_or(-1)
    }

    /// Get stdout, trimmed of whitespace.
    pub fn stdout_trimmed(&self) -> &str {
        self.stdout.trim()
    }
}

/// Builder for configuring command execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cmd {
    program: String,
    args: Vec<String>,
    current_dir: Option<PathBuf>,
    env: BTreeMap<String, String>,
    stdin: Option<String>,
    timeout: Option<Duration>,
}

impl Cmd {
    /// Create a new command builder.
    pub fn new(program: impl AsRef<str>) -> Self {
        Self {
            program: program.as_ref().to_string(),
            args: Vec::new(),
            current_dir: None,
            env: BTreeMap::new(),
            stdin: None,
            timeout: None,
        }
    }

    /// Add a single argument.
    pub fn arg(mut self, arg: impl AsRef<str>) -> Self {
        self.args.push(arg.as_ref().to_string());
        self
    }

    /// Add multiple arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for arg in args {
            self.args.push(arg.as_ref().to_string());
        }
        self
    }

    /// Add a path as an argument.
    pub fn arg_path(mut self, path: &Path) -> Self {
        self.args.push(path.to_string_lossy().into_owned());
        self
    }

    /// Set the working directory.
    pub fn dir(mut self, dir: &Path) -> Self {
        self.current_dir = Some(dir.to_path_buf());
        self
    }

    /// Set an environment variable for this invocation only.
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    /// Set several environment variables for this invocation only.
    pub fn envs<I, K, V>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (key, value) in vars {
            self.env.insert(key.into(), value.into());
        }
        self
    }

    /// Feed `input` to the child's stdin.
    pub fn stdin(mut self, input: impl Into<String>) -> Self {
        self.stdin = Some(input.into());
        self
    }

    /// Kill the child if it has not exited after `limit`.
    pub fn timeout(mut self, limit: Option<Duration>) -> Self {
        self.timeout = limit;
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn get_args(&self) -> &[String] {
        &self.args
    }

    pub fn get_dir(&self) -> Option<&Path> {
        self.current_dir.as_deref()
    }

    pub fn get_env(&self) -> &BTreeMap<String, String> {
        &self.env
    }

    pub fn get_stdin(&self) -> Option<&str> {
        self.stdin.as_deref()
    }

    pub fn get_timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Command line as it would be typed in a shell (for logs).
    pub fn display(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Run the command and capture output. Fails on non-zero exit.
    pub fn run(self) -> Result<CommandResult, ToolError> {
        self.execute(true)
    }

    /// Run the command with inherited stdout/stderr.
    ///
    /// Output goes directly to the terminal. Use for long-running commands
    /// where the user should see progress (downloads, compiles).
    pub fn run_interactive(self) -> Result<CommandResult, ToolError> {
        self.execute(false)
    }

    fn execute(self, capture: bool) -> Result<CommandResult, ToolError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|source| self.spawn_error(source))?;
        runtime.block_on(self.execute_async(capture))
    }

    async fn execute_async(self, capture: bool) -> Result<CommandResult, ToolError> {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args).envs(&self.env).kill_on_drop(true);
        if let Some(ref dir) = self.current_dir {
            cmd.current_dir(dir);
        }
        cmd.stdin(if self.stdin.is_some() {
            Stdio::piped()
        } else {
            Stdio::inherit()
        });
        if capture {
            cmd.stdout(Stdio::piped()).stderr(Stdio::piped());
        } else {
            cmd.stdout(Stdio::inherit()).stderr(Stdio::inherit());
        }

        debug!(command = %self.display(), env = ?self.env, dir = ?self.current_dir, "spawning process");

        let mut child = cmd.spawn().map_err(|source| self.spawn_error(source))?;

        let pipe = child.stdin.take();
        let input = self.stdin.clone();
        let feed = async move {
            if let (Some(mut pipe), Some(input)) = (pipe, input) {
                // Dropping the pipe afterwards closes it so the child sees EOF.
                pipe.write_all(input.as_bytes()).await?;
            }
            Ok::<(), std::io::Error>(())
        };
        let finished = async {
            let (fed, output) = tokio::join!(feed, child.wait_with_output());
            if let Err(e) = fed {
                debug!(program = %self.program, error = %e, "child stopped reading stdin");
            }
            output
        };

        // On timeout the child is dropped, and kill_on_drop kills it.
        let output = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, finished).await.map_err(|_| {
                debug!(program = %self.program, "timeout elapsed, killing child");
                ToolError::TimedOut {
                    program: self.program.clone(),
                    after: limit,
                }
            })?,
            None => finished.await,
        }
        .map_err(|source| self.spawn_error(source))?;

        let result = CommandResult {
            status: output.status,
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };

        if !result.success() {
            return Err(ToolError::Exit {
                program: self.program,
                code: result.code(),
                stderr: result.stderr,
            });
        }
        Ok(result)
    }

    fn spawn_error(&self, source: std::io::Error) -> ToolError {
        ToolError::Spawn {
            program: self.program.clone(),
            source,
        }
    }
}
