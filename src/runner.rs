//! Seam between the pipeline and the processes it spawns.

use crate::error::{Stage, ToolError};
use crate::process::{Cmd, CommandResult};

/// Runs the external tool invocations a task needs.
///
/// The executor only ever talks to this trait, so tests can record
/// invocations and inject failures without a network or a compiler.
pub trait ToolRunner {
    /// Run `cmd` on behalf of `stage`, failing on a non-zero exit.
    fn run(&mut self, stage: Stage, cmd: Cmd) -> Result<CommandResult, ToolError>;
}

/// Spawns real processes.
///
/// Captures output for the archive listing (it must be parsed) and streams
/// everything else to the terminal.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl ToolRunner for SystemRunner {
    fn run(&mut self, stage: Stage, cmd: Cmd) -> Result<CommandResult, ToolError> {
        match stage {
            Stage::List => cmd.run(),
            _ => cmd.run_interactive(),
        }
    }
}
