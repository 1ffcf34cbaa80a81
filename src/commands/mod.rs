//! CLI command handlers.
//!
//! Each submodule handles a specific CLI command:
//! - `build` - Fetch, patch, configure, build and install every task
//! - `show` - Display the task plan or configuration
//! - `preflight` - Run preflight checks

pub mod build;
mod preflight;
pub mod show;

pub use build::cmd_build;
pub use preflight::cmd_preflight;
pub use show::cmd_show;
