//! Buildspec library.
//!
//! Turns a `build.spec.xml` manifest into an ordered list of install tasks and
//! drives each one through fetch → extract → patch → configure → build →
//! install, one task at a time.
//!
//! ```rust,ignore
//! use buildspec::{config::Config, orchestrator, runner::SystemRunner};
//!
//! let workspace = orchestrator::Workspace::locate(None, None, &std::env::current_dir()?)?;
//! let config = Config::load(&workspace.root)?;
//! orchestrator::run_manifest(&workspace, &config, &mut SystemRunner)?;
//! ```

pub mod archive;
pub mod config;
pub mod error;
pub mod executor;
pub mod manifest;
pub mod orchestrator;
pub mod paths;
pub mod preflight;
pub mod process;
pub mod runner;
pub mod spec;
pub mod timing;

pub use error::{BuildError, Result, Stage, ToolError};
pub use spec::{InstallTask, OptionMap, OptionValue};
