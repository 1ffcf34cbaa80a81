//! Configuration management for buildspec.
//!
//! Reads configuration from a `.env` file next to the manifest and from
//! environment variables. Environment variables take precedence over `.env`.

use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use crate::error::{BuildError, Result};

/// Parallel jobs passed to the build tool.
pub const DEFAULT_JOBS: usize = 4;
pub const DEFAULT_DOWNLOADER: &str = "wget";
pub const DEFAULT_MAKE: &str = "make";

/// Buildspec configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Build parallelism (`make -j<jobs>`)
    pub jobs: usize,
    /// Per-invocation limit for external tools; `None` waits forever
    pub stage_timeout: Option<Duration>,
    /// Downloader program, invoked as `<downloader> -O <dest> <url>`
    pub downloader: String,
    /// Build tool program
    pub make: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            jobs: DEFAULT_JOBS,
            stage_timeout: None,
            downloader: DEFAULT_DOWNLOADER.to_string(),
            make: DEFAULT_MAKE.to_string(),
        }
    }
}

impl Config {
    /// Load configuration from `<base_dir>/.env` and the environment.
    pub fn load(base_dir: &Path) -> Result<Self> {
        let mut vars = HashMap::new();

        let env_path = base_dir.join(".env");
        if env_path.is_file() {
            let iter = dotenvy::from_path_iter(&env_path)
                .map_err(|e| BuildError::Config(format!("{}: {}", env_path.display(), e)))?;
            for item in iter {
                let (key, value) = item
                    .map_err(|e| BuildError::Config(format!("{}: {}", env_path.display(), e)))?;
                vars.insert(key, value);
            }
        }

        // Environment variables override .env file
        vars.extend(std::env::vars());

        Self::from_vars(&vars)
    }

    /// Build configuration from an already-merged variable map.
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self> {
        let mut config = Config::default();

        if let Some(jobs) = vars.get("BUILDSPEC_JOBS") {
            config.jobs = match jobs.trim().parse::<usize>() {
                Ok(n) if n > 0 => n,
                _ => {
                    return Err(BuildError::Config(format!(
                        "BUILDSPEC_JOBS must be a positive integer, got '{}'",
                        jobs
                    )))
                }
            };
        }

        if let Some(secs) = vars.get("BUILDSPEC_STAGE_TIMEOUT") {
            let secs = secs.trim();
            if !secs.is_empty() {
                let secs = secs.parse::<u64>().map_err(|_| {
                    BuildError::Config(format!(
                        "BUILDSPEC_STAGE_TIMEOUT must be a number of seconds, got '{}'",
                        secs
                    ))
                })?;
                config.stage_timeout = Some(Duration::from_secs(secs));
            }
        }

        if let Some(downloader) = vars.get("BUILDSPEC_DOWNLOADER").filter(|s| !s.is_empty()) {
            config.downloader = downloader.clone();
        }
        if let Some(make) = vars.get("BUILDSPEC_MAKE").filter(|s| !s.is_empty()) {
            config.make = make.clone();
        }

        Ok(config)
    }

    /// Print configuration for debugging.
    pub fn print(&self) {
        println!("Configuration:");
        println!("  BUILDSPEC_JOBS: {}", self.jobs);
        match self.stage_timeout {
            Some(t) => println!("  BUILDSPEC_STAGE_TIMEOUT: {}s", t.as_secs()),
            None => println!("  BUILDSPEC_STAGE_TIMEOUT: (none)"),
        }
        println!("  BUILDSPEC_DOWNLOADER: {}", self.downloader);
        println!("  BUILDSPEC_MAKE: {}", self.make);
    }
}
