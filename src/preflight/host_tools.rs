//! Host tool availability checks.

use crate::config::Config;

use super::types::CheckResult;

/// Check the external tools every task invokes.
pub fn check_host_tools(config: &Config) -> Vec<CheckResult> {
    let mut required = vec![
        (config.downloader.as_str(), "Downloads source archives (fetch stage)"),
        ("tar", "Lists and unpacks source archives (extract stage)"),
        ("patch", "Applies manifest patches (patch stage)"),
        (config.make.as_str(), "Builds and installs packages (build/install stages)"),
    ];
    if cfg!(windows) {
        required.push(("bash", "Runs ./configure scripts (configure stage)"));
    }

    let mut results: Vec<CheckResult> = required
        .into_iter()
        .map(|(tool, purpose)| check_tool_exists(tool, purpose, true))
        .collect();

    // configure scripts look for a compiler themselves, with their own errors
    results.push(check_tool_exists(
        "cc",
        "Most configure scripts need a C compiler",
        false,
    ));

    results
}

/// Check if a tool exists in PATH.
fn check_tool_exists(tool: &str, purpose: &str, required: bool) -> CheckResult {
    match which::which(tool) {
        Ok(path) => CheckResult::pass_with(tool, &path.display().to_string()),
        Err(_) => {
            let msg = format!("Not found in PATH. {}", purpose);
            if required {
                CheckResult::fail(tool, &msg)
            } else {
                CheckResult::warn(tool, &msg)
            }
        }
    }
}
