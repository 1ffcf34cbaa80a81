//! Extraction root detection for source archives.

use std::collections::BTreeSet;
use std::path::Path;
use std::time::Duration;

use crate::error::{BuildError, Result, Stage};
use crate::process::Cmd;
use crate::runner::ToolRunner;

/// List `archive` with `tar tf` and return its single top-level directory.
pub fn top_level_dir(
    runner: &mut dyn ToolRunner,
    archive: &Path,
    timeout: Option<Duration>,
) -> Result<String> {
    let listing = runner
        .run(
            Stage::List,
            Cmd::new("tar").arg("tf").arg_path(archive).timeout(timeout),
        )
        .map_err(|source| BuildError::Tool {
            stage: Stage::List,
            source,
        })?;
    extraction_root(archive, &listing.stdout)
}

/// Find the single first path segment shared by every member of a listing.
///
/// Fails unless exactly one distinct segment is present.
pub fn extraction_root(archive: &Path, listing: &str) -> Result<String> {
    let roots: BTreeSet<&str> = listing
        .lines()
        .map(|line| line.trim_end_matches('\r'))
        .map(|line| line.strip_prefix("./").unwrap_or(line))
        .filter(|line| !line.is_empty() && *line != ".")
        .map(|line| line.split('/').next().unwrap_or(line))
        .collect();

    let mut iter = roots.iter();
    match (iter.next(), iter.next()) {
        (Some(root), None) => Ok(root.to_string()),
        _ => Err(BuildError::ArchiveStructure {
            archive: archive.to_path_buf(),
            roots: roots.iter().map(|r| r.to_string()).collect(),
        }),
    }
}
