//! Destination path resolution.
//!
//! Windows build hosts run the toolchain under an MSYS-style shell, where an
//! absolute path like `/c/src/vendor` names drive `C:`. [`native_path`] is the
//! only place that knows about this.

use std::path::{Path, PathBuf};

/// Drive used for rooted paths that carry no drive segment.
const DEFAULT_DRIVE: char = 'c';

/// Directory a task downloads and extracts into: `cd` joined to the root.
pub fn dest_dir(root: &Path, cd: Option<&str>) -> PathBuf {
    let joined = match cd {
        Some(cd) => root.join(cd),
        None => root.to_path_buf(),
    };
    native_path(&joined)
}

/// Rewrite `path` into the form the host filesystem expects.
pub fn native_path(path: &Path) -> PathBuf {
    if cfg!(windows) {
        PathBuf::from(to_drive_path(&path.to_string_lossy(), DEFAULT_DRIVE))
    } else {
        path.to_path_buf()
    }
}

/// Convert a rooted path to a drive-letter path.
///
/// `/d/work` becomes `d:/work`; any other rooted path is placed on `drive`.
/// Paths that are relative or already carry a drive are returned unchanged.
pub fn to_drive_path(path: &str, drive: char) -> String {
    let Some(rest) = path.strip_prefix(['/', '\\']) else {
        return path.to_string();
    };
    if rest.starts_with(['/', '\\']) {
        // UNC path
        return path.to_string();
    }

    let mut chars = rest.chars();
    if let (Some(letter), next) = (chars.next(), chars.next()) {
        if letter.is_ascii_alphabetic() && matches!(next, None | Some('/') | Some('\\')) {
            let tail = &rest[1..];
            return if tail.is_empty() {
                format!("{}:/", letter)
            } else {
                format!("{}:{}", letter, tail)
            };
        }
    }

    format!("{}:{}", drive, path)
}
