//! Binary discovery by walking the filesystem outward from a directory.

use std::ffi::OsStr;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

/// Error type for binary location.
#[derive(Debug)]
pub enum LocateError {
    /// No file with the requested name exists anywhere up to the filesystem
    /// root.
    NotFound { binary: String },
    /// The starting directory could not be resolved.
    Io(io::Error),
}

impl fmt::Display for LocateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LocateError::NotFound { binary } => {
                write!(f, "binary {binary} not found up to the filesystem root")
            }
            LocateError::Io(e) => write!(f, "failed to resolve search directory: {e}"),
        }
    }
}

impl std::error::Error for LocateError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LocateError::Io(e) => Some(e),
            LocateError::NotFound { .. } => None,
        }
    }
}

/// Find a binary by exact file name, searching the subtree below `start`
/// first and then retrying from each parent directory.
///
/// The returned path is relative to `start`, with parent hits prefixed by
/// `..`, so suites can locate build artifacts without hardcoding paths that
/// depend on the directory the run starts from. The first match in traversal
/// order wins. Unreadable directories are skipped.
pub fn find_binary_path(start: &Path, binary: &str) -> Result<PathBuf, LocateError> {
    let start = std::path::absolute(start).map_err(LocateError::Io)?;
    find_outward(&start, binary)
}

fn find_outward(dir: &Path, binary: &str) -> Result<PathBuf, LocateError> {
    if let Some(found) = walk_subtree(dir, dir, binary) {
        return Ok(found);
    }
    let parent = dir.parent().ok_or_else(|| LocateError::NotFound {
        binary: binary.to_string(),
    })?;
    let found = find_outward(parent, binary)?;
    Ok(PathBuf::from("..").join(found))
}

/// Depth-first walk returning the first non-directory entry named `binary`,
/// relative to `root`. Symlinks are never followed, so a link cycle inside
/// the tree cannot make the walk recurse forever.
fn walk_subtree(root: &Path, dir: &Path, binary: &str) -> Option<PathBuf> {
    let entries = std::fs::read_dir(dir).ok()?;
    for entry in entries.flatten() {
        let Ok(file_type) = entry.file_type() else {
            continue;
        };
        if file_type.is_dir() {
            if let Some(found) = walk_subtree(root, &entry.path(), binary) {
                return Some(found);
            }
        } else if entry.file_name().as_os_str() == OsStr::new(binary) {
            let path = entry.path();
            return Some(path.strip_prefix(root).unwrap_or(&path).to_path_buf());
        }
    }
    None
}
