//! Platform link abstraction.
//!
//! All symlink platform branching lives here so the rest of the engine stays
//! platform-agnostic. Link targets are written *relative* to the link's
//! parent: the projection stays valid if the whole tree is moved.

use std::io;
use std::path::{Path, PathBuf};

use crate::paths::normalize;

/// Create a directory link at `link` pointing at `target`.
///
/// The stored target is relative when a relative path can be computed.
/// On Windows `symlink_dir` requires developer mode or elevation; callers
/// treat any failure here as "linking unavailable" and fall back to a copy.
pub fn create_dir_link(target: &Path, link: &Path) -> io::Result<()> {
    let stored = link
        .parent()
        .and_then(|parent| pathdiff::diff_paths(target, parent))
        .unwrap_or_else(|| target.to_path_buf());

    #[cfg(unix)]
    {
        std::os::unix::fs::symlink(stored, link)
    }
    #[cfg(windows)]
    {
        std::os::windows::fs::symlink_dir(stored, link)
    }
    #[cfg(not(any(unix, windows)))]
    {
        let _ = stored;
        Err(io::Error::new(
            io::ErrorKind::Unsupported,
            "symlinks not supported on this platform",
        ))
    }
}

/// Read a link and resolve its target against the link's parent directory.
///
/// Returns `None` if `path` is not a symlink. The result is lexically
/// normalized but not required to exist.
pub fn resolve_link(path: &Path) -> Option<PathBuf> {
    let target = std::fs::read_link(path).ok()?;
    let resolved = if target.is_absolute() {
        target
    } else {
        path.parent()?.join(target)
    };
    Some(normalize(&resolved))
}
