//! Canonical skill storage.
//!
//! Each scope root keeps one authoritative copy of every installed skill
//! under `.agents/skills/<name>/`. Consumer directories only ever see links
//! to (or copies of) these entries.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::InstallError;
use crate::paths::is_safe;
use crate::sanitize::sanitize;

/// The canonical store root for a scope.
pub fn skills_root(scope_root: &Path) -> PathBuf {
    scope_root.join(".agents").join("skills")
}

/// Compute the canonical directory for a skill, guarding against the
/// sanitized name escaping the store root.
pub fn canonical_dir(scope_root: &Path, install_name: &str) -> Result<PathBuf, InstallError> {
    let root = skills_root(scope_root);
    let dir = root.join(sanitize(install_name));
    if !is_safe(&root, &dir) {
        return Err(InstallError::UnsafePath {
            base: root,
            path: dir,
        });
    }
    Ok(dir)
}

/// Create `path` as a real directory, tolerating a stale symlink in the way.
///
/// A previous self-referential install can leave a link (possibly broken or
/// circular) where the canonical directory should be; such an entry is
/// removed before the directory is created.
pub fn ensure_dir(path: &Path) -> Result<(), InstallError> {
    remove_if_stale_link(path);
    fs::create_dir_all(path).map_err(|e| InstallError::write(path, e))
}

/// If `path` is a symlink (valid, broken, or circular), remove it.
/// Real files and directories are left alone.
pub fn remove_if_stale_link(path: &Path) {
    // symlink_metadata does not follow the link, so broken and circular
    // links still report as symlinks here instead of erroring with ELOOP.
    let Ok(meta) = fs::symlink_metadata(path) else {
        return;
    };
    if !meta.file_type().is_symlink() {
        return;
    }
    tracing::debug!(path = %path.display(), "removing stale symlink");
    if fs::remove_file(path).is_err() {
        // Directory-style links on some platforms need the dir removal call.
        let _ = fs::remove_dir_all(path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn canonical_dir_layout() {
        let dir = canonical_dir(Path::new("/proj"), "My Skill").expect("canonical dir");
        assert_eq!(dir, PathBuf::from("/proj/.agents/skills/my-skill"));
    }

    #[test]
    fn canonical_dir_sanitizes_hostile_names() {
        let dir = canonical_dir(Path::new("/proj"), "../../etc/passwd").expect("canonical dir");
        assert_eq!(dir, PathBuf::from("/proj/.agents/skills/etc-passwd"));
    }

    #[test]
    fn ensure_dir_creates_nested() {
        let tmp = TempDir::new().expect("temp dir");
        let target = skills_root(tmp.path()).join("demo");
        ensure_dir(&target).expect("ensure dir");
        assert!(target.is_dir());
    }

    #[cfg(unix)]
    #[test]
    fn ensure_dir_replaces_broken_link() {
        let tmp = TempDir::new().expect("temp dir");
        let target = tmp.path().join("entry");
        std::os::unix::fs::symlink(tmp.path().join("nowhere"), &target).expect("symlink");
        assert!(fs::symlink_metadata(&target).is_ok());

        ensure_dir(&target).expect("ensure dir");
        assert!(target.is_dir());
        assert!(!fs::symlink_metadata(&target)
            .expect("metadata")
            .file_type()
            .is_symlink());
    }

    #[cfg(unix)]
    #[test]
    fn ensure_dir_replaces_circular_link() {
        let tmp = TempDir::new().expect("temp dir");
        let target = tmp.path().join("loop");
        std::os::unix::fs::symlink(&target, &target).expect("symlink");

        ensure_dir(&target).expect("ensure dir");
        assert!(target.is_dir());
    }

    #[test]
    fn remove_if_stale_link_leaves_real_dirs() {
        let tmp = TempDir::new().expect("temp dir");
        let dir = tmp.path().join("real");
        fs::create_dir(&dir).expect("mkdir");
        remove_if_stale_link(&dir);
        assert!(dir.is_dir());
    }
}
