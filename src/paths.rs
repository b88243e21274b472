//! Path containment checks.
//!
//! Sanitization already neutralizes traversal sequences, but every join that
//! incorporates an externally influenced name is re-checked here before any
//! filesystem mutation. Defense in depth: a name that sanitizes oddly on a
//! filesystem with different normalization rules still cannot escape its
//! base directory.

use std::path::{Component, Path, PathBuf};

/// Lexically normalize a path: fold `.` and `..` components without touching
/// the filesystem, so paths that do not exist yet can still be checked.
pub fn normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Prefix(prefix) => normalized.push(prefix.as_os_str()),
            Component::RootDir => normalized.push(Component::RootDir.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => {
                // Only a normal component can be cancelled: at the root `..`
                // is a no-op, and a kept leading `..` must not swallow the
                // next one.
                let popped = matches!(
                    normalized.components().next_back(),
                    Some(Component::Normal(_))
                ) && normalized.pop();
                if !popped && !normalized.has_root() {
                    normalized.push(Component::ParentDir.as_os_str());
                }
            }
            Component::Normal(part) => normalized.push(part),
        }
    }
    normalized
}

/// Returns true iff `candidate` is `base` itself or a descendant of `base`.
///
/// Both paths are absolutized and lexically normalized first. Relative inputs
/// are resolved against the current working directory; if that fails the
/// check conservatively returns false.
pub fn is_safe(base: &Path, candidate: &Path) -> bool {
    let (Ok(base), Ok(candidate)) = (std::path::absolute(base), std::path::absolute(candidate))
    else {
        return false;
    };
    let base = normalize(&base);
    let candidate = normalize(&candidate);
    // starts_with compares whole components, so "/a/bc" does not pass for
    // base "/a/b".
    candidate == base || candidate.starts_with(&base)
}
