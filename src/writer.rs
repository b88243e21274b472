//! Content materialization.
//!
//! Writes a skill's files at a target directory, either by mirroring a
//! source directory or by writing an in-memory file map delivered by a
//! remote adapter.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use rayon::prelude::*;

use crate::error::InstallError;
use crate::paths::is_safe;

/// Entries never copied into a skill installation: repository noise, not
/// skill content.
const EXCLUDED_ENTRIES: [&str; 2] = ["README.md", "metadata.json"];

const VCS_DIRS: [&str; 3] = [".git", ".svn", ".hg"];

fn is_excluded(name: &str) -> bool {
    name.starts_with('_')
        || VCS_DIRS.contains(&name)
        || EXCLUDED_ENTRIES
            .iter()
            .any(|excluded| name.eq_ignore_ascii_case(excluded))
}

/// Recursively mirror `src` into `dest`, excluding noise entries.
///
/// Symlinks in the source are dereferenced: a skill that is itself a
/// checkout may contain links that would not resolve once relocated, so the
/// target content is copied instead of the link. Immediate children are
/// copied in parallel; a failing child does not stop its siblings, and the
/// first failure is reported once all siblings have been attempted.
pub fn copy_dir(src: &Path, dest: &Path) -> Result<(), InstallError> {
    fs::create_dir_all(dest).map_err(|e| InstallError::write(dest, e))?;

    let entries: Vec<_> = fs::read_dir(src)
        .map_err(|e| InstallError::read(src, e))?
        .filter_map(Result::ok)
        .filter(|entry| !is_excluded(&entry.file_name().to_string_lossy()))
        .collect();

    let results: Vec<Result<(), InstallError>> = entries
        .par_iter()
        .map(|entry| {
            let from = entry.path();
            let to = dest.join(entry.file_name());
            // fs::metadata follows symlinks, so a link to a directory
            // recurses and a link to a file copies its content.
            let meta = match fs::metadata(&from) {
                Ok(meta) => meta,
                Err(e) => {
                    // Broken source link: nothing to materialize.
                    tracing::debug!(path = %from.display(), error = %e, "skipping unreadable entry");
                    return Ok(());
                }
            };
            if meta.is_dir() {
                copy_dir(&from, &to)
            } else {
                fs::copy(&from, &to)
                    .map(|_| ())
                    .map_err(|e| InstallError::write(&to, e))
            }
        })
        .collect();

    results.into_iter().collect()
}

/// Write an in-memory file map into `dest`.
///
/// Each relative path is re-validated against `dest`; entries that would
/// escape are skipped with a warning rather than aborting the whole write,
/// so a mostly-good multi-file skill degrades gracefully.
pub fn write_file_map(files: &BTreeMap<String, Vec<u8>>, dest: &Path) -> Result<(), InstallError> {
    fs::create_dir_all(dest).map_err(|e| InstallError::write(dest, e))?;

    for (rel_path, content) in files {
        let target = dest.join(rel_path);
        if !is_safe(dest, &target) {
            tracing::warn!(
                entry = %rel_path,
                dest = %dest.display(),
                "skipping file-map entry that escapes the target directory"
            );
            continue;
        }
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(|e| InstallError::write(parent, e))?;
        }
        fs::write(&target, content).map_err(|e| InstallError::write(&target, e))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn write(path: &Path, content: &str) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("mkdir");
        }
        fs::write(path, content).expect("write");
    }

    #[test]
    fn copy_dir_mirrors_tree() {
        let tmp = TempDir::new().expect("temp dir");
        let src = tmp.path().join("src");
        write(&src.join("SKILL.md"), "---\nname: demo\n---\nBody\n");
        write(&src.join("reference/guide.md"), "guide");
        write(&src.join("scripts/run.sh"), "#!/bin/sh\n");

        let dest = tmp.path().join("dest");
        copy_dir(&src, &dest).expect("copy");

        assert!(dest.join("SKILL.md").is_file());
        assert_eq!(
            fs::read_to_string(dest.join("reference/guide.md")).unwrap(),
            "guide"
        );
        assert!(dest.join("scripts/run.sh").is_file());
    }

    #[test]
    fn copy_dir_excludes_noise() {
        let tmp = TempDir::new().expect("temp dir");
        let src = tmp.path().join("src");
        write(&src.join("SKILL.md"), "content");
        write(&src.join("README.md"), "readme");
        write(&src.join("readme.md"), "readme");
        write(&src.join("metadata.json"), "{}");
        write(&src.join("_private/notes.md"), "notes");
        write(&src.join(".git/HEAD"), "ref: refs/heads/main");

        let dest = tmp.path().join("dest");
        copy_dir(&src, &dest).expect("copy");

        assert!(dest.join("SKILL.md").is_file());
        assert!(!dest.join("README.md").exists());
        assert!(!dest.join("readme.md").exists());
        assert!(!dest.join("metadata.json").exists());
        assert!(!dest.join("_private").exists());
        assert!(!dest.join(".git").exists());
    }

    #[cfg(unix)]
    #[test]
    fn copy_dir_dereferences_symlinks() {
        let tmp = TempDir::new().expect("temp dir");
        let src = tmp.path().join("src");
        write(&src.join("real.md"), "real content");
        std::os::unix::fs::symlink(src.join("real.md"), src.join("alias.md")).expect("symlink");

        let dest = tmp.path().join("dest");
        copy_dir(&src, &dest).expect("copy");

        let alias = dest.join("alias.md");
        assert!(!fs::symlink_metadata(&alias)
            .expect("metadata")
            .file_type()
            .is_symlink());
        assert_eq!(fs::read_to_string(&alias).unwrap(), "real content");
    }

    #[cfg(unix)]
    #[test]
    fn copy_dir_skips_broken_symlinks() {
        let tmp = TempDir::new().expect("temp dir");
        let src = tmp.path().join("src");
        write(&src.join("keep.md"), "kept");
        std::os::unix::fs::symlink(src.join("missing"), src.join("dangling")).expect("symlink");

        let dest = tmp.path().join("dest");
        copy_dir(&src, &dest).expect("copy");
        assert!(dest.join("keep.md").is_file());
        assert!(!dest.join("dangling").exists());
    }

    #[test]
    fn write_file_map_creates_nested_entries() {
        let tmp = TempDir::new().expect("temp dir");
        let dest = tmp.path().join("dest");

        let mut files = BTreeMap::new();
        files.insert("SKILL.md".to_string(), b"skill body".to_vec());
        files.insert("sub/deep/file.txt".to_string(), b"deep".to_vec());
        write_file_map(&files, &dest).expect("write map");

        assert_eq!(fs::read(dest.join("SKILL.md")).unwrap(), b"skill body");
        assert_eq!(fs::read(dest.join("sub/deep/file.txt")).unwrap(), b"deep");
    }

    #[test]
    fn write_file_map_skips_escaping_entries() {
        let tmp = TempDir::new().expect("temp dir");
        let dest = tmp.path().join("dest");
        let outside = tmp.path().join("escaped.txt");

        let mut files = BTreeMap::new();
        files.insert("ok.txt".to_string(), b"ok".to_vec());
        files.insert("../escaped.txt".to_string(), b"bad".to_vec());
        write_file_map(&files, &dest).expect("write map");

        assert!(dest.join("ok.txt").is_file());
        assert!(!outside.exists());
    }
}
