//! Installation engine.
//!
//! Materializes each skill once into the canonical store per scope root,
//! then projects it into every consumer target. Pairs are processed
//! sequentially so the canonical store has a single writer and the report
//! order is deterministic; one pair's failure never aborts the rest.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::descriptor::{find_skill_md, render_descriptor};
use crate::error::InstallError;
use crate::paths::is_safe;
use crate::project::project;
use crate::skill::{InstallResult, InstallTarget, Skill, SkillContents};
use crate::store::{canonical_dir, ensure_dir, remove_if_stale_link};
use crate::writer::{copy_dir, write_file_map};

/// Install every skill into every target, returning one result per
/// (skill, target) pair in input order.
pub fn install_all(skills: &[Skill], targets: &[InstallTarget]) -> Vec<InstallResult> {
    let mut results = Vec::with_capacity(skills.len() * targets.len());

    for skill in skills {
        // One materialization per scope root per run; re-doing it for every
        // consumer of the same scope would race with nothing but would still
        // be wasted writes.
        let mut materialized: HashSet<PathBuf> = HashSet::new();

        for target in targets {
            results.push(install_one(skill, target, &mut materialized));
        }
    }

    results
}

fn install_one(
    skill: &Skill,
    target: &InstallTarget,
    materialized: &mut HashSet<PathBuf>,
) -> InstallResult {
    let dir_name = skill.install_dir_name();
    let consumer_path = target.consumer_root.join(&dir_name);

    // Same defense as the canonical join: the name is sanitized, but the
    // joined path is still re-checked before anything mutates at it.
    if !is_safe(&target.consumer_root, &consumer_path) {
        let e = InstallError::UnsafePath {
            base: target.consumer_root.clone(),
            path: consumer_path.clone(),
        };
        return InstallResult::failure(skill, target, consumer_path, e.to_string());
    }

    let canonical = match canonical_dir(&target.scope_root, &dir_name) {
        Ok(path) => path,
        Err(e) => {
            return InstallResult::failure(skill, target, consumer_path, e.to_string());
        }
    };

    if !materialized.contains(&canonical) {
        if let Err(e) = materialize(skill, &canonical) {
            tracing::warn!(
                skill = %skill.name,
                consumer = %target.consumer,
                error = %e,
                "materialization failed"
            );
            return InstallResult::failure(skill, target, consumer_path, e.to_string());
        }
        materialized.insert(canonical.clone());
    }

    match project(&canonical, &consumer_path) {
        Ok(projection) => {
            tracing::info!(
                skill = %skill.name,
                consumer = %target.consumer,
                mode = ?projection.mode,
                "installed"
            );
            InstallResult {
                skill: skill.name.clone(),
                consumer: target.consumer.clone(),
                success: true,
                path: consumer_path,
                canonical_path: Some(canonical),
                mode: projection.mode,
                link_failed: projection.link_failed,
                error: None,
            }
        }
        Err(e) => InstallResult::failure(skill, target, consumer_path, e.to_string()),
    }
}

/// Write the skill's files into its canonical directory.
///
/// The canonical entry is replaced wholesale, not merged: files the new
/// source no longer ships must not linger in the entry (or in any consumer
/// linked to it).
fn materialize(skill: &Skill, canonical: &Path) -> Result<(), InstallError> {
    remove_if_stale_link(canonical);
    if let Ok(meta) = std::fs::symlink_metadata(canonical) {
        let removed = if meta.is_dir() {
            std::fs::remove_dir_all(canonical)
        } else {
            std::fs::remove_file(canonical)
        };
        removed.map_err(|e| InstallError::write(canonical, e))?;
    }
    ensure_dir(canonical)?;
    match &skill.contents {
        SkillContents::Directory(src) => copy_dir(src, canonical)?,
        SkillContents::Files(files) => write_file_map(files, canonical)?,
    }

    // A canonical entry without a descriptor is invisible to reconciliation.
    if find_skill_md(canonical).is_none() {
        let doc = render_descriptor(&skill.name, &skill.description);
        std::fs::write(canonical.join("SKILL.md"), doc)
            .map_err(|e| InstallError::write(canonical.join("SKILL.md"), e))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::skill::{InstallMode, Scope};
    use pretty_assertions::assert_eq;
    use std::collections::BTreeMap;
    use std::fs;
    use tempfile::TempDir;

    fn skill_fixture(tmp: &TempDir) -> Skill {
        let src = tmp.path().join("source/demo");
        fs::create_dir_all(&src).expect("mkdir");
        fs::write(
            src.join("SKILL.md"),
            "---\nname: demo\ndescription: A demo skill\n---\nBody\n",
        )
        .expect("write");
        fs::write(src.join("extra.md"), "extra").expect("write");
        Skill::from_directory("demo", "A demo skill", src)
    }

    fn target(tmp: &TempDir, consumer: &str) -> InstallTarget {
        InstallTarget {
            scope: Scope::Project,
            scope_root: tmp.path().to_path_buf(),
            consumer_root: tmp.path().join(format!(".{consumer}/skills")),
            consumer: consumer.to_string(),
        }
    }

    #[test]
    fn install_materializes_and_projects() {
        let tmp = TempDir::new().expect("temp dir");
        let skill = skill_fixture(&tmp);
        let results = install_all(&[skill], &[target(&tmp, "claude"), target(&tmp, "codex")]);

        assert_eq!(results.len(), 2);
        for result in &results {
            assert!(result.success, "failed: {:?}", result.error);
            assert!(result.path.join("SKILL.md").is_file());
            assert!(result.path.join("extra.md").is_file());
        }

        let canonical = tmp.path().join(".agents/skills/demo");
        assert!(canonical.join("SKILL.md").is_file());
        assert_eq!(results[0].canonical_path.as_deref(), Some(canonical.as_path()));
    }

    #[cfg(unix)]
    #[test]
    fn install_prefers_links() {
        let tmp = TempDir::new().expect("temp dir");
        let skill = skill_fixture(&tmp);
        let results = install_all(&[skill], &[target(&tmp, "claude")]);
        assert_eq!(results[0].mode, InstallMode::Link);
        assert!(!results[0].link_failed);
    }

    #[test]
    fn install_file_map_skill_gets_descriptor() {
        let tmp = TempDir::new().expect("temp dir");
        let mut files = BTreeMap::new();
        files.insert("notes.md".to_string(), b"notes".to_vec());
        let skill = Skill::from_files("Remote Skill", "Fetched remotely", "remote-skill", files);

        let results = install_all(&[skill], &[target(&tmp, "claude")]);
        assert!(results[0].success);

        let canonical = tmp.path().join(".agents/skills/remote-skill");
        assert!(canonical.join("notes.md").is_file());
        let descriptor = crate::descriptor::read_descriptor(&canonical).expect("descriptor");
        assert_eq!(descriptor.name, "Remote Skill");
    }

    #[test]
    fn install_twice_is_idempotent() {
        let tmp = TempDir::new().expect("temp dir");
        let skill = skill_fixture(&tmp);
        let targets = [target(&tmp, "claude")];

        let first = install_all(std::slice::from_ref(&skill), &targets);
        assert!(first[0].success);
        let second = install_all(&[skill], &targets);
        assert!(second[0].success);
        assert!(second[0].error.is_none());
        assert!(second[0].path.join("SKILL.md").is_file());
    }

    #[test]
    fn missing_source_fails_only_that_pair() {
        let tmp = TempDir::new().expect("temp dir");
        let bad = Skill::from_directory("ghost", "gone", tmp.path().join("nope"));
        let good = skill_fixture(&tmp);

        let results = install_all(&[bad, good], &[target(&tmp, "claude")]);
        assert_eq!(results.len(), 2);
        assert!(!results[0].success);
        assert!(results[0].error.is_some());
        assert!(results[1].success);
    }

    #[test]
    fn reinstall_replaces_canonical_entry() {
        let tmp = TempDir::new().expect("temp dir");
        let src = tmp.path().join("source/demo");
        fs::create_dir_all(&src).expect("mkdir");
        fs::write(
            src.join("SKILL.md"),
            "---\nname: demo\ndescription: A demo skill\n---\nBody\n",
        )
        .expect("write");
        fs::write(src.join("old.md"), "to be removed upstream").expect("write");
        let skill = Skill::from_directory("demo", "A demo skill", src.clone());
        let targets = [target(&tmp, "claude")];

        let first = install_all(std::slice::from_ref(&skill), &targets);
        assert!(first[0].success);
        let canonical = tmp.path().join(".agents/skills/demo");
        assert!(canonical.join("old.md").is_file());

        // Upstream dropped a file; re-install must not keep it around.
        fs::remove_file(src.join("old.md")).expect("remove");
        let second = install_all(&[skill], &targets);
        assert!(second[0].success);
        assert!(!canonical.join("old.md").exists());
        assert!(canonical.join("SKILL.md").is_file());
        assert!(!second[0].path.join("old.md").exists());
        assert!(second[0].path.join("SKILL.md").is_file());
    }

    #[test]
    fn hostile_name_is_contained() {
        let tmp = TempDir::new().expect("temp dir");
        let src = tmp.path().join("source/evil");
        fs::create_dir_all(&src).expect("mkdir");
        fs::write(src.join("SKILL.md"), "---\nname: evil\n---\n").expect("write");
        let skill = Skill::from_directory("../../etc/passwd", "evil", src);

        let t = target(&tmp, "claude");
        let results = install_all(&[skill], &[t.clone()]);
        assert!(results[0].success);
        assert!(tmp.path().join(".agents/skills/etc-passwd").is_dir());
        // Both the canonical and the consumer-side joins stay contained.
        assert!(is_safe(&t.consumer_root, &results[0].path));
        assert!(is_safe(
            &tmp.path().join(".agents/skills"),
            results[0].canonical_path.as_ref().unwrap()
        ));
    }
}
