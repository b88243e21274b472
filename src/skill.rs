//! Core data model: skills, install targets, and per-target results.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::sanitize::sanitize;

/// Where a skill's files come from.
#[derive(Debug, Clone)]
pub enum SkillContents {
    /// A local directory that is mirrored into the canonical store.
    Directory(PathBuf),
    /// An in-memory file map (relative path -> bytes), as delivered by a
    /// remote fetch adapter.
    Files(BTreeMap<String, Vec<u8>>),
}

/// A validated skill descriptor, ready to install.
///
/// `name` and `description` are produced by the descriptor parser and treated
/// as already validated. Identity is `name`, matched case-insensitively
/// during reconciliation.
#[derive(Debug, Clone)]
pub struct Skill {
    pub name: String,
    pub description: String,
    pub contents: SkillContents,
    /// Explicit installation identity for remote skills, independent of the
    /// display name. Local skills leave this unset.
    pub install_name: Option<String>,
}

impl Skill {
    /// A skill rooted at a local directory.
    pub fn from_directory(
        name: impl Into<String>,
        description: impl Into<String>,
        dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            contents: SkillContents::Directory(dir.into()),
            install_name: None,
        }
    }

    /// A remote skill delivered as a file map with an explicit install name.
    pub fn from_files(
        name: impl Into<String>,
        description: impl Into<String>,
        install_name: impl Into<String>,
        files: BTreeMap<String, Vec<u8>>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            contents: SkillContents::Files(files),
            install_name: Some(install_name.into()),
        }
    }

    /// The sanitized directory name this skill installs under.
    pub fn install_dir_name(&self) -> String {
        sanitize(self.install_name.as_deref().unwrap_or(&self.name))
    }
}

/// Installation scope: project-local or user-global.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    Project,
    Global,
}

impl std::fmt::Display for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Project => write!(f, "project"),
            Self::Global => write!(f, "global"),
        }
    }
}

/// One pairing of canonical scope root and consumer-specific skills root.
#[derive(Debug, Clone)]
pub struct InstallTarget {
    pub scope: Scope,
    /// Root the canonical store hangs off (project dir or home dir).
    pub scope_root: PathBuf,
    /// The consuming tool's skills directory, scoped the same way.
    pub consumer_root: PathBuf,
    /// Identifier of the consuming tool (for reporting).
    pub consumer: String,
}

/// How a consumer view was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InstallMode {
    Link,
    Copy,
}

/// Outcome of one (skill, target) installation. Never aggregated into a
/// batch-level failure; callers render these one by one.
#[derive(Debug, Clone, Serialize)]
pub struct InstallResult {
    pub skill: String,
    pub consumer: String,
    pub success: bool,
    /// Consumer-facing path (link or copy).
    pub path: PathBuf,
    /// Canonical entry the view points at, when one was materialized.
    pub canonical_path: Option<PathBuf>,
    pub mode: InstallMode,
    /// True when link creation failed and the engine fell back to a copy.
    pub link_failed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl InstallResult {
    pub(crate) fn failure(
        skill: &Skill,
        target: &InstallTarget,
        path: PathBuf,
        error: String,
    ) -> Self {
        Self {
            skill: skill.name.clone(),
            consumer: target.consumer.clone(),
            success: false,
            path,
            canonical_path: None,
            mode: InstallMode::Link,
            link_failed: false,
            error: Some(error),
        }
    }
}

/// One canonically-installed skill and the consumers that expose it, as
/// reported by the reconciler.
#[derive(Debug, Clone, Serialize)]
pub struct InstalledSkillView {
    pub name: String,
    pub description: String,
    pub canonical_path: PathBuf,
    pub scope: Scope,
    /// Consumer ids where the skill is visible. May be empty: a skill that is
    /// installed canonically but wired into no tool is still reported.
    pub consumers: std::collections::BTreeSet<String>,
}
