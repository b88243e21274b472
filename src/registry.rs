//! Consumer registry: which tools expect skills, and where.
//!
//! The set of known consumer directories is loaded once and passed explicitly
//! into the projector and reconciler instead of being consulted as ambient
//! global state, so tests can run against a synthetic registry.

use std::path::{Path, PathBuf};

use crate::skill::{InstallTarget, Scope};

/// One consuming tool and its skills directory relative to a scope root.
#[derive(Debug, Clone)]
pub struct Consumer {
    /// Stable identifier, e.g. `"claude"`.
    pub id: String,
    /// Skills directory relative to the scope root, e.g. `.claude/skills`.
    pub rel_skills_dir: PathBuf,
}

impl Consumer {
    pub fn new(id: impl Into<String>, rel_skills_dir: impl Into<PathBuf>) -> Self {
        Self {
            id: id.into(),
            rel_skills_dir: rel_skills_dir.into(),
        }
    }

    /// Absolute skills root for this consumer under the given scope root.
    pub fn skills_root(&self, scope_root: &Path) -> PathBuf {
        scope_root.join(&self.rel_skills_dir)
    }
}

/// Immutable table of known consumers.
#[derive(Debug, Clone)]
pub struct ConsumerRegistry {
    consumers: Vec<Consumer>,
}

impl ConsumerRegistry {
    pub fn new(consumers: Vec<Consumer>) -> Self {
        Self { consumers }
    }

    /// The built-in table of well-known tools.
    pub fn builtin() -> Self {
        Self::new(vec![
            Consumer::new("claude", ".claude/skills"),
            Consumer::new("codex", ".codex/skills"),
            Consumer::new("cursor", ".cursor/skills"),
            Consumer::new("gemini", ".gemini/skills"),
            Consumer::new("windsurf", ".windsurf/skills"),
            Consumer::new("opencode", ".opencode/skills"),
        ])
    }

    pub fn consumers(&self) -> &[Consumer] {
        &self.consumers
    }

    pub fn get(&self, id: &str) -> Option<&Consumer> {
        self.consumers.iter().find(|c| c.id == id)
    }

    /// Expand this registry into install targets for one scope root,
    /// optionally restricted to a set of consumer ids. Unknown ids are
    /// ignored; an empty filter means every consumer.
    pub fn targets(&self, scope: Scope, scope_root: &Path, only: &[String]) -> Vec<InstallTarget> {
        self.consumers
            .iter()
            .filter(|c| only.is_empty() || only.iter().any(|id| id == &c.id))
            .map(|c| InstallTarget {
                scope,
                scope_root: scope_root.to_path_buf(),
                consumer_root: c.skills_root(scope_root),
                consumer: c.id.clone(),
            })
            .collect()
    }
}
