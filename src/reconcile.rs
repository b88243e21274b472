//! Installation reconciliation.
//!
//! Determines, after the fact, which consumers expose which canonically
//! installed skills. There is no central ledger of which tool got which
//! skill; visibility is re-derived from the filesystem with layered
//! matching that tolerates inconsistent directory naming.

use std::collections::{BTreeSet, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

use unicode_normalization::UnicodeNormalization;

use crate::descriptor::read_descriptor;
use crate::registry::ConsumerRegistry;
use crate::sanitize::{sanitize, simple_slug};
use crate::skill::{InstalledSkillView, Scope};
use crate::store::skills_root;

/// Cache of consumer-directory descriptor names, per reconciliation run.
///
/// The fallback scan re-reads every consumer entry; caching keeps that to at
/// most one read per directory per run while preserving its completeness.
type DescriptorNameCache = HashMap<PathBuf, Option<String>>;

/// List every canonically installed skill under the given scope roots and
/// report, per consumer, whether it is visible there.
///
/// Skills visible to no consumer are still included so callers can present
/// "installed but not wired into any tool".
pub fn list_installed(
    scope_roots: &[(Scope, PathBuf)],
    registry: &ConsumerRegistry,
    consumer_filter: Option<&str>,
) -> Vec<InstalledSkillView> {
    let mut views = Vec::new();
    let mut cache = DescriptorNameCache::new();

    for (scope, scope_root) in scope_roots {
        let root = skills_root(scope_root);
        let Ok(entries) = fs::read_dir(&root) else {
            continue;
        };

        let mut canonical_dirs: Vec<PathBuf> = entries
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| path.is_dir())
            .collect();
        canonical_dirs.sort();

        for canonical in canonical_dirs {
            // Not a skill without a descriptor; skip silently.
            let Some(descriptor) = read_descriptor(&canonical) else {
                continue;
            };

            let mut consumers = BTreeSet::new();
            for consumer in registry.consumers() {
                if consumer_filter.is_some_and(|only| only != consumer.id) {
                    continue;
                }
                let consumer_root = consumer.skills_root(scope_root);
                if skill_visible(&canonical, &descriptor.name, &consumer_root, &mut cache) {
                    consumers.insert(consumer.id.clone());
                }
            }

            views.push(InstalledSkillView {
                name: descriptor.name,
                description: descriptor.description,
                canonical_path: canonical,
                scope: *scope,
                consumers,
            });
        }
    }

    views
}

/// Layered visibility check, short-circuiting on the first hit.
///
/// Fast path: probe for well-known directory names. Fallback: scan every
/// entry under the consumer root and compare declared descriptor names.
fn skill_visible(
    canonical: &Path,
    skill_name: &str,
    consumer_root: &Path,
    cache: &mut DescriptorNameCache,
) -> bool {
    let literal = canonical
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_default();
    let sanitized = sanitize(skill_name);
    let slug = simple_slug(skill_name);

    for candidate in [literal.as_str(), sanitized.as_str(), slug.as_str()] {
        if candidate.is_empty() {
            continue;
        }
        // symlink_metadata: a broken link still counts as "present", and a
        // valid one is not followed just to answer an existence question.
        if fs::symlink_metadata(consumer_root.join(candidate)).is_ok() {
            return true;
        }
    }

    fallback_scan(skill_name, consumer_root, cache)
}

/// Compare the declared name in every consumer-directory descriptor against
/// the skill being checked. Tolerates consumer folders whose names bear no
/// resemblance to the skill name.
fn fallback_scan(skill_name: &str, consumer_root: &Path, cache: &mut DescriptorNameCache) -> bool {
    let Ok(entries) = fs::read_dir(consumer_root) else {
        return false;
    };

    let wanted: String = skill_name.nfkc().collect();
    for entry in entries.filter_map(Result::ok) {
        let dir = entry.path();
        if !dir.is_dir() {
            continue;
        }
        let declared = cache
            .entry(dir.clone())
            .or_insert_with(|| read_descriptor(&dir).map(|d| d.name))
            .clone();
        if let Some(declared) = declared {
            let declared: String = declared.nfkc().collect();
            if declared == wanted {
                return true;
            }
        }
    }

    false
}
