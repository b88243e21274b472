//! Update-protocol lock file.
//!
//! Records where each installed skill came from and the content hash of its
//! folder at install time. `check` compares these hashes against freshly
//! fetched upstream hashes; `update` re-installs exactly the mismatched
//! subset. The upstream fetch itself lives in external adapters; this module
//! owns the persisted record format and the comparison contract.

use std::collections::BTreeMap;
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use walkdir::WalkDir;

use crate::error::LockError;

/// Current lock-file schema version. Reading any other version discards the
/// whole file: callers see "no history", never a partial migration.
pub const LOCK_VERSION: u32 = 1;

/// Where an installed skill came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceType {
    Github,
    Gitlab,
    Url,
    Local,
}

/// Persisted record for one installed skill.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LockEntry {
    pub source: String,
    pub source_type: SourceType,
    pub source_url: String,
    /// Path of the skill inside a multi-skill source, when applicable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skill_path: Option<String>,
    pub skill_folder_hash: String,
}

/// The whole lock file: skill name -> entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LockFile {
    pub version: u32,
    #[serde(default)]
    pub skills: BTreeMap<String, LockEntry>,
}

impl Default for LockFile {
    fn default() -> Self {
        Self {
            version: LOCK_VERSION,
            skills: BTreeMap::new(),
        }
    }
}

/// Lock-file persistence with atomic writes.
pub struct LockStore {
    path: PathBuf,
}

impl LockStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the lock file. Missing, unparsable, or version-mismatched files
    /// all yield the default: drift history is best-effort state, never a
    /// reason to fail an operation.
    pub fn load(&self) -> LockFile {
        let Ok(data) = fs::read_to_string(&self.path) else {
            return LockFile::default();
        };
        match serde_json::from_str::<LockFile>(&data) {
            Ok(lock) if lock.version == LOCK_VERSION => lock,
            Ok(lock) => {
                tracing::warn!(
                    found = lock.version,
                    expected = LOCK_VERSION,
                    "discarding lock file with incompatible schema version"
                );
                LockFile::default()
            }
            Err(e) => {
                tracing::warn!(error = %e, "discarding unparsable lock file");
                LockFile::default()
            }
        }
    }

    /// Save atomically via temp file + rename.
    pub fn save(&self, lock: &LockFile) -> Result<(), LockError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| LockError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }
        let tmp = self.path.with_extension("json.tmp");
        let data = serde_json::to_string_pretty(lock)?;
        fs::write(&tmp, data).map_err(|e| LockError::Io {
            path: tmp.clone(),
            source: e,
        })?;
        fs::rename(&tmp, &self.path).map_err(|e| LockError::Io {
            path: self.path.clone(),
            source: e,
        })
    }
}

/// One skill in an update-check request.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillRef {
    pub name: String,
    pub source: String,
    pub skill_folder_hash: String,
}

/// Batch update-check request. Always requests a forced upstream refetch so
/// a cache elsewhere in the pipeline cannot produce spurious update reports;
/// one extra fetch per skill is the accepted cost.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCheckRequest {
    pub skills: Vec<SkillRef>,
    pub force_refresh: bool,
}

impl UpdateCheckRequest {
    pub fn new(lock: &LockFile) -> Self {
        Self {
            skills: lock
                .skills
                .iter()
                .map(|(name, entry)| SkillRef {
                    name: name.clone(),
                    source: entry.source.clone(),
                    skill_folder_hash: entry.skill_folder_hash.clone(),
                })
                .collect(),
            force_refresh: true,
        }
    }
}

/// Given freshly computed upstream hashes, return the names of skills whose
/// recorded hash differs. Skills absent from `fresh_hashes` are not reported;
/// no response means no claim about them.
pub fn outdated(lock: &LockFile, fresh_hashes: &BTreeMap<String, String>) -> Vec<String> {
    lock.skills
        .iter()
        .filter(|(name, entry)| {
            fresh_hashes
                .get(*name)
                .is_some_and(|fresh| fresh != &entry.skill_folder_hash)
        })
        .map(|(name, _)| name.clone())
        .collect()
}

/// Content hash of a skill folder: SHA-256 over the sorted relative paths
/// and file contents, stable across platforms and traversal order.
pub fn hash_skill_dir(dir: &Path) -> std::io::Result<String> {
    let mut hasher = Sha256::new();

    for entry in WalkDir::new(dir)
        .sort_by_file_name()
        .into_iter()
        .filter_map(Result::ok)
    {
        if !entry.file_type().is_file() {
            continue;
        }
        let rel = entry
            .path()
            .strip_prefix(dir)
            .unwrap_or_else(|_| entry.path());
        hasher.update(rel.to_string_lossy().replace('\\', "/").as_bytes());
        hasher.update([0u8]);

        let mut file = fs::File::open(entry.path())?;
        let mut buf = [0u8; 8192];
        loop {
            let n = file.read(&mut buf)?;
            if n == 0 {
                break;
            }
            hasher.update(&buf[..n]);
        }
        hasher.update([0u8]);
    }

    Ok(format!("{:x}", hasher.finalize()))
}
