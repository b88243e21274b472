//! Consumer projection.
//!
//! Makes a canonical skill entry visible at a consumer path, preferring a
//! relative symlink and falling back to an independent copy when linking is
//! unavailable. The contract: on success the consumer can read the skill's
//! files; on failure the caller gets a per-target error. A target is never
//! silently left empty under a claimed success.

use std::fs;
use std::path::Path;

use crate::error::InstallError;
use crate::link::{create_dir_link, resolve_link};
use crate::paths::normalize;
use crate::skill::InstallMode;
use crate::writer::copy_dir;

/// How a projection ended up on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Projection {
    pub mode: InstallMode,
    /// True when a link was attempted and failed, forcing the copy fallback.
    pub link_failed: bool,
}

/// Project `canonical_dir` to `consumer_path`.
///
/// No-op when the path already links to the canonical entry; otherwise any
/// existing entry is removed, a relative link is attempted, and on link
/// failure the canonical content is copied instead.
pub fn project(canonical_dir: &Path, consumer_path: &Path) -> Result<Projection, InstallError> {
    project_with(create_dir_link, canonical_dir, consumer_path)
}

/// [`project`] with an injectable link primitive, so the copy fallback can
/// be exercised on platforms where symlinks just work.
pub fn project_with<L>(
    link: L,
    canonical_dir: &Path,
    consumer_path: &Path,
) -> Result<Projection, InstallError>
where
    L: Fn(&Path, &Path) -> std::io::Result<()>,
{
    if already_linked(canonical_dir, consumer_path) {
        return Ok(Projection {
            mode: InstallMode::Link,
            link_failed: false,
        });
    }

    clear_existing(consumer_path);

    if let Some(parent) = consumer_path.parent() {
        fs::create_dir_all(parent).map_err(|e| InstallError::write(parent, e))?;
    }

    match link(canonical_dir, consumer_path) {
        Ok(()) => Ok(Projection {
            mode: InstallMode::Link,
            link_failed: false,
        }),
        Err(e) => {
            tracing::debug!(
                path = %consumer_path.display(),
                error = %e,
                "link creation failed, falling back to copy"
            );
            copy_dir(canonical_dir, consumer_path)?;
            Ok(Projection {
                mode: InstallMode::Copy,
                link_failed: true,
            })
        }
    }
}

fn already_linked(canonical_dir: &Path, consumer_path: &Path) -> bool {
    match resolve_link(consumer_path) {
        Some(target) => target == normalize(canonical_dir),
        None => false,
    }
}

/// Remove whatever occupies `consumer_path`, best-effort.
///
/// Circular links make ordinary metadata reads fail with an ELOOP-style
/// error; the symlink-aware removal below handles those too. Removal failure
/// is logged and the projection proceeds regardless: the subsequent link or
/// copy surfaces the real error if the path is truly stuck.
fn clear_existing(consumer_path: &Path) {
    let Ok(meta) = fs::symlink_metadata(consumer_path) else {
        return;
    };
    let result = if meta.file_type().is_symlink() || meta.is_file() {
        fs::remove_file(consumer_path).or_else(|_| fs::remove_dir_all(consumer_path))
    } else {
        fs::remove_dir_all(consumer_path)
    };
    if let Err(e) = result {
        tracing::warn!(path = %consumer_path.display(), error = %e, "could not remove existing entry");
    }
}
