//! Install and synchronize Agent Skills across per-tool skill directories.
//!
//! One canonical copy of each skill lives under `<scope>/.agents/skills/`;
//! every consuming tool gets a projection of it — a relative symlink where
//! possible, an independent copy where not. The crate also reconciles which
//! tools already expose which skills, and records install-time folder hashes
//! in a lock file so callers can detect upstream drift.
//!
//! The library never prints; it returns per-item results that the binary (or
//! any other caller) renders.

pub mod descriptor;
pub mod error;
pub mod install;
pub mod link;
pub mod lock;
pub mod paths;
pub mod project;
pub mod reconcile;
pub mod registry;
pub mod sanitize;
pub mod skill;
pub mod store;
pub mod writer;

pub use error::{InstallError, LockError};
pub use install::install_all;
pub use reconcile::list_installed;
pub use registry::{Consumer, ConsumerRegistry};
pub use sanitize::sanitize;
pub use skill::{
    InstallMode, InstallResult, InstallTarget, InstalledSkillView, Scope, Skill, SkillContents,
};
