//! FileSystem port - abstraction over snapshot filesystem operations
//!
//! Build steps mutate staging trees through this trait so the application
//! layer stays independent of the concrete backend (local disk in
//! production, and nothing stops an in-memory double in tests).

use std::path::Path;

use crate::domain::value_objects::TreeDigest;
use crate::error::StratumResult;

/// Abstract filesystem interface for staging and inspecting snapshots
pub trait FileSystem {
    /// Recursively copy `src` into `dst`, preserving permission bits.
    fn copy_dir(&self, src: &Path, dst: &Path) -> StratumResult<()>;

    /// Copy a source tree into `dst`, honoring `.stratumignore` rules.
    fn copy_source_tree(&self, src: &Path, dst: &Path) -> StratumResult<()>;

    /// Copy a single file, preserving permission bits.
    fn copy_file(&self, src: &Path, dst: &Path) -> StratumResult<()>;

    /// Whether the path exists.
    fn exists(&self, path: &Path) -> bool;

    /// Set owner/group/other execute bits on a file (idempotent).
    fn set_executable(&self, path: &Path) -> StratumResult<()>;

    /// Whether the file carries an execute bit.
    fn is_executable(&self, path: &Path) -> StratumResult<bool>;

    /// Digest an entire tree deterministically.
    fn hash_tree(&self, root: &Path) -> StratumResult<TreeDigest>;

    /// Remove a directory tree if present.
    fn remove_dir_all(&self, path: &Path) -> StratumResult<()>;
}
