//! RuntimeCatalog port - resolves pinned base references
//!
//! The catalog is the provisioner's upstream: given `name:tag`, hand back
//! the root of that runtime's filesystem. Resolution failure is fatal to
//! the build.

use std::path::PathBuf;

use crate::domain::value_objects::BaseRef;
use crate::error::StratumResult;

/// Source of base runtime filesystems
pub trait RuntimeCatalog {
    /// Resolve a pinned reference to the runtime's filesystem root.
    fn resolve(&self, base: &BaseRef) -> StratumResult<PathBuf>;
}
