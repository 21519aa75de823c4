//! PackageIndex port - resolves manifest specifiers to payloads

use std::path::PathBuf;

use crate::domain::entities::PackageSpec;
use crate::error::StratumResult;

/// A specifier resolved against the index
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPackage {
    pub name: String,
    pub version: String,
    /// Directory holding the package's installable payload
    pub payload: PathBuf,
}

/// Source of installable packages
pub trait PackageIndex {
    /// Resolve one specifier: exact pins must match exactly; unpinned names
    /// resolve to the highest indexed version.
    fn resolve(&self, spec: &PackageSpec) -> StratumResult<ResolvedPackage>;
}
