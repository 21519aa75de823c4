//! Directory-backed package index
//!
//! Packages live at `<root>/<name>/<version>/` with the installable payload
//! directly inside. Exact pins must match a stored version; unpinned names
//! resolve to the highest version under numeric-aware ordering.

use std::fs;
use std::path::PathBuf;

use crate::domain::entities::PackageSpec;
use crate::domain::ports::{PackageIndex, ResolvedPackage};
use crate::domain::value_objects::{version_cmp, VersionConstraint};
use crate::error::{StratumError, StratumResult};

/// Package index rooted at a local directory
#[derive(Debug, Clone)]
pub struct DirIndex {
    root: PathBuf,
}

impl DirIndex {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    fn versions_of(&self, name: &str) -> StratumResult<Vec<String>> {
        let pkg_dir = self.root.join(name);
        if !pkg_dir.is_dir() {
            return Err(StratumError::UnresolvedPackage {
                name: name.to_string(),
                index: self.root.clone(),
            });
        }

        let mut versions = Vec::new();
        for entry in fs::read_dir(&pkg_dir)? {
            let entry = entry?;
            if entry.file_type()?.is_dir() {
                if let Some(version) = entry.file_name().to_str() {
                    versions.push(version.to_string());
                }
            }
        }

        if versions.is_empty() {
            return Err(StratumError::UnresolvedPackage {
                name: name.to_string(),
                index: self.root.clone(),
            });
        }

        versions.sort_by(|a, b| version_cmp(a, b));
        Ok(versions)
    }
}

impl PackageIndex for DirIndex {
    fn resolve(&self, spec: &PackageSpec) -> StratumResult<ResolvedPackage> {
        let versions = self.versions_of(&spec.name)?;

        let version = match &spec.constraint {
            VersionConstraint::Any => versions.last().cloned(),
            VersionConstraint::Exact(pin) => versions.iter().find(|v| *v == pin).cloned(),
        }
        .ok_or_else(|| StratumError::VersionConflict {
            name: spec.name.clone(),
            constraint: spec.constraint.to_string(),
        })?;

        Ok(ResolvedPackage {
            payload: self.root.join(&spec.name).join(&version),
            name: spec.name.clone(),
            version,
        })
    }
}
