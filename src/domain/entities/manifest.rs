//! Dependency manifest entity
//!
//! The manifest is an ordered list of package specifiers, unique by name,
//! one per line. Supported forms: `name` and `name==version`. Blank lines
//! and `#` comments are ignored. Parsing is line-precise so errors point at
//! the offending specifier.

use std::collections::BTreeSet;
use std::path::Path;

use crate::domain::value_objects::VersionConstraint;
use crate::error::{StratumError, StratumResult};

/// One parsed package specifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageSpec {
    pub name: String,
    pub constraint: VersionConstraint,
}

/// Ordered, name-unique set of package specifiers
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependencyManifest {
    packages: Vec<PackageSpec>,
}

impl DependencyManifest {
    /// Parse manifest text. `path` is only used for error reporting.
    pub fn parse(content: &str, path: &Path) -> StratumResult<Self> {
        let mut packages = Vec::new();
        let mut seen = BTreeSet::new();

        for (idx, raw) in content.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let spec = parse_specifier(line).ok_or_else(|| StratumError::InvalidPackageSpec {
                spec: line.to_string(),
                path: path.to_path_buf(),
                line: idx + 1,
            })?;

            if !seen.insert(spec.name.clone()) {
                return Err(StratumError::DuplicatePackage {
                    name: spec.name,
                    path: path.to_path_buf(),
                    line: idx + 1,
                });
            }

            packages.push(spec);
        }

        Ok(Self { packages })
    }

    pub fn packages(&self) -> &[PackageSpec] {
        &self.packages
    }

    pub fn len(&self) -> usize {
        self.packages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }
}

fn parse_specifier(line: &str) -> Option<PackageSpec> {
    let (name, constraint) = match line.split_once("==") {
        Some((name, version)) => {
            let version = version.trim();
            if version.is_empty() || !version.chars().all(is_version_char) {
                return None;
            }
            (
                name.trim(),
                VersionConstraint::Exact(version.to_string()),
            )
        }
        None => (line, VersionConstraint::Any),
    };

    if name.is_empty() || !name.chars().all(is_name_char) {
        return None;
    }

    Some(PackageSpec {
        name: name.to_string(),
        constraint,
    })
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.')
}

fn is_version_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '.' | '-')
}
