//! Version Constraint Value Object
//!
//! The manifest supports two forms: a bare name (any version, highest wins)
//! and an exact `==` pin. Version ordering compares dotted segments
//! numerically when both sides are numeric, so `3.10` sorts above `3.9`.

use std::cmp::Ordering;
use std::fmt;

/// Constraint attached to one package specifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionConstraint {
    /// No pin: the highest indexed version satisfies
    Any,
    /// Exact pin: only this version satisfies
    Exact(String),
}

impl VersionConstraint {
    /// Check whether a concrete version satisfies this constraint.
    pub fn satisfied_by(&self, version: &str) -> bool {
        match self {
            VersionConstraint::Any => true,
            VersionConstraint::Exact(pin) => pin == version,
        }
    }
}

impl fmt::Display for VersionConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VersionConstraint::Any => write!(f, "*"),
            VersionConstraint::Exact(pin) => write!(f, "=={}", pin),
        }
    }
}

/// Order two version strings, numeric-aware per dotted segment.
///
/// Non-numeric segments fall back to lexical comparison; a version with
/// extra trailing segments sorts above its prefix (`1.2.1` > `1.2`).
pub fn version_cmp(a: &str, b: &str) -> Ordering {
    let mut left = a.split('.');
    let mut right = b.split('.');

    loop {
        match (left.next(), right.next()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(l), Some(r)) => {
                let ord = match (l.parse::<u64>(), r.parse::<u64>()) {
                    (Ok(ln), Ok(rn)) => ln.cmp(&rn),
                    _ => l.cmp(r),
                };
                if ord != Ordering::Equal {
                    return ord;
                }
            }
        }
    }
}
