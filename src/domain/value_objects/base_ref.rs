//! Base Reference Value Object
//!
//! A pinned `name:tag` reference to a runtime image in the catalog.
//! Tagless references are rejected: provisioning must fail fast rather than
//! resolve a floating default.

use std::fmt;

use crate::error::{StratumError, StratumResult};

/// Pinned base runtime reference
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BaseRef {
    name: String,
    tag: String,
}

impl BaseRef {
    /// Parse a `name:tag` reference.
    pub fn parse(reference: &str) -> StratumResult<Self> {
        let invalid = || StratumError::InvalidBaseRef {
            reference: reference.to_string(),
        };

        let (name, tag) = reference.split_once(':').ok_or_else(invalid)?;
        if name.is_empty() || tag.is_empty() {
            return Err(invalid());
        }
        if !name.chars().all(is_name_char) || !tag.chars().all(is_tag_char) {
            return Err(invalid());
        }

        Ok(Self {
            name: name.to_string(),
            tag: tag.to_string(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '/')
}

fn is_tag_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.')
}

impl fmt::Display for BaseRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.name, self.tag)
    }
}
