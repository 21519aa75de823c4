//! Tree Digest Value Object
//!
//! A validated, immutable digest identifying the content of a filesystem
//! snapshot. Layer identity and dedup in the store are keyed on it.
//!
//! The digest covers, in sorted relative-path order: the path itself, an
//! executable marker, and file bytes. Timestamps and ownership never enter
//! the hash, so identical build inputs produce identical digests.

use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// One hashed element of a snapshot tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeEntry {
    /// A directory at a relative path
    Dir { path: String },
    /// A regular file: relative path, executable bit, content
    File {
        path: String,
        executable: bool,
        content: Vec<u8>,
    },
    /// A symbolic link: relative path and target
    Link { path: String, target: String },
}

impl TreeEntry {
    fn path(&self) -> &str {
        match self {
            TreeEntry::Dir { path } => path,
            TreeEntry::File { path, .. } => path,
            TreeEntry::Link { path, .. } => path,
        }
    }
}

/// Tree digest value object
///
/// Wraps a SHA-256 digest string with the `sha256:` prefix.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TreeDigest(String);

impl TreeDigest {
    /// Prefix for SHA-256 digests
    pub const PREFIX: &'static str = "sha256:";

    /// Create a TreeDigest from a raw hash string (with or without prefix)
    pub fn new(raw: &str) -> Self {
        if raw.starts_with(Self::PREFIX) {
            Self(raw.to_string())
        } else {
            Self(format!("{}{}", Self::PREFIX, raw))
        }
    }

    /// Digest a set of tree entries.
    ///
    /// Entries are sorted by relative path before hashing, so the result is
    /// independent of traversal order.
    pub fn from_entries(mut entries: Vec<TreeEntry>) -> Self {
        entries.sort_by(|a, b| a.path().cmp(b.path()));

        let mut hasher = Sha256::new();
        for entry in &entries {
            match entry {
                TreeEntry::Dir { path } => {
                    hasher.update(b"d\0");
                    hasher.update(path.as_bytes());
                    hasher.update(b"\0");
                }
                TreeEntry::File {
                    path,
                    executable,
                    content,
                } => {
                    hasher.update(if *executable { b"x\0" } else { b"f\0" });
                    hasher.update(path.as_bytes());
                    hasher.update(b"\0");
                    hasher.update((content.len() as u64).to_le_bytes());
                    hasher.update(content);
                }
                TreeEntry::Link { path, target } => {
                    hasher.update(b"l\0");
                    hasher.update(path.as_bytes());
                    hasher.update(b"\0");
                    hasher.update(target.as_bytes());
                    hasher.update(b"\0");
                }
            }
        }

        Self(format!("{}{:x}", Self::PREFIX, hasher.finalize()))
    }

    /// Digest raw bytes (used for single-file identities in tests)
    pub fn from_bytes(content: &[u8]) -> Self {
        Self(format!("{}{:x}", Self::PREFIX, Sha256::digest(content)))
    }

    /// Get the full digest string with prefix
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Get just the hex part without prefix
    pub fn hex(&self) -> &str {
        self.0.strip_prefix(Self::PREFIX).unwrap_or(&self.0)
    }
}

impl fmt::Display for TreeDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for TreeDigest {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl AsRef<str> for TreeDigest {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
