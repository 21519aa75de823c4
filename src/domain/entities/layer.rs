//! Layer entity
//!
//! A layer is an immutable filesystem snapshot produced by one build step,
//! identified by its tree digest. Layers form an append-only stack; a
//! committed layer is never mutated, only superseded by the next snapshot.

use serde::{Deserialize, Serialize};

use crate::domain::value_objects::TreeDigest;

/// One committed filesystem snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Layer {
    digest: TreeDigest,
    created_by: String,
}

impl Layer {
    pub fn new(digest: TreeDigest, created_by: impl Into<String>) -> Self {
        Self {
            digest,
            created_by: created_by.into(),
        }
    }

    pub fn digest(&self) -> &TreeDigest {
        &self.digest
    }

    /// Name of the build step that produced this snapshot
    pub fn created_by(&self) -> &str {
        &self.created_by
    }
}

/// Ordered, append-only sequence of layers
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LayerStack {
    layers: Vec<Layer>,
}

impl LayerStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a layer. This is the only mutation the stack supports.
    pub fn push(&mut self, layer: Layer) {
        self.layers.push(layer);
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// The snapshot the container runtime materializes
    pub fn top(&self) -> Option<&Layer> {
        self.layers.last()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Layer> {
        self.layers.iter()
    }

    pub fn digests(&self) -> Vec<&TreeDigest> {
        self.layers.iter().map(Layer::digest).collect()
    }
}
