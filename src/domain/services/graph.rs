//! Build graph service
//!
//! Pure domain logic for sequencing build steps. Each step declares the
//! artifacts it requires and the artifact it produces; execution order is
//! the topological order of that graph, not an implicit file-copy order.
//! The manifest-before-source staging rule is encoded here as a real edge:
//! `InstallDependencies` requires the artifact `StageManifest` produces.

use std::collections::BTreeSet;
use std::fmt;

use crate::error::{StratumError, StratumResult};

/// Artifact labels used for step wiring
pub mod artifact {
    pub const RUNTIME_FS: &str = "runtime-fs";
    pub const STAGED_MANIFEST: &str = "staged-manifest";
    pub const DEPENDENCY_SET: &str = "dependency-set";
    pub const SOURCE_TREE: &str = "source-tree";
    pub const ENTRYPOINT: &str = "executable-entrypoint";
    pub const PORT_DECLARATION: &str = "port-declaration";
}

/// Identity of one build step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepId {
    ProvisionBase,
    StageManifest,
    InstallDependencies,
    CopySource,
    NormalizeEntrypoint,
    DeclarePort,
}

impl StepId {
    pub fn as_str(&self) -> &'static str {
        match self {
            StepId::ProvisionBase => "provision-base",
            StepId::StageManifest => "stage-manifest",
            StepId::InstallDependencies => "install-dependencies",
            StepId::CopySource => "copy-source",
            StepId::NormalizeEntrypoint => "normalize-entrypoint",
            StepId::DeclarePort => "declare-port",
        }
    }

    /// Whether this step commits a filesystem layer (`DeclarePort` is
    /// metadata-only).
    pub fn commits_layer(&self) -> bool {
        !matches!(self, StepId::DeclarePort)
    }
}

impl fmt::Display for StepId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One node in the build graph
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepNode {
    pub id: StepId,
    pub requires: Vec<&'static str>,
    pub produces: &'static str,
}

impl StepNode {
    pub fn new(id: StepId, requires: Vec<&'static str>, produces: &'static str) -> Self {
        Self {
            id,
            requires,
            produces,
        }
    }
}

/// Directed acyclic graph of build steps
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildGraph {
    nodes: Vec<StepNode>,
}

impl BuildGraph {
    pub fn new(nodes: Vec<StepNode>) -> Self {
        Self { nodes }
    }

    /// The canonical six-step recipe graph.
    pub fn for_recipe() -> Self {
        use artifact::*;
        Self::new(vec![
            StepNode::new(StepId::ProvisionBase, vec![], RUNTIME_FS),
            StepNode::new(StepId::StageManifest, vec![RUNTIME_FS], STAGED_MANIFEST),
            StepNode::new(
                StepId::InstallDependencies,
                vec![STAGED_MANIFEST],
                DEPENDENCY_SET,
            ),
            StepNode::new(StepId::CopySource, vec![DEPENDENCY_SET], SOURCE_TREE),
            StepNode::new(StepId::NormalizeEntrypoint, vec![SOURCE_TREE], ENTRYPOINT),
            StepNode::new(StepId::DeclarePort, vec![ENTRYPOINT], PORT_DECLARATION),
        ])
    }

    pub fn nodes(&self) -> &[StepNode] {
        &self.nodes
    }

    /// Topological execution order (Kahn's algorithm, declaration order as
    /// the tie-breaker so the result is deterministic).
    ///
    /// Errors: a required artifact nothing produces is `MissingStepInput`;
    /// unschedulable remainder is `GraphCycle`.
    pub fn execution_order(&self) -> StratumResult<Vec<&StepNode>> {
        let produced: BTreeSet<&str> = self.nodes.iter().map(|n| n.produces).collect();
        for node in &self.nodes {
            for required in &node.requires {
                if !produced.contains(required) {
                    return Err(StratumError::MissingStepInput {
                        step: node.id.to_string(),
                        artifact: (*required).to_string(),
                    });
                }
            }
        }

        let mut order: Vec<&StepNode> = Vec::with_capacity(self.nodes.len());
        let mut available: BTreeSet<&str> = BTreeSet::new();
        let mut remaining: Vec<&StepNode> = self.nodes.iter().collect();

        while !remaining.is_empty() {
            let ready = remaining
                .iter()
                .position(|n| n.requires.iter().all(|r| available.contains(r)));

            match ready {
                Some(idx) => {
                    let node = remaining.remove(idx);
                    available.insert(node.produces);
                    order.push(node);
                }
                None => {
                    return Err(StratumError::GraphCycle {
                        step: remaining[0].id.to_string(),
                    });
                }
            }
        }

        Ok(order)
    }
}
