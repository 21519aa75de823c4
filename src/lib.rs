//! Stratum - deterministic container image builder and runner
//!
//! Stratum builds a container image from a declarative recipe
//! (`stratum.toml`) as an append-only stack of content-addressed filesystem
//! snapshots, then launches the image's entry script as the container's
//! single supervised process. Build steps are sequenced by an explicit
//! dependency graph, every failure aborts before an image is published, and
//! identical inputs always produce identical layer digests.

pub mod application;
pub mod commands;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod recipe;
pub mod ui;

// Re-exports for convenience
pub use application::{
    probe_image, reconcile, BuildReport, BuildUseCase, ContainerState, ProbeReport, RunOutcome,
    RunUseCase,
};
pub use domain::entities::{DependencyManifest, Image, ImageConfig, Layer, LayerStack};
pub use domain::services::{BuildGraph, StepId};
pub use domain::value_objects::{BaseRef, PortDeclaration, TreeDigest};
pub use error::{StratumError, StratumResult};
pub use infrastructure::{DirCatalog, DirIndex, LocalFs, Store};
pub use recipe::{load_with_warnings, Recipe, RecipeWarning};
