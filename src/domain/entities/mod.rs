//! Domain entities

pub mod image;
pub mod layer;
pub mod manifest;

pub use image::{Image, ImageConfig, IMAGE_SCHEMA};
pub use layer::{Layer, LayerStack};
pub use manifest::{DependencyManifest, PackageSpec};
