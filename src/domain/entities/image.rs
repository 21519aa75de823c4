//! Image entity - a published, named layer stack plus run configuration
//!
//! Pure data; persistence lives in the store. An image record is only
//! written after every build step has succeeded, so a record on disk always
//! describes a complete image.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::entities::{Layer, LayerStack};
use crate::domain::value_objects::PortDeclaration;

/// Record schema version
pub const IMAGE_SCHEMA: u32 = 1;

/// Run-time configuration attached to an image
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageConfig {
    /// Image-absolute working directory, e.g. `/app`
    pub workdir: String,
    /// Entry script path relative to the workdir
    pub entrypoint: String,
    /// Advisory exposed port; documents intent, binds nothing
    pub exposed_port: Option<PortDeclaration>,
}

/// A published image
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Image {
    pub schema: u32,
    pub name: String,
    pub base: String,
    pub created_at: DateTime<Utc>,
    pub config: ImageConfig,
    pub layers: LayerStack,
}

impl Image {
    pub fn new(
        name: impl Into<String>,
        base: impl Into<String>,
        config: ImageConfig,
        layers: LayerStack,
    ) -> Self {
        Self {
            schema: IMAGE_SCHEMA,
            name: name.into(),
            base: base.into(),
            created_at: Utc::now(),
            config,
            layers,
        }
    }

    /// The snapshot a container instance is materialized from
    pub fn top_layer(&self) -> Option<&Layer> {
        self.layers.top()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::TreeDigest;

    fn sample() -> Image {
        let mut layers = LayerStack::new();
        layers.push(Layer::new(TreeDigest::new("aaa"), "provision-base"));
        layers.push(Layer::new(TreeDigest::new("bbb"), "copy-source"));

        Image::new(
            "lego-bot",
            "python-slim:3.11",
            ImageConfig {
                workdir: "/app".to_string(),
                entrypoint: "start.sh".to_string(),
                exposed_port: Some(PortDeclaration::new(80)),
            },
            layers,
        )
    }

    #[test]
    fn top_layer_is_last_pushed() {
        let image = sample();
        assert_eq!(image.top_layer().unwrap().created_by(), "copy-source");
    }

    #[test]
    fn record_round_trips_through_json() {
        let image = sample();
        let json = serde_json::to_string_pretty(&image).unwrap();
        let back: Image = serde_json::from_str(&json).unwrap();
        assert_eq!(back, image);
    }

    #[test]
    fn record_carries_schema_and_port() {
        let image = sample();
        let value: serde_json::Value = serde_json::to_value(&image).unwrap();
        assert_eq!(value["schema"], 1);
        assert_eq!(value["config"]["exposed_port"], 80);
    }
}
