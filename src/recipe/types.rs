//! Recipe types
//!
//! `stratum.toml` is the declarative build description: which runtime to
//! start from, which manifest to install, what to copy, what to mark
//! executable, and which port to advertise. Defaults follow the common
//! single-service layout (`/app` workdir, `start.sh` entrypoint).

use std::path::PathBuf;

use serde::Deserialize;

use crate::domain::value_objects::{BaseRef, PortDeclaration};
use crate::error::{StratumError, StratumResult};

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ImageSection {
    /// Name the built image is published under
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BaseSection {
    /// Pinned `name:tag` runtime reference
    pub reference: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DependencySection {
    /// Manifest path, relative to the build context
    pub manifest: PathBuf,
    /// Image-absolute root the installer may write under
    pub install_root: String,
}

impl Default for DependencySection {
    fn default() -> Self {
        Self {
            manifest: PathBuf::from("requirements.txt"),
            install_root: "/opt/deps".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppSection {
    /// Source tree, relative to the build context
    pub source: PathBuf,
    /// Image-absolute working directory
    pub workdir: String,
    /// Entry script, relative to the workdir
    pub entrypoint: String,
}

impl Default for AppSection {
    fn default() -> Self {
        Self {
            source: PathBuf::from("."),
            workdir: "/app".to_string(),
            entrypoint: "start.sh".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct NetworkSection {
    /// Advisory exposed TCP port
    pub expose: Option<u16>,
}

/// Parsed build recipe
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Recipe {
    pub image: ImageSection,
    pub base: BaseSection,
    #[serde(default)]
    pub dependencies: DependencySection,
    #[serde(default)]
    pub app: AppSection,
    #[serde(default)]
    pub network: NetworkSection,
}

impl Recipe {
    /// Parse and validate the pinned base reference.
    pub fn base_ref(&self) -> StratumResult<BaseRef> {
        BaseRef::parse(&self.base.reference)
    }

    /// The advisory port declaration, if any.
    pub fn port(&self) -> Option<PortDeclaration> {
        self.network.expose.map(PortDeclaration::new)
    }

    /// Structural checks that TOML decoding cannot express.
    pub fn validate(&self, path: &std::path::Path) -> StratumResult<()> {
        let invalid = |message: String| StratumError::InvalidRecipe {
            path: path.to_path_buf(),
            message,
        };

        if self.image.name.is_empty()
            || !self
                .image
                .name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
        {
            return Err(invalid(format!(
                "image name '{}' must be non-empty and use [a-zA-Z0-9._-]",
                self.image.name
            )));
        }

        self.base_ref()?;

        if !self.app.workdir.starts_with('/') {
            return Err(invalid(format!(
                "app.workdir '{}' must be image-absolute",
                self.app.workdir
            )));
        }
        if !self.dependencies.install_root.starts_with('/') {
            return Err(invalid(format!(
                "dependencies.install_root '{}' must be image-absolute",
                self.dependencies.install_root
            )));
        }
        if self.app.entrypoint.is_empty() || self.app.entrypoint.starts_with('/') {
            return Err(invalid(format!(
                "app.entrypoint '{}' must be relative to the workdir",
                self.app.entrypoint
            )));
        }
        if self.dependencies.manifest.is_absolute() {
            return Err(invalid(format!(
                "dependencies.manifest '{}' must be relative to the context",
                self.dependencies.manifest.display()
            )));
        }
        if self.app.source.is_absolute() {
            return Err(invalid(format!(
                "app.source '{}' must be relative to the context",
                self.app.source.display()
            )));
        }

        Ok(())
    }
}
