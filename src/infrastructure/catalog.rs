//! Directory-backed runtime catalog
//!
//! Runtimes live at `<root>/<name>/<tag>/` with the runtime's filesystem
//! directly inside. An unknown reference fails fast.

use std::path::PathBuf;

use crate::domain::ports::RuntimeCatalog;
use crate::domain::value_objects::BaseRef;
use crate::error::{StratumError, StratumResult};

/// Runtime catalog rooted at a local directory
#[derive(Debug, Clone)]
pub struct DirCatalog {
    root: PathBuf,
}

impl DirCatalog {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }
}

impl RuntimeCatalog for DirCatalog {
    fn resolve(&self, base: &BaseRef) -> StratumResult<PathBuf> {
        let path = self.root.join(base.name()).join(base.tag());
        if path.is_dir() {
            Ok(path)
        } else {
            Err(StratumError::UnresolvedBase {
                reference: base.to_string(),
                catalog: self.root.clone(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn resolve_known_runtime() {
        let dir = tempdir().unwrap();
        let runtime = dir.path().join("python-slim/3.11");
        fs::create_dir_all(&runtime).unwrap();

        let catalog = DirCatalog::new(dir.path().to_path_buf());
        let resolved = catalog
            .resolve(&BaseRef::parse("python-slim:3.11").unwrap())
            .unwrap();

        assert_eq!(resolved, runtime);
    }

    #[test]
    fn resolve_unknown_tag_fails_fast() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("python-slim/3.11")).unwrap();

        let catalog = DirCatalog::new(dir.path().to_path_buf());
        let err = catalog
            .resolve(&BaseRef::parse("python-slim:3.12").unwrap())
            .unwrap_err();

        assert!(matches!(err, StratumError::UnresolvedBase { .. }));
    }
}
