//! Error types for Stratum
//!
//! Uses `thiserror` for library errors; the binary wraps them with `anyhow`.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for Stratum operations
pub type StratumResult<T> = Result<T, StratumError>;

/// Main error type for Stratum operations
#[derive(Error, Debug)]
pub enum StratumError {
    /// Recipe file could not be parsed
    #[error("invalid recipe in {path}: {message}")]
    InvalidRecipe { path: PathBuf, message: String },

    /// Base reference is not pinned to a tag
    #[error("invalid base reference '{reference}' - expected 'name:tag'")]
    InvalidBaseRef { reference: String },

    /// Base runtime is not present in the catalog
    #[error("base runtime '{reference}' not found in catalog {catalog}")]
    UnresolvedBase { reference: String, catalog: PathBuf },

    /// Dependency manifest is missing
    #[error("dependency manifest not found: {path}")]
    ManifestNotFound { path: PathBuf },

    /// Malformed line in the dependency manifest
    #[error("invalid package specifier '{spec}' in {path}:{line}")]
    InvalidPackageSpec {
        spec: String,
        path: PathBuf,
        line: usize,
    },

    /// Package named more than once in the manifest
    #[error("duplicate package '{name}' in {path}:{line}")]
    DuplicatePackage {
        name: String,
        path: PathBuf,
        line: usize,
    },

    /// Package name unknown to the index
    #[error("package '{name}' is not resolvable from index {index}")]
    UnresolvedPackage { name: String, index: PathBuf },

    /// No indexed version satisfies the pinned constraint
    #[error("no version of '{name}' satisfies '{constraint}'")]
    VersionConflict { name: String, constraint: String },

    /// Application source tree is missing
    #[error("source tree not found: {path}")]
    SourceTreeMissing { path: PathBuf },

    /// Entry script absent where a build or run step expects it
    #[error("entry script not found: {path}")]
    EntryScriptMissing { path: PathBuf },

    /// Entry script exists but cannot be executed
    #[error("entry script is not executable: {path}")]
    EntryScriptNotExecutable { path: PathBuf },

    /// No published image under the requested name
    #[error("image not found: {name}")]
    ImageNotFound { name: String },

    /// Image record exists but cannot be decoded
    #[error("corrupt image record {path}: {message}")]
    CorruptImage { path: PathBuf, message: String },

    /// Build graph contains a dependency cycle
    #[error("build graph cycle involving step '{step}'")]
    GraphCycle { step: String },

    /// Step requires an artifact no step produces
    #[error("step '{step}' requires '{artifact}' which no step produces")]
    MissingStepInput { step: String, artifact: String },

    /// Another build holds the store lock
    #[error("store is locked by another process: {path}")]
    StoreBusy { path: PathBuf },

    /// Image declares no port, so there is nothing to probe
    #[error("image '{image}' declares no exposed port")]
    PortUndeclared { image: String },

    /// Declared port did not complete a TCP handshake
    #[error("declared port {port} is not accepting connections: {message}")]
    PortUnreachable { port: u16, message: String },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encoding/decoding error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_error_display_unresolved_base() {
        let err = StratumError::UnresolvedBase {
            reference: "python-slim:3.11".to_string(),
            catalog: PathBuf::from("/store/runtimes"),
        };
        assert_eq!(
            err.to_string(),
            "base runtime 'python-slim:3.11' not found in catalog /store/runtimes"
        );
    }

    #[test]
    fn test_error_display_duplicate_package() {
        let err = StratumError::DuplicatePackage {
            name: "pytz".to_string(),
            path: PathBuf::from("requirements.txt"),
            line: 4,
        };
        assert_eq!(
            err.to_string(),
            "duplicate package 'pytz' in requirements.txt:4"
        );
    }

    #[test]
    fn test_error_display_not_executable() {
        let err = StratumError::EntryScriptNotExecutable {
            path: PathBuf::from("/app/start.sh"),
        };
        assert_eq!(
            err.to_string(),
            "entry script is not executable: /app/start.sh"
        );
    }
}
