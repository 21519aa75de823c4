//! On-disk store
//!
//! Layout under the store root (`$STRATUM_STORE` or `~/.stratum`):
//!
//! ```text
//! layers/<digest-hex>/fs/   committed snapshots, content-addressed
//! images/<name>.json        published image records
//! runtimes/<name>/<tag>/    base runtime catalog
//! index/<pkg>/<version>/    package index payloads
//! containers/<id>/rootfs/   materialized container instances
//! staging/                  in-flight build snapshots
//! ```
//!
//! Committed layers are never rewritten; committing identical content
//! resolves to the already-stored snapshot. Image records are written
//! atomically and only after a build fully succeeds.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use fs2::FileExt;

use crate::domain::entities::{Image, Layer};
use crate::domain::ports::FileSystem;
use crate::domain::value_objects::TreeDigest;
use crate::error::{StratumError, StratumResult};
use crate::infrastructure::fs::LocalFs;

static STAGING_SEQ: AtomicU64 = AtomicU64::new(0);

/// Exclusive advisory lock held for the duration of a build
#[derive(Debug)]
pub struct StoreLock {
    file: fs::File,
}

impl Drop for StoreLock {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
    }
}

/// The on-disk store
#[derive(Debug, Clone)]
pub struct Store {
    root: PathBuf,
}

impl Store {
    /// Open (creating if needed) the store at `override_root`, falling back
    /// to `$STRATUM_STORE`, then `~/.stratum`.
    pub fn open(override_root: Option<PathBuf>) -> StratumResult<Self> {
        let root = override_root
            .or_else(|| std::env::var_os("STRATUM_STORE").map(PathBuf::from))
            .or_else(|| dirs::home_dir().map(|home| home.join(".stratum")))
            .ok_or_else(|| {
                StratumError::Io(std::io::Error::other(
                    "could not determine a store root (no home directory)",
                ))
            })?;

        let store = Self { root };
        for dir in [
            store.layers_dir(),
            store.images_dir(),
            store.runtimes_dir(),
            store.index_dir(),
            store.containers_dir(),
            store.staging_dir(),
        ] {
            fs::create_dir_all(dir)?;
        }
        Ok(store)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn layers_dir(&self) -> PathBuf {
        self.root.join("layers")
    }

    pub fn images_dir(&self) -> PathBuf {
        self.root.join("images")
    }

    pub fn runtimes_dir(&self) -> PathBuf {
        self.root.join("runtimes")
    }

    pub fn index_dir(&self) -> PathBuf {
        self.root.join("index")
    }

    pub fn containers_dir(&self) -> PathBuf {
        self.root.join("containers")
    }

    pub fn staging_dir(&self) -> PathBuf {
        self.root.join("staging")
    }

    /// Take the exclusive build lock, failing fast if another build holds it.
    pub fn lock(&self) -> StratumResult<StoreLock> {
        let path = self.root.join(".lock");
        let file = fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(&path)?;

        file.try_lock_exclusive().map_err(|e| {
            if e.kind() == std::io::ErrorKind::WouldBlock {
                StratumError::StoreBusy { path: path.clone() }
            } else {
                StratumError::Io(e)
            }
        })?;

        Ok(StoreLock { file })
    }

    /// Allocate a fresh staging directory for one snapshot.
    pub fn new_staging(&self) -> StratumResult<PathBuf> {
        let seq = STAGING_SEQ.fetch_add(1, Ordering::SeqCst);
        let dir = self
            .staging_dir()
            .join(format!("{}-{}", std::process::id(), seq));
        fs::create_dir_all(&dir)?;
        Ok(dir)
    }

    /// Filesystem root of a committed layer.
    pub fn layer_fs(&self, digest: &TreeDigest) -> PathBuf {
        self.layers_dir().join(digest.hex()).join("fs")
    }

    /// Commit a staged snapshot under its content digest.
    ///
    /// Returns the layer plus whether an identical snapshot was already
    /// stored (in which case the staging tree is discarded).
    pub fn commit_layer(
        &self,
        staging: &Path,
        created_by: &str,
    ) -> StratumResult<(Layer, bool)> {
        let local = LocalFs::new();
        let digest = local.hash_tree(staging)?;
        let target = self.layer_fs(&digest);

        let reused = target.is_dir();
        if reused {
            local.remove_dir_all(staging)?;
        } else {
            let layer_dir = self.layers_dir().join(digest.hex());
            fs::create_dir_all(&layer_dir)?;
            fs::rename(staging, &target)?;
        }

        Ok((Layer::new(digest, created_by), reused))
    }

    fn image_record_path(&self, name: &str) -> StratumResult<PathBuf> {
        if name.is_empty()
            || !name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
        {
            return Err(StratumError::ImageNotFound {
                name: name.to_string(),
            });
        }
        Ok(self.images_dir().join(format!("{name}.json")))
    }

    /// Atomically publish an image record.
    pub fn publish_image(&self, image: &Image) -> StratumResult<PathBuf> {
        let path = self.image_record_path(&image.name)?;
        let mut json = serde_json::to_vec_pretty(image)?;
        json.push(b'\n');
        LocalFs::new().atomic_write(&path, &json)?;
        Ok(path)
    }

    pub fn load_image(&self, name: &str) -> StratumResult<Image> {
        let path = self.image_record_path(name)?;
        if !path.is_file() {
            return Err(StratumError::ImageNotFound {
                name: name.to_string(),
            });
        }
        let content = fs::read(&path)?;
        serde_json::from_slice(&content).map_err(|e| StratumError::CorruptImage {
            path,
            message: e.to_string(),
        })
    }

    /// All published images, sorted by name.
    pub fn list_images(&self) -> StratumResult<Vec<Image>> {
        let mut images = Vec::new();
        for entry in fs::read_dir(self.images_dir())? {
            let entry = entry?;
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                images.push(self.load_image(stem)?);
            }
        }
        images.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(images)
    }

    /// Allocate a container instance directory.
    pub fn new_container_dir(&self, image_name: &str) -> StratumResult<(String, PathBuf)> {
        let seq = STAGING_SEQ.fetch_add(1, Ordering::SeqCst);
        let stamp = chrono::Utc::now().format("%Y%m%d%H%M%S");
        let id = format!("{image_name}-{stamp}-{}-{seq}", std::process::id());
        let rootfs = self.containers_dir().join(&id).join("rootfs");
        fs::create_dir_all(&rootfs)?;
        Ok((id, rootfs))
    }
}
