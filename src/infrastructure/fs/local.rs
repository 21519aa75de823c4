//! Local File System Implementation
//!
//! Implements the FileSystem port for local disk operations: recursive
//! copies that preserve permission bits, ignore-aware source walks, atomic
//! writes, and deterministic tree digesting.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use ignore::WalkBuilder;

use crate::domain::ports::FileSystem;
use crate::domain::value_objects::{TreeDigest, TreeEntry};
use crate::error::{StratumError, StratumResult};

/// Ignore file honored when copying a source tree into an image
pub const IGNORE_FILE: &str = ".stratumignore";

/// Local file system implementation
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFs;

impl LocalFs {
    pub fn new() -> Self {
        Self
    }

    /// Write content to a file atomically (tempfile + rename).
    pub fn atomic_write(&self, path: &Path, content: &[u8]) -> StratumResult<()> {
        let parent = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&parent)?;

        let mut tmp = tempfile::NamedTempFile::new_in(&parent)?;
        tmp.write_all(content)?;
        tmp.persist(path).map_err(|e| StratumError::Io(e.error))?;
        Ok(())
    }
}

impl FileSystem for LocalFs {
    fn copy_dir(&self, src: &Path, dst: &Path) -> StratumResult<()> {
        fs::create_dir_all(dst)?;
        for entry in fs::read_dir(src)? {
            let entry = entry?;
            let file_type = entry.file_type()?;
            let to = dst.join(entry.file_name());

            if file_type.is_dir() {
                self.copy_dir(&entry.path(), &to)?;
            } else if file_type.is_symlink() {
                copy_symlink(&entry.path(), &to)?;
            } else {
                fs::copy(entry.path(), &to)?;
            }
        }
        Ok(())
    }

    fn copy_source_tree(&self, src: &Path, dst: &Path) -> StratumResult<()> {
        fs::create_dir_all(dst)?;

        let mut builder = WalkBuilder::new(src);
        builder
            .standard_filters(false)
            .add_custom_ignore_filename(IGNORE_FILE);

        for result in builder.build() {
            let entry = result.map_err(|e| std::io::Error::other(e.to_string()))?;
            let rel = match entry.path().strip_prefix(src) {
                Ok(rel) if !rel.as_os_str().is_empty() => rel.to_path_buf(),
                _ => continue,
            };
            let to = dst.join(&rel);

            let Some(file_type) = entry.file_type() else {
                continue;
            };

            if file_type.is_dir() {
                fs::create_dir_all(&to)?;
            } else if file_type.is_symlink() {
                if let Some(parent) = to.parent() {
                    fs::create_dir_all(parent)?;
                }
                copy_symlink(entry.path(), &to)?;
            } else {
                if let Some(parent) = to.parent() {
                    fs::create_dir_all(parent)?;
                }
                fs::copy(entry.path(), &to)?;
            }
        }
        Ok(())
    }

    fn copy_file(&self, src: &Path, dst: &Path) -> StratumResult<()> {
        if let Some(parent) = dst.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::copy(src, dst)?;
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    #[cfg(unix)]
    fn set_executable(&self, path: &Path) -> StratumResult<()> {
        use std::os::unix::fs::PermissionsExt;
        let mut perms = fs::metadata(path)?.permissions();
        perms.set_mode(perms.mode() | 0o755);
        fs::set_permissions(path, perms)?;
        Ok(())
    }

    #[cfg(not(unix))]
    fn set_executable(&self, _path: &Path) -> StratumResult<()> {
        Ok(())
    }

    #[cfg(unix)]
    fn is_executable(&self, path: &Path) -> StratumResult<bool> {
        use std::os::unix::fs::PermissionsExt;
        let mode = fs::metadata(path)?.permissions().mode();
        Ok(mode & 0o111 != 0)
    }

    #[cfg(not(unix))]
    fn is_executable(&self, path: &Path) -> StratumResult<bool> {
        Ok(path.is_file())
    }

    fn hash_tree(&self, root: &Path) -> StratumResult<TreeDigest> {
        let mut entries = Vec::new();
        collect_entries(root, root, &mut entries)?;
        Ok(TreeDigest::from_entries(entries))
    }

    fn remove_dir_all(&self, path: &Path) -> StratumResult<()> {
        if path.exists() {
            fs::remove_dir_all(path)?;
        }
        Ok(())
    }
}

#[cfg(unix)]
fn copy_symlink(src: &Path, dst: &Path) -> StratumResult<()> {
    let target = fs::read_link(src)?;
    if dst.exists() {
        fs::remove_file(dst)?;
    }
    std::os::unix::fs::symlink(target, dst)?;
    Ok(())
}

#[cfg(not(unix))]
fn copy_symlink(src: &Path, dst: &Path) -> StratumResult<()> {
    fs::copy(src, dst)?;
    Ok(())
}

fn collect_entries(root: &Path, dir: &Path, out: &mut Vec<TreeEntry>) -> StratumResult<()> {
    let mut children: Vec<fs::DirEntry> = fs::read_dir(dir)?.collect::<Result<_, _>>()?;
    children.sort_by_key(|e| e.file_name());

    for child in children {
        let path = child.path();
        let rel = match path.strip_prefix(root) {
            Ok(rel) => rel.to_string_lossy().replace('\\', "/"),
            Err(_) => continue,
        };
        let file_type = child.file_type()?;

        if file_type.is_dir() {
            out.push(TreeEntry::Dir { path: rel });
            collect_entries(root, &path, out)?;
        } else if file_type.is_symlink() {
            let target = fs::read_link(&path)?.to_string_lossy().into_owned();
            out.push(TreeEntry::Link { path: rel, target });
        } else {
            out.push(TreeEntry::File {
                path: rel,
                executable: file_executable(&path)?,
                content: fs::read(&path)?,
            });
        }
    }
    Ok(())
}

#[cfg(unix)]
fn file_executable(path: &Path) -> StratumResult<bool> {
    use std::os::unix::fs::PermissionsExt;
    Ok(fs::metadata(path)?.permissions().mode() & 0o100 != 0)
}

#[cfg(not(unix))]
fn file_executable(_path: &Path) -> StratumResult<bool> {
    Ok(false)
}
