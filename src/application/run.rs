//! Container run use case
//!
//! Launching is a two-state machine: a container is Stopped until the entry
//! script process spawns, Running until that process exits, then Stopped
//! again with the observed exit code. Preflight failures (script missing or
//! not executable) abort the start immediately; they never hang and never
//! spawn. No restart policy exists at this layer.

use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use crate::domain::entities::Image;
use crate::domain::ports::FileSystem;
use crate::error::{StratumError, StratumResult};
use crate::infrastructure::{LocalFs, Store};

use super::build::image_relative;

/// Exit code reported when the entry process is terminated by an interrupt
pub const INTERRUPT_EXIT_CODE: i32 = 130;

/// Container lifecycle states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerState {
    Stopped,
    Running,
}

/// Tracks the legal Stopped -> Running -> Stopped transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContainerLifecycle {
    state: ContainerState,
}

impl ContainerLifecycle {
    pub fn new() -> Self {
        Self {
            state: ContainerState::Stopped,
        }
    }

    pub fn state(&self) -> ContainerState {
        self.state
    }

    /// Stopped -> Running. Returns false if already running.
    pub fn start(&mut self) -> bool {
        match self.state {
            ContainerState::Stopped => {
                self.state = ContainerState::Running;
                true
            }
            ContainerState::Running => false,
        }
    }

    /// Running -> Stopped.
    pub fn exit(&mut self) {
        self.state = ContainerState::Stopped;
    }
}

impl Default for ContainerLifecycle {
    fn default() -> Self {
        Self::new()
    }
}

/// A materialized container ready to launch
#[derive(Debug, Clone)]
pub struct PreparedContainer {
    pub id: String,
    pub rootfs: PathBuf,
    pub workdir: PathBuf,
    pub entry_script: PathBuf,
}

/// Result of supervising one container run
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub container_id: String,
    pub exit_code: i32,
    pub interrupted: bool,
}

/// Materializes and supervises container instances
pub struct RunUseCase<'a> {
    store: &'a Store,
    fs: LocalFs,
}

impl<'a> RunUseCase<'a> {
    pub fn new(store: &'a Store) -> Self {
        Self {
            store,
            fs: LocalFs::new(),
        }
    }

    /// Materialize a rootfs from the image's top layer and verify the
    /// launch preconditions.
    pub fn prepare(&self, image: &Image) -> StratumResult<PreparedContainer> {
        let top = image.top_layer().ok_or_else(|| StratumError::CorruptImage {
            path: PathBuf::from(&image.name),
            message: "image has no layers".to_string(),
        })?;

        let layer_fs = self.store.layer_fs(top.digest());
        if !layer_fs.is_dir() {
            return Err(StratumError::CorruptImage {
                path: layer_fs,
                message: "layer snapshot missing from store".to_string(),
            });
        }

        let (id, rootfs) = self.store.new_container_dir(&image.name)?;
        self.fs.copy_dir(&layer_fs, &rootfs)?;

        let workdir = rootfs.join(image_relative(&image.config.workdir));
        let entry_script = workdir.join(&image.config.entrypoint);
        self.preflight(image, &entry_script)?;

        Ok(PreparedContainer {
            id,
            rootfs,
            workdir,
            entry_script,
        })
    }

    fn preflight(&self, image: &Image, entry_script: &Path) -> StratumResult<()> {
        let image_path = Path::new(&image.config.workdir).join(&image.config.entrypoint);

        if !entry_script.is_file() {
            return Err(StratumError::EntryScriptMissing { path: image_path });
        }
        if !self.fs.is_executable(entry_script)? {
            return Err(StratumError::EntryScriptNotExecutable { path: image_path });
        }
        Ok(())
    }

    /// Launch the entry process and supervise it until exit.
    ///
    /// The script is invoked with no arguments, cwd set to the image
    /// workdir, environment inherited. The outcome's exit code is the
    /// script's own; `stop` terminates the child and reports an interrupt.
    pub fn launch(&self, image: &Image, stop: &AtomicBool) -> StratumResult<RunOutcome> {
        let prepared = self.prepare(image)?;
        let mut lifecycle = ContainerLifecycle::new();

        let mut child = Command::new(&prepared.entry_script)
            .current_dir(&prepared.workdir)
            .spawn()?;
        lifecycle.start();

        loop {
            if let Some(status) = child.try_wait()? {
                lifecycle.exit();
                return Ok(RunOutcome {
                    container_id: prepared.id,
                    exit_code: status.code().unwrap_or(1),
                    interrupted: false,
                });
            }

            if stop.load(Ordering::SeqCst) {
                let _ = child.kill();
                let _ = child.wait();
                lifecycle.exit();
                return Ok(RunOutcome {
                    container_id: prepared.id,
                    exit_code: INTERRUPT_EXIT_CODE,
                    interrupted: true,
                });
            }

            std::thread::sleep(Duration::from_millis(25));
        }
    }
}
