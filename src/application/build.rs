//! Image build use case
//!
//! Executes the recipe's build graph strictly sequentially: each
//! filesystem step stages a private copy of the prior snapshot, mutates it,
//! and commits it as a new layer. Staging for layer N+1 begins only after
//! layer N is committed. The image record is published last, so a failed
//! build never leaves a partial image behind.

use std::fs;
use std::path::{Path, PathBuf};

use crate::domain::entities::{DependencyManifest, Image, ImageConfig, Layer, LayerStack};
use crate::domain::ports::{FileSystem, PackageIndex, RuntimeCatalog};
use crate::domain::services::{BuildGraph, StepId};
use crate::error::{StratumError, StratumResult};
use crate::infrastructure::{LocalFs, Store};
use crate::recipe::Recipe;

/// One committed layer plus whether the store already held it
#[derive(Debug, Clone)]
pub struct LayerOutcome {
    pub layer: Layer,
    pub reused: bool,
}

/// Result of a successful build
#[derive(Debug, Clone)]
pub struct BuildReport {
    pub image: Image,
    pub layers: Vec<LayerOutcome>,
    pub record_path: PathBuf,
}

/// Coordinates catalog, index, store, and filesystem for one build
pub struct BuildUseCase<'a> {
    store: &'a Store,
    catalog: &'a dyn RuntimeCatalog,
    index: &'a dyn PackageIndex,
    fs: LocalFs,
}

impl<'a> BuildUseCase<'a> {
    pub fn new(
        store: &'a Store,
        catalog: &'a dyn RuntimeCatalog,
        index: &'a dyn PackageIndex,
    ) -> Self {
        Self {
            store,
            catalog,
            index,
            fs: LocalFs::new(),
        }
    }

    /// Build the recipe against a context directory.
    pub fn execute(&self, recipe: &Recipe, context: &Path) -> StratumResult<BuildReport> {
        let mut staged: Vec<PathBuf> = Vec::new();
        let result = self.execute_inner(recipe, context, &mut staged);

        if result.is_err() {
            for dir in staged {
                let _ = self.fs.remove_dir_all(&dir);
            }
        }
        result
    }

    fn execute_inner(
        &self,
        recipe: &Recipe,
        context: &Path,
        staged: &mut Vec<PathBuf>,
    ) -> StratumResult<BuildReport> {
        let graph = BuildGraph::for_recipe();
        let order = graph.execution_order()?;

        let mut layers = LayerStack::new();
        let mut outcomes: Vec<LayerOutcome> = Vec::new();
        let mut prior_fs: Option<PathBuf> = None;
        let mut exposed_port = None;

        for node in order {
            if !node.id.commits_layer() {
                // Metadata-only step: attach the declaration, no snapshot.
                debug_assert_eq!(node.id, StepId::DeclarePort);
                exposed_port = recipe.port();
                continue;
            }

            let stage = self.stage_from(prior_fs.as_deref())?;
            staged.push(stage.clone());

            match node.id {
                StepId::ProvisionBase => self.provision_base(recipe, &stage)?,
                StepId::StageManifest => self.stage_manifest(recipe, context, &stage)?,
                StepId::InstallDependencies => self.install_dependencies(recipe, &stage)?,
                StepId::CopySource => self.copy_source(recipe, context, &stage)?,
                StepId::NormalizeEntrypoint => self.normalize_entrypoint(recipe, &stage)?,
                StepId::DeclarePort => unreachable!("metadata step handled above"),
            }

            let (layer, reused) = self.store.commit_layer(&stage, node.id.as_str())?;
            prior_fs = Some(self.store.layer_fs(layer.digest()));
            layers.push(layer.clone());
            outcomes.push(LayerOutcome { layer, reused });
        }

        let image = Image::new(
            recipe.image.name.clone(),
            recipe.base.reference.clone(),
            ImageConfig {
                workdir: recipe.app.workdir.clone(),
                entrypoint: recipe.app.entrypoint.clone(),
                exposed_port,
            },
            layers,
        );
        let record_path = self.store.publish_image(&image)?;

        Ok(BuildReport {
            image,
            layers: outcomes,
            record_path,
        })
    }

    /// Allocate a staging tree seeded from the prior snapshot, if any.
    fn stage_from(&self, prior: Option<&Path>) -> StratumResult<PathBuf> {
        let stage = self.store.new_staging()?;
        if let Some(prior) = prior {
            self.fs.copy_dir(prior, &stage)?;
        }
        Ok(stage)
    }

    fn workdir_in(&self, recipe: &Recipe, stage: &Path) -> PathBuf {
        stage.join(image_relative(&recipe.app.workdir))
    }

    fn staged_manifest_path(&self, recipe: &Recipe, stage: &Path) -> StratumResult<PathBuf> {
        let file_name = recipe
            .dependencies
            .manifest
            .file_name()
            .ok_or_else(|| StratumError::ManifestNotFound {
                path: recipe.dependencies.manifest.clone(),
            })?;
        Ok(self.workdir_in(recipe, stage).join(file_name))
    }

    fn provision_base(&self, recipe: &Recipe, stage: &Path) -> StratumResult<()> {
        let base = recipe.base_ref()?;
        let runtime_root = self.catalog.resolve(&base)?;
        self.fs.copy_dir(&runtime_root, stage)
    }

    fn stage_manifest(
        &self,
        recipe: &Recipe,
        context: &Path,
        stage: &Path,
    ) -> StratumResult<()> {
        let manifest_src = context.join(&recipe.dependencies.manifest);
        if !manifest_src.is_file() {
            return Err(StratumError::ManifestNotFound { path: manifest_src });
        }

        let target = self.staged_manifest_path(recipe, stage)?;
        self.fs.copy_file(&manifest_src, &target)
    }

    fn install_dependencies(&self, recipe: &Recipe, stage: &Path) -> StratumResult<()> {
        let staged_manifest = self.staged_manifest_path(recipe, stage)?;
        if !staged_manifest.is_file() {
            return Err(StratumError::ManifestNotFound {
                path: staged_manifest,
            });
        }

        let content = fs::read_to_string(&staged_manifest)?;
        let manifest = DependencyManifest::parse(&content, &recipe.dependencies.manifest)?;

        let deps_root = stage.join(image_relative(&recipe.dependencies.install_root));
        let fetch_dir = deps_root.join(".fetch");
        fs::create_dir_all(&fetch_dir)?;

        for spec in manifest.packages() {
            let resolved = self.index.resolve(spec)?;

            let fetched = fetch_dir.join(&resolved.name);
            self.fs.copy_dir(&resolved.payload, &fetched)?;

            let installed = deps_root.join(&resolved.name);
            self.fs.remove_dir_all(&installed)?;
            fs::rename(&fetched, &installed)?;
        }

        // No transient fetch data may survive into the committed layer.
        self.fs.remove_dir_all(&fetch_dir)
    }

    fn copy_source(&self, recipe: &Recipe, context: &Path, stage: &Path) -> StratumResult<()> {
        let source = context.join(&recipe.app.source);
        if !source.is_dir() {
            return Err(StratumError::SourceTreeMissing { path: source });
        }
        self.fs.copy_source_tree(&source, &self.workdir_in(recipe, stage))
    }

    fn normalize_entrypoint(&self, recipe: &Recipe, stage: &Path) -> StratumResult<()> {
        let entry = self.workdir_in(recipe, stage).join(&recipe.app.entrypoint);
        if !entry.is_file() {
            return Err(StratumError::EntryScriptMissing {
                path: Path::new(&recipe.app.workdir).join(&recipe.app.entrypoint),
            });
        }
        self.fs.set_executable(&entry)
    }
}

/// Strip the leading separator so an image-absolute path can be joined
/// under a staging root.
pub(crate) fn image_relative(image_path: &str) -> PathBuf {
    PathBuf::from(image_path.trim_start_matches('/'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::{DirCatalog, DirIndex};
    use tempfile::tempdir;

    const RECIPE: &str = r#"
[image]
name = "lego-bot"

[base]
reference = "python-slim:3.11"

[network]
expose = 80
"#;

    struct Fixture {
        _guard: tempfile::TempDir,
        store: Store,
        context: PathBuf,
        recipe: Recipe,
    }

    fn write(path: &Path, content: &str) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }

    fn fixture() -> Fixture {
        let guard = tempdir().unwrap();
        let store = Store::open(Some(guard.path().join("store"))).unwrap();
        let context = guard.path().join("project");

        write(
            &store.runtimes_dir().join("python-slim/3.11/bin/python3"),
            "runtime payload",
        );
        write(
            &store.index_dir().join("aiogram/3.4.1/aiogram.py"),
            "module",
        );
        write(&store.index_dir().join("pytz/2024.1/pytz.py"), "tzdata");

        write(&context.join("requirements.txt"), "aiogram==3.4.1\npytz\n");
        write(&context.join("bot.py"), "print('bot')\n");
        write(&context.join("start.sh"), "#!/bin/sh\nexec ./bot.py\n");

        let (recipe, _) =
            crate::recipe::parse_with_warnings(RECIPE, Path::new("stratum.toml")).unwrap();

        Fixture {
            _guard: guard,
            store,
            context,
            recipe,
        }
    }

    fn build(fixture: &Fixture) -> StratumResult<BuildReport> {
        let catalog = DirCatalog::new(fixture.store.runtimes_dir());
        let index = DirIndex::new(fixture.store.index_dir());
        BuildUseCase::new(&fixture.store, &catalog, &index)
            .execute(&fixture.recipe, &fixture.context)
    }

    #[test]
    fn build_commits_five_layers_in_step_order() {
        let fixture = fixture();
        let report = build(&fixture).unwrap();

        let steps: Vec<&str> = report
            .image
            .layers
            .iter()
            .map(Layer::created_by)
            .collect();
        assert_eq!(
            steps,
            vec![
                "provision-base",
                "stage-manifest",
                "install-dependencies",
                "copy-source",
                "normalize-entrypoint",
            ]
        );
    }

    #[test]
    fn build_attaches_port_and_publishes_record() {
        let fixture = fixture();
        let report = build(&fixture).unwrap();

        assert_eq!(report.image.config.exposed_port.unwrap().get(), 80);
        assert!(report.record_path.is_file());
        assert_eq!(
            fixture.store.load_image("lego-bot").unwrap(),
            report.image
        );
    }

    #[test]
    fn top_layer_contains_runtime_deps_and_source() {
        let fixture = fixture();
        let report = build(&fixture).unwrap();

        let top = fixture
            .store
            .layer_fs(report.image.top_layer().unwrap().digest());
        assert!(top.join("bin/python3").is_file());
        assert!(top.join("opt/deps/aiogram/aiogram.py").is_file());
        assert!(top.join("opt/deps/pytz/pytz.py").is_file());
        assert!(top.join("app/bot.py").is_file());
        assert!(top.join("app/requirements.txt").is_file());
    }

    #[test]
    fn install_layer_keeps_no_fetch_cache() {
        let fixture = fixture();
        let report = build(&fixture).unwrap();

        for outcome in &report.layers {
            let fs_root = fixture.store.layer_fs(outcome.layer.digest());
            assert!(!fs_root.join("opt/deps/.fetch").exists());
        }
    }

    #[cfg(unix)]
    #[test]
    fn entrypoint_is_executable_in_top_layer() {
        let fixture = fixture();
        let report = build(&fixture).unwrap();

        let top = fixture
            .store
            .layer_fs(report.image.top_layer().unwrap().digest());
        assert!(LocalFs::new()
            .is_executable(&top.join("app/start.sh"))
            .unwrap());
    }

    #[test]
    fn missing_manifest_fails_and_publishes_nothing() {
        let fixture = fixture();
        fs::remove_file(fixture.context.join("requirements.txt")).unwrap();

        match build(&fixture) {
            Err(StratumError::ManifestNotFound { .. }) => {}
            other => panic!("expected ManifestNotFound, got {other:?}"),
        }
        assert!(fixture.store.list_images().unwrap().is_empty());
    }

    #[test]
    fn missing_entry_script_fails_and_publishes_nothing() {
        let fixture = fixture();
        fs::remove_file(fixture.context.join("start.sh")).unwrap();

        match build(&fixture) {
            Err(StratumError::EntryScriptMissing { path }) => {
                assert_eq!(path, PathBuf::from("/app/start.sh"));
            }
            other => panic!("expected EntryScriptMissing, got {other:?}"),
        }
        assert!(fixture.store.list_images().unwrap().is_empty());
    }

    #[test]
    fn failed_build_leaves_no_staging_behind() {
        let fixture = fixture();
        fs::remove_file(fixture.context.join("start.sh")).unwrap();

        let _ = build(&fixture);

        let leftovers: Vec<_> = fs::read_dir(fixture.store.staging_dir())
            .unwrap()
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn rebuild_reuses_all_layers() {
        let fixture = fixture();
        build(&fixture).unwrap();
        let second = build(&fixture).unwrap();

        assert!(second.layers.iter().all(|o| o.reused));
    }

    #[test]
    fn source_edit_changes_only_downstream_layers() {
        let fixture = fixture();
        let first = build(&fixture).unwrap();

        write(&fixture.context.join("bot.py"), "print('changed')\n");
        let second = build(&fixture).unwrap();

        let digests = |r: &BuildReport| -> Vec<String> {
            r.image
                .layers
                .iter()
                .map(|l| l.digest().to_string())
                .collect()
        };
        let (a, b) = (digests(&first), digests(&second));

        assert_eq!(a[..3], b[..3]);
        assert_ne!(a[3], b[3]);
        assert_ne!(a[4], b[4]);
    }
}
