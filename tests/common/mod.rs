//! Common test utilities for Stratum CLI tests.
//!
//! Provides `TestEnv` - an isolated project directory plus an isolated
//! store, a builder to seed runtimes/packages/sources, and helpers to run
//! the stratum binary and inspect what a build published.

#![allow(dead_code)]

use std::fs;
use std::path::PathBuf;
use std::process::{Command, Output};
use tempfile::TempDir;

/// Result of running a Stratum CLI command
#[derive(Debug)]
pub struct TestResult {
    pub success: bool,
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl TestResult {
    pub fn combined_output(&self) -> String {
        format!("{}\n{}", self.stdout, self.stderr)
    }

    /// Parse stdout as a single JSON event envelope.
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(self.stdout.trim())
            .unwrap_or_else(|e| panic!("stdout is not JSON ({e}): {:?}", self.stdout))
    }
}

/// Isolated test environment: a project directory and a store directory.
pub struct TestEnv {
    pub project: TempDir,
    pub store: TempDir,
}

impl TestEnv {
    pub fn builder() -> TestEnvBuilder {
        TestEnvBuilder::new()
    }

    pub fn project_path(&self, relative: &str) -> PathBuf {
        self.project.path().join(relative)
    }

    pub fn store_path(&self, relative: &str) -> PathBuf {
        self.store.path().join(relative)
    }

    /// Run stratum in this environment from the project root.
    pub fn run(&self, args: &[&str]) -> TestResult {
        let output = Command::new(env!("CARGO_BIN_EXE_stratum"))
            .current_dir(self.project.path())
            .env("STRATUM_STORE", self.store.path())
            .args(args)
            .output()
            .expect("Failed to execute stratum");

        self.output_to_result(output)
    }

    fn output_to_result(&self, output: Output) -> TestResult {
        TestResult {
            success: output.status.success(),
            exit_code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        }
    }

    pub fn write_project_file(&self, relative: &str, content: &str) {
        let path = self.project_path(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create directories");
        }
        fs::write(&path, content).expect("Failed to write file");
    }

    pub fn remove_project_file(&self, relative: &str) {
        let path = self.project_path(relative);
        if path.exists() {
            fs::remove_file(&path).expect("Failed to remove file");
        }
    }

    pub fn seed_runtime(&self, name: &str, tag: &str, files: &[(&str, &str)]) {
        for (rel, content) in files {
            let path = self
                .store
                .path()
                .join("runtimes")
                .join(name)
                .join(tag)
                .join(rel);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).expect("Failed to create runtime dirs");
            }
            fs::write(&path, content).expect("Failed to seed runtime file");
        }
    }

    pub fn seed_package(&self, name: &str, version: &str, files: &[(&str, &str)]) {
        for (rel, content) in files {
            let path = self
                .store
                .path()
                .join("index")
                .join(name)
                .join(version)
                .join(rel);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).expect("Failed to create index dirs");
            }
            fs::write(&path, content).expect("Failed to seed package file");
        }
    }

    /// Whether a published image record exists.
    pub fn has_image(&self, name: &str) -> bool {
        self.store
            .path()
            .join("images")
            .join(format!("{name}.json"))
            .is_file()
    }

    /// Names of all published images in the store.
    pub fn published_images(&self) -> Vec<String> {
        let dir = self.store.path().join("images");
        let mut names = Vec::new();
        if let Ok(entries) = fs::read_dir(&dir) {
            for entry in entries.flatten() {
                let path = entry.path();
                if path.extension().and_then(|e| e.to_str()) == Some("json") {
                    if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                        names.push(stem.to_string());
                    }
                }
            }
        }
        names.sort();
        names
    }

    /// Load a published image record as JSON.
    pub fn image_record(&self, name: &str) -> serde_json::Value {
        let path = self.store.path().join("images").join(format!("{name}.json"));
        let content = fs::read_to_string(&path)
            .unwrap_or_else(|e| panic!("Failed to read image record {}: {e}", path.display()));
        serde_json::from_str(&content).expect("Image record is not valid JSON")
    }

    /// Layer digests of a published image, in stack order.
    pub fn layer_digests(&self, name: &str) -> Vec<String> {
        self.image_record(name)["layers"]
            .as_array()
            .expect("layers array")
            .iter()
            .map(|l| l["digest"].as_str().expect("digest string").to_string())
            .collect()
    }

    /// Filesystem root of a published image's top layer.
    pub fn top_layer_fs(&self, name: &str) -> PathBuf {
        let digests = self.layer_digests(name);
        let top = digests.last().expect("image has layers");
        let hex = top.strip_prefix("sha256:").unwrap_or(top);
        self.store.path().join("layers").join(hex).join("fs")
    }
}

/// Builder for TestEnv with a ready-to-build default project.
///
/// The default project mirrors a small bot service: a pinned runtime, a
/// requirements manifest resolvable from the seeded index, a source tree,
/// and a `start.sh` entry script. Each piece can be replaced or removed.
pub struct TestEnvBuilder {
    recipe: Option<String>,
    manifest: Option<String>,
    entry_script: Option<String>,
    source_files: Vec<(String, String)>,
    seed_defaults: bool,
}

pub const DEFAULT_RECIPE: &str = r#"[image]
name = "lego-bot"

[base]
reference = "python-slim:3.11"

[dependencies]
manifest = "requirements.txt"

[app]
entrypoint = "start.sh"

[network]
expose = 80
"#;

pub const DEFAULT_MANIFEST: &str = "aiogram==3.4.1\naiohttp\n# timezone data\npytz\n";

pub const DEFAULT_ENTRY_SCRIPT: &str = "#!/bin/sh\nexit 0\n";

impl TestEnvBuilder {
    pub fn new() -> Self {
        Self {
            recipe: Some(DEFAULT_RECIPE.to_string()),
            manifest: Some(DEFAULT_MANIFEST.to_string()),
            entry_script: Some(DEFAULT_ENTRY_SCRIPT.to_string()),
            source_files: vec![("bot.py".to_string(), "print('bot')\n".to_string())],
            seed_defaults: true,
        }
    }

    pub fn with_recipe(mut self, content: &str) -> Self {
        self.recipe = Some(content.to_string());
        self
    }

    pub fn with_manifest(mut self, content: &str) -> Self {
        self.manifest = Some(content.to_string());
        self
    }

    pub fn without_manifest(mut self) -> Self {
        self.manifest = None;
        self
    }

    pub fn with_entry_script(mut self, content: &str) -> Self {
        self.entry_script = Some(content.to_string());
        self
    }

    pub fn without_entry_script(mut self) -> Self {
        self.entry_script = None;
        self
    }

    pub fn with_source_file(mut self, name: &str, content: &str) -> Self {
        self.source_files.push((name.to_string(), content.to_string()));
        self
    }

    /// Skip seeding the default runtime and packages.
    pub fn bare_store(mut self) -> Self {
        self.seed_defaults = false;
        self
    }

    pub fn build(self) -> TestEnv {
        let env = TestEnv {
            project: TempDir::new().expect("Failed to create project temp dir"),
            store: TempDir::new().expect("Failed to create store temp dir"),
        };

        if let Some(recipe) = &self.recipe {
            env.write_project_file("stratum.toml", recipe);
        }
        if let Some(manifest) = &self.manifest {
            env.write_project_file("requirements.txt", manifest);
        }
        if let Some(script) = &self.entry_script {
            env.write_project_file("start.sh", script);
        }
        for (name, content) in &self.source_files {
            env.write_project_file(name, content);
        }

        if self.seed_defaults {
            env.seed_runtime(
                "python-slim",
                "3.11",
                &[
                    ("bin/python3", "#!/bin/true\n"),
                    ("lib/os.py", "# stdlib\n"),
                ],
            );
            env.seed_package("aiogram", "3.4.1", &[("aiogram/__init__.py", "VERSION = '3.4.1'\n")]);
            env.seed_package("aiohttp", "3.8.0", &[("VERSION", "3.8.0\n")]);
            env.seed_package("aiohttp", "3.9.5", &[("VERSION", "3.9.5\n")]);
            env.seed_package("pytz", "2024.1", &[("pytz/__init__.py", "# tz\n")]);
        }

        env
    }
}

impl Default for TestEnvBuilder {
    fn default() -> Self {
        Self::new()
    }
}
