//! Recipe loading
//!
//! Unknown keys are collected as non-fatal warnings with a did-you-mean
//! suggestion, so a typo'd `expose` never silently drops a declaration.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{StratumError, StratumResult};

use super::types::Recipe;

/// Non-fatal recipe warning surfaced to CLI users.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeWarning {
    pub key: String,
    pub file: PathBuf,
    pub line: Option<usize>,
    pub suggestion: Option<String>,
}

/// Load a recipe and collect non-fatal warnings (e.g. unknown keys).
pub fn load_with_warnings(path: &Path) -> StratumResult<(Recipe, Vec<RecipeWarning>)> {
    let content = fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            StratumError::InvalidRecipe {
                path: path.to_path_buf(),
                message: "recipe file not found".to_string(),
            }
        } else {
            StratumError::Io(e)
        }
    })?;

    let (recipe, warnings) = parse_with_warnings(&content, path)?;
    recipe.validate(path)?;
    Ok((recipe, warnings))
}

/// Load a recipe, discarding warnings.
pub fn load(path: &Path) -> StratumResult<Recipe> {
    load_with_warnings(path).map(|(recipe, _)| recipe)
}

/// Parse recipe text. Exposed separately for fuzzing.
pub fn parse_with_warnings(
    content: &str,
    path: &Path,
) -> StratumResult<(Recipe, Vec<RecipeWarning>)> {
    let mut unknown_paths: Vec<String> = Vec::new();
    let deserializer = toml::de::Deserializer::new(content);

    let recipe: Recipe = serde_ignored::deserialize(deserializer, |p| {
        unknown_paths.push(p.to_string());
    })
    .map_err(|e| StratumError::InvalidRecipe {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let warnings = unknown_paths
        .into_iter()
        .map(|path_str| {
            let key = path_str
                .split('.')
                .next_back()
                .unwrap_or(path_str.as_str())
                .to_string();
            RecipeWarning {
                key: key.clone(),
                file: path.to_path_buf(),
                line: find_line_number(content, &key),
                suggestion: suggest_key(&key),
            }
        })
        .collect();

    Ok((recipe, warnings))
}

fn find_line_number(content: &str, needle: &str) -> Option<usize> {
    for (i, line) in content.lines().enumerate() {
        if line.contains(needle) {
            return Some(i + 1);
        }
    }
    None
}

fn suggest_key(unknown: &str) -> Option<String> {
    const CANDIDATES: &[&str] = &[
        "image",
        "name",
        "base",
        "reference",
        "dependencies",
        "manifest",
        "install_root",
        "app",
        "source",
        "workdir",
        "entrypoint",
        "network",
        "expose",
    ];

    let mut best: Option<(&str, usize)> = None;
    for candidate in CANDIDATES {
        let dist = levenshtein(unknown, candidate);
        best = match best {
            None => Some((candidate, dist)),
            Some((_, best_dist)) if dist < best_dist => Some((candidate, dist)),
            Some(current) => Some(current),
        };
    }

    match best {
        Some((candidate, dist)) if dist <= 2 => Some(candidate.to_string()),
        _ => None,
    }
}

fn levenshtein(a: &str, b: &str) -> usize {
    if a == b {
        return 0;
    }

    let a_bytes = a.as_bytes();
    let b_bytes = b.as_bytes();

    let mut prev: Vec<usize> = (0..=b_bytes.len()).collect();
    let mut curr = vec![0usize; b_bytes.len() + 1];

    for (i, &ac) in a_bytes.iter().enumerate() {
        curr[0] = i + 1;
        for (j, &bc) in b_bytes.iter().enumerate() {
            let cost = if ac == bc { 0 } else { 1 };
            curr[j + 1] =
                std::cmp::min(std::cmp::min(prev[j + 1] + 1, curr[j] + 1), prev[j] + cost);
        }
        prev.clone_from_slice(&curr);
    }

    prev[b_bytes.len()]
}
