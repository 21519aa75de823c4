//! Build command handler

use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::application::BuildUseCase;
use crate::infrastructure::{DirCatalog, DirIndex, Store};
use crate::ui;

pub fn cmd_build(
    recipe_path: &Path,
    context: &Path,
    store_root: Option<PathBuf>,
    json: bool,
    verbose: u8,
) -> Result<()> {
    let store = Store::open(store_root)?;
    let (recipe, warnings) = crate::recipe::load_with_warnings(recipe_path)?;
    ui::print_recipe_warnings(recipe_path, &warnings);

    if !json {
        println!("{} Stratum Build", ui::glyph("📦", "::"));
        println!("Recipe: {}", recipe_path.display());
        println!("Context: {}", context.display());
        println!("Base: {}", recipe.base.reference);
    }

    let catalog = DirCatalog::new(store.runtimes_dir());
    let index = DirIndex::new(store.index_dir());

    let _lock = store.lock()?;
    let report = BuildUseCase::new(&store, &catalog, &index).execute(&recipe, context)?;

    if json {
        let layers: Vec<serde_json::Value> = report
            .layers
            .iter()
            .map(|o| {
                serde_json::json!({
                    "digest": o.layer.digest().as_str(),
                    "created_by": o.layer.created_by(),
                    "reused": o.reused,
                })
            })
            .collect();
        ui::emit(serde_json::json!({
            "event": "build",
            "status": "success",
            "image": report.image.name,
            "layers": layers,
            "exposed_port": report.image.config.exposed_port,
        }))?;
        return Ok(());
    }

    println!();
    for outcome in &report.layers {
        let marker = if outcome.reused {
            "cached"
        } else {
            "committed"
        };
        let digest = outcome.layer.digest().hex();
        let short = &digest[..digest.len().min(12)];
        println!("  {} {:<22} {}", marker, outcome.layer.created_by(), short);

        if verbose > 0 {
            println!("           {}", outcome.layer.digest());
        }
    }

    println!();
    if let Some(port) = report.image.config.exposed_port {
        println!("Declared port: {} (advisory)", port);
    }
    println!(
        "{} Published image '{}' ({} layers)",
        ui::glyph("✓", "ok:"),
        report.image.name,
        report.image.layers.len()
    );

    Ok(())
}
