//! Images command handler - lists published images

use std::path::PathBuf;

use anyhow::Result;

use crate::infrastructure::Store;
use crate::ui;

pub fn cmd_images(store_root: Option<PathBuf>, json: bool) -> Result<()> {
    let store = Store::open(store_root)?;
    let images = store.list_images()?;

    if json {
        let records: Vec<serde_json::Value> = images
            .iter()
            .map(|image| {
                serde_json::json!({
                    "name": image.name,
                    "base": image.base,
                    "layers": image.layers.len(),
                    "exposed_port": image.config.exposed_port,
                    "created_at": image.created_at.to_rfc3339(),
                })
            })
            .collect();
        ui::emit(serde_json::json!({
            "event": "images",
            "images": records,
        }))?;
        return Ok(());
    }

    if images.is_empty() {
        println!("No images in {}", store.root().display());
        return Ok(());
    }

    println!("{:<24} {:<22} {:>6}  {:>5}", "NAME", "BASE", "LAYERS", "PORT");
    for image in &images {
        let port = image
            .config
            .exposed_port
            .map(|p| p.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<24} {:<22} {:>6}  {:>5}",
            image.name,
            image.base,
            image.layers.len(),
            port
        );
    }

    Ok(())
}
