//! Probe command handler - reconciles declared vs. actually-bound port

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;

use crate::application::probe_image;
use crate::infrastructure::Store;
use crate::ui;

pub fn cmd_probe(
    image_name: &str,
    host: &str,
    timeout_ms: u64,
    store_root: Option<PathBuf>,
    json: bool,
) -> Result<()> {
    let store = Store::open(store_root)?;
    let image = store.load_image(image_name)?;

    let report = probe_image(&image, host, Duration::from_millis(timeout_ms))?;

    if json {
        ui::emit(serde_json::json!({
            "event": "probe",
            "image": image.name,
            "host": host,
            "port": report.port,
            "elapsed_ms": report.elapsed_ms,
            "status": "reachable",
        }))?;
    } else {
        println!(
            "{} port {} on {} accepted a connection ({} ms)",
            ui::glyph("✓", "ok:"),
            report.port,
            host,
            report.elapsed_ms
        );
    }

    Ok(())
}
