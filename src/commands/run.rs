//! Run command handler

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::Result;

use crate::application::RunUseCase;
use crate::infrastructure::Store;
use crate::ui;

pub fn cmd_run(image_name: &str, store_root: Option<PathBuf>, json: bool) -> Result<()> {
    let store = Store::open(store_root)?;
    let image = store.load_image(image_name)?;

    let stop = Arc::new(AtomicBool::new(false));
    let stop_handler = stop.clone();
    ctrlc::set_handler(move || {
        stop_handler.store(true, Ordering::SeqCst);
    })?;

    if !json {
        println!("{} Stratum Run", ui::glyph("🚀", "::"));
        println!("Image: {}", image.name);
        println!(
            "Entry: {} (workdir {})",
            image.config.entrypoint, image.config.workdir
        );
        if let Some(port) = image.config.exposed_port {
            println!("Declared port: {} (advisory)", port);
        }
        println!();
    }

    let outcome = RunUseCase::new(&store).launch(&image, &stop)?;

    if json {
        ui::emit(serde_json::json!({
            "event": "run",
            "container": outcome.container_id,
            "exit_code": outcome.exit_code,
            "interrupted": outcome.interrupted,
        }))?;
    } else if outcome.interrupted {
        eprintln!("interrupted; container {} stopped", outcome.container_id);
    } else {
        println!(
            "container {} exited with code {}",
            outcome.container_id, outcome.exit_code
        );
    }

    if outcome.exit_code != 0 {
        std::process::exit(outcome.exit_code);
    }
    Ok(())
}
