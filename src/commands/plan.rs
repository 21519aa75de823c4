//! Plan command handler - shows the build graph's execution order

use std::path::Path;

use anyhow::Result;

use crate::domain::services::BuildGraph;
use crate::ui;

pub fn cmd_plan(recipe_path: &Path, json: bool) -> Result<()> {
    let (recipe, warnings) = crate::recipe::load_with_warnings(recipe_path)?;
    ui::print_recipe_warnings(recipe_path, &warnings);

    let graph = BuildGraph::for_recipe();
    let order = graph.execution_order()?;

    if json {
        let steps: Vec<serde_json::Value> = order
            .iter()
            .map(|node| {
                serde_json::json!({
                    "step": node.id.as_str(),
                    "requires": node.requires,
                    "produces": node.produces,
                    "commits_layer": node.id.commits_layer(),
                })
            })
            .collect();
        ui::emit(serde_json::json!({
            "event": "plan",
            "image": recipe.image.name,
            "steps": steps,
        }))?;
        return Ok(());
    }

    println!("{} Build plan for '{}'", ui::glyph("🗺", "::"), recipe.image.name);
    println!();
    for (i, node) in order.iter().enumerate() {
        let kind = if node.id.commits_layer() {
            "layer"
        } else {
            "metadata"
        };
        println!("  {}. {:<22} [{}]", i + 1, node.id.as_str(), kind);
        if !node.requires.is_empty() {
            println!("       requires: {}", node.requires.join(", "));
        }
        println!("       produces: {}", node.produces);
    }

    Ok(())
}
