//! CLI output helpers
//!
//! Human output uses unicode markers only when stdout is a terminal; JSON
//! mode emits one event envelope per line.

use std::path::Path;

use is_terminal::IsTerminal;

use crate::recipe::RecipeWarning;

/// Whether stdout is an interactive terminal.
pub fn stdout_is_tty() -> bool {
    std::io::stdout().is_terminal()
}

/// Pick a marker glyph: unicode on a TTY, plain ASCII otherwise.
pub fn glyph(tty: &'static str, plain: &'static str) -> &'static str {
    if stdout_is_tty() {
        tty
    } else {
        plain
    }
}

/// Emit one JSON event envelope.
pub fn emit(value: serde_json::Value) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string(&value)?);
    Ok(())
}

/// Print non-fatal recipe warnings to stderr.
pub fn print_recipe_warnings(path: &Path, warnings: &[RecipeWarning]) {
    for w in warnings {
        if let Some(line) = w.line {
            eprintln!(
                "warning: unknown recipe key '{}' in {}:{}",
                w.key,
                path.display(),
                line
            );
        } else {
            eprintln!(
                "warning: unknown recipe key '{}' in {}",
                w.key,
                path.display()
            );
        }

        if let Some(suggestion) = &w.suggestion {
            eprintln!("   did you mean '{}'?", suggestion);
        }
    }
}
