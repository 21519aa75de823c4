//! Presentation helpers shared by the CLI commands

pub mod output;

pub use output::{emit, glyph, print_recipe_warnings, stdout_is_tty};
