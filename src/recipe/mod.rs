//! Build recipe (`stratum.toml`) types and loading

pub mod loader;
pub mod types;

pub use loader::{load, load_with_warnings, parse_with_warnings, RecipeWarning};
pub use types::{AppSection, BaseSection, DependencySection, ImageSection, NetworkSection, Recipe};
