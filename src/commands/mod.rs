//! Command handlers invoked from the CLI entry point

pub mod build;
pub mod images;
pub mod plan;
pub mod probe;
pub mod run;

pub use build::cmd_build;
pub use images::cmd_images;
pub use plan::cmd_plan;
pub use probe::cmd_probe;
pub use run::cmd_run;
