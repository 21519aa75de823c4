//! Stratum CLI - deterministic container image builder and runner
//!
//! Usage: stratum <COMMAND>
//!
//! Commands:
//!   build   Build an image from a recipe
//!   run     Launch a built image's entry process
//!   plan    Show the build graph's execution order
//!   images  List published images
//!   probe   Reconcile an image's declared port against a live socket

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use stratum::commands;

/// Stratum - deterministic container image builder and runner
#[derive(Parser, Debug)]
#[command(name = "stratum")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Output machine-readable JSON events
    #[arg(long, global = true)]
    json: bool,

    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Store root (defaults to $STRATUM_STORE, then ~/.stratum)
    #[arg(long, global = true)]
    store: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Build an image from a recipe
    Build {
        /// Path to the recipe file
        #[arg(short, long, default_value = "stratum.toml")]
        recipe: PathBuf,

        /// Build context directory
        #[arg(short, long, default_value = ".")]
        context: PathBuf,
    },

    /// Launch a built image's entry process and supervise it
    Run {
        /// Image name
        image: String,
    },

    /// Show the build graph's execution order for a recipe
    Plan {
        /// Path to the recipe file
        #[arg(short, long, default_value = "stratum.toml")]
        recipe: PathBuf,
    },

    /// List published images
    Images,

    /// Reconcile an image's declared port against a live socket
    Probe {
        /// Image name
        image: String,

        /// Host to probe
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Connect timeout in milliseconds
        #[arg(long, default_value = "1000")]
        timeout_ms: u64,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Build { recipe, context } => {
            commands::cmd_build(&recipe, &context, cli.store, cli.json, cli.verbose)
        }
        Commands::Run { image } => commands::cmd_run(&image, cli.store, cli.json),
        Commands::Plan { recipe } => commands::cmd_plan(&recipe, cli.json),
        Commands::Images => commands::cmd_images(cli.store, cli.json),
        Commands::Probe {
            image,
            host,
            timeout_ms,
        } => commands::cmd_probe(&image, &host, timeout_ms, cli.store, cli.json),
    }
}
