//! Hint and deduction companion.
//!
//! Each subcommand loads the reference data and saved progress, performs one
//! operation and prints the resulting state.
//!
//! # Interactive Mode
//!
//! Run `play` for a line-oriented session suitable for scripting:
//!
//! ```bash
//! cargo run -p dinn -- --data-dir ./data play
//! ```

mod commands;
mod config;
mod play;
mod render;

use anyhow::Result;
use clap::Parser;
use dinn_core::Session;
use std::io;
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use commands::Command;
use config::{FileConfig, Overrides};

#[derive(Debug, Parser)]
#[command(name = "dinn", version, about = "Hint and deduction companion")]
struct Cli {
    /// Directory holding the reference files [env: DINN_DATA_DIR]
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Progress file, by default hints_used.json in the data directory [env: DINN_PROGRESS]
    #[arg(long, global = true)]
    progress: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    // Logs go to stderr so command output stays clean
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let cli = Cli::parse();

    let flags = Overrides {
        data_dir: cli.data_dir,
        progress: cli.progress,
    };
    let config = config::resolve(FileConfig::load()?, Overrides::from_env(), flags);
    let mut session = Session::load(&config);

    let mut input = io::stdin().lock();
    let mut out = io::stdout().lock();
    commands::run(&mut session, cli.command, &mut input, &mut out)
}
