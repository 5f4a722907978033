//! Gantry CLI - maintenance tool for Tauri mobile plugin workspaces

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cli::{Cli, Commands};

fn main() {
    if let Err(e) = run() {
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    // Parse CLI
    let cli = Cli::parse();

    // Set up logging
    let filter = if cli.verbose {
        EnvFilter::new("gantry=debug")
    } else {
        EnvFilter::new("gantry=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .init();

    // Execute command
    match cli.command {
        Commands::Analyze(args) => commands::analyze::execute(args),
        Commands::Fix(args) => commands::fix::execute(args),
        Commands::Patch(args) => commands::patch::execute(args),
    }
}
