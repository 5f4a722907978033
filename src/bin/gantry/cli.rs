//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Gantry - maintenance and audit tool for Tauri mobile plugin workspaces
#[derive(Parser)]
#[command(name = "gantry")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Audit every plugin and print a consolidated report
    Analyze(AnalyzeArgs),

    /// Reconcile plugin manifests with usage evidence in the sources
    Fix(FixArgs),

    /// Annotate CoreMotion callback closures in Swift sources
    Patch(PatchArgs),
}

#[derive(Args)]
pub struct AnalyzeArgs {
    /// Directory containing the plugin packages
    #[arg(long, default_value = "plugins")]
    pub root: PathBuf,

    /// Plugin directory name prefix
    #[arg(long, default_value = "tauri-plugin-ios-")]
    pub prefix: String,

    /// Skip the per-package compile probe
    #[arg(long)]
    pub no_probe: bool,

    /// Compile probe timeout in seconds
    #[arg(long, default_value_t = 30)]
    pub timeout: u64,
}

#[derive(Args)]
pub struct FixArgs {
    /// Directory containing the plugin packages
    #[arg(long, default_value = "plugins")]
    pub root: PathBuf,

    /// Plugin directory name prefix
    #[arg(long, default_value = "tauri-plugin-ios-")]
    pub prefix: String,

    /// Rewrite each manifest from the canonical template
    #[arg(long)]
    pub regenerate: bool,

    /// Report what would change without writing anything
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Args)]
pub struct PatchArgs {
    /// Directory to scan for Swift sources
    #[arg(long, default_value = ".")]
    pub root: PathBuf,
}
