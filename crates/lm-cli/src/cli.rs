//! CLI argument definitions using clap derive API

use clap::{Args, Parser, Subcommand};

/// labmig - apply versioned SQL migrations to the lab database
#[derive(Parser, Debug)]
#[command(name = "labmig")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Global options
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Global arguments available to all commands
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to project directory
    #[arg(short = 'p', long, global = true, default_value = ".")]
    pub project_dir: String,

    /// Override config file path
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Override database path (`:memory:` for an in-memory database)
    #[arg(short, long, global = true, env = "LABMIG_DATABASE")]
    pub database: Option<String>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Apply all pending migrations
    Migrate(MigrateArgs),

    /// Show the state of every migration
    Status(StatusArgs),

    /// Verify checksums of applied migrations without applying anything
    Verify,

    /// Create a new timestamped migration file
    New(NewArgs),
}

/// Arguments for the migrate command
#[derive(Args, Debug)]
pub struct MigrateArgs {
    /// Show pending migrations without executing them
    #[arg(long)]
    pub dry_run: bool,
}

/// Arguments for the status command
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the new command
#[derive(Args, Debug)]
pub struct NewArgs {
    /// Descriptive name, e.g. "add sample barcode"
    pub name: String,
}

#[cfg(test)]
#[path = "cli_test.rs"]
mod tests;
