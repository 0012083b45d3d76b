use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "arbord", about = "Arbor storage daemon", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Config file (default: <home>/cfg/arbor.toml if present)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Home directory, overriding the config file and $ARBOR_HOME
    #[arg(long, global = true)]
    pub home: Option<PathBuf>,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Create the home layout, a default config file, and the root node
    Init,
    /// Show the root node and its children
    Info,
    /// Audit the tree; exits non-zero if any violation is found
    Check,
}
