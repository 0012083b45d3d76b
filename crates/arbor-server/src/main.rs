use std::process::ExitCode;

use arbor_server::{init_logging, ServerConfig};
use clap::Parser;

mod cli;
mod commands;

fn main() -> anyhow::Result<ExitCode> {
    let cli = cli::Cli::parse();
    let mut config = ServerConfig::resolve(cli.config.as_deref())?;
    if let Some(home) = &cli.home {
        config.home = home.clone();
    }
    init_logging(&config.log_level, config.log_json)?;
    commands::run_command(cli, config)
}
