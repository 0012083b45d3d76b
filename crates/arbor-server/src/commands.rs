use std::fs;
use std::process::ExitCode;

use arbor_graph::{AuditReport, SortKey, SortOrder};
use arbor_server::{ServerConfig, Storage};
use arbor_types::NodeInfo;
use colored::Colorize;

use crate::cli::{Cli, Command, OutputFormat};

pub fn run_command(cli: Cli, config: ServerConfig) -> anyhow::Result<ExitCode> {
    match cli.command {
        Command::Init => cmd_init(config),
        Command::Info => cmd_info(config, cli.format),
        Command::Check => cmd_check(config, cli.format),
    }
}

fn cmd_init(config: ServerConfig) -> anyhow::Result<ExitCode> {
    config.create_layout()?;
    let config_path = config.config_path();
    if !config_path.exists() {
        fs::write(&config_path, config.to_toml()?)?;
        println!("  {} {}", "wrote".green(), config_path.display());
    }
    let storage = Storage::open(config)?;
    println!(
        "{} Initialized Arbor home in {}",
        "✓".green().bold(),
        storage.config().home.display().to_string().bold()
    );
    println!("  Root: {}", storage.graph().root().id().to_string().cyan());
    Ok(ExitCode::SUCCESS)
}

fn cmd_info(config: ServerConfig, format: OutputFormat) -> anyhow::Result<ExitCode> {
    let storage = Storage::open(config)?;
    let root = storage.graph().root();
    let info = root.node_info()?;
    let children = root.listing(SortOrder::new(SortKey::Alphabetical))?;

    if format == OutputFormat::Json {
        let out = serde_json::json!({ "root": info, "children": children });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(ExitCode::SUCCESS);
    }

    println!("{} {}", info.name.bold(), info.id.to_string().dimmed());
    println!("  Mode: {}", info.mode);
    println!("  Modified: {}", info.mtime.to_rfc3339());
    println!("  Home: {}", storage.config().home.display());
    println!("  Hash: {}", storage.config().hash_algorithm.to_string().cyan());
    println!("  Children: {}", children.len());
    for child in &children {
        print_entry(child);
    }
    Ok(ExitCode::SUCCESS)
}

fn print_entry(info: &NodeInfo) {
    let name = if info.is_dir() {
        format!("{}/", info.name).blue().bold()
    } else {
        info.name.normal()
    };
    println!("    {} {:>12} {}", info.mode, info.size, name);
}

fn cmd_check(config: ServerConfig, format: OutputFormat) -> anyhow::Result<ExitCode> {
    let storage = Storage::open(config)?;
    let report = storage.graph().audit()?;
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Text => print_report(&report),
    }
    Ok(if report.is_clean() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn print_report(report: &AuditReport) {
    println!(
        "Checked {} nodes, {} blocks",
        report.nodes_checked.to_string().bold(),
        report.blocks_checked.to_string().bold()
    );
    if report.is_clean() {
        println!("{} No issues.", "✓".green().bold());
        return;
    }
    for violation in &report.violations {
        println!("  {} {}", "✗".red().bold(), violation);
    }
    println!(
        "{} {} violation(s)",
        "✗".red().bold(),
        report.violations.len()
    );
}
