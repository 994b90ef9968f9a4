pub mod commands;
pub mod utils;

use crate::common::config::Config;
use anyhow::Context;
use clap::{CommandFactory, Parser, Subcommand};
use commands::*;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "procspec")]
#[command(about = "Validate and inspect process-manager ecosystem files", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Settings file (defaults to $XDG_CONFIG_HOME/procspec/config.toml)
    #[arg(long, global = true, env = "PROCSPEC_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Validate an ecosystem file and report every problem
    Check(CheckCommand),

    /// Show the normalized process descriptors
    Show(ShowCommand),
}

pub fn run_cli() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
    .context("Failed to load settings")?;

    init_tracing(&config, cli.verbose)?;

    if !config.output.color {
        colored::control::set_override(false);
    }

    // If no command, show help
    let command = match cli.command {
        Some(cmd) => cmd,
        None => {
            Cli::command().print_help()?;
            return Ok(ExitCode::SUCCESS);
        }
    };

    match command {
        Commands::Check(cmd) => cmd.execute(&config),
        Commands::Show(cmd) => cmd.execute(&config),
    }
}

fn init_tracing(config: &Config, verbose: bool) -> anyhow::Result<()> {
    let level = if verbose {
        "debug"
    } else {
        config.logging.level.as_str()
    };
    let directive = format!("procspec={}", level)
        .parse()
        .with_context(|| format!("Invalid logging level '{}'", level))?;

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(EnvFilter::from_default_env().add_directive(directive))
        .try_init()?;
    Ok(())
}
