use crate::cli::utils::resolve_ecosystem_file;
use crate::common::config::Config;
use crate::ecosystem::{DescriptorFailure, Ecosystem, EcosystemError};
use anyhow::Context;
use clap::Args;
use colored::*;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Args)]
pub struct CheckCommand {
    /// Ecosystem file (searched for in the current directory when omitted)
    file: Option<PathBuf>,

    /// Top-level key holding the process list
    #[arg(long)]
    apps_key: Option<String>,
}

impl CheckCommand {
    pub fn execute(self, config: &Config) -> anyhow::Result<ExitCode> {
        let path = resolve_ecosystem_file(self.file, config)?;
        let apps_key = self
            .apps_key
            .as_deref()
            .unwrap_or(&config.ecosystem.apps_key);

        match Ecosystem::load(&path, apps_key) {
            Ok(ecosystem) => {
                println!(
                    "{} {} is valid ({} process(es))",
                    "✓".green(),
                    path.display(),
                    ecosystem.len()
                );
                for descriptor in &ecosystem {
                    println!(
                        "  {} {} {}",
                        "✓".green(),
                        descriptor.name.bright_white(),
                        format!("{} x{}", descriptor.exec_mode, descriptor.instances).dimmed()
                    );
                }
                Ok(ExitCode::SUCCESS)
            }
            Err(EcosystemError::Invalid(failures)) => {
                println!(
                    "{} {} has {} invalid process descriptor(s)",
                    "✗".red(),
                    path.display(),
                    failures.len()
                );
                for failure in &failures {
                    print_failure(failure);
                }
                Ok(ExitCode::FAILURE)
            }
            Err(e) => Err(e)
                .with_context(|| format!("Failed to load ecosystem file {}", path.display())),
        }
    }
}

fn print_failure(failure: &DescriptorFailure) {
    let label = match &failure.name {
        Some(name) => format!("[{}] {}", failure.index, name),
        None => format!("[{}]", failure.index),
    };
    println!("  {} {}", "✗".red(), label.bright_white());
    for error in &failure.errors {
        println!("      {}", error.to_string().red());
    }
}
