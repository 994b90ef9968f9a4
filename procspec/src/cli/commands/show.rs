use crate::cli::utils::{resolve_ecosystem_file, truncate};
use crate::common::config::Config;
use crate::descriptor::{Field, ProcessDescriptor, RawDescriptor};
use crate::ecosystem::Ecosystem;
use anyhow::Context;
use clap::Args;
use colored::*;
use serde_json::Value;
use std::path::PathBuf;
use std::process::ExitCode;
use tabled::{Table, Tabled};

#[derive(Debug, Args)]
pub struct ShowCommand {
    /// Ecosystem file (searched for in the current directory when omitted)
    file: Option<PathBuf>,

    /// Top-level key holding the process list
    #[arg(long)]
    apps_key: Option<String>,

    /// Print normalized descriptors as JSON
    #[arg(long)]
    json: bool,

    /// Resolve the environment for this profile (env_<PROFILE>)
    #[arg(short = 'e', long = "env", value_name = "PROFILE")]
    profile: Option<String>,
}

#[derive(Tabled)]
struct DescriptorRow {
    #[tabled(rename = "NAME")]
    name: String,

    #[tabled(rename = "MODE")]
    mode: String,

    #[tabled(rename = "INSTANCES")]
    instances: u32,

    #[tabled(rename = "COMMAND")]
    command: String,

    #[tabled(rename = "CWD")]
    cwd: String,

    #[tabled(rename = "MAX MEMORY")]
    max_memory: String,

    #[tabled(rename = "RESTART")]
    restart: String,

    #[tabled(rename = "ENV")]
    env: usize,
}

impl DescriptorRow {
    fn new(descriptor: &ProcessDescriptor, profile: Option<&str>) -> Self {
        Self {
            name: descriptor.name.clone(),
            mode: descriptor.exec_mode.to_string(),
            instances: descriptor.instances,
            command: truncate(&descriptor.command_line(), 40),
            cwd: descriptor.cwd.display().to_string(),
            max_memory: descriptor
                .max_memory_restart
                .map(|size| size.to_string())
                .unwrap_or_else(|| "-".to_string()),
            restart: format_restart(descriptor),
            env: descriptor.environment_for(profile).len(),
        }
    }
}

impl ShowCommand {
    pub fn execute(self, config: &Config) -> anyhow::Result<ExitCode> {
        let path = resolve_ecosystem_file(self.file, config)?;
        let apps_key = self
            .apps_key
            .as_deref()
            .unwrap_or(&config.ecosystem.apps_key);
        let ecosystem = Ecosystem::load(&path, apps_key)
            .with_context(|| format!("Failed to load ecosystem file {}", path.display()))?;
        let profile = self.profile.as_deref();

        if self.json {
            let apps: Vec<RawDescriptor> = ecosystem
                .iter()
                .map(|d| resolved_raw(d, profile))
                .collect();
            println!("{}", serde_json::to_string_pretty(&apps)?);
            return Ok(ExitCode::SUCCESS);
        }

        if ecosystem.is_empty() {
            println!("No processes defined in {}", path.display());
            return Ok(ExitCode::SUCCESS);
        }

        let rows: Vec<DescriptorRow> = ecosystem
            .iter()
            .map(|d| DescriptorRow::new(d, profile))
            .collect();
        println!("{}", Table::new(rows));

        if config.output.date_preview {
            let now = chrono::Local::now();
            for descriptor in &ecosystem {
                if let Some(format) = &descriptor.log_date_format {
                    println!(
                        "  {} log dates: {} {}",
                        descriptor.name.bright_white(),
                        format.render(&now),
                        format!("({})", format).dimmed()
                    );
                }
            }
        }

        Ok(ExitCode::SUCCESS)
    }
}

/// Canonical raw form with the environment resolved for `profile`
fn resolved_raw(descriptor: &ProcessDescriptor, profile: Option<&str>) -> RawDescriptor {
    let mut raw = descriptor.to_raw();
    if profile.is_some() {
        raw.retain(|key, _| Field::env_profile(key).is_none());
        let env = descriptor
            .environment_for(profile)
            .into_iter()
            .map(|(k, v)| (k, Value::String(v)))
            .collect();
        raw.insert(Field::ENV.key.to_string(), Value::Object(env));
    }
    raw
}

fn format_restart(descriptor: &ProcessDescriptor) -> String {
    if !descriptor.autorestart {
        return "off".to_string();
    }
    let mut parts = vec![format!("max {}", descriptor.max_restarts)];
    if !descriptor.restart_delay.is_zero() {
        parts.push(format!("delay {}ms", descriptor.restart_delay.as_millis()));
    }
    parts.push(format!("uptime {}ms", descriptor.min_uptime.as_millis()));
    parts.join(", ")
}
