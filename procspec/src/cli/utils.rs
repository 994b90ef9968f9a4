use crate::common::config::Config;
use anyhow::{bail, Result};
use std::path::PathBuf;

/// Use the given file, or the first default ecosystem file in the current directory
pub fn resolve_ecosystem_file(file: Option<PathBuf>, config: &Config) -> Result<PathBuf> {
    if let Some(file) = file {
        return Ok(file);
    }

    let cwd = std::env::current_dir()?;
    match crate::ecosystem::Ecosystem::discover(&cwd, &config.ecosystem.default_files) {
        Some(path) => Ok(path),
        None => bail!(
            "No ecosystem file found in {} (tried: {})",
            cwd.display(),
            config.ecosystem.default_files.join(", ")
        ),
    }
}

/// Truncate for table display, respecting char boundaries
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
