//! Ecosystem files: an ordered list of process descriptors under one top-level key

use crate::descriptor::{normalize, Field, ProcessDescriptor, ValidationError};
use regex::Regex;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use thiserror::Error;
use tracing::{debug, info};

/// Default top-level key holding the descriptors
pub const DEFAULT_APPS_KEY: &str = "apps";

/// `module.exports =` or `export default`, after any leading comments
static JS_EXPORT_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)^\s*(?:(?://[^\n]*|/\*.*?\*/)\s*)*(?:module\.exports\s*=|export\s+default)\s*")
        .expect("export pattern is a valid regex")
});

#[derive(Error, Debug)]
pub enum EcosystemError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to parse TOML: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Failed to parse JavaScript object literal: {0}")]
    Json5(#[from] json5::Error),

    #[error("JavaScript ecosystem file must assign an object literal to module.exports")]
    MissingExport,

    #[error("Unsupported ecosystem file format: {0:?} (expected .json, .toml or .js)")]
    UnsupportedFormat(PathBuf),

    #[error("Missing top-level '{0}' list")]
    MissingAppsKey(String),

    #[error("Top-level '{0}' must be a list of process descriptors")]
    AppsNotList(String),

    #[error("{} invalid process descriptor(s)", .0.len())]
    Invalid(Vec<DescriptorFailure>),
}

pub type Result<T> = std::result::Result<T, EcosystemError>;

/// Everything wrong with one record of the ecosystem
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DescriptorFailure {
    /// Position in the list
    pub index: usize,
    /// Record name, when it was readable
    pub name: Option<String>,
    pub errors: Vec<ValidationError>,
}

impl fmt::Display for DescriptorFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "apps[{}] ({})", self.index, name)?,
            None => write!(f, "apps[{}]", self.index)?,
        }
        for error in &self.errors {
            write!(f, "\n  - {}", error)?;
        }
        Ok(())
    }
}

/// Serialization format of an ecosystem file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Json,
    Toml,
    /// `module.exports = { ... }`, read as a JSON5 literal and never executed
    Js,
}

impl SourceFormat {
    /// Detect format from the file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?;
        if ext.eq_ignore_ascii_case("json") {
            Some(Self::Json)
        } else if ext.eq_ignore_ascii_case("toml") {
            Some(Self::Toml)
        } else if ext.eq_ignore_ascii_case("js") || ext.eq_ignore_ascii_case("cjs") {
            Some(Self::Js)
        } else {
            None
        }
    }
}

/// A validated set of process descriptors, in file order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ecosystem {
    /// File the ecosystem was loaded from
    pub source: Option<PathBuf>,
    pub apps: Vec<ProcessDescriptor>,
}

impl Ecosystem {
    /// Read and validate an ecosystem file
    pub fn load(path: &Path, apps_key: &str) -> Result<Self> {
        let format = SourceFormat::from_path(path)
            .ok_or_else(|| EcosystemError::UnsupportedFormat(path.to_path_buf()))?;
        let contents = std::fs::read_to_string(path)?;
        let mut ecosystem = Self::from_str(&contents, format, apps_key)?;
        ecosystem.source = Some(path.to_path_buf());
        info!(
            "Loaded {} process descriptor(s) from {:?}",
            ecosystem.apps.len(),
            path
        );
        Ok(ecosystem)
    }

    pub fn from_str(contents: &str, format: SourceFormat, apps_key: &str) -> Result<Self> {
        let value: Value = match format {
            SourceFormat::Json => serde_json::from_str(contents)?,
            SourceFormat::Toml => toml::from_str(contents)?,
            SourceFormat::Js => json5::from_str(exported_literal(contents)?)?,
        };
        Self::from_value(value, apps_key)
    }

    /// Validate every record, failing with all problems found
    pub fn from_value(value: Value, apps_key: &str) -> Result<Self> {
        let records = match value {
            Value::Object(mut root) => match root.remove(apps_key) {
                Some(Value::Array(records)) => records,
                Some(_) => return Err(EcosystemError::AppsNotList(apps_key.to_string())),
                None => return Err(EcosystemError::MissingAppsKey(apps_key.to_string())),
            },
            _ => return Err(EcosystemError::MissingAppsKey(apps_key.to_string())),
        };

        let mut apps = Vec::with_capacity(records.len());
        let mut failures = Vec::new();
        let mut first_seen: HashMap<String, usize> = HashMap::new();

        for (index, record) in records.iter().enumerate() {
            let Value::Object(raw) = record else {
                failures.push(DescriptorFailure {
                    index,
                    name: None,
                    errors: vec![ValidationError::InvalidType {
                        field: format!("{}[{}]", apps_key, index),
                        expected: "an object",
                    }],
                });
                continue;
            };

            let name = raw
                .get(Field::NAME.key)
                .and_then(Value::as_str)
                .filter(|n| !n.trim().is_empty())
                .map(str::to_string);

            let mut errors = match normalize(raw) {
                Ok(descriptor) => {
                    apps.push(descriptor);
                    Vec::new()
                }
                Err(e) => e.into_vec(),
            };

            if let Some(name) = &name {
                if let Some(&first_index) = first_seen.get(name) {
                    errors.push(ValidationError::DuplicateName {
                        name: name.clone(),
                        first_index,
                    });
                } else {
                    first_seen.insert(name.clone(), index);
                }
            }

            if !errors.is_empty() {
                debug!("Process descriptor {} is invalid: {} error(s)", index, errors.len());
                failures.push(DescriptorFailure {
                    index,
                    name,
                    errors,
                });
            }
        }

        if !failures.is_empty() {
            return Err(EcosystemError::Invalid(failures));
        }

        Ok(Self { source: None, apps })
    }

    /// First candidate file that exists in `dir`
    pub fn discover<I, S>(dir: &Path, candidates: I) -> Option<PathBuf>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        candidates
            .into_iter()
            .map(|name| dir.join(name.as_ref()))
            .find(|path| path.is_file())
    }

    pub fn get(&self, name: &str) -> Option<&ProcessDescriptor> {
        self.apps.iter().find(|d| d.name == name)
    }

    pub fn len(&self) -> usize {
        self.apps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.apps.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ProcessDescriptor> {
        self.apps.iter()
    }
}

/// The object literal assigned by a CommonJS or ES module ecosystem file
fn exported_literal(contents: &str) -> Result<&str> {
    let export = JS_EXPORT_PATTERN
        .find(contents)
        .ok_or(EcosystemError::MissingExport)?;
    let literal = contents[export.end()..].trim_end();
    Ok(literal.strip_suffix(';').unwrap_or(literal))
}

impl<'a> IntoIterator for &'a Ecosystem {
    type Item = &'a ProcessDescriptor;
    type IntoIter = std::slice::Iter<'a, ProcessDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.apps.iter()
    }
}
