use super::duration::{parse_duration, DurationUnit};
use super::{
    ByteSize, Environment, ExecMode, Field, LogDateFormat, ProcessDescriptor, RawDescriptor,
    ValidationError, ValidationErrors, Watch, DEFAULT_AUTORESTART, DEFAULT_CWD,
    DEFAULT_INSTANCES, DEFAULT_MAX_RESTARTS, DEFAULT_MERGE_LOGS, DEFAULT_MIN_UPTIME,
    DEFAULT_RESTART_DELAY,
};
use crate::common::validation::{validate_env_key, validate_process_name};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, warn};

/// Validate a raw descriptor and fill in defaults for every omitted field
///
/// All fields are checked; the error list holds every problem in field order,
/// starting with `name` and `script`. Performs no I/O.
pub fn normalize(raw: &RawDescriptor) -> Result<ProcessDescriptor, ValidationErrors> {
    let mut reader = FieldReader::new(raw);

    let name = reader.required_string(&Field::NAME);
    if let Some(name) = name {
        if let Err(reason) = validate_process_name(name) {
            reader.push(ValidationError::InvalidName {
                name: name.to_string(),
                reason,
            });
        }
    }
    let script = reader.required_string(&Field::SCRIPT);

    let args = reader.args(&Field::ARGS).unwrap_or_default();
    let interpreter = reader
        .optional_string(&Field::INTERPRETER)
        .filter(|i| !i.eq_ignore_ascii_case("none"))
        .map(str::to_string);
    let cwd = reader
        .optional_string(&Field::CWD)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CWD));
    let instances = reader
        .integer(&Field::INSTANCES, 1, u64::from(u32::MAX))
        .map_or(DEFAULT_INSTANCES, saturating_u32);
    let exec_mode = reader.exec_mode(&Field::EXEC_MODE).unwrap_or_default();
    let autorestart = reader.boolean(&Field::AUTORESTART, DEFAULT_AUTORESTART);
    let watch = reader.watch(&Field::WATCH).unwrap_or_default();
    let max_memory_restart = reader.size(&Field::MAX_MEMORY_RESTART);
    let error_file = reader.optional_string(&Field::ERROR_FILE).map(PathBuf::from);
    let out_file = reader.optional_string(&Field::OUT_FILE).map(PathBuf::from);
    let log_date_format = reader
        .optional_string(&Field::LOG_DATE_FORMAT)
        .map(LogDateFormat::new);
    let merge_logs = reader.boolean(&Field::MERGE_LOGS, DEFAULT_MERGE_LOGS);
    let env = reader
        .value(&Field::ENV)
        .and_then(|value| reader.environment(Field::ENV.key, value))
        .unwrap_or_default();
    let env_profiles = reader.env_profiles();
    let min_uptime = reader
        .duration(&Field::MIN_UPTIME, DurationUnit::Seconds)
        .unwrap_or(DEFAULT_MIN_UPTIME);
    let max_restarts = reader
        .integer(&Field::MAX_RESTARTS, 0, u64::from(u32::MAX))
        .map_or(DEFAULT_MAX_RESTARTS, saturating_u32);
    let restart_delay = reader
        .duration(&Field::RESTART_DELAY, DurationUnit::Milliseconds)
        .unwrap_or(DEFAULT_RESTART_DELAY);

    reader.warn_unknown_keys(name.unwrap_or("<unnamed>"));

    let errors = reader.into_errors();
    let (Some(name), Some(script)) = (name, script) else {
        return Err(ValidationErrors::new(errors));
    };
    if !errors.is_empty() {
        return Err(ValidationErrors::new(errors));
    }

    if exec_mode == ExecMode::Cluster && watch.is_enabled() {
        warn!(
            "Process '{}' watches files in cluster mode; every instance restarts on change",
            name
        );
    }

    debug!(
        "Normalized process '{}': {} x{} ({})",
        name, exec_mode, instances, script
    );

    Ok(ProcessDescriptor {
        name: name.to_string(),
        script: script.to_string(),
        args,
        interpreter,
        cwd,
        instances,
        exec_mode,
        autorestart,
        watch,
        max_memory_restart,
        error_file,
        out_file,
        log_date_format,
        merge_logs,
        env,
        env_profiles,
        min_uptime,
        max_restarts,
        restart_delay,
    })
}

fn saturating_u32(value: u64) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}

/// Typed access to raw fields that records every problem it meets
struct FieldReader<'a> {
    raw: &'a RawDescriptor,
    errors: Vec<ValidationError>,
}

impl<'a> FieldReader<'a> {
    fn new(raw: &'a RawDescriptor) -> Self {
        Self {
            raw,
            errors: Vec::new(),
        }
    }

    fn push(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    fn into_errors(self) -> Vec<ValidationError> {
        self.errors
    }

    fn invalid_type(&mut self, field: &str, expected: &'static str) {
        self.push(ValidationError::InvalidType {
            field: field.to_string(),
            expected,
        });
    }

    fn out_of_range(&mut self, field: &str, reason: impl Into<String>) {
        self.push(ValidationError::OutOfRange {
            field: field.to_string(),
            reason: reason.into(),
        });
    }

    /// First non-null value under the canonical key or one of its aliases
    fn value(&self, field: &Field) -> Option<&'a Value> {
        let raw: &'a RawDescriptor = self.raw;
        std::iter::once(field.key)
            .chain(field.aliases.iter().copied())
            .filter_map(|key| raw.get(key))
            .find(|value| !value.is_null())
    }

    fn required_string(&mut self, field: &Field) -> Option<&'a str> {
        match self.value(field) {
            None => {
                self.push(ValidationError::MissingRequiredField {
                    field: field.key.to_string(),
                });
                None
            }
            Some(Value::String(s)) if s.trim().is_empty() => {
                self.push(ValidationError::MissingRequiredField {
                    field: field.key.to_string(),
                });
                None
            }
            Some(Value::String(s)) => Some(s.as_str()),
            Some(_) => {
                self.invalid_type(field.key, "a string");
                None
            }
        }
    }

    /// Empty strings count as absent
    fn optional_string(&mut self, field: &Field) -> Option<&'a str> {
        match self.value(field)? {
            Value::String(s) if s.is_empty() => None,
            Value::String(s) => Some(s.as_str()),
            _ => {
                self.invalid_type(field.key, "a string");
                None
            }
        }
    }

    fn boolean(&mut self, field: &Field, default: bool) -> bool {
        match self.value(field) {
            None => default,
            Some(Value::Bool(b)) => *b,
            Some(_) => {
                self.invalid_type(field.key, "a boolean");
                default
            }
        }
    }

    /// Non-negative integer within `min..=max`
    fn integer(&mut self, field: &Field, min: u64, max: u64) -> Option<u64> {
        let value = self.value(field)?;
        let n = self.unsigned(field.key, value)?;
        if n < min {
            self.out_of_range(field.key, format!("must be at least {}", min));
            return None;
        }
        if n > max {
            self.out_of_range(field.key, format!("must be at most {}", max));
            return None;
        }
        Some(n)
    }

    fn unsigned(&mut self, field: &str, value: &Value) -> Option<u64> {
        match value {
            Value::Number(n) => {
                if let Some(n) = n.as_u64() {
                    Some(n)
                } else if n.is_i64() {
                    self.out_of_range(field, "must not be negative");
                    None
                } else {
                    self.invalid_type(field, "an integer");
                    None
                }
            }
            _ => {
                self.invalid_type(field, "an integer");
                None
            }
        }
    }

    fn exec_mode(&mut self, field: &Field) -> Option<ExecMode> {
        let value = self.value(field)?;
        let parsed = value.as_str().and_then(ExecMode::parse);
        if parsed.is_none() {
            self.push(ValidationError::InvalidEnumValue {
                field: field.key.to_string(),
                value: shown(value),
                expected: ExecMode::EXPECTED,
            });
        }
        parsed
    }

    /// A whitespace-separated string or a list of strings
    fn args(&mut self, field: &Field) -> Option<Vec<String>> {
        match self.value(field)? {
            Value::String(s) => Some(s.split_whitespace().map(str::to_string).collect()),
            Value::Array(items) => {
                let args: Option<Vec<String>> = items
                    .iter()
                    .map(|item| item.as_str().map(str::to_string))
                    .collect();
                if args.is_none() {
                    self.invalid_type(field.key, "a string or a list of strings");
                }
                args
            }
            _ => {
                self.invalid_type(field.key, "a string or a list of strings");
                None
            }
        }
    }

    /// A boolean or a list of paths to watch
    fn watch(&mut self, field: &Field) -> Option<Watch> {
        match self.value(field)? {
            Value::Bool(true) => Some(Watch::Enabled),
            Value::Bool(false) => Some(Watch::Disabled),
            Value::Array(items) if items.is_empty() => Some(Watch::Disabled),
            Value::Array(items) => {
                let paths: Option<Vec<PathBuf>> = items
                    .iter()
                    .map(|item| item.as_str().map(PathBuf::from))
                    .collect();
                if paths.is_none() {
                    self.invalid_type(field.key, "a boolean or a list of paths");
                }
                paths.map(Watch::Paths)
            }
            _ => {
                self.invalid_type(field.key, "a boolean or a list of paths");
                None
            }
        }
    }

    /// `<positive integer><K|M|G>` string, or a byte count
    ///
    /// Any other shape, fractional numbers included, is an `InvalidSizeFormat`.
    fn size(&mut self, field: &Field) -> Option<ByteSize> {
        let value = self.value(field)?;
        let parsed = match value {
            Value::String(s) => s.parse::<ByteSize>().ok(),
            Value::Number(n) if n.is_i64() && n.as_u64().is_none() => {
                self.out_of_range(field.key, "must not be negative");
                return None;
            }
            Value::Number(n) => match n.as_u64() {
                Some(0) => {
                    self.out_of_range(field.key, "must be greater than 0");
                    return None;
                }
                bytes => bytes.map(ByteSize::from_bytes),
            },
            _ => None,
        };
        if parsed.is_none() {
            self.push(ValidationError::InvalidSizeFormat {
                field: field.key.to_string(),
                value: shown(value),
            });
        }
        parsed
    }

    /// `<integer>[ms|s]` string, or an integer in `default_unit`
    ///
    /// Any other shape, fractional numbers included, is an `InvalidDuration`.
    fn duration(&mut self, field: &Field, default_unit: DurationUnit) -> Option<Duration> {
        let value = self.value(field)?;
        let parsed = match value {
            Value::String(s) => parse_duration(s, default_unit),
            Value::Number(n) if n.is_i64() && n.as_u64().is_none() => {
                self.out_of_range(field.key, "must not be negative");
                return None;
            }
            Value::Number(n) => match n.as_u64() {
                Some(amount) => {
                    let parsed = default_unit.to_duration(amount);
                    if parsed.is_none() {
                        self.out_of_range(field.key, "duration is too large");
                    }
                    return parsed;
                }
                None => None,
            },
            _ => None,
        };
        if parsed.is_none() {
            self.push(ValidationError::InvalidDuration {
                field: field.key.to_string(),
                value: shown(value),
            });
        }
        parsed
    }

    /// Map of variable names to scalar values; numbers and booleans are stringified
    fn environment(&mut self, field: &str, value: &Value) -> Option<Environment> {
        let Value::Object(map) = value else {
            self.invalid_type(field, "a map of environment variables");
            return None;
        };

        let mut env = Environment::new();
        let mut valid = true;
        for (key, value) in map {
            if let Err(reason) = validate_env_key(key) {
                self.push(ValidationError::InvalidEnvironment {
                    field: field.to_string(),
                    key: key.clone(),
                    reason,
                });
                valid = false;
                continue;
            }
            let value = match value {
                Value::String(s) => s.clone(),
                Value::Number(n) => n.to_string(),
                Value::Bool(b) => b.to_string(),
                _ => {
                    self.invalid_type(
                        &format!("{}.{}", field, key),
                        "a string, number or boolean",
                    );
                    valid = false;
                    continue;
                }
            };
            env.insert(key.clone(), value);
        }
        valid.then_some(env)
    }

    fn env_profiles(&mut self) -> BTreeMap<String, Environment> {
        let raw: &'a RawDescriptor = self.raw;
        let mut profiles = BTreeMap::new();
        for (key, value) in raw {
            let Some(profile) = Field::env_profile(key) else {
                continue;
            };
            if value.is_null() {
                continue;
            }
            if let Some(env) = self.environment(key, value) {
                profiles.insert(profile.to_string(), env);
            }
        }
        profiles
    }

    fn warn_unknown_keys(&self, name: &str) {
        for key in self.raw.keys() {
            if Field::lookup(key).is_none() && Field::env_profile(key).is_none() {
                warn!("Ignoring unknown field '{}' in process '{}'", key, name);
            }
        }
    }
}

/// Raw value as it appears in error messages; strings are shown unquoted
fn shown(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
