//! Process descriptors: how to launch and supervise one managed process

pub mod duration;
pub mod error;
pub mod fields;
pub mod log_date;
mod normalizer;
pub mod size;

pub use error::{ValidationError, ValidationErrors};
pub use fields::Field;
pub use log_date::LogDateFormat;
pub use normalizer::normalize;
pub use size::ByteSize;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// A loosely-typed descriptor as it appears in an ecosystem file
pub type RawDescriptor = Map<String, Value>;

/// Environment variables, ordered by key
pub type Environment = BTreeMap<String, String>;

pub const DEFAULT_CWD: &str = ".";
pub const DEFAULT_INSTANCES: u32 = 1;
pub const DEFAULT_AUTORESTART: bool = true;
pub const DEFAULT_MERGE_LOGS: bool = false;
pub const DEFAULT_MIN_UPTIME: Duration = Duration::from_secs(1);
pub const DEFAULT_MAX_RESTARTS: u32 = 16;
pub const DEFAULT_RESTART_DELAY: Duration = Duration::ZERO;

/// Supervision strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ExecMode {
    /// One forked child per instance
    #[default]
    Fork,
    /// Instances run as a load-balanced cluster
    Cluster,
}

impl ExecMode {
    /// Accepted spellings, for error messages
    pub const EXPECTED: &'static str =
        "fork, fork_mode, single-process, cluster, cluster_mode, multi-process-cluster";

    /// Parse from string (case-insensitive)
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fork" | "fork_mode" | "single-process" => Some(Self::Fork),
            "cluster" | "cluster_mode" | "multi-process-cluster" => Some(Self::Cluster),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fork => "fork",
            Self::Cluster => "cluster",
        }
    }
}

impl fmt::Display for ExecMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// File watching behaviour
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Watch {
    #[default]
    Disabled,
    /// Watch the working directory
    Enabled,
    /// Watch only these paths
    Paths(Vec<PathBuf>),
}

impl Watch {
    pub fn is_enabled(&self) -> bool {
        !matches!(self, Self::Disabled)
    }

    fn to_value(&self) -> Value {
        match self {
            Self::Disabled => Value::Bool(false),
            Self::Enabled => Value::Bool(true),
            Self::Paths(paths) => Value::Array(
                paths
                    .iter()
                    .map(|p| Value::String(p.to_string_lossy().into_owned()))
                    .collect(),
            ),
        }
    }
}

/// A validated, fully-populated process descriptor
///
/// Built once by [`normalize`] and handed to the supervisor by value. Every
/// optional field of the raw input has been resolved to its default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessDescriptor {
    /// Unique name within the ecosystem
    pub name: String,
    /// Script or executable to run
    pub script: String,
    /// Arguments passed to the script
    pub args: Vec<String>,
    /// Runtime used to execute `script`, if any
    pub interpreter: Option<String>,
    /// Working directory
    pub cwd: PathBuf,
    /// Number of instances to run
    pub instances: u32,
    pub exec_mode: ExecMode,
    /// Restart the process when it exits
    pub autorestart: bool,
    pub watch: Watch,
    /// Restart when resident memory exceeds this threshold
    pub max_memory_restart: Option<ByteSize>,
    /// stderr log path (supervisor default when unset)
    pub error_file: Option<PathBuf>,
    /// stdout log path (supervisor default when unset)
    pub out_file: Option<PathBuf>,
    pub log_date_format: Option<LogDateFormat>,
    /// Write stdout and stderr of all instances to the same files
    pub merge_logs: bool,
    /// Variables merged over the inherited environment
    pub env: Environment,
    /// Named overlays from `env_<profile>` keys
    pub env_profiles: BTreeMap<String, Environment>,
    /// A process exiting sooner than this counts as a failed start
    pub min_uptime: Duration,
    /// Cap on consecutive failed-start restarts
    pub max_restarts: u32,
    /// Delay inserted between restart attempts
    pub restart_delay: Duration,
}

impl ProcessDescriptor {
    pub fn is_cluster(&self) -> bool {
        self.exec_mode == ExecMode::Cluster
    }

    /// Program to execute and its arguments
    pub fn command(&self) -> (String, Vec<String>) {
        match &self.interpreter {
            Some(interpreter) => {
                let mut argv = Vec::with_capacity(self.args.len() + 1);
                argv.push(self.script.clone());
                argv.extend(self.args.iter().cloned());
                (interpreter.clone(), argv)
            }
            None => (self.script.clone(), self.args.clone()),
        }
    }

    /// Command line for display purposes
    pub fn command_line(&self) -> String {
        let (program, argv) = self.command();
        std::iter::once(program)
            .chain(argv)
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// `env` overlaid with `env_<profile>` when that profile exists
    pub fn environment_for(&self, profile: Option<&str>) -> Environment {
        let mut env = self.env.clone();
        if let Some(overlay) = profile.and_then(|p| self.env_profiles.get(p)) {
            env.extend(overlay.iter().map(|(k, v)| (k.clone(), v.clone())));
        }
        env
    }

    /// Inherited environment with this descriptor's variables merged over it
    pub fn merged_environment<I, K, V>(&self, inherited: I, profile: Option<&str>) -> Environment
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut env: Environment = inherited
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        env.extend(self.environment_for(profile));
        env
    }

    /// Convert back into raw form using canonical keys
    ///
    /// The result normalizes to an identical descriptor.
    pub fn to_raw(&self) -> RawDescriptor {
        let mut raw = RawDescriptor::new();
        raw.insert(Field::NAME.key.into(), self.name.clone().into());
        raw.insert(Field::SCRIPT.key.into(), self.script.clone().into());
        raw.insert(Field::ARGS.key.into(), self.args.clone().into());
        if let Some(interpreter) = &self.interpreter {
            raw.insert(Field::INTERPRETER.key.into(), interpreter.clone().into());
        }
        raw.insert(Field::CWD.key.into(), path_value(&self.cwd));
        raw.insert(Field::INSTANCES.key.into(), self.instances.into());
        raw.insert(Field::EXEC_MODE.key.into(), self.exec_mode.as_str().into());
        raw.insert(Field::AUTORESTART.key.into(), self.autorestart.into());
        raw.insert(Field::WATCH.key.into(), self.watch.to_value());
        if let Some(size) = self.max_memory_restart {
            let value = match size.to_unit_string() {
                Some(s) => Value::String(s),
                None => Value::from(size.bytes()),
            };
            raw.insert(Field::MAX_MEMORY_RESTART.key.into(), value);
        }
        if let Some(path) = &self.error_file {
            raw.insert(Field::ERROR_FILE.key.into(), path_value(path));
        }
        if let Some(path) = &self.out_file {
            raw.insert(Field::OUT_FILE.key.into(), path_value(path));
        }
        if let Some(format) = &self.log_date_format {
            raw.insert(Field::LOG_DATE_FORMAT.key.into(), format.as_str().into());
        }
        raw.insert(Field::MERGE_LOGS.key.into(), self.merge_logs.into());
        raw.insert(Field::ENV.key.into(), env_value(&self.env));
        for (profile, env) in &self.env_profiles {
            raw.insert(
                format!("{}{}", Field::ENV_PROFILE_PREFIX, profile),
                env_value(env),
            );
        }
        raw.insert(
            Field::MIN_UPTIME.key.into(),
            duration::format_duration(self.min_uptime).into(),
        );
        raw.insert(Field::MAX_RESTARTS.key.into(), self.max_restarts.into());
        raw.insert(
            Field::RESTART_DELAY.key.into(),
            millis(self.restart_delay).into(),
        );
        raw
    }
}

fn path_value(path: &std::path::Path) -> Value {
    Value::String(path.to_string_lossy().into_owned())
}

fn env_value(env: &Environment) -> Value {
    Value::Object(
        env.iter()
            .map(|(k, v)| (k.clone(), Value::String(v.clone())))
            .collect(),
    )
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

impl TryFrom<&RawDescriptor> for ProcessDescriptor {
    type Error = ValidationErrors;

    fn try_from(raw: &RawDescriptor) -> Result<Self, Self::Error> {
        normalize(raw)
    }
}

impl From<&ProcessDescriptor> for RawDescriptor {
    fn from(descriptor: &ProcessDescriptor) -> Self {
        descriptor.to_raw()
    }
}

impl Serialize for ProcessDescriptor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_raw().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ProcessDescriptor {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = RawDescriptor::deserialize(deserializer)?;
        normalize(&raw).map_err(serde::de::Error::custom)
    }
}
