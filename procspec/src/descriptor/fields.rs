use std::fmt;

/// A recognized descriptor key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    /// Canonical key, used in normalized output and error messages
    pub key: &'static str,
    /// Alternative spellings accepted in raw input
    pub aliases: &'static [&'static str],
}

impl Field {
    pub const NAME: Self = Self {
        key: "name",
        aliases: &[],
    };

    pub const SCRIPT: Self = Self {
        key: "script",
        aliases: &[],
    };

    pub const ARGS: Self = Self {
        key: "args",
        aliases: &["arguments"],
    };

    pub const INTERPRETER: Self = Self {
        key: "interpreter",
        aliases: &["exec_interpreter"],
    };

    pub const CWD: Self = Self {
        key: "cwd",
        aliases: &["workingDirectory", "working_directory"],
    };

    pub const INSTANCES: Self = Self {
        key: "instances",
        aliases: &["instanceCount", "instance_count"],
    };

    pub const EXEC_MODE: Self = Self {
        key: "exec_mode",
        aliases: &["executionMode", "execution_mode"],
    };

    pub const AUTORESTART: Self = Self {
        key: "autorestart",
        aliases: &["autoRestart", "auto_restart"],
    };

    pub const WATCH: Self = Self {
        key: "watch",
        aliases: &["watchFilesystem", "watch_filesystem"],
    };

    pub const MAX_MEMORY_RESTART: Self = Self {
        key: "max_memory_restart",
        aliases: &["maxMemoryRestartThreshold"],
    };

    pub const ERROR_FILE: Self = Self {
        key: "error_file",
        aliases: &["errorLogPath", "err_file"],
    };

    pub const OUT_FILE: Self = Self {
        key: "out_file",
        aliases: &["outputLogPath"],
    };

    pub const LOG_DATE_FORMAT: Self = Self {
        key: "log_date_format",
        aliases: &["logDateFormat"],
    };

    pub const MERGE_LOGS: Self = Self {
        key: "merge_logs",
        aliases: &["mergeLogs"],
    };

    pub const ENV: Self = Self {
        key: "env",
        aliases: &["environment"],
    };

    pub const MIN_UPTIME: Self = Self {
        key: "min_uptime",
        aliases: &["minUptimeSeconds"],
    };

    pub const MAX_RESTARTS: Self = Self {
        key: "max_restarts",
        aliases: &["maxRestarts"],
    };

    pub const RESTART_DELAY: Self = Self {
        key: "restart_delay",
        aliases: &["restartDelayMilliseconds"],
    };

    /// All recognized fields, in validation order
    pub const ALL: &'static [Self] = &[
        Self::NAME,
        Self::SCRIPT,
        Self::ARGS,
        Self::INTERPRETER,
        Self::CWD,
        Self::INSTANCES,
        Self::EXEC_MODE,
        Self::AUTORESTART,
        Self::WATCH,
        Self::MAX_MEMORY_RESTART,
        Self::ERROR_FILE,
        Self::OUT_FILE,
        Self::LOG_DATE_FORMAT,
        Self::MERGE_LOGS,
        Self::ENV,
        Self::MIN_UPTIME,
        Self::MAX_RESTARTS,
        Self::RESTART_DELAY,
    ];

    /// Prefix of per-profile environment overlays (`env_production`)
    pub const ENV_PROFILE_PREFIX: &'static str = "env_";

    /// Whether `key` names this field
    pub fn matches(&self, key: &str) -> bool {
        self.key == key || self.aliases.contains(&key)
    }

    /// Look up the field a raw key belongs to
    pub fn lookup(key: &str) -> Option<&'static Self> {
        Self::ALL.iter().find(|f| f.matches(key))
    }

    /// Extract the profile name from an `env_<profile>` key
    pub fn env_profile(key: &str) -> Option<&str> {
        key.strip_prefix(Self::ENV_PROFILE_PREFIX)
            .filter(|profile| !profile.is_empty())
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key)
    }
}
