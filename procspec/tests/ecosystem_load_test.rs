use procspec::descriptor::{ByteSize, ValidationError};
use procspec::{Ecosystem, EcosystemError, ExecMode, Watch};
use std::path::PathBuf;
use std::time::Duration;

const JSON_ECOSYSTEM: &str = r#"{
  "apps": [
    {
      "name": "web-api",
      "script": "api.py",
      "interpreter": "python3",
      "cwd": "./",
      "instances": 1,
      "exec_mode": "fork",
      "autorestart": true,
      "watch": false,
      "max_memory_restart": "500M",
      "error_file": "./logs/err.log",
      "out_file": "./logs/out.log",
      "log_date_format": "YYYY-MM-DD HH:mm:ss Z",
      "merge_logs": true,
      "env": {
        "NODE_ENV": "production",
        "PYTHONUNBUFFERED": "1"
      },
      "min_uptime": "10s",
      "max_restarts": 10,
      "restart_delay": 4000
    },
    {
      "name": "worker",
      "script": "worker.js",
      "instances": 4,
      "exec_mode": "cluster"
    }
  ]
}"#;

const TOML_ECOSYSTEM: &str = r#"
[[apps]]
name = "web-api"
script = "api.py"
interpreter = "python3"
cwd = "./"
instances = 1
exec_mode = "fork"
autorestart = true
watch = false
max_memory_restart = "500M"
error_file = "./logs/err.log"
out_file = "./logs/out.log"
log_date_format = "YYYY-MM-DD HH:mm:ss Z"
merge_logs = true
min_uptime = "10s"
max_restarts = 10
restart_delay = 4000

[apps.env]
NODE_ENV = "production"
PYTHONUNBUFFERED = "1"

[[apps]]
name = "worker"
script = "worker.js"
instances = 4
exec_mode = "cluster"
"#;

const JS_ECOSYSTEM: &str = r#"module.exports = {
    apps: [
        {
            // Application name
            name: 'web-api',
            script: 'api.py',
            interpreter: 'python3',
            cwd: './',
            instances: 1,
            // fork (single instance) or cluster
            exec_mode: 'fork',
            autorestart: true,
            watch: false,
            max_memory_restart: '500M',
            error_file: './logs/err.log',
            out_file: './logs/out.log',
            log_date_format: 'YYYY-MM-DD HH:mm:ss Z',
            merge_logs: true,
            env: {
                NODE_ENV: 'production',
                PYTHONUNBUFFERED: '1'
            },
            min_uptime: '10s',        // shorter runs count as crashes
            max_restarts: 10,
            restart_delay: 4000,       // milliseconds
        }
    ]
};
"#;

fn write_file(dir: &tempfile::TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, contents).unwrap();
    path
}

#[test]
fn test_load_json_ecosystem() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(&dir, "ecosystem.config.json", JSON_ECOSYSTEM);

    let ecosystem = Ecosystem::load(&path, "apps").unwrap();
    assert_eq!(ecosystem.source.as_deref(), Some(path.as_path()));
    assert_eq!(ecosystem.len(), 2);

    let api = ecosystem.get("web-api").unwrap();
    assert_eq!(api.command(), ("python3".to_string(), vec!["api.py".to_string()]));
    assert_eq!(api.max_memory_restart, Some(ByteSize::from_bytes(500 * 1024 * 1024)));
    assert_eq!(api.min_uptime, Duration::from_secs(10));
    assert_eq!(api.max_restarts, 10);
    assert_eq!(api.restart_delay, Duration::from_millis(4000));
    assert_eq!(api.error_file, Some(PathBuf::from("./logs/err.log")));
    assert!(api.merge_logs);
    assert_eq!(api.watch, Watch::Disabled);
    assert_eq!(
        api.env.get("PYTHONUNBUFFERED").map(String::as_str),
        Some("1")
    );

    let worker = ecosystem.get("worker").unwrap();
    assert_eq!(worker.exec_mode, ExecMode::Cluster);
    assert_eq!(worker.instances, 4);
    assert!(worker.autorestart);
}

#[test]
fn test_json_and_toml_are_equivalent() {
    let dir = tempfile::tempdir().unwrap();
    let json_path = write_file(&dir, "ecosystem.json", JSON_ECOSYSTEM);
    let toml_path = write_file(&dir, "ecosystem.toml", TOML_ECOSYSTEM);

    let from_json = Ecosystem::load(&json_path, "apps").unwrap();
    let from_toml = Ecosystem::load(&toml_path, "apps").unwrap();
    assert_eq!(from_json.apps, from_toml.apps);
}

#[test]
fn test_load_js_ecosystem() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(&dir, "ecosystem.config.js", JS_ECOSYSTEM);

    let ecosystem = Ecosystem::load(&path, "apps").unwrap();
    assert_eq!(ecosystem.len(), 1);

    let api = ecosystem.get("web-api").unwrap();
    assert_eq!(api.max_memory_restart, Some(ByteSize::from_bytes(500 * 1024 * 1024)));
    assert_eq!(api.min_uptime, Duration::from_secs(10));
    assert_eq!(api.restart_delay, Duration::from_millis(4000));
    assert_eq!(api.max_restarts, 10);
    assert_eq!(api.env.get("NODE_ENV").map(String::as_str), Some("production"));
    assert_eq!(api.env.get("PYTHONUNBUFFERED").map(String::as_str), Some("1"));

    let json_path = write_file(&dir, "ecosystem.json", JSON_ECOSYSTEM);
    let from_json = Ecosystem::load(&json_path, "apps").unwrap();
    assert_eq!(Some(api), from_json.get("web-api"));
}

#[test]
fn test_js_without_export() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(&dir, "ecosystem.config.js", "const apps = [];");
    assert!(matches!(
        Ecosystem::load(&path, "apps"),
        Err(EcosystemError::MissingExport)
    ));

    let path = write_file(&dir, "broken.cjs", "module.exports = { apps: [ };");
    assert!(matches!(
        Ecosystem::load(&path, "apps"),
        Err(EcosystemError::Json5(_))
    ));
}

#[test]
fn test_unsupported_extension() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(&dir, "ecosystem.yaml", "apps: []");

    assert!(matches!(
        Ecosystem::load(&path, "apps"),
        Err(EcosystemError::UnsupportedFormat(_))
    ));
}

#[test]
fn test_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    assert!(matches!(
        Ecosystem::load(&dir.path().join("nope.json"), "apps"),
        Err(EcosystemError::Io(_))
    ));
}

#[test]
fn test_syntax_errors() {
    let dir = tempfile::tempdir().unwrap();
    let json = write_file(&dir, "broken.json", "{\"apps\": [");
    let toml = write_file(&dir, "broken.toml", "[[apps]\nname =");

    assert!(matches!(Ecosystem::load(&json, "apps"), Err(EcosystemError::Json(_))));
    assert!(matches!(Ecosystem::load(&toml, "apps"), Err(EcosystemError::Toml(_))));
}

#[test]
fn test_invalid_file_reports_all_records() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(
        &dir,
        "ecosystem.json",
        r#"{"apps": [
            {"name": "a", "script": "a.js", "instances": 0},
            {"name": "b", "script": "b.js"},
            {"name": "a", "script": "c.js", "min_uptime": "soon"}
        ]}"#,
    );

    let Err(EcosystemError::Invalid(failures)) = Ecosystem::load(&path, "apps") else {
        panic!("expected validation failures");
    };
    assert_eq!(failures.len(), 2);
    assert_eq!(failures[0].index, 0);
    assert!(matches!(failures[0].errors[0], ValidationError::OutOfRange { .. }));
    assert_eq!(failures[1].index, 2);
    assert!(matches!(failures[1].errors[0], ValidationError::InvalidDuration { .. }));
    assert!(matches!(
        failures[1].errors[1],
        ValidationError::DuplicateName { first_index: 0, .. }
    ));
}

#[test]
fn test_discover_default_file() {
    let dir = tempfile::tempdir().unwrap();
    let candidates = ["ecosystem.config.json", "ecosystem.toml"];
    assert_eq!(Ecosystem::discover(dir.path(), candidates), None);

    let toml_path = write_file(&dir, "ecosystem.toml", TOML_ECOSYSTEM);
    assert_eq!(Ecosystem::discover(dir.path(), candidates), Some(toml_path));

    let json_path = write_file(&dir, "ecosystem.config.json", JSON_ECOSYSTEM);
    assert_eq!(Ecosystem::discover(dir.path(), candidates), Some(json_path));
}
