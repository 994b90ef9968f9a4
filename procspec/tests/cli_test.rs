use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

const VALID_ECOSYSTEM: &str = r#"{
  "apps": [
    {
      "name": "web-api",
      "script": "api.py",
      "interpreter": "python3",
      "max_memory_restart": "500M",
      "env": {"NODE_ENV": "development", "PORT": "3000"},
      "env_production": {"NODE_ENV": "production"}
    },
    {"name": "worker", "script": "worker.js", "instances": 4, "exec_mode": "cluster"}
  ]
}"#;

const INVALID_ECOSYSTEM: &str = r#"{
  "apps": [
    {"name": "ok", "script": "ok.js"},
    {"script": "nameless.js", "exec_mode": "bogus"},
    {"name": "bad", "script": "bad.js", "max_memory_restart": "500", "restart_delay": "4 sec"}
  ]
}"#;

struct Workspace {
    dir: tempfile::TempDir,
}

impl Workspace {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("settings.toml"),
            "[output]\ncolor = false\ndate_preview = false\n",
        )
        .unwrap();
        Self { dir }
    }

    fn path(&self) -> &Path {
        self.dir.path()
    }

    fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.path().join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    fn run(&self, args: &[&str]) -> Output {
        Command::new(env!("CARGO_BIN_EXE_procspec"))
            .args(args)
            .current_dir(self.path())
            .env("PROCSPEC_CONFIG", self.path().join("settings.toml"))
            .env("NO_COLOR", "1")
            .env_remove("RUST_LOG")
            .output()
            .expect("Failed to run procspec")
    }
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn test_check_valid_file() {
    let ws = Workspace::new();
    let path = ws.write("ecosystem.json", VALID_ECOSYSTEM);

    let output = ws.run(&["check", path.to_str().unwrap()]);
    let out = stdout(&output);

    assert!(output.status.success(), "check failed: {}", out);
    assert!(out.contains("is valid (2 process(es))"), "{}", out);
    assert!(out.contains("✓ web-api fork x1"), "{}", out);
    assert!(out.contains("✓ worker cluster x4"), "{}", out);
}

#[test]
fn test_check_reports_every_error() {
    let ws = Workspace::new();
    let path = ws.write("ecosystem.json", INVALID_ECOSYSTEM);

    let output = ws.run(&["check", path.to_str().unwrap()]);
    let out = stdout(&output);

    assert!(!output.status.success());
    assert_eq!(output.status.code(), Some(1));
    assert!(out.contains("has 2 invalid process descriptor(s)"), "{}", out);
    assert!(out.contains("✗ [1]"), "{}", out);
    assert!(out.contains("✗ [2] bad"), "{}", out);
    assert!(out.contains("Missing required field: name"), "{}", out);
    assert!(out.contains("Invalid value 'bogus' for exec_mode"), "{}", out);
    assert!(out.contains("Invalid size '500' for max_memory_restart"), "{}", out);
    assert!(out.contains("Invalid duration '4 sec' for restart_delay"), "{}", out);
    assert!(!out.contains("✗ [0]"), "{}", out);
}

#[test]
fn test_check_discovers_default_file() {
    let ws = Workspace::new();

    let output = ws.run(&["check"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("No ecosystem file found"));

    ws.write("ecosystem.config.json", VALID_ECOSYSTEM);
    let output = ws.run(&["check"]);
    assert!(output.status.success(), "{}", stdout(&output));
}

#[test]
fn test_show_json_resolves_profile() {
    let ws = Workspace::new();
    let path = ws.write("ecosystem.json", VALID_ECOSYSTEM);

    let output = ws.run(&["show", path.to_str().unwrap(), "--json", "--env", "production"]);
    assert!(output.status.success(), "{}", stdout(&output));

    let apps: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(apps[0]["name"], "web-api");
    assert_eq!(apps[0]["env"], json!({"NODE_ENV": "production", "PORT": "3000"}));
    assert!(apps[0].get("env_production").is_none());
    assert_eq!(apps[0]["max_memory_restart"], "500M");
    assert_eq!(apps[1]["exec_mode"], "cluster");
    assert_eq!(apps[1]["instances"], 4);
}

#[test]
fn test_show_table() {
    let ws = Workspace::new();
    let path = ws.write("ecosystem.json", VALID_ECOSYSTEM);

    let output = ws.run(&["show", path.to_str().unwrap()]);
    let out = stdout(&output);

    assert!(output.status.success(), "{}", out);
    assert!(out.contains("NAME"), "{}", out);
    assert!(out.contains("python3 api.py"), "{}", out);
    assert!(out.contains("worker"), "{}", out);
}
