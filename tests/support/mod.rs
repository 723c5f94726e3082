use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use serde_json::Value;
use tempfile::TempDir;

/// An isolated data directory and config path for one test
pub struct TestEnv {
    dir: TempDir,
}

impl TestEnv {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("failed to create tempdir");
        Self { dir }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn data_dir(&self) -> PathBuf {
        self.dir.path().join("data")
    }

    pub fn config_path(&self) -> PathBuf {
        self.dir.path().join("config.toml")
    }

    pub fn storage_path(&self) -> PathBuf {
        self.data_dir().join("storage.json")
    }

    pub fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("todomaster").expect("binary");
        cmd.current_dir(self.path())
            .env("TODOMASTER_DATA_DIR", self.data_dir())
            .env("TODOMASTER_CONFIG", self.config_path())
            .env_remove("RUST_LOG");
        cmd
    }

    /// Run a command with `--json` and return the parsed success envelope
    pub fn json(&self, args: &[&str]) -> Value {
        let output = self
            .cmd()
            .args(args)
            .arg("--json")
            .assert()
            .success()
            .get_output()
            .stdout
            .clone();
        serde_json::from_slice(&output).expect("json output")
    }

    /// Add a task and return its full id
    pub fn add_task(&self, title: &str) -> String {
        let value = self.json(&["add", title]);
        value["data"]["id"].as_str().expect("task id").to_string()
    }

    pub fn write_config(&self, contents: &str) {
        fs::write(self.config_path(), contents).expect("write config");
    }

    pub fn write_storage(&self, document: &Value) {
        fs::create_dir_all(self.data_dir()).expect("create data dir");
        fs::write(
            self.storage_path(),
            serde_json::to_string_pretty(document).expect("serialize"),
        )
        .expect("write storage");
    }

    pub fn read_storage(&self) -> Value {
        let contents = fs::read_to_string(self.storage_path()).expect("read storage");
        serde_json::from_str(&contents).expect("storage json")
    }

    pub fn write_file(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        fs::write(&path, contents).expect("write file");
        path
    }
}
