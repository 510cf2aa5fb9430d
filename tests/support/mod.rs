#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use serde_json::Value;
use tempfile::TempDir;

/// A throwaway data directory for one test.
pub struct TestData {
    dir: TempDir,
}

impl TestData {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("failed to create tempdir");
        Self { dir }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn snapshot_path(&self) -> PathBuf {
        self.dir.path().join("tasks.json")
    }

    pub fn write_file(&self, rel_path: &str, contents: &str) -> std::io::Result<PathBuf> {
        let path = self.dir.path().join(rel_path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, contents)?;
        Ok(path)
    }

    pub fn write_config(&self, contents: &str) -> std::io::Result<PathBuf> {
        self.write_file("taskcal.toml", contents)
    }

    pub fn read_snapshot(&self) -> Value {
        let raw = fs::read_to_string(self.snapshot_path()).expect("snapshot");
        serde_json::from_str(&raw).expect("snapshot json")
    }

    /// `taskcal` pointed at this data directory, isolated from the caller's env.
    pub fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("taskcal").expect("binary");
        cmd.current_dir(self.dir.path())
            .env_remove("TASKCAL_CONFIG")
            .env_remove("RUST_LOG")
            .env("TASKCAL_DATA_DIR", self.dir.path());
        cmd
    }

    /// Run with `--json` and parse the envelope.
    pub fn json(&self, args: &[&str]) -> Value {
        let output = self.cmd().args(args).arg("--json").output().expect("run");
        serde_json::from_slice(&output.stdout).expect("json envelope")
    }
}
