#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use tempfile::TempDir;

pub const ADMIN_PASSWORD: &str = "adm1n";

pub struct TestData {
    dir: TempDir,
}

impl TestData {
    /// Data directory with `admin` plus the given `(name, password)` users.
    pub fn with_users(users: &[(&str, &str)]) -> std::io::Result<Self> {
        let data = Self::empty()?;
        let mut content = format!("admin, {ADMIN_PASSWORD}\n");
        for (name, password) in users {
            content.push_str(&format!("{name}, {password}\n"));
        }
        data.write_file("user.txt", &content)?;
        Ok(data)
    }

    pub fn empty() -> std::io::Result<Self> {
        Ok(Self {
            dir: tempfile::tempdir()?,
        })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn write_file(&self, rel_path: &str, contents: &str) -> std::io::Result<PathBuf> {
        let path = self.dir.path().join(rel_path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, contents)?;
        Ok(path)
    }

    pub fn write_tasks(&self, lines: &[&str]) -> std::io::Result<PathBuf> {
        let mut content = lines.join("\n");
        content.push('\n');
        self.write_file("tasks.txt", &content)
    }

    pub fn read_file(&self, rel_path: &str) -> std::io::Result<String> {
        fs::read_to_string(self.dir.path().join(rel_path))
    }

    pub fn read_tasks(&self) -> std::io::Result<String> {
        self.read_file("tasks.txt")
    }

    /// Command bound to this data directory with no credentials.
    pub fn cmd(&self) -> Command {
        let mut cmd = taskman_cmd();
        cmd.arg("--data-dir").arg(self.path());
        cmd
    }

    /// Command bound to this data directory, authenticated as `user`.
    pub fn cmd_as(&self, user: &str, password: &str) -> Command {
        let mut cmd = self.cmd();
        cmd.args(["--user", user, "--password", password]);
        cmd
    }

    pub fn admin_cmd(&self) -> Command {
        self.cmd_as("admin", ADMIN_PASSWORD)
    }
}

pub fn taskman_cmd() -> Command {
    let mut cmd = Command::cargo_bin("taskman").expect("binary");
    cmd.env_remove("TASKMAN_DATA_DIR")
        .env_remove("TASKMAN_USER")
        .env_remove("TASKMAN_PASSWORD")
        .env_remove("RUST_LOG");
    cmd
}

pub fn json_stdout(cmd: &mut Command) -> serde_json::Value {
    let output = cmd.arg("--json").assert().success().get_output().stdout.clone();
    serde_json::from_slice(&output).expect("json output")
}
