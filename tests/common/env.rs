//! Isolated test environment for running the microzoo binary.

use std::path::{Path, PathBuf};
use std::process::{Child, Command, Output, Stdio};

use tempfile::TempDir;

use super::fixtures::{GO_SERVICE, POSTGRES};

/// Result of running a microzoo command
#[derive(Debug)]
pub struct TestResult {
    pub success: bool,
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl TestResult {
    /// Parse every non-empty stdout line as JSON
    pub fn events(&self) -> Vec<serde_json::Value> {
        self.stdout
            .lines()
            .filter(|l| !l.trim().is_empty())
            .map(|l| {
                serde_json::from_str(l)
                    .unwrap_or_else(|e| panic!("not NDJSON ({e}): {l}\n{}", self.stdout))
            })
            .collect()
    }

    /// First event with the given `event` field
    pub fn event(&self, name: &str) -> Option<serde_json::Value> {
        self.events().into_iter().find(|e| e["event"] == name)
    }
}

/// Temp working directory with `components/` and `diagrams/` in the
/// default locations, and a private config home.
pub struct TestEnv {
    pub root: TempDir,
    config_home: TempDir,
    bin: PathBuf,
}

impl TestEnv {
    /// Empty environment
    pub fn new() -> Self {
        Self {
            root: TempDir::new().expect("Failed to create temp dir"),
            config_home: TempDir::new().expect("Failed to create config home"),
            bin: PathBuf::from(env!("CARGO_BIN_EXE_microzoo")),
        }
    }

    /// Environment with the service and postgres manifests installed
    pub fn with_standard_components() -> Self {
        let env = Self::new();
        env.write("components/service/go-service/manifest.toml", GO_SERVICE);
        env.write("components/database/postgres/manifest.toml", POSTGRES);
        env
    }

    pub fn path(&self, relative: &str) -> PathBuf {
        self.root.path().join(relative)
    }

    pub fn write(&self, relative: &str, content: &str) {
        let full = self.path(relative);
        if let Some(parent) = full.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create directories");
        }
        std::fs::write(&full, content).expect("Failed to write file");
    }

    pub fn read(&self, relative: &str) -> String {
        std::fs::read_to_string(self.path(relative))
            .unwrap_or_else(|e| panic!("Failed to read {relative}: {e}"))
    }

    pub fn write_diagram(&self, name: &str, content: &str) {
        self.write(&format!("diagrams/{name}.puml"), content);
    }

    pub fn run(&self, args: &[&str]) -> TestResult {
        self.run_with_env(args, &[])
    }

    pub fn run_with_env(&self, args: &[&str], vars: &[(&str, &str)]) -> TestResult {
        let output = self
            .command(args, vars)
            .output()
            .expect("Failed to execute microzoo");
        to_result(output)
    }

    /// Start microzoo without waiting for it; output is discarded
    pub fn spawn_with_env(&self, args: &[&str], vars: &[(&str, &str)]) -> Child {
        self.command(args, vars)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .expect("Failed to start microzoo")
    }

    fn command(&self, args: &[&str], vars: &[(&str, &str)]) -> Command {
        let mut cmd = Command::new(&self.bin);
        cmd.current_dir(self.root.path())
            .args(args)
            .env("XDG_CONFIG_HOME", self.config_home.path())
            .env("NO_COLOR", "1")
            .env_remove("RUST_LOG");
        for (key, value) in vars {
            cmd.env(key, value);
        }
        cmd
    }

    /// Install an executable script that appends its arguments to `log`
    /// and exits with `exit_code`
    #[cfg(unix)]
    pub fn fake_tool(&self, name: &str, log: &Path, exit_code: i32) -> PathBuf {
        self.script_tool(
            name,
            &format!(
                "echo \"$@\" >> '{}'\necho \"fake {name} $1\"\nexit {exit_code}\n",
                log.display()
            ),
        )
    }

    /// Install an executable `sh` script with the given body
    #[cfg(unix)]
    pub fn script_tool(&self, name: &str, body: &str) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let script = self.path(&format!("bin/{name}"));
        self.write(&format!("bin/{name}"), &format!("#!/bin/sh\n{body}"));
        let mut perms = std::fs::metadata(&script).unwrap().permissions();
        perms.set_mode(0o755);
        std::fs::set_permissions(&script, perms).unwrap();
        script
    }
}

fn to_result(output: Output) -> TestResult {
    TestResult {
        success: output.status.success(),
        exit_code: output.status.code().unwrap_or(-1),
        stdout: String::from_utf8_lossy(&output.stdout).to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
    }
}
