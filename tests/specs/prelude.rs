// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Gateway Authors

//! Shared harness for the `gatewayctl` specs: a fluent wrapper over
//! `assert_cmd` plus a scratch directory helper for throwaway YAML files.

use assert_cmd::Command;
use std::path::Path;

pub fn gatewayctl() -> Cli {
    Cli { command: Command::cargo_bin("gatewayctl").expect("gatewayctl binary builds") }
}

pub struct Cli {
    command: Command,
}

impl Cli {
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<std::ffi::OsStr>,
    {
        self.command.args(args);
        self
    }

    pub fn env(mut self, key: &str, value: &str) -> Self {
        self.command.env(key, value);
        self
    }

    pub fn env_remove(mut self, key: &str) -> Self {
        self.command.env_remove(key);
        self
    }

    pub fn passes(mut self) -> Outcome {
        let output = self.command.output().expect("gatewayctl runs");
        assert!(
            output.status.success(),
            "expected success, got {:?}\nstdout: {}\nstderr: {}",
            output.status,
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr),
        );
        Outcome::from(output)
    }

    pub fn fails(mut self) -> Outcome {
        let output = self.command.output().expect("gatewayctl runs");
        assert!(!output.status.success(), "expected failure, command succeeded");
        Outcome::from(output)
    }
}

pub struct Outcome {
    pub stdout: String,
    pub stderr: String,
}

impl From<std::process::Output> for Outcome {
    fn from(output: std::process::Output) -> Self {
        Self {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        }
    }
}

impl Outcome {
    pub fn stdout_has(self, needle: &str) -> Self {
        assert!(self.stdout.contains(needle), "stdout missing {needle:?}:\n{}", self.stdout);
        self
    }

    pub fn stderr_has(self, needle: &str) -> Self {
        assert!(self.stderr.contains(needle), "stderr missing {needle:?}:\n{}", self.stderr);
        self
    }
}

pub fn write_temp_yaml(dir: &tempfile::TempDir, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, contents).expect("write scratch yaml");
    path
}

#[allow(dead_code)]
pub fn repo_root() -> &'static Path {
    Path::new(env!("CARGO_MANIFEST_DIR"))
}
