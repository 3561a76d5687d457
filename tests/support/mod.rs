//! Test support utilities for simple-container integration tests.
//!
//! Provides isolated repositories, key fixtures and command helpers.

#![allow(dead_code)]

pub mod assertions;
pub mod commands;
pub mod fixtures;

#[allow(unused_imports)]
pub use assertions::*;
#[allow(unused_imports)]
pub use fixtures::*;

use std::fs;
use std::path::PathBuf;

use simple_container::core::git::Workdir;
use tempfile::TempDir;

/// Test environment with an isolated repository and home directory.
///
/// Child processes use `.current_dir()`, so no process-global state is
/// mutated and tests can run in parallel.
pub struct Test {
    /// Repository root
    pub dir: TempDir,
    /// Temporary home directory
    pub home: TempDir,
}

impl Test {
    /// Empty repository without a profile.
    pub fn new() -> Self {
        let dir = TempDir::new().expect("failed to create temp dir");
        let home = TempDir::new().expect("failed to create temp home");
        Workdir::init(dir.path()).expect("failed to init repository");
        Self { dir, home }
    }

    /// Repository with an Ed25519 `default` profile.
    pub fn init() -> Self {
        let t = Self::new();
        let output = t.init_cmd(&["--ed25519"]);
        assert_success(&output);
        t
    }

    /// Absolute path of a repository-relative file.
    pub fn path(&self, relative: &str) -> PathBuf {
        self.dir.path().join(relative)
    }

    /// Write a repository-relative file, creating parent directories.
    pub fn write(&self, relative: &str, contents: &str) {
        let path = self.path(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("failed to create parent dir");
        }
        fs::write(path, contents).expect("failed to write file");
    }

    /// Read a repository-relative file.
    pub fn read(&self, relative: &str) -> String {
        fs::read_to_string(self.path(relative)).expect("failed to read file")
    }

    pub fn exists(&self, relative: &str) -> bool {
        self.path(relative).exists()
    }

    /// Public key of the `default` profile.
    pub fn public_key(&self) -> String {
        let profile = self.read(".sc/cfg.default.yaml");
        let config: serde_yaml::Value =
            serde_yaml::from_str(&profile).expect("profile is valid yaml");
        config["publicKey"]
            .as_str()
            .expect("profile has an inline public key")
            .to_string()
    }
}
