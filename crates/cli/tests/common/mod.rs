//! Common utilities for integration tests

pub mod cli;

use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// A temporary tree with a config file at its root
pub struct TestTree {
    pub dir: TempDir,
}

impl TestTree {
    pub fn with_config(text: &str) -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        fs::write(dir.path().join("twinsync.toml"), text).expect("Failed to write config");
        Self { dir }
    }

    pub fn config_path(&self) -> PathBuf {
        self.dir.path().join("twinsync.toml")
    }

    pub fn config_arg(&self) -> String {
        self.config_path().to_string_lossy().into_owned()
    }
}
