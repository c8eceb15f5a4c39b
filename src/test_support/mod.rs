//! Test utilities for bush unit tests.
//!
//! Helpers here write configurations and manifests into temporary
//! directories and read the results back.
//!
//! # Example
//!
//! ```rust,ignore
//! use bush::test_support::{write_config, read_json};
//!
//! #[test]
//! fn test_example() {
//!     let tmp = tempfile::TempDir::new().unwrap();
//!     write_config(tmp.path(), "name: root\n");
//!     // Run a sync, then inspect the result...
//!     let root = read_json(&tmp.path().join("package.json"));
//! }
//! ```

pub mod fixtures;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_yaml::Value;

use crate::core::config::{revive_nulls, Config, CONFIG_FILE};
use crate::util::fs::MANIFEST_FILE;
use crate::util::shell::{ColorChoice, Shell, Verbosity};

// Re-export fixtures for convenience
pub use fixtures::*;

/// Parse and normalize a configuration the way `Config::load` does.
pub fn parse_config(yaml: &str) -> Config {
    let mut doc: Value = serde_yaml::from_str(yaml).expect("fixture YAML must parse");
    revive_nulls(&mut doc);
    Config::from_value(&doc).expect("fixture configuration must be valid")
}

/// Write `bush.yaml` into `root`.
pub fn write_config(root: &Path, yaml: &str) -> PathBuf {
    let path = root.join(CONFIG_FILE);
    std::fs::write(&path, yaml).expect("failed to write bush.yaml");
    path
}

/// Write `<dir>/package.json`, creating `dir` as needed.
pub fn write_manifest(dir: &Path, json: &str) -> PathBuf {
    std::fs::create_dir_all(dir).expect("failed to create manifest directory");
    let path = dir.join(MANIFEST_FILE);
    std::fs::write(&path, json).expect("failed to write package.json");
    path
}

/// Read a JSON file back.
pub fn read_json(path: &Path) -> serde_json::Value {
    let text = std::fs::read_to_string(path)
        .unwrap_or_else(|e| panic!("failed to read {}: {}", path.display(), e));
    serde_json::from_str(&text).expect("file must hold valid JSON")
}

/// A shell that only prints errors.
pub fn quiet_shell() -> Arc<Shell> {
    Arc::new(Shell::new(Verbosity::Quiet, ColorChoice::Never))
}
