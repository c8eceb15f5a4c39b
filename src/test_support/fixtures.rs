//! Test fixtures for common test scenarios.
//!
//! This module provides a repository fixture: a `bush.yaml` plus any
//! manifests that already exist before a sync runs.

use std::path::{Path, PathBuf};

use super::{write_config, write_manifest};

/// Fixture for a repository checkout.
#[derive(Debug, Clone)]
pub struct RepoFixture {
    /// `bush.yaml` content.
    pub config: String,
    /// Pre-existing manifests (directory relative to the root -> content).
    pub manifests: Vec<(PathBuf, String)>,
}

impl RepoFixture {
    pub fn new(config: impl Into<String>) -> Self {
        RepoFixture {
            config: config.into(),
            manifests: Vec::new(),
        }
    }

    /// A single `libs` workspace with one concrete package,
    /// `@acme/pkg-engine` at `libs/core`.
    pub fn single_package() -> Self {
        RepoFixture::new(
            r#"name: monorepo
references:
  x:
    version: 2.0.0
workspaces:
  libs:
    scope: acme
    prefix: pkg
    tree:
      core: {}
    names:
      core: engine
    references:
      core:
        x:
          is-dev: true
"#,
        )
    }

    /// Add a manifest that exists before the sync.
    pub fn with_manifest(mut self, dir: impl Into<PathBuf>, json: impl Into<String>) -> Self {
        self.manifests.push((dir.into(), json.into()));
        self
    }

    /// Write the fixture into `root`.
    pub fn write_to(&self, root: &Path) {
        write_config(root, &self.config);
        for (dir, json) in &self.manifests {
            write_manifest(&root.join(dir), json);
        }
    }
}
