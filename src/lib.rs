//! bush - generate `package.json` manifests for a multi-package workspace
//!
//! This crate provides the library side of bush: the `bush.yaml` schema,
//! package-alias trees, reference resolution and manifest materialization.

pub mod core;
pub mod ops;
pub mod util;

/// Test utilities for bush unit tests.
///
/// This module is only available when compiling with `--cfg test`. It
/// provides helpers for writing configurations and manifests into
/// temporary directories.
#[cfg(test)]
pub mod test_support;

pub use core::{config::Config, manifest::Manifest, package::Package};
pub use util::shell::Shell;
