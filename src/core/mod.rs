//! Core data structures for bush.
//!
//! This module contains the foundational types used throughout bush:
//! - The normalized `bush.yaml` configuration
//! - Package-alias trees and the tree walker
//! - Reference resolution and `package.json` manifests

pub mod alias;
pub mod config;
pub mod dependency;
pub mod manifest;
pub mod package;
pub mod tree;

pub use alias::AliasPath;
pub use config::{Config, ConfigError, WorkspaceConfig};
pub use dependency::{DependencySection, DependencySet, Resolver};
pub use manifest::Manifest;
pub use package::Package;
pub use tree::{walk, NodeKind, PackageTree, Site, TreeVisitor};
