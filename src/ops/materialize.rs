//! Manifest materialization.

use std::path::Path;

use anyhow::{Context, Result};
use serde_json::Value;

use crate::core::{AliasPath, DependencySet, Manifest, Resolver, WorkspaceConfig};
use crate::util::fs;

/// What happened to a manifest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The manifest did not exist and was seeded from the template.
    Created,
    /// An existing manifest was rewritten.
    Updated,
}

/// Collect the dependencies of one package: its direct references first,
/// then every matching attribute block in configuration order.
pub fn package_dependencies(
    workspace: &WorkspaceConfig,
    alias: &AliasPath,
    resolver: &Resolver<'_>,
) -> DependencySet {
    let mut dependencies = DependencySet::new();

    if let Some(direct) = workspace.references_for(alias) {
        resolver.apply(direct, &mut dependencies);
    }
    for block in workspace.matching_attributes(alias) {
        tracing::debug!(
            "attribute block `{}` applies to {}:{}",
            block.pattern.as_str(),
            workspace.name,
            alias
        );
        resolver.apply(&block.references, &mut dependencies);
    }

    dependencies
}

/// Ensure `<dir>/package.json` exists and carries `name` and exactly
/// `dependencies`.
///
/// `template` is only evaluated when the manifest has to be created.
pub fn materialize<T>(
    dir: &Path,
    name: &str,
    template: T,
    dependencies: &DependencySet,
) -> Result<Outcome>
where
    T: FnOnce() -> Result<Value>,
{
    fs::ensure_dir(dir)?;

    let mut manifest = Manifest::in_dir(dir);
    let outcome = if manifest.exists() {
        Outcome::Updated
    } else {
        manifest
            .seed(template()?, name)
            .with_context(|| format!("failed to create {}", manifest.path().display()))?;
        Outcome::Created
    };

    manifest
        .stamp(name, dependencies)
        .with_context(|| format!("failed to update {}", manifest.path().display()))?;

    Ok(outcome)
}
