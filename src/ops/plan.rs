//! Sync planning.
//!
//! Every workspace tree is walked before anything is written, so the full
//! set of workspace-internal package names is known when the first manifest
//! resolves its references.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use anyhow::{bail, Result};

use crate::core::{walk, AliasPath, Config, Package, Site, TreeVisitor, WorkspaceConfig};

/// One unit of work, in walk order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Materialize a concrete node's manifest.
    Materialize(Package),
    /// Record an empty name for an unresolved leaf.
    FillGap { workspace: String, alias: AliasPath },
    /// A node passed over on the way to its descendants.
    Skip { workspace: String, alias: AliasPath },
}

/// The ordered steps of a sync run.
#[derive(Debug, Clone, Default)]
pub struct SyncPlan {
    steps: Vec<Step>,
}

impl SyncPlan {
    /// Walk every workspace of `config` in configuration order.
    pub fn build(config: &Config, root: &Path, fill_gaps: bool) -> Result<Self> {
        let mut steps = Vec::new();

        for workspace in &config.workspaces {
            let mut planner = Planner {
                root,
                workspace,
                steps: &mut steps,
            };
            walk(&workspace.tree, fill_gaps, &mut planner)?;
        }

        let plan = SyncPlan { steps };
        plan.check_unique_names(&config.name)?;
        Ok(plan)
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn packages(&self) -> impl Iterator<Item = &Package> {
        self.steps.iter().filter_map(|step| match step {
            Step::Materialize(package) => Some(package),
            _ => None,
        })
    }

    /// Scoped names of every package the plan materializes, plus the root
    /// package name.
    pub fn workspace_packages(&self, root_name: &str) -> BTreeSet<String> {
        self.packages()
            .map(|package| package.scoped_name().to_string())
            .chain(std::iter::once(root_name.to_string()))
            .collect()
    }

    fn check_unique_names(&self, root_name: &str) -> Result<()> {
        let mut seen: BTreeMap<&str, &Package> = BTreeMap::new();
        for package in self.packages() {
            if package.scoped_name() == root_name {
                bail!(
                    "package `{}` at `{}:{}` has the same name as the root package",
                    package.scoped_name(),
                    package.workspace(),
                    package.alias()
                );
            }
            if let Some(previous) = seen.insert(package.scoped_name(), package) {
                bail!(
                    "package name `{}` is assigned to both `{}:{}` and `{}:{}`",
                    package.scoped_name(),
                    previous.workspace(),
                    previous.alias(),
                    package.workspace(),
                    package.alias()
                );
            }
        }
        Ok(())
    }
}

struct Planner<'a> {
    root: &'a Path,
    workspace: &'a WorkspaceConfig,
    steps: &'a mut Vec<Step>,
}

impl TreeVisitor for Planner<'_> {
    fn concrete(&mut self, site: &Site, name: &str) -> Result<()> {
        let package = Package::new(self.root, self.workspace, site, name)?;
        self.steps.push(Step::Materialize(package));
        Ok(())
    }

    fn unresolved(&mut self, site: &Site) -> Result<()> {
        self.steps.push(Step::FillGap {
            workspace: self.workspace.name.clone(),
            alias: site.alias.clone(),
        });
        Ok(())
    }

    fn branch(&mut self, site: &Site) -> Result<()> {
        self.steps.push(Step::Skip {
            workspace: self.workspace.name.clone(),
            alias: site.alias.clone(),
        });
        Ok(())
    }
}
