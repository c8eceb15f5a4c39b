//! `bush sync` - materialize every workspace package manifest.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};

use crate::core::{Config, DependencySet, Resolver};
use crate::ops::gap_fill::record_gap;
use crate::ops::materialize::{materialize, package_dependencies, Outcome};
use crate::ops::plan::{Step, SyncPlan};
use crate::util::process::{find_package_manager, ProcessBuilder};
use crate::util::{Shell, Status, YamlFile};

/// Options for a sync run.
#[derive(Debug, Clone)]
pub struct SyncOptions {
    /// Repository root; workspace directories are resolved against it.
    pub root: PathBuf,
    /// Path to `bush.yaml`.
    pub config_path: PathBuf,
    /// Record unresolved leaves in the configuration.
    pub fill_gaps: bool,
    /// Run `<manager> install` in the root afterwards.
    pub install: bool,
}

/// Counts reported at the end of a sync.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncSummary {
    pub created: usize,
    pub updated: usize,
    pub gaps: usize,
    /// Whether the root manifest was created by this run.
    pub root_created: bool,
}

impl SyncSummary {
    pub fn packages(&self) -> usize {
        self.created + self.updated
    }

    fn count(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Created => self.created += 1,
            Outcome::Updated => self.updated += 1,
        }
    }
}

/// Run a full sync.
///
/// The configuration is planned in full before the first write, so a
/// configuration error leaves every manifest untouched.
pub fn sync(opts: &SyncOptions, shell: &Arc<Shell>) -> Result<SyncSummary> {
    let mut source = YamlFile::new(&opts.config_path);
    let config = Config::load(&mut source)
        .with_context(|| format!("failed to load {}", opts.config_path.display()))?;

    let span = shell.span(Status::Syncing, &config);

    let plan = SyncPlan::build(&config, &opts.root, opts.fill_gaps)?;
    let workspace_packages = plan.workspace_packages(&config.name);
    let resolver = Resolver::new(
        &config.references,
        config.protocol.as_deref(),
        &workspace_packages,
    );

    let mut summary = SyncSummary::default();
    for step in plan.steps() {
        match step {
            Step::Materialize(package) => {
                let workspace = config
                    .workspace(package.workspace())
                    .with_context(|| format!("unknown workspace `{}`", package.workspace()))?;
                let dependencies = package_dependencies(workspace, package.alias(), &resolver);
                let outcome = materialize(
                    package.dir(),
                    package.scoped_name(),
                    || Ok(config.template_manifest()?),
                    &dependencies,
                )
                .with_context(|| format!("failed to materialize {}", package))?;

                summary.count(outcome);
                shell.status(outcome_status(outcome), package);
            }
            Step::FillGap { workspace, alias } => {
                if record_gap(&mut source, workspace, alias)? {
                    summary.gaps += 1;
                    shell.status(Status::Recorded, format!("{}:{}", workspace, alias));
                } else {
                    shell.verbose(Status::Skipped, format!("{}:{} (already recorded)", workspace, alias));
                }
            }
            Step::Skip { workspace, alias } => {
                shell.verbose(Status::Skipped, format!("{}:{} (no name)", workspace, alias));
            }
        }
    }

    let outcome = sync_root(opts, &config, &resolver)?;
    summary.root_created = outcome == Outcome::Created;
    shell.status(outcome_status(outcome), format!("{} (root)", config.name));

    if opts.install {
        install(opts, &config, shell)?;
    }

    span.finish_with_message(format!(
        "{} package{}",
        summary.packages(),
        if summary.packages() == 1 { "" } else { "s" }
    ));
    Ok(summary)
}

/// Materialize `<root>/package.json` from the root references.
fn sync_root(opts: &SyncOptions, config: &Config, resolver: &Resolver<'_>) -> Result<Outcome> {
    let mut dependencies = DependencySet::new();
    resolver.apply(&config.root_references, &mut dependencies);

    materialize(
        &opts.root,
        &config.name,
        || Ok(config.template_manifest()?),
        &dependencies,
    )
    .context("failed to materialize the root manifest")
}

fn install(opts: &SyncOptions, config: &Config, shell: &Shell) -> Result<()> {
    let manager = find_package_manager(&config.manager)?;
    let install = ProcessBuilder::new(&manager).arg("install").cwd(&opts.root);

    shell.status(Status::Installing, format!("{} install", config.manager));
    install.status_and_check()
}

fn outcome_status(outcome: Outcome) -> Status {
    match outcome {
        Outcome::Created => Status::Created,
        Outcome::Updated => Status::Updated,
    }
}
