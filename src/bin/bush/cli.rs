//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

/// bush - generate package.json manifests for a multi-package workspace
#[derive(Parser)]
#[command(name = "bush")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Repository root (defaults to the current directory)
    #[arg(long, global = true, env = "BUSH_ROOT")]
    pub root: Option<PathBuf>,

    /// Path to the configuration file (defaults to <root>/bush.yaml)
    #[arg(short, long, global = true, env = "BUSH_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only print errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Coloring: auto, always, never
    #[arg(long, global = true, default_value = "auto")]
    pub color: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write every workspace manifest from bush.yaml
    Sync(SyncArgs),

    /// Run `<manager> link` in every package of a scope
    Link(LinkArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Args)]
pub struct SyncArgs {
    /// Record unresolved tree leaves in bush.yaml with an empty name
    #[arg(long)]
    pub fill_gaps: bool,

    /// Do not run the package manager's install afterwards
    #[arg(long)]
    pub no_install: bool,
}

#[derive(Args)]
pub struct LinkArgs {
    /// Name prefix packages must start with (e.g. "@acme/")
    #[arg(long)]
    pub scope: String,

    /// Package-manager command
    #[arg(long, default_value = "npm")]
    pub manager: String,
}

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::parse_from(["bush", "sync", "--root", "/repo", "-c", "/repo/alt.yaml", "-v"]);

        assert_eq!(cli.root, Some(PathBuf::from("/repo")));
        assert_eq!(cli.config, Some(PathBuf::from("/repo/alt.yaml")));
        assert!(cli.verbose);
        assert!(!cli.quiet);
        assert_eq!(cli.color, "auto");
    }

    #[test]
    fn test_quiet_conflicts_with_verbose() {
        assert!(Cli::try_parse_from(["bush", "-q", "-v", "sync"]).is_err());
    }

    #[test]
    fn test_link_requires_scope() {
        assert!(Cli::try_parse_from(["bush", "link"]).is_err());
    }
}
