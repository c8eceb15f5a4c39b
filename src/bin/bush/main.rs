//! bush CLI - generate package.json manifests for a multi-package workspace

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use bush::core::config::CONFIG_FILE;
use bush::util::shell::{ColorChoice, Shell};
use cli::{Cli, Commands};

/// Options shared by every command.
pub struct GlobalOptions {
    pub shell: Arc<Shell>,
    /// Repository root.
    pub root: PathBuf,
    /// Path to `bush.yaml`.
    pub config_path: PathBuf,
}

impl GlobalOptions {
    fn from_cli(cli: &Cli) -> Result<Self> {
        let color: ColorChoice = cli.color.parse().map_err(|e: String| anyhow::anyhow!(e))?;
        let shell = Arc::new(Shell::from_flags(cli.quiet, cli.verbose, color));

        let cwd = std::env::current_dir().context("failed to read the current directory")?;
        let root = match &cli.root {
            Some(root) => cwd.join(root),
            None => cwd.clone(),
        };
        let config_path = match &cli.config {
            Some(config) => cwd.join(config),
            None => root.join(CONFIG_FILE),
        };

        Ok(GlobalOptions {
            shell,
            root,
            config_path,
        })
    }
}

fn main() {
    if let Err(e) = run() {
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    // Parse CLI
    let cli = Cli::parse();

    // Set up logging
    let filter = if cli.verbose {
        EnvFilter::new("bush=debug")
    } else {
        EnvFilter::new("bush=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();

    let global_opts = GlobalOptions::from_cli(&cli)?;

    // Execute command
    match cli.command {
        Commands::Sync(args) => commands::sync::execute(args, &global_opts),
        Commands::Link(args) => commands::link::execute(args, &global_opts),
        Commands::Completions(args) => commands::completions::execute(args),
    }
}
