//! `bush sync` command

use anyhow::Result;

use crate::cli::SyncArgs;
use crate::GlobalOptions;
use bush::ops::bush_sync::{sync, SyncOptions};

pub fn execute(args: SyncArgs, global_opts: &GlobalOptions) -> Result<()> {
    let opts = SyncOptions {
        root: global_opts.root.clone(),
        config_path: global_opts.config_path.clone(),
        fill_gaps: args.fill_gaps,
        install: !args.no_install,
    };

    let summary = sync(&opts, &global_opts.shell)?;

    if summary.gaps > 0 {
        global_opts.shell.note(format!(
            "{} unresolved package{} recorded in {}",
            summary.gaps,
            if summary.gaps == 1 { "" } else { "s" },
            global_opts.config_path.display()
        ));
    }

    Ok(())
}
