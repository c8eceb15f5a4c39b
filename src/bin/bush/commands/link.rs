//! `bush link` command

use anyhow::Result;

use crate::cli::LinkArgs;
use crate::GlobalOptions;
use bush::ops::bush_link::{link, LinkOptions};

pub fn execute(args: LinkArgs, global_opts: &GlobalOptions) -> Result<()> {
    let opts = LinkOptions {
        root: global_opts.root.clone(),
        scope: args.scope,
        manager: args.manager,
    };

    let linked = link(&opts, &global_opts.shell)?;
    tracing::debug!("linked {} package(s)", linked.len());

    Ok(())
}
