//! `bush link` - register scoped packages with the package manager.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::core::Manifest;
use crate::util::fs::{find_manifests, relative_path};
use crate::util::process::{find_package_manager, ProcessBuilder};
use crate::util::{Shell, Status};

/// Options for linking packages.
#[derive(Debug, Clone)]
pub struct LinkOptions {
    /// Directory searched for manifests.
    pub root: PathBuf,
    /// Only packages whose name starts with this are linked.
    pub scope: String,
    /// Package-manager command.
    pub manager: String,
}

/// A package that was linked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkedPackage {
    pub name: String,
    pub dir: PathBuf,
}

/// Run `<manager> link` in every package under `root` whose name starts
/// with the scope prefix.
///
/// `node_modules` directories are never searched. Manifests without a
/// string `name` are passed over.
pub fn link(opts: &LinkOptions, shell: &Shell) -> Result<Vec<LinkedPackage>> {
    let matches = matching_packages(&opts.root, &opts.scope, shell)?;
    if matches.is_empty() {
        shell.note(format!("no packages matching `{}`", opts.scope));
        return Ok(matches);
    }

    let manager = find_package_manager(&opts.manager)?;
    for package in &matches {
        let display = relative_path(&opts.root, &package.dir);
        shell.status(
            Status::Linking,
            format!("{} ( {} )", display_dir(&display), package.name),
        );

        ProcessBuilder::new(&manager)
            .arg("link")
            .cwd(&package.dir)
            .status_and_check()
            .with_context(|| format!("failed to link {}", package.name))?;
    }

    Ok(matches)
}

/// Packages under `root` whose manifest name starts with `scope`, in path
/// order. Manifests that fail to parse are reported and passed over.
pub fn matching_packages(root: &Path, scope: &str, shell: &Shell) -> Result<Vec<LinkedPackage>> {
    let mut packages = Vec::new();

    for path in find_manifests(root)? {
        let mut manifest = Manifest::at(&path);
        let name = match manifest.name() {
            Ok(Some(name)) => name,
            Ok(None) => {
                tracing::debug!("{} has no name", path.display());
                continue;
            }
            Err(err) => {
                shell.warn(format!("skipping {}: {:#}", path.display(), err));
                continue;
            }
        };

        if name.starts_with(scope) {
            packages.push(LinkedPackage {
                name,
                dir: manifest.dir().to_path_buf(),
            });
        }
    }

    Ok(packages)
}

fn display_dir(path: &Path) -> String {
    if path.as_os_str().is_empty() {
        ".".to_string()
    } else {
        path.display().to_string()
    }
}
