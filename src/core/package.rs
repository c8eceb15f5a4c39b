//! Package - a concrete tree node resolved to a name and a location.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::core::alias::AliasPath;
use crate::core::config::{ConfigError, WorkspaceConfig};
use crate::core::tree::Site;
use crate::util::fs::is_plain_component;

/// A package a workspace materializes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Package {
    /// Workspace the package belongs to.
    workspace: String,
    alias: AliasPath,
    /// `@scope/prefix-assignedName`.
    scoped_name: String,
    /// Absolute (root-joined) package directory.
    dir: PathBuf,
}

impl Package {
    /// Resolve the package for a concrete node of `workspace`.
    ///
    /// The directory is `<root>/<workspace>/<shortName>` under the flat
    /// layout and `<root>/<workspace>/<fsPath>` otherwise. A flat short name
    /// must be a plain directory name.
    pub fn new(
        root: &Path,
        workspace: &WorkspaceConfig,
        site: &Site,
        assigned: &str,
    ) -> Result<Self, ConfigError> {
        let short_name = short_name(&workspace.prefix, assigned);
        let scoped_name = scoped_name(&workspace.scope, &short_name);

        let workspace_dir = root.join(&workspace.name);
        let dir = if workspace.flat {
            if !is_plain_component(&short_name) {
                return Err(ConfigError::InvalidSegment {
                    workspace: workspace.name.clone(),
                    alias: site.alias.to_string(),
                    segment: short_name,
                });
            }
            workspace_dir.join(&short_name)
        } else {
            workspace_dir.join(&site.fs_path)
        };

        Ok(Package {
            workspace: workspace.name.clone(),
            alias: site.alias.clone(),
            scoped_name,
            dir,
        })
    }

    pub fn workspace(&self) -> &str {
        &self.workspace
    }

    pub fn alias(&self) -> &AliasPath {
        &self.alias
    }

    pub fn scoped_name(&self) -> &str {
        &self.scoped_name
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl fmt::Display for Package {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}:{})", self.scoped_name, self.workspace, self.alias)
    }
}

/// `prefix-name`, or just `name` when the prefix is empty.
pub fn short_name(prefix: &str, assigned: &str) -> String {
    if prefix.is_empty() {
        assigned.to_string()
    } else {
        format!("{}-{}", prefix, assigned)
    }
}

/// `@scope/name`, or just `name` when the scope is empty. A leading `@` in
/// the configured scope is accepted.
pub fn scoped_name(scope: &str, short_name: &str) -> String {
    let scope = scope.trim_start_matches('@');
    if scope.is_empty() {
        short_name.to_string()
    } else {
        format!("@{}/{}", scope, short_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::tree::PackageTree;
    use indexmap::IndexMap;

    fn workspace(scope: &str, prefix: &str, flat: bool) -> WorkspaceConfig {
        WorkspaceConfig {
            name: "libs".to_string(),
            tree: PackageTree::default(),
            names: IndexMap::new(),
            references: IndexMap::new(),
            attributes: Vec::new(),
            scope: scope.to_string(),
            prefix: prefix.to_string(),
            flat,
        }
    }

    fn site(alias: &str, fs_path: &str) -> Site {
        Site {
            alias: AliasPath::from(alias),
            fs_path: PathBuf::from(fs_path),
        }
    }

    #[test]
    fn test_names() {
        assert_eq!(short_name("pkg", "engine"), "pkg-engine");
        assert_eq!(short_name("", "engine"), "engine");
        assert_eq!(scoped_name("acme", "pkg-engine"), "@acme/pkg-engine");
        assert_eq!(scoped_name("@acme", "pkg-engine"), "@acme/pkg-engine");
        assert_eq!(scoped_name("", "engine"), "engine");
    }

    #[test]
    fn test_nested_layout() {
        let ws = workspace("acme", "pkg", false);
        let pkg =
            Package::new(Path::new("/repo"), &ws, &site("ui.forms", "ui/forms"), "forms").unwrap();

        assert_eq!(pkg.scoped_name(), "@acme/pkg-forms");
        assert_eq!(pkg.dir(), Path::new("/repo/libs/ui/forms"));
        assert_eq!(pkg.to_string(), "@acme/pkg-forms (libs:ui.forms)");
    }

    #[test]
    fn test_flat_layout() {
        let ws = workspace("acme", "pkg", true);
        let pkg =
            Package::new(Path::new("/repo"), &ws, &site("ui.forms", "ui/forms"), "forms").unwrap();

        assert_eq!(pkg.scoped_name(), "@acme/pkg-forms");
        assert_eq!(pkg.dir(), Path::new("/repo/libs/pkg-forms"));
    }

    #[test]
    fn test_flat_name_must_stay_in_workspace() {
        let root = Path::new("/repo");
        let escaping = workspace("acme", "", true);
        let err = Package::new(root, &escaping, &site("a", "a"), "../../etc").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidSegment { segment, .. } if segment == "../../etc"));

        let prefixed = workspace("acme", "tools/bin", true);
        assert!(Package::new(root, &prefixed, &site("a", "a"), "x").is_err());

        // Nested layouts take their directory from the tree, not the name.
        let nested = workspace("acme", "", false);
        assert!(Package::new(root, &nested, &site("a", "a"), "odd/name").is_ok());
    }
}
