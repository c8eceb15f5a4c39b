//! Package-alias trees and the depth-first tree walker.

use std::collections::HashSet;
use std::path::PathBuf;

use anyhow::Result;
use indexmap::IndexMap;
use serde_yaml::Value;

use crate::core::alias::AliasPath;
use crate::core::config::{kind_of, ConfigError};
use crate::util::fs::is_plain_component;

/// Classification of a tree node, decided once when the tree is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// No assigned name and no children.
    Unresolved,
    /// Assigned name, no children.
    Concrete(String),
    /// No assigned name; exists to reach descendants.
    Branch(Vec<TreeNode>),
    /// A package with nested packages beneath it.
    ConcreteWithChildren(String, Vec<TreeNode>),
}

impl NodeKind {
    fn classify(name: Option<&str>, children: Vec<TreeNode>) -> NodeKind {
        match (name, children.is_empty()) {
            (Some(name), true) => NodeKind::Concrete(name.to_string()),
            (Some(name), false) => NodeKind::ConcreteWithChildren(name.to_string(), children),
            (None, true) => NodeKind::Unresolved,
            (None, false) => NodeKind::Branch(children),
        }
    }

    pub fn children(&self) -> &[TreeNode] {
        match self {
            NodeKind::Branch(children) | NodeKind::ConcreteWithChildren(_, children) => children,
            NodeKind::Unresolved | NodeKind::Concrete(_) => &[],
        }
    }
}

/// A node of a package-alias tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeNode {
    /// Key of this node within its parent.
    pub segment: String,
    pub kind: NodeKind,
}

/// A workspace's package-alias tree, in configuration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackageTree {
    nodes: Vec<TreeNode>,
}

impl PackageTree {
    /// Build a tree from its YAML form, classifying each node against
    /// `names` (alias path to assigned name, `""` meaning unresolved).
    ///
    /// Leaves may be written as `{}`, `~` or `""`.
    pub fn from_yaml(
        workspace: &str,
        value: &Value,
        names: &IndexMap<String, String>,
    ) -> Result<Self, ConfigError> {
        let mut builder = TreeBuilder {
            workspace,
            names,
            seen: HashSet::new(),
        };
        let nodes = builder.children(&AliasPath::root(), value)?;
        Ok(PackageTree { nodes })
    }

    pub fn nodes(&self) -> &[TreeNode] {
        &self.nodes
    }
}

struct TreeBuilder<'a> {
    workspace: &'a str,
    names: &'a IndexMap<String, String>,
    seen: HashSet<AliasPath>,
}

impl TreeBuilder<'_> {
    fn children(
        &mut self,
        parent: &AliasPath,
        value: &Value,
    ) -> Result<Vec<TreeNode>, ConfigError> {
        let map = match value {
            Value::Mapping(map) => map,
            Value::Null => return Ok(Vec::new()),
            Value::String(s) if s.is_empty() => return Ok(Vec::new()),
            other => {
                return Err(ConfigError::InvalidTree {
                    workspace: self.workspace.to_string(),
                    alias: parent.to_string(),
                    found: kind_of(other),
                })
            }
        };

        let mut nodes = Vec::with_capacity(map.len());
        for (key, child) in map {
            let segment = match key {
                Value::String(s) => s.clone(),
                Value::Number(n) => n.to_string(),
                Value::Bool(b) => b.to_string(),
                other => {
                    return Err(ConfigError::NotAString {
                        context: format!(
                            "tree key under `{}` in workspace `{}`",
                            parent, self.workspace
                        ),
                        found: kind_of(other),
                    })
                }
            };

            let alias = parent.child(&segment);
            self.check_segment(&alias, &segment)?;
            if !self.seen.insert(alias.clone()) {
                return Err(ConfigError::DuplicateAlias {
                    workspace: self.workspace.to_string(),
                    alias: alias.to_string(),
                });
            }

            let grandchildren = self.children(&alias, child)?;
            let name = self
                .names
                .get(alias.as_str())
                .map(String::as_str)
                .filter(|name| !name.is_empty());

            nodes.push(TreeNode {
                segment,
                kind: NodeKind::classify(name, grandchildren),
            });
        }
        Ok(nodes)
    }

    /// Every dot-separated part of a segment becomes a directory, so each
    /// must be a plain path component.
    fn check_segment(&self, alias: &AliasPath, segment: &str) -> Result<(), ConfigError> {
        let parts: Vec<&str> = segment.split('.').filter(|part| !part.is_empty()).collect();
        let invalid = if parts.is_empty() {
            Some(segment)
        } else {
            parts.into_iter().find(|part| !is_plain_component(part))
        };

        match invalid {
            Some(invalid) => Err(ConfigError::InvalidSegment {
                workspace: self.workspace.to_string(),
                alias: alias.to_string(),
                segment: invalid.to_string(),
            }),
            None => Ok(()),
        }
    }
}

/// Where a visited node sits: its alias path and nested filesystem path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Site {
    pub alias: AliasPath,
    /// Relative directory for the nested layout; alias separators never
    /// appear in it.
    pub fs_path: PathBuf,
}

impl Site {
    fn root() -> Self {
        Site {
            alias: AliasPath::root(),
            fs_path: PathBuf::new(),
        }
    }

    fn child(&self, segment: &str) -> Self {
        let fs_path = segment
            .split('.')
            .filter(|s| !s.is_empty())
            .fold(self.fs_path.clone(), |path, part| path.join(part));
        Site {
            alias: self.alias.child(segment),
            fs_path,
        }
    }
}

/// Callbacks invoked by [`walk`].
pub trait TreeVisitor {
    /// A node with an assigned name. Its children are walked afterwards.
    fn concrete(&mut self, site: &Site, name: &str) -> Result<()>;

    /// A childless node with no name, when gap-filling is requested.
    fn unresolved(&mut self, site: &Site) -> Result<()>;

    /// A node passed over without materializing.
    fn branch(&mut self, _site: &Site) -> Result<()> {
        Ok(())
    }
}

/// Visit every node depth-first in configuration order.
///
/// Concrete nodes are visited before their children, which nest under the
/// concrete node's alias path. Unresolved leaves are reported to
/// [`TreeVisitor::unresolved`] only when `fill_gaps` is set.
pub fn walk<V: TreeVisitor + ?Sized>(
    tree: &PackageTree,
    fill_gaps: bool,
    visitor: &mut V,
) -> Result<()> {
    walk_nodes(tree.nodes(), &Site::root(), fill_gaps, visitor)
}

fn walk_nodes<V: TreeVisitor + ?Sized>(
    nodes: &[TreeNode],
    parent: &Site,
    fill_gaps: bool,
    visitor: &mut V,
) -> Result<()> {
    for node in nodes {
        let site = parent.child(&node.segment);

        match &node.kind {
            NodeKind::Concrete(name) | NodeKind::ConcreteWithChildren(name, _) => {
                visitor.concrete(&site, name)?;
            }
            NodeKind::Unresolved if fill_gaps => visitor.unresolved(&site)?,
            NodeKind::Unresolved | NodeKind::Branch(_) => visitor.branch(&site)?,
        }

        walk_nodes(node.kind.children(), &site, fill_gaps, visitor)?;
    }
    Ok(())
}
