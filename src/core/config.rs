//! `bush.yaml` configuration schema and normalization.
//!
//! The configuration document is loaded as a raw YAML value, nulls are
//! revived to empty strings, and the result is normalized into typed
//! structures: reference keys are unescaped, boolean-like flags parsed,
//! attribute patterns compiled, and each alias tree classified into
//! [`NodeKind`](crate::core::tree::NodeKind)s. Nothing downstream looks at the
//! raw document again except the gap-fill recorder, which writes to it.

use std::fmt;

use anyhow::{Context, Result};
use indexmap::IndexMap;
use regex::{Regex, RegexBuilder};
use serde::de::{DeserializeOwned, Deserializer, Error as _};
use serde::Deserialize;
use serde_yaml::Value;
use thiserror::Error;

use crate::core::alias::AliasPath;
use crate::core::tree::PackageTree;
use crate::util::YamlFile;

/// Default configuration file name.
pub const CONFIG_FILE: &str = "bush.yaml";

/// Package manager used when `manager` is not configured.
pub const DEFAULT_MANAGER: &str = "npm";

/// Template used when `template` is not configured.
const DEFAULT_TEMPLATE: &str = "{}";

/// Schema violations found while normalizing a configuration document.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("configuration document must be a mapping")]
    NotAMapping,

    #[error("configuration has no root package `name`")]
    MissingName,

    #[error("invalid configuration: {0}")]
    Schema(#[from] serde_yaml::Error),

    #[error("`template` is not valid JSON")]
    InvalidTemplate(#[source] serde_json::Error),

    #[error("`template` must be a JSON object")]
    TemplateNotAnObject,

    #[error("invalid attribute pattern `{pattern}` in workspace `{workspace}`")]
    InvalidPattern {
        workspace: String,
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("tree node `{alias}` in workspace `{workspace}` must be a mapping, found {found}")]
    InvalidTree {
        workspace: String,
        alias: String,
        found: &'static str,
    },

    #[error("`{segment}` in `{alias}` of workspace `{workspace}` is not a plain directory name")]
    InvalidSegment {
        workspace: String,
        alias: String,
        segment: String,
    },

    #[error("alias `{alias}` appears more than once in workspace `{workspace}`")]
    DuplicateAlias { workspace: String, alias: String },

    #[error("references for {context} must be a mapping, found {found}")]
    InvalidReferences { context: String, found: &'static str },

    #[error("{context} must be a string, found {found}")]
    NotAString { context: String, found: &'static str },
}

/// Name of a YAML value's kind, for error messages.
pub(crate) fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a sequence",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}

/// Replace every null in the document with an empty string.
///
/// After this, "assigned but empty" and "absent" are the only two ways a
/// name can be missing.
pub fn revive_nulls(value: &mut Value) {
    match value {
        Value::Null => *value = Value::String(String::new()),
        Value::Sequence(items) => items.iter_mut().for_each(revive_nulls),
        Value::Mapping(map) => map.iter_mut().for_each(|(_, v)| revive_nulls(v)),
        Value::Tagged(tagged) => revive_nulls(&mut tagged.value),
        _ => {}
    }
}

/// Restore `@` characters escaped as `\@` in configuration keys.
pub fn unescape_reference(key: &str) -> String {
    key.replace("\\@", "@")
}

/// A boolean-like configuration value.
///
/// Accepts YAML booleans, numbers (non-zero is true) and strings, where
/// `yes`, `y`, `true`, `on` and `1` are true regardless of case.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Flag(pub bool);

impl Flag {
    pub fn from_yaml(value: &Value) -> Flag {
        let truthy = match value {
            Value::Bool(b) => *b,
            Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
            Value::String(s) => matches!(
                s.trim().to_ascii_lowercase().as_str(),
                "yes" | "y" | "true" | "on" | "1"
            ),
            Value::Tagged(tagged) => Flag::from_yaml(&tagged.value).0,
            _ => false,
        };
        Flag(truthy)
    }

    pub fn is_set(self) -> bool {
        self.0
    }
}

impl<'de> Deserialize<'de> for Flag {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(Flag::from_yaml(&value))
    }
}

/// Deserialize `T`, treating null and `""` as `T::default()`.
fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(T::default()),
        Value::String(s) if s.is_empty() => Ok(T::default()),
        other => serde_yaml::from_value(other).map_err(D::Error::custom),
    }
}

/// Deserialize a scalar as a string, treating null and `""` as absent.
fn scalar_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    scalar_to_string(&value).map_err(|found| D::Error::custom(format!("expected a string, found {}", found)))
}

fn scalar_to_string(value: &Value) -> Result<Option<String>, &'static str> {
    match value {
        Value::Null => Ok(None),
        Value::String(s) if s.is_empty() => Ok(None),
        Value::String(s) => Ok(Some(s.clone())),
        Value::Number(n) => Ok(Some(n.to_string())),
        Value::Bool(b) => Ok(Some(b.to_string())),
        Value::Tagged(tagged) => scalar_to_string(&tagged.value),
        other => Err(kind_of(other)),
    }
}

/// Metadata attached to a reference, locally or in the global table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ReferenceMeta {
    /// Declared version; only consulted in the global table.
    #[serde(default, deserialize_with = "scalar_string")]
    pub version: Option<String>,

    /// Explicit development-dependency flag.
    #[serde(default, deserialize_with = "lenient")]
    pub is_dev: Option<Flag>,

    /// Explicit peer-dependency flag.
    #[serde(default, deserialize_with = "lenient")]
    pub save_peer: Option<Flag>,
}

/// Reference name (unescaped) to metadata, in configuration order.
pub type ReferenceTable = IndexMap<String, ReferenceMeta>;

/// Parse a reference map. Null and `""` denote an empty table, and a
/// reference whose metadata is not a mapping carries no flags.
pub fn parse_references(value: &Value, context: &str) -> Result<ReferenceTable, ConfigError> {
    let map = match value {
        Value::Mapping(map) => map,
        Value::Null => return Ok(ReferenceTable::new()),
        Value::String(s) if s.is_empty() => return Ok(ReferenceTable::new()),
        other => {
            return Err(ConfigError::InvalidReferences {
                context: context.to_string(),
                found: kind_of(other),
            })
        }
    };

    let mut table = ReferenceTable::with_capacity(map.len());
    for (key, meta) in map {
        let key = scalar_to_string(key)
            .map_err(|found| ConfigError::NotAString {
                context: format!("reference key in {}", context),
                found,
            })?
            .unwrap_or_default();

        let meta = match meta {
            Value::Mapping(_) => serde_yaml::from_value(meta.clone())?,
            _ => ReferenceMeta::default(),
        };

        table.insert(unescape_reference(&key), meta);
    }
    Ok(table)
}

/// A regex-keyed bundle of extra references.
#[derive(Debug, Clone)]
pub struct AttributeBlock {
    pub pattern: Regex,
    pub references: ReferenceTable,
}

impl AttributeBlock {
    /// Compile `pattern` case-insensitively with multi-line anchors.
    pub fn new(pattern: &str, references: ReferenceTable) -> Result<Self, regex::Error> {
        let pattern = RegexBuilder::new(pattern)
            .case_insensitive(true)
            .multi_line(true)
            .build()?;
        Ok(AttributeBlock {
            pattern,
            references,
        })
    }

    pub fn matches(&self, alias: &AliasPath) -> bool {
        self.pattern.is_match(alias.as_str())
    }
}

/// One top-level workspace group.
#[derive(Debug, Clone)]
pub struct WorkspaceConfig {
    /// Workspace name, also its directory under the root.
    pub name: String,
    pub tree: PackageTree,
    /// Alias path to assigned short name; `""` means unresolved.
    pub names: IndexMap<String, String>,
    /// Alias path to direct references.
    pub references: IndexMap<String, ReferenceTable>,
    pub attributes: Vec<AttributeBlock>,
    pub scope: String,
    pub prefix: String,
    pub flat: bool,
}

impl WorkspaceConfig {
    /// Direct references for an alias path.
    pub fn references_for(&self, alias: &AliasPath) -> Option<&ReferenceTable> {
        self.references.get(alias.as_str())
    }

    /// Attribute blocks whose pattern matches an alias path, in
    /// configuration order.
    pub fn matching_attributes<'a>(
        &'a self,
        alias: &'a AliasPath,
    ) -> impl Iterator<Item = &'a AttributeBlock> + 'a {
        self.attributes.iter().filter(move |block| block.matches(alias))
    }
}

/// Normalized configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Root package name.
    pub name: String,
    /// Package-manager command.
    pub manager: String,
    /// Prefix for workspace-internal dependency values.
    pub protocol: Option<String>,
    template: String,
    /// Global reference table.
    pub references: ReferenceTable,
    /// References applied to the root manifest.
    pub root_references: ReferenceTable,
    /// Workspaces in configuration order.
    pub workspaces: Vec<WorkspaceConfig>,
}

#[derive(Debug, Default, Deserialize)]
struct RawConfig {
    #[serde(default, deserialize_with = "scalar_string")]
    name: Option<String>,
    #[serde(default, deserialize_with = "scalar_string")]
    manager: Option<String>,
    #[serde(default, deserialize_with = "scalar_string")]
    protocol: Option<String>,
    #[serde(default, deserialize_with = "scalar_string")]
    template: Option<String>,
    #[serde(default)]
    references: Value,
    #[serde(default, deserialize_with = "lenient")]
    root: RawRoot,
    #[serde(default, deserialize_with = "lenient")]
    workspaces: IndexMap<String, RawWorkspace>,
}

#[derive(Debug, Default, Deserialize)]
struct RawRoot {
    #[serde(default, deserialize_with = "lenient")]
    attributes: RawRootAttributes,
}

#[derive(Debug, Default, Deserialize)]
struct RawRootAttributes {
    #[serde(default)]
    references: Value,
}

#[derive(Debug, Default, Deserialize)]
struct RawWorkspace {
    #[serde(default)]
    tree: Value,
    #[serde(default, deserialize_with = "lenient")]
    names: IndexMap<String, Value>,
    #[serde(default, deserialize_with = "lenient")]
    references: IndexMap<String, Value>,
    #[serde(default, deserialize_with = "lenient")]
    attributes: IndexMap<String, Value>,
    #[serde(default, deserialize_with = "scalar_string")]
    scope: Option<String>,
    #[serde(default, deserialize_with = "scalar_string")]
    prefix: Option<String>,
    #[serde(default)]
    flat: Flag,
}

impl Config {
    /// Load and normalize the configuration held by `source`.
    ///
    /// Nulls are revived in the cached document as well, so a later
    /// gap-fill save persists the revived form.
    pub fn load(source: &mut YamlFile) -> Result<Self> {
        source.modify(|doc| {
            revive_nulls(doc);
            Ok(())
        })?;
        let doc = source.get()?;
        Config::from_value(doc)
            .with_context(|| format!("invalid configuration: {}", source.path().display()))
    }

    /// Normalize a raw (already revived) configuration document.
    pub fn from_value(doc: &Value) -> Result<Self, ConfigError> {
        if !doc.is_mapping() {
            return Err(ConfigError::NotAMapping);
        }
        let raw: RawConfig = serde_yaml::from_value(doc.clone())?;

        let name = raw.name.ok_or(ConfigError::MissingName)?;

        let template = raw.template.unwrap_or_else(|| DEFAULT_TEMPLATE.to_string());
        parse_template(&template)?;

        let references = parse_references(&raw.references, "the global table")?;
        let root_references =
            parse_references(&raw.root.attributes.references, "the root package")?;

        let workspaces = raw
            .workspaces
            .into_iter()
            .map(|(name, ws)| normalize_workspace(name, ws))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Config {
            name,
            manager: raw.manager.unwrap_or_else(|| DEFAULT_MANAGER.to_string()),
            protocol: raw.protocol,
            template,
            references,
            root_references,
            workspaces,
        })
    }

    /// A fresh, independent copy of the manifest template.
    pub fn template_manifest(&self) -> Result<serde_json::Value, ConfigError> {
        parse_template(&self.template)
    }

    pub fn workspace(&self, name: &str) -> Option<&WorkspaceConfig> {
        self.workspaces.iter().find(|ws| ws.name == name)
    }
}

impl fmt::Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({} workspace{})",
            self.name,
            self.workspaces.len(),
            if self.workspaces.len() == 1 { "" } else { "s" }
        )
    }
}

fn parse_template(raw: &str) -> Result<serde_json::Value, ConfigError> {
    let value: serde_json::Value =
        serde_json::from_str(raw).map_err(ConfigError::InvalidTemplate)?;
    if !value.is_object() {
        return Err(ConfigError::TemplateNotAnObject);
    }
    Ok(value)
}

fn normalize_workspace(name: String, raw: RawWorkspace) -> Result<WorkspaceConfig, ConfigError> {
    let mut names = IndexMap::with_capacity(raw.names.len());
    for (alias, value) in &raw.names {
        let assigned = scalar_to_string(value)
            .map_err(|found| ConfigError::NotAString {
                context: format!("name for `{}` in workspace `{}`", alias, name),
                found,
            })?
            .unwrap_or_default();
        names.insert(alias.clone(), assigned);
    }

    let mut references = IndexMap::with_capacity(raw.references.len());
    for (alias, value) in &raw.references {
        let context = format!("`{}` in workspace `{}`", alias, name);
        references.insert(alias.clone(), parse_references(value, &context)?);
    }

    let mut attributes = Vec::with_capacity(raw.attributes.len());
    for (pattern, value) in &raw.attributes {
        let refs = match value {
            Value::Mapping(block) => {
                let context = format!("attribute `{}` in workspace `{}`", pattern, name);
                match block.get("references") {
                    Some(refs) => parse_references(refs, &context)?,
                    None => ReferenceTable::new(),
                }
            }
            _ => ReferenceTable::new(),
        };
        let block =
            AttributeBlock::new(pattern, refs).map_err(|source| ConfigError::InvalidPattern {
                workspace: name.clone(),
                pattern: pattern.clone(),
                source,
            })?;
        attributes.push(block);
    }

    let tree = PackageTree::from_yaml(&name, &raw.tree, &names)?;

    Ok(WorkspaceConfig {
        name,
        tree,
        names,
        references,
        attributes,
        scope: raw.scope.unwrap_or_default(),
        prefix: raw.prefix.unwrap_or_default(),
        flat: raw.flat.is_set(),
    })
}
