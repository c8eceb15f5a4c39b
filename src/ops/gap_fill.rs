//! Recording unresolved leaves back into the configuration.

use anyhow::{bail, Result};
use serde_yaml::{Mapping, Value};

use crate::core::AliasPath;
use crate::util::YamlFile;

/// Add `workspaces.<workspace>.names.<alias>: ""` to the configuration
/// document and save it.
///
/// Returns `false` without touching the file when the alias is already
/// recorded. A missing (or non-mapping) `names` table is created.
pub fn record_gap(source: &mut YamlFile, workspace: &str, alias: &AliasPath) -> Result<bool> {
    let recorded = source.modify(|doc| {
        let workspaces = match doc.get_mut("workspaces") {
            Some(Value::Mapping(workspaces)) => workspaces,
            _ => bail!("configuration has no `workspaces` mapping"),
        };
        let ws = match workspaces.get_mut(workspace) {
            Some(Value::Mapping(ws)) => ws,
            _ => bail!("workspace `{}` is not a mapping", workspace),
        };

        if !matches!(ws.get("names"), Some(Value::Mapping(_))) {
            ws.insert(Value::from("names"), Value::Mapping(Mapping::new()));
        }
        let Some(Value::Mapping(names)) = ws.get_mut("names") else {
            bail!("workspace `{}` has no `names` mapping", workspace);
        };

        let key = Value::from(alias.as_str());
        if names.contains_key(&key) {
            return Ok(false);
        }
        names.insert(key, Value::from(""));
        Ok(true)
    })?;

    if recorded {
        tracing::debug!("recording gap {}:{}", workspace, alias);
        source.save()?;
    }
    Ok(recorded)
}
