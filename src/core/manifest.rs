//! `package.json` manifests.
//!
//! Only `name` and the three dependency sections are managed. Every other
//! field, and the relative order of all fields, survives a rewrite.

use std::path::{Path, PathBuf};

use anyhow::{bail, Result};
use serde_json::{Map, Value};

use crate::core::dependency::{DependencySection, DependencySet};
use crate::util::fs::MANIFEST_FILE;
use crate::util::JsonFile;

/// A package manifest on disk.
#[derive(Debug)]
pub struct Manifest {
    file: JsonFile,
}

impl Manifest {
    /// Handle for `<dir>/package.json`. Nothing is read yet.
    pub fn in_dir(dir: &Path) -> Self {
        Manifest::at(dir.join(MANIFEST_FILE))
    }

    pub fn at(path: impl Into<PathBuf>) -> Self {
        Manifest {
            file: JsonFile::new(path),
        }
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    pub fn dir(&self) -> &Path {
        self.file.dir()
    }

    pub fn exists(&self) -> bool {
        self.file.exists()
    }

    /// Create the manifest from `template` with `name` stamped in.
    ///
    /// The template's own `name` field keeps its position; otherwise `name`
    /// is placed first.
    pub fn seed(&mut self, template: Value, name: &str) -> Result<()> {
        let template = match template {
            Value::Object(object) => object,
            _ => bail!("manifest template must be a JSON object"),
        };

        let object = if template.contains_key("name") {
            let mut object = template;
            object.insert("name".to_string(), Value::from(name));
            object
        } else {
            let mut object = Map::with_capacity(template.len() + 1);
            object.insert("name".to_string(), Value::from(name));
            object.extend(template);
            object
        };

        self.file.set(Value::Object(object));
        self.file.save()
    }

    /// Force `name`, replace every dependency section with `dependencies`,
    /// and save.
    pub fn stamp(&mut self, name: &str, dependencies: &DependencySet) -> Result<()> {
        let path = self.file.path().to_path_buf();
        self.file.modify(|value| match value {
            Value::Object(object) => {
                stamp_object(object, name, dependencies);
                Ok(())
            }
            _ => bail!("manifest is not a JSON object: {}", path.display()),
        })?;
        self.file.save()
    }

    /// The manifest's `name`, if it is a string.
    pub fn name(&mut self) -> Result<Option<String>> {
        self.file
            .get_with(|value| value.get("name").and_then(Value::as_str).map(str::to_string))
    }
}

/// Apply `name` and `dependencies` to a manifest object in place.
///
/// Stale sections are removed entirely before the current ones are
/// appended in manifest order, so a dependency dropped from the
/// configuration never survives and unchanged input gives unchanged output.
pub fn stamp_object(object: &mut Map<String, Value>, name: &str, dependencies: &DependencySet) {
    object.insert("name".to_string(), Value::from(name));

    object.retain(|key, _| {
        !DependencySection::ALL
            .iter()
            .any(|section| key.as_str() == section.key())
    });

    for (section, entries) in dependencies.iter() {
        let entries: Map<String, Value> = entries
            .iter()
            .map(|(dep, version)| (dep.clone(), Value::from(version.as_str())))
            .collect();
        object.insert(section.key().to_string(), Value::Object(entries));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::dependency::ResolvedReference;
    use serde_json::json;
    use tempfile::TempDir;

    fn dep(name: &str, value: &str, dev: bool, peer: bool) -> ResolvedReference {
        ResolvedReference {
            name: name.to_string(),
            value: value.to_string(),
            dev,
            peer,
        }
    }

    fn keys(object: &Map<String, Value>) -> Vec<&str> {
        object.keys().map(String::as_str).collect()
    }

    #[test]
    fn test_stamp_preserves_unmanaged_fields() {
        let mut object = json!({
            "name": "old",
            "version": "1.2.3",
            "dependencies": { "stale": "1.0.0" },
            "scripts": { "build": "tsc" },
            "peerDependencies": { "also-stale": "*" }
        })
        .as_object()
        .cloned()
        .unwrap();

        let mut deps = DependencySet::new();
        deps.insert(&dep("zod", "3.0.0", false, false));
        deps.insert(&dep("axios", "1.0.0", false, false));

        stamp_object(&mut object, "@acme/pkg-engine", &deps);

        assert_eq!(keys(&object), vec!["name", "version", "scripts", "dependencies"]);
        assert_eq!(object["name"], "@acme/pkg-engine");
        assert_eq!(object["scripts"], json!({ "build": "tsc" }));
        assert_eq!(
            keys(object["dependencies"].as_object().unwrap()),
            vec!["axios", "zod"]
        );
    }

    #[test]
    fn test_stamp_removes_empty_sections() {
        let mut object = json!({
            "name": "x",
            "devDependencies": { "jest": "29" }
        })
        .as_object()
        .cloned()
        .unwrap();

        stamp_object(&mut object, "x", &DependencySet::new());

        assert_eq!(keys(&object), vec!["name"]);
    }

    #[test]
    fn test_sections_written_in_manifest_order() {
        let mut object = Map::new();
        let mut deps = DependencySet::new();
        deps.insert(&dep("react", "^18", false, true));
        deps.insert(&dep("lodash", "4", false, false));

        stamp_object(&mut object, "x", &deps);

        assert_eq!(
            keys(&object),
            vec!["name", "dependencies", "devDependencies", "peerDependencies"]
        );
    }

    #[test]
    fn test_seed_places_name_first() {
        let tmp = TempDir::new().unwrap();
        let mut manifest = Manifest::in_dir(tmp.path());
        assert!(!manifest.exists());

        manifest
            .seed(json!({ "version": "0.0.0", "private": true }), "@acme/a")
            .unwrap();

        let written = std::fs::read_to_string(manifest.path()).unwrap();
        assert_eq!(
            written,
            "{\n  \"name\": \"@acme/a\",\n  \"version\": \"0.0.0\",\n  \"private\": true\n}\n"
        );
    }

    #[test]
    fn test_seed_keeps_template_name_position() {
        let tmp = TempDir::new().unwrap();
        let mut manifest = Manifest::in_dir(tmp.path());

        manifest
            .seed(json!({ "version": "0.0.0", "name": "placeholder" }), "@acme/a")
            .unwrap();

        assert_eq!(manifest.name().unwrap().as_deref(), Some("@acme/a"));
        let written = std::fs::read_to_string(manifest.path()).unwrap();
        assert!(written.find("version").unwrap() < written.find("name").unwrap());
    }

    #[test]
    fn test_stamp_round_trip_is_stable() {
        let tmp = TempDir::new().unwrap();
        let mut manifest = Manifest::in_dir(tmp.path());
        manifest.seed(json!({ "license": "MIT" }), "@acme/a").unwrap();

        let mut deps = DependencySet::new();
        deps.insert(&dep("jest", "29", true, false));

        manifest.stamp("@acme/a", &deps).unwrap();
        let first = std::fs::read_to_string(manifest.path()).unwrap();

        manifest.stamp("@acme/a", &deps).unwrap();
        let second = std::fs::read_to_string(manifest.path()).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn test_stamp_rejects_non_object() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join(MANIFEST_FILE), "[]").unwrap();

        let mut manifest = Manifest::in_dir(tmp.path());
        let err = manifest.stamp("x", &DependencySet::new()).unwrap_err();
        assert!(err.to_string().contains("not a JSON object"));
    }
}
