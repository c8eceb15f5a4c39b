//! Reference resolution: turning configured references into manifest
//! dependency entries.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::core::config::{ReferenceMeta, ReferenceTable};

/// Version written when a reference has no configured version.
pub const DEFAULT_VERSION: &str = "latest";

/// A dependency section of a manifest, ordered as written to a manifest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DependencySection {
    Dependencies,
    DevDependencies,
    PeerDependencies,
}

impl DependencySection {
    /// Every section, in manifest order.
    pub const ALL: [DependencySection; 3] = [
        DependencySection::Dependencies,
        DependencySection::DevDependencies,
        DependencySection::PeerDependencies,
    ];

    /// Manifest key of this section.
    pub fn key(self) -> &'static str {
        match self {
            DependencySection::Dependencies => "dependencies",
            DependencySection::DevDependencies => "devDependencies",
            DependencySection::PeerDependencies => "peerDependencies",
        }
    }
}

impl fmt::Display for DependencySection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// The outcome of resolving one reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedReference {
    pub name: String,
    /// Version requirement or workspace link.
    pub value: String,
    pub dev: bool,
    pub peer: bool,
}

impl ResolvedReference {
    /// Sections this reference is written to.
    ///
    /// Dev and peer references go to `devDependencies`, everything else to
    /// `dependencies`; peers are also written to `peerDependencies`.
    pub fn sections(&self) -> Vec<DependencySection> {
        let mut sections = Vec::with_capacity(2);
        if self.dev || self.peer {
            sections.push(DependencySection::DevDependencies);
        } else {
            sections.push(DependencySection::Dependencies);
        }
        if self.peer {
            sections.push(DependencySection::PeerDependencies);
        }
        sections
    }
}

/// Accumulated dependency sections for one manifest.
///
/// Sections are ordered maps, so iteration is always in ascending key order
/// regardless of resolution order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependencySet {
    sections: BTreeMap<DependencySection, BTreeMap<String, String>>,
}

impl DependencySet {
    pub fn new() -> Self {
        DependencySet::default()
    }

    /// Record a resolved reference in every section it belongs to. A later
    /// insertion of the same name replaces the earlier value.
    pub fn insert(&mut self, reference: &ResolvedReference) {
        for section in reference.sections() {
            self.sections
                .entry(section)
                .or_default()
                .insert(reference.name.clone(), reference.value.clone());
        }
    }

    /// Entries of one section in ascending key order.
    pub fn section(&self, section: DependencySection) -> Option<&BTreeMap<String, String>> {
        self.sections.get(&section)
    }

    /// Non-empty sections in manifest order.
    pub fn iter(&self) -> impl Iterator<Item = (DependencySection, &BTreeMap<String, String>)> {
        self.sections
            .iter()
            .map(|(section, entries)| (*section, entries))
    }
}

/// Resolves references against the global table.
#[derive(Debug, Clone, Copy)]
pub struct Resolver<'a> {
    globals: &'a ReferenceTable,
    protocol: Option<&'a str>,
    workspace_packages: &'a BTreeSet<String>,
}

impl<'a> Resolver<'a> {
    /// `workspace_packages` holds the scoped names of every package this run
    /// materializes; references to them are written as `protocol + name`.
    pub fn new(
        globals: &'a ReferenceTable,
        protocol: Option<&'a str>,
        workspace_packages: &'a BTreeSet<String>,
    ) -> Self {
        Resolver {
            globals,
            protocol: protocol.filter(|p| !p.is_empty()),
            workspace_packages,
        }
    }

    /// Resolve one reference. Local flags win over the global table's
    /// defaults; both default to false.
    pub fn resolve(&self, name: &str, local: &ReferenceMeta) -> ResolvedReference {
        let global = self.globals.get(name);

        let dev = local
            .is_dev
            .or_else(|| global.and_then(|g| g.is_dev))
            .unwrap_or_default()
            .is_set();
        let peer = local
            .save_peer
            .or_else(|| global.and_then(|g| g.save_peer))
            .unwrap_or_default()
            .is_set();

        let value = match self.protocol {
            Some(protocol) if self.workspace_packages.contains(name) => {
                format!("{}{}", protocol, name)
            }
            _ => global
                .and_then(|g| g.version.clone())
                .unwrap_or_else(|| DEFAULT_VERSION.to_string()),
        };

        tracing::debug!(
            "resolved `{}` to {} (dev: {}, peer: {})",
            name,
            value,
            dev,
            peer
        );

        ResolvedReference {
            name: name.to_string(),
            value,
            dev,
            peer,
        }
    }

    /// Resolve every reference of `table` into `set`.
    pub fn apply(&self, table: &ReferenceTable, set: &mut DependencySet) {
        for (name, meta) in table {
            set.insert(&self.resolve(name, meta));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::Flag;

    fn meta(version: Option<&str>, is_dev: Option<bool>, save_peer: Option<bool>) -> ReferenceMeta {
        ReferenceMeta {
            version: version.map(str::to_string),
            is_dev: is_dev.map(Flag),
            save_peer: save_peer.map(Flag),
        }
    }

    fn table(entries: &[(&str, ReferenceMeta)]) -> ReferenceTable {
        entries
            .iter()
            .map(|(name, meta)| (name.to_string(), meta.clone()))
            .collect()
    }

    #[test]
    fn test_dev_reference_uses_global_version() {
        let globals = table(&[("x", meta(Some("2.0.0"), None, None))]);
        let internal = BTreeSet::new();
        let resolver = Resolver::new(&globals, None, &internal);

        let mut set = DependencySet::new();
        resolver.apply(&table(&[("x", meta(None, Some(true), None))]), &mut set);

        let dev = set.section(DependencySection::DevDependencies).unwrap();
        assert_eq!(dev.get("x").map(String::as_str), Some("2.0.0"));
        assert!(set.section(DependencySection::Dependencies).is_none());
    }

    #[test]
    fn test_local_flag_overrides_global_default() {
        let globals = table(&[("jest", meta(Some("29.0.0"), Some(true), None))]);
        let internal = BTreeSet::new();
        let resolver = Resolver::new(&globals, None, &internal);

        let inherited = resolver.resolve("jest", &ReferenceMeta::default());
        assert!(inherited.dev);

        let overridden = resolver.resolve("jest", &meta(None, Some(false), None));
        assert!(!overridden.dev);
        assert_eq!(overridden.sections(), vec![DependencySection::Dependencies]);
    }

    #[test]
    fn test_missing_version_defaults_to_latest() {
        let globals = ReferenceTable::new();
        let internal = BTreeSet::new();
        let resolver = Resolver::new(&globals, None, &internal);

        let resolved = resolver.resolve("lodash", &ReferenceMeta::default());
        assert_eq!(resolved.value, DEFAULT_VERSION);
        assert!(!resolved.dev);
        assert!(!resolved.peer);
    }

    #[test]
    fn test_peer_goes_to_dev_and_peer_sections() {
        let globals = table(&[("react", meta(Some("^18.0.0"), None, None))]);
        let internal = BTreeSet::new();
        let resolver = Resolver::new(&globals, None, &internal);

        let mut set = DependencySet::new();
        resolver.apply(&table(&[("react", meta(None, None, Some(true)))]), &mut set);

        let sections: Vec<_> = set.iter().map(|(section, _)| section).collect();
        assert_eq!(
            sections,
            vec![
                DependencySection::DevDependencies,
                DependencySection::PeerDependencies
            ]
        );
        for (_, entries) in set.iter() {
            assert_eq!(entries.get("react").map(String::as_str), Some("^18.0.0"));
            assert_eq!(entries.len(), 1);
        }
    }

    #[test]
    fn test_workspace_packages_use_protocol() {
        let globals = table(&[("@acme/pkg-engine", meta(Some("1.0.0"), None, None))]);
        let internal: BTreeSet<String> = ["@acme/pkg-engine".to_string()].into();
        let resolver = Resolver::new(&globals, Some("workspace:"), &internal);

        let resolved = resolver.resolve("@acme/pkg-engine", &ReferenceMeta::default());
        assert_eq!(resolved.value, "workspace:@acme/pkg-engine");

        let external = resolver.resolve("lodash", &ReferenceMeta::default());
        assert_eq!(external.value, DEFAULT_VERSION);
    }

    #[test]
    fn test_empty_protocol_falls_back_to_version() {
        let globals = table(&[("@acme/pkg-engine", meta(Some("1.0.0"), None, None))]);
        let internal: BTreeSet<String> = ["@acme/pkg-engine".to_string()].into();
        let resolver = Resolver::new(&globals, Some(""), &internal);

        let resolved = resolver.resolve("@acme/pkg-engine", &ReferenceMeta::default());
        assert_eq!(resolved.value, "1.0.0");
    }

    #[test]
    fn test_sections_iterate_sorted() {
        let globals = ReferenceTable::new();
        let internal = BTreeSet::new();
        let resolver = Resolver::new(&globals, None, &internal);

        let mut set = DependencySet::new();
        resolver.apply(
            &table(&[
                ("zod", ReferenceMeta::default()),
                ("axios", ReferenceMeta::default()),
                ("lodash", ReferenceMeta::default()),
            ]),
            &mut set,
        );

        let keys: Vec<_> = set
            .section(DependencySection::Dependencies)
            .unwrap()
            .keys()
            .cloned()
            .collect();
        assert_eq!(keys, vec!["axios", "lodash", "zod"]);
    }
}
