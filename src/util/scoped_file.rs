//! Lazily-loaded, cached handles over structured text files.
//!
//! A [`ScopedFile`] parses its file on first access and keeps the parsed
//! value in memory until [`ScopedFile::save`] writes it back (or
//! [`ScopedFile::invalidate`] drops it). Between saves every `get`/`modify`
//! observes the same in-memory copy, so a read-modify-write cycle parses the
//! file exactly once.

use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::util::fs;

/// A structured text format a [`ScopedFile`] can load and store.
pub trait FileFormat {
    /// In-memory representation of a parsed file.
    type Value;

    /// Human-readable format name for error messages.
    const NAME: &'static str;

    fn parse(raw: &str) -> Result<Self::Value>;

    fn serialize(value: &Self::Value) -> Result<String>;
}

/// JSON with two-space indentation and a trailing newline.
#[derive(Debug, Clone, Copy)]
pub struct JsonFormat;

impl FileFormat for JsonFormat {
    type Value = serde_json::Value;

    const NAME: &'static str = "JSON";

    fn parse(raw: &str) -> Result<Self::Value> {
        Ok(serde_json::from_str(raw)?)
    }

    fn serialize(value: &Self::Value) -> Result<String> {
        let mut out = serde_json::to_string_pretty(value)?;
        out.push('\n');
        Ok(out)
    }
}

/// YAML, as used by the workspace configuration.
#[derive(Debug, Clone, Copy)]
pub struct YamlFormat;

impl FileFormat for YamlFormat {
    type Value = serde_yaml::Value;

    const NAME: &'static str = "YAML";

    fn parse(raw: &str) -> Result<Self::Value> {
        Ok(serde_yaml::from_str(raw)?)
    }

    fn serialize(value: &Self::Value) -> Result<String> {
        Ok(serde_yaml::to_string(value)?)
    }
}

/// Handle over a single file with a lazily-populated content cache.
#[derive(Debug)]
pub struct ScopedFile<F: FileFormat> {
    path: PathBuf,
    content: Option<F::Value>,
    format: PhantomData<F>,
}

/// Handle over a `package.json`-style file.
pub type JsonFile = ScopedFile<JsonFormat>;

/// Handle over a YAML document.
pub type YamlFile = ScopedFile<YamlFormat>;

impl<F: FileFormat> ScopedFile<F> {
    /// Create a handle. Nothing is read until the content is first needed.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        ScopedFile {
            path: path.into(),
            content: None,
            format: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Directory containing the file.
    pub fn dir(&self) -> &Path {
        self.path.parent().unwrap_or(Path::new("."))
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    fn content(&mut self) -> Result<&mut F::Value> {
        let value = match self.content.take() {
            Some(value) => value,
            None => {
                let raw = fs::read_to_string(&self.path)?;
                let parsed = F::parse(&raw).with_context(|| {
                    format!("failed to parse {} file: {}", F::NAME, self.path.display())
                })?;
                tracing::debug!("loaded {}", self.path.display());
                parsed
            }
        };

        Ok(self.content.insert(value))
    }

    /// Fully parsed content, loading it on first access.
    pub fn get(&mut self) -> Result<&F::Value> {
        Ok(&*self.content()?)
    }

    /// A projection of the content, loading it on first access.
    pub fn get_with<R>(&mut self, projection: impl FnOnce(&F::Value) -> R) -> Result<R> {
        Ok(projection(self.content()?))
    }

    /// Apply an in-place mutation to the cached content.
    pub fn modify<R>(&mut self, mutator: impl FnOnce(&mut F::Value) -> Result<R>) -> Result<R> {
        mutator(self.content()?)
    }

    /// Replace the content wholesale without reading the file first.
    pub fn set(&mut self, value: F::Value) {
        self.content = Some(value);
    }

    /// Serialize the cached content back to disk, then drop the cache.
    pub fn save(&mut self) -> Result<()> {
        let serialized = F::serialize(self.content()?).with_context(|| {
            format!("failed to serialize {} file: {}", F::NAME, self.path.display())
        })?;
        fs::write_string(&self.path, &serialized)?;
        tracing::debug!("wrote {}", self.path.display());
        self.invalidate();
        Ok(())
    }

    /// Drop the cached content without writing.
    pub fn invalidate(&mut self) {
        self.content = None;
    }
}
