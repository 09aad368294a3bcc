//! The source registry: logical feed name -> declared format + location.
//!
//! The registry owns two maps behind one read-mostly lock: name ->
//! [`SourceDescriptor`] and name -> the bound [`Parser`] the descriptor's
//! format selects. Reads (listing, parser lookup) run concurrently;
//! mutations serialize on the write half.
//!
//! # Manifest
//!
//! Registrations survive restarts through a JSON manifest file, an array
//! of `{ "name", "format", "endpoint" }` objects. The registry is the
//! manifest's sole writer: it loads the file once at startup (falling
//! back to a built-in default source set when the file doesn't exist)
//! and rewrites it wholesale after every successful mutation, via a temp
//! file and rename so a crash mid-write never leaves a torn manifest.
//! The rewrite happens before the in-memory maps change: a mutation
//! that cannot be persisted is reported as a failure and leaves the
//! registry untouched.

use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::PathBuf;

use tokio::fs;
use tokio::sync::RwLock;
use tracing::{debug, info, instrument};

use crate::error::{Error, Result};
use crate::models::{SourceDescriptor, SourceFormat};
use crate::parsers::Parser;

/// Sources bound when no manifest exists yet.
fn default_sources() -> Vec<SourceDescriptor> {
    let defaults = [
        ("abcnews", SourceFormat::Xml, "https://abcnews.go.com/abcnews/internationalheadlines"),
        ("bbc", SourceFormat::Xml, "https://feeds.bbci.co.uk/news/world/rss.xml"),
        ("nbc", SourceFormat::Json, "https://newsapi.org/v2/top-headlines?sources=nbc-news"),
        ("usatoday", SourceFormat::Html, "https://www.usatoday.com/news/world/"),
    ];
    defaults
        .into_iter()
        .map(|(name, format, location)| SourceDescriptor {
            name: name.to_string(),
            format,
            location: location.to_string(),
        })
        .collect()
}

#[derive(Default)]
struct Inner {
    descriptors: HashMap<String, SourceDescriptor>,
    parsers: HashMap<String, Parser>,
}

impl Inner {
    fn bind(&mut self, descriptor: SourceDescriptor) {
        self.parsers.insert(
            descriptor.name.clone(),
            Parser::new(descriptor.format, &descriptor.name, &descriptor.location),
        );
        self.descriptors.insert(descriptor.name.clone(), descriptor);
    }

    fn sorted_descriptors(&self) -> Vec<SourceDescriptor> {
        let mut descriptors: Vec<SourceDescriptor> = self.descriptors.values().cloned().collect();
        descriptors.sort_by(|a, b| a.name.cmp(&b.name));
        descriptors
    }
}

pub struct SourceRegistry {
    manifest_path: PathBuf,
    inner: RwLock<Inner>,
}

impl SourceRegistry {
    /// Load the registry from its manifest, or from the built-in default
    /// source set when no manifest exists yet.
    #[instrument(level = "info", skip_all)]
    pub async fn load(manifest_path: impl Into<PathBuf>) -> Result<Self> {
        let manifest_path = manifest_path.into();
        let descriptors = match fs::read(&manifest_path).await {
            Ok(bytes) => serde_json::from_slice::<Vec<SourceDescriptor>>(&bytes)?,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!(manifest = %manifest_path.display(), "No manifest yet; using default sources");
                default_sources()
            }
            Err(e) => return Err(e.into()),
        };

        let mut inner = Inner::default();
        for descriptor in descriptors {
            validate_name(&descriptor.name)?;
            if inner.descriptors.contains_key(&descriptor.name) {
                return Err(Error::DuplicateSource(descriptor.name));
            }
            inner.bind(descriptor);
        }

        info!(
            count = inner.descriptors.len(),
            manifest = %manifest_path.display(),
            "Source registry loaded"
        );
        Ok(Self {
            manifest_path,
            inner: RwLock::new(inner),
        })
    }

    /// Register a new source and persist the manifest.
    #[instrument(level = "info", skip(self))]
    pub async fn register(&self, name: &str, format: &str, location: &str) -> Result<()> {
        let format: SourceFormat = format.parse()?;
        validate_name(name)?;

        let mut inner = self.inner.write().await;
        if inner.descriptors.contains_key(name) {
            return Err(Error::DuplicateSource(name.to_string()));
        }
        let descriptor = SourceDescriptor {
            name: name.to_string(),
            format,
            location: location.to_string(),
        };

        let mut manifest = inner.sorted_descriptors();
        manifest.push(descriptor.clone());
        manifest.sort_by(|a, b| a.name.cmp(&b.name));
        self.persist(&manifest).await?;

        inner.bind(descriptor);
        info!(name, %format, location, "Registered source");
        Ok(())
    }

    /// Update a source's format and/or location, re-deriving the bound
    /// parser only from the fields supplied, and persist the manifest.
    #[instrument(level = "info", skip(self))]
    pub async fn update(
        &self,
        name: &str,
        format: Option<&str>,
        location: Option<&str>,
    ) -> Result<()> {
        let format = format.map(str::parse::<SourceFormat>).transpose()?;

        let mut inner = self.inner.write().await;
        let Some(current) = inner.descriptors.get(name) else {
            return Err(Error::SourceNotFound(name.to_string()));
        };
        let descriptor = SourceDescriptor {
            name: current.name.clone(),
            format: format.unwrap_or(current.format),
            location: location.map(str::to_string).unwrap_or_else(|| current.location.clone()),
        };

        let mut manifest = inner.sorted_descriptors();
        if let Some(slot) = manifest.iter_mut().find(|d| d.name == name) {
            *slot = descriptor.clone();
        }
        self.persist(&manifest).await?;

        inner.bind(descriptor);
        info!(name, "Updated source");
        Ok(())
    }

    /// Remove a source's descriptor and bound parser, and persist the
    /// manifest.
    #[instrument(level = "info", skip(self))]
    pub async fn delete(&self, name: &str) -> Result<()> {
        let mut inner = self.inner.write().await;
        if !inner.descriptors.contains_key(name) {
            return Err(Error::SourceNotFound(name.to_string()));
        }

        let manifest: Vec<SourceDescriptor> = inner
            .sorted_descriptors()
            .into_iter()
            .filter(|d| d.name != name)
            .collect();
        self.persist(&manifest).await?;

        inner.descriptors.remove(name);
        inner.parsers.remove(name);
        info!(name, "Deleted source");
        Ok(())
    }

    /// A name-sorted snapshot of the registered descriptors. Owned
    /// copies, never the live map.
    pub async fn list(&self) -> Vec<SourceDescriptor> {
        self.inner.read().await.sorted_descriptors()
    }

    /// Bound parsers for the named sources, or for every registered
    /// source when `names` is empty. Names absent from the registry are
    /// skipped, not errors; a request naming a since-deleted source is
    /// stale, not wrong.
    pub(crate) async fn parsers_for(&self, names: &[String]) -> Vec<Parser> {
        let inner = self.inner.read().await;
        if names.is_empty() {
            let mut parsers: Vec<Parser> = inner.parsers.values().cloned().collect();
            parsers.sort_by(|a, b| a.source_name().cmp(b.source_name()));
            parsers
        } else {
            names
                .iter()
                .filter_map(|name| {
                    let parser = inner.parsers.get(name).cloned();
                    if parser.is_none() {
                        debug!(name, "Skipping unregistered source");
                    }
                    parser
                })
                .collect()
        }
    }

    /// Rewrite the manifest wholesale: temp file then rename, so the
    /// on-disk manifest is always either the old or the new list.
    async fn persist(&self, descriptors: &[SourceDescriptor]) -> Result<()> {
        if let Some(parent) = self.manifest_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }
        let json = serde_json::to_vec_pretty(descriptors)?;
        let tmp_path = self.manifest_path.with_extension("tmp");
        fs::write(&tmp_path, &json).await?;
        fs::rename(&tmp_path, &self.manifest_path).await?;
        debug!(
            count = descriptors.len(),
            manifest = %self.manifest_path.display(),
            "Persisted manifest"
        );
        Ok(())
    }
}

fn validate_name(name: &str) -> Result<()> {
    let length = name.chars().count();
    if (1..=20).contains(&length) {
        Ok(())
    } else {
        Err(Error::InvalidSourceName(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn fresh_registry(dir: &tempfile::TempDir) -> SourceRegistry {
        SourceRegistry::load(dir.path().join("sources.json")).await.unwrap()
    }

    #[tokio::test]
    async fn missing_manifest_yields_default_sources() {
        let dir = tempfile::tempdir().unwrap();
        let registry = fresh_registry(&dir).await;
        let names: Vec<_> = registry.list().await.into_iter().map(|d| d.name).collect();
        assert_eq!(names, vec!["abcnews", "bbc", "nbc", "usatoday"]);
    }

    #[tokio::test]
    async fn register_then_list_contains_the_source() {
        let dir = tempfile::tempdir().unwrap();
        let registry = fresh_registry(&dir).await;
        registry.register("source1", "xml", "https://source1.com").await.unwrap();

        let listed = registry.list().await;
        assert!(listed.iter().any(|d| {
            d.name == "source1"
                && d.format == SourceFormat::Xml
                && d.location == "https://source1.com"
        }));
    }

    #[tokio::test]
    async fn delete_then_list_excludes_the_source() {
        let dir = tempfile::tempdir().unwrap();
        let registry = fresh_registry(&dir).await;
        registry.register("source1", "xml", "https://source1.com").await.unwrap();
        registry.delete("source1").await.unwrap();
        assert!(!registry.list().await.iter().any(|d| d.name == "source1"));
    }

    #[tokio::test]
    async fn delete_missing_source_fails() {
        let dir = tempfile::tempdir().unwrap();
        let registry = fresh_registry(&dir).await;
        let err = registry.delete("missing").await.unwrap_err();
        assert!(matches!(err, Error::SourceNotFound(name) if name == "missing"));
    }

    #[tokio::test]
    async fn duplicate_registration_fails() {
        let dir = tempfile::tempdir().unwrap();
        let registry = fresh_registry(&dir).await;
        registry.register("source1", "xml", "https://source1.com").await.unwrap();
        let err = registry.register("source1", "json", "elsewhere").await.unwrap_err();
        assert!(matches!(err, Error::DuplicateSource(name) if name == "source1"));
    }

    #[tokio::test]
    async fn names_outside_one_to_twenty_chars_fail() {
        let dir = tempfile::tempdir().unwrap();
        let registry = fresh_registry(&dir).await;
        for bad in ["", "twenty-one-chars-long"] {
            let err = registry.register(bad, "xml", "loc").await.unwrap_err();
            assert!(matches!(err, Error::InvalidSourceName(_)), "{bad:?}");
        }
        // Boundary lengths are fine.
        registry.register("a", "xml", "loc").await.unwrap();
        registry.register("exactly-twenty-chars", "xml", "loc").await.unwrap();
    }

    #[tokio::test]
    async fn unknown_format_fails_registration() {
        let dir = tempfile::tempdir().unwrap();
        let registry = fresh_registry(&dir).await;
        let err = registry.register("source1", "atom", "loc").await.unwrap_err();
        assert!(matches!(err, Error::UnsupportedFormat(f) if f == "atom"));
        assert!(!registry.list().await.iter().any(|d| d.name == "source1"));
    }

    #[tokio::test]
    async fn update_of_location_only_keeps_format() {
        let dir = tempfile::tempdir().unwrap();
        let registry = fresh_registry(&dir).await;
        registry.register("source1", "json", "old.json").await.unwrap();
        registry.update("source1", None, Some("new.json")).await.unwrap();

        let listed = registry.list().await;
        let descriptor = listed.iter().find(|d| d.name == "source1").unwrap();
        assert_eq!(descriptor.format, SourceFormat::Json);
        assert_eq!(descriptor.location, "new.json");
    }

    #[tokio::test]
    async fn update_of_format_rebinds_the_parser() {
        let dir = tempfile::tempdir().unwrap();
        let registry = fresh_registry(&dir).await;
        registry.register("source1", "xml", "feed.dat").await.unwrap();
        registry.update("source1", Some("html"), None).await.unwrap();

        let parsers = registry.parsers_for(&["source1".to_string()]).await;
        assert!(matches!(parsers.as_slice(), [Parser::Html(_)]));
    }

    #[tokio::test]
    async fn update_missing_source_fails() {
        let dir = tempfile::tempdir().unwrap();
        let registry = fresh_registry(&dir).await;
        let err = registry.update("missing", None, Some("loc")).await.unwrap_err();
        assert!(matches!(err, Error::SourceNotFound(_)));
    }

    #[tokio::test]
    async fn manifest_survives_a_reload() {
        let dir = tempfile::tempdir().unwrap();
        let manifest = dir.path().join("sources.json");

        let registry = SourceRegistry::load(&manifest).await.unwrap();
        registry.register("source1", "html", "https://source1.com/news").await.unwrap();
        let before = registry.list().await;

        let reloaded = SourceRegistry::load(&manifest).await.unwrap();
        assert_eq!(reloaded.list().await, before);
    }

    #[tokio::test]
    async fn parsers_for_skips_unknown_names_and_keeps_request_order() {
        let dir = tempfile::tempdir().unwrap();
        let registry = fresh_registry(&dir).await;
        let names = vec!["usatoday".to_string(), "ghost".to_string(), "bbc".to_string()];
        let parsers = registry.parsers_for(&names).await;
        let bound: Vec<_> = parsers.iter().map(|p| p.source_name()).collect();
        assert_eq!(bound, vec!["usatoday", "bbc"]);
    }

    #[tokio::test]
    async fn parsers_for_empty_request_covers_every_source() {
        let dir = tempfile::tempdir().unwrap();
        let registry = fresh_registry(&dir).await;
        let parsers = registry.parsers_for(&[]).await;
        assert_eq!(parsers.len(), registry.list().await.len());
    }
}
