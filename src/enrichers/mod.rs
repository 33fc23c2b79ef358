//! Language-specific enrichment of detected languages and components
//!
//! An [`Enricher`] attaches frameworks and tools to a [`Language`] and fills in
//! the name and ports of a [`Component`]. Enrichers are looked up by language
//! name through an [`EnricherRegistry`]; a language without an enricher is
//! simply left as detected.

mod dotnet;
mod go;
mod java;
mod javascript;
mod php;
pub mod ports;
mod python;
mod rust;

pub use dotnet::DotNetEnricher;
pub use go::GoEnricher;
pub use java::JavaEnricher;
pub use javascript::JavaScriptEnricher;
pub use php::PhpEnricher;
pub use python::PythonEnricher;
pub use rust::RustEnricher;

use crate::detection::{Component, DetectionContext, DetectionSettings, Language};
use crate::fs::FileSystem;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

pub trait Enricher: Send + Sync {
    /// Language names this enricher handles
    fn supported_languages(&self) -> &'static [&'static str];

    fn file_system(&self) -> &dyn FileSystem;

    /// Populate frameworks and tools from the files the language was detected in
    fn enrich_language(&self, language: &mut Language, files: &[PathBuf]);

    /// Project name declared by a manifest in `dir`
    fn project_name(&self, _dir: &Path) -> Option<String> {
        None
    }

    /// Ports found in the component's own sources and configuration
    fn source_ports(&self, _dir: &Path, _files: &[PathBuf]) -> Vec<u16> {
        Vec::new()
    }

    fn enrich_component(&self, component: &mut Component, settings: &DetectionSettings, ctx: &DetectionContext) {
        if let Some(name) = self.project_name(&component.path) {
            component.name = name;
        }

        let files = ctx.cached_files_under(&settings.base_path, &component.path);
        component.ports = ports::detect_ports(self.file_system(), &component.path, settings, || {
            self.source_ports(&component.path, &files)
        });
    }

    /// Whether a manifest should start a component. Exclude folders are checked by the caller.
    fn is_config_valid_for_component_detection(&self, _language: &str, _file: &Path) -> bool {
        true
    }
}

/// Enrichers keyed by the language names they support
#[derive(Clone, Default)]
pub struct EnricherRegistry {
    enrichers: Vec<Arc<dyn Enricher>>,
}

impl EnricherRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_defaults(fs: Arc<dyn FileSystem>) -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(JavaEnricher::new(fs.clone())));
        registry.register(Arc::new(JavaScriptEnricher::new(fs.clone())));
        registry.register(Arc::new(PythonEnricher::new(fs.clone())));
        registry.register(Arc::new(GoEnricher::new(fs.clone())));
        registry.register(Arc::new(DotNetEnricher::new(fs.clone())));
        registry.register(Arc::new(PhpEnricher::new(fs.clone())));
        registry.register(Arc::new(RustEnricher::new(fs)));
        registry
    }

    pub fn register(&mut self, enricher: Arc<dyn Enricher>) {
        self.enrichers.push(enricher);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn Enricher>> {
        self.enrichers.iter()
    }

    pub fn for_language(&self, name: &str) -> Option<&Arc<dyn Enricher>> {
        self.enrichers.iter().find(|e| {
            e.supported_languages()
                .iter()
                .any(|l| l.eq_ignore_ascii_case(name))
        })
    }

    pub fn enrich_language(&self, language: &mut Language, files: &[PathBuf]) {
        match self.for_language(&language.name) {
            Some(enricher) => enricher.enrich_language(language, files),
            None => debug!(language = %language.name, "No enricher registered"),
        }
    }

    /// Enriches using the component's primary language
    pub fn enrich_component(&self, component: &mut Component, settings: &DetectionSettings, ctx: &DetectionContext) {
        let Some(name) = component.primary_language().map(|l| l.name.clone()) else {
            return;
        };
        match self.for_language(&name) {
            Some(enricher) => enricher.enrich_component(component, settings, ctx),
            None => debug!(language = %name, "No enricher registered"),
        }
    }

    pub fn is_config_valid(&self, language: &str, file: &Path) -> bool {
        self.for_language(language)
            .map(|e| e.is_config_valid_for_component_detection(language, file))
            .unwrap_or(true)
    }
}

/// First file in `files` whose name is one of `names`
pub(crate) fn find_file<'a>(files: &'a [PathBuf], names: &[&str]) -> Option<&'a PathBuf> {
    files.iter().find(|f| {
        f.file_name()
            .and_then(|n| n.to_str())
            .map(|n| names.contains(&n))
            .unwrap_or(false)
    })
}

pub(crate) fn has_file(files: &[PathBuf], name: &str) -> bool {
    find_file(files, &[name]).is_some()
}

pub(crate) fn read_file(fs: &dyn FileSystem, path: &Path) -> Option<String> {
    match fs.read_to_string(path) {
        Ok(content) => Some(content),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Skipping unreadable file");
            None
        }
    }
}

/// Scans files with the given extensions for the first capture group of `pattern`
pub(crate) fn ports_in_sources(
    fs: &dyn FileSystem,
    files: &[PathBuf],
    extensions: &[&str],
    pattern: &Regex,
) -> Vec<u16> {
    let mut found = Vec::new();
    for file in files {
        let matches_ext = file
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| extensions.contains(&e))
            .unwrap_or(false);
        if !matches_ext {
            continue;
        }
        let Ok(content) = fs.read_to_string(file) else {
            continue;
        };
        found.extend(ports::ports_from_captures(pattern, &content));
    }
    ports::dedup(found)
}
