use super::{find_file, read_file, Enricher};
use crate::detection::Language;
use crate::fs::FileSystem;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::warn;

const FRAMEWORKS: &[(&str, &str)] = &[
    ("laravel/framework", "Laravel"),
    ("symfony/framework-bundle", "Symfony"),
    ("symfony/symfony", "Symfony"),
];

#[derive(Debug, Default, Deserialize)]
struct ComposerJson {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    require: BTreeMap<String, serde_json::Value>,
    #[serde(default, rename = "require-dev")]
    require_dev: BTreeMap<String, serde_json::Value>,
}

pub struct PhpEnricher {
    fs: Arc<dyn FileSystem>,
}

impl PhpEnricher {
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self { fs }
    }

    fn composer(&self, path: &Path) -> Option<ComposerJson> {
        let content = read_file(self.fs.as_ref(), path)?;
        serde_json::from_str(&content)
            .map_err(|e| warn!(path = %path.display(), error = %e, "Failed to parse composer.json"))
            .ok()
    }
}

impl Enricher for PhpEnricher {
    fn supported_languages(&self) -> &'static [&'static str] {
        &["PHP"]
    }

    fn file_system(&self) -> &dyn FileSystem {
        self.fs.as_ref()
    }

    fn enrich_language(&self, language: &mut Language, files: &[PathBuf]) {
        let Some(path) = find_file(files, &["composer.json"]) else {
            return;
        };
        language.add_tool("Composer");
        let Some(composer) = self.composer(path) else {
            return;
        };
        for (package, framework) in FRAMEWORKS {
            if composer.require.contains_key(*package) || composer.require_dev.contains_key(*package) {
                language.add_framework(framework);
            }
        }
    }

    fn project_name(&self, dir: &Path) -> Option<String> {
        let path = dir.join("composer.json");
        if !self.fs.is_file(&path) {
            return None;
        }
        let name = self.composer(&path)?.name?;
        name.rsplit('/').next().map(String::from)
    }
}
