//! JavaScript and TypeScript enrichment from package.json

use super::{find_file, ports_in_sources, read_file, Enricher};
use crate::detection::Language;
use crate::fs::FileSystem;
use regex::Regex;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};
use tracing::warn;

/// Dependency name to framework name, in reporting order
const FRAMEWORKS: &[(&str, &str)] = &[
    ("@angular/core", "Angular"),
    ("express", "Express"),
    ("next", "Next.js"),
    ("nuxt", "Nuxt.js"),
    ("react", "React"),
    ("svelte", "Svelte"),
    ("vue", "Vue"),
];

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PackageJson {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    dependencies: BTreeMap<String, serde_json::Value>,
    #[serde(default)]
    dev_dependencies: BTreeMap<String, serde_json::Value>,
    #[serde(default)]
    peer_dependencies: BTreeMap<String, serde_json::Value>,
}

impl PackageJson {
    fn depends_on(&self, name: &str) -> bool {
        self.dependencies.contains_key(name)
            || self.dev_dependencies.contains_key(name)
            || self.peer_dependencies.contains_key(name)
    }
}

pub struct JavaScriptEnricher {
    fs: Arc<dyn FileSystem>,
}

impl JavaScriptEnricher {
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self { fs }
    }

    fn package_json(&self, path: &Path) -> Option<PackageJson> {
        let content = read_file(self.fs.as_ref(), path)?;
        match serde_json::from_str(&content) {
            Ok(package) => Some(package),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to parse package.json");
                None
            }
        }
    }
}

fn listen_regex() -> &'static Regex {
    static LISTEN: OnceLock<Regex> = OnceLock::new();
    LISTEN.get_or_init(|| Regex::new(r"\.listen\(\s*(\d+)").expect("valid regex"))
}

impl Enricher for JavaScriptEnricher {
    fn supported_languages(&self) -> &'static [&'static str] {
        &["JavaScript", "TypeScript"]
    }

    fn file_system(&self) -> &dyn FileSystem {
        self.fs.as_ref()
    }

    fn enrich_language(&self, language: &mut Language, files: &[PathBuf]) {
        language.add_tool("NodeJs");
        language.add_tool("Node.js");

        let Some(package) = find_file(files, &["package.json"]).and_then(|p| self.package_json(p)) else {
            return;
        };
        for (dependency, framework) in FRAMEWORKS {
            if package.depends_on(dependency) {
                language.add_framework(framework);
            }
        }
    }

    fn project_name(&self, dir: &Path) -> Option<String> {
        let path = dir.join("package.json");
        if !self.fs.is_file(&path) {
            return None;
        }
        self.package_json(&path)?.name.filter(|n| !n.is_empty())
    }

    fn source_ports(&self, _dir: &Path, files: &[PathBuf]) -> Vec<u16> {
        ports_in_sources(
            self.fs.as_ref(),
            files,
            &["js", "mjs", "cjs", "ts"],
            listen_regex(),
        )
    }
}
