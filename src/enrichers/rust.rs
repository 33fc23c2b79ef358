use super::{find_file, ports_in_sources, read_file, Enricher};
use crate::detection::Language;
use crate::fs::FileSystem;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};
use toml::Value;
use tracing::warn;

const FRAMEWORKS: &[(&str, &str)] = &[("actix-web", "Actix"), ("axum", "Axum"), ("rocket", "Rocket")];

pub struct RustEnricher {
    fs: Arc<dyn FileSystem>,
}

impl RustEnricher {
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self { fs }
    }

    fn manifest(&self, path: &Path) -> Option<Value> {
        let content = read_file(self.fs.as_ref(), path)?;
        toml::from_str(&content)
            .map_err(|e| warn!(path = %path.display(), error = %e, "Failed to parse Cargo.toml"))
            .ok()
    }
}

fn bind_regex() -> &'static Regex {
    static BIND: OnceLock<Regex> = OnceLock::new();
    BIND.get_or_init(|| {
        Regex::new(r#""(?:0\.0\.0\.0|127\.0\.0\.1|localhost|\[::\]):(\d+)""#).expect("valid regex")
    })
}

impl Enricher for RustEnricher {
    fn supported_languages(&self) -> &'static [&'static str] {
        &["Rust"]
    }

    fn file_system(&self) -> &dyn FileSystem {
        self.fs.as_ref()
    }

    fn enrich_language(&self, language: &mut Language, files: &[PathBuf]) {
        let Some(path) = find_file(files, &["Cargo.toml"]) else {
            return;
        };
        language.add_tool("Cargo");
        let Some(manifest) = self.manifest(path) else {
            return;
        };
        let dependencies = manifest.get("dependencies").and_then(Value::as_table);
        for (krate, framework) in FRAMEWORKS {
            if dependencies.map(|d| d.contains_key(*krate)).unwrap_or(false) {
                language.add_framework(framework);
            }
        }
    }

    fn project_name(&self, dir: &Path) -> Option<String> {
        let path = dir.join("Cargo.toml");
        if !self.fs.is_file(&path) {
            return None;
        }
        self.manifest(&path)?
            .get("package")?
            .get("name")?
            .as_str()
            .map(String::from)
    }

    fn source_ports(&self, _dir: &Path, files: &[PathBuf]) -> Vec<u16> {
        ports_in_sources(self.fs.as_ref(), files, &["rs"], bind_regex())
    }
}
