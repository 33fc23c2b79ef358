//! Python enrichment (pip, Poetry, Pipenv; Django, Flask, FastAPI)

use super::{find_file, has_file, ports_in_sources, read_file, Enricher};
use crate::detection::Language;
use crate::fs::FileSystem;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

const MANIFESTS: &[&str] = &["requirements.txt", "pyproject.toml", "Pipfile", "setup.py"];

/// Package name (lowercase) to framework name
const FRAMEWORKS: &[(&str, &str)] = &[("django", "Django"), ("flask", "Flask"), ("fastapi", "FastAPI")];

pub struct PythonEnricher {
    fs: Arc<dyn FileSystem>,
}

impl PythonEnricher {
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self { fs }
    }
}

fn run_port_regex() -> &'static Regex {
    static RUN: OnceLock<Regex> = OnceLock::new();
    RUN.get_or_init(|| Regex::new(r"\.run\([^)]*\bport\s*=\s*(\d+)").expect("valid regex"))
}

fn pyproject_name(content: &str) -> Option<String> {
    let value: toml::Value = toml::from_str(content).ok()?;
    value
        .get("project")
        .and_then(|p| p.get("name"))
        .or_else(|| value.get("tool")?.get("poetry")?.get("name"))
        .and_then(|n| n.as_str())
        .map(String::from)
}

impl Enricher for PythonEnricher {
    fn supported_languages(&self) -> &'static [&'static str] {
        &["Python"]
    }

    fn file_system(&self) -> &dyn FileSystem {
        self.fs.as_ref()
    }

    fn enrich_language(&self, language: &mut Language, files: &[PathBuf]) {
        if has_file(files, "requirements.txt") {
            language.add_tool("pip");
        }
        if has_file(files, "Pipfile") {
            language.add_tool("Pipenv");
        }

        let mut manifests = String::new();
        for name in MANIFESTS {
            if let Some(content) = find_file(files, &[*name]).and_then(|p| read_file(self.fs.as_ref(), p)) {
                if *name == "pyproject.toml" && content.contains("[tool.poetry]") {
                    language.add_tool("Poetry");
                }
                manifests.push_str(&content.to_lowercase());
                manifests.push('\n');
            }
        }

        for (package, framework) in FRAMEWORKS {
            if manifests.contains(package) {
                language.add_framework(framework);
            }
        }
        if has_file(files, "manage.py") {
            language.add_framework("Django");
        }
    }

    fn project_name(&self, dir: &Path) -> Option<String> {
        let pyproject = dir.join("pyproject.toml");
        if !self.fs.is_file(&pyproject) {
            return None;
        }
        read_file(self.fs.as_ref(), &pyproject).and_then(|c| pyproject_name(&c))
    }

    fn source_ports(&self, _dir: &Path, files: &[PathBuf]) -> Vec<u16> {
        ports_in_sources(self.fs.as_ref(), files, &["py"], run_port_regex())
    }
}
