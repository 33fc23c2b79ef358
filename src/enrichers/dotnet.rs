use super::{ports_in_sources, read_file, Enricher};
use crate::detection::Language;
use crate::fs::FileSystem;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};
use tracing::warn;

const PROJECT_EXTENSIONS: &[&str] = &["csproj", "fsproj", "vbproj"];

pub struct DotNetEnricher {
    fs: Arc<dyn FileSystem>,
}

impl DotNetEnricher {
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self { fs }
    }
}

fn is_project_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| PROJECT_EXTENSIONS.contains(&e))
        .unwrap_or(false)
}

/// Values of `TargetFramework` and `TargetFrameworks` in a project file
fn target_frameworks(content: &str) -> Vec<String> {
    let doc = match roxmltree::Document::parse(content) {
        Ok(doc) => doc,
        Err(e) => {
            warn!(error = %e, "Failed to parse .NET project file");
            return Vec::new();
        }
    };
    doc.descendants()
        .filter(|n| n.has_tag_name("TargetFramework") || n.has_tag_name("TargetFrameworks"))
        .filter_map(|n| n.text())
        .flat_map(|t| t.split(';'))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(String::from)
        .collect()
}

fn application_url_regex() -> &'static Regex {
    static URL: OnceLock<Regex> = OnceLock::new();
    URL.get_or_init(|| Regex::new(r"https?://[^:/]+:(\d+)").expect("valid regex"))
}

impl Enricher for DotNetEnricher {
    fn supported_languages(&self) -> &'static [&'static str] {
        &["C#", "F#", "Visual Basic .NET"]
    }

    fn file_system(&self) -> &dyn FileSystem {
        self.fs.as_ref()
    }

    fn enrich_language(&self, language: &mut Language, files: &[PathBuf]) {
        let Some(project) = files.iter().find(|f| is_project_file(f)) else {
            return;
        };
        language.add_tool("dotnet");
        if let Some(content) = read_file(self.fs.as_ref(), project) {
            for framework in target_frameworks(&content) {
                language.add_framework(&framework);
            }
        }
    }

    fn project_name(&self, dir: &Path) -> Option<String> {
        let entries = self.fs.read_dir(dir).ok()?;
        entries
            .iter()
            .filter(|e| !e.is_dir())
            .find(|e| is_project_file(e.path()))
            .and_then(|e| e.path().file_stem())
            .map(|s| s.to_string_lossy().to_string())
    }

    fn source_ports(&self, _dir: &Path, files: &[PathBuf]) -> Vec<u16> {
        let launch_settings: Vec<PathBuf> = files
            .iter()
            .filter(|f| f.file_name().and_then(|n| n.to_str()) == Some("launchSettings.json"))
            .cloned()
            .collect();
        ports_in_sources(self.fs.as_ref(), &launch_settings, &["json"], application_url_regex())
    }
}
