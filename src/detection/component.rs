use super::context::DetectionContext;
use super::indexer::FileIndexer;
use super::language::LanguageRecognizer;
use super::types::{Component, DetectionSettings, Language};
use crate::enrichers::EnricherRegistry;
use crate::error::{DetectionError, Result};
use crate::languages::LanguageRegistry;
use rayon::prelude::*;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Language sets sharing one toolchain, so a manifest matching all of them is unambiguous
const INTERCHANGEABLE: &[&[&str]] = &[&["JavaScript", "TypeScript"]];

/// Splits a source tree into components.
///
/// Manifests found by the configuration file patterns come first. Directories
/// not covered by any of those components are then analyzed on their own and
/// kept only when their primary language needs no manifest at all.
pub struct ComponentRecognizer<'a> {
    languages: &'a LanguageRegistry,
    enrichers: &'a EnricherRegistry,
    indexer: &'a FileIndexer,
    parallel: bool,
}

impl<'a> ComponentRecognizer<'a> {
    pub fn new(languages: &'a LanguageRegistry, enrichers: &'a EnricherRegistry, indexer: &'a FileIndexer) -> Self {
        Self {
            languages,
            enrichers,
            indexer,
            parallel: true,
        }
    }

    /// Analyze fallback directories on the rayon pool
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    fn recognizer(&self) -> LanguageRecognizer<'a> {
        LanguageRecognizer::new(self.languages, self.enrichers)
    }

    pub fn detect_components(&self, settings: &DetectionSettings, ctx: &DetectionContext) -> Result<Vec<Component>> {
        let root = settings.base_path.as_path();
        let files = self.indexer.list_files_cached(root, ctx)?;

        let mut components = self.detect_from_config_files(root, &files, &files, ctx)?;
        let uncovered = directories_without_component(root, &files, &components);
        debug!(
            configured = components.len(),
            uncovered = uncovered.len(),
            "Analyzing directories without configuration files"
        );

        for component in self.detect_without_config_files(&uncovered, &files, ctx)? {
            push_if_missing(&mut components, component);
        }

        self.enrich(&mut components, settings, ctx)?;
        info!(root = %root.display(), components = components.len(), "Component detection finished");
        Ok(components)
    }

    /// Configuration-file detection over the files directly inside the root, with no fallback
    pub fn detect_components_in_root(
        &self,
        settings: &DetectionSettings,
        ctx: &DetectionContext,
    ) -> Result<Vec<Component>> {
        let root = settings.base_path.as_path();
        let files = self.indexer.list_files_cached(root, ctx)?;
        let top_level = self.indexer.list_root_files(root, ctx)?;

        let mut components = self.detect_from_config_files(root, &top_level, &files, ctx)?;
        self.enrich(&mut components, settings, ctx)?;
        Ok(components)
    }

    fn detect_from_config_files(
        &self,
        root: &Path,
        candidates: &[PathBuf],
        all_files: &[PathBuf],
        ctx: &DetectionContext,
    ) -> Result<Vec<Component>> {
        let mut components = Vec::new();
        for file in candidates {
            if ctx.is_cancelled() {
                return Err(DetectionError::Cancelled);
            }
            let Some(name) = file.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            let languages = self.languages.languages_for_config_file(name);
            if languages.is_empty() {
                continue;
            }

            match self.component_from_config(root, file, &languages, all_files) {
                Some(component) => {
                    debug!(
                        path = %component.path.display(),
                        manifest = name,
                        language = %component.languages[0].name,
                        "Detected component from configuration file"
                    );
                    push_if_missing(&mut components, component);
                }
                None => debug!(manifest = %file.display(), "Configuration file does not start a component"),
            }
        }
        Ok(components)
    }

    fn component_from_config(
        &self,
        root: &Path,
        file: &Path,
        languages: &[&str],
        all_files: &[PathBuf],
    ) -> Option<Component> {
        let dir = file.parent()?;

        if languages.len() == 1 || belong_to_same_family(languages) {
            let language = languages[0];
            if !self.is_configuration_valid(root, language, file) {
                return None;
            }
            let detected = self.recognizer().analyze_file(file, language)?;
            return detected
                .can_be_component
                .then(|| Component::new(dir.to_path_buf(), vec![detected]));
        }

        let language = languages
            .iter()
            .find(|l| self.is_configuration_valid(root, l, file))?;
        debug!(manifest = %file.display(), hint = language, "Ambiguous manifest, analyzing directory");

        let mut detected = self.recognizer().analyze(dir, &files_under(all_files, dir));
        promote_hint(&mut detected, languages);
        component_if_allowed(dir, detected)
    }

    fn is_configuration_valid(&self, root: &Path, language: &str, file: &Path) -> bool {
        let Some(definition) = self.languages.get_language(language) else {
            return false;
        };
        let in_excluded = file
            .parent()
            .and_then(|dir| dir.strip_prefix(root).ok())
            .map(|dir| {
                dir.components().any(|c| {
                    c.as_os_str()
                        .to_str()
                        .map(|name| definition.exclude_folders.contains(&name))
                        .unwrap_or(false)
                })
            })
            .unwrap_or(false);

        !in_excluded && self.enrichers.is_config_valid(language, file)
    }

    fn detect_without_config_files(
        &self,
        dirs: &[PathBuf],
        all_files: &[PathBuf],
        ctx: &DetectionContext,
    ) -> Result<Vec<Component>> {
        let analyze = |dir: &PathBuf| -> Result<Option<Component>> {
            if ctx.is_cancelled() {
                return Err(DetectionError::Cancelled);
            }
            let detected = self.recognizer().analyze(dir, &files_under(all_files, dir));
            let needs_manifest = detected
                .first()
                .map(|l| self.languages.has_configuration_files(&l.name))
                .unwrap_or(true);
            if needs_manifest {
                debug!(path = %dir.display(), "No component without configuration file");
                return Ok(None);
            }
            Ok(component_if_allowed(dir, detected))
        };

        let results: Vec<Result<Option<Component>>> = if self.parallel {
            dirs.par_iter().map(analyze).collect()
        } else {
            dirs.iter().map(analyze).collect()
        };

        let mut components = Vec::new();
        for result in results {
            if let Some(component) = result? {
                components.push(component);
            }
        }
        Ok(components)
    }

    fn enrich(&self, components: &mut [Component], settings: &DetectionSettings, ctx: &DetectionContext) -> Result<()> {
        for component in components.iter_mut() {
            if ctx.is_cancelled() {
                return Err(DetectionError::Cancelled);
            }
            self.enrichers.enrich_component(component, settings, ctx);
        }
        Ok(())
    }
}

fn belong_to_same_family(languages: &[&str]) -> bool {
    INTERCHANGEABLE.iter().any(|family| {
        languages
            .iter()
            .all(|l| family.iter().any(|f| f.eq_ignore_ascii_case(l)))
    })
}

/// Moves the heaviest detected language named by the hint to the front
fn promote_hint(detected: &mut Vec<Language>, hint: &[&str]) {
    let Some(pos) = detected
        .iter()
        .position(|l| hint.iter().any(|name| l.answers_to(name)))
    else {
        return;
    };
    let language = detected.remove(pos);
    detected.insert(0, language);
}

fn component_if_allowed(dir: &Path, languages: Vec<Language>) -> Option<Component> {
    let primary = languages.first()?;
    primary
        .can_be_component
        .then(|| Component::new(dir.to_path_buf(), languages))
}

fn files_under(files: &[PathBuf], dir: &Path) -> Vec<PathBuf> {
    files.iter().filter(|f| f.starts_with(dir)).cloned().collect()
}

fn overlaps(a: &Path, b: &Path) -> bool {
    a.starts_with(b) || b.starts_with(a)
}

/// Appends unless a component with the same primary language already covers an overlapping path
fn push_if_missing(components: &mut Vec<Component>, component: Component) {
    let Some(primary) = component.primary_language() else {
        return;
    };
    let duplicate = components.iter().any(|existing| {
        existing
            .primary_language()
            .map(|l| l.name.eq_ignore_ascii_case(&primary.name))
            .unwrap_or(false)
            && overlaps(&existing.path, &component.path)
    });
    if duplicate {
        debug!(path = %component.path.display(), language = %primary.name, "Dropping duplicate component");
        return;
    }
    components.push(component);
}

/// Directories below `root` that no component covers, collapsed to their maximal elements.
///
/// Without any component the whole root is returned.
pub fn directories_without_component(root: &Path, files: &[PathBuf], components: &[Component]) -> Vec<PathBuf> {
    if components.is_empty() {
        return vec![root.to_path_buf()];
    }

    let mut dirs: BTreeSet<PathBuf> = BTreeSet::new();
    for file in files {
        let mut current = file.parent();
        while let Some(dir) = current {
            if dir == root || !dir.starts_with(root) {
                break;
            }
            if !dirs.insert(dir.to_path_buf()) {
                break;
            }
            current = dir.parent();
        }
    }

    let uncovered = dirs
        .into_iter()
        .filter(|dir| !components.iter().any(|c| overlaps(dir, &c.path)));
    collapse_to_maximal(uncovered)
}

/// Keeps only directories with no ancestor in the set. One pass over the sorted paths.
pub fn collapse_to_maximal(dirs: impl IntoIterator<Item = PathBuf>) -> Vec<PathBuf> {
    let mut sorted: Vec<PathBuf> = dirs.into_iter().collect();
    sorted.sort();
    sorted.dedup();

    let mut maximal: Vec<PathBuf> = Vec::new();
    for dir in sorted {
        match maximal.last() {
            Some(last) if dir.starts_with(last) => {}
            _ => maximal.push(dir),
        }
    }
    maximal
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::{MockFileSystem, WalkOptions};
    use std::sync::Arc;

    struct Fixture {
        fs: Arc<MockFileSystem>,
        languages: LanguageRegistry,
        enrichers: EnricherRegistry,
        indexer: FileIndexer,
    }

    impl Fixture {
        fn new() -> Self {
            let fs = Arc::new(MockFileSystem::new());
            let languages = LanguageRegistry::with_defaults();
            let enrichers = EnricherRegistry::with_defaults(fs.clone());
            let indexer = FileIndexer::new(fs.clone(), WalkOptions::new(languages.all_excluded_dirs()));
            Self {
                fs,
                languages,
                enrichers,
                indexer,
            }
        }

        fn detect(&self) -> Vec<Component> {
            ComponentRecognizer::new(&self.languages, &self.enrichers, &self.indexer)
                .with_parallel(false)
                .detect_components(&DetectionSettings::new("/mock"), &DetectionContext::new())
                .unwrap()
        }
    }

    fn summary(components: &[Component]) -> Vec<(String, String)> {
        components
            .iter()
            .map(|c| (c.path.display().to_string(), c.languages[0].name.clone()))
            .collect()
    }

    #[test]
    fn test_two_services() {
        let fx = Fixture::new();
        fx.fs.add_file("svc-a/package.json", r#"{"name": "svc-a"}"#);
        fx.fs.add_file("svc-a/index.js", "");
        fx.fs.add_file("svc-b/pom.xml", "<project><artifactId>svc-b</artifactId></project>");
        fx.fs.add_file("svc-b/src/main/java/App.java", "");

        let components = fx.detect();
        assert_eq!(
            summary(&components),
            vec![
                ("/mock/svc-a".to_string(), "JavaScript".to_string()),
                ("/mock/svc-b".to_string(), "Java".to_string()),
            ]
        );
    }

    #[test]
    fn test_ambiguous_manifest_uses_hint() {
        let fx = Fixture::new();
        fx.fs.add_file("app/build.gradle.kts", "plugins { kotlin(\"jvm\") }");
        fx.fs.add_file("app/src/Main.kt", "");
        fx.fs.add_file("app/src/Util.kt", "");

        let components = fx.detect();
        assert_eq!(components.len(), 1);
        assert_eq!(components[0].languages[0].name, "Kotlin");
        assert_eq!(components[0].languages[0].tools, vec!["Gradle"]);
    }

    #[test]
    fn test_ambiguous_manifest_prefers_heaviest_candidate() {
        let fx = Fixture::new();
        fx.fs.add_file("app/build.gradle", "plugins { id 'org.jetbrains.kotlin.jvm' }");
        for i in 0..9 {
            fx.fs.add_file(format!("app/src/K{}.kt", i), "");
        }
        fx.fs.add_file("app/src/Legacy.java", "");

        let components = fx.detect();
        assert_eq!(components.len(), 1);
        let weighted: Vec<(&str, f64)> = components[0]
            .languages
            .iter()
            .map(|l| (l.name.as_str(), l.weight))
            .collect();
        assert_eq!(weighted, vec![("Kotlin", 90.0), ("Java", 10.0)]);
    }

    #[test]
    fn test_promote_hint_keeps_weight_order() {
        let mut detected = vec![
            Language::new("Shell", 60.0),
            Language::new("Kotlin", 30.0),
            Language::new("Java", 10.0),
        ];
        promote_hint(&mut detected, &["Java", "Kotlin"]);
        let names: Vec<&str> = detected.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, vec!["Kotlin", "Shell", "Java"]);
    }

    #[test]
    fn test_nested_same_language_is_dropped() {
        let fx = Fixture::new();
        fx.fs.add_file("package.json", "{}");
        fx.fs.add_file("packages/ui/package.json", "{}");

        let components = fx.detect();
        assert_eq!(summary(&components), vec![("/mock".to_string(), "JavaScript".to_string())]);
    }

    #[test]
    fn test_aggregator_pom_yields_modules() {
        let fx = Fixture::new();
        fx.fs.add_file(
            "pom.xml",
            "<project><artifactId>parent</artifactId><modules><module>api</module></modules></project>",
        );
        fx.fs.add_file("api/pom.xml", "<project><artifactId>api</artifactId></project>");

        let components = fx.detect();
        assert_eq!(summary(&components), vec![("/mock/api".to_string(), "Java".to_string())]);
        assert_eq!(components[0].name, "api");
    }

    #[test]
    fn test_fallback_for_language_without_manifest() {
        let fx = Fixture::new();
        fx.fs.add_file("web/package.json", "{}");
        fx.fs.add_file("native/src/engine.cpp", "");
        fx.fs.add_file("native/src/engine.hpp", "");
        fx.fs.add_file("scripts/tool.py", "");

        let components = fx.detect();
        assert_eq!(
            summary(&components),
            vec![
                ("/mock/web".to_string(), "JavaScript".to_string()),
                ("/mock/native".to_string(), "C++".to_string()),
            ]
        );
    }

    #[test]
    fn test_root_fallback_when_nothing_configured() {
        let fx = Fixture::new();
        fx.fs.add_file("main.c", "");
        fx.fs.add_file("util.c", "");

        let components = fx.detect();
        assert_eq!(summary(&components), vec![("/mock".to_string(), "C".to_string())]);
        assert_eq!(components[0].name, "mock");
    }

    #[test]
    fn test_python_without_manifest_is_not_a_component() {
        let fx = Fixture::new();
        fx.fs.add_file("app.py", "");
        assert!(fx.detect().is_empty());
    }

    #[test]
    fn test_components_in_root_ignore_nested_manifests() {
        let fx = Fixture::new();
        fx.fs.add_file("go.mod", "module example.com/api\n");
        fx.fs.add_file("tools/Cargo.toml", "[package]\nname = \"tools\"\n");

        let components = ComponentRecognizer::new(&fx.languages, &fx.enrichers, &fx.indexer)
            .detect_components_in_root(&DetectionSettings::new("/mock"), &DetectionContext::new())
            .unwrap();
        assert_eq!(summary(&components), vec![("/mock".to_string(), "Go".to_string())]);
        assert_eq!(components[0].name, "api");
    }

    #[test]
    fn test_component_ports_from_dockerfile() {
        let fx = Fixture::new();
        fx.fs.add_file("svc/requirements.txt", "flask\n");
        fx.fs.add_file("svc/Dockerfile", "FROM python:3.12\nEXPOSE 5000\n");

        let components = fx.detect();
        assert_eq!(components.len(), 1);
        assert_eq!(components[0].ports, vec![5000]);
        assert_eq!(components[0].languages[0].frameworks, vec!["Flask"]);
    }

    #[test]
    fn test_cancelled_detection() {
        let fx = Fixture::new();
        fx.fs.add_file("go.mod", "module x\n");
        let ctx = DetectionContext::new();
        ctx.cancel();

        let result = ComponentRecognizer::new(&fx.languages, &fx.enrichers, &fx.indexer)
            .detect_components(&DetectionSettings::new("/mock"), &ctx);
        assert!(matches!(result, Err(DetectionError::Cancelled)));
    }

    #[test]
    fn test_collapse_to_maximal_is_idempotent() {
        let dirs = vec![
            PathBuf::from("/r/a/b"),
            PathBuf::from("/r/a"),
            PathBuf::from("/r/a-b"),
            PathBuf::from("/r/c/d/e"),
            PathBuf::from("/r/c/d"),
            PathBuf::from("/r/a/b"),
        ];
        let once = collapse_to_maximal(dirs);
        assert_eq!(
            once,
            vec![PathBuf::from("/r/a"), PathBuf::from("/r/a-b"), PathBuf::from("/r/c/d")]
        );
        assert_eq!(collapse_to_maximal(once.clone()), once);
    }

    #[test]
    fn test_directories_without_component_skip_covered() {
        let files = vec![
            PathBuf::from("/r/svc/src/main.go"),
            PathBuf::from("/r/lib/x/y.c"),
            PathBuf::from("/r/top.txt"),
        ];
        let covered = vec![Component::new(PathBuf::from("/r/svc/src"), vec![])];

        let dirs = directories_without_component(Path::new("/r"), &files, &covered);
        assert_eq!(dirs, vec![PathBuf::from("/r/lib")]);
    }

    #[test]
    fn test_same_family() {
        assert!(belong_to_same_family(&["JavaScript", "TypeScript"]));
        assert!(!belong_to_same_family(&["Java", "Kotlin"]));
    }
}
