//! Detection service orchestration
//!
//! `DetectionService` wires the language table, the enrichers, the file indexer
//! and the registry client together and exposes the public detection and
//! devfile-selection operations.
//!
//! # Example
//!
//! ```no_run
//! use devscout::{DetectionContext, DetectionService, DetectorConfig, DevfileFilter};
//! use std::path::Path;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let service = DetectionService::new(DetectorConfig::default())?;
//! let root = Path::new("/path/to/project");
//!
//! for component in service.detect_components(root)? {
//!     println!("{}", component);
//! }
//!
//! let ctx = DetectionContext::new();
//! let devfiles = service
//!     .match_devfiles(root, "https://registry.devfile.io", &DevfileFilter::new(), &ctx)
//!     .await?;
//! println!("Best devfile: {:?}", devfiles.first().map(|d| &d.name));
//! # Ok(())
//! # }
//! ```

use super::component::ComponentRecognizer;
use super::context::DetectionContext;
use super::devfile::{main_language, select_devfiles_by_language, select_devfiles_by_languages};
use super::indexer::FileIndexer;
use super::language::LanguageRecognizer;
use super::types::{Component, DetectionSettings, Language};
use crate::config::DetectorConfig;
use crate::enrichers::{Enricher, EnricherRegistry};
use crate::error::{DetectionError, Result};
use crate::fs::{FileSystem, RealFileSystem, WalkOptions};
use crate::languages::LanguageRegistry;
use crate::registry::{DevfileFilter, DevfileType, RegistryClient};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// High-level entry point for language, component and devfile detection
///
/// # Thread Safety
///
/// The service is `Send + Sync` and can be shared across threads using `Arc`.
pub struct DetectionService {
    detector: Arc<Detector>,
    registry: RegistryClient,
    config: DetectorConfig,
}

/// Synchronous detection state, shared with blocking tasks
#[derive(Clone)]
struct Detector {
    languages: LanguageRegistry,
    enrichers: EnricherRegistry,
    indexer: FileIndexer,
    parallel_fallback: bool,
}

impl std::fmt::Debug for DetectionService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DetectionService")
            .field("languages", &self.detector.languages.language_names().len())
            .field("config", &self.config)
            .finish()
    }
}

impl DetectionService {
    /// Service over the real filesystem
    pub fn new(config: DetectorConfig) -> Result<Self> {
        Self::with_file_system(Arc::new(RealFileSystem::new()), config)
    }

    /// Service over a custom filesystem, e.g. [`MockFileSystem`](crate::fs::MockFileSystem) in tests.
    ///
    /// Fails with [`DetectionError::Config`] when `config` does not validate.
    pub fn with_file_system(fs: Arc<dyn FileSystem>, config: DetectorConfig) -> Result<Self> {
        config.validate()?;

        let languages = LanguageRegistry::with_defaults();
        let enrichers = EnricherRegistry::with_defaults(fs.clone());
        let options = WalkOptions::new(languages.all_excluded_dirs()).with_gitignore(config.respect_gitignore);
        let indexer = FileIndexer::new(fs, options);
        let registry = RegistryClient::with_timeout(config.request_timeout())?;

        info!(
            registry = %config.registry_url,
            parallel_fallback = config.parallel_fallback,
            "Detection service initialized"
        );

        Ok(Self {
            detector: Arc::new(Detector {
                languages,
                enrichers,
                indexer,
                parallel_fallback: config.parallel_fallback,
            }),
            registry,
            config,
        })
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    pub fn languages(&self) -> &LanguageRegistry {
        &self.detector.languages
    }

    /// Adds an enricher that takes precedence over the built-in ones for its languages
    pub fn register_enricher(&mut self, enricher: Arc<dyn Enricher>) {
        let detector = Arc::make_mut(&mut self.detector);
        let mut enrichers = EnricherRegistry::new();
        enrichers.register(enricher);
        for existing in detector.enrichers.iter() {
            enrichers.register(existing.clone());
        }
        detector.enrichers = enrichers;
    }

    /// Weighted languages of the whole tree under `root`, heaviest first
    pub fn detect_languages(&self, root: &Path) -> Result<Vec<Language>> {
        self.detect_languages_with(root, &DetectionContext::new())
    }

    pub fn detect_languages_with(&self, root: &Path, ctx: &DetectionContext) -> Result<Vec<Language>> {
        self.detector.detect_languages_with(root, ctx)
    }

    pub fn detect_components(&self, root: &Path) -> Result<Vec<Component>> {
        self.detect_components_with(&DetectionSettings::new(root), &DetectionContext::new())
    }

    pub fn detect_components_with(
        &self,
        settings: &DetectionSettings,
        ctx: &DetectionContext,
    ) -> Result<Vec<Component>> {
        self.detector.detect_components_with(settings, ctx)
    }

    /// Components declared by manifests directly inside `root`
    pub fn detect_components_in_root(&self, root: &Path) -> Result<Vec<Component>> {
        self.detect_components_in_root_with(&DetectionSettings::new(root), &DetectionContext::new())
    }

    pub fn detect_components_in_root_with(
        &self,
        settings: &DetectionSettings,
        ctx: &DetectionContext,
    ) -> Result<Vec<Component>> {
        self.detector.detect_components_in_root_with(settings, ctx)
    }

    /// Catalog indices for the project at `root`.
    ///
    /// Tries the components declared at the root, then components anywhere in
    /// the tree, and finally the main language of the whole tree.
    pub fn select_devfiles_from_types(&self, root: &Path, devfiles: &[DevfileType]) -> Result<Vec<usize>> {
        self.detector
            .select_devfiles_with(root, devfiles, &DetectionContext::new())
    }

    pub fn select_devfile_from_types(&self, root: &Path, devfiles: &[DevfileType]) -> Result<usize> {
        first(self.select_devfiles_from_types(root, devfiles)?, root)
    }

    pub fn select_devfiles_using_languages_from_types(
        &self,
        languages: &[Language],
        devfiles: &[DevfileType],
    ) -> Result<Vec<usize>> {
        select_devfiles_by_languages(languages, devfiles)
    }

    pub fn select_devfile_using_languages_from_types(
        &self,
        languages: &[Language],
        devfiles: &[DevfileType],
    ) -> Result<usize> {
        select_devfiles_by_languages(languages, devfiles)?
            .first()
            .copied()
            .ok_or(DetectionError::NoDevfileForLanguages)
    }

    pub fn main_language<'l>(&self, languages: &'l [Language]) -> Result<&'l Language> {
        main_language(languages)
    }

    /// Downloads the registry index and returns the entries that fit the project.
    ///
    /// The tree walk and selection run on the blocking pool once the index has arrived.
    pub async fn match_devfiles(
        &self,
        root: &Path,
        registry_url: &str,
        filter: &DevfileFilter,
        ctx: &DetectionContext,
    ) -> Result<Vec<DevfileType>> {
        info!(root = %root.display(), registry = registry_url, "Starting devfile matching");
        let catalog = self.registry.fetch_devfile_types(registry_url, filter, ctx).await?;

        let detector = Arc::clone(&self.detector);
        let root = root.to_path_buf();
        let ctx = ctx.clone();
        tokio::task::spawn_blocking(move || -> Result<Vec<DevfileType>> {
            let indices = detector.select_devfiles_with(&root, &catalog, &ctx)?;
            Ok(indices.into_iter().map(|i| catalog[i].clone()).collect())
        })
        .await
        .map_err(|e| DetectionError::TaskFailed(e.to_string()))?
    }

    /// [`match_devfiles`](Self::match_devfiles) without a schema-version filter
    pub async fn select_devfiles_from_registry(
        &self,
        root: &Path,
        registry_url: &str,
        ctx: &DetectionContext,
    ) -> Result<Vec<DevfileType>> {
        self.match_devfiles(root, registry_url, &DevfileFilter::new(), ctx).await
    }

    pub async fn select_devfile_from_registry(
        &self,
        root: &Path,
        registry_url: &str,
        ctx: &DetectionContext,
    ) -> Result<DevfileType> {
        self.select_devfiles_from_registry(root, registry_url, ctx)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| DetectionError::NoDevfileForPath(root.to_path_buf()))
    }

    /// Uses the configured registry URL
    pub async fn match_devfiles_from_default_registry(
        &self,
        root: &Path,
        filter: &DevfileFilter,
        ctx: &DetectionContext,
    ) -> Result<Vec<DevfileType>> {
        self.match_devfiles(root, &self.config.registry_url, filter, ctx).await
    }
}

impl Detector {
    fn component_recognizer(&self) -> ComponentRecognizer<'_> {
        ComponentRecognizer::new(&self.languages, &self.enrichers, &self.indexer).with_parallel(self.parallel_fallback)
    }

    fn detect_languages_with(&self, root: &Path, ctx: &DetectionContext) -> Result<Vec<Language>> {
        let start = Instant::now();
        let files = self.indexer.list_files_cached(root, ctx)?;
        let languages = LanguageRecognizer::new(&self.languages, &self.enrichers).analyze(root, &files);
        info!(
            root = %root.display(),
            languages = languages.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Language detection finished"
        );
        Ok(languages)
    }

    fn detect_components_with(&self, settings: &DetectionSettings, ctx: &DetectionContext) -> Result<Vec<Component>> {
        self.component_recognizer().detect_components(settings, ctx)
    }

    fn detect_components_in_root_with(
        &self,
        settings: &DetectionSettings,
        ctx: &DetectionContext,
    ) -> Result<Vec<Component>> {
        self.component_recognizer().detect_components_in_root(settings, ctx)
    }

    fn select_devfiles_with(
        &self,
        root: &Path,
        devfiles: &[DevfileType],
        ctx: &DetectionContext,
    ) -> Result<Vec<usize>> {
        let settings = DetectionSettings::new(root);

        let in_root = self.detect_components_in_root_with(&settings, ctx)?;
        let indices = indices_for_components(&in_root, devfiles);
        if !indices.is_empty() {
            debug!(matches = indices.len(), "Matched devfiles from root components");
            return Ok(indices);
        }

        let components = self.detect_components_with(&settings, ctx)?;
        let indices = indices_for_components(&components, devfiles);
        if !indices.is_empty() {
            debug!(matches = indices.len(), "Matched devfiles from components");
            return Ok(indices);
        }

        info!(root = %root.display(), "No component matched, falling back to language analysis");
        let languages = self.detect_languages_with(root, ctx)?;
        let main = main_language(&languages)?;
        select_devfiles_by_language(main, devfiles)
            .map_err(|_| DetectionError::NoDevfileForPath(root.to_path_buf()))
    }
}

fn indices_for_components(components: &[Component], devfiles: &[DevfileType]) -> Vec<usize> {
    let mut indices: Vec<usize> = Vec::new();
    for component in components {
        let Some(language) = component.primary_language() else {
            continue;
        };
        if let Ok(selected) = select_devfiles_by_language(language, devfiles) {
            for index in selected {
                if !indices.contains(&index) {
                    indices.push(index);
                }
            }
        }
    }
    indices
}

fn first(indices: Vec<usize>, root: &Path) -> Result<usize> {
    indices
        .first()
        .copied()
        .ok_or_else(|| DetectionError::NoDevfileForPath(root.to_path_buf()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::MockFileSystem;

    fn service(fs: Arc<MockFileSystem>) -> DetectionService {
        let mut config = DetectorConfig::builtin();
        config.parallel_fallback = false;
        DetectionService::with_file_system(fs, config).unwrap()
    }

    fn catalog() -> Vec<DevfileType> {
        vec![
            DevfileType::new("nodejs", "JavaScript", "Node.js").with_tags(["NodeJS", "Express"]),
            DevfileType::new("python", "Python", "Python").with_tags(["Python", "pip"]),
            DevfileType::new("python-django", "Python", "Django").with_tags(["Python", "pip", "Django"]),
            DevfileType::new("go", "Go", "Go").with_tags(["Go"]),
            DevfileType::new("java-springboot", "Java", "springboot").with_tags(["Java", "Spring"]),
        ]
    }

    #[test]
    fn test_detect_languages() {
        let fs = Arc::new(MockFileSystem::new());
        fs.add_file("app.py", "print('hi')");
        let languages = service(fs).detect_languages(Path::new("/mock")).unwrap();
        assert_eq!(languages.len(), 1);
        assert_eq!(languages[0].name, "Python");
        assert_eq!(languages[0].weight, 100.0);
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let mut config = DetectorConfig::builtin();
        config.request_timeout_secs = 0;

        let err = DetectionService::with_file_system(Arc::new(MockFileSystem::new()), config).unwrap_err();
        assert!(matches!(err, DetectionError::Config(_)));
        assert!(err.to_string().contains("at least 1 second"));

        let mut config = DetectorConfig::builtin();
        config.registry_url = "ftp://registry.example".to_string();
        assert!(matches!(
            DetectionService::with_file_system(Arc::new(MockFileSystem::new()), config),
            Err(DetectionError::Config(_))
        ));
    }

    #[test]
    fn test_missing_root() {
        let service = service(Arc::new(MockFileSystem::new()));
        let result = service.detect_components(Path::new("/absent"));
        assert!(matches!(result, Err(DetectionError::RootNotFound(_))));
    }

    #[test]
    fn test_django_project_selects_django_devfile() {
        let fs = Arc::new(MockFileSystem::new());
        fs.add_file("requirements.txt", "Django==5.0\n");
        fs.add_file("manage.py", "");
        fs.add_file("shop/views.py", "");

        let service = service(fs);
        let indices = service
            .select_devfiles_from_types(Path::new("/mock"), &catalog())
            .unwrap();
        assert_eq!(indices, vec![2]);
        assert_eq!(
            service.select_devfile_from_types(Path::new("/mock"), &catalog()).unwrap(),
            2
        );
    }

    #[test]
    fn test_nested_components_are_used_when_root_has_none() {
        let fs = Arc::new(MockFileSystem::new());
        fs.add_file("api/go.mod", "module example.com/api\n");
        fs.add_file("api/main.go", "");
        fs.add_file("web/package.json", r#"{"dependencies": {"express": "4"}}"#);

        let indices = service(fs)
            .select_devfiles_from_types(Path::new("/mock"), &catalog())
            .unwrap();
        assert_eq!(indices, vec![3, 0]);
    }

    #[test]
    fn test_language_fallback_without_components() {
        let fs = Arc::new(MockFileSystem::new());
        fs.add_file("scripts/run.py", "");

        let indices = service(fs)
            .select_devfiles_from_types(Path::new("/mock"), &catalog())
            .unwrap();
        assert_eq!(indices, vec![1, 2]);
    }

    #[test]
    fn test_no_devfile_for_project() {
        let fs = Arc::new(MockFileSystem::new());
        fs.add_file("main.rs", "");
        fs.add_file("Cargo.toml", "[package]\nname = \"x\"\n");

        let err = service(fs)
            .select_devfiles_from_types(Path::new("/mock"), &catalog())
            .unwrap_err();
        assert_eq!(err.to_string(), "No valid devfile found for project in /mock");
        assert!(err.is_not_found());
    }

    #[test]
    fn test_empty_catalog() {
        let fs = Arc::new(MockFileSystem::new());
        fs.add_file("app.py", "");
        let err = service(fs)
            .select_devfiles_from_types(Path::new("/mock"), &[])
            .unwrap_err();
        assert!(err.to_string().contains("No valid devfile found"));
    }

    #[test]
    fn test_select_using_languages() {
        let service = service(Arc::new(MockFileSystem::new()));
        let languages = vec![Language::new("Go", 70.0), Language::new("Python", 30.0)];
        assert_eq!(
            service
                .select_devfiles_using_languages_from_types(&languages, &catalog())
                .unwrap(),
            vec![3, 1, 2]
        );
        assert_eq!(
            service
                .select_devfile_using_languages_from_types(&languages, &catalog())
                .unwrap(),
            3
        );
        assert_eq!(service.main_language(&languages).unwrap().name, "Go");
    }

    #[test]
    fn test_custom_enricher_takes_precedence() {
        struct Fixed(Arc<MockFileSystem>);

        impl Enricher for Fixed {
            fn supported_languages(&self) -> &'static [&'static str] {
                &["Python"]
            }

            fn file_system(&self) -> &dyn FileSystem {
                self.0.as_ref()
            }

            fn enrich_language(&self, language: &mut Language, _files: &[std::path::PathBuf]) {
                language.add_framework("Django");
            }
        }

        let fs = Arc::new(MockFileSystem::new());
        fs.add_file("app.py", "");
        let mut service = service(fs.clone());
        service.register_enricher(Arc::new(Fixed(fs)));

        let languages = service.detect_languages(Path::new("/mock")).unwrap();
        assert_eq!(languages[0].frameworks, vec!["Django"]);
    }
}
