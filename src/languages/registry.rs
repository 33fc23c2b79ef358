use super::definitions::default_definitions;
use super::LanguageDefinition;
use regex::Regex;
use std::collections::{BTreeSet, HashMap};
use tracing::warn;

/// A manifest file-name pattern and the languages it may indicate
#[derive(Debug, Clone)]
pub struct ConfigFilePattern {
    pub regex: Regex,
    pub languages: Vec<&'static str>,
}

/// Immutable lookup tables over a set of language definitions
#[derive(Debug, Clone)]
pub struct LanguageRegistry {
    languages: Vec<LanguageDefinition>,
    by_extension: HashMap<&'static str, Vec<usize>>,
    config_patterns: Vec<ConfigFilePattern>,
}

impl LanguageRegistry {
    pub fn new() -> Self {
        Self {
            languages: Vec::new(),
            by_extension: HashMap::new(),
            config_patterns: Vec::new(),
        }
    }

    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        for definition in default_definitions() {
            registry.register(definition);
        }
        registry
    }

    pub fn register(&mut self, language: LanguageDefinition) {
        let index = self.languages.len();

        for extension in language.extensions {
            self.by_extension.entry(*extension).or_default().push(index);
        }

        for pattern in language.configuration_files {
            if let Some(existing) = self
                .config_patterns
                .iter_mut()
                .find(|p| p.regex.as_str() == *pattern)
            {
                existing.languages.push(language.name);
                continue;
            }
            match Regex::new(pattern) {
                Ok(regex) => self.config_patterns.push(ConfigFilePattern {
                    regex,
                    languages: vec![language.name],
                }),
                Err(e) => {
                    warn!(language = language.name, pattern = %pattern, error = %e, "Skipping invalid configuration file pattern")
                }
            }
        }

        self.languages.push(language);
    }

    /// Get a language definition by name or alias
    pub fn get_language(&self, name: &str) -> Option<&LanguageDefinition> {
        self.languages
            .iter()
            .find(|l| l.name.eq_ignore_ascii_case(name))
            .or_else(|| self.languages.iter().find(|l| l.answers_to(name)))
    }

    /// Resolve a dialect to the language at the root of its group
    pub fn canonical<'a>(&'a self, language: &'a LanguageDefinition) -> &'a LanguageDefinition {
        let mut current = language;
        // Bounded so a cyclic group declaration cannot loop forever
        for _ in 0..self.languages.len() {
            match current.group.and_then(|g| self.get_language(g)) {
                Some(parent) if parent.name != current.name => current = parent,
                _ => break,
            }
        }
        current
    }

    /// All languages claiming an extension, in registration order
    pub fn languages_for_extension(&self, extension: &str) -> Vec<&LanguageDefinition> {
        self.by_extension
            .get(extension)
            .map(|indices| indices.iter().map(|&i| &self.languages[i]).collect())
            .unwrap_or_default()
    }

    /// Candidate languages for a manifest file name; empty when nothing matches
    pub fn languages_for_config_file(&self, file_name: &str) -> Vec<&'static str> {
        self.config_patterns
            .iter()
            .find(|p| p.regex.is_match(file_name))
            .map(|p| p.languages.clone())
            .unwrap_or_default()
    }

    pub fn config_patterns(&self) -> &[ConfigFilePattern] {
        &self.config_patterns
    }

    pub fn has_configuration_files(&self, name: &str) -> bool {
        self.get_language(name)
            .map(|l| !l.configuration_files.is_empty())
            .unwrap_or(false)
    }

    pub fn all_excluded_dirs(&self) -> Vec<String> {
        let mut set: BTreeSet<&str> = BTreeSet::new();
        for lang in &self.languages {
            set.extend(lang.exclude_folders.iter().copied());
        }
        set.insert(".git");
        set.into_iter().map(String::from).collect()
    }

    /// Get all registered language names
    pub fn language_names(&self) -> Vec<&str> {
        self.languages.iter().map(|l| l.name).collect()
    }
}

impl Default for LanguageRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::languages::LanguageKind;

    #[test]
    fn test_registry_creation() {
        let registry = LanguageRegistry::new();
        assert!(registry.language_names().is_empty());
    }

    #[test]
    fn test_registry_with_defaults() {
        let registry = LanguageRegistry::with_defaults();
        let names = registry.language_names();
        assert!(names.contains(&"Rust"));
        assert!(names.contains(&"Python"));
    }

    #[test]
    fn test_get_language_case_insensitive() {
        let registry = LanguageRegistry::with_defaults();
        assert_eq!(registry.get_language("python").unwrap().name, "Python");
        assert_eq!(registry.get_language("golang").unwrap().name, "Go");
        assert!(registry.get_language("cobol").is_none());
    }

    #[test]
    fn test_canonical_resolves_group() {
        let registry = LanguageRegistry::with_defaults();
        let tsx = registry.get_language("TSX").unwrap();
        assert_eq!(registry.canonical(tsx).name, "TypeScript");

        let go = registry.get_language("Go").unwrap();
        assert_eq!(registry.canonical(go).name, "Go");
    }

    #[test]
    fn test_extension_lookup_is_case_sensitive() {
        let registry = LanguageRegistry::with_defaults();
        let py: Vec<_> = registry.languages_for_extension(".py").iter().map(|l| l.name).collect();
        assert_eq!(py, vec!["Python"]);
        assert!(registry.languages_for_extension(".PY").is_empty());
    }

    #[test]
    fn test_config_file_lookup() {
        let registry = LanguageRegistry::with_defaults();
        assert_eq!(registry.languages_for_config_file("pom.xml"), vec!["Java"]);
        assert_eq!(registry.languages_for_config_file("build.gradle"), vec!["Java", "Kotlin"]);
        assert_eq!(
            registry.languages_for_config_file("package.json"),
            vec!["JavaScript", "TypeScript"]
        );
        assert_eq!(registry.languages_for_config_file("web.csproj"), vec!["C#"]);
        assert!(registry.languages_for_config_file("README.md").is_empty());
    }

    #[test]
    fn test_fixture_registry() {
        let mut registry = LanguageRegistry::new();
        registry.register(LanguageDefinition {
            name: "Zig",
            kind: LanguageKind::Programming,
            group: None,
            aliases: &[],
            extensions: &[".zig"],
            configuration_files: &[r"^build\.zig$", r"(unclosed"],
            exclude_folders: &["zig-cache"],
            can_be_component: true,
            can_be_container_component: false,
        });

        assert_eq!(registry.languages_for_config_file("build.zig"), vec!["Zig"]);
        assert_eq!(registry.config_patterns().len(), 1);
        assert_eq!(registry.all_excluded_dirs(), vec![".git", "zig-cache"]);
    }

    #[test]
    fn test_has_configuration_files() {
        let registry = LanguageRegistry::with_defaults();
        assert!(registry.has_configuration_files("Java"));
        assert!(!registry.has_configuration_files("C++"));
        assert!(!registry.has_configuration_files("unknown"));
    }
}
