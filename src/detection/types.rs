use crate::languages::LanguageDefinition;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// A detected language with its share of the analyzed sources
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Language {
    pub name: String,
    pub aliases: Vec<String>,
    /// Share of programming-language points, 0..=100
    pub weight: f64,
    pub frameworks: Vec<String>,
    pub tools: Vec<String>,
    pub can_be_component: bool,
    pub can_be_container_component: bool,
}

impl Language {
    pub fn new(name: impl Into<String>, weight: f64) -> Self {
        Self {
            name: name.into(),
            aliases: Vec::new(),
            weight,
            frameworks: Vec::new(),
            tools: Vec::new(),
            can_be_component: true,
            can_be_container_component: false,
        }
    }

    pub fn with_aliases<I, S>(mut self, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.aliases = aliases.into_iter().map(Into::into).collect();
        self
    }

    pub(crate) fn from_definition(definition: &LanguageDefinition, weight: f64) -> Self {
        Self {
            name: definition.name.to_string(),
            aliases: definition.aliases.iter().map(|a| a.to_string()).collect(),
            weight,
            frameworks: Vec::new(),
            tools: Vec::new(),
            can_be_component: definition.can_be_component,
            can_be_container_component: definition.can_be_container_component,
        }
    }

    pub fn with_frameworks<I, S>(mut self, frameworks: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.frameworks = frameworks.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_tools<I, S>(mut self, tools: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tools = tools.into_iter().map(Into::into).collect();
        self
    }

    pub fn add_framework(&mut self, framework: &str) {
        if !self.frameworks.iter().any(|f| f == framework) {
            self.frameworks.push(framework.to_string());
        }
    }

    pub fn add_tool(&mut self, tool: &str) {
        if !self.tools.iter().any(|t| t == tool) {
            self.tools.push(tool.to_string());
        }
    }

    /// Case-insensitive comparison against the name and the aliases
    pub fn answers_to(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name) || self.aliases.iter().any(|a| a.eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({:.0}%)", self.name, self.weight)?;
        if !self.frameworks.is_empty() {
            write!(f, " frameworks: {}", self.frameworks.join(", "))?;
        }
        if !self.tools.is_empty() {
            write!(f, " tools: {}", self.tools.join(", "))?;
        }
        Ok(())
    }
}

/// A directory holding one deployable unit
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Component {
    pub name: String,
    pub path: PathBuf,
    /// Never empty once returned; the first entry is the primary language
    pub languages: Vec<Language>,
    pub ports: Vec<u16>,
}

impl Component {
    pub fn new(path: PathBuf, languages: Vec<Language>) -> Self {
        Self {
            name: default_project_name(&path),
            path,
            languages,
            ports: Vec::new(),
        }
    }

    pub fn primary_language(&self) -> Option<&Language> {
        self.languages.first()
    }
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {}", self.name, self.path.display())?;
        if let Some(lang) = self.primary_language() {
            write!(f, " [{}]", lang)?;
        }
        if !self.ports.is_empty() {
            let ports: Vec<String> = self.ports.iter().map(|p| p.to_string()).collect();
            write!(f, " ports: {}", ports.join(", "))?;
        }
        Ok(())
    }
}

/// Base name of a directory, used when no manifest provides a project name
pub fn default_project_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default()
}

/// Where component ports are looked up
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum PortDetectionStrategy {
    DockerFile,
    Compose,
    Source,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DetectionSettings {
    pub base_path: PathBuf,
    /// Strategies are tried in order; the first one yielding ports wins
    pub port_detection_strategy: Vec<PortDetectionStrategy>,
}

impl DetectionSettings {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
            port_detection_strategy: vec![
                PortDetectionStrategy::DockerFile,
                PortDetectionStrategy::Compose,
                PortDetectionStrategy::Source,
            ],
        }
    }

    pub fn with_strategies(mut self, strategies: Vec<PortDetectionStrategy>) -> Self {
        self.port_detection_strategy = strategies;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn python() -> Language {
        Language {
            name: "Python".to_string(),
            aliases: vec!["py".to_string()],
            weight: 100.0,
            frameworks: Vec::new(),
            tools: Vec::new(),
            can_be_component: true,
            can_be_container_component: false,
        }
    }

    #[test]
    fn test_add_framework_deduplicates() {
        let mut lang = python();
        lang.add_framework("Django");
        lang.add_framework("Django");
        lang.add_tool("pip");
        assert_eq!(lang.frameworks, vec!["Django"]);
        assert_eq!(lang.tools, vec!["pip"]);
    }

    #[test]
    fn test_answers_to() {
        let lang = python();
        assert!(lang.answers_to("PYTHON"));
        assert!(lang.answers_to("Py"));
        assert!(!lang.answers_to("ruby"));
    }

    #[test]
    fn test_component_defaults() {
        let component = Component::new(PathBuf::from("/repo/svc-a"), vec![python()]);
        assert_eq!(component.name, "svc-a");
        assert_eq!(component.primary_language().unwrap().name, "Python");
        assert!(component.ports.is_empty());
        assert!(component.to_string().contains("svc-a at /repo/svc-a"));
    }

    #[test]
    fn test_settings_default_strategy_order() {
        let settings = DetectionSettings::new("/repo");
        assert_eq!(
            settings.port_detection_strategy,
            vec![
                PortDetectionStrategy::DockerFile,
                PortDetectionStrategy::Compose,
                PortDetectionStrategy::Source
            ]
        );
    }

    #[test]
    fn test_language_display() {
        let lang = python().with_frameworks(["Flask"]);
        assert_eq!(lang.to_string(), "Python (100%) frameworks: Flask");
    }
}
