//! Java and Kotlin enrichment (Maven, Gradle, Ant)

use super::{find_file, has_file, ports_in_sources, read_file, Enricher};
use crate::detection::Language;
use crate::fs::FileSystem;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};
use tracing::debug;

const GRADLE_FILES: &[&str] = &["build.gradle", "build.gradle.kts"];

/// Group-id prefixes that identify a framework
const FRAMEWORK_MARKERS: &[(&str, &str)] = &[
    ("io.quarkus", "Quarkus"),
    ("org.springframework", "Spring"),
    ("io.micronaut", "Micronaut"),
    ("io.vertx", "Vert.x"),
    ("io.openliberty", "OpenLiberty"),
    ("org.jboss.eap", "JBoss EAP"),
    ("org.wildfly", "WildFly"),
];

pub struct JavaEnricher {
    fs: Arc<dyn FileSystem>,
}

impl JavaEnricher {
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self { fs }
    }

    fn frameworks_in(content: &str) -> impl Iterator<Item = &'static str> + '_ {
        FRAMEWORK_MARKERS
            .iter()
            .filter(move |(marker, _)| content.contains(marker))
            .map(|(_, name)| *name)
    }
}

/// Group ids of dependencies and plugins declared in a pom
fn pom_group_ids(content: &str) -> Vec<String> {
    let Ok(doc) = roxmltree::Document::parse(content) else {
        return Vec::new();
    };
    doc.descendants()
        .filter(|n| n.has_tag_name("groupId"))
        .filter_map(|n| n.text())
        .map(|t| t.trim().to_string())
        .collect()
}

fn pom_child_text(content: &str, tag: &str) -> Option<String> {
    let doc = roxmltree::Document::parse(content).ok()?;
    doc.root_element()
        .children()
        .find(|n| n.has_tag_name(tag))
        .and_then(|n| n.text())
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
}

/// A pom listing `<modules>` aggregates other projects
fn is_aggregator_pom(content: &str) -> bool {
    let Ok(doc) = roxmltree::Document::parse(content) else {
        return false;
    };
    doc.root_element()
        .children()
        .filter(|n| n.has_tag_name("modules"))
        .any(|modules| modules.children().any(|m| m.is_element()))
}

fn root_project_name_regex() -> &'static Regex {
    static NAME: OnceLock<Regex> = OnceLock::new();
    NAME.get_or_init(|| {
        Regex::new(r#"rootProject\.name\s*=\s*['"]([^'"]+)['"]"#).expect("valid regex")
    })
}

fn server_port_regex() -> &'static Regex {
    static PORT: OnceLock<Regex> = OnceLock::new();
    PORT.get_or_init(|| {
        Regex::new(r"(?m)^\s*(?:server\.port|quarkus\.http\.port|micronaut\.server\.port)\s*[=:]\s*(\d+)")
            .expect("valid regex")
    })
}

impl Enricher for JavaEnricher {
    fn supported_languages(&self) -> &'static [&'static str] {
        &["Java", "Kotlin"]
    }

    fn file_system(&self) -> &dyn FileSystem {
        self.fs.as_ref()
    }

    fn enrich_language(&self, language: &mut Language, files: &[PathBuf]) {
        if let Some(pom) = find_file(files, &["pom.xml"]) {
            language.add_tool("Maven");
            if let Some(content) = read_file(self.fs.as_ref(), pom) {
                let groups = pom_group_ids(&content).join("\n");
                for framework in Self::frameworks_in(&groups) {
                    language.add_framework(framework);
                }
            }
        }

        if let Some(gradle) = find_file(files, GRADLE_FILES) {
            language.add_tool("Gradle");
            if let Some(content) = read_file(self.fs.as_ref(), gradle) {
                for framework in Self::frameworks_in(&content) {
                    language.add_framework(framework);
                }
            }
        }

        if has_file(files, "build.xml") {
            language.add_tool("Ant");
        }

        debug!(
            language = %language.name,
            frameworks = ?language.frameworks,
            tools = ?language.tools,
            "Enriched JVM language"
        );
    }

    fn project_name(&self, dir: &Path) -> Option<String> {
        let pom = dir.join("pom.xml");
        if self.fs.is_file(&pom) {
            return read_file(self.fs.as_ref(), &pom).and_then(|c| pom_child_text(&c, "artifactId"));
        }

        ["settings.gradle", "settings.gradle.kts"]
            .iter()
            .map(|n| dir.join(n))
            .filter(|p| self.fs.is_file(p))
            .filter_map(|p| read_file(self.fs.as_ref(), &p))
            .find_map(|c| {
                root_project_name_regex()
                    .captures(&c)
                    .and_then(|cap| cap.get(1))
                    .map(|m| m.as_str().to_string())
            })
    }

    fn source_ports(&self, _dir: &Path, files: &[PathBuf]) -> Vec<u16> {
        let config: Vec<PathBuf> = files
            .iter()
            .filter(|f| {
                f.file_name()
                    .and_then(|n| n.to_str())
                    .map(|n| n.starts_with("application"))
                    .unwrap_or(false)
            })
            .cloned()
            .collect();
        ports_in_sources(
            self.fs.as_ref(),
            &config,
            &["properties", "yml", "yaml"],
            server_port_regex(),
        )
    }

    fn is_config_valid_for_component_detection(&self, _language: &str, file: &Path) -> bool {
        let is_pom = file.file_name().and_then(|n| n.to_str()) == Some("pom.xml");
        if !is_pom {
            return true;
        }
        match read_file(self.fs.as_ref(), file) {
            Some(content) => !is_aggregator_pom(&content),
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::MockFileSystem;

    const QUARKUS_POM: &str = r#"<?xml version="1.0"?>
<project xmlns="http://maven.apache.org/POM/4.0.0">
  <modelVersion>4.0.0</modelVersion>
  <groupId>org.acme</groupId>
  <artifactId>code-with-quarkus</artifactId>
  <dependencies>
    <dependency>
      <groupId>io.quarkus</groupId>
      <artifactId>quarkus-resteasy</artifactId>
    </dependency>
  </dependencies>
</project>"#;

    const PARENT_POM: &str = r#"<project>
  <artifactId>parent</artifactId>
  <modules>
    <module>api</module>
  </modules>
</project>"#;

    fn java() -> Language {
        Language {
            name: "Java".into(),
            aliases: vec![],
            weight: 100.0,
            frameworks: vec![],
            tools: vec![],
            can_be_component: true,
            can_be_container_component: false,
        }
    }

    #[test]
    fn test_maven_quarkus() {
        let fs = Arc::new(MockFileSystem::new());
        fs.add_file("pom.xml", QUARKUS_POM);
        let enricher = JavaEnricher::new(fs.clone());

        let mut lang = java();
        enricher.enrich_language(&mut lang, &[PathBuf::from("/mock/pom.xml")]);

        assert_eq!(lang.tools, vec!["Maven"]);
        assert_eq!(lang.frameworks, vec!["Quarkus"]);
        assert_eq!(
            enricher.project_name(Path::new("/mock")),
            Some("code-with-quarkus".to_string())
        );
    }

    #[test]
    fn test_gradle_spring() {
        let fs = Arc::new(MockFileSystem::new());
        fs.add_file(
            "build.gradle",
            "plugins { id 'org.springframework.boot' version '3.2.0' }",
        );
        fs.add_file("settings.gradle", "rootProject.name = 'demo'");
        let enricher = JavaEnricher::new(fs.clone());

        let mut lang = java();
        enricher.enrich_language(&mut lang, &[PathBuf::from("/mock/build.gradle")]);

        assert_eq!(lang.tools, vec!["Gradle"]);
        assert_eq!(lang.frameworks, vec!["Spring"]);
        assert_eq!(enricher.project_name(Path::new("/mock")), Some("demo".to_string()));
    }

    #[test]
    fn test_aggregator_pom_is_not_a_component() {
        let fs = Arc::new(MockFileSystem::new());
        fs.add_file("pom.xml", PARENT_POM);
        fs.add_file("api/pom.xml", QUARKUS_POM);
        let enricher = JavaEnricher::new(fs.clone());

        assert!(!enricher.is_config_valid_for_component_detection("Java", Path::new("/mock/pom.xml")));
        assert!(enricher.is_config_valid_for_component_detection("Java", Path::new("/mock/api/pom.xml")));
        assert!(enricher.is_config_valid_for_component_detection("Java", Path::new("/mock/build.gradle")));
    }

    #[test]
    fn test_source_ports_from_application_properties() {
        let fs = Arc::new(MockFileSystem::new());
        let props = "/mock/src/main/resources/application.properties";
        fs.add_file(props, "quarkus.http.port=8081\n");
        let enricher = JavaEnricher::new(fs.clone());

        let ports = enricher.source_ports(Path::new("/mock"), &[PathBuf::from(props)]);
        assert_eq!(ports, vec![8081]);
    }
}
