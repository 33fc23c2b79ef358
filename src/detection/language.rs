use super::extensions::group_by_extension;
use super::types::Language;
use crate::enrichers::EnricherRegistry;
use crate::languages::LanguageRegistry;
use std::cmp::Ordering;
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

/// Languages at or below this weight are treated as noise
pub const NOISE_FLOOR: f64 = 2.0;

/// Scores languages from file extensions and enriches the survivors
pub struct LanguageRecognizer<'a> {
    languages: &'a LanguageRegistry,
    enrichers: &'a EnricherRegistry,
}

impl<'a> LanguageRecognizer<'a> {
    pub fn new(languages: &'a LanguageRegistry, enrichers: &'a EnricherRegistry) -> Self {
        Self { languages, enrichers }
    }

    /// Weighted languages for `files` below `root`, heaviest first.
    ///
    /// Equal weights keep the order in which the languages were first seen.
    pub fn analyze(&self, root: &Path, files: &[PathBuf]) -> Vec<Language> {
        let extensions = group_by_extension(root, files);

        let mut totals: Vec<(&'static str, u64)> = Vec::new();
        let mut programming_points: u64 = 0;

        for (extension, points) in extensions.iter() {
            let mut credited: Vec<&'static str> = Vec::new();
            for candidate in self.languages.languages_for_extension(extension) {
                if !candidate.is_programming() {
                    continue;
                }
                let canonical = self.languages.canonical(candidate);
                if credited.contains(&canonical.name) {
                    continue;
                }
                credited.push(canonical.name);

                match totals.iter_mut().find(|(name, _)| *name == canonical.name) {
                    Some((_, total)) => *total += points,
                    None => totals.push((canonical.name, points)),
                }
            }
            if !credited.is_empty() {
                programming_points += points;
            }
            trace!(extension, points, languages = ?credited, "Scored extension");
        }

        if programming_points == 0 {
            debug!(root = %root.display(), "No programming language files found");
            return Vec::new();
        }

        let mut detected = Vec::new();
        for (name, total) in totals {
            let weight = (total as f64 / programming_points as f64 * 100.0).round();
            if weight <= NOISE_FLOOR {
                trace!(language = name, weight, "Dropping language below noise floor");
                continue;
            }
            let Some(definition) = self.languages.get_language(name) else {
                continue;
            };
            let mut language = Language::from_definition(definition, weight);
            self.enrichers.enrich_language(&mut language, files);
            detected.push(language);
        }

        detected.sort_by(|a, b| b.weight.partial_cmp(&a.weight).unwrap_or(Ordering::Equal));
        debug!(
            root = %root.display(),
            languages = ?detected.iter().map(|l| l.name.as_str()).collect::<Vec<_>>(),
            "Detected languages"
        );
        detected
    }

    /// Builds a language straight from one file, bypassing weighting
    pub fn analyze_file(&self, file: &Path, language: &str) -> Option<Language> {
        let definition = self.languages.get_language(language)?;
        let mut detected = Language::from_definition(definition, 100.0);
        self.enrichers.enrich_language(&mut detected, &[file.to_path_buf()]);
        Some(detected)
    }
}
