//! Scoring of registry devfiles against detected languages
//!
//! Every catalog entry whose language matches scores one point. A framework
//! named by the project type or a tag adds [`FRAMEWORK_WEIGHT`], a known tool
//! named by a tag adds [`TOOL_WEIGHT`]. When any entry matched a framework, the
//! best entry per framework is returned; otherwise every entry sharing the
//! highest plain score is.

use super::types::Language;
use crate::error::{DetectionError, Result};
use crate::registry::DevfileType;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

pub const FRAMEWORK_WEIGHT: u32 = 5;
pub const TOOL_WEIGHT: u32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DevfileScore {
    pub devfile_index: usize,
    pub score: u32,
}

/// Lowercased with spaces and dots removed, so `Next.js` equals `nextjs`
fn normalize(value: &str) -> String {
    value
        .chars()
        .filter(|c| *c != ' ' && *c != '.')
        .flat_map(char::to_lowercase)
        .collect()
}

fn matching_framework<'a>(frameworks: &'a [String], value: &str) -> Option<&'a str> {
    let wanted = normalize(value);
    if wanted.is_empty() {
        return None;
    }
    frameworks
        .iter()
        .find(|f| normalize(f) == wanted)
        .map(String::as_str)
}

fn is_known(values: &[String], value: &str) -> bool {
    values.iter().any(|v| v.eq_ignore_ascii_case(value))
}

/// Score of one catalog entry and the frameworks it matched, or `None` for another language
pub fn score_devfile<'a>(language: &'a Language, devfile: &DevfileType) -> Option<(u32, Vec<&'a str>)> {
    if devfile.language.is_empty() || !language.answers_to(&devfile.language) {
        return None;
    }

    let mut score = 1;
    let mut frameworks: Vec<&'a str> = Vec::new();
    let mut record = |framework: &'a str| {
        if !frameworks.contains(&framework) {
            frameworks.push(framework);
        }
    };

    if let Some(framework) = matching_framework(&language.frameworks, &devfile.project_type) {
        record(framework);
        score += FRAMEWORK_WEIGHT;
    }
    for tag in &devfile.tags {
        if let Some(framework) = matching_framework(&language.frameworks, tag) {
            record(framework);
            score += FRAMEWORK_WEIGHT;
        }
        if is_known(&language.tools, tag) {
            score += TOOL_WEIGHT;
        }
    }

    Some((score, frameworks))
}

/// Catalog indices that fit `language` best
pub fn select_devfiles_by_language(language: &Language, devfiles: &[DevfileType]) -> Result<Vec<usize>> {
    let mut best_by_framework: HashMap<&str, DevfileScore> = HashMap::new();
    let mut best_plain: Vec<usize> = Vec::new();
    let mut target = 0;

    for (index, devfile) in devfiles.iter().enumerate() {
        let Some((score, frameworks)) = score_devfile(language, devfile) else {
            continue;
        };

        for framework in frameworks {
            let current = best_by_framework.get(framework).map(|s| s.score).unwrap_or(0);
            if score > current {
                best_by_framework.insert(
                    framework,
                    DevfileScore {
                        devfile_index: index,
                        score,
                    },
                );
            }
        }

        if score > target {
            target = score;
            best_plain = vec![index];
        } else if score == target {
            best_plain.push(index);
        }
    }

    let selected = if best_by_framework.is_empty() {
        best_plain
    } else {
        let mut indices: Vec<usize> = Vec::new();
        for framework in &language.frameworks {
            if let Some(best) = best_by_framework.get(framework.as_str()) {
                if !indices.contains(&best.devfile_index) {
                    indices.push(best.devfile_index);
                }
            }
        }
        indices
    };

    if selected.is_empty() {
        return Err(DetectionError::NoDevfileForLanguage(language.name.clone()));
    }
    debug!(language = %language.name, devfiles = ?selected, "Selected devfiles");
    Ok(selected)
}

/// Union of the per-language selections, first occurrence wins the position
pub fn select_devfiles_by_languages(languages: &[Language], devfiles: &[DevfileType]) -> Result<Vec<usize>> {
    let mut selected: Vec<usize> = Vec::new();
    for language in languages {
        match select_devfiles_by_language(language, devfiles) {
            Ok(indices) => {
                for index in indices {
                    if !selected.contains(&index) {
                        selected.push(index);
                    }
                }
            }
            Err(e) => debug!(language = %language.name, error = %e, "No devfile for language"),
        }
    }

    if selected.is_empty() {
        return Err(DetectionError::NoDevfileForLanguages);
    }
    Ok(selected)
}

/// Highest-weighted language; the first one wins a tie
pub fn main_language(languages: &[Language]) -> Result<&Language> {
    let mut iter = languages.iter();
    let mut main = iter.next().ok_or(DetectionError::NoLanguage)?;
    for language in iter {
        if language.weight > main.weight {
            main = language;
        }
    }
    Ok(main)
}
