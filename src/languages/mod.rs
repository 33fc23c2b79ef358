//! Language definitions and the registry used for extension and manifest lookups

mod definitions;
mod registry;

pub use registry::{ConfigFilePattern, LanguageRegistry};

/// Broad category of a language entry. Only programming languages take part in weighting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LanguageKind {
    Programming,
    Markup,
    Data,
    Prose,
}

/// Static description of one language
#[derive(Debug, Clone)]
pub struct LanguageDefinition {
    pub name: &'static str,
    pub kind: LanguageKind,
    /// Canonical parent for dialects (e.g. TSX belongs to TypeScript)
    pub group: Option<&'static str>,
    pub aliases: &'static [&'static str],
    /// Extensions including the leading dot, matched case-sensitively
    pub extensions: &'static [&'static str],
    /// Anchored regular expressions matched against file names
    pub configuration_files: &'static [&'static str],
    pub exclude_folders: &'static [&'static str],
    pub can_be_component: bool,
    pub can_be_container_component: bool,
}

impl LanguageDefinition {
    pub fn is_programming(&self) -> bool {
        self.kind == LanguageKind::Programming
    }

    /// True when `name` equals the language name or one of its aliases, ignoring case
    pub fn answers_to(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name) || self.aliases.iter().any(|a| a.eq_ignore_ascii_case(name))
    }
}
