//! devscout - source tree analysis for devfile selection
//!
//! This library inspects a project directory and reports which programming
//! languages it uses, which directories are independently deployable
//! components, and which devfiles from a devfile registry fit it best.
//!
//! # Core Concepts
//!
//! - **Language**: a programming language weighted by its share of the source
//!   files, enriched with detected frameworks and build tools
//! - **Component**: a directory holding one deployable unit, found through
//!   manifests such as `package.json` or `pom.xml`
//! - **Devfile**: a registry entry describing how to build and run a stack,
//!   scored against the detected languages
//!
//! # Example Usage
//!
//! ```no_run
//! use devscout::{DetectionService, DetectorConfig};
//! use std::path::Path;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! devscout::init_from_env();
//!
//! let service = DetectionService::new(DetectorConfig::default())?;
//! for language in service.detect_languages(Path::new("."))? {
//!     println!("{}", language);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Project Structure
//!
//! - [`detection`]: indexing, language and component recognition, devfile matching
//! - [`languages`]: the language table and configuration-file patterns
//! - [`enrichers`]: per-language framework, tool, name and port detection
//! - [`registry`]: devfile registry client
//! - [`fs`]: filesystem abstraction with a real and an in-memory implementation

pub mod config;
pub mod detection;
pub mod enrichers;
pub mod error;
pub mod fs;
pub mod languages;
pub mod registry;
pub mod util;

pub use config::{ConfigError, DetectorConfig};
pub use detection::{
    Component, DetectionContext, DetectionService, DetectionSettings, Language, PortDetectionStrategy,
};
pub use error::{DetectionError, Result};
pub use languages::{LanguageDefinition, LanguageKind, LanguageRegistry};
pub use registry::{DevfileFilter, DevfileType, RegistryClient, RegistryError};
pub use util::{init_default, init_from_env, init_logging, LoggingConfig};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_exists() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_name_is_devscout() {
        assert_eq!(NAME, "devscout");
    }
}
