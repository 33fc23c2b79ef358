//! Language, component and devfile detection
//!
//! The pipeline indexes a source tree once per [`DetectionContext`], weights
//! languages by file extension, splits the tree into [`Component`]s and scores
//! registry devfiles against what was found. [`DetectionService`] is the
//! entry point that wires these pieces together.

pub mod component;
pub mod context;
pub mod devfile;
pub mod extensions;
pub mod indexer;
pub mod language;
pub mod service;
pub mod types;

pub use component::{collapse_to_maximal, ComponentRecognizer};
pub use context::DetectionContext;
pub use devfile::{
    main_language, score_devfile, select_devfiles_by_language, select_devfiles_by_languages, DevfileScore,
    FRAMEWORK_WEIGHT, TOOL_WEIGHT,
};
pub use indexer::FileIndexer;
pub use language::LanguageRecognizer;
pub use service::DetectionService;
pub use types::{default_project_name, Component, DetectionSettings, Language, PortDetectionStrategy};
