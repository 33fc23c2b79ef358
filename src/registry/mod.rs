//! Devfile registry access
//!
//! Fetches the registry index (`{url}/v2index`) and decodes it into
//! [`DevfileType`] entries. Browse URLs of the common git hosts are rewritten to
//! raw-content URLs and an optional schema-version range is forwarded as query
//! parameters.

mod client;
mod url;

pub use client::{DevfileType, DevfileVersion, RegistryClient, DEFAULT_TIMEOUT_SECS};
pub use url::{adapt_url, append_index_path, index_url, url_with_versions, DevfileFilter, MINIMUM_ALLOWED_VERSION};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("{0}")]
    InvalidVersionRange(String),

    #[error("unable to fetch devfiles from the registry")]
    FetchFailed,

    #[error("Registry request timed out after {seconds} seconds")]
    Timeout { seconds: u64 },

    #[error("Registry request failed: {message}")]
    Network { message: String },

    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(String),

    #[error("Registry request was cancelled")]
    Cancelled,
}
