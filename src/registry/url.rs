use super::RegistryError;
use regex::Regex;
use semver::Version;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use tracing::warn;

/// Lowest schema version a registry filter may ask for
pub const MINIMUM_ALLOWED_VERSION: &str = "2.0.0";

const INDEX_PATH: &str = "v2index";

/// Schema-version bounds forwarded to the registry index
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DevfileFilter {
    pub min_schema_version: Option<String>,
    pub max_schema_version: Option<String>,
}

impl DevfileFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_min(mut self, version: impl Into<String>) -> Self {
        self.min_schema_version = Some(version.into());
        self
    }

    pub fn with_max(mut self, version: impl Into<String>) -> Self {
        self.max_schema_version = Some(version.into());
        self
    }

    fn min(&self) -> Option<&str> {
        self.min_schema_version.as_deref().filter(|v| !v.is_empty())
    }

    fn max(&self) -> Option<&str> {
        self.max_schema_version.as_deref().filter(|v| !v.is_empty())
    }
}

struct RawRewrite {
    pattern: Regex,
    replacement: &'static str,
}

fn raw_rewrites() -> &'static [RawRewrite] {
    static REWRITES: OnceLock<Vec<RawRewrite>> = OnceLock::new();
    REWRITES.get_or_init(|| {
        [
            (
                r"^https://github\.com/([^/]+/[^/]+)/blob/(.*)$",
                "https://raw.githubusercontent.com/$1/$2",
            ),
            (
                r"^https://gitlab\.com/(.+?)/-/blob/(.*)$",
                "https://gitlab.com/$1/-/raw/$2",
            ),
            (
                r"^https://bitbucket\.org/([^/]+/[^/]+)/src/(.*)$",
                "https://bitbucket.org/$1/raw/$2",
            ),
        ]
        .into_iter()
        .map(|(pattern, replacement)| RawRewrite {
            pattern: Regex::new(pattern).expect("valid regex"),
            replacement,
        })
        .collect()
    })
}

/// Rewrites GitHub, GitLab and Bitbucket browse URLs to their raw-content form
pub fn adapt_url(url: &str) -> String {
    raw_rewrites().iter().fold(url.to_string(), |url, rewrite| {
        rewrite.pattern.replace(&url, rewrite.replacement).into_owned()
    })
}

pub fn append_index_path(url: &str) -> String {
    if url.ends_with('/') {
        format!("{}{}", url, INDEX_PATH)
    } else {
        format!("{}/{}", url, INDEX_PATH)
    }
}

/// Parses `2`, `2.2` or `v2.2.1` style versions, padding missing parts with zero
fn parse_version(raw: &str) -> Option<Version> {
    let trimmed = raw.trim().trim_start_matches('v');
    let padded = match trimmed.matches('.').count() {
        0 => format!("{}.0.0", trimmed),
        1 => format!("{}.0", trimmed),
        _ => trimmed.to_string(),
    };
    Version::parse(&padded).ok()
}

fn minimum_allowed() -> Version {
    Version::new(2, 0, 0)
}

/// Appends the schema-version query to an index URL.
///
/// A bound that does not parse as a version leaves the URL untouched.
pub fn url_with_versions(url: &str, filter: &DevfileFilter) -> Result<String, RegistryError> {
    let floor = minimum_allowed();

    match (filter.min(), filter.max()) {
        (Some(min), Some(max)) => {
            let (Some(min_v), Some(max_v)) = (parse_version(min), parse_version(max)) else {
                warn!(min, max, "Ignoring malformed schema version bounds");
                return Ok(url.to_string());
            };
            if max_v < min_v {
                return Err(RegistryError::InvalidVersionRange(
                    "max-schema-version cannot be lower than min-schema-version".into(),
                ));
            }
            if max_v < floor || min_v < floor {
                return Err(RegistryError::InvalidVersionRange(format!(
                    "min and/or max version are lower than the minimum allowed version ({})",
                    MINIMUM_ALLOWED_VERSION
                )));
            }
            Ok(format!("{}?minSchemaVersion={}&maxSchemaVersion={}", url, min, max))
        }
        (Some(min), None) => {
            let Some(min_v) = parse_version(min) else {
                warn!(min, "Ignoring malformed schema version bound");
                return Ok(url.to_string());
            };
            if min_v < floor {
                return Err(RegistryError::InvalidVersionRange(format!(
                    "min version is lower than the minimum allowed version ({})",
                    MINIMUM_ALLOWED_VERSION
                )));
            }
            Ok(format!("{}?minSchemaVersion={}", url, min))
        }
        (None, Some(max)) => {
            let Some(max_v) = parse_version(max) else {
                warn!(max, "Ignoring malformed schema version bound");
                return Ok(url.to_string());
            };
            if max_v < floor {
                return Err(RegistryError::InvalidVersionRange(format!(
                    "max version is lower than the minimum allowed version ({})",
                    MINIMUM_ALLOWED_VERSION
                )));
            }
            Ok(format!("{}?maxSchemaVersion={}", url, max))
        }
        (None, None) => Ok(url.to_string()),
    }
}

/// Full index URL for a registry base URL and filter
pub fn index_url(registry_url: &str, filter: &DevfileFilter) -> Result<String, RegistryError> {
    url_with_versions(&append_index_path(&adapt_url(registry_url)), filter)
}
