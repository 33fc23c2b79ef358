use super::url::{index_url, DevfileFilter};
use super::RegistryError;
use crate::detection::DetectionContext;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

/// Default request timeout for registry calls
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// One stack published by a devfile registry
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DevfileType {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub language: String,
    #[serde(default)]
    pub project_type: String,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Informational; scoring reads tools from `tags` only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool: Option<String>,
    #[serde(default)]
    pub versions: Vec<DevfileVersion>,
}

impl DevfileType {
    pub fn new(name: impl Into<String>, language: impl Into<String>, project_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            language: language.into(),
            project_type: project_type.into(),
            ..Self::default()
        }
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_tool(mut self, tool: impl Into<String>) -> Self {
        self.tool = Some(tool.into());
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DevfileVersion {
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub schema_version: String,
    #[serde(default)]
    pub default: bool,
}

/// HTTP client for a devfile registry index.
///
/// Safe to share behind an `Arc`; the underlying `reqwest::Client` pools connections.
#[derive(Clone)]
pub struct RegistryClient {
    http_client: Client,
    timeout: Duration,
}

impl RegistryClient {
    pub fn new() -> Result<Self, RegistryError> {
        Self::with_timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self, RegistryError> {
        let http_client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RegistryError::ClientBuild(e.to_string()))?;

        Ok(Self { http_client, timeout })
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Downloads the registry index, giving up early when `ctx` is cancelled
    pub async fn fetch_devfile_types(
        &self,
        registry_url: &str,
        filter: &DevfileFilter,
        ctx: &DetectionContext,
    ) -> Result<Vec<DevfileType>, RegistryError> {
        let url = index_url(registry_url, filter)?;
        if ctx.is_cancelled() {
            return Err(RegistryError::Cancelled);
        }

        info!(url = %url, "Downloading devfile index");
        let start = Instant::now();

        let devfiles = tokio::select! {
            _ = ctx.cancelled() => {
                warn!(url = %url, "Registry download cancelled");
                return Err(RegistryError::Cancelled);
            }
            result = self.download(&url) => result?,
        };

        info!(
            devfiles = devfiles.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Devfile index downloaded"
        );
        Ok(devfiles)
    }

    async fn download(&self, url: &str) -> Result<Vec<DevfileType>, RegistryError> {
        let response = self.http_client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                error!("Registry request timed out after {:?}", self.timeout);
                RegistryError::Timeout {
                    seconds: self.timeout.as_secs(),
                }
            } else if e.is_connect() {
                error!("Cannot connect to registry at {}", url);
                RegistryError::Network {
                    message: format!("Connection failed: {}", e),
                }
            } else {
                error!("Registry request error: {}", e);
                RegistryError::Network {
                    message: format!("Request failed: {}", e),
                }
            }
        })?;

        let status = response.status();
        if status != StatusCode::OK {
            warn!(status = status.as_u16(), url, "Registry answered with an error status");
            return Err(RegistryError::FetchFailed);
        }

        let devfiles: Vec<DevfileType> = response.json().await.map_err(|e| {
            warn!(error = %e, "Failed to decode devfile index");
            RegistryError::FetchFailed
        })?;
        debug!(count = devfiles.len(), "Decoded devfile index");
        Ok(devfiles)
    }
}
