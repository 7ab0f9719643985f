//! Cluster configuration API

use super::{ApiError, Client};
use serde::Deserialize;

/// Response from GET /platform/1/cluster/config
#[derive(Debug, Clone, Deserialize)]
pub struct ClusterConfig {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub guid: Option<String>,
    pub onefs_version: OnefsVersionInfo,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OnefsVersionInfo {
    /// Dotted release, e.g. `9.5.0.0`
    pub release: String,
    #[serde(default)]
    pub build: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
}

pub struct ClusterApi<'a> {
    client: &'a Client,
}

impl<'a> ClusterApi<'a> {
    pub fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// GET /platform/1/cluster/config
    pub async fn config(&self) -> Result<ClusterConfig, ApiError> {
        self.client.get("/platform/1/cluster/config").await
    }
}
