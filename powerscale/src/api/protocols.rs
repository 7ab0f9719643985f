//! Protocol settings API (S3)

use super::{ApiError, Client};
use serde::{Deserialize, Serialize};

/// S3 global settings, shared by the request and response bodies
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct S3GlobalSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bucket_size_readdir_heuristic: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub http_port: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub https_only: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub https_port: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct S3GlobalSettingsResponse {
    settings: S3GlobalSettings,
}

pub struct ProtocolsApi<'a> {
    client: &'a Client,
}

impl<'a> ProtocolsApi<'a> {
    pub fn new(client: &'a Client) -> Self {
        Self { client }
    }

    fn s3_settings_path(api_version: u32) -> String {
        format!("/platform/{}/protocols/s3/settings/global", api_version)
    }

    /// GET /platform/{v}/protocols/s3/settings/global
    pub async fn s3_global_settings(&self, api_version: u32) -> Result<S3GlobalSettings, ApiError> {
        let response: S3GlobalSettingsResponse = self
            .client
            .get(&Self::s3_settings_path(api_version))
            .await?;
        Ok(response.settings)
    }

    /// PUT /platform/{v}/protocols/s3/settings/global
    pub async fn update_s3_global_settings(
        &self,
        api_version: u32,
        settings: &S3GlobalSettings,
    ) -> Result<(), ApiError> {
        self.client
            .put(&Self::s3_settings_path(api_version), settings)
            .await
    }
}
