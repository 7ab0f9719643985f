//! Storage pool (SmartPools) settings API

use super::{ApiError, Client};
use serde::{Deserialize, Serialize};

/// Global SmartPools settings as reported by the appliance
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct StoragepoolSettings {
    #[serde(default)]
    pub automatically_manage_io_optimization: Option<String>,
    #[serde(default)]
    pub automatically_manage_protection: Option<String>,
    /// Only reported from API version 16
    #[serde(default)]
    pub default_transfer_limit_pct: Option<f64>,
    #[serde(default)]
    pub default_transfer_limit_state: Option<String>,
    #[serde(default)]
    pub global_namespace_acceleration_enabled: Option<bool>,
    #[serde(default)]
    pub global_namespace_acceleration_state: Option<String>,
    #[serde(default)]
    pub protect_directories_one_level_higher: Option<bool>,
    #[serde(default)]
    pub spillover_enabled: Option<bool>,
    #[serde(default)]
    pub spillover_target: Option<SpilloverTarget>,
    #[serde(default)]
    pub ssd_l3_cache_default_enabled: Option<bool>,
    #[serde(default)]
    pub ssd_qab_mirrors: Option<String>,
    #[serde(default)]
    pub ssd_system_btree_mirrors: Option<String>,
    #[serde(default)]
    pub ssd_system_delta_mirrors: Option<String>,
    #[serde(default)]
    pub virtual_hot_spare_deny_writes: Option<bool>,
    #[serde(default)]
    pub virtual_hot_spare_hide_spare: Option<bool>,
    #[serde(default)]
    pub virtual_hot_spare_limit_drives: Option<i64>,
    #[serde(default)]
    pub virtual_hot_spare_limit_percent: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SpilloverTarget {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "type", default)]
    pub target_type: Option<String>,
}

/// Request body for PUT /platform/{v}/storagepool/settings
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StoragepoolSettingsUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub automatically_manage_io_optimization: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub automatically_manage_protection: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub global_namespace_acceleration_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protect_directories_one_level_higher: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spillover_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spillover_target: Option<SpilloverTargetUpdate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ssd_l3_cache_default_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ssd_qab_mirrors: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ssd_system_btree_mirrors: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ssd_system_delta_mirrors: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub virtual_hot_spare_deny_writes: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub virtual_hot_spare_hide_spare: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub virtual_hot_spare_limit_drives: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub virtual_hot_spare_limit_percent: Option<i64>,
    /// Present only when talking to API version 16
    #[serde(flatten)]
    pub transfer_limits: Option<TransferLimitUpdate>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SpilloverTargetUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub target_type: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TransferLimitUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_transfer_limit_pct: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct StoragepoolSettingsResponse {
    settings: StoragepoolSettings,
}

pub struct StoragepoolApi<'a> {
    client: &'a Client,
}

impl<'a> StoragepoolApi<'a> {
    pub fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// GET /platform/{v}/storagepool/settings
    pub async fn settings(&self, api_version: u32) -> Result<StoragepoolSettings, ApiError> {
        let response: StoragepoolSettingsResponse = self
            .client
            .get(&format!("/platform/{}/storagepool/settings", api_version))
            .await?;
        Ok(response.settings)
    }

    /// PUT /platform/{v}/storagepool/settings
    pub async fn update_settings(
        &self,
        api_version: u32,
        update: &StoragepoolSettingsUpdate,
    ) -> Result<(), ApiError> {
        self.client
            .put(
                &format!("/platform/{}/storagepool/settings", api_version),
                update,
            )
            .await
    }
}
