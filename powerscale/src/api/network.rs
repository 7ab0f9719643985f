//! External network settings API

use super::{ApiError, Client};
use serde::Deserialize;

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct NetworkExternalSettings {
    #[serde(default)]
    pub default_groupnet: Option<String>,
    /// Source based routing
    #[serde(default)]
    pub sbr: Option<bool>,
    #[serde(default)]
    pub sc_rebalance_delay: Option<i64>,
    #[serde(default)]
    pub tcp_ports: Option<Vec<i64>>,
}

#[derive(Debug, Deserialize)]
struct NetworkExternalResponse {
    settings: NetworkExternalSettings,
}

pub struct NetworkApi<'a> {
    client: &'a Client,
}

impl<'a> NetworkApi<'a> {
    pub fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// GET /platform/{v}/network/external
    pub async fn external_settings(
        &self,
        api_version: u32,
    ) -> Result<NetworkExternalSettings, ApiError> {
        let response: NetworkExternalResponse = self
            .client
            .get(&format!("/platform/{}/network/external", api_version))
            .await?;
        Ok(response.settings)
    }
}
