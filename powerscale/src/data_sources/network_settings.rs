//! Network settings data source implementation

use crate::error::PowerscaleError;
use crate::models::network_settings::NetworkSettingsModel;
use crate::provider_data::{not_configured, PowerscaleProviderData};
use crate::version::NETWORK_SETTINGS_APIS;
use async_trait::async_trait;
use tfplug::context::Context;
use tfplug::data_source::{
    ConfigureDataSourceRequest, ConfigureDataSourceResponse, DataSource, DataSourceSchemaRequest,
    DataSourceSchemaResponse, DataSourceWithConfigure, ReadDataSourceRequest,
    ReadDataSourceResponse,
};
use tfplug::schema::{AttributeBuilder, AttributeType, Schema, SchemaBuilder};
use tfplug::types::DynamicValue;

#[derive(Default)]
pub struct NetworkSettingsDataSource {
    provider_data: Option<PowerscaleProviderData>,
}

impl NetworkSettingsDataSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schema_definition() -> Schema {
        SchemaBuilder::new()
            .version(0)
            .description("This datasource is used to query the Network Settings from PowerScale array. The information fetched from this datasource can be used for getting the details.")
            .attribute(
                AttributeBuilder::new("id", AttributeType::String)
                    .description("Network Settings ID.")
                    .computed()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("default_groupnet", AttributeType::String)
                    .description("Default client-side DNS settings for non-multitenancy aware programs.")
                    .computed()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("source_based_routing_enabled", AttributeType::Bool)
                    .description("Enable or disable Source Based Routing.")
                    .computed()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("sc_rebalance_delay", AttributeType::Number)
                    .description("Delay in seconds for IP rebalance.")
                    .computed()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("tcp_ports", AttributeType::List(Box::new(AttributeType::Number)))
                    .description("List of client TCP ports.")
                    .computed()
                    .build(),
            )
            .build()
    }

    async fn fetch(ctx: &Context, data: &PowerscaleProviderData) -> Result<DynamicValue, PowerscaleError> {
        let version = ctx.until_cancelled(data.client.onefs_version()).await??;
        let api_version = NETWORK_SETTINGS_APIS.select(version)?;
        let settings = ctx
            .until_cancelled(data.client.network().external_settings(api_version))
            .await??;
        Ok(NetworkSettingsModel::from_api(&settings).to_state()?)
    }
}

#[async_trait]
impl DataSource for NetworkSettingsDataSource {
    fn type_name(&self) -> &str {
        "powerscale_network_settings"
    }

    async fn schema(
        &self,
        _ctx: Context,
        _request: DataSourceSchemaRequest,
    ) -> DataSourceSchemaResponse {
        DataSourceSchemaResponse {
            schema: Self::schema_definition(),
            diagnostics: vec![],
        }
    }

    async fn read(&self, ctx: Context, _request: ReadDataSourceRequest) -> ReadDataSourceResponse {
        let Some(data) = &self.provider_data else {
            return ReadDataSourceResponse::failed(not_configured());
        };

        match Self::fetch(&ctx, data).await {
            Ok(state) => ReadDataSourceResponse::with_state(state),
            Err(e) => ReadDataSourceResponse::failed(e.to_diagnostic("Error reading network settings")),
        }
    }
}

#[async_trait]
impl DataSourceWithConfigure for NetworkSettingsDataSource {
    async fn configure(
        &mut self,
        _ctx: Context,
        request: ConfigureDataSourceRequest,
    ) -> ConfigureDataSourceResponse {
        let mut diagnostics = vec![];
        tracing::debug!(
            has_provider_data = request.provider_data.is_some(),
            "configuring network settings data source"
        );

        match PowerscaleProviderData::from_configure(request.provider_data, "data source") {
            Ok(data) => self.provider_data = Some(data),
            Err(diag) => diagnostics.push(diag),
        }
        ConfigureDataSourceResponse { diagnostics }
    }
}
