//! SmartPool settings data source implementation

use crate::error::PowerscaleError;
use crate::mapper::{write_field, write_object, Field};
use crate::models::smartpool_settings::SMARTPOOL_SETTINGS_ID;
use crate::provider_data::{not_configured, PowerscaleProviderData};
use crate::resources::smartpool_settings::{settings_attributes, SmartpoolSettingsResource};
use async_trait::async_trait;
use tfplug::context::Context;
use tfplug::data_source::{
    ConfigureDataSourceRequest, ConfigureDataSourceResponse, DataSource, DataSourceSchemaRequest,
    DataSourceSchemaResponse, DataSourceWithConfigure, ReadDataSourceRequest,
    ReadDataSourceResponse,
};
use tfplug::schema::{
    AttributeBuilder, AttributeType, NestedType, ObjectNestingMode, Schema, SchemaBuilder,
};
use tfplug::types::DynamicValue;

#[derive(Default)]
pub struct SmartpoolSettingsDataSource {
    provider_data: Option<PowerscaleProviderData>,
}

impl SmartpoolSettingsDataSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schema_definition() -> Schema {
        SchemaBuilder::new()
            .version(0)
            .description("This datasource is used to query the SmartPool settings from PowerScale array. The information fetched from this datasource can be used for getting the details.")
            .attribute(
                AttributeBuilder::new("id", AttributeType::String)
                    .description("SmartPool settings ID.")
                    .computed()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("settings", AttributeType::String)
                    .description("SmartPool settings.")
                    .computed()
                    .nested_type(NestedType {
                        attributes: settings_attributes(true),
                        nesting: ObjectNestingMode::Single,
                    })
                    .build(),
            )
            .build()
    }

    async fn fetch(ctx: &Context, data: &PowerscaleProviderData) -> Result<DynamicValue, PowerscaleError> {
        let model = SmartpoolSettingsResource::fetch_model(ctx, data).await?;
        let mut settings = DynamicValue::object();
        model.write_to(&mut settings)?;

        let mut state = DynamicValue::object();
        write_field(&mut state, "id", &Field::Set(SMARTPOOL_SETTINGS_ID.to_string()))?;
        write_object(&mut state, "settings", Field::Set(settings))?;
        Ok(state)
    }
}

#[async_trait]
impl DataSource for SmartpoolSettingsDataSource {
    fn type_name(&self) -> &str {
        "powerscale_smartpool_settings"
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
            Err(e @ PowerscaleError::Mapping(_)) => {
                ReadDataSourceResponse::failed(e.to_diagnostic("Failed to parse StoragePool Settings"))
            }
            Err(e) => ReadDataSourceResponse::failed(e.to_diagnostic("Error reading SmartPool settings")),
        }
    }
}

#[async_trait]
impl DataSourceWithConfigure for SmartpoolSettingsDataSource {
    async fn configure(
        &mut self,
        _ctx: Context,
        request: ConfigureDataSourceRequest,
    ) -> ConfigureDataSourceResponse {
        let mut diagnostics = vec![];
        match PowerscaleProviderData::from_configure(request.provider_data, "data source") {
            Ok(data) => self.provider_data = Some(data),
            Err(diag) => diagnostics.push(diag),
        }
        ConfigureDataSourceResponse { diagnostics }
    }
}
