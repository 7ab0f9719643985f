//! Read-only counterparts of resources
//!
//! Data sources only read: there is no plan, no prior state and nothing to
//! delete, so the trait is a strict subset of the resource lifecycle.

use crate::context::Context;
use crate::schema::Schema;
use crate::types::{ClientCapabilities, Deferred, Diagnostic, DynamicValue};
use async_trait::async_trait;
use std::any::Any;
use std::sync::Arc;

#[async_trait]
pub trait DataSource: Send + Sync {
    /// Full type name, e.g. "powerscale_network_settings".
    /// Must equal the key under which the provider registers the factory.
    fn type_name(&self) -> &str;

    async fn metadata(
        &self,
        _ctx: Context,
        _request: DataSourceMetadataRequest,
    ) -> DataSourceMetadataResponse {
        DataSourceMetadataResponse {
            type_name: self.type_name().to_string(),
        }
    }

    async fn schema(
        &self,
        ctx: Context,
        request: DataSourceSchemaRequest,
    ) -> DataSourceSchemaResponse;

    /// Config checks beyond what the schema enforces; none by default
    async fn validate(
        &self,
        _ctx: Context,
        _request: ValidateDataSourceConfigRequest,
    ) -> ValidateDataSourceConfigResponse {
        ValidateDataSourceConfigResponse {
            diagnostics: vec![],
        }
    }

    /// Every computed attribute must be present in the returned state
    async fn read(&self, ctx: Context, request: ReadDataSourceRequest) -> ReadDataSourceResponse;
}

/// Receives the provider data right after the factory builds the instance
#[async_trait]
pub trait DataSourceWithConfigure: DataSource {
    async fn configure(
        &mut self,
        ctx: Context,
        request: ConfigureDataSourceRequest,
    ) -> ConfigureDataSourceResponse;
}

pub struct DataSourceMetadataRequest;

pub struct DataSourceMetadataResponse {
    pub type_name: String,
}

pub struct DataSourceSchemaRequest;

pub struct DataSourceSchemaResponse {
    pub schema: Schema,
    pub diagnostics: Vec<Diagnostic>,
}

pub struct ValidateDataSourceConfigRequest {
    pub type_name: String,
    pub config: DynamicValue,
}

pub struct ValidateDataSourceConfigResponse {
    pub diagnostics: Vec<Diagnostic>,
}

pub struct ReadDataSourceRequest {
    pub type_name: String,
    pub config: DynamicValue,
    pub provider_meta: Option<DynamicValue>,
    pub client_capabilities: ClientCapabilities,
}

pub struct ReadDataSourceResponse {
    pub state: DynamicValue,
    pub diagnostics: Vec<Diagnostic>,
    pub deferred: Option<Deferred>,
}

impl ReadDataSourceResponse {
    pub fn with_state(state: DynamicValue) -> Self {
        Self {
            state,
            diagnostics: vec![],
            deferred: None,
        }
    }

    /// A null state carrying a single error
    pub fn failed(diagnostic: Diagnostic) -> Self {
        Self {
            state: DynamicValue::null(),
            diagnostics: vec![diagnostic],
            deferred: None,
        }
    }
}

pub struct ConfigureDataSourceRequest {
    pub provider_data: Option<Arc<dyn Any + Send + Sync>>,
}

pub struct ConfigureDataSourceResponse {
    pub diagnostics: Vec<Diagnostic>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::SchemaBuilder;

    struct Empty;

    #[async_trait]
    impl DataSource for Empty {
        fn type_name(&self) -> &str {
            "powerscale_empty"
        }

        async fn schema(
            &self,
            _ctx: Context,
            _request: DataSourceSchemaRequest,
        ) -> DataSourceSchemaResponse {
            DataSourceSchemaResponse {
                schema: SchemaBuilder::new().build(),
                diagnostics: vec![],
            }
        }

        async fn read(
            &self,
            _ctx: Context,
            _request: ReadDataSourceRequest,
        ) -> ReadDataSourceResponse {
            ReadDataSourceResponse::failed(Diagnostic::error("Nothing to read", ""))
        }
    }

    #[tokio::test]
    async fn metadata_and_validate_default_to_type_name_and_no_diagnostics() {
        let ds = Empty;
        let metadata = ds.metadata(Context::new(), DataSourceMetadataRequest).await;
        assert_eq!(metadata.type_name, "powerscale_empty");

        let validated = ds
            .validate(
                Context::new(),
                ValidateDataSourceConfigRequest {
                    type_name: "powerscale_empty".to_string(),
                    config: DynamicValue::null(),
                },
            )
            .await;
        assert!(validated.diagnostics.is_empty());
    }

    #[tokio::test]
    async fn failed_read_has_null_state() {
        let response = Empty
            .read(
                Context::new(),
                ReadDataSourceRequest {
                    type_name: "powerscale_empty".to_string(),
                    config: DynamicValue::null(),
                    provider_meta: None,
                    client_capabilities: ClientCapabilities::default(),
                },
            )
            .await;
        assert!(response.state.is_null());
        assert_eq!(response.diagnostics.len(), 1);
    }
}
