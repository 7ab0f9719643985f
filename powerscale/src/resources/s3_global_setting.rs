//! S3 global settings resource
//!
//! The settings object always exists on the appliance. Create and update both
//! submit every known settable value; delete only forgets the state.

use crate::error::PowerscaleError;
use crate::models::s3_global_setting::S3GlobalSettingModel;
use crate::provider_data::{not_configured, PowerscaleProviderData};
use crate::version::S3_SETTINGS_APIS;
use async_trait::async_trait;
use tfplug::context::Context;
use tfplug::resource::{
    ConfigureResourceRequest, ConfigureResourceResponse, CreateResourceRequest,
    CreateResourceResponse, DeleteResourceRequest, DeleteResourceResponse,
    ImportResourceStateRequest, ImportResourceStateResponse, ImportedResource,
    ReadResourceRequest, ReadResourceResponse, Resource, ResourceSchemaRequest, ResourceSchemaResponse,
    ResourceWithConfigure, ResourceWithImportState, UpdateResourceRequest,
    UpdateResourceResponse, ValidateResourceConfigRequest, ValidateResourceConfigResponse,
};
use tfplug::schema::{AttributeBuilder, AttributeType, Schema, SchemaBuilder};
use tfplug::types::{has_errors, AttributePath, Diagnostic, DynamicValue};
use tfplug::validator::NumberRangeValidator;

#[derive(Default)]
pub struct S3GlobalSettingResource {
    provider_data: Option<PowerscaleProviderData>,
}

impl S3GlobalSettingResource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schema_definition() -> Schema {
        SchemaBuilder::new()
            .version(0)
            .description("This resource is used to manage the S3 Global Setting entity of PowerScale Array. We can Create, Update and Delete the S3 Global Setting using this resource. We can also import the existing S3 Global Setting from PowerScale array.")
            .attribute(
                AttributeBuilder::new("id", AttributeType::String)
                    .description("S3 Global Setting ID.")
                    .computed()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("service", AttributeType::Bool)
                    .description("Specifies whether the S3 service is enabled.")
                    .optional()
                    .computed()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("https_only", AttributeType::Bool)
                    .description("Specifies whether to only accept HTTPS connections.")
                    .optional()
                    .computed()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("http_port", AttributeType::Number)
                    .description("Specifies the HTTP port.")
                    .optional()
                    .computed()
                    .validator(Box::new(NumberRangeValidator::between(1024.0, 65535.0)))
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("https_port", AttributeType::Number)
                    .description("Specifies the HTTPS port.")
                    .optional()
                    .computed()
                    .validator(Box::new(NumberRangeValidator::between(1024.0, 65535.0)))
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("bucket_size_readdir_heuristic", AttributeType::Bool)
                    .description("Specifies whether to use the bucket size readdir heuristic.")
                    .optional()
                    .computed()
                    .build(),
            )
            .build()
    }

    /// Schema checks plus the HTTP/HTTPS port conflict
    fn check_plan(value: &DynamicValue) -> Vec<Diagnostic> {
        let mut diagnostics = Self::schema_definition().validate(value);
        match S3GlobalSettingModel::from_state(value) {
            Ok(model) => {
                if let Some(port) = model.port_conflict() {
                    diagnostics.push(
                        Diagnostic::error(
                            "Invalid Attribute Combination",
                            format!("http_port and https_port must differ, both are {}", port),
                        )
                        .with_attribute(AttributePath::new("https_port")),
                    );
                }
            }
            Err(e) => diagnostics.push(Diagnostic::error(
                "Error reading S3 Global Setting plan",
                e.to_string(),
            )),
        }
        diagnostics
    }

    async fn api_version(ctx: &Context, data: &PowerscaleProviderData) -> Result<u32, PowerscaleError> {
        let version = ctx.until_cancelled(data.client.onefs_version()).await??;
        Ok(S3_SETTINGS_APIS.select(version)?)
    }

    async fn fetch(ctx: &Context, data: &PowerscaleProviderData) -> Result<DynamicValue, PowerscaleError> {
        let api_version = Self::api_version(ctx, data).await?;
        let settings = ctx
            .until_cancelled(data.client.protocols().s3_global_settings(api_version))
            .await??;
        Ok(S3GlobalSettingModel::from_api(&settings).to_state()?)
    }

    /// Submits the plan and reads the settings back
    async fn apply(
        ctx: &Context,
        data: &PowerscaleProviderData,
        plan: &DynamicValue,
    ) -> Result<DynamicValue, PowerscaleError> {
        let model = S3GlobalSettingModel::from_state(plan)?;
        let api_version = Self::api_version(ctx, data).await?;
        ctx.until_cancelled(
            data.client
                .protocols()
                .update_s3_global_settings(api_version, &model.to_request()),
        )
        .await??;
        Self::fetch(ctx, data).await
    }
}

#[async_trait]
impl Resource for S3GlobalSettingResource {
    fn type_name(&self) -> &str {
        "powerscale_s3_global_setting"
    }

    async fn schema(
        &self,
        _ctx: Context,
        _request: ResourceSchemaRequest,
    ) -> ResourceSchemaResponse {
        ResourceSchemaResponse {
            schema: Self::schema_definition(),
            diagnostics: vec![],
        }
    }

    async fn validate(
        &self,
        _ctx: Context,
        request: ValidateResourceConfigRequest,
    ) -> ValidateResourceConfigResponse {
        ValidateResourceConfigResponse {
            diagnostics: Self::check_plan(&request.config),
        }
    }

    async fn create(&self, ctx: Context, request: CreateResourceRequest) -> CreateResourceResponse {
        let mut diagnostics = Self::check_plan(&request.planned_state);

        let Some(data) = &self.provider_data else {
            diagnostics.push(not_configured());
            return CreateResourceResponse {
                new_state: DynamicValue::null(),
                private: vec![],
                diagnostics,
            };
        };
        if has_errors(&diagnostics) {
            return CreateResourceResponse {
                new_state: DynamicValue::null(),
                private: vec![],
                diagnostics,
            };
        }

        tracing::info!("Creating S3 global setting");
        match Self::apply(&ctx, data, &request.planned_state).await {
            Ok(new_state) => CreateResourceResponse {
                new_state,
                private: vec![],
                diagnostics,
            },
            Err(e) => {
                diagnostics.push(e.to_diagnostic("Error creating S3 Global Setting"));
                CreateResourceResponse {
                    new_state: DynamicValue::null(),
                    private: vec![],
                    diagnostics,
                }
            }
        }
    }

    async fn read(&self, ctx: Context, request: ReadResourceRequest) -> ReadResourceResponse {
        let mut diagnostics = vec![];

        let Some(data) = &self.provider_data else {
            diagnostics.push(not_configured());
            return ReadResourceResponse {
                new_state: Some(request.current_state),
                diagnostics,
                private: request.private,
                deferred: None,
                new_identity: None,
            };
        };

        match Self::fetch(&ctx, data).await {
            Ok(state) => ReadResourceResponse {
                new_state: Some(state),
                diagnostics,
                private: request.private,
                deferred: None,
                new_identity: None,
            },
            Err(e) => {
                diagnostics.push(e.to_diagnostic("Error reading S3 Global Setting"));
                ReadResourceResponse {
                    new_state: Some(request.current_state),
                    diagnostics,
                    private: request.private,
                    deferred: None,
                    new_identity: None,
                }
            }
        }
    }

    async fn update(&self, ctx: Context, request: UpdateResourceRequest) -> UpdateResourceResponse {
        let mut diagnostics = Self::check_plan(&request.planned_state);

        let Some(data) = &self.provider_data else {
            diagnostics.push(not_configured());
            return UpdateResourceResponse {
                new_state: request.prior_state,
                private: vec![],
                diagnostics,
                new_identity: None,
            };
        };
        if has_errors(&diagnostics) {
            return UpdateResourceResponse {
                new_state: request.prior_state,
                private: vec![],
                diagnostics,
                new_identity: None,
            };
        }

        tracing::info!("Updating S3 global setting");
        match Self::apply(&ctx, data, &request.planned_state).await {
            Ok(new_state) => UpdateResourceResponse {
                new_state,
                private: vec![],
                diagnostics,
                new_identity: None,
            },
            Err(e) => {
                diagnostics.push(e.to_diagnostic("Error updating S3 Global Setting"));
                UpdateResourceResponse {
                    new_state: request.prior_state,
                    private: vec![],
                    diagnostics,
                    new_identity: None,
                }
            }
        }
    }

    async fn delete(
        &self,
        _ctx: Context,
        _request: DeleteResourceRequest,
    ) -> DeleteResourceResponse {
        // the settings cannot be removed from the appliance
        tracing::info!("Removing S3 global setting from state");
        DeleteResourceResponse {
            diagnostics: vec![],
        }
    }

    fn as_import_state(&self) -> Option<&dyn ResourceWithImportState> {
        Some(self)
    }
}

#[async_trait]
impl ResourceWithImportState for S3GlobalSettingResource {
    async fn import_state(
        &self,
        ctx: Context,
        request: ImportResourceStateRequest,
    ) -> ImportResourceStateResponse {
        let mut response = ImportResourceStateResponse {
            imported_resources: vec![],
            diagnostics: vec![],
            deferred: None,
        };

        let Some(data) = &self.provider_data else {
            response.diagnostics.push(not_configured());
            return response;
        };

        match Self::fetch(&ctx, data).await {
            Ok(state) => response.imported_resources.push(ImportedResource {
                type_name: request.type_name,
                state,
                private: vec![],
                identity: request.identity,
            }),
            Err(e) => response
                .diagnostics
                .push(e.to_diagnostic("Error importing S3 Global Setting")),
        }
        response
    }
}

#[async_trait]
impl ResourceWithConfigure for S3GlobalSettingResource {
    async fn configure(
        &mut self,
        _ctx: Context,
        request: ConfigureResourceRequest,
    ) -> ConfigureResourceResponse {
        let mut diagnostics = vec![];
        match PowerscaleProviderData::from_configure(request.provider_data, "resource") {
            Ok(data) => self.provider_data = Some(data),
            Err(diag) => diagnostics.push(diag),
        }
        ConfigureResourceResponse { diagnostics }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan(json: &str) -> DynamicValue {
        DynamicValue::decode_json(json.as_bytes()).unwrap()
    }

    #[test]
    fn rejects_matching_ports() {
        let diagnostics =
            S3GlobalSettingResource::check_plan(&plan(r#"{"http_port": 9020, "https_port": 9020}"#));
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].summary, "Invalid Attribute Combination");
    }

    #[test]
    fn rejects_privileged_ports() {
        let diagnostics = S3GlobalSettingResource::check_plan(&plan(r#"{"http_port": 80}"#));
        assert!(has_errors(&diagnostics));
    }

    #[test]
    fn accepts_unknown_ports() {
        let diagnostics = S3GlobalSettingResource::check_plan(&plan(
            r#"{"http_port": "__unknown__", "https_port": 9021, "service": true}"#,
        ));
        assert!(diagnostics.is_empty());
    }

    #[tokio::test]
    async fn create_without_configure_fails() {
        let resource = S3GlobalSettingResource::new();
        let response = resource
            .create(
                Context::new(),
                CreateResourceRequest {
                    type_name: "powerscale_s3_global_setting".to_string(),
                    planned_state: plan(r#"{"service": true}"#),
                    config: plan(r#"{"service": true}"#),
                    planned_private: vec![],
                    provider_meta: None,
                },
            )
            .await;
        assert!(has_errors(&response.diagnostics));
        assert_eq!(response.diagnostics[0].summary, "Provider not configured");
    }
}
