//! Writable snapshot resource
//!
//! A writable snapshot is addressed by its destination path. Both inputs are
//! immutable; changing either plans a replacement.

use crate::error::PowerscaleError;
use crate::mapper::{read_field, Field};
use crate::models::writable_snapshot::WritableSnapshotModel;
use crate::provider_data::{not_configured, PowerscaleProviderData};
use crate::version::WRITABLE_SNAPSHOT_APIS;
use async_trait::async_trait;
use tfplug::context::Context;
use tfplug::plan_modifier::{RequiresReplace, UseStateForUnknown};
use tfplug::resource::{
    ConfigureResourceRequest, ConfigureResourceResponse, CreateResourceRequest,
    CreateResourceResponse, DeleteResourceRequest, DeleteResourceResponse,
    ImportResourceStateRequest, ImportResourceStateResponse, ImportedResource, ModifyPlanRequest,
    ModifyPlanResponse, ReadResourceRequest, ReadResourceResponse, Resource,
    ResourceSchemaRequest, ResourceSchemaResponse, ResourceWithConfigure, ResourceWithImportState,
    ResourceWithModifyPlan, UpdateResourceRequest, UpdateResourceResponse,
    ValidateResourceConfigRequest, ValidateResourceConfigResponse,
};
use tfplug::schema::{AttributeBuilder, AttributeType, Schema, SchemaBuilder};
use tfplug::types::{has_errors, AttributePath, Diagnostic, DynamicValue};
use tfplug::validator::{StringLengthValidator, StringPatternValidator};

#[derive(Default)]
pub struct WritableSnapshotResource {
    provider_data: Option<PowerscaleProviderData>,
}

impl WritableSnapshotResource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schema_definition() -> Schema {
        SchemaBuilder::new()
            .version(0)
            .description("This resource is used to manage the writable snapshot entity of PowerScale Array. We can Create, Update and Delete the writable snapshot using this resource. We can also import an existing writable snapshot from PowerScale array.")
            .attribute(
                AttributeBuilder::new("id", AttributeType::Number)
                    .description("The system ID given to the writable snapshot.")
                    .computed()
                    .plan_modifier(Box::new(UseStateForUnknown))
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("dst_path", AttributeType::String)
                    .description("The /ifs path of user supplied source snapshot. This will be the path of the writable snapshot.")
                    .required()
                    .validator(Box::new(StringPatternValidator::new(
                        "^/ifs/",
                        "must start with /ifs/",
                    )))
                    .plan_modifier(Box::new(RequiresReplace))
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("snap_id", AttributeType::String)
                    .description("The user supplied source snapshot ID or name. This will be used as the source of the writable snapshot.")
                    .required()
                    .validator(Box::new(StringLengthValidator::at_least(1)))
                    .plan_modifier(Box::new(RequiresReplace))
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("src_path", AttributeType::String)
                    .description("The /ifs path of the user supplied source snapshot.")
                    .computed()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("src_snap", AttributeType::String)
                    .description("The system ID of the user supplied source snapshot.")
                    .computed()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("snap_name", AttributeType::String)
                    .description("The name of the user supplied source snapshot.")
                    .computed()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("state", AttributeType::String)
                    .description("Writable Snapshot state.")
                    .computed()
                    .build(),
            )
            .build()
    }

    fn check_plan(value: &DynamicValue) -> Vec<Diagnostic> {
        let mut diagnostics = Self::schema_definition().validate(value);
        if let Err(e) = WritableSnapshotModel::from_state(value) {
            diagnostics.push(Diagnostic::error(
                "Error reading writable snapshot plan",
                e.to_string(),
            ));
        }
        diagnostics
    }

    async fn api_version(ctx: &Context, data: &PowerscaleProviderData) -> Result<u32, PowerscaleError> {
        let version = ctx.until_cancelled(data.client.onefs_version()).await??;
        Ok(WRITABLE_SNAPSHOT_APIS.select(version)?)
    }

    /// Reads the snapshot at `dst_path`; `snap_id` is carried into the model
    /// because the appliance does not report it.
    async fn fetch(
        ctx: &Context,
        data: &PowerscaleProviderData,
        api_version: u32,
        dst_path: &str,
        snap_id: &Field<String>,
    ) -> Result<DynamicValue, PowerscaleError> {
        let item = ctx
            .until_cancelled(data.client.snapshot().get_writable(api_version, dst_path))
            .await??
            .ok_or_else(|| PowerscaleError::NotFound(format!("writable snapshot {}", dst_path)))?;
        Ok(WritableSnapshotModel::from_api(&item, snap_id).to_state()?)
    }

    async fn create_and_read(
        ctx: &Context,
        data: &PowerscaleProviderData,
        plan: &WritableSnapshotModel,
    ) -> Result<DynamicValue, CreateError> {
        let api_version = Self::api_version(ctx, data)
            .await
            .map_err(CreateError::Create)?;
        let body = plan
            .to_request()
            .map_err(|e| CreateError::Create(e.into()))?;
        ctx.until_cancelled(data.client.snapshot().create_writable(api_version, &body))
            .await
            .map_err(|e| CreateError::Create(e.into()))?
            .map_err(|e| CreateError::Create(e.into()))?;
        tracing::debug!("Writable snapshot {} accepted by the appliance", body.dst_path);

        Self::fetch(ctx, data, api_version, &body.dst_path, &plan.snap_id)
            .await
            .map_err(|e| CreateError::ReadBack {
                error: e,
                api_version,
                dst_path: body.dst_path.clone(),
            })
    }
}

enum CreateError {
    Create(PowerscaleError),
    ReadBack {
        error: PowerscaleError,
        api_version: u32,
        dst_path: String,
    },
}

fn string_attribute(value: &DynamicValue, name: &str) -> Option<String> {
    read_field::<String>(value, name).ok()?.into_option()
}

/// Attributes whose change cannot be applied in place
fn immutable_changes(prior: &DynamicValue, planned: &DynamicValue) -> Vec<&'static str> {
    ["dst_path", "snap_id"]
        .into_iter()
        .filter(|name| {
            let before = string_attribute(prior, name);
            let after = string_attribute(planned, name);
            before.is_some() && after.is_some() && before != after
        })
        .collect()
}

#[async_trait]
impl Resource for WritableSnapshotResource {
    fn type_name(&self) -> &str {
        "powerscale_writable_snapshot"
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
        let failed = |diagnostics| CreateResourceResponse {
            new_state: DynamicValue::null(),
            private: vec![],
            diagnostics,
        };

        let Some(data) = &self.provider_data else {
            diagnostics.push(not_configured());
            return failed(diagnostics);
        };
        if has_errors(&diagnostics) {
            return failed(diagnostics);
        }

        let plan = match WritableSnapshotModel::from_state(&request.planned_state) {
            Ok(plan) => plan,
            Err(e) => {
                diagnostics.push(Diagnostic::error(
                    "Error reading writable snapshot plan",
                    e.to_string(),
                ));
                return failed(diagnostics);
            }
        };

        tracing::info!("Creating writable snapshot {:?}", plan.dst_path.value());
        match Self::create_and_read(&ctx, data, &plan).await {
            Ok(new_state) => CreateResourceResponse {
                new_state,
                private: vec![],
                diagnostics,
            },
            Err(CreateError::Create(e)) => {
                diagnostics.push(e.to_diagnostic("Error creating writable snapshot"));
                failed(diagnostics)
            }
            Err(CreateError::ReadBack {
                error,
                api_version,
                dst_path,
            }) => {
                diagnostics.push(error.to_diagnostic("Error getting writable snapshot after creation"));
                tracing::warn!("Deleting writable snapshot {} after failed read-back", dst_path);
                if let Err(e) = data.client.snapshot().delete_writable(api_version, &dst_path).await {
                    if !e.is_not_found() {
                        diagnostics.push(Diagnostic::error(
                            format!("Error deleting writable snapshot - {}", dst_path),
                            format!("Cleanup after the failed create did not succeed: {}", e),
                        ));
                    }
                }
                failed(diagnostics)
            }
        }
    }

    async fn read(&self, ctx: Context, request: ReadResourceRequest) -> ReadResourceResponse {
        let mut diagnostics = vec![];

        let Some(dst_path) = string_attribute(&request.current_state, "dst_path") else {
            return ReadResourceResponse {
                new_state: None,
                diagnostics,
                private: request.private,
                deferred: None,
                new_identity: None,
            };
        };

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

        let snap_id = read_field(&request.current_state, "snap_id").unwrap_or_default();
        let result = match Self::api_version(&ctx, data).await {
            Ok(api_version) => Self::fetch(&ctx, data, api_version, &dst_path, &snap_id).await,
            Err(e) => Err(e),
        };

        match result {
            Ok(state) => ReadResourceResponse {
                new_state: Some(state),
                diagnostics,
                private: request.private,
                deferred: None,
                new_identity: None,
            },
            Err(e) if e.is_not_found() => {
                tracing::warn!("Writable snapshot {} no longer exists, removing from state", dst_path);
                ReadResourceResponse {
                    new_state: None,
                    diagnostics,
                    private: request.private,
                    deferred: None,
                    new_identity: None,
                }
            }
            Err(e) => {
                diagnostics.push(e.to_diagnostic("Error reading writable snapshot"));
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
        let prior_state = request.prior_state;

        for name in immutable_changes(&prior_state, &request.planned_state) {
            diagnostics.push(
                Diagnostic::error(
                    "Error updating writable snapshot",
                    format!("{} cannot be changed in place, the writable snapshot must be replaced", name),
                )
                .with_attribute(AttributePath::new(name)),
            );
        }

        let Some(data) = &self.provider_data else {
            diagnostics.push(not_configured());
            return UpdateResourceResponse {
                new_state: prior_state,
                private: vec![],
                diagnostics,
                new_identity: None,
            };
        };
        if has_errors(&diagnostics) {
            return UpdateResourceResponse {
                new_state: prior_state,
                private: vec![],
                diagnostics,
                new_identity: None,
            };
        }

        let dst_path = string_attribute(&prior_state, "dst_path").unwrap_or_default();
        let snap_id = read_field(&request.planned_state, "snap_id").unwrap_or_default();
        let result = match Self::api_version(&ctx, data).await {
            Ok(api_version) => Self::fetch(&ctx, data, api_version, &dst_path, &snap_id).await,
            Err(e) => Err(e),
        };

        match result {
            Ok(new_state) => UpdateResourceResponse {
                new_state,
                private: vec![],
                diagnostics,
                new_identity: None,
            },
            Err(e) => {
                diagnostics.push(e.to_diagnostic("Error updating writable snapshot"));
                UpdateResourceResponse {
                    new_state: prior_state,
                    private: vec![],
                    diagnostics,
                    new_identity: None,
                }
            }
        }
    }

    async fn delete(&self, ctx: Context, request: DeleteResourceRequest) -> DeleteResourceResponse {
        let mut diagnostics = vec![];

        let Some(dst_path) = string_attribute(&request.prior_state, "dst_path") else {
            return DeleteResourceResponse { diagnostics };
        };
        let Some(data) = &self.provider_data else {
            diagnostics.push(not_configured());
            return DeleteResourceResponse { diagnostics };
        };

        tracing::info!("Deleting writable snapshot {}", dst_path);
        let result = match Self::api_version(&ctx, data).await {
            Ok(api_version) => ctx
                .until_cancelled(data.client.snapshot().delete_writable(api_version, &dst_path))
                .await
                .map_err(PowerscaleError::from)
                .and_then(|result| result.map_err(PowerscaleError::from)),
            Err(e) => Err(e),
        };

        match result {
            Ok(()) => {}
            Err(e) if e.is_not_found() => {
                tracing::debug!("Writable snapshot {} already absent", dst_path);
            }
            Err(e) => diagnostics.push(e.to_diagnostic("Error deleting writable snapshot")),
        }
        DeleteResourceResponse { diagnostics }
    }

    fn as_import_state(&self) -> Option<&dyn ResourceWithImportState> {
        Some(self)
    }

    fn as_modify_plan(&self) -> Option<&dyn ResourceWithModifyPlan> {
        Some(self)
    }
}

#[async_trait]
impl ResourceWithModifyPlan for WritableSnapshotResource {
    async fn modify_plan(&self, _ctx: Context, request: ModifyPlanRequest) -> ModifyPlanResponse {
        let planned = Self::schema_definition().plan(
            &request.config,
            &request.prior_state,
            &request.proposed_new_state,
        );
        ModifyPlanResponse {
            planned_state: planned.planned_state,
            requires_replace: planned.requires_replace,
            planned_private: request.prior_private,
            diagnostics: planned.diagnostics,
        }
    }
}

#[async_trait]
impl ResourceWithImportState for WritableSnapshotResource {
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

        let dst_path = request.id.trim();
        let result = match Self::api_version(&ctx, data).await {
            Ok(api_version) => Self::fetch(&ctx, data, api_version, dst_path, &Field::Null).await,
            Err(e) => Err(e),
        };

        match result {
            Ok(state) => response.imported_resources.push(ImportedResource {
                type_name: request.type_name,
                state,
                private: vec![],
                identity: request.identity,
            }),
            Err(e) => response
                .diagnostics
                .push(e.to_diagnostic(format!("Error importing writable snapshot - {}", dst_path))),
        }
        response
    }
}

#[async_trait]
impl ResourceWithConfigure for WritableSnapshotResource {
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

    fn value(json: &str) -> DynamicValue {
        DynamicValue::decode_json(json.as_bytes()).unwrap()
    }

    #[test]
    fn destination_must_be_under_ifs() {
        let diagnostics =
            WritableSnapshotResource::check_plan(&value(r#"{"dst_path": "/tmp/ws1", "snap_id": "12"}"#));
        assert!(has_errors(&diagnostics));

        let diagnostics =
            WritableSnapshotResource::check_plan(&value(r#"{"dst_path": "/ifs/ws1", "snap_id": "12"}"#));
        assert!(diagnostics.is_empty());
    }

    #[tokio::test]
    async fn changing_inputs_requires_replacement() {
        let prior = value(
            r#"{"id": 42, "dst_path": "/ifs/ws1", "snap_id": "12", "src_path": "/ifs/data",
                "src_snap": "12", "snap_name": "daily", "state": "active"}"#,
        );
        let proposed = value(
            r#"{"id": "__unknown__", "dst_path": "/ifs/ws2", "snap_id": "12", "src_path": "__unknown__",
                "src_snap": "__unknown__", "snap_name": "__unknown__", "state": "__unknown__"}"#,
        );
        let response = WritableSnapshotResource::new()
            .modify_plan(
                Context::new(),
                ModifyPlanRequest {
                    type_name: "powerscale_writable_snapshot".to_string(),
                    config: value(r#"{"dst_path": "/ifs/ws2", "snap_id": "12"}"#),
                    prior_state: prior,
                    proposed_new_state: proposed,
                    prior_private: vec![],
                    provider_meta: None,
                },
            )
            .await;

        assert_eq!(response.requires_replace, vec![AttributePath::new("dst_path")]);
        assert_eq!(
            response.planned_state.get_number(&AttributePath::new("id")).unwrap(),
            42.0
        );
    }

    #[test]
    fn detects_immutable_changes() {
        let prior = value(r#"{"dst_path": "/ifs/ws1", "snap_id": "12"}"#);
        assert_eq!(
            immutable_changes(&prior, &value(r#"{"dst_path": "/ifs/ws1", "snap_id": "daily"}"#)),
            vec!["snap_id"]
        );
        assert!(immutable_changes(&prior, &value(r#"{"dst_path": "/ifs/ws1", "snap_id": "12"}"#)).is_empty());
    }
}
