//! SmartPool settings resource
//!
//! Singleton settings object. Create and update resubmit every known settable
//! value; delete leaves the appliance untouched.

use crate::error::PowerscaleError;
use crate::mapper::{write_field, Field};
use crate::models::smartpool_settings::{SmartpoolSettingsModel, SMARTPOOL_SETTINGS_ID};
use crate::provider_data::{not_configured, PowerscaleProviderData};
use crate::version::{StoragepoolApi, STORAGEPOOL_SETTINGS_APIS};
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
use tfplug::schema::{
    Attribute, AttributeBuilder, AttributeType, NestedType, ObjectNestingMode, Schema,
    SchemaBuilder, Validator,
};
use tfplug::types::{has_errors, AttributePath, Diagnostic, DynamicValue};
use tfplug::validator::{NumberRangeValidator, StringOneOfValidator};

const MIRROR_COUNTS: &[&str] = &["one", "all"];

/// Attribute declarations shared with the data source. With `read_only`
/// every attribute is computed and carries no validators.
pub(crate) fn settings_attributes(read_only: bool) -> Vec<Attribute> {
    let settable = |name: &str,
                    r#type: AttributeType,
                    description: &str,
                    validators: Vec<Box<dyn Validator>>| {
        let mut builder = AttributeBuilder::new(name, r#type).description(description);
        if read_only {
            return builder.computed().build();
        }
        builder = builder.optional().computed();
        for validator in validators {
            builder = builder.validator(validator);
        }
        builder.build()
    };
    let computed = |name: &str, r#type: AttributeType, description: &str| {
        AttributeBuilder::new(name, r#type)
            .description(description)
            .computed()
            .build()
    };

    vec![
        settable(
            "default_transfer_limit_pct",
            AttributeType::Number,
            "Applies to all storagepools that fall back on the default transfer limit. Stop moving files to this pool when this limit is met. The value must be between 0 and 100. Only supported for PowerScale 9.5 and above.",
            vec![Box::new(NumberRangeValidator::between(0.0, 100.0))],
        ),
        computed(
            "default_transfer_limit_state",
            AttributeType::String,
            "How the default transfer limit value is being applied. Only supported for PowerScale 9.5 and above.",
        ),
        settable(
            "global_namespace_acceleration_enabled",
            AttributeType::Bool,
            "Optimize namespace operations by storing metadata on SSDs.",
            vec![],
        ),
        computed(
            "global_namespace_acceleration_state",
            AttributeType::String,
            "Whether or not namespace operation optimizations are currently in effect.",
        ),
        settable(
            "manage_io_optimization",
            AttributeType::Bool,
            "Manage I/O optimization settings.",
            vec![],
        ),
        settable(
            "manage_io_optimization_apply_to_files",
            AttributeType::Bool,
            "Apply to files with manually-managed I/O optimization settings.",
            vec![],
        ),
        settable(
            "manage_protection",
            AttributeType::Bool,
            "Manage protection settings.",
            vec![],
        ),
        settable(
            "manage_protection_apply_to_files",
            AttributeType::Bool,
            "Apply to files with manually-managed protection.",
            vec![],
        ),
        settable(
            "protect_directories_one_level_higher",
            AttributeType::Bool,
            "Increase directory protection to a higher requested protection than its contents.",
            vec![],
        ),
        settable(
            "spillover_enabled",
            AttributeType::Bool,
            "Enable global spillover.",
            vec![],
        ),
        spillover_target(read_only),
        settable(
            "ssd_l3_cache_default_enabled",
            AttributeType::Bool,
            "Use SSDs as L3 cache by default for new node pools.",
            vec![],
        ),
        settable(
            "ssd_qab_mirrors",
            AttributeType::String,
            "Controls number of mirrors of QAB blocks to place on SSDs. Acceptable values: one, all.",
            vec![Box::new(StringOneOfValidator::new(MIRROR_COUNTS))],
        ),
        settable(
            "ssd_system_btree_mirrors",
            AttributeType::String,
            "Controls number of mirrors of system B-tree blocks to place on SSDs. Acceptable values: one, all.",
            vec![Box::new(StringOneOfValidator::new(MIRROR_COUNTS))],
        ),
        settable(
            "ssd_system_delta_mirrors",
            AttributeType::String,
            "Controls number of mirrors of system delta blocks to place on SSDs. Acceptable values: one, all.",
            vec![Box::new(StringOneOfValidator::new(MIRROR_COUNTS))],
        ),
        settable(
            "virtual_hot_spare_deny_writes",
            AttributeType::Bool,
            "Deny data writes to reserved disk space.",
            vec![],
        ),
        settable(
            "virtual_hot_spare_hide_spare",
            AttributeType::Bool,
            "Subtract the space reserved for the virtual hot spare when calculating available free space.",
            vec![],
        ),
        settable(
            "virtual_hot_spare_limit_drives",
            AttributeType::Number,
            "The number of drives to reserve for the virtual hot spare, from 0-4.",
            vec![Box::new(NumberRangeValidator::between(0.0, 4.0))],
        ),
        settable(
            "virtual_hot_spare_limit_percent",
            AttributeType::Number,
            "The percent space to reserve for the virtual hot spare, from 0-20.",
            vec![Box::new(NumberRangeValidator::between(0.0, 20.0))],
        ),
    ]
}

fn spillover_target(read_only: bool) -> Attribute {
    let id = AttributeBuilder::new("id", AttributeType::Number)
        .description("Target pool ID if target specified as storagepool, otherwise null.")
        .computed()
        .build();
    let mut name = AttributeBuilder::new("name", AttributeType::String)
        .description("Target pool name if target specified as storagepool, otherwise null.")
        .computed();
    let mut target_type = AttributeBuilder::new("type", AttributeType::String)
        .description("Type of target pool. Acceptable values: storagepool, anywhere.")
        .computed();
    if !read_only {
        name = name.optional();
        target_type = target_type
            .optional()
            .validator(Box::new(StringOneOfValidator::new(&["storagepool", "anywhere"])));
    }

    let mut builder = AttributeBuilder::new("spillover_target", AttributeType::String)
        .description("Spillover data target.")
        .computed()
        .nested_type(NestedType {
            attributes: vec![id, name.build(), target_type.build()],
            nesting: ObjectNestingMode::Single,
        });
    if !read_only {
        builder = builder.optional();
    }
    builder.build()
}

#[derive(Default)]
pub struct SmartpoolSettingsResource {
    provider_data: Option<PowerscaleProviderData>,
}

impl SmartpoolSettingsResource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schema_definition() -> Schema {
        let mut builder = SchemaBuilder::new()
            .version(0)
            .description("This resource is used to manage the SmartPool settings of PowerScale Array. We can Create, Update and Delete the SmartPool settings using this resource. We can also import the existing SmartPool settings from PowerScale array. Note that, SmartPool settings is the native functionality of PowerScale. When creating the resource, we actually load SmartPool settings from PowerScale to the resource state.")
            .attribute(
                AttributeBuilder::new("id", AttributeType::String)
                    .description("SmartPool settings ID.")
                    .computed()
                    .build(),
            );
        for attribute in settings_attributes(false) {
            builder = builder.attribute(attribute);
        }
        builder.build()
    }

    /// Schema checks plus the "apply to files" flags, which have no effect
    /// unless the matching "manage" flag is on
    fn check_plan(value: &DynamicValue) -> Vec<Diagnostic> {
        let mut diagnostics = Self::schema_definition().validate(value);
        match SmartpoolSettingsModel::from_state(value) {
            Ok(model) => {
                let pairs = [
                    (
                        &model.manage_io_optimization,
                        &model.manage_io_optimization_apply_to_files,
                        "manage_io_optimization_apply_to_files",
                    ),
                    (
                        &model.manage_protection,
                        &model.manage_protection_apply_to_files,
                        "manage_protection_apply_to_files",
                    ),
                ];
                for (manage, apply_to_files, attribute) in pairs {
                    if manage == &Field::Set(false) && apply_to_files == &Field::Set(true) {
                        diagnostics.push(
                            Diagnostic::error(
                                "Invalid Attribute Combination",
                                format!(
                                    "{} can only be true when {} is true",
                                    attribute,
                                    attribute.trim_end_matches("_apply_to_files")
                                ),
                            )
                            .with_attribute(AttributePath::new(attribute)),
                        );
                    }
                }
            }
            Err(e) => diagnostics.push(Diagnostic::error(
                "Error reading SmartPool settings plan",
                e.to_string(),
            )),
        }
        diagnostics
    }

    async fn select_api(
        ctx: &Context,
        data: &PowerscaleProviderData,
    ) -> Result<(StoragepoolApi, crate::version::OnefsVersion), PowerscaleError> {
        let version = ctx.until_cancelled(data.client.onefs_version()).await??;
        Ok((STORAGEPOOL_SETTINGS_APIS.select(version)?, version))
    }

    pub(crate) async fn fetch_model(
        ctx: &Context,
        data: &PowerscaleProviderData,
    ) -> Result<SmartpoolSettingsModel, PowerscaleError> {
        let (api, _) = Self::select_api(ctx, data).await?;
        let settings = ctx
            .until_cancelled(data.client.storagepool().settings(api.api_version()))
            .await??;
        Ok(SmartpoolSettingsModel::from_api(&settings, api)?)
    }

    async fn fetch(ctx: &Context, data: &PowerscaleProviderData) -> Result<DynamicValue, PowerscaleError> {
        let model = Self::fetch_model(ctx, data).await?;
        let mut state = DynamicValue::object();
        write_field(&mut state, "id", &Field::Set(SMARTPOOL_SETTINGS_ID.to_string()))?;
        model.write_to(&mut state)?;
        Ok(state)
    }

    async fn apply(
        ctx: &Context,
        data: &PowerscaleProviderData,
        plan: &DynamicValue,
    ) -> Result<DynamicValue, PowerscaleError> {
        let model = SmartpoolSettingsModel::from_state(plan)?;
        let (api, version) = Self::select_api(ctx, data).await?;
        let body = model.to_request(api, version)?;
        ctx.until_cancelled(
            data.client
                .storagepool()
                .update_settings(api.api_version(), &body),
        )
        .await??;
        Self::fetch(ctx, data).await
    }
}

#[async_trait]
impl Resource for SmartpoolSettingsResource {
    fn type_name(&self) -> &str {
        "powerscale_smartpool_settings"
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

        tracing::info!("Applying SmartPool settings");
        match Self::apply(&ctx, data, &request.planned_state).await {
            Ok(new_state) => CreateResourceResponse {
                new_state,
                private: vec![],
                diagnostics,
            },
            Err(e) => {
                diagnostics.push(e.to_diagnostic("Error creating SmartPool settings"));
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
                diagnostics.push(e.to_diagnostic("Error reading SmartPool settings"));
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

        tracing::info!("Updating SmartPool settings");
        match Self::apply(&ctx, data, &request.planned_state).await {
            Ok(new_state) => UpdateResourceResponse {
                new_state,
                private: vec![],
                diagnostics,
                new_identity: None,
            },
            Err(e) => {
                diagnostics.push(e.to_diagnostic("Error updating SmartPool settings"));
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
        tracing::info!("Removing SmartPool settings from state");
        DeleteResourceResponse {
            diagnostics: vec![],
        }
    }

    fn as_import_state(&self) -> Option<&dyn ResourceWithImportState> {
        Some(self)
    }
}

#[async_trait]
impl ResourceWithImportState for SmartpoolSettingsResource {
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
                .push(e.to_diagnostic("Error importing SmartPool settings")),
        }
        response
    }
}

#[async_trait]
impl ResourceWithConfigure for SmartpoolSettingsResource {
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
