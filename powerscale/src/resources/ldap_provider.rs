//! LDAP provider resource
//!
//! Providers are addressed by name. The API variant (11 or 16) is chosen from
//! the cluster's OneFS release; only 16 carries the revocation settings.

use crate::error::PowerscaleError;
use crate::mapper::{read_field, Field};
use crate::models::ldap_provider::{LdapProviderModel, LdapSettings};
use crate::provider_data::{not_configured, PowerscaleProviderData};
use crate::version::{LdapApi, OnefsVersion, LDAP_PROVIDER_APIS};
use async_trait::async_trait;
use tfplug::context::Context;
use tfplug::resource::{
    ConfigureResourceRequest, ConfigureResourceResponse, CreateResourceRequest,
    CreateResourceResponse, DeleteResourceRequest, DeleteResourceResponse,
    ImportResourceStateRequest, ImportResourceStateResponse, ImportedResource, ModifyPlanRequest,
    ModifyPlanResponse, ReadResourceRequest, ReadResourceResponse, Resource,
    ResourceSchemaRequest, ResourceSchemaResponse, ResourceWithConfigure, ResourceWithImportState,
    ResourceWithModifyPlan, UpdateResourceRequest, UpdateResourceResponse,
    ValidateResourceConfigRequest, ValidateResourceConfigResponse,
};
use tfplug::schema::{
    Attribute, AttributeBuilder, AttributeType, Schema, SchemaBuilder, Validator,
};
use tfplug::types::{has_errors, AttributePath, Diagnostic, DynamicValue};
use tfplug::validator::{
    ListElementsValidator, ListLengthValidator, NumberRangeValidator, StringLengthValidator,
    StringOneOfValidator, UniqueValuesValidator,
};

const REQUIRED_SETTINGS: &[&str] = &["base_dn", "server_uris"];
const SEARCH_SCOPES: &[&str] = &["default", "base", "onelevel", "subtree", "children"];

#[derive(Default)]
pub struct LdapProviderResource {
    provider_data: Option<PowerscaleProviderData>,
}

impl LdapProviderResource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schema_definition() -> Schema {
        let mut builder = SchemaBuilder::new()
            .version(0)
            .description("This resource is used to manage the LDAP provider entity of PowerScale Array. We can Create, Update and Delete the LDAP provider using this resource. We can also import an existing LDAP provider from PowerScale array. PowerScale LDAP provider enables you to define, query, and modify directory services and resources.")
            .attribute(
                AttributeBuilder::new("ignore_unresolvable_server_urls", AttributeType::Bool)
                    .description("Ignore unresolvable server URIs when creating and updating.")
                    .optional()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("id", AttributeType::String)
                    .description("Specifies the ID of the LDAP provider.")
                    .computed()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("zone_name", AttributeType::String)
                    .description("Specifies the name of the access zone in which this provider was created.")
                    .computed()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("status", AttributeType::String)
                    .description("Specifies the status of the provider.")
                    .computed()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("groupnet", AttributeType::String)
                    .description("Groupnet identifier. Cannot be updated.")
                    .optional()
                    .computed()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("name", AttributeType::String)
                    .description("Specifies the name of the LDAP provider.")
                    .required()
                    .validator(Box::new(StringLengthValidator::at_least(1)))
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("tls_revocation_check_level", AttributeType::String)
                    .description("This setting controls the behavior of the certificate revocation checking algorithm when the LDAP provider is presented with a digital certificate by an LDAP server. Acceptable values: \"none\", \"allowNoData\", \"allowNoSrc\", \"strict\". Only available for PowerScale 9.5 and above.")
                    .optional()
                    .computed()
                    .validator(Box::new(StringOneOfValidator::new(&[
                        "none",
                        "allowNoData",
                        "allowNoSrc",
                        "strict",
                    ])))
                    .build(),
            )
            .attribute(
                AttributeBuilder::new(
                    "ocsp_server_uris",
                    AttributeType::List(Box::new(AttributeType::String)),
                )
                .description("Specifies the OCSP server URIs. Only available for PowerScale 9.5 and above.")
                .optional()
                .computed()
                .validator(Box::new(UniqueValuesValidator))
                .validator(Box::new(ListElementsValidator::new(
                    StringLengthValidator::between(4, 2048),
                )))
                .validator(Box::new(ListLengthValidator::between(0, 10)))
                .build(),
            );

        for (name, r#type, description) in LdapSettings::attributes() {
            builder = builder.attribute(setting_attribute(name, r#type, description));
        }
        builder.build()
    }

    fn check_plan(value: &DynamicValue) -> Vec<Diagnostic> {
        let mut diagnostics = Self::schema_definition().validate(value);
        if let Err(e) = LdapProviderModel::from_state(value) {
            diagnostics.push(Diagnostic::error(
                "Error reading LdapProvider plan",
                e.to_string(),
            ));
        }
        diagnostics
    }

    async fn select_api(
        ctx: &Context,
        data: &PowerscaleProviderData,
    ) -> Result<(LdapApi, OnefsVersion), PowerscaleError> {
        let version = ctx.until_cancelled(data.client.onefs_version()).await??;
        let api = LDAP_PROVIDER_APIS.select(version)?;
        tracing::debug!("Using LDAP provider API {} for OneFS {}", api.api_version(), version);
        Ok((api, version))
    }

    /// `None` when the provider does not exist
    async fn fetch(
        ctx: &Context,
        data: &PowerscaleProviderData,
        api: LdapApi,
        name: &str,
        ignore_unresolvable: Field<bool>,
    ) -> Result<Option<LdapProviderModel>, PowerscaleError> {
        match ctx
            .until_cancelled(data.client.auth().ldap(api).get(name))
            .await?
        {
            Ok(item) => Ok(item.map(|item| LdapProviderModel::from_api(&item, api, ignore_unresolvable))),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Best-effort removal of a provider whose creation could not be
    /// confirmed. Runs outside the request context so a cancelled apply
    /// still attempts it.
    async fn remove_after_failed_create(
        data: &PowerscaleProviderData,
        api: LdapApi,
        name: &str,
        diagnostics: &mut Vec<Diagnostic>,
    ) {
        tracing::warn!("Deleting LDAP provider {} after failed read-back", name);
        if let Err(e) = data.client.auth().ldap(api).delete(name).await {
            if !e.is_not_found() {
                diagnostics.push(Diagnostic::error(
                    format!("Error deleting the LdapProvider - {}", name),
                    format!("Cleanup after the failed create did not succeed: {}", e),
                ));
            }
        }
    }

    /// Shared by create and update: reads the provider back by `name` and
    /// converts it into state.
    async fn read_back(
        ctx: &Context,
        data: &PowerscaleProviderData,
        api: LdapApi,
        name: &str,
        ignore_unresolvable: Field<bool>,
    ) -> Result<DynamicValue, ReadBackError> {
        let model = match Self::fetch(ctx, data, api, name, ignore_unresolvable).await {
            Ok(Some(model)) => model,
            Ok(None) => {
                return Err(ReadBackError::Fetch(PowerscaleError::NotFound(format!(
                    "ldap provider {}",
                    name
                ))))
            }
            Err(e) => return Err(ReadBackError::Fetch(e)),
        };
        model
            .to_state()
            .map_err(|e| ReadBackError::Parse(e.into()))
    }
}

enum ReadBackError {
    Fetch(PowerscaleError),
    Parse(PowerscaleError),
}

fn setting_attribute(name: &str, r#type: AttributeType, description: &str) -> Attribute {
    let mut builder = AttributeBuilder::new(name, r#type).description(description);
    builder = if REQUIRED_SETTINGS.contains(&name) {
        builder.required()
    } else {
        builder.optional().computed()
    };
    for validator in setting_validators(name) {
        builder = builder.validator(validator);
    }
    builder.build()
}

fn setting_validators(name: &str) -> Vec<Box<dyn Validator>> {
    match name {
        "base_dn" => vec![Box::new(StringLengthValidator::at_least(1))],
        "server_uris" => vec![
            Box::new(UniqueValuesValidator),
            Box::new(ListElementsValidator::new(StringLengthValidator::between(
                4, 2048,
            ))),
            Box::new(ListLengthValidator::at_least(1)),
        ],
        "bind_timeout" => vec![Box::new(NumberRangeValidator::between(1.0, 3600.0))],
        "check_online_interval" => vec![Box::new(NumberRangeValidator::between(0.0, 3600.0))],
        "search_timeout" => vec![Box::new(NumberRangeValidator::between(10.0, 3600.0))],
        "findable_groups" | "findable_users" | "listable_groups" | "listable_users"
        | "unfindable_groups" | "unfindable_users" | "unlistable_groups"
        | "unlistable_users" => vec![
            Box::new(UniqueValuesValidator),
            Box::new(ListElementsValidator::new(StringLengthValidator::between(
                1, 255,
            ))),
        ],
        "email_attribute" => vec![Box::new(StringLengthValidator::between(4, 64))],
        "group_search_scope" | "netgroup_search_scope" | "user_search_scope" => {
            vec![Box::new(StringOneOfValidator::new(SEARCH_SCOPES))]
        }
        "search_scope" => vec![Box::new(StringOneOfValidator::new(&SEARCH_SCOPES[1..]))],
        "member_lookup_method" => vec![Box::new(StringOneOfValidator::new(&[
            "default",
            "rfc2307bis",
        ]))],
        "ntlm_support" => vec![Box::new(StringOneOfValidator::new(&["all", "v2only", "none"]))],
        _ => vec![],
    }
}

fn groupnet_change(prior: &DynamicValue, planned: &DynamicValue) -> Option<Diagnostic> {
    let prior = read_field::<String>(prior, "groupnet").ok()?;
    let planned = read_field::<String>(planned, "groupnet").ok()?;
    match (prior.value(), planned.value()) {
        (Some(current), Some(requested)) if current != requested => Some(
            Diagnostic::error(
                "Invalid Attribute Value",
                format!(
                    "groupnet cannot be changed after creation (from {:?} to {:?})",
                    current, requested
                ),
            )
            .with_attribute(AttributePath::new("groupnet")),
        ),
        _ => None,
    }
}

fn provider_name(value: &DynamicValue) -> Option<String> {
    read_field::<String>(value, "name").ok()?.into_option()
}

fn ignore_flag(value: &DynamicValue) -> Field<bool> {
    read_field(value, "ignore_unresolvable_server_urls").unwrap_or_default()
}

#[async_trait]
impl Resource for LdapProviderResource {
    fn type_name(&self) -> &str {
        "powerscale_ldap_provider"
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

        let plan = match LdapProviderModel::from_state(&request.planned_state) {
            Ok(plan) => plan,
            Err(e) => {
                diagnostics.push(Diagnostic::error(
                    "Error reading LdapProvider plan",
                    e.to_string(),
                ));
                return failed(diagnostics);
            }
        };
        let name = plan.name.cloned_value().unwrap_or_default();
        let create_error = format!("Error creating ldap provider - {}", name);

        let (api, version) = match Self::select_api(&ctx, data).await {
            Ok(selected) => selected,
            Err(e) => {
                diagnostics.push(e.to_diagnostic(create_error));
                return failed(diagnostics);
            }
        };
        let body = match plan.to_create_request(api, version) {
            Ok(body) => body,
            Err(e) => {
                diagnostics.push(e.to_diagnostic(create_error));
                return failed(diagnostics);
            }
        };

        tracing::info!("Creating LDAP provider {}", name);
        let ignore = plan.ignore_unresolvable_server_urls.cloned_value();
        let created = ctx
            .until_cancelled(data.client.auth().ldap(api).create(&body, ignore))
            .await
            .map_err(PowerscaleError::from)
            .and_then(|result| result.map_err(PowerscaleError::from));
        if let Err(e) = created {
            diagnostics.push(e.to_diagnostic(create_error));
            return failed(diagnostics);
        }

        match Self::read_back(&ctx, data, api, &name, plan.ignore_unresolvable_server_urls).await {
            Ok(new_state) => CreateResourceResponse {
                new_state,
                private: vec![],
                diagnostics,
            },
            Err(ReadBackError::Fetch(e)) => {
                diagnostics.push(e.to_diagnostic("Error getting ldap provider after creation"));
                Self::remove_after_failed_create(data, api, &name, &mut diagnostics).await;
                failed(diagnostics)
            }
            Err(ReadBackError::Parse(e)) => {
                diagnostics.push(Diagnostic::error(
                    "Error creating LdapProvider Resource",
                    format!("Error parsing LdapProvider resource state: {}", e),
                ));
                Self::remove_after_failed_create(data, api, &name, &mut diagnostics).await;
                failed(diagnostics)
            }
        }
    }

    async fn read(&self, ctx: Context, request: ReadResourceRequest) -> ReadResourceResponse {
        let mut diagnostics = vec![];

        let Some(name) = provider_name(&request.current_state) else {
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

        let ignore = ignore_flag(&request.current_state);
        let result = match Self::select_api(&ctx, data).await {
            Ok((api, _)) => Self::read_back(&ctx, data, api, &name, ignore).await,
            Err(e) => Err(ReadBackError::Fetch(e)),
        };

        match result {
            Ok(state) => ReadResourceResponse {
                new_state: Some(state),
                diagnostics,
                private: request.private,
                deferred: None,
                new_identity: None,
            },
            Err(ReadBackError::Fetch(e)) if e.is_not_found() => {
                tracing::warn!("LDAP provider {} no longer exists, removing from state", name);
                ReadResourceResponse {
                    new_state: None,
                    diagnostics,
                    private: request.private,
                    deferred: None,
                    new_identity: None,
                }
            }
            Err(ReadBackError::Fetch(e)) => {
                diagnostics.push(e.to_diagnostic(format!("Error getting the LdapProvider - {}", name)));
                ReadResourceResponse {
                    new_state: Some(request.current_state),
                    diagnostics,
                    private: request.private,
                    deferred: None,
                    new_identity: None,
                }
            }
            Err(ReadBackError::Parse(e)) => {
                diagnostics.push(e.to_diagnostic("Error reading LdapProvider Resource"));
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
        let failed = |diagnostics, prior_state| UpdateResourceResponse {
            new_state: prior_state,
            private: vec![],
            diagnostics,
            new_identity: None,
        };

        let Some(data) = &self.provider_data else {
            diagnostics.push(not_configured());
            return failed(diagnostics, prior_state);
        };
        if has_errors(&diagnostics) {
            return failed(diagnostics, prior_state);
        }

        let models = LdapProviderModel::from_state(&prior_state)
            .and_then(|prior| Ok((prior, LdapProviderModel::from_state(&request.planned_state)?)));
        let (prior, plan) = match models {
            Ok(models) => models,
            Err(e) => {
                diagnostics.push(Diagnostic::error(
                    "Error reading LdapProvider plan",
                    e.to_string(),
                ));
                return failed(diagnostics, prior_state);
            }
        };
        let current_name = prior.name.cloned_value().unwrap_or_default();
        let planned_name = plan.name.cloned_value().unwrap_or_default();
        let update_error = format!("Error updating the LdapProvider resource - {}", current_name);

        let (api, version) = match Self::select_api(&ctx, data).await {
            Ok(selected) => selected,
            Err(e) => {
                diagnostics.push(e.to_diagnostic(update_error));
                return failed(diagnostics, prior_state);
            }
        };
        let body = match plan.to_update_request(&prior, api, version) {
            Ok(body) => body,
            Err(e) => {
                diagnostics.push(e.to_diagnostic(update_error));
                return failed(diagnostics, prior_state);
            }
        };

        if body.is_empty() {
            tracing::debug!("No LDAP provider settings changed for {}", current_name);
        } else {
            tracing::info!("Updating LDAP provider {}", current_name);
            let ignore = plan.ignore_unresolvable_server_urls.cloned_value();
            let updated = ctx
                .until_cancelled(data.client.auth().ldap(api).update(&current_name, &body, ignore))
                .await
                .map_err(PowerscaleError::from)
                .and_then(|result| result.map_err(PowerscaleError::from));
            if let Err(e) = updated {
                diagnostics.push(e.to_diagnostic(update_error));
                return failed(diagnostics, prior_state);
            }
        }

        match Self::read_back(&ctx, data, api, &planned_name, plan.ignore_unresolvable_server_urls).await {
            Ok(new_state) => UpdateResourceResponse {
                new_state,
                private: vec![],
                diagnostics,
                new_identity: None,
            },
            Err(ReadBackError::Fetch(e)) => {
                diagnostics.push(e.to_diagnostic(format!("Error getting the LdapProvider - {}", planned_name)));
                failed(diagnostics, prior_state)
            }
            Err(ReadBackError::Parse(e)) => {
                diagnostics.push(e.to_diagnostic("Error updating LdapProvider Resource"));
                failed(diagnostics, prior_state)
            }
        }
    }

    async fn delete(&self, ctx: Context, request: DeleteResourceRequest) -> DeleteResourceResponse {
        let mut diagnostics = vec![];

        let Some(name) = provider_name(&request.prior_state) else {
            return DeleteResourceResponse { diagnostics };
        };
        let Some(data) = &self.provider_data else {
            diagnostics.push(not_configured());
            return DeleteResourceResponse { diagnostics };
        };

        tracing::info!("Deleting LDAP provider {}", name);
        let result = match Self::select_api(&ctx, data).await {
            Ok((api, _)) => ctx
                .until_cancelled(data.client.auth().ldap(api).delete(&name))
                .await
                .map_err(PowerscaleError::from)
                .and_then(|result| result.map_err(PowerscaleError::from)),
            Err(e) => Err(e),
        };

        match result {
            Ok(()) => {}
            Err(e) if e.is_not_found() => {
                tracing::debug!("LDAP provider {} already absent", name);
            }
            Err(e) => diagnostics.push(e.to_diagnostic(format!("Error deleting the LdapProvider - {}", name))),
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
impl ResourceWithModifyPlan for LdapProviderResource {
    async fn modify_plan(&self, _ctx: Context, request: ModifyPlanRequest) -> ModifyPlanResponse {
        let planned = Self::schema_definition().plan(
            &request.config,
            &request.prior_state,
            &request.proposed_new_state,
        );
        let mut diagnostics = planned.diagnostics;
        if !request.prior_state.is_null() && !request.proposed_new_state.is_null() {
            diagnostics.extend(groupnet_change(&request.prior_state, &planned.planned_state));
        }

        ModifyPlanResponse {
            planned_state: planned.planned_state,
            requires_replace: planned.requires_replace,
            planned_private: request.prior_private,
            diagnostics,
        }
    }
}

#[async_trait]
impl ResourceWithImportState for LdapProviderResource {
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

        let name = request.id.trim();
        let result = match Self::select_api(&ctx, data).await {
            Ok((api, _)) => Self::read_back(&ctx, data, api, name, Field::Null).await,
            Err(e) => Err(ReadBackError::Fetch(e)),
        };

        match result {
            Ok(state) => response.imported_resources.push(ImportedResource {
                type_name: request.type_name,
                state,
                private: vec![],
                identity: request.identity,
            }),
            Err(ReadBackError::Fetch(e)) => response
                .diagnostics
                .push(e.to_diagnostic(format!("Error getting the LdapProvider - {}", name))),
            Err(ReadBackError::Parse(e)) => response
                .diagnostics
                .push(e.to_diagnostic("Error reading LdapProvider Resource")),
        }
        response
    }
}

#[async_trait]
impl ResourceWithConfigure for LdapProviderResource {
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
    fn schema_declares_every_setting() {
        let schema = LdapProviderResource::schema_definition();
        assert_eq!(schema.block.attributes.len(), 80);
        assert!(schema.attribute("name").unwrap().required);
        assert!(schema.attribute("base_dn").unwrap().required);
        assert!(schema.attribute("server_uris").unwrap().required);
        let bind_dn = schema.attribute("bind_dn").unwrap();
        assert!(bind_dn.optional && bind_dn.computed);
        assert!(schema.attribute("zone_name").unwrap().is_read_only());
    }

    #[test]
    fn plan_validation_applies_setting_validators() {
        let diagnostics = LdapProviderResource::check_plan(&value(
            r#"{"name": "corp", "base_dn": "dc=corp", "server_uris": ["ldap://a", "ldap://a"],
                "bind_timeout": 0, "search_scope": "default"}"#,
        ));
        let attributes: Vec<String> = diagnostics
            .iter()
            .filter_map(|d| d.attribute.as_ref().map(|a| a.to_string()))
            .collect();
        assert!(attributes.iter().any(|a| a.contains("server_uris")));
        assert!(attributes.iter().any(|a| a.contains("bind_timeout")));
        assert!(attributes.iter().any(|a| a.contains("search_scope")));
    }

    #[test]
    fn missing_required_settings_are_reported() {
        let diagnostics = LdapProviderResource::check_plan(&value(r#"{"name": "corp"}"#));
        assert_eq!(
            diagnostics
                .iter()
                .filter(|d| d.summary == "Missing required argument")
                .count(),
            2
        );
    }

    #[tokio::test]
    async fn groupnet_change_is_rejected_at_plan_time() {
        let prior = value(r#"{"name": "corp", "groupnet": "groupnet0", "id": "corp"}"#);
        let proposed = value(r#"{"name": "corp", "groupnet": "groupnet1", "id": "corp"}"#);
        let response = LdapProviderResource::new()
            .modify_plan(
                Context::new(),
                ModifyPlanRequest {
                    type_name: "powerscale_ldap_provider".to_string(),
                    config: proposed.clone(),
                    prior_state: prior,
                    proposed_new_state: proposed,
                    prior_private: vec![],
                    provider_meta: None,
                },
            )
            .await;
        assert!(has_errors(&response.diagnostics));

        let unchanged = groupnet_change(
            &value(r#"{"groupnet": "groupnet0"}"#),
            &value(r#"{"groupnet": "__unknown__"}"#),
        );
        assert!(unchanged.is_none());
    }
}
