//! Terraform provider for Dell PowerScale (OneFS)
//!
//! Resources: S3 global settings, LDAP providers, writable snapshots and
//! SmartPool settings. Data sources: network settings and SmartPool settings.

pub mod api;
pub mod data_sources;
pub mod error;
pub mod mapper;
pub mod models;
pub mod provider_data;
pub mod resources;
pub mod version;

pub use provider_data::PowerscaleProviderData;

use async_trait::async_trait;
use mapper::{read_field, Field};
use std::collections::HashMap;
use std::sync::Arc;
use tfplug::context::Context;
use tfplug::data_source::DataSourceWithConfigure;
use tfplug::provider::{
    ConfigureProviderRequest, ConfigureProviderResponse, DataSourceFactory, Provider,
    ProviderMetaSchemaRequest, ProviderMetaSchemaResponse, ProviderMetadataRequest,
    ProviderMetadataResponse, ProviderSchemaRequest, ProviderSchemaResponse, ResourceFactory,
    StopProviderRequest, StopProviderResponse, ValidateProviderConfigRequest,
    ValidateProviderConfigResponse,
};
use tfplug::resource::ResourceWithConfigure;
use tfplug::schema::{AttributeBuilder, AttributeType, Schema, SchemaBuilder};
use tfplug::types::{AttributePath, Diagnostic, DynamicValue, ServerCapabilities};
use tfplug::validator::{NumberRangeValidator, StringLengthValidator};

const LOG_FILTER_ENV: &str = "TF_LOG_PROVIDER_POWERSCALE";

/// Installs the stderr tracing subscriber. Terraform reads plugin output from
/// stderr; the filter comes from `TF_LOG_PROVIDER_POWERSCALE`, then
/// `RUST_LOG`, then defaults to `info`. Later calls are no-ops.
pub fn init_logging() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_env(LOG_FILTER_ENV)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .try_init();
}

#[derive(Default)]
pub struct PowerscaleProvider;

impl PowerscaleProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schema_definition() -> Schema {
        SchemaBuilder::new()
            .version(0)
            .description("The Terraform provider for Dell PowerScale can be used to interact with a Dell PowerScale array in order to manage the array resources.")
            .attribute(
                AttributeBuilder::new("endpoint", AttributeType::String)
                    .description("The API endpoint, ex. https://172.17.177.230:8080. This can also be set using the environment variable POWERSCALE_ENDPOINT")
                    .optional()
                    .validator(Box::new(StringLengthValidator::at_least(1)))
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("username", AttributeType::String)
                    .description("The username. This can also be set using the environment variable POWERSCALE_USERNAME")
                    .optional()
                    .validator(Box::new(StringLengthValidator::at_least(1)))
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("password", AttributeType::String)
                    .description("The password. This can also be set using the environment variable POWERSCALE_PASSWORD")
                    .optional()
                    .sensitive()
                    .validator(Box::new(StringLengthValidator::at_least(1)))
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("insecure", AttributeType::Bool)
                    .description("Boolean variable to specify whether to validate SSL certificate or not. This can also be set using the environment variable POWERSCALE_INSECURE")
                    .optional()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("timeout", AttributeType::Number)
                    .description("specifies a time limit in seconds for requests made by the client. This can also be set using the environment variable POWERSCALE_TIMEOUT")
                    .optional()
                    .validator(Box::new(NumberRangeValidator::between(1.0, 3600.0)))
                    .build(),
            )
            .build()
    }

    /// Resolves the client settings from the provider block, falling back to
    /// `POWERSCALE_*` environment variables for unset attributes
    fn client_config(config: &DynamicValue) -> Result<api::ClientConfig, Vec<Diagnostic>> {
        let mut diagnostics = vec![];

        let mut string_setting = |name: &str, env: &str| -> Option<String> {
            match read_field::<String>(config, name) {
                Ok(Field::Set(value)) => Some(value),
                Ok(_) => std::env::var(env).ok().filter(|v| !v.is_empty()),
                Err(e) => {
                    diagnostics.push(
                        Diagnostic::error(format!("Invalid {}", name), e.to_string())
                            .with_attribute(AttributePath::new(name)),
                    );
                    None
                }
            }
        };
        let endpoint = string_setting("endpoint", "POWERSCALE_ENDPOINT");
        let username = string_setting("username", "POWERSCALE_USERNAME");
        let password = string_setting("password", "POWERSCALE_PASSWORD");

        let insecure = match read_field::<bool>(config, "insecure") {
            Ok(Field::Set(value)) => value,
            _ => std::env::var("POWERSCALE_INSECURE")
                .ok()
                .and_then(|v| v.parse::<bool>().ok())
                .unwrap_or(false),
        };

        let timeout = match read_field::<i64>(config, "timeout") {
            Ok(Field::Set(value)) => Some(value),
            Ok(_) => std::env::var("POWERSCALE_TIMEOUT")
                .ok()
                .and_then(|v| v.parse::<i64>().ok()),
            Err(e) => {
                diagnostics.push(
                    Diagnostic::error("Invalid timeout", e.to_string())
                        .with_attribute(AttributePath::new("timeout")),
                );
                None
            }
        };
        let timeout_seconds = match timeout {
            Some(seconds) if (1..=3600).contains(&seconds) => seconds as u64,
            Some(seconds) => {
                diagnostics.push(
                    Diagnostic::error(
                        "Invalid timeout",
                        format!("timeout must be between 1 and 3600 seconds, got {}", seconds),
                    )
                    .with_attribute(AttributePath::new("timeout")),
                );
                api::client::DEFAULT_TIMEOUT_SECONDS
            }
            None => api::client::DEFAULT_TIMEOUT_SECONDS,
        };

        let missing = |name: &str, env: &str| {
            Diagnostic::error(
                format!("Missing {}", name),
                format!(
                    "{} is required, set it in the provider configuration or with the {} environment variable",
                    name, env
                ),
            )
            .with_attribute(AttributePath::new(name))
        };
        if endpoint.is_none() {
            diagnostics.push(missing("endpoint", "POWERSCALE_ENDPOINT"));
        }
        if username.is_none() {
            diagnostics.push(missing("username", "POWERSCALE_USERNAME"));
        }
        if password.is_none() {
            diagnostics.push(missing("password", "POWERSCALE_PASSWORD"));
        }

        match (endpoint, username, password) {
            (Some(endpoint), Some(username), Some(password)) if diagnostics.is_empty() => {
                let mut config = api::ClientConfig::new(endpoint, username, password);
                config.insecure = insecure;
                config.timeout_seconds = timeout_seconds;
                Ok(config)
            }
            _ => Err(diagnostics),
        }
    }
}

#[async_trait]
impl Provider for PowerscaleProvider {
    fn type_name(&self) -> &str {
        "powerscale"
    }

    async fn metadata(
        &self,
        _ctx: Context,
        _request: ProviderMetadataRequest,
    ) -> ProviderMetadataResponse {
        ProviderMetadataResponse {
            type_name: self.type_name().to_string(),
            server_capabilities: ServerCapabilities {
                plan_destroy: true,
                get_provider_schema_optional: true,
                move_resource_state: false,
            },
        }
    }

    async fn schema(&self, _ctx: Context, _request: ProviderSchemaRequest) -> ProviderSchemaResponse {
        ProviderSchemaResponse {
            schema: Self::schema_definition(),
            diagnostics: vec![],
        }
    }

    async fn meta_schema(
        &self,
        _ctx: Context,
        _request: ProviderMetaSchemaRequest,
    ) -> ProviderMetaSchemaResponse {
        ProviderMetaSchemaResponse {
            schema: None,
            diagnostics: vec![],
        }
    }

    async fn configure(
        &mut self,
        _ctx: Context,
        request: ConfigureProviderRequest,
    ) -> ConfigureProviderResponse {
        init_logging();
        tracing::info!("Configuring PowerScale provider");

        let config = match Self::client_config(&request.config) {
            Ok(config) => config,
            Err(diagnostics) => {
                return ConfigureProviderResponse {
                    diagnostics,
                    provider_data: None,
                }
            }
        };
        tracing::debug!(
            "Connecting to {} as {} (insecure: {})",
            config.endpoint,
            config.username,
            config.insecure
        );

        match api::Client::new(config) {
            Ok(client) => {
                let data = PowerscaleProviderData::new(client);
                ConfigureProviderResponse {
                    diagnostics: vec![],
                    provider_data: Some(Arc::new(data)),
                }
            }
            Err(e) => ConfigureProviderResponse {
                diagnostics: vec![Diagnostic::error(
                    "Unable to create PowerScale client",
                    e.to_string(),
                )],
                provider_data: None,
            },
        }
    }

    async fn validate(
        &self,
        _ctx: Context,
        request: ValidateProviderConfigRequest,
    ) -> ValidateProviderConfigResponse {
        ValidateProviderConfigResponse {
            diagnostics: Self::schema_definition().validate(&request.config),
        }
    }

    async fn stop(&self, _ctx: Context, _request: StopProviderRequest) -> StopProviderResponse {
        StopProviderResponse { error: None }
    }

    fn resources(&self) -> HashMap<String, ResourceFactory> {
        let mut factories: HashMap<String, ResourceFactory> = HashMap::new();
        factories.insert(
            "powerscale_s3_global_setting".to_string(),
            Box::new(|| {
                Box::new(resources::S3GlobalSettingResource::new()) as Box<dyn ResourceWithConfigure>
            }),
        );
        factories.insert(
            "powerscale_ldap_provider".to_string(),
            Box::new(|| {
                Box::new(resources::LdapProviderResource::new()) as Box<dyn ResourceWithConfigure>
            }),
        );
        factories.insert(
            "powerscale_writable_snapshot".to_string(),
            Box::new(|| {
                Box::new(resources::WritableSnapshotResource::new()) as Box<dyn ResourceWithConfigure>
            }),
        );
        factories.insert(
            "powerscale_smartpool_settings".to_string(),
            Box::new(|| {
                Box::new(resources::SmartpoolSettingsResource::new()) as Box<dyn ResourceWithConfigure>
            }),
        );
        factories
    }

    fn data_sources(&self) -> HashMap<String, DataSourceFactory> {
        let mut factories: HashMap<String, DataSourceFactory> = HashMap::new();
        factories.insert(
            "powerscale_network_settings".to_string(),
            Box::new(|| {
                Box::new(data_sources::NetworkSettingsDataSource::new())
                    as Box<dyn DataSourceWithConfigure>
            }),
        );
        factories.insert(
            "powerscale_smartpool_settings".to_string(),
            Box::new(|| {
                Box::new(data_sources::SmartpoolSettingsDataSource::new())
                    as Box<dyn DataSourceWithConfigure>
            }),
        );
        factories
    }
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tfplug::types::ClientCapabilities;

    const ENV_VARS: &[&str] = &[
        "POWERSCALE_ENDPOINT",
        "POWERSCALE_USERNAME",
        "POWERSCALE_PASSWORD",
        "POWERSCALE_INSECURE",
        "POWERSCALE_TIMEOUT",
    ];

    fn clear_env() {
        for name in ENV_VARS {
            std::env::remove_var(name);
        }
    }

    fn configure_request(json: &str) -> ConfigureProviderRequest {
        ConfigureProviderRequest {
            terraform_version: "1.9.0".to_string(),
            config: DynamicValue::decode_json(json.as_bytes()).unwrap(),
            client_capabilities: ClientCapabilities::default(),
        }
    }

    #[tokio::test]
    #[serial]
    async fn provider_configures_successfully_with_env_vars() {
        clear_env();
        std::env::set_var("POWERSCALE_ENDPOINT", "https://localhost:8080");
        std::env::set_var("POWERSCALE_USERNAME", "admin");
        std::env::set_var("POWERSCALE_PASSWORD", "secret");
        std::env::set_var("POWERSCALE_INSECURE", "true");

        let mut provider = PowerscaleProvider::new();
        let response = provider
            .configure(Context::new(), configure_request("{}"))
            .await;
        assert!(response.diagnostics.is_empty());
        assert!(PowerscaleProviderData::from_configure(response.provider_data, "provider").is_ok());

        clear_env();
    }

    #[tokio::test]
    #[serial]
    async fn config_block_overrides_env_vars() {
        clear_env();
        std::env::set_var("POWERSCALE_ENDPOINT", "not a url");

        let config = PowerscaleProvider::client_config(
            &DynamicValue::decode_json(
                br#"{"endpoint": "https://cluster:8080", "username": "admin", "password": "secret", "timeout": 120}"#,
            )
            .unwrap(),
        )
        .unwrap();
        assert_eq!(config.endpoint, "https://cluster:8080");
        assert_eq!(config.timeout_seconds, 120);
        assert!(!config.insecure);

        clear_env();
    }

    #[tokio::test]
    #[serial]
    async fn provider_configure_reports_every_missing_setting() {
        clear_env();

        let mut provider = PowerscaleProvider::new();
        let response = provider
            .configure(Context::new(), configure_request(r#"{"endpoint": "https://cluster:8080"}"#))
            .await;
        let summaries: Vec<&str> = response
            .diagnostics
            .iter()
            .map(|d| d.summary.as_str())
            .collect();
        assert_eq!(summaries, vec!["Missing username", "Missing password"]);
        assert!(response.provider_data.is_none());
    }

    #[tokio::test]
    #[serial]
    async fn timeout_out_of_range_is_rejected() {
        clear_env();
        std::env::set_var("POWERSCALE_TIMEOUT", "0");

        let result = PowerscaleProvider::client_config(
            &DynamicValue::decode_json(
                br#"{"endpoint": "https://cluster:8080", "username": "admin", "password": "secret"}"#,
            )
            .unwrap(),
        );
        let diagnostics = result.unwrap_err();
        assert_eq!(diagnostics[0].summary, "Invalid timeout");

        clear_env();
    }

    #[tokio::test]
    #[serial]
    async fn invalid_endpoint_fails_client_creation() {
        let mut provider = PowerscaleProvider::new();
        let response = provider
            .configure(
                Context::new(),
                configure_request(
                    r#"{"endpoint": "ftp://cluster", "username": "admin", "password": "secret"}"#,
                ),
            )
            .await;
        assert_eq!(response.diagnostics.len(), 1);
        assert_eq!(response.diagnostics[0].summary, "Unable to create PowerScale client");
    }

    #[test]
    fn factories_match_type_names() {
        let provider = PowerscaleProvider::new();
        for (name, factory) in provider.resources() {
            assert_eq!(factory().type_name(), name);
        }
        for (name, factory) in provider.data_sources() {
            assert_eq!(factory().type_name(), name);
        }
        assert_eq!(provider.resources().len(), 4);
        assert_eq!(provider.data_sources().len(), 2);
    }

    #[test]
    fn password_is_sensitive() {
        let schema = PowerscaleProvider::schema_definition();
        assert!(schema.attribute("password").unwrap().sensitive);
    }
}
