//! Provider data structure passed to resources and data sources

use crate::api::Client;
use std::any::Any;
use std::sync::Arc;
use tfplug::types::Diagnostic;

#[derive(Clone)]
pub struct PowerscaleProviderData {
    pub client: Arc<Client>,
}

impl PowerscaleProviderData {
    pub fn new(client: Client) -> Self {
        Self {
            client: Arc::new(client),
        }
    }

    /// Recovers the provider data handed to a resource or data source
    /// `configure` call; `kind` names the receiver in diagnostics.
    pub fn from_configure(
        data: Option<Arc<dyn Any + Send + Sync>>,
        kind: &str,
    ) -> Result<Self, Diagnostic> {
        match data {
            Some(data) => match data.downcast_ref::<PowerscaleProviderData>() {
                Some(provider_data) => Ok(provider_data.clone()),
                None => {
                    tracing::error!("Provider data type id: {:?}", (*data).type_id());
                    Err(Diagnostic::error(
                        "Invalid provider data",
                        "Failed to extract PowerscaleProviderData from provider data",
                    ))
                }
            },
            None => Err(Diagnostic::error(
                "No provider data",
                format!("No provider data was provided to the {}", kind),
            )),
        }
    }
}

/// Diagnostic for operations invoked before `configure`
pub fn not_configured() -> Diagnostic {
    Diagnostic::error(
        "Provider not configured",
        "Provider data was not properly configured",
    )
}
