use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::OnceCell;

use super::common::{ApiErrorDetails, ApiErrorResponse, ApiQueryParams};
use super::error::ApiError;
use crate::version::OnefsVersion;

pub const DEFAULT_TIMEOUT_SECONDS: u64 = 60;

/// Connection settings resolved from the provider block
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub endpoint: String,
    pub username: String,
    pub password: String,
    pub insecure: bool,
    pub timeout_seconds: u64,
}

impl ClientConfig {
    pub fn new(
        endpoint: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            endpoint: endpoint.into(),
            username: username.into(),
            password: password.into(),
            insecure: false,
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
        }
    }
}

/// OneFS platform API client
///
/// Cheap to clone; clones share the HTTP connection pool and the cached
/// cluster version.
#[derive(Clone)]
pub struct Client {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    http_client: reqwest::Client,
    base_url: String,
    username: String,
    password: String,
    timeout_seconds: u64,
    onefs_version: OnceCell<OnefsVersion>,
}

impl Client {
    pub fn new(config: ClientConfig) -> Result<Self, ApiError> {
        let url = url::Url::parse(&config.endpoint)
            .map_err(|_| ApiError::InvalidEndpoint(config.endpoint.clone()))?;
        if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
            return Err(ApiError::InvalidEndpoint(config.endpoint));
        }

        let http_client = reqwest::Client::builder()
            .danger_accept_invalid_certs(config.insecure)
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self {
            inner: Arc::new(ClientInner {
                http_client,
                base_url: config.endpoint.trim_end_matches('/').to_string(),
                username: config.username,
                password: config.password,
                timeout_seconds: config.timeout_seconds,
                onefs_version: OnceCell::new(),
            }),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    /// Execute a GET request
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let text = self.execute::<()>(Method::GET, path, None).await?;
        parse_body(&text)
    }

    /// Execute a POST request. The body of a successful response is not
    /// parsed; created objects are read back by their natural key.
    pub async fn post<B: Serialize>(&self, path: &str, body: &B) -> Result<(), ApiError> {
        self.execute(Method::POST, path, Some(body)).await.map(|_| ())
    }

    pub async fn post_with_params<B: Serialize>(
        &self,
        path: &str,
        params: &ApiQueryParams,
        body: &B,
    ) -> Result<(), ApiError> {
        let full_path = format!("{}{}", path, params.to_query_string());
        self.post(&full_path, body).await
    }

    /// Execute a PUT request; OneFS answers updates with an empty body
    pub async fn put<B: Serialize>(&self, path: &str, body: &B) -> Result<(), ApiError> {
        self.execute(Method::PUT, path, Some(body)).await.map(|_| ())
    }

    pub async fn put_with_params<B: Serialize>(
        &self,
        path: &str,
        params: &ApiQueryParams,
        body: &B,
    ) -> Result<(), ApiError> {
        let full_path = format!("{}{}", path, params.to_query_string());
        self.put(&full_path, body).await
    }

    /// Execute a DELETE request
    pub async fn delete(&self, path: &str) -> Result<(), ApiError> {
        self.execute::<()>(Method::DELETE, path, None)
            .await
            .map(|_| ())
    }

    /// OneFS release of the cluster, fetched on first use and cached for the
    /// lifetime of the client
    pub async fn onefs_version(&self) -> Result<OnefsVersion, ApiError> {
        self.inner
            .onefs_version
            .get_or_try_init(|| async {
                let config = self.cluster().config().await?;
                let version = OnefsVersion::parse(&config.onefs_version.release)
                    .map_err(|e| ApiError::ParseError(e.to_string()))?;
                tracing::info!("Detected OneFS version {}", version);
                Ok::<_, ApiError>(version)
            })
            .await
            .copied()
    }

    /// Cluster identity and version
    pub fn cluster(&self) -> crate::api::cluster::ClusterApi<'_> {
        crate::api::cluster::ClusterApi::new(self)
    }

    /// Protocol settings (S3)
    pub fn protocols(&self) -> crate::api::protocols::ProtocolsApi<'_> {
        crate::api::protocols::ProtocolsApi::new(self)
    }

    /// Authentication providers (LDAP)
    pub fn auth(&self) -> crate::api::auth::AuthApi<'_> {
        crate::api::auth::AuthApi::new(self)
    }

    /// Snapshots (writable snapshots)
    pub fn snapshot(&self) -> crate::api::snapshot::SnapshotApi<'_> {
        crate::api::snapshot::SnapshotApi::new(self)
    }

    /// Storage pool settings
    pub fn storagepool(&self) -> crate::api::storagepool::StoragepoolApi<'_> {
        crate::api::storagepool::StoragepoolApi::new(self)
    }

    /// External network settings
    pub fn network(&self) -> crate::api::network::NetworkApi<'_> {
        crate::api::network::NetworkApi::new(self)
    }

    /// Sends one request and returns the body of a successful response.
    /// Failures are returned as they happen; nothing is retried.
    async fn execute<B: Serialize>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<String, ApiError> {
        let url = format!("{}{}", self.inner.base_url, path);
        tracing::debug!("{} request to: {}", method, url);

        let mut request = self
            .inner
            .http_client
            .request(method, &url)
            .basic_auth(&self.inner.username, Some(&self.inner.password));
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                ApiError::Timeout(self.inner.timeout_seconds)
            } else {
                ApiError::RequestError(e)
            }
        })?;

        let status = response.status();
        tracing::debug!("Response status: {}", status);

        if status.is_success() {
            let text = response.text().await?;
            tracing::debug!("API response body: {}", text);
            return Ok(text);
        }

        if status == StatusCode::UNAUTHORIZED {
            return Err(ApiError::AuthError);
        }

        Err(self.handle_error_response(response).await)
    }

    async fn handle_error_response(&self, response: reqwest::Response) -> ApiError {
        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());

        let details = serde_json::from_str::<ApiErrorResponse>(&text)
            .ok()
            .filter(|body| !body.errors.is_empty())
            .map(|body| {
                Box::new(ApiErrorDetails {
                    errors: body.errors,
                })
            });

        let message = details
            .as_ref()
            .and_then(|d| d.first_message())
            .map(str::to_string)
            .unwrap_or(text);

        ApiError::ApiError {
            status,
            message,
            details,
        }
    }
}

/// Parses a success body; an empty body reads as JSON `null`
fn parse_body<T: DeserializeOwned>(text: &str) -> Result<T, ApiError> {
    let text = if text.trim().is_empty() { "null" } else { text };
    serde_json::from_str::<T>(text).map_err(|e| {
        tracing::error!("Failed to deserialize response: {}, body: {}", e, text);
        ApiError::ParseError(format!("Failed to parse response: {}", e))
    })
}
