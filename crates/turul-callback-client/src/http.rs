//! reqwest-backed orchestrator client

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use tracing::{debug, error, warn};
use url::Url;

use crate::api::{ApiMethod, ApiResponse, OrchestratorApi, RequestBody, CONTENT_TYPE_JSON};
use crate::config::ClientConfig;
use crate::credential::Credential;
use crate::error::{ClientError, ClientResult};

/// Orchestrator client over a shared reqwest connection pool.
///
/// The underlying `reqwest::Client` carries no default authorization or
/// content headers; every call builds its own header set.
#[derive(Debug, Clone)]
pub struct HttpOrchestratorClient {
    client: Client,
}

impl HttpOrchestratorClient {
    /// Create a client from configuration
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        let mut builder = Client::builder()
            .timeout(config.timeouts.request)
            .connect_timeout(config.timeouts.connect)
            .pool_max_idle_per_host(config.connection.max_idle_per_host)
            .pool_idle_timeout(config.connection.idle_timeout);

        if let Some(user_agent) = &config.connection.user_agent {
            builder = builder.user_agent(user_agent.as_str());
        }

        let client = builder
            .build()
            .map_err(|e| ClientError::config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client })
    }

    /// Create with a custom reqwest client
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    async fn send(
        &self,
        method: ApiMethod,
        url: &Url,
        body: Option<&RequestBody>,
        credential: &Credential,
    ) -> ClientResult<ApiResponse> {
        let reqwest_method = match method {
            ApiMethod::Get => reqwest::Method::GET,
            ApiMethod::Post => reqwest::Method::POST,
            ApiMethod::Patch => reqwest::Method::PATCH,
        };

        let mut request = self
            .client
            .request(reqwest_method, url.clone())
            .header(ACCEPT, CONTENT_TYPE_JSON);

        request = match credential {
            Credential::Bearer(token) => request.bearer_auth(token),
            Credential::Basic { password } => request.basic_auth("", Some(password)),
        };

        if let Some(body) = body {
            request = request
                .header(CONTENT_TYPE, body.content_type)
                .body(serde_json::to_vec(&body.json)?);
        }

        debug!(%method, url = %url, scheme = ?credential.scheme(), "Sending orchestrator request");

        let response = match request.send().await {
            Ok(response) => response,
            Err(err) => {
                error!(%method, url = %url, error = %err, "Orchestrator request failed before a response");
                return Err(ClientError::Transport(err));
            }
        };

        let status = response.status().as_u16();
        let text = match response.text().await {
            Ok(text) => text,
            Err(err) => {
                error!(%method, url = %url, status, error = %err, "Failed to read orchestrator response body");
                return Err(ClientError::Transport(err));
            }
        };

        let api_response = ApiResponse::new(status, text);
        if api_response.is_success() {
            debug!(%method, url = %url, status, "Orchestrator request succeeded");
        } else {
            warn!(
                %method,
                url = %url,
                status,
                body = %api_response.body,
                "Orchestrator returned non-success status"
            );
        }

        Ok(api_response)
    }
}

#[async_trait]
impl OrchestratorApi for HttpOrchestratorClient {
    async fn get(&self, url: &Url, credential: &Credential) -> ClientResult<ApiResponse> {
        self.send(ApiMethod::Get, url, None, credential).await
    }

    async fn post(
        &self,
        url: &Url,
        body: &RequestBody,
        credential: &Credential,
    ) -> ClientResult<ApiResponse> {
        self.send(ApiMethod::Post, url, Some(body), credential).await
    }

    async fn patch(
        &self,
        url: &Url,
        body: &RequestBody,
        credential: &Credential,
    ) -> ClientResult<ApiResponse> {
        self.send(ApiMethod::Patch, url, Some(body), credential).await
    }
}
