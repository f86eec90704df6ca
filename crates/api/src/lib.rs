//! Workflow Automator API client.
//!
//! This crate provides a thin, typed client for the automation backend. It
//! focuses on:
//!
//! - Constructing an HTTP client against a validated base URL
//! - One method per backend capability, grouped behind [`WorkflowApi`]
//! - Surfacing every non-2xx response as an [`ApiError`] naming the endpoint
//!
//! There is no retry and no caching. Callers decide what a failure means.
//!
//! # Example
//!
//! ```ignore
//! use automator_api::{AutomatorClient, WorkflowApi};
//!
//! async fn check() -> Result<(), automator_api::ApiError> {
//!     let client = AutomatorClient::new("http://127.0.0.1:8000", None)?;
//!     println!("healthy: {}", client.check_health().await);
//!     Ok(())
//! }
//! ```

mod error;

use std::env;
use std::time::Duration;

use async_trait::async_trait;
use automator_types::{
    ExecutionSummary, ExtractedRecord, ItemsEnvelope, SubmitRequest, SubmitResponse, WorkflowRun, WorkflowSummary,
};
use automator_util::{AutomatorConfig, redact_parameters, redact_sensitive};
use indexmap::IndexMap;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use reqwest::{Client, Method, RequestBuilder, Response, Url, header};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

pub use error::{ApiError, Endpoint};

/// Characters left intact when encoding a path segment; matches
/// `encodeURIComponent`.
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Hostnames treated as local, where plain http is expected.
const LOCALHOST_DOMAINS: &[&str] = &["localhost", "127.0.0.1", "::1", "[::1]"];

/// Backend capabilities consumed by the polling controller and list pages.
///
/// [`AutomatorClient`] is the production implementation; tests substitute
/// scripted fakes.
#[async_trait]
pub trait WorkflowApi: Send + Sync {
    /// Submit a workflow description with pass-through parameters.
    async fn submit_workflow(
        &self,
        description: &str,
        parameters: &IndexMap<String, String>,
    ) -> Result<SubmitResponse, ApiError>;

    /// Fetch the latest snapshot of a run. The returned run carries `workflow_id`.
    async fn fetch_status(&self, workflow_id: &str) -> Result<WorkflowRun, ApiError>;

    /// `true` only for a 2xx from `/health`; never fails.
    async fn check_health(&self) -> bool;

    async fn list_workflows(&self) -> Result<ItemsEnvelope<WorkflowSummary>, ApiError>;

    async fn list_executions(&self) -> Result<ItemsEnvelope<ExecutionSummary>, ApiError>;

    async fn get_execution(&self, workflow_id: &str) -> Result<WorkflowRun, ApiError>;

    async fn list_extracted(&self) -> Result<ItemsEnvelope<ExtractedRecord>, ApiError>;

    /// Clear all backend in-memory state.
    async fn reset(&self) -> Result<(), ApiError>;
}

#[derive(Debug, Clone)]
/// Thin wrapper around a configured `reqwest::Client` for the automation backend.
pub struct AutomatorClient {
    base_url: String,
    http: Client,
    user_agent: String,
}

impl AutomatorClient {
    /// Build a client for `base_url`.
    ///
    /// No request timeout is set, so the platform default applies.
    /// `connect_timeout` bounds only the TCP connect.
    pub fn new(base_url: &str, connect_timeout: Option<Duration>) -> Result<Self, ApiError> {
        let base_url = validate_base_url(base_url)?;

        let mut default_headers = header::HeaderMap::new();
        default_headers.insert(header::ACCEPT, header::HeaderValue::from_static("application/json"));

        let mut builder = Client::builder().default_headers(default_headers);
        if let Some(timeout) = connect_timeout {
            builder = builder.connect_timeout(timeout);
        }
        let http = builder.build().map_err(ApiError::ClientBuild)?;

        Ok(Self {
            base_url,
            http,
            user_agent: format!("workflow-automator/{}; {}", env!("CARGO_PKG_VERSION"), env::consts::OS),
        })
    }

    /// Build a client from resolved configuration.
    pub fn from_config(config: &AutomatorConfig) -> Result<Self, ApiError> {
        Self::new(&config.api_base, config.connect_timeout)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build a `reqwest::RequestBuilder` for a method and base-relative path.
    pub fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        debug!(%method, url = %redact_sensitive(&url), "building request");

        self.http
            .request(method, url)
            .header(header::USER_AGENT, &self.user_agent)
    }

    async fn send(&self, endpoint: Endpoint, builder: RequestBuilder) -> Result<Response, ApiError> {
        let response = builder
            .send()
            .await
            .map_err(|source| ApiError::Network { endpoint, source })?;
        let status = response.status();
        if !status.is_success() {
            debug!(%endpoint, status = status.as_u16(), "request failed");
            return Err(ApiError::Http {
                endpoint,
                status: status.as_u16(),
            });
        }
        Ok(response)
    }

    async fn send_value(&self, endpoint: Endpoint, builder: RequestBuilder) -> Result<Value, ApiError> {
        let response = self.send(endpoint, builder).await?;
        let bytes = response
            .bytes()
            .await
            .map_err(|source| ApiError::Network { endpoint, source })?;
        serde_json::from_slice(&bytes).map_err(|source| ApiError::Decode { endpoint, source })
    }

    async fn send_json<T: DeserializeOwned>(&self, endpoint: Endpoint, builder: RequestBuilder) -> Result<T, ApiError> {
        let value = self.send_value(endpoint, builder).await?;
        serde_json::from_value(value).map_err(|source| ApiError::Decode { endpoint, source })
    }

    /// Decode a run snapshot, turning the backend's `{"error": ...}` answer
    /// for unknown ids into a failure.
    async fn send_run(&self, endpoint: Endpoint, builder: RequestBuilder, workflow_id: &str) -> Result<WorkflowRun, ApiError> {
        let value = self.send_value(endpoint, builder).await?;
        if let Some(message) = backend_error_message(&value) {
            return Err(ApiError::Backend { endpoint, message });
        }
        let mut run: WorkflowRun = serde_json::from_value(value).map_err(|source| ApiError::Decode { endpoint, source })?;
        run.workflow_id = workflow_id.to_string();
        Ok(run)
    }
}

#[async_trait]
impl WorkflowApi for AutomatorClient {
    async fn submit_workflow(
        &self,
        description: &str,
        parameters: &IndexMap<String, String>,
    ) -> Result<SubmitResponse, ApiError> {
        debug!(parameters = ?redact_parameters(parameters), "submitting workflow");
        let body = SubmitRequest {
            description: description.to_string(),
            parameters: parameters.clone(),
        };
        let builder = self.request(Method::POST, "/api/workflows/execute").json(&body);
        self.send_json(Endpoint::Execute, builder).await
    }

    async fn fetch_status(&self, workflow_id: &str) -> Result<WorkflowRun, ApiError> {
        let path = format!("/api/workflows/{}/status", encode_segment(workflow_id));
        let builder = self.request(Method::GET, &path);
        self.send_run(Endpoint::Status, builder, workflow_id).await
    }

    async fn check_health(&self) -> bool {
        match self.send(Endpoint::Health, self.request(Method::GET, "/health")).await {
            Ok(_) => true,
            Err(error) => {
                debug!(error = %error.redacted(), "health check failed");
                false
            }
        }
    }

    async fn list_workflows(&self) -> Result<ItemsEnvelope<WorkflowSummary>, ApiError> {
        let builder = self.request(Method::GET, "/api/workflows");
        self.send_json(Endpoint::ListWorkflows, builder).await
    }

    async fn list_executions(&self) -> Result<ItemsEnvelope<ExecutionSummary>, ApiError> {
        let builder = self.request(Method::GET, "/api/executions");
        self.send_json(Endpoint::ListExecutions, builder).await
    }

    async fn get_execution(&self, workflow_id: &str) -> Result<WorkflowRun, ApiError> {
        let path = format!("/api/executions/{}", encode_segment(workflow_id));
        let builder = self.request(Method::GET, &path);
        self.send_run(Endpoint::GetExecution, builder, workflow_id).await
    }

    async fn list_extracted(&self) -> Result<ItemsEnvelope<ExtractedRecord>, ApiError> {
        let builder = self.request(Method::GET, "/api/extracted");
        self.send_json(Endpoint::ListExtracted, builder).await
    }

    async fn reset(&self) -> Result<(), ApiError> {
        self.send(Endpoint::Reset, self.request(Method::POST, "/api/reset"))
            .await
            .map(|_| ())
    }
}

fn encode_segment(segment: &str) -> String {
    utf8_percent_encode(segment, PATH_SEGMENT).to_string()
}

/// Extract the message of an `{"error": "..."}` body that carries no status.
fn backend_error_message(value: &Value) -> Option<String> {
    let object = value.as_object()?;
    if object.contains_key("status") {
        return None;
    }
    object.get("error").map(|error| match error {
        Value::String(message) => message.clone(),
        other => other.to_string(),
    })
}

/// Validate and normalize a base URL.
///
/// Rules:
/// - must parse, use `http` or `https`, and include a host
/// - plain `http` towards a non-local host is allowed but logged, since
///   credentials travel in submission bodies
/// - trailing slashes are trimmed
fn validate_base_url(base: &str) -> Result<String, ApiError> {
    let trimmed = base.trim().trim_end_matches('/');
    let invalid = |reason: String| ApiError::InvalidBaseUrl {
        url: base.to_string(),
        reason,
    };
    let parsed = Url::parse(trimmed).map_err(|error| invalid(error.to_string()))?;

    let scheme = parsed.scheme();
    if scheme != "http" && scheme != "https" {
        return Err(invalid(format!("unsupported scheme '{scheme}://'")));
    }
    let host_name = parsed.host_str().ok_or_else(|| invalid("missing host".to_string()))?;

    if is_insecure_remote(&parsed) {
        warn!(host = host_name, "API base uses plain http for a non-local host");
    }

    Ok(trimmed.to_string())
}

/// Plain `http` towards a host other than this machine.
fn is_insecure_remote(url: &Url) -> bool {
    url.scheme() == "http"
        && url
            .host_str()
            .is_some_and(|host| !LOCALHOST_DOMAINS.iter().any(|&local| host.eq_ignore_ascii_case(local)))
}
