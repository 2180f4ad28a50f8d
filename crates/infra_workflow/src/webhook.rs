//! HTTP webhook dispatcher
//!
//! Posts each dispatch payload as JSON to the workflow's webhook and turns
//! the engine's response into a `WorkflowAck` or a `PortError`. There is no
//! retry here; one dispatch is one request.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use tracing::{info, warn};

use core_kernel::{DomainPort, ExternalAuthConfig, ExternalSystemConfig, PortError};
use domain_claims::{WorkflowAck, WorkflowDispatch, WorkflowDispatcher};

use crate::catalog::WorkflowCatalog;

/// Header carrying the workflow name
pub const WORKFLOW_HEADER: &str = "X-Workflow-Name";

/// Header carrying the dispatch correlation id
pub const CORRELATION_HEADER: &str = "X-Correlation-Id";

/// Workflow dispatcher backed by HTTP webhooks
#[derive(Debug)]
pub struct WebhookDispatcher {
    client: Client,
    config: ExternalSystemConfig,
    catalog: WorkflowCatalog,
}

impl WebhookDispatcher {
    /// Creates a dispatcher
    ///
    /// # Errors
    ///
    /// Returns `PortError::Internal` if the HTTP client cannot be built.
    pub fn new(config: ExternalSystemConfig, catalog: WorkflowCatalog) -> Result<Self, PortError> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| PortError::Internal {
                message: "failed to build webhook client".to_string(),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            config,
            catalog,
        })
    }

    fn webhook_url(&self, webhook_path: &str) -> String {
        format!(
            "{}/{}",
            self.config.base_url.trim_end_matches('/'),
            webhook_path.trim_start_matches('/')
        )
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.config.auth {
            ExternalAuthConfig::None => request,
            ExternalAuthConfig::BearerToken { token } => request.bearer_auth(token),
            ExternalAuthConfig::ApiKey { header_name, key } => request.header(header_name.as_str(), key.as_str()),
        }
    }

    fn transport_error(&self, error: reqwest::Error, url: &str) -> PortError {
        if error.is_timeout() {
            PortError::timeout(url, self.config.timeout_ms)
        } else if error.is_connect() {
            PortError::Connection {
                message: format!("Cannot connect to {}", url),
                source: Some(Box::new(error)),
            }
        } else {
            PortError::Internal {
                message: format!("Webhook request to {} failed", url),
                source: Some(Box::new(error)),
            }
        }
    }
}

impl DomainPort for WebhookDispatcher {}

#[async_trait]
impl WorkflowDispatcher for WebhookDispatcher {
    async fn dispatch(&self, dispatch: WorkflowDispatch) -> Result<WorkflowAck, PortError> {
        let definition = self
            .catalog
            .get(&dispatch.workflow_name)
            .ok_or_else(|| PortError::not_found("Workflow", &dispatch.workflow_name))?;
        let url = self.webhook_url(&definition.webhook_path);

        let mut request = self
            .client
            .post(&url)
            .header(WORKFLOW_HEADER, dispatch.workflow_name.as_str())
            .header(CORRELATION_HEADER, dispatch.correlation_id.to_string())
            .json(&dispatch.payload);
        for (name, value) in &self.config.headers {
            request = request.header(name.as_str(), value.as_str());
        }
        let request = self.authorize(request);

        let response = request
            .send()
            .await
            .map_err(|e| self.transport_error(e, &url))?;

        let status = response.status();
        let retry_after = response
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse().ok());
        let body = response
            .text()
            .await
            .map_err(|e| self.transport_error(e, &url))?;

        if status.is_success() {
            info!(
                workflow = %dispatch.workflow_name,
                correlation_id = %dispatch.correlation_id,
                status = status.as_u16(),
                "Workflow webhook accepted dispatch"
            );
            Ok(acknowledgement(status, body))
        } else {
            warn!(
                workflow = %dispatch.workflow_name,
                correlation_id = %dispatch.correlation_id,
                status = status.as_u16(),
                "Workflow webhook rejected dispatch"
            );
            Err(map_status(status, &url, &body, retry_after))
        }
    }
}

/// Wraps a success body; non-JSON bodies are kept verbatim
fn acknowledgement(status: StatusCode, body: String) -> WorkflowAck {
    match serde_json::from_str::<Value>(&body) {
        Ok(value) => WorkflowAck::new(value),
        Err(_) => WorkflowAck::new(json!({ "status": status.as_u16(), "body": body })),
    }
}

/// Maps a non-success webhook status to a port error
pub(crate) fn map_status(
    status: StatusCode,
    url: &str,
    body: &str,
    retry_after_secs: Option<u64>,
) -> PortError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => PortError::Unauthorized {
            message: format!("Webhook {} refused credentials ({})", url, status.as_u16()),
        },
        StatusCode::NOT_FOUND => PortError::not_found("Webhook", url),
        StatusCode::TOO_MANY_REQUESTS => PortError::RateLimited {
            retry_after_secs: retry_after_secs.unwrap_or(60),
        },
        s if s.is_server_error() => PortError::ServiceUnavailable {
            service: format!("{} ({})", url, s.as_u16()),
        },
        s => PortError::internal(format!("Webhook failed ({}): {}", s.as_u16(), body)),
    }
}
