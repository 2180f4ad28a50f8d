//! API configuration
//!
//! Loaded from `API_*` environment variables (a `.env` file is read first by
//! the server binary). Every field has a default suitable for local runs.

use std::fmt;
use std::time::Duration;

use serde::Deserialize;

use claims_pipeline::{AuditPolicy, PipelineConfig};
use core_kernel::{ExternalAuthConfig, ExternalSystemConfig};

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// API configuration
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// JWT secret for authentication
    pub jwt_secret: String,
    /// JWT expiration in seconds
    pub jwt_expiration_secs: u64,
    /// Log level or `EnvFilter` directive
    pub log_level: String,
    pub log_format: LogFormat,
    /// Append-only audit log file
    pub audit_log_path: String,
    /// Base64 encoded 256-bit audit key; a process-local key is generated
    /// when absent
    pub audit_key: Option<String>,
    pub audit_timeout_ms: u64,
    pub audit_policy: AuditPolicy,
    /// Base URL the workflow webhook paths are appended to
    pub webhook_base_url: String,
    pub webhook_token: Option<String>,
    pub dispatch_timeout_ms: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            jwt_secret: "change-me-in-production".to_string(),
            jwt_expiration_secs: 3600,
            log_level: "info".to_string(),
            log_format: LogFormat::Text,
            audit_log_path: "audit.log".to_string(),
            audit_key: None,
            audit_timeout_ms: 5_000,
            audit_policy: AuditPolicy::BestEffort,
            webhook_base_url: "http://localhost:5678/webhook".to_string(),
            webhook_token: None,
            dispatch_timeout_ms: 30_000,
        }
    }
}

impl ApiConfig {
    /// Loads configuration from environment
    pub fn from_env() -> Result<Self, config::ConfigError> {
        Self::from_environment(Self::environment())
    }

    /// Environment source: `API_` prefix, `__` between nested keys
    pub fn environment() -> config::Environment {
        config::Environment::with_prefix("API")
            .prefix_separator("_")
            .separator("__")
    }

    pub fn from_environment(environment: config::Environment) -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(environment)
            .build()?
            .try_deserialize()
    }

    /// Returns the server address
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn dispatch_timeout(&self) -> Duration {
        Duration::from_millis(self.dispatch_timeout_ms)
    }

    pub fn audit_timeout(&self) -> Duration {
        Duration::from_millis(self.audit_timeout_ms)
    }

    pub fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig::default()
            .with_dispatch_timeout(self.dispatch_timeout())
            .with_audit_policy(self.audit_policy)
    }

    /// Connection settings for the workflow engine webhooks
    pub fn webhook_system_config(&self) -> ExternalSystemConfig {
        let mut system = ExternalSystemConfig::new(self.webhook_base_url.clone());
        system.timeout_ms = self.dispatch_timeout_ms;
        if let Some(token) = &self.webhook_token {
            system.auth = ExternalAuthConfig::BearerToken {
                token: token.clone(),
            };
        }
        system
    }
}

impl fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("jwt_secret", &"<redacted>")
            .field("jwt_expiration_secs", &self.jwt_expiration_secs)
            .field("log_level", &self.log_level)
            .field("log_format", &self.log_format)
            .field("audit_log_path", &self.audit_log_path)
            .field("audit_key", &self.audit_key.as_ref().map(|_| "<redacted>"))
            .field("audit_timeout_ms", &self.audit_timeout_ms)
            .field("audit_policy", &self.audit_policy)
            .field("webhook_base_url", &self.webhook_base_url)
            .field("webhook_token", &self.webhook_token.as_ref().map(|_| "<redacted>"))
            .field("dispatch_timeout_ms", &self.dispatch_timeout_ms)
            .finish()
    }
}
