//! Ports and Adapters Infrastructure
//!
//! Foundational types for the hexagonal architecture used by the claims
//! compliance workspace. Collaborators the core does not own (the workflow
//! engine, the audit store) are reached through port traits defined in the
//! domain crates; adapters implement those traits.
//!
//! # Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      Claim Pipeline                          │
//! │          authorize → validate → dispatch → audit             │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       Port Traits                            │
//! │        (WorkflowDispatcher, AuditSink, AuditCipher)          │
//! └─────────────────────────────────────────────────────────────┘
//!                    ▲                         ▲
//!                    │                         │
//!         ┌─────────┴─────────┐     ┌────────┴────────┐
//!         │  HTTP Webhook     │     │  File / Memory   │
//!         │  (infra_workflow) │     │  (infra_audit)   │
//!         └───────────────────┘     └──────────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! #[async_trait]
//! pub trait WorkflowDispatcher: DomainPort {
//!     async fn dispatch(&self, dispatch: WorkflowDispatch) -> Result<WorkflowAck, PortError>;
//! }
//! ```

use std::fmt;
use thiserror::Error;
use serde::{Deserialize, Serialize};

/// Error type for port operations
///
/// Provides a unified error type that all port implementations must use,
/// ensuring consistent error handling across adapters.
#[derive(Debug, Error)]
pub enum PortError {
    /// The requested entity was not found
    #[error("Not found: {entity_type} with id {id}")]
    NotFound {
        entity_type: String,
        id: String,
    },

    /// Connection to the underlying system failed
    #[error("Connection error: {message}")]
    Connection {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The operation timed out
    #[error("Timeout after {duration_ms}ms: {operation}")]
    Timeout {
        operation: String,
        duration_ms: u64,
    },

    /// Authentication or authorization failed
    #[error("Unauthorized: {message}")]
    Unauthorized {
        message: String,
    },

    /// Rate limit exceeded for external API
    #[error("Rate limited: retry after {retry_after_secs}s")]
    RateLimited {
        retry_after_secs: u64,
    },

    /// The external system is unavailable
    #[error("Service unavailable: {service}")]
    ServiceUnavailable {
        service: String,
    },

    /// An internal error occurred
    #[error("Internal error: {message}")]
    Internal {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl PortError {
    /// Creates a NotFound error
    pub fn not_found(entity_type: impl Into<String>, id: impl fmt::Display) -> Self {
        PortError::NotFound {
            entity_type: entity_type.into(),
            id: id.to_string(),
        }
    }

    /// Creates a Connection error
    pub fn connection(message: impl Into<String>) -> Self {
        PortError::Connection {
            message: message.into(),
            source: None,
        }
    }

    /// Creates a Timeout error
    pub fn timeout(operation: impl Into<String>, duration_ms: u64) -> Self {
        PortError::Timeout {
            operation: operation.into(),
            duration_ms,
        }
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        PortError::Internal {
            message: message.into(),
            source: None,
        }
    }

    /// Returns true if this error indicates a transient failure that may succeed on retry
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            PortError::Connection { .. }
                | PortError::Timeout { .. }
                | PortError::RateLimited { .. }
                | PortError::ServiceUnavailable { .. }
        )
    }

    /// Returns true if this error indicates the entity was not found
    pub fn is_not_found(&self) -> bool {
        matches!(self, PortError::NotFound { .. })
    }

    /// Returns true if the operation did not complete in time
    pub fn is_timeout(&self) -> bool {
        matches!(self, PortError::Timeout { .. })
    }

    /// Stable snake_case label for the error variant, used in audit details
    /// and serialized results
    pub fn kind(&self) -> &'static str {
        match self {
            PortError::NotFound { .. } => "not_found",
            PortError::Connection { .. } => "connection",
            PortError::Timeout { .. } => "timeout",
            PortError::Unauthorized { .. } => "unauthorized",
            PortError::RateLimited { .. } => "rate_limited",
            PortError::ServiceUnavailable { .. } => "service_unavailable",
            PortError::Internal { .. } => "internal",
        }
    }
}

/// Marker trait for all domain ports
///
/// All port traits should extend this marker to ensure they are
/// thread-safe and can be used in async contexts.
pub trait DomainPort: Send + Sync + 'static {}

/// External system configuration for API-based adapters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExternalSystemConfig {
    /// Base URL for the external system
    pub base_url: String,
    /// Authentication configuration
    pub auth: ExternalAuthConfig,
    /// Request timeout in milliseconds
    pub timeout_ms: u64,
    /// Custom headers to include in requests
    #[serde(default)]
    pub headers: std::collections::HashMap<String, String>,
}

impl ExternalSystemConfig {
    /// Creates an unauthenticated configuration with a 30 second timeout
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            auth: ExternalAuthConfig::None,
            timeout_ms: 30_000,
            headers: std::collections::HashMap::new(),
        }
    }
}

/// Authentication configuration for external systems
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ExternalAuthConfig {
    /// No authentication required
    None,
    /// API key authentication
    ApiKey {
        header_name: String,
        #[serde(skip_serializing)]
        key: String,
    },
    /// Bearer token authentication
    BearerToken {
        #[serde(skip_serializing)]
        token: String,
    },
}
