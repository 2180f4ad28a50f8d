//! Workflow Infrastructure
//!
//! Adapters implementing `domain_claims::WorkflowDispatcher` against real
//! workflow engines. The webhook adapter posts each dispatch to
//! `{base_url}/{webhook_path}` and relays the engine's JSON answer.
//!
//! # Error Handling
//!
//! Engine responses are mapped to `PortError` variants:
//! - 401/403 -> `PortError::Unauthorized`
//! - 404 -> `PortError::NotFound`
//! - 429 -> `PortError::RateLimited`
//! - 5xx -> `PortError::ServiceUnavailable`
//! - Timeouts -> `PortError::Timeout`
//! - Connection failures -> `PortError::Connection`
//! - Other -> `PortError::Internal`

pub mod catalog;
pub mod webhook;

pub use catalog::{WorkflowCatalog, WorkflowDefinition};
pub use webhook::{WebhookDispatcher, CORRELATION_HEADER, WORKFLOW_HEADER};
