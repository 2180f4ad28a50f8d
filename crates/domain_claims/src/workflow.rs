//! Claims workflow hand-off
//!
//! Compliant claims are handed to an external workflow engine which owns
//! everything that happens next. The core only describes what it sends and
//! relays the engine's acknowledgement.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use core_kernel::{CorrelationId, DomainPort, PortError};

use crate::claim::ClaimRecord;
use crate::validation::ValidationResult;

/// Workflow that receives validated claims
pub const CLAIM_PROCESSING_WORKFLOW: &str = "claim_processing";

/// Body sent with a claim processing dispatch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClaimWorkflowPayload {
    pub claim: ClaimRecord,
    pub validation_result: ValidationResult,
    pub actor_role: String,
    pub timestamp_utc: DateTime<Utc>,
}

/// A request to start an external workflow
///
/// Ownership moves to the dispatcher; the pipeline keeps only the
/// correlation id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowDispatch {
    pub workflow_name: String,
    pub payload: Value,
    pub correlation_id: CorrelationId,
}

impl WorkflowDispatch {
    /// Builds the dispatch for a compliant claim
    pub fn claim_processing(
        claim: ClaimRecord,
        validation_result: ValidationResult,
        actor_role: impl Into<String>,
    ) -> Result<Self, serde_json::Error> {
        let payload = ClaimWorkflowPayload {
            claim,
            validation_result,
            actor_role: actor_role.into(),
            timestamp_utc: Utc::now(),
        };

        Ok(Self {
            workflow_name: CLAIM_PROCESSING_WORKFLOW.to_string(),
            payload: serde_json::to_value(payload)?,
            correlation_id: CorrelationId::new_v7(),
        })
    }
}

/// Acknowledgement returned by the workflow engine
///
/// Opaque to the core and echoed back to the caller unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkflowAck(pub Value);

impl WorkflowAck {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    /// Execution identifier, when the engine reports one
    pub fn execution_id(&self) -> Option<&str> {
        self.0.get("execution_id").and_then(Value::as_str)
    }
}

/// Port to the external workflow engine
///
/// Implementations deliver the dispatch and report the engine's answer.
/// They must not retry internally; timeouts are applied by the caller.
#[async_trait]
pub trait WorkflowDispatcher: DomainPort {
    /// Sends a dispatch and waits for the acknowledgement
    async fn dispatch(&self, dispatch: WorkflowDispatch) -> Result<WorkflowAck, PortError>;
}
