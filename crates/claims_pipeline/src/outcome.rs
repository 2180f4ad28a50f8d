//! Pipeline outcomes

use serde::{Deserialize, Serialize};

use core_kernel::{AuditEventId, CorrelationId, PortError};
use domain_claims::{ValidationResult, WorkflowAck};
use infra_audit::{AuditError, AuditReceipt};

/// Audit actions written by the pipeline
pub mod audit_actions {
    pub const AUTHORIZATION_DENIED: &str = "claim_authorization_denied";
    pub const VALIDATION_FAILED: &str = "claim_validation_failed";
    pub const DISPATCH_FAILED: &str = "claim_dispatch_failed";
    pub const PROCESSED: &str = "claim_processed";
    pub const VALIDATED: &str = "claim_validated";
}

/// Terminal state of one pipeline call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum PipelineResult {
    /// Authorized, compliant and accepted by the workflow engine
    Processed {
        claim_id: String,
        correlation_id: CorrelationId,
        acknowledgement: WorkflowAck,
        validation: ValidationResult,
    },
    /// The role may not perform the action
    Unauthorized { role: String, action: String },
    /// The claim failed one or more field rules
    NonCompliant {
        claim_id: String,
        validation: ValidationResult,
    },
    /// The workflow engine did not accept the dispatch
    DispatchFailed {
        claim_id: String,
        correlation_id: CorrelationId,
        cause: DispatchFailure,
    },
    /// Validation-only request completed; compliant or not
    Validated {
        claim_id: String,
        validation: ValidationResult,
    },
}

impl PipelineResult {
    /// Short label, used in logs and metrics
    pub fn label(&self) -> &'static str {
        match self {
            Self::Processed { .. } => "processed",
            Self::Unauthorized { .. } => "unauthorized",
            Self::NonCompliant { .. } => "non_compliant",
            Self::DispatchFailed { .. } => "dispatch_failed",
            Self::Validated { .. } => "validated",
        }
    }

    pub fn validation(&self) -> Option<&ValidationResult> {
        match self {
            Self::Processed { validation, .. }
            | Self::NonCompliant { validation, .. }
            | Self::Validated { validation, .. } => Some(validation),
            Self::Unauthorized { .. } | Self::DispatchFailed { .. } => None,
        }
    }
}

/// Why a dispatch failed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchFailure {
    /// Error category, e.g. `timeout` or `service_unavailable`
    pub kind: String,
    pub message: String,
}

impl DispatchFailure {
    pub fn is_timeout(&self) -> bool {
        self.kind == "timeout"
    }
}

impl From<&PortError> for DispatchFailure {
    fn from(error: &PortError) -> Self {
        Self {
            kind: error.kind().to_string(),
            message: error.to_string(),
        }
    }
}

/// Whether the terminal state's audit entry was written
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AuditStatus {
    Recorded { entry_id: AuditEventId },
    Unavailable { reason: String },
}

impl AuditStatus {
    pub fn is_recorded(&self) -> bool {
        matches!(self, Self::Recorded { .. })
    }
}

impl From<&Result<AuditReceipt, AuditError>> for AuditStatus {
    fn from(result: &Result<AuditReceipt, AuditError>) -> Self {
        match result {
            Ok(receipt) => Self::Recorded {
                entry_id: receipt.entry_id,
            },
            Err(e) => Self::Unavailable {
                reason: e.to_string(),
            },
        }
    }
}

/// Result of a pipeline call together with its audit status
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineOutcome {
    pub result: PipelineResult,
    pub audit: AuditStatus,
}
