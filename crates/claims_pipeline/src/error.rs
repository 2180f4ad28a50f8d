//! Pipeline errors

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use infra_audit::AuditError;

use crate::outcome::PipelineResult;

/// Pipeline stage that produced an error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStep {
    Authorize,
    Validate,
    Dispatch,
    Audit,
}

impl fmt::Display for PipelineStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Authorize => "authorize",
            Self::Validate => "validate",
            Self::Dispatch => "dispatch",
            Self::Audit => "audit",
        };
        f.write_str(name)
    }
}

/// Conditions the pipeline cannot express as a [`PipelineResult`]
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The audit entry for a terminal state could not be written and the
    /// configured policy requires it
    #[error("Audit entry for {step} step could not be written: {source}")]
    AuditRequired {
        step: PipelineStep,
        result: Box<PipelineResult>,
        #[source]
        source: AuditError,
    },

    #[error("Pipeline {step} step failed: {message}")]
    Internal { step: PipelineStep, message: String },
}

impl PipelineError {
    pub fn internal(step: PipelineStep, message: impl Into<String>) -> Self {
        Self::Internal {
            step,
            message: message.into(),
        }
    }

    /// The step that produced this error
    pub fn step(&self) -> PipelineStep {
        match self {
            Self::AuditRequired { step, .. } | Self::Internal { step, .. } => *step,
        }
    }

    /// The terminal result, when one was reached
    pub fn result(&self) -> Option<&PipelineResult> {
        match self {
            Self::AuditRequired { result, .. } => Some(result),
            Self::Internal { .. } => None,
        }
    }
}
