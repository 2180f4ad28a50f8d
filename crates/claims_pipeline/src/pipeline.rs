//! Claim pipeline orchestrator

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use tracing::{error, info, instrument, warn};

use core_kernel::{CorrelationId, PortError};
use domain_access::{actions, AccessControl};
use domain_claims::{
    ClaimRecord, ClaimValidator, ValidationResult, WorkflowDispatch, WorkflowDispatcher,
    CLAIM_PROCESSING_WORKFLOW,
};
use infra_audit::{AuditError, AuditReceipt, AuditRecorder};

use crate::config::{AuditPolicy, PipelineConfig};
use crate::error::{PipelineError, PipelineStep};
use crate::outcome::{audit_actions, AuditStatus, DispatchFailure, PipelineOutcome, PipelineResult};

/// Authorizes, validates, dispatches and audits submitted claims
///
/// Holds no per-request state; one instance serves concurrent calls and
/// shares only the audit sink between them.
pub struct ClaimPipeline {
    access: AccessControl,
    dispatcher: Arc<dyn WorkflowDispatcher>,
    recorder: AuditRecorder,
    config: PipelineConfig,
}

impl ClaimPipeline {
    pub fn new(
        access: AccessControl,
        dispatcher: Arc<dyn WorkflowDispatcher>,
        recorder: AuditRecorder,
    ) -> Self {
        Self {
            access,
            dispatcher,
            recorder,
            config: PipelineConfig::default(),
        }
    }

    pub fn with_config(mut self, config: PipelineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn access(&self) -> &AccessControl {
        &self.access
    }

    pub fn recorder(&self) -> &AuditRecorder {
        &self.recorder
    }

    /// Runs a claim through authorize, validate, dispatch and audit
    ///
    /// # Errors
    ///
    /// Denied roles, non-compliant claims and failed dispatches are
    /// results, not errors. An error is returned only when the audit policy
    /// requires an entry that could not be written, or when the dispatch
    /// task itself fails. The latter is still audited as
    /// `claim_dispatch_failed`.
    #[instrument(skip(self, claim), fields(claim_id = %claim.resource_id()))]
    pub async fn process_claim(
        &self,
        claim: ClaimRecord,
        actor_role: &str,
    ) -> Result<PipelineOutcome, PipelineError> {
        let claim_id = claim.resource_id();

        if let Some(denied) = self.deny(actor_role, actions::CLAIMS_PROCESS, &claim_id).await {
            return self.conclude(PipelineStep::Authorize, denied);
        }

        let validation = ClaimValidator::validate(&claim);
        if !validation.is_compliant {
            info!(
                error_fields = ?validation.error_fields(),
                "Claim failed compliance validation"
            );
            let details = json!({
                "errors": &validation.errors,
                "warnings": &validation.warnings,
            });
            let audit = self
                .recorder
                .record(audit_actions::VALIDATION_FAILED, actor_role, &claim_id, &details)
                .await;
            let result = PipelineResult::NonCompliant {
                claim_id,
                validation,
            };
            return self.conclude(PipelineStep::Validate, (result, audit));
        }

        let dispatch = match WorkflowDispatch::claim_processing(claim, validation.clone(), actor_role) {
            Ok(dispatch) => dispatch,
            Err(e) => {
                let message = format!("dispatch payload could not be built: {}", e);
                return Err(self.abort_dispatch(actor_role, &claim_id, None, message).await);
            }
        };
        let correlation_id = dispatch.correlation_id;

        let task = DispatchTask {
            dispatcher: Arc::clone(&self.dispatcher),
            recorder: self.recorder.clone(),
            timeout: self.config.dispatch_timeout,
            claim_id: claim_id.clone(),
            actor_role: actor_role.to_string(),
            validation,
        };

        // Detached so the audit entry is written even if the caller goes away
        let (result, audit) = match tokio::spawn(task.run(dispatch)).await {
            Ok(concluded) => concluded,
            Err(e) => {
                // The dispatch may already have reached the engine
                let message = format!("dispatch task failed: {}", e);
                return Err(self
                    .abort_dispatch(actor_role, &claim_id, Some(correlation_id), message)
                    .await);
            }
        };

        let step = match result {
            PipelineResult::Processed { .. } => PipelineStep::Audit,
            _ => PipelineStep::Dispatch,
        };
        self.conclude(step, (result, audit))
    }

    /// Authorizes `claims:validate` and reports the field rule result
    /// without dispatching anything
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::AuditRequired`] when the audit policy
    /// requires the entry and it could not be written.
    #[instrument(skip(self, claim), fields(claim_id = %claim.resource_id()))]
    pub async fn validate_only(
        &self,
        claim: &ClaimRecord,
        actor_role: &str,
    ) -> Result<PipelineOutcome, PipelineError> {
        let claim_id = claim.resource_id();

        if let Some(denied) = self.deny(actor_role, actions::CLAIMS_VALIDATE, &claim_id).await {
            return self.conclude(PipelineStep::Authorize, denied);
        }

        let validation = ClaimValidator::validate(claim);
        let details = json!({
            "is_compliant": validation.is_compliant,
            "error_fields": validation.error_fields(),
            "warning_count": validation.warnings.len(),
        });
        let audit = self
            .recorder
            .record(audit_actions::VALIDATED, actor_role, &claim_id, &details)
            .await;

        let result = PipelineResult::Validated {
            claim_id,
            validation,
        };
        self.conclude(PipelineStep::Validate, (result, audit))
    }

    /// Returns the audited `Unauthorized` result when the role is denied
    async fn deny(
        &self,
        actor_role: &str,
        action: &str,
        claim_id: &str,
    ) -> Option<(PipelineResult, Result<AuditReceipt, AuditError>)> {
        let reason = match self.access.authorize(actor_role, action) {
            Ok(_) => return None,
            Err(e) => e.to_string(),
        };

        warn!(role = actor_role, action, %reason, "Claim request denied");
        let details = json!({ "action": action, "reason": reason });
        let audit = self
            .recorder
            .record(audit_actions::AUTHORIZATION_DENIED, actor_role, claim_id, &details)
            .await;

        let result = PipelineResult::Unauthorized {
            role: actor_role.to_string(),
            action: action.to_string(),
        };
        Some((result, audit))
    }

    /// Audits a dispatch that ended without a result
    ///
    /// The entry uses the `claim_dispatch_failed` action with an `internal`
    /// cause. The returned error is the same whether or not the entry was
    /// written; a recorder failure is logged by the recorder.
    async fn abort_dispatch(
        &self,
        actor_role: &str,
        claim_id: &str,
        correlation_id: Option<CorrelationId>,
        message: String,
    ) -> PipelineError {
        error!(claim_id, correlation_id = ?correlation_id, %message, "Claim dispatch aborted");

        let cause = DispatchFailure {
            kind: "internal".to_string(),
            message,
        };
        let details = json!({
            "workflow": CLAIM_PROCESSING_WORKFLOW,
            "correlation_id": correlation_id,
            "error": &cause,
        });
        let _ = self
            .recorder
            .record(audit_actions::DISPATCH_FAILED, actor_role, claim_id, &details)
            .await;

        PipelineError::internal(PipelineStep::Dispatch, cause.message)
    }

    fn conclude(
        &self,
        step: PipelineStep,
        (result, audit): (PipelineResult, Result<AuditReceipt, AuditError>),
    ) -> Result<PipelineOutcome, PipelineError> {
        let status = AuditStatus::from(&audit);

        match audit {
            Err(source) if self.config.audit_policy == AuditPolicy::Required => {
                Err(PipelineError::AuditRequired {
                    step,
                    result: Box::new(result),
                    source,
                })
            }
            _ => Ok(PipelineOutcome {
                result,
                audit: status,
            }),
        }
    }
}

impl std::fmt::Debug for ClaimPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClaimPipeline")
            .field("recorder", &self.recorder)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Dispatch and its audit entry, owned so it can outlive the caller
struct DispatchTask {
    dispatcher: Arc<dyn WorkflowDispatcher>,
    recorder: AuditRecorder,
    timeout: Duration,
    claim_id: String,
    actor_role: String,
    validation: ValidationResult,
}

impl DispatchTask {
    async fn run(self, dispatch: WorkflowDispatch) -> (PipelineResult, Result<AuditReceipt, AuditError>) {
        let correlation_id = dispatch.correlation_id;
        let workflow = dispatch.workflow_name.clone();

        let sent = match tokio::time::timeout(self.timeout, self.dispatcher.dispatch(dispatch)).await {
            Ok(sent) => sent,
            Err(_) => Err(PortError::timeout(
                format!("dispatch {}", workflow),
                self.timeout.as_millis() as u64,
            )),
        };

        match sent {
            Ok(acknowledgement) => {
                info!(
                    claim_id = %self.claim_id,
                    %correlation_id,
                    workflow = %workflow,
                    "Claim dispatched to workflow engine"
                );
                let details = json!({
                    "workflow": &workflow,
                    "correlation_id": correlation_id,
                    "acknowledgement": &acknowledgement,
                });
                let audit = self.audit(audit_actions::PROCESSED, &details).await;

                let result = PipelineResult::Processed {
                    claim_id: self.claim_id,
                    correlation_id,
                    acknowledgement,
                    validation: self.validation,
                };
                (result, audit)
            }
            Err(error) => {
                warn!(
                    claim_id = %self.claim_id,
                    %correlation_id,
                    workflow = %workflow,
                    error = %error,
                    "Claim dispatch failed"
                );
                let cause = DispatchFailure::from(&error);
                let details = json!({
                    "workflow": &workflow,
                    "correlation_id": correlation_id,
                    "error": &cause,
                });
                let audit = self.audit(audit_actions::DISPATCH_FAILED, &details).await;

                let result = PipelineResult::DispatchFailed {
                    claim_id: self.claim_id,
                    correlation_id,
                    cause,
                };
                (result, audit)
            }
        }
    }

    async fn audit(&self, action: &str, details: &serde_json::Value) -> Result<AuditReceipt, AuditError> {
        self.recorder
            .record(action, &self.actor_role, &self.claim_id, details)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use core_kernel::DomainPort;
    use domain_claims::WorkflowAck;
    use infra_audit::{AuditKey, MemoryAuditSink, XChaChaAuditCipher};

    fn assert_send<T: Send>(_: T) {}

    struct NeverCalled;

    impl DomainPort for NeverCalled {}

    #[async_trait]
    impl WorkflowDispatcher for NeverCalled {
        async fn dispatch(&self, _: WorkflowDispatch) -> Result<WorkflowAck, PortError> {
            Err(PortError::internal("dispatcher must not be called"))
        }
    }

    fn pipeline() -> (ClaimPipeline, Arc<MemoryAuditSink>) {
        let sink = Arc::new(MemoryAuditSink::new());
        let cipher = Arc::new(XChaChaAuditCipher::new(&AuditKey::generate()));
        let recorder = AuditRecorder::new(cipher, sink.clone());
        (
            ClaimPipeline::new(AccessControl::default(), Arc::new(NeverCalled), recorder),
            sink,
        )
    }

    #[tokio::test]
    async fn test_denied_role_is_audited_once() {
        let (pipeline, sink) = pipeline();
        let claim = ClaimRecord::from_value(json!({ "id": "c-9" })).unwrap();

        let outcome = pipeline.process_claim(claim, "auditor").await.unwrap();

        assert_eq!(outcome.result.label(), "unauthorized");
        assert!(outcome.audit.is_recorded());
        assert_eq!(sink.len().await, 1);
    }

    #[tokio::test]
    async fn test_validate_only_never_dispatches() {
        let (pipeline, sink) = pipeline();
        let claim = ClaimRecord::from_value(json!({ "id": "c-10" })).unwrap();

        let outcome = pipeline.validate_only(&claim, "provider").await.unwrap();

        match outcome.result {
            PipelineResult::Validated { claim_id, validation } => {
                assert_eq!(claim_id, "c-10");
                assert!(!validation.is_compliant);
            }
            other => panic!("unexpected result {:?}", other),
        }
        assert_eq!(sink.len().await, 1);
    }

    #[test]
    fn test_process_claim_future_is_send() {
        let (pipeline, _) = pipeline();
        let claim = ClaimRecord::from_value(json!({})).unwrap();
        assert_send(pipeline.process_claim(claim, "provider"));
    }
}
