//! End-to-end tests for the claim pipeline

use std::sync::Arc;
use std::time::Duration;

use domain_access::AccessControl;
use domain_claims::{ClaimField, WorkflowDispatcher, CLAIM_PROCESSING_WORKFLOW};
use infra_audit::{AuditRecorder, FileAuditSink};

use claims_pipeline::{
    audit_actions, AuditPolicy, AuditStatus, ClaimPipeline, PipelineConfig, PipelineError,
    PipelineResult, PipelineStep,
};
use test_utils::{
    assert_audit_actions, assert_error_fields, assert_no_plaintext, unavailable_recorder,
    AuditFixtures, AuditHarness, ClaimFixtures, ClaimRecordBuilder, FailingDispatcher,
    NationalIdFixtures, PanickingDispatcher, RecordingDispatcher, SlowDispatcher,
};

fn pipeline_with(dispatcher: Arc<dyn WorkflowDispatcher>, recorder: AuditRecorder) -> ClaimPipeline {
    ClaimPipeline::new(AccessControl::default(), dispatcher, recorder)
}

mod scenarios {
    use super::*;

    #[tokio::test]
    async fn test_a_compliant_claim_from_provider_is_processed() {
        let audit = AuditHarness::new();
        let dispatcher = Arc::new(RecordingDispatcher::new());
        let pipeline = pipeline_with(dispatcher.clone(), audit.recorder.clone());

        let outcome = pipeline
            .process_claim(ClaimFixtures::compliant(), "provider")
            .await
            .unwrap();

        let correlation_id = match &outcome.result {
            PipelineResult::Processed {
                claim_id,
                correlation_id,
                acknowledgement,
                validation,
            } => {
                assert_eq!(claim_id, ClaimFixtures::claim_id());
                assert_eq!(acknowledgement.execution_id(), Some("exec-test-1"));
                assert!(validation.is_compliant);
                *correlation_id
            }
            other => panic!("expected processed, got {:?}", other),
        };
        assert!(outcome.audit.is_recorded());

        assert_eq!(dispatcher.call_count(), 1);
        let sent = &dispatcher.received()[0];
        assert_eq!(sent.workflow_name, CLAIM_PROCESSING_WORKFLOW);
        assert_eq!(sent.correlation_id, correlation_id);
        assert_eq!(sent.payload["actor_role"], "provider");
        assert_eq!(sent.payload["claim"]["id"], ClaimFixtures::claim_id());
        assert_eq!(sent.payload["validation_result"]["is_compliant"], true);
        assert!(sent.payload["timestamp_utc"].is_string());

        let entries = audit.entries().await;
        assert_audit_actions(&entries, &[audit_actions::PROCESSED]);
        assert_eq!(entries[0].actor_role, "provider");
        assert_eq!(entries[0].resource_id, ClaimFixtures::claim_id());
        assert_eq!(
            entries[0].details.as_ref().unwrap()["correlation_id"],
            serde_json::to_value(correlation_id).unwrap()
        );
        assert_eq!(entries[0].details.as_ref().unwrap()["acknowledgement"]["execution_id"], "exec-test-1");
    }

    #[tokio::test]
    async fn test_b_nurse_is_denied_before_validation() {
        let audit = AuditHarness::new();
        let dispatcher = Arc::new(RecordingDispatcher::new());
        let pipeline = pipeline_with(dispatcher.clone(), audit.recorder.clone());

        let outcome = pipeline
            .process_claim(ClaimFixtures::compliant(), "nurse")
            .await
            .unwrap();

        assert_eq!(
            outcome.result,
            PipelineResult::Unauthorized {
                role: "nurse".to_string(),
                action: "claims:process".to_string(),
            }
        );
        assert_eq!(dispatcher.call_count(), 0);

        let entries = audit.entries().await;
        assert_audit_actions(&entries, &[audit_actions::AUTHORIZATION_DENIED]);
        assert_eq!(entries[0].details.as_ref().unwrap()["action"], "claims:process");
        assert!(entries[0].details.as_ref().unwrap().get("errors").is_none());
    }

    #[tokio::test]
    async fn test_b_unknown_role_is_denied() {
        let audit = AuditHarness::new();
        let dispatcher = Arc::new(RecordingDispatcher::new());
        let pipeline = pipeline_with(dispatcher.clone(), audit.recorder.clone());

        let outcome = pipeline
            .process_claim(ClaimFixtures::compliant(), "janitor")
            .await
            .unwrap();

        assert_eq!(outcome.result.label(), "unauthorized");
        assert_eq!(dispatcher.call_count(), 0);
        assert_eq!(audit.actions().await, vec![audit_actions::AUTHORIZATION_DENIED]);
    }

    #[tokio::test]
    async fn test_c_missing_fields_are_all_reported() {
        let audit = AuditHarness::new();
        let dispatcher = Arc::new(RecordingDispatcher::new());
        let pipeline = pipeline_with(dispatcher.clone(), audit.recorder.clone());

        let claim = ClaimRecordBuilder::new()
            .without(ClaimField::Status)
            .with_null(ClaimField::Priority)
            .without(ClaimField::Total)
            .build();

        let outcome = pipeline.process_claim(claim, "provider").await.unwrap();

        match &outcome.result {
            PipelineResult::NonCompliant { claim_id, validation } => {
                assert_eq!(claim_id, ClaimFixtures::claim_id());
                assert_error_fields(validation, &["status", "priority", "total"]);
            }
            other => panic!("expected non-compliant, got {:?}", other),
        }
        assert_eq!(dispatcher.call_count(), 0);

        let entries = audit.entries().await;
        assert_audit_actions(&entries, &[audit_actions::VALIDATION_FAILED]);
        assert_eq!(entries[0].details.as_ref().unwrap()["errors"].as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_c_bad_patient_id_is_non_compliant() {
        let audit = AuditHarness::new();
        let dispatcher = Arc::new(RecordingDispatcher::new());
        let pipeline = pipeline_with(dispatcher.clone(), audit.recorder.clone());

        let outcome = pipeline
            .process_claim(ClaimFixtures::bad_patient_id(), "admin")
            .await
            .unwrap();

        let validation = outcome.result.validation().unwrap();
        assert_error_fields(validation, &["patient.identifier"]);
        assert_eq!(dispatcher.call_count(), 0);
    }

    #[tokio::test]
    async fn test_d_dispatcher_timeout_is_dispatch_failed() {
        let audit = AuditHarness::new();
        let dispatcher = Arc::new(FailingDispatcher::timeout());
        let pipeline = pipeline_with(dispatcher.clone(), audit.recorder.clone());

        let outcome = pipeline
            .process_claim(ClaimFixtures::compliant(), "provider")
            .await
            .unwrap();

        match &outcome.result {
            PipelineResult::DispatchFailed { claim_id, cause, .. } => {
                assert_eq!(claim_id, ClaimFixtures::claim_id());
                assert!(cause.is_timeout());
            }
            other => panic!("expected dispatch failure, got {:?}", other),
        }
        assert_eq!(dispatcher.call_count(), 1);

        let entries = audit.entries().await;
        assert_audit_actions(&entries, &[audit_actions::DISPATCH_FAILED]);
        assert_eq!(entries[0].details.as_ref().unwrap()["error"]["kind"], "timeout");
    }

    #[tokio::test]
    async fn test_d_slow_dispatcher_hits_pipeline_timeout() {
        let audit = AuditHarness::new();
        let dispatcher = Arc::new(SlowDispatcher::new(Duration::from_secs(5)));
        let pipeline = pipeline_with(dispatcher.clone(), audit.recorder.clone())
            .with_config(PipelineConfig::default().with_dispatch_timeout(Duration::from_millis(50)));

        let outcome = pipeline
            .process_claim(ClaimFixtures::compliant(), "provider")
            .await
            .unwrap();

        match &outcome.result {
            PipelineResult::DispatchFailed { cause, .. } => assert_eq!(cause.kind, "timeout"),
            other => panic!("expected dispatch failure, got {:?}", other),
        }
        assert_eq!(dispatcher.call_count(), 1);
        assert_eq!(dispatcher.completed_count(), 0);
        assert_eq!(audit.actions().await, vec![audit_actions::DISPATCH_FAILED]);
    }

    #[tokio::test]
    async fn test_engine_unavailable_is_dispatch_failed() {
        let audit = AuditHarness::new();
        let pipeline = pipeline_with(Arc::new(FailingDispatcher::unavailable()), audit.recorder.clone());

        let outcome = pipeline
            .process_claim(ClaimFixtures::compliant(), "admin")
            .await
            .unwrap();

        match &outcome.result {
            PipelineResult::DispatchFailed { cause, .. } => {
                assert_eq!(cause.kind, "service_unavailable");
                assert!(!cause.is_timeout());
            }
            other => panic!("expected dispatch failure, got {:?}", other),
        }
    }
}

mod dispatch_task_tests {
    use super::*;

    #[tokio::test]
    async fn test_crashed_dispatch_is_audited_before_error() {
        let audit = AuditHarness::new();
        let dispatcher = Arc::new(PanickingDispatcher::new());
        let pipeline = pipeline_with(dispatcher.clone(), audit.recorder.clone());

        let error = pipeline
            .process_claim(ClaimFixtures::compliant(), "provider")
            .await
            .unwrap_err();

        assert!(matches!(error, PipelineError::Internal { step: PipelineStep::Dispatch, .. }));
        assert_eq!(dispatcher.call_count(), 1);
        assert_eq!(audit.actions().await, vec![audit_actions::DISPATCH_FAILED]);

        let entries = audit.entries().await;
        let details = entries[0].details.as_ref().unwrap();
        assert_eq!(details["workflow"], CLAIM_PROCESSING_WORKFLOW);
        assert_eq!(details["error"]["kind"], "internal");
        assert!(details["correlation_id"].is_string());
    }

    #[tokio::test]
    async fn test_resource_typed_patient_reference_is_not_dispatched() {
        let audit = AuditHarness::new();
        let dispatcher = Arc::new(RecordingDispatcher::new());
        let pipeline = pipeline_with(dispatcher.clone(), audit.recorder.clone());

        let claim = ClaimRecordBuilder::new()
            .with_patient_reference(format!("Patient/{}", NationalIdFixtures::valid()))
            .build();
        let outcome = pipeline.process_claim(claim, "provider").await.unwrap();

        assert!(matches!(outcome.result, PipelineResult::NonCompliant { .. }));
        assert_error_fields(outcome.result.validation().unwrap(), &["patient.identifier"]);
        assert_eq!(dispatcher.call_count(), 0);
    }
}

mod cancellation_tests {
    use super::*;

    #[tokio::test]
    async fn test_cancelled_caller_still_gets_audit_entry() {
        let audit = AuditHarness::new();
        let dispatcher = Arc::new(SlowDispatcher::new(Duration::from_millis(200)));
        let pipeline = pipeline_with(dispatcher.clone(), audit.recorder.clone());

        // Give up long before the engine answers
        let abandoned = tokio::time::timeout(
            Duration::from_millis(50),
            pipeline.process_claim(ClaimFixtures::compliant(), "provider"),
        )
        .await;
        assert!(abandoned.is_err());
        assert_eq!(dispatcher.call_count(), 1);

        tokio::time::sleep(Duration::from_millis(500)).await;

        assert_eq!(dispatcher.completed_count(), 1);
        assert_eq!(audit.actions().await, vec![audit_actions::PROCESSED]);
    }

    #[tokio::test]
    async fn test_cancel_before_dispatch_has_no_side_effects() {
        let audit = AuditHarness::new();
        let dispatcher = Arc::new(RecordingDispatcher::new());
        let pipeline = pipeline_with(dispatcher.clone(), audit.recorder.clone());

        // Dropped without ever being polled
        drop(pipeline.process_claim(ClaimFixtures::compliant(), "provider"));

        assert_eq!(dispatcher.call_count(), 0);
        assert!(audit.sink.is_empty().await);
    }
}

mod audit_policy_tests {
    use super::*;

    #[tokio::test]
    async fn test_best_effort_reports_unavailable_audit() {
        let (recorder, sink) = unavailable_recorder();
        let dispatcher = Arc::new(RecordingDispatcher::new());
        let pipeline = pipeline_with(dispatcher.clone(), recorder);

        let outcome = pipeline
            .process_claim(ClaimFixtures::compliant(), "provider")
            .await
            .unwrap();

        assert_eq!(outcome.result.label(), "processed");
        assert!(matches!(outcome.audit, AuditStatus::Unavailable { .. }));
        assert_eq!(dispatcher.call_count(), 1);
        assert_eq!(sink.attempts(), 1);
    }

    #[tokio::test]
    async fn test_required_policy_surfaces_audit_failure_with_result() {
        let (recorder, _sink) = unavailable_recorder();
        let dispatcher = Arc::new(RecordingDispatcher::new());
        let pipeline = pipeline_with(dispatcher.clone(), recorder)
            .with_config(PipelineConfig::default().with_audit_policy(AuditPolicy::Required));

        let error = pipeline
            .process_claim(ClaimFixtures::compliant(), "provider")
            .await
            .unwrap_err();

        assert_eq!(error.step(), PipelineStep::Audit);
        match &error {
            PipelineError::AuditRequired { result, source, .. } => {
                assert_eq!(result.label(), "processed");
                assert!(source.is_unavailable());
            }
            other => panic!("expected audit required, got {:?}", other),
        }
        // The dispatch already happened and is not undone
        assert_eq!(dispatcher.call_count(), 1);
    }

    #[tokio::test]
    async fn test_required_policy_names_authorize_step() {
        let (recorder, _sink) = unavailable_recorder();
        let pipeline = pipeline_with(Arc::new(RecordingDispatcher::new()), recorder)
            .with_config(PipelineConfig::default().with_audit_policy(AuditPolicy::Required));

        let error = pipeline
            .process_claim(ClaimFixtures::compliant(), "auditor")
            .await
            .unwrap_err();

        assert_eq!(error.step(), PipelineStep::Authorize);
        assert_eq!(error.result().map(PipelineResult::label), Some("unauthorized"));
    }
}

mod validate_only_tests {
    use super::*;

    #[tokio::test]
    async fn test_validate_only_audits_and_never_dispatches() {
        let audit = AuditHarness::new();
        let dispatcher = Arc::new(RecordingDispatcher::new());
        let pipeline = pipeline_with(dispatcher.clone(), audit.recorder.clone());

        let claim = ClaimRecordBuilder::new().without(ClaimField::Insurance).build();
        let outcome = pipeline.validate_only(&claim, "provider").await.unwrap();

        match &outcome.result {
            PipelineResult::Validated { validation, .. } => {
                assert_error_fields(validation, &["insurance"]);
            }
            other => panic!("expected validated, got {:?}", other),
        }
        assert_eq!(dispatcher.call_count(), 0);

        let entries = audit.entries().await;
        assert_audit_actions(&entries, &[audit_actions::VALIDATED]);
        assert_eq!(entries[0].details.as_ref().unwrap()["is_compliant"], false);
    }

    #[tokio::test]
    async fn test_validate_only_requires_claims_validate() {
        let audit = AuditHarness::new();
        let pipeline = pipeline_with(Arc::new(RecordingDispatcher::new()), audit.recorder.clone());

        let outcome = pipeline
            .validate_only(&ClaimFixtures::compliant(), "nurse")
            .await
            .unwrap();

        assert_eq!(
            outcome.result,
            PipelineResult::Unauthorized {
                role: "nurse".to_string(),
                action: "claims:validate".to_string(),
            }
        );
        assert_eq!(audit.actions().await, vec![audit_actions::AUTHORIZATION_DENIED]);
    }
}

mod file_sink_tests {
    use super::*;

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_claims_share_one_file() {
        let dir = tempfile::tempdir().unwrap();
        let sink = Arc::new(FileAuditSink::new(dir.path().join("audit").join("claims.log")));
        let recorder = AuditRecorder::new(AuditFixtures::cipher(), sink.clone());
        let dispatcher = Arc::new(RecordingDispatcher::new());
        let pipeline = Arc::new(pipeline_with(dispatcher.clone(), recorder.clone()));

        let mut handles = Vec::new();
        for i in 0..16 {
            let pipeline = Arc::clone(&pipeline);
            handles.push(tokio::spawn(async move {
                let role = if i % 2 == 0 { "provider" } else { "nurse" };
                let claim = ClaimRecordBuilder::new().with_id(format!("claim-{}", i)).build();
                pipeline.process_claim(claim, role).await.unwrap()
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(dispatcher.call_count(), 8);

        let entries = recorder.reader().read_all().await.unwrap();
        assert_eq!(entries.len(), 16);
        let processed = entries
            .iter()
            .filter(|e| e.action == audit_actions::PROCESSED)
            .count();
        assert_eq!(processed, 8);

        let raw = std::fs::read_to_string(dir.path().join("audit").join("claims.log")).unwrap();
        let lines: Vec<String> = raw.lines().map(str::to_string).collect();
        assert_eq!(lines.len(), 16);
        assert_no_plaintext(&lines, NationalIdFixtures::valid());
        assert_no_plaintext(&lines, "exec-test-1");
    }
}
