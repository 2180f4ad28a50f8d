//! Test Doubles
//!
//! Workflow dispatchers and audit sinks with scripted behavior, plus a small
//! harness that wires an in-memory audit trail together.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};

use core_kernel::{DomainPort, PortError};
use domain_claims::{WorkflowAck, WorkflowDispatch, WorkflowDispatcher};
use infra_audit::{
    AuditEntry, AuditError, AuditLogReader, AuditRecorder, AuditSink, DecryptedAuditEntry,
    MemoryAuditSink,
};

use crate::fixtures::AuditFixtures;

/// Dispatcher that accepts everything and remembers what it received
pub struct RecordingDispatcher {
    received: Mutex<Vec<WorkflowDispatch>>,
    ack: Value,
}

impl Default for RecordingDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingDispatcher {
    pub fn new() -> Self {
        Self::with_ack(json!({ "execution_id": "exec-test-1", "status": "accepted" }))
    }

    pub fn with_ack(ack: Value) -> Self {
        Self {
            received: Mutex::new(Vec::new()),
            ack,
        }
    }

    pub fn call_count(&self) -> usize {
        self.received.lock().unwrap().len()
    }

    /// Dispatches received so far
    pub fn received(&self) -> Vec<WorkflowDispatch> {
        self.received.lock().unwrap().clone()
    }
}

impl DomainPort for RecordingDispatcher {}

#[async_trait]
impl WorkflowDispatcher for RecordingDispatcher {
    async fn dispatch(&self, dispatch: WorkflowDispatch) -> Result<WorkflowAck, PortError> {
        self.received.lock().unwrap().push(dispatch);
        Ok(WorkflowAck::new(self.ack.clone()))
    }
}

/// Dispatcher that always fails with the same error
pub struct FailingDispatcher {
    error: Box<dyn Fn() -> PortError + Send + Sync>,
    calls: AtomicUsize,
}

impl FailingDispatcher {
    pub fn new(error: impl Fn() -> PortError + Send + Sync + 'static) -> Self {
        Self {
            error: Box::new(error),
            calls: AtomicUsize::new(0),
        }
    }

    /// Fails the way a timed-out engine call does
    pub fn timeout() -> Self {
        Self::new(|| PortError::timeout("dispatch claim_processing", 30_000))
    }

    pub fn unavailable() -> Self {
        Self::new(|| PortError::ServiceUnavailable {
            service: "workflow-engine".to_string(),
        })
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl DomainPort for FailingDispatcher {}

#[async_trait]
impl WorkflowDispatcher for FailingDispatcher {
    async fn dispatch(&self, _dispatch: WorkflowDispatch) -> Result<WorkflowAck, PortError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err((self.error)())
    }
}

/// Dispatcher that answers only after a delay
pub struct SlowDispatcher {
    delay: Duration,
    started: AtomicUsize,
    completed: AtomicUsize,
}

impl SlowDispatcher {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            started: AtomicUsize::new(0),
            completed: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.started.load(Ordering::SeqCst)
    }

    /// Calls that ran to the end of the delay
    pub fn completed_count(&self) -> usize {
        self.completed.load(Ordering::SeqCst)
    }
}

impl DomainPort for SlowDispatcher {}

#[async_trait]
impl WorkflowDispatcher for SlowDispatcher {
    async fn dispatch(&self, _dispatch: WorkflowDispatch) -> Result<WorkflowAck, PortError> {
        self.started.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        self.completed.fetch_add(1, Ordering::SeqCst);
        Ok(WorkflowAck::new(json!({ "execution_id": "exec-slow" })))
    }
}

/// Dispatcher that panics after the request counts as sent
#[derive(Default)]
pub struct PanickingDispatcher {
    calls: AtomicUsize,
}

impl PanickingDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl DomainPort for PanickingDispatcher {}

#[async_trait]
impl WorkflowDispatcher for PanickingDispatcher {
    async fn dispatch(&self, _dispatch: WorkflowDispatch) -> Result<WorkflowAck, PortError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        panic!("workflow engine client crashed");
    }
}

/// Sink whose storage is never reachable
#[derive(Default)]
pub struct FailingAuditSink {
    attempts: AtomicUsize,
}

impl FailingAuditSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

impl DomainPort for FailingAuditSink {}

#[async_trait]
impl AuditSink for FailingAuditSink {
    async fn append(&self, _entry: &AuditEntry) -> Result<(), AuditError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(AuditError::unavailable(
            "unreachable",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only file system"),
        ))
    }

    async fn read_all(&self) -> Result<Vec<AuditEntry>, AuditError> {
        Ok(Vec::new())
    }

    fn describe(&self) -> String {
        "unreachable".to_string()
    }
}

/// In-memory audit trail with the fixed test key
pub struct AuditHarness {
    pub sink: Arc<MemoryAuditSink>,
    pub recorder: AuditRecorder,
}

impl Default for AuditHarness {
    fn default() -> Self {
        Self::new()
    }
}

impl AuditHarness {
    pub fn new() -> Self {
        let sink = Arc::new(MemoryAuditSink::new());
        let recorder = AuditRecorder::new(AuditFixtures::cipher(), sink.clone());
        Self { sink, recorder }
    }

    pub fn reader(&self) -> AuditLogReader {
        self.recorder.reader()
    }

    /// Every entry written so far, decrypted
    pub async fn entries(&self) -> Vec<DecryptedAuditEntry> {
        self.reader().read_all().await.unwrap()
    }

    /// Actions of every entry written so far, in order
    pub async fn actions(&self) -> Vec<String> {
        self.entries().await.into_iter().map(|e| e.action).collect()
    }
}

/// Recorder whose sink always fails
pub fn unavailable_recorder() -> (AuditRecorder, Arc<FailingAuditSink>) {
    let sink = Arc::new(FailingAuditSink::new());
    (AuditRecorder::new(AuditFixtures::cipher(), sink.clone()), sink)
}
