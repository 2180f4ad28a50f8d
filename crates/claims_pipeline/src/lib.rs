//! Claim Pipeline
//!
//! Orchestrates the handling of one submitted claim:
//!
//! 1. **Authorize** the actor's role for `claims:process`
//! 2. **Validate** the claim against the field rules
//! 3. **Dispatch** compliant claims to the external workflow engine
//! 4. **Audit** the terminal state
//!
//! # Architecture
//!
//! The pipeline is a linear state machine. Every terminal branch produces a
//! [`PipelineResult`] and writes exactly one audit entry. Expected failures
//! (denied role, non-compliant claim, failed dispatch) are result variants,
//! not errors; [`PipelineError`] is reserved for conditions the caller
//! cannot treat as an outcome.
//!
//! Audit failures never replace the terminal result. Under
//! [`AuditPolicy::BestEffort`] they are reported in
//! [`PipelineOutcome::audit`]; under [`AuditPolicy::Required`] they become
//! [`PipelineError::AuditRequired`], which still carries the result.
//!
//! Once a dispatch has been handed to the engine, the dispatch and its audit
//! entry run on their own task, so cancelling the caller does not lose the
//! record of what was sent.

pub mod config;
pub mod error;
pub mod outcome;
pub mod pipeline;

pub use config::{AuditPolicy, PipelineConfig, DEFAULT_DISPATCH_TIMEOUT};
pub use error::{PipelineError, PipelineStep};
pub use outcome::{audit_actions, AuditStatus, DispatchFailure, PipelineOutcome, PipelineResult};
pub use pipeline::ClaimPipeline;
