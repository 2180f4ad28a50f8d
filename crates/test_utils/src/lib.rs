//! Test Utilities Crate
//!
//! Provides shared test infrastructure, fixtures, and helpers for the
//! claims compliance test suite.
//!
//! # Modules
//!
//! - `fixtures`: Pre-built claims, national IDs and audit keys
//! - `builders`: Builder for claim records with sensible defaults
//! - `doubles`: Workflow dispatchers and audit sinks with scripted behavior
//! - `assertions`: Custom assertion helpers for validation and audit results
//! - `generators`: Property-based test data generators

pub mod fixtures;
pub mod builders;
pub mod doubles;
pub mod assertions;
pub mod generators;

pub use fixtures::*;
pub use builders::*;
pub use doubles::*;
pub use assertions::*;
pub use generators::*;
