//! Core Kernel - Foundational types for the claims compliance workspace
//!
//! This crate provides the building blocks used across all domain and
//! infrastructure crates:
//! - Strongly-typed identifiers for correlation and audit records
//! - Port infrastructure (`PortError`, `DomainPort`) for swappable adapters

pub mod identifiers;
pub mod ports;

pub use identifiers::{CorrelationId, AuditEventId};
pub use ports::{
    PortError, DomainPort, ExternalSystemConfig, ExternalAuthConfig,
};
