//! Access Control Domain
//!
//! Role-based authorization for claim processing. Each role carries a fixed
//! set of permission patterns; an action is allowed when a pattern matches.
//!
//! # Pattern Matching
//!
//! ```text
//! "*"            matches every action
//! "claims:*"     matches "claims:process", "claims:validate", ...
//! "audit:read"   matches only "audit:read"
//! ```

pub mod role;
pub mod permissions;
pub mod error;

pub use role::Role;
pub use permissions::{AccessControl, PermissionPattern, PermissionTable, actions};
pub use error::AccessError;
