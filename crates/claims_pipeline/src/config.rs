//! Pipeline configuration

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default bound on a single workflow dispatch
pub const DEFAULT_DISPATCH_TIMEOUT: Duration = Duration::from_secs(30);

/// How audit write failures affect the pipeline's answer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditPolicy {
    /// Report audit failures alongside the result
    #[default]
    BestEffort,
    /// Fail the call when its audit entry cannot be written
    Required,
}

impl std::str::FromStr for AuditPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "best_effort" => Ok(Self::BestEffort),
            "required" => Ok(Self::Required),
            other => Err(format!("unknown audit policy '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineConfig {
    pub dispatch_timeout: Duration,
    pub audit_policy: AuditPolicy,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            dispatch_timeout: DEFAULT_DISPATCH_TIMEOUT,
            audit_policy: AuditPolicy::BestEffort,
        }
    }
}

impl PipelineConfig {
    pub fn with_dispatch_timeout(mut self, timeout: Duration) -> Self {
        self.dispatch_timeout = timeout;
        self
    }

    pub fn with_audit_policy(mut self, policy: AuditPolicy) -> Self {
        self.audit_policy = policy;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_audit_policy_parsing() {
        assert_eq!("best_effort".parse::<AuditPolicy>(), Ok(AuditPolicy::BestEffort));
        assert_eq!("Best-Effort".parse::<AuditPolicy>(), Ok(AuditPolicy::BestEffort));
        assert_eq!("REQUIRED".parse::<AuditPolicy>(), Ok(AuditPolicy::Required));
        assert!("sometimes".parse::<AuditPolicy>().is_err());
    }

    #[test]
    fn test_defaults() {
        let config = PipelineConfig::default();
        assert_eq!(config.audit_policy, AuditPolicy::BestEffort);
        assert_eq!(config.dispatch_timeout, DEFAULT_DISPATCH_TIMEOUT);
    }
}
