//! Permission table and authorization gate

use std::collections::BTreeMap;
use std::sync::Arc;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::error::AccessError;
use crate::role::Role;

/// Action strings checked by the pipeline and API
pub mod actions {
    pub const CLAIMS_PROCESS: &str = "claims:process";
    pub const CLAIMS_VALIDATE: &str = "claims:validate";
    pub const AUDIT_READ: &str = "audit:read";
    pub const COMPLIANCE_READ: &str = "compliance:read";
    pub const PATIENTS_READ: &str = "patients:read";
    pub const CLINICAL_READ: &str = "clinical:read";
}

/// A single permission: an exact action, or a prefix ending in `*`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PermissionPattern(String);

impl PermissionPattern {
    pub fn new(pattern: impl Into<String>) -> Self {
        Self(pattern.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this pattern grants `action`
    pub fn matches(&self, action: &str) -> bool {
        match self.0.strip_suffix('*') {
            // "*" strips to "" which prefixes everything
            Some(prefix) => action.starts_with(prefix),
            None => self.0 == action,
        }
    }
}

static STANDARD_TABLE: Lazy<Arc<PermissionTable>> = Lazy::new(|| {
    Arc::new(PermissionTable::from_entries([
        (Role::Admin, vec!["*"]),
        (Role::Provider, vec!["claims:*", "patients:read", "clinical:*"]),
        (Role::Nurse, vec!["patients:read", "clinical:read"]),
        (Role::Auditor, vec!["audit:read", "compliance:read"]),
    ]))
});

/// Immutable mapping from role to permission patterns
///
/// Built once at startup and shared read-only afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PermissionTable {
    grants: BTreeMap<Role, Vec<PermissionPattern>>,
}

impl PermissionTable {
    /// Builds a table from role/pattern pairs
    pub fn from_entries<I, P, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (Role, P)>,
        P: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let grants = entries
            .into_iter()
            .map(|(role, patterns)| {
                let patterns = patterns.into_iter().map(PermissionPattern::new).collect();
                (role, patterns)
            })
            .collect();

        Self { grants }
    }

    /// The standard clinical deployment table
    ///
    /// | role     | patterns                                      |
    /// |----------|-----------------------------------------------|
    /// | admin    | `*`                                           |
    /// | provider | `claims:*`, `patients:read`, `clinical:*`     |
    /// | nurse    | `patients:read`, `clinical:read`              |
    /// | auditor  | `audit:read`, `compliance:read`               |
    pub fn standard() -> Arc<PermissionTable> {
        Arc::clone(&STANDARD_TABLE)
    }

    /// Patterns granted to `role`; empty for roles without an entry
    pub fn patterns(&self, role: Role) -> &[PermissionPattern] {
        self.grants.get(&role).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Whether `role` may perform `action`
    pub fn permits(&self, role: Role, action: &str) -> bool {
        self.patterns(role).iter().any(|pattern| pattern.matches(action))
    }
}

/// Authorization gate consulted before any claim data is processed
#[derive(Debug, Clone)]
pub struct AccessControl {
    table: Arc<PermissionTable>,
}

impl Default for AccessControl {
    fn default() -> Self {
        Self::new(PermissionTable::standard())
    }
}

impl AccessControl {
    pub fn new(table: Arc<PermissionTable>) -> Self {
        Self { table }
    }

    /// Answers whether a role string may perform an action
    ///
    /// Unknown roles hold no permissions and are always denied.
    pub fn is_authorized(&self, role: &str, action: &str) -> bool {
        role.parse::<Role>()
            .map(|role| self.table.permits(role, action))
            .unwrap_or(false)
    }

    /// Like [`is_authorized`](Self::is_authorized) but explains a denial
    pub fn authorize(&self, role: &str, action: &str) -> Result<Role, AccessError> {
        let parsed: Role = role.parse()?;
        if self.table.permits(parsed, action) {
            Ok(parsed)
        } else {
            Err(AccessError::Denied {
                role: parsed.to_string(),
                action: action.to_string(),
            })
        }
    }

    pub fn table(&self) -> &PermissionTable {
        &self.table
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pattern_matching() {
        assert!(PermissionPattern::new("*").matches("anything:at:all"));
        assert!(PermissionPattern::new("claims:*").matches("claims:process"));
        assert!(!PermissionPattern::new("claims:*").matches("clinical:read"));
        assert!(PermissionPattern::new("audit:read").matches("audit:read"));
        assert!(!PermissionPattern::new("audit:read").matches("audit:reader"));
    }

    #[test]
    fn test_standard_table_is_shared() {
        let a = PermissionTable::standard();
        let b = PermissionTable::standard();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn test_role_without_entry_is_denied() {
        let table = PermissionTable::from_entries([(Role::Admin, vec!["*"])]);
        assert!(table.patterns(Role::Nurse).is_empty());
        assert!(!table.permits(Role::Nurse, "patients:read"));
    }

    #[test]
    fn test_authorize_explains_denial() {
        let gate = AccessControl::default();
        assert_eq!(gate.authorize("provider", actions::CLAIMS_PROCESS), Ok(Role::Provider));
        assert!(matches!(
            gate.authorize("nurse", actions::CLAIMS_PROCESS),
            Err(AccessError::Denied { .. })
        ));
        assert!(matches!(
            gate.authorize("janitor", actions::CLAIMS_PROCESS),
            Err(AccessError::UnknownRole(_))
        ));
    }
}
