//! Known workflows and where their webhooks live

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use domain_claims::CLAIM_PROCESSING_WORKFLOW;

/// A workflow the engine exposes through a webhook
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowDefinition {
    pub name: String,
    /// Path appended to the webhook base URL
    pub webhook_path: String,
    pub description: String,
}

/// Registry of dispatchable workflows
///
/// Dispatches naming a workflow outside the catalog are rejected before any
/// network I/O.
#[derive(Debug, Clone, Default)]
pub struct WorkflowCatalog {
    workflows: HashMap<String, WorkflowDefinition>,
}

impl WorkflowCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog with the claim processing workflow registered
    pub fn standard() -> Self {
        Self::new().with_workflow(
            CLAIM_PROCESSING_WORKFLOW,
            "claim-processing",
            "Validated claim hand-off for submission and revenue-cycle tracking",
        )
    }

    /// Registers (or replaces) a workflow
    pub fn with_workflow(
        mut self,
        name: impl Into<String>,
        webhook_path: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        let name = name.into();
        self.workflows.insert(
            name.clone(),
            WorkflowDefinition {
                name,
                webhook_path: webhook_path.into(),
                description: description.into(),
            },
        );
        self
    }

    pub fn get(&self, name: &str) -> Option<&WorkflowDefinition> {
        self.workflows.get(name)
    }

    /// Registered workflow names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.workflows.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_catalog() {
        let catalog = WorkflowCatalog::standard();
        let definition = catalog.get("claim_processing").unwrap();
        assert_eq!(definition.webhook_path, "claim-processing");
        assert!(catalog.get("clinical_decision_support").is_none());
    }

    #[test]
    fn test_with_workflow_replaces() {
        let catalog = WorkflowCatalog::standard()
            .with_workflow("claim_processing", "v2/claims", "v2")
            .with_workflow("compliance_monitor", "compliance-monitor", "Compliance reporting");

        assert_eq!(catalog.get("claim_processing").unwrap().webhook_path, "v2/claims");
        assert_eq!(catalog.names(), vec!["claim_processing", "compliance_monitor"]);
    }
}
