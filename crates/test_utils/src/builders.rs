//! Test Data Builders
//!
//! Provides builder patterns for constructing test data with sensible defaults.
//! These builders allow tests to specify only the relevant fields while using
//! defaults for everything else.

use serde_json::{json, Value};

use domain_claims::{ClaimField, ClaimRecord};

use crate::fixtures::ClaimFixtures;

/// Builder for constructing claim records
///
/// Starts from the compliant claim fixture; each setter changes one field.
pub struct ClaimRecordBuilder {
    value: Value,
}

impl Default for ClaimRecordBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ClaimRecordBuilder {
    /// Creates a new builder from the compliant claim
    pub fn new() -> Self {
        Self {
            value: ClaimFixtures::compliant_json(),
        }
    }

    /// Creates a builder with no fields at all
    pub fn empty() -> Self {
        Self { value: json!({}) }
    }

    /// Sets the resource id
    pub fn with_id(self, id: impl Into<String>) -> Self {
        self.with_field("id", Value::String(id.into()))
    }

    /// Removes the resource id
    pub fn without_id(mut self) -> Self {
        if let Some(map) = self.value.as_object_mut() {
            map.remove("id");
        }
        self
    }

    /// Sets `patient.reference`
    pub fn with_patient_reference(self, reference: impl Into<String>) -> Self {
        self.with_field("patient", json!({ "reference": reference.into() }))
    }

    /// Replaces the identifier list with a single entry
    pub fn with_identifier(self, system: &str, value: &str) -> Self {
        self.with_field("identifier", json!([{ "system": system, "value": value }]))
    }

    /// Removes a required field
    pub fn without(mut self, field: ClaimField) -> Self {
        if let Some(map) = self.value.as_object_mut() {
            map.remove(field.as_str());
        }
        self
    }

    /// Sets a required field to JSON `null`
    pub fn with_null(self, field: ClaimField) -> Self {
        self.with_field(field.as_str(), Value::Null)
    }

    /// Sets an arbitrary top-level field
    pub fn with_field(mut self, key: &str, value: Value) -> Self {
        if let Some(map) = self.value.as_object_mut() {
            map.insert(key.to_string(), value);
        }
        self
    }

    /// The claim as raw JSON, e.g. for HTTP request bodies
    pub fn build_json(self) -> Value {
        self.value
    }

    /// Builds the claim record
    pub fn build(self) -> ClaimRecord {
        ClaimRecord::from_value(self.value).unwrap()
    }
}
