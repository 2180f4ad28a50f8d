//! Claim records
//!
//! A claim arrives as a FHIR-shaped JSON object built by the caller. The core
//! only reads the handful of fields the compliance rules look at; everything
//! else passes through untouched to the workflow engine.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ClaimError;

/// Fields a compliant claim must carry, in the order they are checked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClaimField {
    Identifier,
    Status,
    Type,
    Patient,
    Provider,
    Priority,
    Procedure,
    Insurance,
    Total,
}

impl ClaimField {
    /// Required fields in declaration order. Validation errors are reported
    /// in exactly this order.
    pub const REQUIRED: [ClaimField; 9] = [
        ClaimField::Identifier,
        ClaimField::Status,
        ClaimField::Type,
        ClaimField::Patient,
        ClaimField::Provider,
        ClaimField::Priority,
        ClaimField::Procedure,
        ClaimField::Insurance,
        ClaimField::Total,
    ];

    /// JSON key of the field in the claim resource
    pub fn as_str(&self) -> &'static str {
        match self {
            ClaimField::Identifier => "identifier",
            ClaimField::Status => "status",
            ClaimField::Type => "type",
            ClaimField::Patient => "patient",
            ClaimField::Provider => "provider",
            ClaimField::Priority => "priority",
            ClaimField::Procedure => "procedure",
            ClaimField::Insurance => "insurance",
            ClaimField::Total => "total",
        }
    }
}

impl fmt::Display for ClaimField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single entry of the claim's `identifier` list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimIdentifier {
    pub system: Option<String>,
    pub value: Option<String>,
}

/// An externally constructed claim resource
///
/// Wraps the JSON object as received. A key whose value is JSON `null` is
/// treated exactly like a missing key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Value", into = "Value")]
pub struct ClaimRecord {
    fields: Map<String, Value>,
}

impl ClaimRecord {
    /// Wraps a JSON value, which must be an object
    pub fn from_value(value: Value) -> Result<Self, ClaimError> {
        match value {
            Value::Object(fields) => Ok(Self { fields }),
            other => Err(ClaimError::NotAnObject(json_type_name(&other).to_string())),
        }
    }

    /// Returns a field value, or `None` when the field is absent or null
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key).filter(|v| !v.is_null())
    }

    /// Returns a required field's value, or `None` when absent or null
    pub fn field(&self, field: ClaimField) -> Option<&Value> {
        self.get(field.as_str())
    }

    /// Whether a required field is present with a non-null value
    pub fn has(&self, field: ClaimField) -> bool {
        self.field(field).is_some()
    }

    /// The resource `id`, if the caller supplied one
    pub fn id(&self) -> Option<&str> {
        self.get("id").and_then(Value::as_str)
    }

    /// Entries of the `identifier` list. Non-object entries are skipped.
    pub fn identifiers(&self) -> Vec<ClaimIdentifier> {
        let Some(Value::Array(entries)) = self.field(ClaimField::Identifier) else {
            return Vec::new();
        };

        entries
            .iter()
            .filter_map(Value::as_object)
            .map(|entry| ClaimIdentifier {
                system: entry.get("system").and_then(Value::as_str).map(str::to_string),
                value: entry.get("value").and_then(Value::as_str).map(str::to_string),
            })
            .collect()
    }

    /// The identifier used to label this claim in audit records: the
    /// resource `id`, else the first identifier value, else `"unknown"`
    pub fn resource_id(&self) -> String {
        self.id()
            .map(str::to_string)
            .or_else(|| self.identifiers().into_iter().find_map(|i| i.value))
            .unwrap_or_else(|| "unknown".to_string())
    }

    /// The patient reference string checked against the national ID rule
    ///
    /// Reads `patient.reference` or accepts a bare string, verbatim. A
    /// FHIR-style `Patient/<id>` reference is not unwrapped, so it fails the
    /// national ID rule. Anything else yields an empty string.
    pub fn patient_reference(&self) -> String {
        let reference = match self.field(ClaimField::Patient) {
            Some(Value::Object(patient)) => patient
                .get("reference")
                .and_then(Value::as_str)
                .unwrap_or_default(),
            Some(Value::String(reference)) => reference.as_str(),
            _ => "",
        };

        reference.to_string()
    }
}

impl TryFrom<Value> for ClaimRecord {
    type Error = ClaimError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Self::from_value(value)
    }
}

impl From<ClaimRecord> for Value {
    fn from(record: ClaimRecord) -> Value {
        Value::Object(record.fields)
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
