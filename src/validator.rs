//! Validation of collected settings against their JSON Schema.

use serde_json::Value;

use crate::error::{ValidateError, ValidationIssue};

/// Validate a value against a raw JSON Schema document.
///
/// The prompter only checks answers leaf by leaf; this catches
/// cross-field constraints (patterns, ranges, `anyOf` branches the operator
/// did not pick) and hand-edited settings before they reach the daemon.
///
/// # Errors
///
/// Returns `ValidateError::InvalidSchema` if the schema cannot be compiled,
/// or `ValidateError::Invalid` listing every violation.
pub fn validate(schema: &Value, value: &Value) -> Result<(), ValidateError> {
    let validator =
        jsonschema::validator_for(schema).map_err(|e| ValidateError::InvalidSchema {
            message: e.to_string(),
        })?;

    let errors: Vec<ValidationIssue> = validator
        .iter_errors(value)
        .map(|e| ValidationIssue {
            path: e.instance_path.to_string(),
            message: e.to_string(),
        })
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ValidateError::Invalid { errors })
    }
}
