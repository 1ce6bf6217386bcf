/// Payload validation helpers
///
/// Request payloads derive [`validator::Validate`]; this module flattens the
/// resulting errors into [`ValidationIssue`]s (one per failing field) and
/// hosts the custom rules used by the payloads.

use crate::models::todo::TodoStatus;
use crate::response::ValidationIssue;
use std::borrow::Cow;
use validator::{Validate, ValidationError, ValidationErrors};

/// Fields whose rejected value must never be echoed back
const REDACTED_FIELDS: &[&str] = &["password"];

/// Rule code reported ahead of any other rule on the same field
const REQUIRED: &str = "required";

/// Validates `payload`, returning every failing field on error
pub fn validate_payload<T: Validate>(payload: &T) -> Result<(), Vec<ValidationIssue>> {
    payload.validate().map_err(|e| issues_from(&e))
}

/// Flattens validator errors, sorted by field name for stable output
///
/// A field failing several rules reports only one: `required` when it
/// failed, otherwise the first rule declared on the field.
pub fn issues_from(errors: &ValidationErrors) -> Vec<ValidationIssue> {
    let mut issues: Vec<ValidationIssue> = errors
        .field_errors()
        .iter()
        .filter_map(|(field, errors)| {
            let error = errors
                .iter()
                .find(|e| e.code == REQUIRED)
                .or_else(|| errors.first())?;

            let value = if REDACTED_FIELDS.contains(field) {
                serde_json::Value::Null
            } else {
                error
                    .params
                    .get("value")
                    .cloned()
                    .unwrap_or(serde_json::Value::Null)
            };

            Some(ValidationIssue {
                field: field.to_string(),
                tag: error.code.to_string(),
                value,
            })
        })
        .collect();

    issues.sort_by(|a, b| a.field.cmp(&b.field));
    issues
}

/// Custom rule: the value must name a [`TodoStatus`]
pub fn validate_todo_status(value: &str) -> Result<(), ValidationError> {
    if TodoStatus::parse(value).is_some() {
        return Ok(());
    }

    let mut error = ValidationError::new("todo_status");
    error.add_param(Cow::Borrowed("value"), &value);
    Err(error)
}
