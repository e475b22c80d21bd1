//! Having clause validation: one numeric comparison against the aggregated value

use std::mem;

use serde_json::Value;

use super::condition::{non_empty_array, pair};
use super::error::{ValidationError, ValidationResult};
use super::operation::{HAVING_VALUE_FIELD, Operation};
use crate::models::CondCfg;

pub fn validate_having_condition(having: &CondCfg) -> ValidationResult<()> {
    if having.name != HAVING_VALUE_FIELD {
        return Err(ValidationError::InvalidHavingField(format!(
            "having condition field must be '{}', actual is '{}'",
            HAVING_VALUE_FIELD, having.name
        )));
    }

    if having.operation.is_empty() {
        return Err(ValidationError::MissingOperation(
            "having condition operation is required".to_string(),
        ));
    }

    let operation = Operation::parse_having(&having.operation).ok_or_else(|| {
        ValidationError::UnsupportedOperation(format!(
            "unsupported having condition operation '{}'",
            having.operation
        ))
    })?;

    let value = match having.value.as_ref() {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) if s.is_empty() => None,
        Some(value) => Some(value),
    };
    let Some(value) = value else {
        return Err(ValidationError::filter_value(
            operation.as_str(),
            "having condition value is required",
        ));
    };

    match operation {
        Operation::In | Operation::NotIn => {
            let items = non_empty_array(operation, Some(value))?;
            uniform_numbers(operation, items.iter())
        },
        Operation::Range | Operation::OutRange => {
            let [low, high] = pair(operation, Some(value))?;
            uniform_numbers(operation, [low, high].into_iter())
        },
        _ => {
            if value.is_array() {
                return Err(ValidationError::filter_value(
                    operation.as_str(),
                    "value should be a single value",
                ));
            }
            if !value.is_number() {
                return Err(ValidationError::filter_value(
                    operation.as_str(),
                    "value should be a number in having condition",
                ));
            }
            Ok(())
        },
    }
}

fn uniform_numbers<'v>(
    operation: Operation,
    mut items: impl Iterator<Item = &'v Value>,
) -> ValidationResult<()> {
    let Some(first) = items.next() else {
        return Ok(());
    };

    if items.any(|item| mem::discriminant(item) != mem::discriminant(first)) {
        return Err(ValidationError::filter_value(
            operation.as_str(),
            "value should be an array composed of elements of the same type",
        ));
    }

    if !first.is_number() {
        return Err(ValidationError::filter_value(
            operation.as_str(),
            "value should be a number array in having condition",
        ));
    }

    Ok(())
}
