//! Filter condition tree validation

use serde_json::Value;

use super::error::{ValidationError, ValidationResult};
use super::operation::{FORBIDDEN_FILTER_FIELDS, MAX_SUB_CONDITIONS, Operation, ValueOrigin};
use crate::models::CondCfg;

/// Typed view over a non-empty [`CondCfg`] whose operation has been resolved
#[derive(Debug, Clone, PartialEq)]
pub enum ConditionNode<'a> {
    Composite {
        operator: Operation,
        children: &'a [CondCfg],
    },
    Leaf {
        field: &'a str,
        operation: Operation,
        value: Option<&'a Value>,
        /// `None` only for value-optional operations with an unknown origin
        value_from: Option<ValueOrigin>,
    },
}

impl<'a> ConditionNode<'a> {
    /// Resolve the node's operation and check everything except the value shape
    pub fn from_cfg(cfg: &'a CondCfg) -> ValidationResult<Self> {
        if FORBIDDEN_FILTER_FIELDS.contains(&cfg.name.as_str()) {
            return Err(ValidationError::ForbiddenFilterField(format!(
                "the filter field '{}' is not allowed",
                cfg.name
            )));
        }

        if cfg.operation.is_empty() {
            return Err(ValidationError::MissingOperation(
                "condition operation is required".to_string(),
            ));
        }

        let operation = Operation::parse(&cfg.operation).ok_or_else(|| {
            ValidationError::UnsupportedOperation(format!(
                "unsupported condition operation '{}'",
                cfg.operation
            ))
        })?;

        if operation.is_logical() {
            if cfg.sub_conds.len() > MAX_SUB_CONDITIONS {
                return Err(ValidationError::TooManySubconditions(format!(
                    "the number of sub conditions of [{}] exceeds {}",
                    operation, MAX_SUB_CONDITIONS
                )));
            }
            return Ok(Self::Composite { operator: operation, children: &cfg.sub_conds });
        }

        if cfg.name.is_empty() {
            return Err(ValidationError::MissingFieldName(format!(
                "[{}] condition requires a field name",
                operation
            )));
        }

        let value_from = ValueOrigin::parse(cfg.value_from.as_deref());
        if !operation.is_value_optional() && value_from != Some(ValueOrigin::Const) {
            return Err(ValidationError::UnsupportedValueOrigin(format!(
                "condition does not support value_from '{}'",
                cfg.value_from.as_deref().unwrap_or_default()
            )));
        }

        Ok(Self::Leaf { field: &cfg.name, operation, value: cfg.value.as_ref(), value_from })
    }
}

/// Validate an optional filter tree. `None` and `{}` mean "no filter".
///
/// Pure: the tree is only read, and the first violation found depth first is
/// returned.
pub fn validate_condition(cond: Option<&CondCfg>) -> ValidationResult<()> {
    let Some(cond) = cond else {
        return Ok(());
    };
    if cond.is_empty() {
        return Ok(());
    }

    match ConditionNode::from_cfg(cond)? {
        ConditionNode::Composite { children, .. } => {
            for child in children {
                validate_condition(Some(child))?;
            }
            Ok(())
        },
        ConditionNode::Leaf { operation, value, .. } => check_filter_value(operation, value),
    }
}

fn check_filter_value(operation: Operation, value: Option<&Value>) -> ValidationResult<()> {
    if operation.is_single_value() {
        return check_single_value(operation, value);
    }

    match operation {
        Operation::In | Operation::NotIn => {
            non_empty_array(operation, value)?;
            Ok(())
        },
        Operation::Range | Operation::OutRange | Operation::Between => {
            pair(operation, value)?;
            Ok(())
        },
        Operation::Before => {
            let [amount, unit] = pair(operation, value)?;
            if !amount.is_number() {
                return Err(ValidationError::filter_value(
                    operation.as_str(),
                    "the first value should be a number",
                ));
            }
            if !unit.is_string() {
                return Err(ValidationError::filter_value(
                    operation.as_str(),
                    "the second value should be a time unit string",
                ));
            }
            Ok(())
        },
        // logical and value-optional operations carry no value to check
        _ => Ok(()),
    }
}

fn check_single_value(operation: Operation, value: Option<&Value>) -> ValidationResult<()> {
    if matches!(value, Some(Value::Array(_))) {
        return Err(ValidationError::filter_value(
            operation.as_str(),
            "value should be a single value",
        ));
    }

    if !operation.requires_string() {
        return Ok(());
    }

    let Some(Value::String(text)) = value else {
        return Err(ValidationError::filter_value(operation.as_str(), "value should be a string"));
    };

    if operation == Operation::Regex {
        regex::Regex::new(text).map_err(|e| {
            ValidationError::filter_value(
                operation.as_str(),
                format!("regular expression error: {}", e),
            )
        })?;
    }

    Ok(())
}

/// The value as an array with at least one element
pub(super) fn non_empty_array(operation: Operation, value: Option<&Value>) -> ValidationResult<&Vec<Value>> {
    let Some(Value::Array(items)) = value else {
        return Err(ValidationError::filter_value(operation.as_str(), "value must be an array"));
    };
    if items.is_empty() {
        return Err(ValidationError::filter_value(
            operation.as_str(),
            "value should contain at least 1 value",
        ));
    }
    Ok(items)
}

/// The value as an array of exactly two elements
pub(super) fn pair(operation: Operation, value: Option<&Value>) -> ValidationResult<[&Value; 2]> {
    let Some(Value::Array(items)) = value else {
        return Err(ValidationError::filter_value(operation.as_str(), "value must be an array"));
    };
    match items.as_slice() {
        [first, second] => Ok([first, second]),
        _ => Err(ValidationError::filter_value(
            operation.as_str(),
            format!("value must contain 2 values, found {}", items.len()),
        )),
    }
}
