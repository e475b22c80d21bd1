//! Whole metric-model admission: normalizes a draft and runs the formula and
//! condition validators that apply to its metric and query type.

use std::collections::HashSet;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;

use super::condition::validate_condition;
use super::error::{ValidationError, ValidationResult};
use super::formula::{MetricModelContext, validate_formula};
use super::having::validate_having_condition;
use crate::models::{
    DependMetricModel, DerivedConfig, MetricModelDraft, MetricTask, MetricType, QueryType,
    SqlConfig, UnitType,
};
use crate::utils::duration::{DAY_HOUR, DAY_HOUR_MINUTE, DurationUnit, parse_duration_secs};

pub const OBJECT_NAME_MAX_LENGTH: usize = 40;
pub const COMMENT_MAX_LENGTH: usize = 255;

pub const PROMQL_DATE_FIELD: &str = "@timestamp";
pub const PROMQL_MEASURE_FIELD: &str = "value";
pub const SQL_MEASURE_FIELD: &str = "__sql_value";

pub const SCHEDULE_TYPE_FIXED: &str = "FIX_RATE";
pub const SCHEDULE_TYPE_CRON: &str = "CRON";

pub const PERSIST_STEPS: [&str; 11] =
    ["5m", "10m", "15m", "20m", "30m", "1h", "2h", "3h", "6h", "12h", "1d"];
pub const MAX_RETRACE_POINTS: f64 = 10000.0;

const TAG_FORBIDDEN_CHARS: &str = "*\"\\/<>:|?#";

static MEASURE_NAME_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^__m\.[0-9a-zA-Z]\w*$").expect("measure name pattern is valid"));

static MODEL_REFERENCE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{\{\s*(.*?)\s*\}\}").expect("model reference pattern is valid"));

/// Check and normalize a draft in place.
///
/// On success the draft carries the canonical unit, default date/measure
/// fields, the interval/top_hits flags and a typed `formula_config`.
pub fn validate_metric_model(draft: &mut MetricModelDraft) -> ValidationResult<()> {
    draft.name = draft.name.trim().to_string();
    validate_measure_name(&draft.measure_name)?;

    let metric_type = draft.metric_type.ok_or_else(|| ValidationError::missing_parameter("metric_type"))?;
    tracing::debug!(name = %draft.name, ?metric_type, query_type = ?draft.query_type, "Validating metric model");

    match metric_type {
        MetricType::Atomic => validate_atomic(draft)?,
        MetricType::Derived => validate_derived(draft)?,
        MetricType::Composite => validate_composite(draft)?,
    }

    validate_unit(draft)?;
    draft.tags = normalize_tags(&draft.tags)?;

    if draft.query_type == Some(QueryType::Sql) {
        draft.task = None;
    }
    if let Some(task) = &draft.task {
        validate_task(draft.query_type, task)?;
    }

    for order_by in &draft.order_by_fields {
        if order_by.name.is_empty() {
            return Err(ValidationError::missing_parameter("order_by_fields.name"));
        }
        match order_by.direction.as_str() {
            "" => return Err(ValidationError::missing_parameter("order_by_fields.direction")),
            "asc" | "desc" => {},
            other => {
                return Err(ValidationError::invalid_parameter(
                    "order_by_fields.direction",
                    format!("the order direction '{}' is not desc or asc", other),
                ));
            },
        }
    }

    if let Some(having) = &draft.having_condition {
        validate_having_condition(having)?;
    }

    Ok(())
}

/// Empty means "assign `__m.<id>` later"
pub fn validate_measure_name(measure_name: &str) -> ValidationResult<()> {
    if measure_name.is_empty() {
        return Ok(());
    }

    if measure_name.chars().count() > OBJECT_NAME_MAX_LENGTH {
        return Err(ValidationError::invalid_parameter(
            "measure_name",
            format!("the length of the measure name exceeds {}", OBJECT_NAME_MAX_LENGTH),
        ));
    }

    if !MEASURE_NAME_REGEX.is_match(measure_name) {
        return Err(ValidationError::invalid_parameter(
            "measure_name",
            "the measure name must start with '__m.' followed by a letter or digit, and contain only letters, digits and '_'",
        ));
    }

    Ok(())
}

fn validate_atomic(draft: &mut MetricModelDraft) -> ValidationResult<()> {
    match &draft.data_source {
        Some(source) if !source.id.is_empty() => {},
        _ => return Err(ValidationError::missing_parameter("data_source.id")),
    }

    let query_type = draft.query_type.ok_or_else(|| ValidationError::missing_parameter("query_type"))?;

    match query_type {
        QueryType::Sql => {
            let mut sql: SqlConfig = typed_formula_config(draft)?;

            let structured_yields = match &sql.aggr_expr {
                None if sql.aggr_expr_str.is_empty() => {
                    return Err(ValidationError::missing_parameter("formula_config.aggr_expression"));
                },
                Some(expr) if sql.aggr_expr_str.is_empty() => {
                    if !expr.is_complete() {
                        return Err(ValidationError::missing_parameter("formula_config.aggr_expression"));
                    }
                    false
                },
                Some(expr) => {
                    if expr.is_complete() {
                        return Err(ValidationError::invalid_parameter(
                            "formula_config.aggr_expression",
                            "aggr_expression and aggr_expression_str cannot both be set",
                        ));
                    }
                    true
                },
                None => false,
            };
            // an incomplete structured form yields to the string form
            if structured_yields {
                sql.aggr_expr = None;
            }

            if sql.condition.is_some() && !sql.condition_str.is_empty() {
                return Err(ValidationError::invalid_parameter(
                    "formula_config.condition",
                    "condition and condition_str cannot both be set",
                ));
            }
            validate_condition(sql.condition.as_ref())?;

            draft.formula_config = Some(to_formula_config(&sql)?);
            draft.measure_field = SQL_MEASURE_FIELD.to_string();
            draft.is_calendar_interval = true;
        },
        QueryType::Promql | QueryType::Dsl => {
            if draft.formula.is_empty() {
                return Err(ValidationError::missing_parameter("formula"));
            }
        },
    }

    match query_type {
        QueryType::Promql => {
            if draft.date_field.is_empty() {
                draft.date_field = PROMQL_DATE_FIELD.to_string();
            } else if draft.date_field != PROMQL_DATE_FIELD {
                return Err(ValidationError::DateFieldMismatch(format!(
                    "the date field of a promql metric must be '{}'",
                    PROMQL_DATE_FIELD
                )));
            }

            if draft.measure_field.is_empty() {
                draft.measure_field = PROMQL_MEASURE_FIELD.to_string();
            } else if draft.measure_field != PROMQL_MEASURE_FIELD {
                return Err(ValidationError::MeasureFieldMismatch(format!(
                    "the measure field of a promql metric must be '{}'",
                    PROMQL_MEASURE_FIELD
                )));
            }
        },
        QueryType::Dsl => {
            let mut ctx = MetricModelContext::new(
                non_empty(&draft.date_field),
                non_empty(&draft.measure_field),
            );
            validate_formula(&draft.formula, &mut ctx)?;

            draft.date_field = ctx.declared_date_field.unwrap_or_default();
            draft.is_calendar_interval = ctx.is_calendar_interval;
            draft.contains_top_hits = ctx.contains_top_hits;
        },
        QueryType::Sql => {},
    }

    if draft.measure_field.is_empty() {
        return Err(ValidationError::missing_parameter("measure_field"));
    }

    Ok(())
}

fn validate_derived(draft: &mut MetricModelDraft) -> ValidationResult<()> {
    let mut derived: DerivedConfig = typed_formula_config(draft)?;

    let depend_id = match &derived.depend_metric_model {
        Some(depend) if !depend.id.is_empty() => depend.id.clone(),
        _ => return Err(ValidationError::missing_parameter("formula_config.depend_metric_model.id")),
    };

    let has_structured = derived.date_condition.is_some() || derived.business_condition.is_some();
    if derived.condition_str.is_empty() {
        if !has_structured {
            return Err(ValidationError::missing_parameter(
                "formula_config.date_condition or formula_config.business_condition",
            ));
        }
        validate_condition(derived.date_condition.as_ref())?;
        validate_condition(derived.business_condition.as_ref())?;
    } else if has_structured {
        return Err(ValidationError::invalid_parameter(
            "formula_config.condition_str",
            "structured conditions and condition_str cannot both be set",
        ));
    }

    derived.depend_metric_model = Some(DependMetricModel { id: depend_id, ..Default::default() });
    draft.formula_config = Some(to_formula_config(&derived)?);

    Ok(())
}

fn validate_composite(draft: &mut MetricModelDraft) -> ValidationResult<()> {
    draft.formula = draft.formula.trim().to_string();
    if draft.formula.is_empty() {
        return Err(ValidationError::missing_parameter("formula"));
    }
    if model_references(&draft.formula).is_empty() {
        return Err(ValidationError::invalid_parameter(
            "formula",
            "composite formula must reference at least one metric model as {{id}}",
        ));
    }
    Ok(())
}

/// Metric model ids referenced as `{{id}}` in a composite formula, in order of appearance
pub fn model_references(formula: &str) -> Vec<&str> {
    MODEL_REFERENCE_REGEX
        .captures_iter(formula)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().trim())
        .filter(|id| !id.is_empty())
        .collect()
}

fn typed_formula_config<T: serde::de::DeserializeOwned>(draft: &MetricModelDraft) -> ValidationResult<T> {
    let config = draft
        .formula_config
        .clone()
        .ok_or_else(|| ValidationError::missing_parameter("formula_config"))?;
    serde_json::from_value(config).map_err(|e| {
        ValidationError::invalid_parameter(
            "formula_config",
            format!("[{}]'s formula config cannot be decoded: {}", draft.name, e),
        )
    })
}

fn to_formula_config<T: serde::Serialize>(config: &T) -> ValidationResult<serde_json::Value> {
    serde_json::to_value(config)
        .map_err(|e| ValidationError::invalid_parameter("formula_config", e.to_string()))
}

fn non_empty(field: &str) -> Option<String> {
    (!field.is_empty()).then(|| field.to_string())
}

fn validate_unit(draft: &mut MetricModelDraft) -> ValidationResult<()> {
    let mut unit_type = draft.unit_type.ok_or_else(|| ValidationError::missing_parameter("unit_type"))?;

    if draft.unit == "%" {
        unit_type = UnitType::PercentageUnit;
    }
    if draft.unit.is_empty() {
        return Err(ValidationError::missing_parameter("unit"));
    }

    let canonical = unit_type.canonical_unit(&draft.unit).ok_or_else(|| {
        ValidationError::invalid_parameter(
            "unit",
            format!("'{}' is not a unit of {:?}", draft.unit, unit_type),
        )
    })?;

    draft.unit_type = Some(unit_type);
    draft.unit = canonical.to_string();
    Ok(())
}

/// Trim, check and de-duplicate tags, keeping first occurrences in order
fn normalize_tags(tags: &[String]) -> ValidationResult<Vec<String>> {
    let mut seen = HashSet::new();
    let mut normalized = Vec::with_capacity(tags.len());

    for tag in tags {
        let tag = tag.trim();
        if tag.is_empty() {
            return Err(ValidationError::invalid_parameter("tags", "tag cannot be empty"));
        }
        if tag.chars().count() > OBJECT_NAME_MAX_LENGTH {
            return Err(ValidationError::invalid_parameter(
                "tags",
                format!("the length of tag '{}' exceeds {}", tag, OBJECT_NAME_MAX_LENGTH),
            ));
        }
        if tag.chars().any(|c| TAG_FORBIDDEN_CHARS.contains(c)) {
            return Err(ValidationError::invalid_parameter(
                "tags",
                format!("tag '{}' contains special characters", tag),
            ));
        }
        if seen.insert(tag.to_string()) {
            normalized.push(tag.to_string());
        }
    }

    Ok(normalized)
}

fn positive_duration(parameter: &str, input: &str, units: &[DurationUnit]) -> ValidationResult<u64> {
    let secs = parse_duration_secs(input, units)
        .map_err(|e| ValidationError::invalid_parameter(parameter, e))?;
    if secs == 0 {
        return Err(ValidationError::invalid_parameter(
            parameter,
            format!("zero {} is not accepted, try a positive integer", parameter),
        ));
    }
    Ok(secs)
}

/// Persistence task rules; sql models never reach here
pub fn validate_task(query_type: Option<QueryType>, task: &MetricTask) -> ValidationResult<()> {
    if task.name.chars().count() > OBJECT_NAME_MAX_LENGTH {
        return Err(ValidationError::invalid_parameter(
            "task.name",
            format!("the length of the task name exceeds {}", OBJECT_NAME_MAX_LENGTH),
        ));
    }

    if task.schedule.is_empty() {
        return Err(ValidationError::missing_parameter("task.schedule"));
    }
    if task.schedule.schedule_type.is_empty() {
        return Err(ValidationError::missing_parameter("task.schedule.type"));
    }
    if task.schedule.expression.is_empty() {
        return Err(ValidationError::missing_parameter("task.schedule.expression"));
    }
    match task.schedule.schedule_type.as_str() {
        SCHEDULE_TYPE_FIXED => {
            positive_duration("task.schedule.expression", &task.schedule.expression, DAY_HOUR_MINUTE)?;
        },
        SCHEDULE_TYPE_CRON => {
            let fields = task.schedule.expression.split_whitespace().count();
            if fields != 6 {
                return Err(ValidationError::invalid_parameter(
                    "task.schedule.expression",
                    format!("cron expression must have 6 fields, found {}", fields),
                ));
            }
            cron::Schedule::from_str(&task.schedule.expression).map_err(|e| {
                ValidationError::invalid_parameter(
                    "task.schedule.expression",
                    format!("invalid cron expression: {}", e),
                )
            })?;
        },
        other => {
            return Err(ValidationError::invalid_parameter(
                "task.schedule.type",
                format!("expected {} or {}, actual is '{}'", SCHEDULE_TYPE_FIXED, SCHEDULE_TYPE_CRON, other),
            ));
        },
    }

    match query_type {
        Some(QueryType::Promql) if !task.time_windows.is_empty() => {
            return Err(ValidationError::invalid_parameter(
                "task.time_windows",
                "time windows must be empty when the query type is promql",
            ));
        },
        Some(QueryType::Dsl) => {
            if task.time_windows.is_empty() {
                return Err(ValidationError::missing_parameter("task.time_windows"));
            }
            let mut windows = HashSet::new();
            for window in &task.time_windows {
                if window.is_empty() {
                    return Err(ValidationError::missing_parameter("task.time_windows"));
                }
                if !windows.insert(window.as_str()) {
                    return Err(ValidationError::invalid_parameter(
                        "task.time_windows",
                        format!("time window '{}' is duplicated", window),
                    ));
                }
                positive_duration("task.time_windows", window, DAY_HOUR_MINUTE)?;
            }
        },
        _ => {},
    }

    let retrace_secs = if task.retrace_duration.is_empty() {
        0
    } else {
        positive_duration("task.retrace_duration", &task.retrace_duration, DAY_HOUR)?
    };

    if task.steps.is_empty() {
        return Err(ValidationError::missing_parameter("task.steps"));
    }
    let mut steps = HashSet::new();
    for step in &task.steps {
        if !PERSIST_STEPS.contains(&step.as_str()) {
            return Err(ValidationError::invalid_parameter(
                "task.steps",
                format!("expect persist steps is one of {:?}, actual is '{}'", PERSIST_STEPS, step),
            ));
        }
        if !steps.insert(step.as_str()) {
            return Err(ValidationError::invalid_parameter(
                "task.steps",
                format!("step '{}' is duplicated", step),
            ));
        }

        let step_secs = positive_duration("task.steps", step, DAY_HOUR_MINUTE)?;
        if retrace_secs > 0 && retrace_secs as f64 / step_secs as f64 > MAX_RETRACE_POINTS {
            return Err(ValidationError::invalid_parameter(
                "task.retrace_duration",
                format!(
                    "the task can retrace at most {} points, actual is {} for step {}",
                    MAX_RETRACE_POINTS,
                    retrace_secs / step_secs,
                    step
                ),
            ));
        }
    }

    if task.index_base.is_empty() {
        return Err(ValidationError::missing_parameter("task.index_base"));
    }

    if task.comment.chars().count() > COMMENT_MAX_LENGTH {
        return Err(ValidationError::invalid_parameter(
            "task.comment",
            format!("the length of the task comment exceeds {}", COMMENT_MAX_LENGTH),
        ));
    }

    Ok(())
}
