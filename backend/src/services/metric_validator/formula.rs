//! Aggregation tree ("DSL formula") validation
//!
//! Walks the single-path aggregation chain once, depth first, and checks that
//! it forms `[bucket]* -> date_histogram -> metric` with globally unique names.
//! The model context is only written after every check has passed.

use std::collections::HashMap;

use serde_json::Value;

use super::aggregation::{AGGREGATIONS, AGGS, AggregationNode, BucketKind, IntervalSpec};
use super::error::{ValidationError, ValidationResult};
use super::top_hits::validate_top_hits;

/// Six bucket levels plus the value level
pub const MAX_AGGREGATION_DEPTH: usize = 7;

/// Model-level fields the formula is cross-checked against and normalizes
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetricModelContext {
    pub declared_date_field: Option<String>,
    pub declared_measure_field: Option<String>,
    pub is_calendar_interval: bool,
    pub contains_top_hits: bool,
}

impl MetricModelContext {
    pub fn new(date_field: Option<String>, measure_field: Option<String>) -> Self {
        Self {
            declared_date_field: date_field,
            declared_measure_field: measure_field,
            ..Default::default()
        }
    }
}

/// Per-call accumulator threaded through the recursive walk
#[derive(Debug, Default)]
struct WalkState {
    depth: usize,
    /// aggregation name -> depth it was declared at, across the whole tree
    declared_at: HashMap<String, usize>,
    date_histograms: Vec<String>,
    metric_aggregations: Vec<String>,
    contains_top_hits: bool,
    calendar_interval: bool,
}

/// Validate a serialized formula and normalize `ctx` on success.
///
/// The document must look like `{"size": 0, "aggs": {<one aggregation>}}`.
/// On error `ctx` is left untouched and the first violation is returned.
pub fn validate_formula(formula: impl AsRef<[u8]>, ctx: &mut MetricModelContext) -> ValidationResult<()> {
    let dsl: Value = serde_json::from_slice(formula.as_ref()).map_err(|e| {
        ValidationError::MalformedFormula(format!("DSL unmarshal error: {}", e))
    })?;
    let dsl = dsl
        .as_object()
        .ok_or_else(|| ValidationError::MalformedFormula("DSL must be a JSON object".to_string()))?;

    match dsl.get("size") {
        Some(size) if size.as_f64() == Some(0.0) => {},
        other => {
            return Err(ValidationError::MalformedFormula(format!(
                "the size of dsl expected 0, actual is {}",
                other.map(Value::to_string).unwrap_or_else(|| "missing".to_string())
            )));
        },
    }

    let root = match (dsl.get(AGGS), dsl.get(AGGREGATIONS)) {
        (Some(root), None) | (None, Some(root)) => root,
        (Some(_), Some(_)) => {
            return Err(ValidationError::MalformedFormula(format!(
                "DSL sets both '{}' and '{}'",
                AGGS, AGGREGATIONS
            )));
        },
        (None, None) => {
            return Err(ValidationError::MalformedFormula("DSL missing aggregation".to_string()));
        },
    };

    let measure_field = declared(&ctx.declared_measure_field).unwrap_or_default();
    let mut state = WalkState::default();
    walk_aggregations(root, measure_field, &mut state)?;

    state.commit(ctx)
}

fn declared(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|f| !f.is_empty())
}

fn walk_aggregations(aggs: &Value, measure_field: &str, state: &mut WalkState) -> ValidationResult<()> {
    let aggs = aggs.as_object().ok_or_else(|| {
        ValidationError::MalformedFormula("the aggregation of dsl is not a map".to_string())
    })?;

    let mut entries = aggs.iter();
    let (name, definition) = match (entries.next(), entries.next()) {
        (Some(entry), None) => entry,
        _ => {
            return Err(ValidationError::MultipleAggregations(format!(
                "expected exactly one aggregation per level, found {} {:?}",
                aggs.len(),
                aggs.keys().collect::<Vec<_>>()
            )));
        },
    };

    if state.declared_at.contains_key(name) {
        return Err(ValidationError::DuplicateAggregationName(format!(
            "aggregation name '{}' is used on more than one layer",
            name
        )));
    }

    state.depth += 1;
    if state.depth > MAX_AGGREGATION_DEPTH {
        return Err(ValidationError::TooDeep(format!(
            "the number of aggregation layers must not exceed {}",
            MAX_AGGREGATION_DEPTH
        )));
    }
    state.declared_at.insert(name.clone(), state.depth);

    let node = AggregationNode::parse(name, definition)?;
    tracing::debug!(
        aggregation = %name,
        kind = node.type_name(),
        depth = state.depth,
        "Validating aggregation layer"
    );

    match node {
        AggregationNode::Bucket { kind: BucketKind::DateHistogram, interval_spec, child } => {
            if interval_spec.as_ref().is_some_and(IntervalSpec::is_calendar) {
                state.calendar_interval = true;
            }
            state.date_histograms.push(name.clone());
            if let Some(child) = child {
                walk_aggregations(child, measure_field, state)?;
            }
        },
        AggregationNode::Bucket { child, .. } => {
            if let Some(child) = child {
                walk_aggregations(child, measure_field, state)?;
            }
        },
        AggregationNode::Metric { .. } => {
            state.metric_aggregations.push(name.clone());
        },
        AggregationNode::TopHits(spec) => {
            let measure = validate_top_hits(&spec, measure_field)?;
            // top_hits has no children, so its value sits on the node's own layer
            state.declared_at.insert(measure.clone(), state.depth);
            state.metric_aggregations.push(measure);
            state.contains_top_hits = true;
        },
    }

    Ok(())
}

impl WalkState {
    /// Run the whole-tree checks, then write the normalized fields into `ctx`
    fn commit(self, ctx: &mut MetricModelContext) -> ValidationResult<()> {
        let date_histogram = match self.date_histograms.as_slice() {
            [name] => name,
            found => {
                return Err(ValidationError::MissingOrDuplicateDateHistogram(format!(
                    "only one date_histogram aggregation should be included in dsl, found {}",
                    found.len()
                )));
            },
        };

        let metric = match self.metric_aggregations.as_slice() {
            [name] => name,
            found => {
                return Err(ValidationError::MissingOrDuplicateMetricAggregation(format!(
                    "one metric aggregation should be included in dsl, found {}",
                    found.len()
                )));
            },
        };

        if let Some(measure_field) = declared(&ctx.declared_measure_field)
            && measure_field != metric
        {
            return Err(ValidationError::MeasureFieldMismatch(format!(
                "measure field '{}' should be the name of the metric aggregation '{}'",
                measure_field, metric
            )));
        }

        if let Some(date_field) = declared(&ctx.declared_date_field)
            && date_field != date_histogram
        {
            return Err(ValidationError::DateFieldMismatch(format!(
                "date field '{}' should be the name of the date_histogram aggregation '{}'",
                date_field, date_histogram
            )));
        }

        let date_depth = self.declared_at.get(date_histogram).copied();
        let metric_depth = self.declared_at.get(metric).copied();
        if date_depth.map(|depth| depth + 1) != metric_depth {
            return Err(ValidationError::MetricNotDirectChildOfDateHistogram(format!(
                "the sub aggregation of date_histogram '{}' needs to be the metric aggregation '{}'",
                date_histogram, metric
            )));
        }

        if declared(&ctx.declared_date_field).is_none() {
            ctx.declared_date_field = Some(date_histogram.clone());
        }
        if self.calendar_interval {
            ctx.is_calendar_interval = true;
        }
        if self.contains_top_hits {
            ctx.contains_top_hits = true;
        }

        Ok(())
    }
}
