//! Typed view over one level of the aggregation DSL
//!
//! A formula is a chain of single-entry maps: `{"<name>": {"<type>": {...}, "aggs": {...}}}`.
//! Only one level is decoded at a time so the walk in `formula` can stop at the
//! first violation without decoding the rest of the tree.

use serde::Deserialize;
use serde_json::{Map, Value};

use super::error::{ValidationError, ValidationResult};

/// Key holding the nested aggregation map
pub const AGGS: &str = "aggs";
/// Long-form alias of [`AGGS`]
pub const AGGREGATIONS: &str = "aggregations";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BucketKind {
    Terms,
    Filters,
    Range,
    DateRange,
    DateHistogram,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    ValueCount,
    Cardinality,
    Sum,
    Avg,
    Max,
    Min,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AggregationType {
    Bucket(BucketKind),
    Metric(MetricKind),
    TopHits,
}

impl AggregationType {
    fn from_key(key: &str) -> Option<Self> {
        let ty = match key {
            "terms" => Self::Bucket(BucketKind::Terms),
            "filters" => Self::Bucket(BucketKind::Filters),
            "range" => Self::Bucket(BucketKind::Range),
            "date_range" => Self::Bucket(BucketKind::DateRange),
            "date_histogram" => Self::Bucket(BucketKind::DateHistogram),
            "value_count" => Self::Metric(MetricKind::ValueCount),
            "cardinality" => Self::Metric(MetricKind::Cardinality),
            "sum" => Self::Metric(MetricKind::Sum),
            "avg" => Self::Metric(MetricKind::Avg),
            "max" => Self::Metric(MetricKind::Max),
            "min" => Self::Metric(MetricKind::Min),
            "top_hits" => Self::TopHits,
            _ => return None,
        };
        Some(ty)
    }
}

impl BucketKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Terms => "terms",
            Self::Filters => "filters",
            Self::Range => "range",
            Self::DateRange => "date_range",
            Self::DateHistogram => "date_histogram",
        }
    }
}

impl MetricKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ValueCount => "value_count",
            Self::Cardinality => "cardinality",
            Self::Sum => "sum",
            Self::Avg => "avg",
            Self::Max => "max",
            Self::Min => "min",
        }
    }
}

/// Bucket width of a date_histogram
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntervalSpec {
    Fixed(String),
    Calendar(String),
}

impl IntervalSpec {
    /// Read the interval of a date_histogram body.
    ///
    /// The legacy `interval` key is refused outright; otherwise exactly one of
    /// `fixed_interval` / `calendar_interval` must be present.
    pub fn from_body(name: &str, body: &Map<String, Value>) -> ValidationResult<Self> {
        if body.contains_key("interval") {
            return Err(ValidationError::DeprecatedInterval(format!(
                "date_histogram '{}' uses 'interval', use 'fixed_interval' or 'calendar_interval' instead",
                name
            )));
        }

        match (body.get("fixed_interval"), body.get("calendar_interval")) {
            (Some(fixed), None) => Ok(Self::Fixed(interval_text(fixed))),
            (None, Some(calendar)) => Ok(Self::Calendar(interval_text(calendar))),
            (Some(_), Some(_)) => Err(ValidationError::AmbiguousInterval(format!(
                "date_histogram '{}' sets both fixed_interval and calendar_interval",
                name
            ))),
            (None, None) => Err(ValidationError::AmbiguousInterval(format!(
                "date_histogram '{}' sets neither fixed_interval nor calendar_interval",
                name
            ))),
        }
    }

    pub fn is_calendar(&self) -> bool {
        matches!(self, Self::Calendar(_))
    }
}

fn interval_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// `top_hits` body; only the fields admission looks at
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct TopHitsSpec {
    #[serde(default)]
    pub size: i64,
    #[serde(default, rename = "_source")]
    pub source: TopHitsSource,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct TopHitsSource {
    #[serde(default)]
    pub includes: Vec<String>,
}

/// One decoded aggregation. Bucket children stay undecoded until the walk
/// descends into them.
#[derive(Debug, Clone, PartialEq)]
pub enum AggregationNode<'a> {
    Bucket {
        kind: BucketKind,
        interval_spec: Option<IntervalSpec>,
        child: Option<&'a Value>,
    },
    Metric {
        kind: MetricKind,
        field: Option<String>,
    },
    TopHits(TopHitsSpec),
}

impl<'a> AggregationNode<'a> {
    /// Decode the definition stored under aggregation `name`
    pub fn parse(name: &str, definition: &'a Value) -> ValidationResult<Self> {
        let definition = definition.as_object().ok_or_else(|| {
            ValidationError::MalformedFormula(format!("aggregation '{}' is not a map", name))
        })?;

        let mut declared: Option<(AggregationType, &'a Value)> = None;
        let mut child: Option<&'a Value> = None;

        for (key, value) in definition {
            if key == AGGS || key == AGGREGATIONS {
                if child.is_some() {
                    return Err(ValidationError::MalformedFormula(format!(
                        "aggregation '{}' sets both '{}' and '{}'",
                        name, AGGS, AGGREGATIONS
                    )));
                }
                child = Some(value);
                continue;
            }

            let ty = AggregationType::from_key(key).ok_or_else(|| {
                ValidationError::UnsupportedAggregationType(format!(
                    "'{}' in aggregation '{}'",
                    key, name
                ))
            })?;
            if declared.is_some() {
                return Err(ValidationError::MalformedFormula(format!(
                    "aggregation '{}' declares more than one aggregation type",
                    name
                )));
            }
            declared = Some((ty, value));
        }

        let (ty, body) = declared.ok_or_else(|| {
            ValidationError::MalformedFormula(format!(
                "aggregation '{}' declares no aggregation type",
                name
            ))
        })?;

        match ty {
            AggregationType::Bucket(kind) => {
                let interval_spec = if kind == BucketKind::DateHistogram {
                    let body = body.as_object().ok_or_else(|| {
                        ValidationError::MalformedFormula(format!(
                            "date_histogram '{}' is not a map",
                            name
                        ))
                    })?;
                    Some(IntervalSpec::from_body(name, body)?)
                } else {
                    None
                };
                Ok(Self::Bucket { kind, interval_spec, child })
            },
            AggregationType::Metric(kind) => {
                if child.is_some() {
                    return Err(ValidationError::MalformedFormula(format!(
                        "metric aggregation '{}' cannot contain sub-aggregations",
                        name
                    )));
                }
                let field = body.get("field").and_then(Value::as_str).map(str::to_string);
                Ok(Self::Metric { kind, field })
            },
            AggregationType::TopHits => {
                if child.is_some() {
                    return Err(ValidationError::MalformedFormula(format!(
                        "top_hits aggregation '{}' cannot contain sub-aggregations",
                        name
                    )));
                }
                let spec = TopHitsSpec::deserialize(body).map_err(|e| {
                    ValidationError::MalformedFormula(format!(
                        "top_hits '{}' cannot be decoded: {}",
                        name, e
                    ))
                })?;
                Ok(Self::TopHits(spec))
            },
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Bucket { kind, .. } => kind.as_str(),
            Self::Metric { kind, .. } => kind.as_str(),
            Self::TopHits(_) => "top_hits",
        }
    }
}
