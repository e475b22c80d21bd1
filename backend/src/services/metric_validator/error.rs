use thiserror::Error;

/// Rejection raised while admitting a metric definition.
///
/// One variant per violation kind, each with a free-text detail. Validation is
/// fail-fast, so a single call reports at most one of these.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    // Formula shape
    #[error("Malformed formula: {0}")]
    MalformedFormula(String),

    #[error("Multiple aggregations are not supported: {0}")]
    MultipleAggregations(String),

    #[error("Aggregation tree too deep: {0}")]
    TooDeep(String),

    #[error("Duplicate aggregation name: {0}")]
    DuplicateAggregationName(String),

    #[error("The interval has been abandoned: {0}")]
    DeprecatedInterval(String),

    #[error("Ambiguous date_histogram interval: {0}")]
    AmbiguousInterval(String),

    #[error("Unsupported aggregation type: {0}")]
    UnsupportedAggregationType(String),

    // Formula semantics
    #[error("Exactly one date_histogram aggregation is required: {0}")]
    MissingOrDuplicateDateHistogram(String),

    #[error("Exactly one metric aggregation is required: {0}")]
    MissingOrDuplicateMetricAggregation(String),

    #[error("Measure field mismatch: {0}")]
    MeasureFieldMismatch(String),

    #[error("Date field mismatch: {0}")]
    DateFieldMismatch(String),

    #[error("Metric aggregation must directly follow the date_histogram: {0}")]
    MetricNotDirectChildOfDateHistogram(String),

    // top_hits
    #[error("Invalid top_hits size: {0}")]
    InvalidTopHitsSize(String),

    #[error("Empty top_hits includes: {0}")]
    EmptyTopHitsIncludes(String),

    #[error("Measure field is not one of the top_hits includes: {0}")]
    MeasureFieldNotInTopHitsIncludes(String),

    // Conditions
    #[error("Forbidden filter field: {0}")]
    ForbiddenFilterField(String),

    #[error("Missing condition operation: {0}")]
    MissingOperation(String),

    #[error("Unsupported condition operation: {0}")]
    UnsupportedOperation(String),

    #[error("Too many sub-conditions: {0}")]
    TooManySubconditions(String),

    #[error("Missing filter field name: {0}")]
    MissingFieldName(String),

    #[error("Unsupported value_from: {0}")]
    UnsupportedValueOrigin(String),

    #[error("Invalid value for [{operation}] operation: {detail}")]
    InvalidFilterValueShape { operation: String, detail: String },

    #[error("Invalid having condition field: {0}")]
    InvalidHavingField(String),

    // Model-level parameters
    #[error("Missing parameter: {0}")]
    MissingParameter(String),

    #[error("Invalid parameter {parameter}: {detail}")]
    InvalidParameter { parameter: String, detail: String },
}

/// Which part of a metric definition a rejection belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorScope {
    Formula,
    Condition,
    Parameter,
}

impl ValidationError {
    pub fn filter_value(operation: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::InvalidFilterValueShape { operation: operation.into(), detail: detail.into() }
    }

    pub fn invalid_parameter(parameter: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::InvalidParameter { parameter: parameter.into(), detail: detail.into() }
    }

    pub fn missing_parameter(parameter: impl Into<String>) -> Self {
        Self::MissingParameter(parameter.into())
    }

    /// Stable machine-readable code, returned to clients next to the message
    pub fn code(&self) -> &'static str {
        match self {
            Self::MalformedFormula(_) => "MetricModel.Formula.Malformed",
            Self::MultipleAggregations(_) => "MetricModel.Formula.MultipleAggregations",
            Self::TooDeep(_) => "MetricModel.Formula.TooDeep",
            Self::DuplicateAggregationName(_) => "MetricModel.Formula.DuplicateAggregationName",
            Self::DeprecatedInterval(_) => "MetricModel.Formula.DeprecatedInterval",
            Self::AmbiguousInterval(_) => "MetricModel.Formula.AmbiguousInterval",
            Self::UnsupportedAggregationType(_) => "MetricModel.Formula.UnsupportedAggregationType",
            Self::MissingOrDuplicateDateHistogram(_) => "MetricModel.Formula.DateHistogramCount",
            Self::MissingOrDuplicateMetricAggregation(_) => "MetricModel.Formula.MetricAggregationCount",
            Self::MeasureFieldMismatch(_) => "MetricModel.InvalidParameter.MeasureField",
            Self::DateFieldMismatch(_) => "MetricModel.InvalidParameter.DateField",
            Self::MetricNotDirectChildOfDateHistogram(_) => "MetricModel.Formula.MetricNotUnderDateHistogram",
            Self::InvalidTopHitsSize(_) => "MetricModel.Formula.TopHitsSize",
            Self::EmptyTopHitsIncludes(_) => "MetricModel.Formula.TopHitsIncludes",
            Self::MeasureFieldNotInTopHitsIncludes(_) => "MetricModel.Formula.TopHitsMeasureField",
            Self::ForbiddenFilterField(_) => "Condition.Forbidden.FilterField",
            Self::MissingOperation(_) => "Condition.NullParameter.Operation",
            Self::UnsupportedOperation(_) => "Condition.Unsupported.Operation",
            Self::TooManySubconditions(_) => "Condition.CountExceeded.SubConditions",
            Self::MissingFieldName(_) => "Condition.NullParameter.FieldName",
            Self::UnsupportedValueOrigin(_) => "Condition.InvalidParameter.ValueFrom",
            Self::InvalidFilterValueShape { .. } => "Condition.InvalidParameter.Value",
            Self::InvalidHavingField(_) => "MetricModel.InvalidParameter.HavingConditionName",
            Self::MissingParameter(_) => "MetricModel.NullParameter",
            Self::InvalidParameter { .. } => "MetricModel.InvalidParameter",
        }
    }

    pub fn scope(&self) -> ErrorScope {
        match self {
            Self::MalformedFormula(_)
            | Self::MultipleAggregations(_)
            | Self::TooDeep(_)
            | Self::DuplicateAggregationName(_)
            | Self::DeprecatedInterval(_)
            | Self::AmbiguousInterval(_)
            | Self::UnsupportedAggregationType(_)
            | Self::MissingOrDuplicateDateHistogram(_)
            | Self::MissingOrDuplicateMetricAggregation(_)
            | Self::MeasureFieldMismatch(_)
            | Self::DateFieldMismatch(_)
            | Self::MetricNotDirectChildOfDateHistogram(_)
            | Self::InvalidTopHitsSize(_)
            | Self::EmptyTopHitsIncludes(_)
            | Self::MeasureFieldNotInTopHitsIncludes(_) => ErrorScope::Formula,
            Self::ForbiddenFilterField(_)
            | Self::MissingOperation(_)
            | Self::UnsupportedOperation(_)
            | Self::TooManySubconditions(_)
            | Self::MissingFieldName(_)
            | Self::UnsupportedValueOrigin(_)
            | Self::InvalidFilterValueShape { .. }
            | Self::InvalidHavingField(_) => ErrorScope::Condition,
            Self::MissingParameter(_) | Self::InvalidParameter { .. } => ErrorScope::Parameter,
        }
    }

    /// The detail text without the kind prefix
    pub fn detail(&self) -> String {
        match self {
            Self::InvalidFilterValueShape { operation, detail } => {
                format!("[{}] {}", operation, detail)
            },
            Self::InvalidParameter { parameter, detail } => format!("{}: {}", parameter, detail),
            Self::MalformedFormula(d)
            | Self::MultipleAggregations(d)
            | Self::TooDeep(d)
            | Self::DuplicateAggregationName(d)
            | Self::DeprecatedInterval(d)
            | Self::AmbiguousInterval(d)
            | Self::UnsupportedAggregationType(d)
            | Self::MissingOrDuplicateDateHistogram(d)
            | Self::MissingOrDuplicateMetricAggregation(d)
            | Self::MeasureFieldMismatch(d)
            | Self::DateFieldMismatch(d)
            | Self::MetricNotDirectChildOfDateHistogram(d)
            | Self::InvalidTopHitsSize(d)
            | Self::EmptyTopHitsIncludes(d)
            | Self::MeasureFieldNotInTopHitsIncludes(d)
            | Self::ForbiddenFilterField(d)
            | Self::MissingOperation(d)
            | Self::UnsupportedOperation(d)
            | Self::TooManySubconditions(d)
            | Self::MissingFieldName(d)
            | Self::UnsupportedValueOrigin(d)
            | Self::InvalidHavingField(d)
            | Self::MissingParameter(d) => d.clone(),
        }
    }
}

pub type ValidationResult<T> = Result<T, ValidationError>;
