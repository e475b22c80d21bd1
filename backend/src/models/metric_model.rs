use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::models::CondCfg;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum MetricType {
    Atomic,
    Derived,
    Composite,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum QueryType {
    Promql,
    Dsl,
    Sql,
}

impl QueryType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Promql => "promql",
            Self::Dsl => "dsl",
            Self::Sql => "sql",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum UnitType {
    NumUnit,
    StoreUnit,
    TransmissionRate,
    TimeUnit,
    CurrencyUnit,
    PercentageUnit,
    CountUnit,
    WeightUnit,
}

impl UnitType {
    /// Canonical spelling of `unit` within this unit type, `None` if it does not belong
    pub fn canonical_unit(&self, unit: &str) -> Option<&'static str> {
        let canonical = match (self, unit) {
            (Self::NumUnit, "none") => "none",
            (Self::NumUnit, "K") => "K",
            (Self::NumUnit, "Mil") => "Mil",
            (Self::NumUnit, "Bil") => "Bil",
            (Self::NumUnit, "Tri") => "Tri",

            (Self::StoreUnit, "bit" | "Byte") => "Byte",
            (Self::StoreUnit, "KB" | "KiB") => "KiB",
            (Self::StoreUnit, "MB" | "MiB") => "MiB",
            (Self::StoreUnit, "GB" | "GiB") => "GiB",
            (Self::StoreUnit, "TB" | "TiB") => "TiB",
            (Self::StoreUnit, "PB" | "PiB") => "PiB",

            (Self::TransmissionRate, "bps" | "B/s") => "B/s",
            (Self::TransmissionRate, "Kbps" | "KiB/s") => "KiB/s",
            (Self::TransmissionRate, "Mbps" | "MiB/s") => "MiB/s",

            (Self::TimeUnit, "ns") => "ns",
            (Self::TimeUnit, "μs") => "μs",
            (Self::TimeUnit, "ms") => "ms",
            (Self::TimeUnit, "s") => "s",
            (Self::TimeUnit, "m") => "m",
            (Self::TimeUnit, "h") => "h",
            (Self::TimeUnit, "d" | "day" | "week" | "month" | "year" | "quarter") => "d",

            (Self::CurrencyUnit, "Fen") => "Fen",
            (Self::CurrencyUnit, "Jiao") => "Jiao",
            (Self::CurrencyUnit, "CNY") => "CNY",
            (Self::CurrencyUnit, "10K_CNY") => "10K_CNY",
            (Self::CurrencyUnit, "1M_CNY") => "1M_CNY",
            (Self::CurrencyUnit, "100M_CNY") => "100M_CNY",
            (Self::CurrencyUnit, "US_Cent") => "US_Cent",
            (Self::CurrencyUnit, "USD") => "USD",
            (Self::CurrencyUnit, "EUR_Cent") => "EUR_Cent",

            (Self::PercentageUnit, "%") => "%",
            (Self::PercentageUnit, "‰") => "‰",

            (Self::CountUnit, "household") => "household",
            (Self::CountUnit, "transaction") => "transaction",
            (Self::CountUnit, "piece") => "piece",
            (Self::CountUnit, "item") => "item",
            (Self::CountUnit, "times") => "times",
            (Self::CountUnit, "man_day") => "man_day",
            (Self::CountUnit, "family") => "family",
            (Self::CountUnit, "hand") => "hand",
            (Self::CountUnit, "sheet") => "sheet",
            (Self::CountUnit, "packet") => "packet",

            (Self::WeightUnit, "ton") => "ton",
            (Self::WeightUnit, "kg") => "kg",

            _ => return None,
        };
        Some(canonical)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct MetricDataSource {
    #[serde(default, rename = "type")]
    pub source_type: String,
    #[serde(default)]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// `formula_config` of an atomic sql metric
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SqlConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<CondCfg>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub condition_str: String,
    #[serde(default, rename = "aggr_expression", skip_serializing_if = "Option::is_none")]
    pub aggr_expr: Option<AggrExpr>,
    #[serde(default, rename = "aggr_expression_str", skip_serializing_if = "String::is_empty")]
    pub aggr_expr_str: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub group_by_fields: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AggrExpr {
    #[serde(default)]
    pub field: String,
    #[serde(default)]
    pub aggr: String,
}

impl AggrExpr {
    pub fn is_complete(&self) -> bool {
        !self.field.is_empty() && !self.aggr.is_empty()
    }
}

/// `formula_config` of a derived metric
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DerivedConfig {
    #[serde(default)]
    pub depend_metric_model: Option<DependMetricModel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_condition: Option<CondCfg>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub business_condition: Option<CondCfg>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub condition_str: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DependMetricModel {
    #[serde(default)]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct OrderField {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub direction: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Schedule {
    #[serde(default, rename = "type")]
    pub schedule_type: String,
    #[serde(default)]
    pub expression: String,
}

impl Schedule {
    pub fn is_empty(&self) -> bool {
        self.schedule_type.is_empty() && self.expression.is_empty()
    }
}

/// Persistence task attached to a metric model
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct MetricTask {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub schedule: Schedule,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub time_windows: Vec<String>,
    #[serde(default)]
    pub steps: Vec<String>,
    #[serde(default)]
    pub index_base: String,
    #[serde(default)]
    pub retrace_duration: String,
    #[serde(default)]
    pub comment: String,
}

/// Body of create / update / validate requests
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct MetricModelRequest {
    #[validate(length(min = 1, max = 40))]
    pub name: String,
    #[serde(default)]
    #[validate(length(max = 40))]
    pub group_name: String,
    #[serde(default)]
    pub measure_name: String,
    #[serde(default)]
    #[validate(length(max = 255))]
    pub comment: String,
    #[serde(default)]
    #[validate(length(max = 5))]
    pub tags: Vec<String>,
    pub metric_type: Option<MetricType>,
    #[serde(default)]
    pub data_source: Option<MetricDataSource>,
    #[serde(default)]
    pub query_type: Option<QueryType>,
    #[serde(default)]
    pub formula: String,
    #[serde(default)]
    #[schema(value_type = Option<Object>)]
    pub formula_config: Option<Value>,
    #[serde(default)]
    pub order_by_fields: Vec<OrderField>,
    #[serde(default)]
    pub having_condition: Option<CondCfg>,
    #[serde(default)]
    pub date_field: String,
    #[serde(default)]
    pub measure_field: String,
    #[serde(default)]
    pub unit_type: Option<UnitType>,
    #[serde(default)]
    pub unit: String,
    #[serde(default)]
    pub task: Option<MetricTask>,
}

/// A request after admission normalized it; what gets stored
#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
pub struct MetricModelDraft {
    pub name: String,
    pub group_name: String,
    pub measure_name: String,
    pub comment: String,
    pub tags: Vec<String>,
    pub metric_type: Option<MetricType>,
    pub data_source: Option<MetricDataSource>,
    pub query_type: Option<QueryType>,
    pub formula: String,
    #[schema(value_type = Option<Object>)]
    pub formula_config: Option<Value>,
    pub order_by_fields: Vec<OrderField>,
    pub having_condition: Option<CondCfg>,
    pub date_field: String,
    pub measure_field: String,
    pub unit_type: Option<UnitType>,
    pub unit: String,
    pub is_calendar_interval: bool,
    #[serde(skip)]
    pub contains_top_hits: bool,
    pub task: Option<MetricTask>,
}

impl From<MetricModelRequest> for MetricModelDraft {
    fn from(req: MetricModelRequest) -> Self {
        Self {
            name: req.name,
            group_name: req.group_name,
            measure_name: req.measure_name,
            comment: req.comment,
            tags: req.tags,
            metric_type: req.metric_type,
            data_source: req.data_source,
            query_type: req.query_type,
            formula: req.formula,
            formula_config: req.formula_config,
            order_by_fields: req.order_by_fields,
            having_condition: req.having_condition,
            date_field: req.date_field,
            measure_field: req.measure_field,
            unit_type: req.unit_type,
            unit: req.unit,
            is_calendar_interval: false,
            contains_top_hits: false,
            task: req.task,
        }
    }
}

/// Stored metric model
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct MetricModel {
    pub id: String,
    #[serde(flatten)]
    pub draft: MetricModelDraft,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListMetricModelsQuery {
    pub group_name: Option<String>,
    pub metric_type: Option<MetricType>,
    pub query_type: Option<QueryType>,
    pub tag: Option<String>,
    /// Case-insensitive substring of the model name
    pub name_pattern: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MetricModelListResponse {
    pub entries: Vec<MetricModel>,
    pub total_count: usize,
}
