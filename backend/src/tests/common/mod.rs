// Common test utilities and helpers

use serde_json::{Value, json};
use std::sync::Arc;

use crate::models::MetricModelRequest;
use crate::services::{MemoryMetricModelStore, MetricModelService};

/// Service over a fresh in-memory store
pub fn create_test_service() -> MetricModelService {
    MetricModelService::new(Arc::new(MemoryMetricModelStore::new()))
}

fn request(body: Value) -> MetricModelRequest {
    serde_json::from_value(body).expect("Failed to build metric model request")
}

/// Atomic promql model
pub fn promql_request(name: &str) -> MetricModelRequest {
    request(json!({
        "name": name,
        "group_name": "infra",
        "tags": ["cpu", " cpu "],
        "metric_type": "atomic",
        "data_source": {"type": "data_view", "id": "dv-1"},
        "query_type": "promql",
        "formula": "avg(node_cpu_usage)",
        "unit_type": "percentageUnit",
        "unit": "%"
    }))
}

/// Atomic dsl model: terms -> date_histogram -> max
pub fn dsl_request(name: &str) -> MetricModelRequest {
    let formula = json!({
        "size": 0,
        "aggs": {"host": {"terms": {"field": "host", "size": 10},
            "aggs": {"ts": {"date_histogram": {"field": "@timestamp", "calendar_interval": "1h"},
                "aggs": {"peak": {"max": {"field": "bytes"}}}}}}}
    });
    request(json!({
        "name": name,
        "group_name": "infra",
        "metric_type": "atomic",
        "data_source": {"type": "data_view", "id": "dv-1"},
        "query_type": "dsl",
        "formula": formula.to_string(),
        "measure_field": "peak",
        "unit_type": "storeUnit",
        "unit": "MB",
        "task": {
            "name": "persist",
            "schedule": {"type": "FIX_RATE", "expression": "5m"},
            "time_windows": ["1h"],
            "steps": ["5m"],
            "index_base": "metrics"
        }
    }))
}

/// Derived model over `depend_id`
pub fn derived_request(name: &str, depend_id: &str) -> MetricModelRequest {
    request(json!({
        "name": name,
        "group_name": "infra",
        "metric_type": "derived",
        "formula_config": {
            "depend_metric_model": {"id": depend_id, "name": "ignored"},
            "business_condition": {"name": "host", "operation": "in", "value": ["a", "b"]}
        },
        "unit_type": "numUnit",
        "unit": "none"
    }))
}

/// Composite model over the `{{id}}` references in `formula`
pub fn composite_request(name: &str, formula: &str) -> MetricModelRequest {
    request(json!({
        "name": name,
        "group_name": "infra",
        "metric_type": "composite",
        "formula": formula,
        "unit_type": "numUnit",
        "unit": "none"
    }))
}
