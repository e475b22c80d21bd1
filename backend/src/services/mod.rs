pub mod metric_model_service;
pub mod metric_model_store;
pub mod metric_validator;

pub use metric_model_service::MetricModelService;
pub use metric_model_store::{MemoryMetricModelStore, MetricModelStore};
