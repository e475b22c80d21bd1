pub mod condition;
pub mod metric_model;
