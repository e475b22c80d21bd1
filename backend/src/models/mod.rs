pub mod condition;
pub mod metric_model;

pub use condition::*;
pub use metric_model::*;
