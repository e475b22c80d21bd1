//! Metric model admission checks
//!
//! - `formula`: the aggregation tree of a dsl metric
//! - `condition` / `having`: filter trees and having clauses
//! - `model`: the whole create/update payload
//!
//! Every check is pure and synchronous, and returns the first violation it finds.

pub mod aggregation;
pub mod condition;
pub mod error;
pub mod formula;
pub mod having;
pub mod model;
pub mod operation;
pub mod top_hits;

pub use condition::{ConditionNode, validate_condition};
pub use error::{ErrorScope, ValidationError, ValidationResult};
pub use formula::{MAX_AGGREGATION_DEPTH, MetricModelContext, validate_formula};
pub use having::validate_having_condition;
pub use model::{model_references, validate_metric_model, validate_task};
pub use operation::{Operation, ValueOrigin};
pub use top_hits::validate_top_hits;

mod tests;
