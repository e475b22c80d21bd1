use super::aggregation::TopHitsSpec;
use super::error::{ValidationError, ValidationResult};

/// Check a `top_hits` node that stands in for the metric aggregation.
///
/// The declared measure field must be one of the `_source.includes` entries; it
/// then becomes the synthetic aggregation name for this node and is returned.
pub fn validate_top_hits(node: &TopHitsSpec, declared_measure_field: &str) -> ValidationResult<String> {
    if node.size <= 0 {
        return Err(ValidationError::InvalidTopHitsSize(format!(
            "top_hits size must be > 0, actual is {}",
            node.size
        )));
    }

    if node.source.includes.is_empty() {
        return Err(ValidationError::EmptyTopHitsIncludes(
            "top_hits _source.includes must not be empty".to_string(),
        ));
    }

    if !node.source.includes.iter().any(|field| field == declared_measure_field) {
        return Err(ValidationError::MeasureFieldNotInTopHitsIncludes(format!(
            "measure field '{}' must be one of {:?}",
            declared_measure_field, node.source.includes
        )));
    }

    Ok(declared_measure_field.to_string())
}
