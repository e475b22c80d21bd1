use axum::{Json, extract::State};
use std::sync::Arc;

use crate::AppState;
use crate::models::{ValidateConditionRequest, ValidateConditionResponse};
use crate::utils::ApiResult;

// Validate a filter tree or having clause
#[utoipa::path(
    post,
    path = "/api/conditions/validate",
    request_body = ValidateConditionRequest,
    responses(
        (status = 200, description = "Condition is valid", body = ValidateConditionResponse),
        (status = 400, description = "Condition rejected")
    ),
    tag = "Conditions"
)]
pub async fn validate_condition(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ValidateConditionRequest>,
) -> ApiResult<Json<ValidateConditionResponse>> {
    tracing::debug!("Condition validation request: having={}", req.having);

    state.metric_model_service.validate_condition(&req)?;

    Ok(Json(ValidateConditionResponse { valid: true }))
}
