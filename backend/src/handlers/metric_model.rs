use axum::{
    Json,
    extract::{Path, Query, State},
};
use std::sync::Arc;

use crate::AppState;
use crate::models::{
    ListMetricModelsQuery, MetricModel, MetricModelDraft, MetricModelListResponse,
    MetricModelRequest,
};
use crate::utils::ApiResult;

// List metric models
#[utoipa::path(
    get,
    path = "/api/metric-models",
    params(ListMetricModelsQuery),
    responses(
        (status = 200, description = "Metric models matching the filters", body = MetricModelListResponse)
    ),
    tag = "Metric Models"
)]
pub async fn list_metric_models(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListMetricModelsQuery>,
) -> ApiResult<Json<MetricModelListResponse>> {
    tracing::debug!("Listing metric models: {:?}", query);

    let response = state.metric_model_service.list_metric_models(&query).await?;

    tracing::debug!("Retrieved {} metric models", response.total_count);
    Ok(Json(response))
}

// Get metric model by ID
#[utoipa::path(
    get,
    path = "/api/metric-models/{id}",
    params(("id" = String, Path, description = "Metric model ID")),
    responses(
        (status = 200, description = "Metric model details", body = MetricModel),
        (status = 404, description = "Metric model not found")
    ),
    tag = "Metric Models"
)]
pub async fn get_metric_model(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<MetricModel>> {
    tracing::debug!("Getting metric model: ID={}", id);

    let model = state.metric_model_service.get_metric_model(&id).await?;

    Ok(Json(model))
}

// Create a new metric model
#[utoipa::path(
    post,
    path = "/api/metric-models",
    request_body = MetricModelRequest,
    responses(
        (status = 200, description = "Metric model created successfully", body = MetricModel),
        (status = 400, description = "Metric model rejected by admission"),
        (status = 409, description = "Name already used in the group")
    ),
    tag = "Metric Models"
)]
pub async fn create_metric_model(
    State(state): State<Arc<AppState>>,
    Json(req): Json<MetricModelRequest>,
) -> ApiResult<Json<MetricModel>> {
    tracing::info!(
        "Metric model creation request: name={}, group={}, type={:?}",
        req.name,
        req.group_name,
        req.metric_type
    );
    tracing::debug!("Metric model formula: query_type={:?}, formula={}", req.query_type, req.formula);

    let model = state.metric_model_service.create_metric_model(req).await?;

    Ok(Json(model))
}

// Update metric model
#[utoipa::path(
    put,
    path = "/api/metric-models/{id}",
    params(("id" = String, Path, description = "Metric model ID")),
    request_body = MetricModelRequest,
    responses(
        (status = 200, description = "Metric model updated successfully", body = MetricModel),
        (status = 404, description = "Metric model not found"),
        (status = 400, description = "Metric model rejected by admission"),
        (status = 409, description = "Name already used in the group")
    ),
    tag = "Metric Models"
)]
pub async fn update_metric_model(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<MetricModelRequest>,
) -> ApiResult<Json<MetricModel>> {
    tracing::info!("Metric model update request: ID={}, name={}", id, req.name);

    let model = state.metric_model_service.update_metric_model(&id, req).await?;

    Ok(Json(model))
}

// Delete metric model
#[utoipa::path(
    delete,
    path = "/api/metric-models/{id}",
    params(("id" = String, Path, description = "Metric model ID")),
    responses(
        (status = 200, description = "Metric model deleted successfully"),
        (status = 404, description = "Metric model not found"),
        (status = 409, description = "Metric model is referenced by a derived model")
    ),
    tag = "Metric Models"
)]
pub async fn delete_metric_model(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<()>> {
    tracing::info!("Metric model deletion request: ID={}", id);

    state.metric_model_service.delete_metric_model(&id).await?;

    Ok(Json(()))
}

// Dry-run admission
#[utoipa::path(
    post,
    path = "/api/metric-models/validate",
    request_body = MetricModelRequest,
    responses(
        (status = 200, description = "Normalized metric model", body = MetricModelDraft),
        (status = 400, description = "Metric model rejected by admission")
    ),
    tag = "Metric Models"
)]
pub async fn validate_metric_model(
    State(state): State<Arc<AppState>>,
    Json(req): Json<MetricModelRequest>,
) -> ApiResult<Json<MetricModelDraft>> {
    tracing::debug!("Metric model validation request: name={}", req.name);

    let draft = state.metric_model_service.validate_draft(req).await?;

    Ok(Json(draft))
}
