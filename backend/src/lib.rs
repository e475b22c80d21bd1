//! Metric model administration backend
//!
//! Stores metric model definitions and admits them only after the formula,
//! condition trees and model-level parameters pass validation.

rust_i18n::i18n!("locales", fallback = "en");

pub mod config;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod utils;

use std::sync::Arc;

use axum::{
    Json, Router,
    routing::{get, post},
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;

use crate::services::{MemoryMetricModelStore, MetricModelService, MetricModelStore};

/// Application state shared across handlers
pub struct AppState {
    pub metric_model_service: MetricModelService,
}

impl AppState {
    pub fn new(store: Arc<dyn MetricModelStore>) -> Self {
        Self { metric_model_service: MetricModelService::new(store) }
    }

    /// State backed by the in-memory store
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryMetricModelStore::new()))
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::metric_model::list_metric_models,
        handlers::metric_model::get_metric_model,
        handlers::metric_model::create_metric_model,
        handlers::metric_model::update_metric_model,
        handlers::metric_model::delete_metric_model,
        handlers::metric_model::validate_metric_model,
        handlers::condition::validate_condition,
    ),
    components(schemas(
        models::CondCfg,
        models::ValidateConditionRequest,
        models::ValidateConditionResponse,
        models::MetricType,
        models::QueryType,
        models::UnitType,
        models::MetricDataSource,
        models::OrderField,
        models::Schedule,
        models::MetricTask,
        models::MetricModelRequest,
        models::MetricModelDraft,
        models::MetricModel,
        models::MetricModelListResponse,
    )),
    tags(
        (name = "Metric Models", description = "Metric model definitions"),
        (name = "Conditions", description = "Filter and having condition checks"),
    )
)]
pub struct ApiDoc;

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// Build the axum router with all routes
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any);

    let api = Router::new()
        .route(
            "/metric-models",
            get(handlers::metric_model::list_metric_models)
                .post(handlers::metric_model::create_metric_model),
        )
        .route("/metric-models/validate", post(handlers::metric_model::validate_metric_model))
        .route(
            "/metric-models/:id",
            get(handlers::metric_model::get_metric_model)
                .put(handlers::metric_model::update_metric_model)
                .delete(handlers::metric_model::delete_metric_model),
        )
        .route("/conditions/validate", post(handlers::condition::validate_condition));

    Router::new()
        .nest("/api", api)
        .route("/api-docs/openapi.json", get(openapi_json))
        .layer(axum::middleware::from_fn(middleware::locale_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
