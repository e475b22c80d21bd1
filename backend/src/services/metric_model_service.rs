use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use crate::models::{
    ListMetricModelsQuery, MetricModel, MetricModelDraft, MetricModelListResponse,
    MetricModelRequest, MetricType, ValidateConditionRequest,
};
use crate::services::metric_model_store::{MetricModelStore, NameConflict};
use crate::services::metric_validator::{
    ValidationError, model_references, validate_condition, validate_having_condition,
    validate_metric_model,
};
use crate::utils::{ApiError, ApiResult};

/// Prefix of generated measure names
const MEASURE_NAME_PREFIX: &str = "__m.";

#[derive(Clone)]
pub struct MetricModelService {
    store: Arc<dyn MetricModelStore>,
}

impl MetricModelService {
    pub fn new(store: Arc<dyn MetricModelStore>) -> Self {
        Self { store }
    }

    /// Run every admission rule and return the normalized draft without storing it
    pub async fn validate_draft(&self, req: MetricModelRequest) -> ApiResult<MetricModelDraft> {
        self.admit(req, None).await
    }

    /// Check a standalone filter tree, or a having clause when `req.having` is set
    pub fn validate_condition(&self, req: &ValidateConditionRequest) -> ApiResult<()> {
        let result = match (&req.condition, req.having) {
            (Some(having), true) => validate_having_condition(having),
            (None, true) => Err(ValidationError::missing_parameter("condition")),
            (condition, false) => validate_condition(condition.as_ref()),
        };

        result.map_err(|err| {
            tracing::debug!(code = err.code(), "Condition rejected: {}", err);
            err.into()
        })
    }

    pub async fn create_metric_model(&self, req: MetricModelRequest) -> ApiResult<MetricModel> {
        let mut draft = self.admit(req, None).await?;

        let id = Uuid::new_v4().simple().to_string();
        if draft.measure_name.is_empty() {
            draft.measure_name = format!("{}{}", MEASURE_NAME_PREFIX, id);
        }

        let now = Utc::now();
        let model = MetricModel { id, draft, created_at: now, updated_at: now };
        self.store.insert(&model).await.map_err(store_error)?;

        tracing::info!("Metric model created: {} (ID: {})", model.draft.name, model.id);
        Ok(model)
    }

    pub async fn update_metric_model(
        &self,
        id: &str,
        req: MetricModelRequest,
    ) -> ApiResult<MetricModel> {
        let existing = self.get_metric_model(id).await?;
        let mut draft = self.admit(req, Some(id)).await?;

        if draft.measure_name.is_empty() {
            draft.measure_name = existing.draft.measure_name;
        }

        let model = MetricModel {
            id: existing.id,
            draft,
            created_at: existing.created_at,
            updated_at: Utc::now(),
        };
        self.store.update(&model).await.map_err(store_error)?;

        tracing::info!("Metric model updated: {} (ID: {})", model.draft.name, model.id);
        Ok(model)
    }

    pub async fn get_metric_model(&self, id: &str) -> ApiResult<MetricModel> {
        self.store
            .get(id)
            .await?
            .ok_or_else(|| ApiError::not_found(format!("metric model {}", id)))
    }

    /// Filtered listing, ordered by group then name
    pub async fn list_metric_models(
        &self,
        query: &ListMetricModelsQuery,
    ) -> ApiResult<MetricModelListResponse> {
        let name_pattern = query.name_pattern.as_ref().map(|p| p.to_lowercase());

        let mut entries: Vec<MetricModel> = self
            .store
            .list()
            .await?
            .into_iter()
            .filter(|m| query.group_name.as_ref().is_none_or(|g| &m.draft.group_name == g))
            .filter(|m| query.metric_type.is_none_or(|t| m.draft.metric_type == Some(t)))
            .filter(|m| query.query_type.is_none_or(|t| m.draft.query_type == Some(t)))
            .filter(|m| query.tag.as_ref().is_none_or(|tag| m.draft.tags.contains(tag)))
            .filter(|m| {
                name_pattern
                    .as_ref()
                    .is_none_or(|p| m.draft.name.to_lowercase().contains(p.as_str()))
            })
            .collect();

        entries.sort_by(|a, b| {
            (a.draft.group_name.as_str(), a.draft.name.as_str())
                .cmp(&(b.draft.group_name.as_str(), b.draft.name.as_str()))
        });

        let total_count = entries.len();
        Ok(MetricModelListResponse { entries, total_count })
    }

    /// Models that derived or composite models still reference cannot be deleted
    pub async fn delete_metric_model(&self, id: &str) -> ApiResult<()> {
        let model = self.get_metric_model(id).await?;

        let dependents: Vec<String> = self
            .store
            .list()
            .await?
            .into_iter()
            .filter(|m| {
                depend_metric_model_id(&m.draft) == Some(id)
                    || composite_references(&m.draft).contains(&id)
            })
            .map(|m| display_name(&m.draft))
            .collect();
        if !dependents.is_empty() {
            tracing::warn!("Metric model {} is still referenced by {:?}", id, dependents);
            return Err(ApiError::conflict(format!(
                "{} is referenced by {}",
                display_name(&model.draft),
                dependents.join(", ")
            )));
        }

        self.store.delete(id).await?;
        tracing::info!("Metric model deleted: {} (ID: {})", model.draft.name, id);
        Ok(())
    }

    /// Request-level rules, then the metric validator, then store-backed references
    async fn admit(&self, req: MetricModelRequest, self_id: Option<&str>) -> ApiResult<MetricModelDraft> {
        req.validate()?;

        let mut draft = MetricModelDraft::from(req);
        if let Err(err) = validate_metric_model(&mut draft) {
            tracing::warn!(
                code = err.code(),
                "Metric model {} rejected: {}",
                display_name(&draft),
                err
            );
            return Err(err.into());
        }

        match draft.metric_type {
            Some(MetricType::Derived) => self.check_dependency(&draft, self_id).await?,
            Some(MetricType::Composite) => self.check_composite_references(&draft, self_id).await?,
            _ => {},
        }

        Ok(draft)
    }

    /// A derived model must depend on another stored, non-derived model
    async fn check_dependency(&self, draft: &MetricModelDraft, self_id: Option<&str>) -> ApiResult<()> {
        let Some(depend_id) = depend_metric_model_id(draft) else {
            return Err(ValidationError::missing_parameter("formula_config.depend_metric_model.id").into());
        };

        if Some(depend_id) == self_id {
            return Err(ValidationError::invalid_parameter(
                "formula_config.depend_metric_model.id",
                "a metric model cannot depend on itself",
            )
            .into());
        }

        let depend = self.store.get(depend_id).await?.ok_or_else(|| {
            ValidationError::invalid_parameter(
                "formula_config.depend_metric_model.id",
                format!("depend metric model {} does not exist", depend_id),
            )
        })?;

        if depend.draft.metric_type == Some(MetricType::Derived) {
            return Err(ValidationError::invalid_parameter(
                "formula_config.depend_metric_model.id",
                format!("depend metric model {} is itself derived", display_name(&depend.draft)),
            )
            .into());
        }

        Ok(())
    }

    /// Every `{{id}}` in a composite formula must name another stored model
    async fn check_composite_references(
        &self,
        draft: &MetricModelDraft,
        self_id: Option<&str>,
    ) -> ApiResult<()> {
        for reference in model_references(&draft.formula) {
            if Some(reference) == self_id {
                return Err(ValidationError::invalid_parameter(
                    "formula",
                    "a composite formula cannot reference its own metric model",
                )
                .into());
            }
            if self.store.get(reference).await?.is_none() {
                return Err(ValidationError::invalid_parameter(
                    "formula",
                    format!("referenced metric model {} does not exist", reference),
                )
                .into());
            }
        }
        Ok(())
    }
}

fn store_error(err: anyhow::Error) -> ApiError {
    match err.downcast::<NameConflict>() {
        Ok(conflict) => {
            tracing::warn!("Metric model name already exists: {}", conflict);
            ApiError::conflict(conflict.display)
        },
        Err(err) => err.into(),
    }
}

fn composite_references(draft: &MetricModelDraft) -> Vec<&str> {
    if draft.metric_type != Some(MetricType::Composite) {
        return Vec::new();
    }
    model_references(&draft.formula)
}

fn depend_metric_model_id(draft: &MetricModelDraft) -> Option<&str> {
    if draft.metric_type != Some(MetricType::Derived) {
        return None;
    }
    draft
        .formula_config
        .as_ref()?
        .get("depend_metric_model")?
        .get("id")?
        .as_str()
        .filter(|id| !id.is_empty())
}

fn display_name(draft: &MetricModelDraft) -> String {
    if draft.group_name.is_empty() {
        draft.name.clone()
    } else {
        format!("{}/{}", draft.group_name, draft.name)
    }
}
