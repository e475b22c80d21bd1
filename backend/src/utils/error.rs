use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rust_i18n::t;
use serde::Serialize;
use thiserror::Error;

use super::i18n::get_locale;
use crate::services::metric_validator::{ErrorScope, ValidationError};

/// API Error returned by every handler
///
/// Validation failures keep their typed kind so the response can carry the
/// stable validator code next to the localized message.
#[derive(Error, Debug)]
pub enum ApiError {
    // Resource errors 3xxx
    #[error("Resource not found: {0}")]
    ResourceNotFound(String),

    // Validation errors 4xxx
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    // System errors 5xxx
    #[error("Internal error: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ApiError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::ResourceNotFound(message.into())
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::InternalError(message.into())
    }

    /// Numeric error code; the leading digit selects the HTTP status
    pub fn error_code(&self) -> i32 {
        match self {
            Self::ResourceNotFound(_) => 3000,

            Self::Validation(err) => match err.scope() {
                ErrorScope::Formula => 4001,
                ErrorScope::Condition => 4002,
                ErrorScope::Parameter => 4003,
            },
            Self::InvalidInput(_) => 4004,
            Self::Conflict(_) => 4009,

            Self::InternalError(_) => 5001,
            Self::Other(_) => 5001,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self.error_code() {
            3000..=3999 => StatusCode::NOT_FOUND,
            4009 => StatusCode::CONFLICT,
            4001..=4999 => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ApiErrorResponse {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    /// Get localized error message based on current locale
    pub fn localized_message(&self) -> String {
        let locale = get_locale();
        match self {
            Self::ResourceNotFound(name) => {
                t!("resource.not_found", locale = &locale, name = name).to_string()
            },
            Self::Validation(err) => {
                let details = err.to_string();
                match err.scope() {
                    ErrorScope::Formula => {
                        t!("validation.formula", locale = &locale, details = details).to_string()
                    },
                    ErrorScope::Condition => {
                        t!("validation.condition", locale = &locale, details = details).to_string()
                    },
                    ErrorScope::Parameter => {
                        t!("validation.parameter", locale = &locale, details = details).to_string()
                    },
                }
            },
            Self::InvalidInput(details) => {
                t!("request.invalid_input", locale = &locale, details = details).to_string()
            },
            Self::Conflict(name) => t!("resource.conflict", locale = &locale, name = name).to_string(),
            Self::InternalError(msg) => {
                t!("internal.error", locale = &locale, message = msg).to_string()
            },
            Self::Other(err) => {
                t!("internal.error", locale = &locale, message = err.to_string()).to_string()
            },
        }
    }

    fn details(&self) -> Option<serde_json::Value> {
        match self {
            Self::Validation(err) => Some(serde_json::json!({
                "error_code": err.code(),
                "detail": err.detail(),
            })),
            _ => None,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        }

        let response = ApiErrorResponse {
            code: self.error_code(),
            message: self.localized_message(),
            details: self.details(),
        };

        (status, Json(response)).into_response()
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::internal_error(format!("JSON serialization error: {}", err))
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(err: validator::ValidationErrors) -> Self {
        ApiError::invalid_input(err.to_string())
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
