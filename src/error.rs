//! Error handling for the application

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::db::StoreError;
use crate::pricing::PricingError;
use crate::shop::CutSheetError;

/// Application error type
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Pricing(#[from] PricingError),

    #[error(transparent)]
    CutSheet(#[from] CutSheetError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

struct ErrorBody {
    status: StatusCode,
    code: &'static str,
    message: String,
    field: Option<String>,
}

impl ErrorBody {
    fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
            field: None,
        }
    }

    fn invalid(field: &str, reason: &str) -> Self {
        Self {
            field: Some(field.to_string()),
            ..Self::new(
                StatusCode::UNPROCESSABLE_ENTITY,
                "INVALID_SPECIFICATION",
                format!("{field}: {reason}"),
            )
        }
    }

    fn unavailable(err: &StoreError) -> Self {
        tracing::error!(error = %err, "Lookup unavailable");
        Self::new(
            StatusCode::SERVICE_UNAVAILABLE,
            "LOOKUP_UNAVAILABLE",
            "Pricing data is temporarily unavailable, retry later",
        )
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = match &self {
            AppError::Pricing(PricingError::InvalidSpecification { field, reason })
            | AppError::CutSheet(CutSheetError::InvalidSpecification { field, reason }) => {
                ErrorBody::invalid(field, reason)
            }
            AppError::CutSheet(CutSheetError::ConfigurationNotFound(_)) => {
                ErrorBody::new(StatusCode::NOT_FOUND, "NOT_FOUND", self.to_string())
            }
            AppError::Pricing(PricingError::LookupUnavailable(err))
            | AppError::CutSheet(CutSheetError::LookupUnavailable(err))
            | AppError::Store(err) => ErrorBody::unavailable(err),
            AppError::BadRequest(msg) => {
                ErrorBody::new(StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone())
            }
        };

        let mut payload = json!({
            "error": body.message,
            "code": body.code,
        });
        if let Some(field) = body.field {
            payload["field"] = json!(field);
        }

        (body.status, Json(payload)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
