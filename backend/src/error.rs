//! Error handling for the cement tracking server
//!
//! Provides consistent error responses in English and Turkish

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use shared::{CalculationOverflow, FieldError};
use thiserror::Error;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Validation errors
    #[error("Validation error: {message}")]
    Validation {
        field: String,
        message: String,
        message_tr: String,
    },

    #[error("Conflict: {message}")]
    Conflict {
        resource: String,
        message: String,
        message_tr: String,
    },

    #[error("Resource not found: {0}")]
    NotFound(String),

    // Business logic errors
    #[error("Unit mismatch: {0}")]
    UnitMismatch(String),

    // Database errors
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    // Internal errors
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    /// Validation failure on a single named field
    pub fn validation(field: &str, message: &str, message_tr: &str) -> Self {
        AppError::Validation {
            field: field.to_string(),
            message: message.to_string(),
            message_tr: message_tr.to_string(),
        }
    }
}

impl From<FieldError> for AppError {
    fn from(err: FieldError) -> Self {
        AppError::Validation {
            field: err.field.to_string(),
            message: err.message.to_string(),
            message_tr: format!("Geçersiz değer: {}", err.field),
        }
    }
}

impl From<CalculationOverflow> for AppError {
    fn from(err: CalculationOverflow) -> Self {
        AppError::Validation {
            field: err.field.to_string(),
            message: format!("Inputs are too large to compute {}", err.field),
            message_tr: format!("Girilen değerlerle {} hesaplanamıyor", err.field),
        }
    }
}

/// Error response structure
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message_en: String,
    pub message_tr: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl AppError {
    fn status_and_detail(&self) -> (StatusCode, ErrorDetail) {
        match self {
            AppError::Validation { field, message, message_tr } => (
                StatusCode::BAD_REQUEST,
                ErrorDetail {
                    code: "VALIDATION_ERROR".to_string(),
                    message_en: message.clone(),
                    message_tr: message_tr.clone(),
                    field: Some(field.clone()),
                },
            ),
            AppError::Conflict { resource, message, message_tr } => (
                StatusCode::CONFLICT,
                ErrorDetail {
                    code: "CONFLICT".to_string(),
                    message_en: message.clone(),
                    message_tr: message_tr.clone(),
                    field: Some(resource.clone()),
                },
            ),
            AppError::NotFound(resource) => (
                StatusCode::NOT_FOUND,
                ErrorDetail {
                    code: "NOT_FOUND".to_string(),
                    message_en: format!("{} not found", resource),
                    message_tr: format!("{} bulunamadı", resource),
                    field: None,
                },
            ),
            AppError::UnitMismatch(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail {
                    code: "UNIT_MISMATCH".to_string(),
                    message_en: format!("Unit mismatch: {}", msg),
                    message_tr: format!("Birim uyuşmazlığı: {}", msg),
                    field: None,
                },
            ),
            AppError::DatabaseError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail {
                    code: "DATABASE_ERROR".to_string(),
                    message_en: "A database error occurred".to_string(),
                    message_tr: "Veritabanı hatası oluştu".to_string(),
                    field: None,
                },
            ),
            AppError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail {
                    code: "INTERNAL_ERROR".to_string(),
                    message_en: msg.clone(),
                    message_tr: "Sunucu içi hata oluştu".to_string(),
                    field: None,
                },
            ),
        }
    }

    /// HTTP status this error maps to
    pub fn status(&self) -> StatusCode {
        self.status_and_detail().0
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_detail) = self.status_and_detail();

        // Log the error for debugging
        tracing::error!("Error: {:?}", self);

        (status, Json(ErrorResponse { error: error_detail })).into_response()
    }
}

/// Result type alias for handlers
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(AppError::NotFound("Plant".into()).status(), StatusCode::NOT_FOUND);
        assert_eq!(
            AppError::validation("name", "Plant name is required", "Santral adı zorunludur").status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::Conflict {
                resource: "plant".into(),
                message: "exists".into(),
                message_tr: "mevcut".into(),
            }
            .status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::UnitMismatch("t vs kg".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_field_error_conversion() {
        let err: AppError = FieldError {
            field: "quantity_kg",
            message: "Quantity cannot be negative",
        }
        .into();

        match err {
            AppError::Validation { field, message, .. } => {
                assert_eq!(field, "quantity_kg");
                assert_eq!(message, "Quantity cannot be negative");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_calculation_overflow_is_a_bad_request() {
        let err: AppError = CalculationOverflow {
            field: "withholding_amount",
        }
        .into();

        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        match err {
            AppError::Validation { field, .. } => assert_eq!(field, "withholding_amount"),
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
