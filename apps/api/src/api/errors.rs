use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde_json::{json, Value};

use crate::auth::AuthError;
use crate::domain::errors::TransitionError;
use crate::domain::pagination::PaginationError;
use crate::domain::report::ReportUpdateError;
use crate::domain::reporting::ReportingError;
use crate::domain::repositories::RepositoryError;
use crate::domain::survey::SurveyError;
use crate::domain::task::TaskUpdateError;
use crate::domain::validation::ValidationErrors;

/// API error type with HTTP status code, message and optional details
///
/// Rendered as `{error, message, statusCode, timestamp, details?}`.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
    pub details: Option<Value>,
}

impl ApiError {
    /// Creates a new API error
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Creates a 400 Bad Request error
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    /// Creates a 401 Unauthorized error
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    /// Creates a 403 Forbidden error
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, message)
    }

    /// Creates a 404 Not Found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    /// Creates a 409 Conflict error
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, message)
    }

    /// Creates a 422 Unprocessable Entity error
    pub fn unprocessable(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNPROCESSABLE_ENTITY, message)
    }

    /// Creates a 500 Internal Server Error
    pub fn internal_server_error(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut body = json!({
            "error": self.status.canonical_reason().unwrap_or("Error"),
            "message": self.message,
            "statusCode": self.status.as_u16(),
            "timestamp": Utc::now().to_rfc3339(),
        });
        if let (Some(details), Some(object)) = (self.details, body.as_object_mut()) {
            object.insert("details".to_string(), details);
        }

        (self.status, Json(body)).into_response()
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        let details = serde_json::to_value(&errors).unwrap_or(Value::Null);
        Self::bad_request("Validation failed").with_details(details)
    }
}

impl From<PaginationError> for ApiError {
    fn from(error: PaginationError) -> Self {
        Self::bad_request(error.to_string())
    }
}

impl From<TransitionError> for ApiError {
    fn from(error: TransitionError) -> Self {
        Self::unprocessable(error.to_string())
    }
}

impl From<ReportingError> for ApiError {
    fn from(error: ReportingError) -> Self {
        match error {
            ReportingError::InsufficientData { .. } | ReportingError::Overflow(_) => {
                Self::unprocessable(error.to_string())
            }
            ReportingError::UnknownFramework(_) => Self::bad_request(error.to_string()),
            ReportingError::Export(e) => {
                tracing::error!("Report export failed: {}", e);
                Self::internal_server_error("Failed to export report")
            }
        }
    }
}

impl From<RepositoryError> for ApiError {
    fn from(error: RepositoryError) -> Self {
        match error {
            RepositoryError::NotFound { .. } => Self::not_found(error.to_string()),
            RepositoryError::Conflict(message) => Self::conflict(message),
            RepositoryError::Database(_) | RepositoryError::Corrupt { .. } => {
                tracing::error!("Storage failure: {}", error);
                Self::internal_server_error("Internal server error")
            }
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(error: AuthError) -> Self {
        match error {
            AuthError::InvalidToken(_) | AuthError::WrongTokenType(_) => {
                Self::unauthorized(error.to_string())
            }
            AuthError::TokenCreation(_) | AuthError::Hashing(_) => {
                tracing::error!("Authentication failure: {}", error);
                Self::internal_server_error("Internal server error")
            }
        }
    }
}

impl From<ReportUpdateError> for ApiError {
    fn from(error: ReportUpdateError) -> Self {
        match error {
            ReportUpdateError::Validation(e) => e.into(),
            ReportUpdateError::Transition(e) => e.into(),
        }
    }
}

impl From<SurveyError> for ApiError {
    fn from(error: SurveyError) -> Self {
        match error {
            SurveyError::Validation(e) => e.into(),
            SurveyError::Transition(e) => e.into(),
            SurveyError::Closed(_) => Self::unprocessable(error.to_string()),
        }
    }
}

impl From<TaskUpdateError> for ApiError {
    fn from(error: TaskUpdateError) -> Self {
        match error {
            TaskUpdateError::Validation(e) => e.into(),
            TaskUpdateError::Transition(e) => e.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::validation::ValidationError;
    use axum::body::to_bytes;
    use uuid::Uuid;

    async fn body_of(error: ApiError) -> (StatusCode, Value) {
        let response = error.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn validation_errors_carry_details() {
        let errors = ValidationErrors::new(vec![
            ValidationError::missing("email"),
            ValidationError::missing("firstName"),
        ]);
        let (status, body) = body_of(errors.into()).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["statusCode"], 400);
        assert_eq!(body["error"], "Bad Request");
        assert_eq!(body["details"].as_array().map(Vec::len), Some(2));
        assert!(body["timestamp"].is_string());
    }

    #[tokio::test]
    async fn errors_without_details_omit_the_field() {
        let (status, body) = body_of(ApiError::not_found("Company not found")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body.get("details").is_none());
        assert_eq!(body["message"], "Company not found");
    }

    #[test]
    fn status_mapping() {
        let cases: Vec<(ApiError, StatusCode)> = vec![
            (
                RepositoryError::not_found("Task", Uuid::nil()).into(),
                StatusCode::NOT_FOUND,
            ),
            (
                RepositoryError::Conflict("Email already registered".into()).into(),
                StatusCode::CONFLICT,
            ),
            (
                RepositoryError::Database("connection reset".into()).into(),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                PaginationError::PageOutOfRange(0).into(),
                StatusCode::BAD_REQUEST,
            ),
            (
                TransitionError::new("report", "PUBLISHED", "DRAFT").into(),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (
                ReportingError::Overflow("ENVIRONMENTAL").into(),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (
                ReportingError::UnknownFramework("ISO".into()).into(),
                StatusCode::BAD_REQUEST,
            ),
            (
                ReportingError::InsufficientData {
                    company_id: Uuid::nil(),
                    period: "2024".into(),
                }
                .into(),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (
                AuthError::InvalidToken("expired".into()).into(),
                StatusCode::UNAUTHORIZED,
            ),
        ];

        for (error, expected) in cases {
            assert_eq!(error.status, expected, "{}", error.message);
        }
    }

    #[tokio::test]
    async fn storage_failures_hide_internal_messages() {
        let error: ApiError = RepositoryError::Database("password authentication failed".into()).into();
        let (_, body) = body_of(error).await;
        assert_eq!(body["message"], "Internal server error");
    }
}
