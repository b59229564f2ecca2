use axum::{
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::Json,
};
use serde_json::{json, Value};
use tracing::{error, warn};

use crate::models::{RepositoryError, ServiceError};

/// Every failing handler answers with a status and `{error, timestamp}`
pub type ApiError = (StatusCode, Json<Value>);

pub fn error_response(status: StatusCode, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(json!({
            "error": message.into(),
            "timestamp": chrono::Utc::now().to_rfc3339(),
        })),
    )
}

pub fn service_error_to_response(err: ServiceError) -> ApiError {
    let (status, message) = match &err {
        ServiceError::DinnerNotFound { .. }
        | ServiceError::FoodNotFound { .. }
        | ServiceError::FoodNotInDinner { .. }
        | ServiceError::NoDinnersFound => (StatusCode::NOT_FOUND, err.to_string()),
        ServiceError::DuplicateAssociation { .. } => (StatusCode::BAD_REQUEST, err.to_string()),
        ServiceError::ValidationError { message } => (StatusCode::BAD_REQUEST, message.clone()),
        ServiceError::ConcurrencyConflict { .. } => {
            error!(error = %err, "Concurrent modification detected");
            (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
        }
        ServiceError::Repository { source } => {
            error!(error = %source, "Repository failure");
            match source {
                RepositoryError::ConnectionFailed { .. } => (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "Database connection failed".to_string(),
                ),
                RepositoryError::Timeout => {
                    (StatusCode::REQUEST_TIMEOUT, "Request timeout".to_string())
                }
                _ => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                ),
            }
        }
    };

    error_response(status, message)
}

/// Malformed bodies are client errors; size and media type keep their own codes
pub fn json_rejection_to_response(rejection: JsonRejection) -> ApiError {
    let status = match rejection.status() {
        StatusCode::PAYLOAD_TOO_LARGE | StatusCode::UNSUPPORTED_MEDIA_TYPE => rejection.status(),
        _ => StatusCode::BAD_REQUEST,
    };
    warn!(status = status.as_u16(), "Rejected request body: {}", rejection.body_text());
    error_response(status, rejection.body_text())
}

pub fn path_rejection_to_response(rejection: PathRejection) -> ApiError {
    warn!("Rejected path parameters: {}", rejection.body_text());
    error_response(StatusCode::BAD_REQUEST, rejection.body_text())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_kinds_map_to_404() {
        let errors = vec![
            ServiceError::DinnerNotFound { id: 1 },
            ServiceError::FoodNotFound { id: 2 },
            ServiceError::FoodNotInDinner {
                dinner_id: 1,
                food_id: 2,
            },
            ServiceError::NoDinnersFound,
        ];

        for err in errors {
            let (status, _) = service_error_to_response(err);
            assert_eq!(status, StatusCode::NOT_FOUND);
        }
    }

    #[test]
    fn test_duplicate_association_body() {
        let (status, Json(body)) = service_error_to_response(ServiceError::DuplicateAssociation {
            dinner_id: 1,
            food_id: 2,
        });

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "This food is already added to the dinner.");
        assert!(body["timestamp"].is_string());
    }

    #[test]
    fn test_repository_errors() {
        let (status, Json(body)) = service_error_to_response(ServiceError::Repository {
            source: RepositoryError::Database {
                message: "disk I/O error".to_string(),
            },
        });
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Internal server error");

        let (status, _) = service_error_to_response(RepositoryError::Timeout.into());
        assert_eq!(status, StatusCode::REQUEST_TIMEOUT);

        let (status, _) = service_error_to_response(
            RepositoryError::ConnectionFailed {
                message: "pool closed".to_string(),
            }
            .into(),
        );
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn test_concurrency_conflict_is_server_error() {
        let (status, _) = service_error_to_response(ServiceError::ConcurrencyConflict {
            entity: "Food",
            id: 3,
        });
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }
}
