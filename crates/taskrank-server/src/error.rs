use axum::{
    extract::rejection::QueryRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use taskrank_core::{CoreError, ValidationError};
use thiserror::Error;
use tracing::error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Core(#[from] CoreError),
    #[error("Invalid request method.")]
    MethodNotAllowed,
    #[error("{}", .0.body_text())]
    Query(#[from] QueryRejection),
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::Core(CoreError::Validation(err))
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Core(err) if err.is_client_error() => StatusCode::BAD_REQUEST,
            ApiError::Core(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::Query(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            ApiError::Core(err) => {
                if let CoreError::Database(db) = err {
                    error!("database failure: {db}");
                } else if status.is_server_error() {
                    error!("request failed: {err}");
                }
                err.client_message()
            }
            ApiError::MethodNotAllowed | ApiError::Query(_) => self.to_string(),
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use taskrank_core::{DatabaseError, ScoringError};

    #[test]
    fn client_errors_map_to_400() {
        let err = ApiError::from(ValidationError::NotAList);
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);

        let err = ApiError::from(CoreError::from(ScoringError::ImportanceOutOfRange(0)));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);

        let err = ApiError::from(CoreError::NoTasks);
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn store_failures_map_to_500() {
        let err = ApiError::from(CoreError::from(DatabaseError::Locked));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn wrong_method_is_405() {
        assert_eq!(
            ApiError::MethodNotAllowed.status(),
            StatusCode::METHOD_NOT_ALLOWED
        );
        assert_eq!(
            ApiError::MethodNotAllowed.to_string(),
            "Invalid request method."
        );
    }
}
