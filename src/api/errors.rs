use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::domain::survey::SurveyError;

/// API error type with HTTP status code and message
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    /// Creates a new API error
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    /// Creates a 400 Bad Request error
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    /// Creates a 404 Not Found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    /// Creates a 500 Internal Server Error
    pub fn internal_server_error(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": self.message
        }));

        (self.status, body).into_response()
    }
}

impl From<SurveyError> for ApiError {
    fn from(error: SurveyError) -> Self {
        match error {
            SurveyError::SurveyNotFound(_)
            | SurveyError::QuestionNotFound(_)
            | SurveyError::UnknownSurveyRef(_)
            | SurveyError::UnknownQuestionRef(_) => {
                Self::not_found(error.to_string())
            }
            SurveyError::Repository(_) => {
                Self::internal_server_error(format!("Storage error: {}", error))
            }
            _ => Self::bad_request(error.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn maps_survey_errors_to_statuses() {
        let missing = ApiError::from(SurveyError::SurveyNotFound(Uuid::new_v4()));
        assert_eq!(missing.status, StatusCode::NOT_FOUND);

        let storage = ApiError::from(SurveyError::Repository("connection reset".to_string()));
        assert_eq!(storage.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(storage.message.contains("connection reset"));

        let invalid = ApiError::from(SurveyError::InvalidInput("name is empty".to_string()));
        assert_eq!(invalid.status, StatusCode::BAD_REQUEST);
    }
}
