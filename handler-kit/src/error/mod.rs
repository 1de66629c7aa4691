use reqwest::StatusCode;

use crate::{
    client::HttpError,
    config::ConfigError,
    event::EventError,
    response::{ApiResponse, ErrorResponse},
    validation::ValidationResult,
};

#[derive(Debug)]
pub enum AppError {
    NotFound(String),
    Unauthorized(String),
    Forbidden(String),
    BadRequest(String),
    InternalServerError(anyhow::Error),
    Validation(ValidationResult),
}

impl AppError {
    pub fn into_response(self) -> ApiResponse {
        let (status, error_message, code) = match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg, "NOT_FOUND"),
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg, "UNAUTHORIZED"),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg, "FORBIDDEN"),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg, "BAD_REQUEST"),
            AppError::InternalServerError(err) => {
                tracing::error!("Internal server error: {:?}", err);
                return ApiResponse::internal_error();
            }
            AppError::Validation(result) => return ApiResponse::validation_error(&result),
        };

        ApiResponse::error(
            status,
            ErrorResponse {
                error: error_message,
                code: code.to_string(),
                details: None,
            },
        )
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::InternalServerError(err)
    }
}

impl From<EventError> for AppError {
    fn from(err: EventError) -> Self {
        match err {
            EventError::NotAnObject => AppError::InternalServerError(err.into()),
            EventError::InvalidEncoding(_) | EventError::InvalidBody(_) => {
                AppError::BadRequest(err.to_string())
            }
        }
    }
}

impl From<HttpError> for AppError {
    fn from(err: HttpError) -> Self {
        let not_found = matches!(
            &err,
            HttpError::Status { status, .. } if *status == StatusCode::NOT_FOUND
        );
        if not_found {
            AppError::NotFound("Resource not found".to_string())
        } else {
            AppError::InternalServerError(err.into())
        }
    }
}

impl From<ConfigError> for AppError {
    fn from(err: ConfigError) -> Self {
        AppError::InternalServerError(err.into())
    }
}

impl From<ValidationResult> for AppError {
    fn from(result: ValidationResult) -> Self {
        AppError::Validation(result)
    }
}
