//! Response envelopes returned from handlers to the gateway.

use std::collections::BTreeMap;

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::validation::ValidationResult;

pub const CONTENT_TYPE: &str = "Content-Type";
pub const ALLOW_ORIGIN: &str = "Access-Control-Allow-Origin";

/// Body of every error envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

/// Gateway response: status code, headers and a JSON body as a string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse {
    pub status_code: u16,
    pub headers: BTreeMap<String, String>,
    pub body: String,
}

impl ApiResponse {
    pub fn new(status: StatusCode, body: impl Into<String>) -> Self {
        let mut headers = BTreeMap::new();
        headers.insert(CONTENT_TYPE.to_string(), "application/json".to_string());
        headers.insert(ALLOW_ORIGIN.to_string(), "*".to_string());
        Self {
            status_code: status.as_u16(),
            headers,
            body: body.into(),
        }
    }

    /// Serializes `data` as the body. Falls back to a 500 envelope when
    /// serialization fails.
    pub fn json<T: Serialize + ?Sized>(status: StatusCode, data: &T) -> Self {
        match serde_json::to_string(data) {
            Ok(body) => Self::new(status, body),
            Err(err) => {
                tracing::error!(error = %err, "Failed to serialize response body");
                Self::internal_error()
            }
        }
    }

    pub fn ok<T: Serialize + ?Sized>(data: &T) -> Self {
        Self::json(StatusCode::OK, data)
    }

    pub fn created<T: Serialize + ?Sized>(data: &T) -> Self {
        Self::json(StatusCode::CREATED, data)
    }

    pub fn no_content() -> Self {
        Self::new(StatusCode::NO_CONTENT, "")
    }

    pub fn error(status: StatusCode, error: ErrorResponse) -> Self {
        Self::json(status, &error)
    }

    pub fn validation_error(result: &ValidationResult) -> Self {
        Self::error(
            StatusCode::BAD_REQUEST,
            ErrorResponse {
                error: "Validation failed".to_string(),
                code: "VALIDATION_ERROR".to_string(),
                details: serde_json::to_value(result.get_errors()).ok(),
            },
        )
    }

    pub fn internal_error() -> Self {
        let body = ErrorResponse {
            error: "Internal server error".to_string(),
            code: "INTERNAL_SERVER_ERROR".to_string(),
            details: None,
        };
        let body = serde_json::to_string(&body)
            .unwrap_or_else(|_| r#"{"error":"Internal server error"}"#.to_string());
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, body)
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn status(&self) -> StatusCode {
        StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    pub fn body_json(&self) -> Result<Value, serde_json::Error> {
        serde_json::from_str(&self.body)
    }
}
