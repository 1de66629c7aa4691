//! Parsing of API-gateway style invocation events.
//!
//! A raw event is turned into a [`ParsedEvent`]: the decoded request body,
//! normalized headers and parameters, and the [`EventInfo`] context handed to
//! every validation rule.

use std::collections::HashMap;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use uuid::Uuid;

use crate::config::Settings;

const REQUEST_ID_HEADER: &str = "x-request-id";

#[derive(Debug, Error)]
pub enum EventError {
    #[error("Event payload must be a JSON object")]
    NotAnObject,
    #[error("Request body is not valid base64: {0}")]
    InvalidEncoding(#[from] base64::DecodeError),
    #[error("Request body is not valid JSON: {0}")]
    InvalidBody(#[from] serde_json::Error),
}

/// Per-request context shared with every rule invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventInfo {
    pub environment: String,
    pub development: bool,
    pub production: bool,
    pub platform_url: Option<String>,
    pub platform_token: String,
    pub request_id: String,
    pub original_event: Value,
}

impl EventInfo {
    /// Builds an event context for `environment` straight from settings,
    /// without an originating event.
    pub fn for_environment(settings: &Settings, environment: &str) -> Self {
        let config = settings.environment(environment);
        Self {
            environment: config.name,
            development: config.development,
            production: config.production,
            platform_url: config.base_url,
            platform_token: config.default_token,
            request_id: Uuid::new_v4().to_string(),
            original_event: Value::Null,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParsedEvent {
    pub method: String,
    pub path: String,
    pub headers: HashMap<String, String>,
    pub query: HashMap<String, String>,
    pub path_params: HashMap<String, String>,
    pub body: Value,
    pub info: EventInfo,
}

impl ParsedEvent {
    /// Header lookup, case-insensitive.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }
}

pub fn parse_event(raw: Value, settings: &Settings) -> Result<ParsedEvent, EventError> {
    let event = raw.as_object().ok_or(EventError::NotAnObject)?;

    let headers: HashMap<String, String> = string_map(event.get("headers"))
        .into_iter()
        .map(|(key, value)| (key.to_ascii_lowercase(), value))
        .collect();
    let query = string_map(event.get("queryStringParameters"));
    let path_params = string_map(event.get("pathParameters"));

    let base64_encoded = event
        .get("isBase64Encoded")
        .and_then(Value::as_bool)
        .unwrap_or(false);
    let body = parse_body(event.get("body"), base64_encoded)?;

    let environment = event
        .get("stageVariables")
        .and_then(|vars| vars.get("environment"))
        .and_then(Value::as_str)
        .or_else(|| {
            event
                .get("requestContext")
                .and_then(|ctx| ctx.get("stage"))
                .and_then(Value::as_str)
        })
        .filter(|name| !name.trim().is_empty())
        .unwrap_or(settings.app_env.as_str())
        .to_string();
    let config = settings.environment(&environment);

    let platform_token = headers
        .get("authorization")
        .and_then(|value| bearer_token(value))
        .map(str::to_string)
        .unwrap_or_else(|| config.default_token.clone());

    let request_id = event
        .get("requestContext")
        .and_then(|ctx| ctx.get("requestId"))
        .and_then(Value::as_str)
        .map(str::to_string)
        .or_else(|| headers.get(REQUEST_ID_HEADER).cloned())
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    let method = event
        .get("httpMethod")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    let path = event
        .get("path")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    tracing::debug!(
        environment = %config.name,
        request_id = %request_id,
        method = %method,
        path = %path,
        "Parsed incoming event"
    );

    let info = EventInfo {
        environment: config.name,
        development: config.development,
        production: config.production,
        platform_url: config.base_url,
        platform_token,
        request_id,
        original_event: raw,
    };

    Ok(ParsedEvent {
        method,
        path,
        headers,
        query,
        path_params,
        body,
        info,
    })
}

fn parse_body(body: Option<&Value>, base64_encoded: bool) -> Result<Value, EventError> {
    match body {
        None | Some(Value::Null) => Ok(Value::Null),
        Some(Value::String(text)) => {
            let bytes = if base64_encoded {
                STANDARD.decode(text.trim())?
            } else {
                text.as_bytes().to_vec()
            };
            if bytes.iter().all(u8::is_ascii_whitespace) {
                return Ok(Value::Null);
            }
            Ok(serde_json::from_slice(&bytes)?)
        }
        Some(other) => Ok(other.clone()),
    }
}

fn bearer_token(header: &str) -> Option<&str> {
    let (scheme, token) = header.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

fn string_map(value: Option<&Value>) -> HashMap<String, String> {
    let Some(Value::Object(map)) = value else {
        return HashMap::new();
    };
    map.iter()
        .filter_map(|(key, value)| {
            let value = match value {
                Value::String(s) => s.clone(),
                Value::Null => return None,
                other => other.to_string(),
            };
            Some((key.clone(), value))
        })
        .collect()
}
