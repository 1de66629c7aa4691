//! Built-in rules addressable by name through the default registry.

use serde_json::Value;

use crate::event::EventInfo;

use super::loader::RuleRegistry;
use super::rule::RuleFunction;

pub const BODY_PRESENT: &str = "body-present";
pub const BODY_OBJECT: &str = "body-object";
pub const PLATFORM_TOKEN: &str = "platform-token";
pub const PLATFORM_URL: &str = "platform-url";

pub fn register_builtin(registry: &mut RuleRegistry) {
    registry
        .register(BODY_PRESENT, RuleFunction::from_body(body_present))
        .register(BODY_OBJECT, RuleFunction::from_body(body_object))
        .register(PLATFORM_TOKEN, RuleFunction::new(platform_token))
        .register(PLATFORM_URL, RuleFunction::new(platform_url));
}

/// Requires a non-null request body.
pub fn body_present(body: &Value) -> Option<String> {
    body.is_null().then(|| "Request body is required".to_string())
}

/// Requires the request body to be a JSON object.
pub fn body_object(body: &Value) -> Option<String> {
    (!body.is_object()).then(|| "Request body must be a JSON object".to_string())
}

pub fn platform_token(_body: &Value, event: &EventInfo) -> Option<String> {
    event
        .platform_token
        .trim()
        .is_empty()
        .then(|| "Platform token is missing".to_string())
}

pub fn platform_url(_body: &Value, event: &EventInfo) -> Option<String> {
    event.platform_url.is_none().then(|| {
        format!(
            "No platform URL configured for environment '{}'",
            event.environment
        )
    })
}

/// Builds a rule reporting every listed field that is absent or null.
///
/// Requirements:
/// - One message per missing field, in the order given
/// - A body that is not an object is missing every field
pub fn required_fields(fields: &[&str]) -> RuleFunction {
    let fields: Vec<String> = fields.iter().map(|field| field.to_string()).collect();
    RuleFunction::from_body(move |body: &Value| {
        fields
            .iter()
            .filter(|field| body.get(field.as_str()).map_or(true, Value::is_null))
            .map(|field| format!("Field '{field}' is required"))
            .collect::<Vec<String>>()
    })
    .named("required-fields")
}
