use base64::{engine::general_purpose::STANDARD, Engine as _};
use handler_kit::{
    config::Settings,
    event::{parse_event, EventError},
    validation::Validator,
};
use serde_json::{json, Value};

mod support;

use support::{gateway_event, test_settings};

#[test]
fn parses_body_headers_and_parameters() {
    let event = parse_event(gateway_event(json!({ "sku": "A-1" })), &test_settings())
        .expect("parse event");

    assert_eq!(event.method, "POST");
    assert_eq!(event.path, "/orders");
    assert_eq!(event.body, json!({ "sku": "A-1" }));
    assert_eq!(event.header("content-type"), Some("application/json"));
    assert_eq!(event.header("CONTENT-TYPE"), Some("application/json"));
    assert_eq!(event.query.get("dryRun").map(String::as_str), Some("true"));
    assert!(event.path_params.is_empty());
}

#[test]
fn stage_selects_environment_and_bearer_header_wins_over_default_token() {
    let event = parse_event(gateway_event(json!({})), &test_settings()).expect("parse event");

    assert_eq!(event.info.environment, "staging");
    assert!(!event.info.development);
    assert!(!event.info.production);
    assert_eq!(
        event.info.platform_url.as_deref(),
        Some("https://api.staging.platform.internal")
    );
    assert_eq!(event.info.platform_token, "caller-token");
    assert_eq!(event.info.request_id, "req-123");
    assert_eq!(event.info.original_event["path"], "/orders");
}

#[test]
fn stage_variables_take_precedence_over_stage() {
    let mut raw = gateway_event(json!({}));
    raw["stageVariables"] = json!({ "environment": "prod" });

    let event = parse_event(raw, &test_settings()).expect("parse event");
    assert_eq!(event.info.environment, "prod");
    assert!(event.info.production);
}

#[test]
fn falls_back_to_settings_environment_and_default_token() {
    let raw = json!({ "body": null, "headers": { "X-Request-Id": "from-header" } });

    let event = parse_event(raw, &test_settings()).expect("parse event");
    assert_eq!(event.body, Value::Null);
    assert_eq!(event.info.environment, "test");
    assert!(event.info.development);
    assert_eq!(event.info.platform_token, "test-token");
    assert_eq!(event.info.request_id, "from-header");
    assert!(event.method.is_empty());
}

#[test]
fn unknown_environment_has_no_platform_url() {
    let settings = Settings {
        app_env: "sandbox".into(),
        ..Settings::default()
    };

    let event = parse_event(json!({}), &settings).expect("parse event");
    assert_eq!(event.info.environment, "sandbox");
    assert!(event.info.platform_url.is_none());
    assert!(!event.info.request_id.is_empty());
}

#[test]
fn decodes_base64_bodies() {
    let raw = json!({
        "body": STANDARD.encode(r#"{"qty":3}"#),
        "isBase64Encoded": true
    });

    let event = parse_event(raw, &test_settings()).expect("parse event");
    assert_eq!(event.body, json!({ "qty": 3 }));
}

#[test]
fn rejects_base64_bodies_that_are_not_utf8() {
    let raw = json!({
        "body": STANDARD.encode(b"{\"name\":\"\xff\"}"),
        "isBase64Encoded": true
    });

    let err = parse_event(raw, &test_settings()).unwrap_err();
    assert!(matches!(err, EventError::InvalidBody(_)));
}

#[test]
fn structured_bodies_are_used_as_is() {
    let raw = json!({ "body": { "already": "parsed" } });
    let event = parse_event(raw, &test_settings()).expect("parse event");
    assert_eq!(event.body, json!({ "already": "parsed" }));
}

#[test]
fn rejects_malformed_input() {
    let err = parse_event(json!({ "body": "{not json" }), &test_settings()).unwrap_err();
    assert!(matches!(err, EventError::InvalidBody(_)));

    let err = parse_event(
        json!({ "body": "%%%", "isBase64Encoded": true }),
        &test_settings(),
    )
    .unwrap_err();
    assert!(matches!(err, EventError::InvalidEncoding(_)));

    let err = parse_event(json!("not an event"), &test_settings()).unwrap_err();
    assert!(matches!(err, EventError::NotAnObject));
}

#[tokio::test]
async fn parsed_events_feed_the_validator() {
    let event = parse_event(gateway_event(json!({ "sku": "A-1" })), &test_settings())
        .expect("parse event");

    let result = Validator::for_event(&event)
        .validate(vec!["body-present", "body-object", "platform-token", "platform-url"])
        .await;
    assert!(!result.has_errors(), "{}", result.get_errors_as_string());
}
