#![allow(dead_code)]
use std::sync::{Arc, Mutex};

use handler_kit::{config::Settings, event::EventInfo};
use serde_json::{json, Value};

pub fn test_settings() -> Settings {
    Settings {
        app_env: "test".into(),
        ..Settings::default()
    }
}

pub fn event_info() -> EventInfo {
    EventInfo::for_environment(&test_settings(), "test")
}

pub fn gateway_event(body: Value) -> Value {
    json!({
        "httpMethod": "POST",
        "path": "/orders",
        "headers": {
            "Content-Type": "application/json",
            "Authorization": "Bearer caller-token"
        },
        "queryStringParameters": { "dryRun": "true" },
        "pathParameters": null,
        "requestContext": { "stage": "staging", "requestId": "req-123" },
        "body": body.to_string(),
        "isBase64Encoded": false
    })
}

/// Shared, ordered record of what rules did, for asserting on scheduling.
#[derive(Clone, Default)]
pub struct Journal(Arc<Mutex<Vec<String>>>);

impl Journal {
    pub fn record(&self, entry: impl Into<String>) {
        self.0.lock().expect("lock journal").push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.lock().expect("lock journal").clone()
    }
}
