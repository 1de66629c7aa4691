use std::{env, fs, io::Read};

use anyhow::Context;
use serde_json::Value;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use handler_kit::{
    config::Settings,
    event::parse_event,
    validation::{RuleSet, Validator},
    ApiResponse, AppError,
};

const DEFAULT_RULES: &str = "body-present";

fn mask_secret(s: &str) -> String {
    if s.is_empty() {
        return "<empty>".into();
    }
    let prefix = s.chars().take(4).collect::<String>();
    format!("{}*** (len={})", prefix, s.len())
}

fn read_event() -> anyhow::Result<Value> {
    let raw = match env::args().nth(1) {
        Some(path) => {
            fs::read_to_string(&path).with_context(|| format!("Failed to read event file {path}"))?
        }
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read event from stdin")?;
            buf
        }
    };
    serde_json::from_str(&raw).context("Event is not valid JSON")
}

fn configured_rules() -> RuleSet {
    env::var("VALIDATION_RULES")
        .unwrap_or_else(|_| DEFAULT_RULES.to_string())
        .split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .collect()
}

async fn handle(raw: Value, settings: &Settings) -> Result<ApiResponse, AppError> {
    let event = parse_event(raw, settings)?;
    let validator = Validator::for_event(&event);
    let rules = configured_rules();

    let sequential = env::var("VALIDATION_MODE")
        .map(|mode| mode.eq_ignore_ascii_case("sequential"))
        .unwrap_or(false);
    let result = if sequential {
        validator.validate_one_by_one(rules).await
    } else {
        validator.validate(rules).await
    };

    if result.has_errors() {
        return Err(AppError::Validation(result));
    }

    Ok(ApiResponse::ok(&event.body).with_header("X-Request-Id", event.info.request_id))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "handler_kit=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let settings = Settings::load()?;
    tracing::info!(
        app_env = %settings.app_env,
        platform_url_override = ?settings.platform_url_override,
        platform_token_override = %mask_secret(settings.platform_token_override.as_deref().unwrap_or_default()),
        http_timeout_seconds = settings.http_timeout_seconds,
        "Loaded configuration from environment/.env"
    );

    let raw = read_event()?;
    let response = handle(raw, &settings)
        .await
        .unwrap_or_else(AppError::into_response);

    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}
