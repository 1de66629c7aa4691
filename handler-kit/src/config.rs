use serde::{Deserialize, Serialize};
use std::{env, time::Duration};
use thiserror::Error;

const DEFAULT_ENVIRONMENT: &str = "dev";
const DEFAULT_USER_AGENT: &str = "handler-kit/0.1";
const DEFAULT_HTTP_TIMEOUT_SECONDS: u64 = 30;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid {key} value: {value}")]
    InvalidValue { key: &'static str, value: String },
}

/// Platform endpoint and default credentials for one deployment environment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvironmentConfig {
    pub name: String,
    pub base_url: Option<String>,
    pub default_token: String,
    pub development: bool,
    pub production: bool,
}

struct KnownEnvironment {
    aliases: &'static [&'static str],
    base_url: &'static str,
    default_token: &'static str,
    development: bool,
    production: bool,
}

const KNOWN_ENVIRONMENTS: &[KnownEnvironment] = &[
    KnownEnvironment {
        aliases: &["dev", "development", "local"],
        base_url: "https://api.dev.platform.internal",
        default_token: "dev-token",
        development: true,
        production: false,
    },
    KnownEnvironment {
        aliases: &["test"],
        base_url: "https://api.test.platform.internal",
        default_token: "test-token",
        development: true,
        production: false,
    },
    KnownEnvironment {
        aliases: &["staging"],
        base_url: "https://api.staging.platform.internal",
        default_token: "",
        development: false,
        production: false,
    },
    KnownEnvironment {
        aliases: &["prod", "production"],
        base_url: "https://api.platform.internal",
        default_token: "",
        development: false,
        production: true,
    },
];

impl EnvironmentConfig {
    /// Looks up `name` in the static environment table.
    ///
    /// Matching is case-insensitive. Unknown names yield a config with no base
    /// URL and an empty default token.
    pub fn resolve(name: &str) -> Self {
        let normalized = name.trim().to_ascii_lowercase();
        match KNOWN_ENVIRONMENTS
            .iter()
            .find(|env| env.aliases.contains(&normalized.as_str()))
        {
            Some(known) => Self {
                name: normalized,
                base_url: Some(known.base_url.to_string()),
                default_token: known.default_token.to_string(),
                development: known.development,
                production: known.production,
            },
            None => Self {
                name: normalized,
                base_url: None,
                default_token: String::new(),
                development: false,
                production: false,
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub app_env: String,
    pub platform_url_override: Option<String>,
    pub platform_token_override: Option<String>,
    pub http_timeout_seconds: u64,
    pub http_user_agent: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            app_env: DEFAULT_ENVIRONMENT.to_string(),
            platform_url_override: None,
            platform_token_override: None,
            http_timeout_seconds: DEFAULT_HTTP_TIMEOUT_SECONDS,
            http_user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl Settings {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let app_env = env::var("APP_ENV").unwrap_or_else(|_| DEFAULT_ENVIRONMENT.to_string());

        let platform_url_override = non_empty_var("PLATFORM_URL");
        let platform_token_override = non_empty_var("PLATFORM_TOKEN");

        let http_timeout_seconds = match env::var("HTTP_TIMEOUT_SECONDS") {
            Ok(raw) => raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
                key: "HTTP_TIMEOUT_SECONDS",
                value: raw,
            })?,
            Err(_) => DEFAULT_HTTP_TIMEOUT_SECONDS,
        };

        let http_user_agent =
            env::var("HTTP_USER_AGENT").unwrap_or_else(|_| DEFAULT_USER_AGENT.to_string());

        Ok(Settings {
            app_env,
            platform_url_override,
            platform_token_override,
            http_timeout_seconds,
            http_user_agent,
        })
    }

    /// Resolves `name` through the environment table and applies the
    /// `PLATFORM_URL` / `PLATFORM_TOKEN` overrides on top.
    pub fn environment(&self, name: &str) -> EnvironmentConfig {
        let mut config = EnvironmentConfig::resolve(name);
        if let Some(url) = &self.platform_url_override {
            config.base_url = Some(url.clone());
        }
        if let Some(token) = &self.platform_token_override {
            config.default_token = token.clone();
        }
        config
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_seconds)
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
