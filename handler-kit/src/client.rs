//! HTTP client for calls back into the platform API.
//!
//! Every request carries the bearer token from the event context, and every
//! failure is reported as an [`HttpError`] naming the method and URL.

use reqwest::{
    header::ACCEPT,
    Client, Method, StatusCode,
};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use thiserror::Error;
use url::Url;

use crate::{config::Settings, event::EventInfo};

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("No platform URL configured")]
    MissingBaseUrl,
    #[error("Invalid platform URL {url}: {source}")]
    InvalidBaseUrl {
        url: String,
        source: url::ParseError,
    },
    #[error("Failed to initialize HTTP client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("{method} {url} failed: {source}")]
    Request {
        method: Method,
        url: String,
        source: reqwest::Error,
    },
    #[error("{method} {url} returned {status}: {body}")]
    Status {
        method: Method,
        url: String,
        status: StatusCode,
        body: String,
    },
    #[error("{method} {url} returned an unreadable body: {source}")]
    Decode {
        method: Method,
        url: String,
        source: serde_json::Error,
    },
}

/// Platform API client bound to one base URL and bearer token.
///
/// Cheap to clone; clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct PlatformClient {
    http: Client,
    base_url: String,
    token: String,
}

impl PlatformClient {
    pub fn new(base_url: &str, token: impl Into<String>) -> Result<Self, HttpError> {
        Self::with_settings(base_url, token, &Settings::default())
    }

    pub fn with_settings(
        base_url: &str,
        token: impl Into<String>,
        settings: &Settings,
    ) -> Result<Self, HttpError> {
        Url::parse(base_url).map_err(|source| HttpError::InvalidBaseUrl {
            url: base_url.to_string(),
            source,
        })?;

        let http = Client::builder()
            .user_agent(settings.http_user_agent.as_str())
            .timeout(settings.http_timeout())
            .build()
            .map_err(HttpError::Client)?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.into(),
        })
    }

    /// Client for the platform the event was addressed to.
    pub fn from_event_info(info: &EventInfo, settings: &Settings) -> Result<Self, HttpError> {
        let base_url = info
            .platform_url
            .as_deref()
            .ok_or(HttpError::MissingBaseUrl)?;
        Self::with_settings(base_url, info.platform_token.clone(), settings)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, HttpError> {
        self.send(Method::GET, path, None::<&()>).await
    }

    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, HttpError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send(Method::POST, path, Some(body)).await
    }

    pub async fn put<B, T>(&self, path: &str, body: &B) -> Result<T, HttpError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send(Method::PUT, path, Some(body)).await
    }

    pub async fn patch<B, T>(&self, path: &str, body: &B) -> Result<T, HttpError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send(Method::PATCH, path, Some(body)).await
    }

    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T, HttpError> {
        self.send(Method::DELETE, path, None::<&()>).await
    }

    async fn send<B, T>(&self, method: Method, path: &str, body: Option<&B>) -> Result<T, HttpError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.url(path);
        let request_error = |source: reqwest::Error| HttpError::Request {
            method: method.clone(),
            url: url.clone(),
            source,
        };

        let mut request = self
            .http
            .request(method.clone(), &url)
            .header(ACCEPT, "application/json");
        if !self.token.is_empty() {
            request = request.bearer_auth(&self.token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        tracing::debug!(method = %method, url = %url, "Calling platform API");
        let response = request.send().await.map_err(request_error)?;
        let status = response.status();
        let bytes = response.bytes().await.map_err(request_error)?;

        if !status.is_success() {
            let body = String::from_utf8_lossy(&bytes).into_owned();
            tracing::warn!(method = %method, url = %url, status = status.as_u16(), "Platform API returned error status");
            return Err(HttpError::Status {
                method,
                url,
                status,
                body,
            });
        }

        let decoded = if bytes.iter().all(u8::is_ascii_whitespace) {
            serde_json::from_value(Value::Null)
        } else {
            serde_json::from_slice(&bytes)
        };
        decoded.map_err(|source| HttpError::Decode {
            method,
            url,
            source,
        })
    }
}
