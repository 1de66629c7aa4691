//! Helpers for serverless request handlers.
//!
//! - [`config`]: per-environment platform URL and default token
//! - [`event`]: parsing of gateway events into body + [`event::EventInfo`]
//! - [`client`]: platform HTTP client with bearer token injection
//! - [`validation`]: rule-based request validation
//! - [`response`] and [`error`]: response envelopes for success and failure

pub mod client;
pub mod config;
pub mod error;
pub mod event;
pub mod response;
pub mod validation;

pub use error::AppError;
pub use response::ApiResponse;
