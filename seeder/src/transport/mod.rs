//! HTTP plumbing shared by every seeding stage.
//!
//! [`Transport`] is the raw single-shot call; [`ApiClient`] layers retry,
//! backoff, throttling and re-login on top and never surfaces an error to
//! its caller.

mod client;
mod credentials;
mod http;

pub use client::{ApiClient, Backoff, RetryPolicy};
pub use credentials::Credentials;
pub(crate) use credentials::login_body;
pub use http::ReqwestTransport;

use async_trait::async_trait;
use serde_json::Value;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
}

impl Method {
    /// Past-tense verb used in progress lines.
    pub fn verb(self) -> &'static str {
        match self {
            Method::Get => "Fetched",
            Method::Post => "Created",
            Method::Put => "Updated",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
        };
        f.write_str(s)
    }
}

/// A single outgoing call, relative to the transport's base URL.
#[derive(Debug, Clone, Copy)]
pub struct ApiRequest<'a> {
    pub method: Method,
    pub path: &'a str,
    pub body: Option<&'a Value>,
    pub token: Option<&'a str>,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TransportError {
    /// The server answered with a non-2xx status.
    #[error("{status} {message}")]
    Status { status: u16, message: String },
    /// No response at all (DNS, connect, timeout, body read).
    #[error("Unknown {0}")]
    Network(String),
    /// The HTTP client could not be built.
    #[error("client setup failed: {0}")]
    Client(String),
}

impl TransportError {
    pub fn status(&self) -> Option<u16> {
        match self {
            TransportError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }
}

#[async_trait]
pub trait Transport: Send + Sync {
    /// Performs exactly one call. A 2xx answer yields the decoded body
    /// (`Value::Null` for an empty body).
    async fn send(&self, request: ApiRequest<'_>) -> Result<Value, TransportError>;
}
