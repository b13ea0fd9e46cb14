// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Remote gateway abstraction over the REST API.
//!
//! Provides a trait-based HTTP layer that enables:
//! - Real requests via reqwest for production
//! - Scripted gateways for unit testing
//!
//! Status codes are classified here so callers only ever see a
//! [`GatewayError`] variant, never a raw HTTP status.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use serde_json::Value;

use super::envelope;

/// Error type for gateway operations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GatewayError {
    /// The request never reached the server.
    #[error("network unreachable: {0}")]
    Network(String),

    /// No answer within the request timeout.
    #[error("request timed out")]
    Timeout,

    /// 401 or 403.
    #[error("unauthorized (status {status})")]
    Unauthorized { status: u16 },

    /// 404.
    #[error("not found")]
    NotFound,

    /// 5xx.
    #[error("server error (status {status})")]
    Server { status: u16 },

    /// Any other 4xx.
    #[error("rejected (status {status}): {message}")]
    Rejected { status: u16, message: String },

    /// The body could not be understood.
    #[error("invalid response body: {0}")]
    Decode(String),
}

impl GatewayError {
    /// Network failures, timeouts, and 5xx are worth another attempt.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            GatewayError::Network(_) | GatewayError::Timeout | GatewayError::Server { .. }
        )
    }

    pub fn is_auth(&self) -> bool {
        matches!(self, GatewayError::Unauthorized { .. })
    }

    /// HTTP status, when the server answered.
    pub fn status(&self) -> Option<u16> {
        match self {
            GatewayError::Unauthorized { status }
            | GatewayError::Server { status }
            | GatewayError::Rejected { status, .. } => Some(*status),
            GatewayError::NotFound => Some(404),
            _ => None,
        }
    }

    /// Classifies a non-2xx status.
    pub fn from_status(status: u16, body: &str) -> Self {
        match status {
            401 | 403 => GatewayError::Unauthorized { status },
            404 => GatewayError::NotFound,
            500..=599 => GatewayError::Server { status },
            _ => GatewayError::Rejected {
                status,
                message: rejection_message(body),
            },
        }
    }
}

/// Pulls `message` (or `error`) out of a JSON error body, else the raw text.
fn rejection_message(body: &str) -> String {
    let parsed: Option<Value> = serde_json::from_str(body).ok();
    parsed
        .as_ref()
        .and_then(|v| v.get("message").or_else(|| v.get("error")))
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| body.trim().to_string())
}

/// Result type for gateway operations.
pub type GatewayResult<T> = Result<T, GatewayError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Patch,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        }
    }
}

/// One REST call, relative to the API root.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
    pub token: Option<String>,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        ApiRequest {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
            token: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path)
    }

    pub fn post(path: impl Into<String>, body: Value) -> Self {
        Self::new(Method::Post, path).with_body(body)
    }

    pub fn patch(path: impl Into<String>, body: Option<Value>) -> Self {
        let req = Self::new(Method::Patch, path);
        match body {
            Some(body) => req.with_body(body),
            None => req,
        }
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::Delete, path)
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    pub fn with_token(mut self, token: Option<&str>) -> Self {
        self.token = token.map(str::to_string);
        self
    }
}

/// A successful (2xx) answer.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    /// `None` for an empty body.
    pub body: Option<Value>,
}

impl ApiResponse {
    pub fn new(status: u16, body: Option<Value>) -> Self {
        ApiResponse { status, body }
    }

    /// Normalizes a list response into its items.
    pub fn into_list(self) -> GatewayResult<Vec<Value>> {
        envelope::normalize_list(self.body)
    }

    /// Normalizes a single-object response.
    pub fn into_object(self) -> Option<Value> {
        envelope::normalize_object(self.body)
    }
}

/// Gateway trait for REST communication.
///
/// This trait abstracts over the actual HTTP client, allowing for easy
/// testing with scripted implementations.
pub trait Gateway: Send + Sync {
    /// Execute one request. Non-2xx answers come back as [`GatewayError`].
    fn execute(
        &self,
        request: ApiRequest,
    ) -> Pin<Box<dyn Future<Output = GatewayResult<ApiResponse>> + Send + '_>>;
}

/// Gateway implementation using reqwest.
pub struct HttpGateway {
    base_url: String,
    client: reqwest::Client,
}

impl HttpGateway {
    /// Create a gateway rooted at `base_url` with a per-request timeout.
    pub fn new(base_url: &str, timeout: Duration) -> GatewayResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GatewayError::Network(e.to_string()))?;
        Ok(HttpGateway {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl Gateway for HttpGateway {
    fn execute(
        &self,
        request: ApiRequest,
    ) -> Pin<Box<dyn Future<Output = GatewayResult<ApiResponse>> + Send + '_>> {
        Box::pin(async move {
            let url = self.url(&request.path);
            let mut builder = match request.method {
                Method::Get => self.client.get(&url),
                Method::Post => self.client.post(&url),
                Method::Patch => self.client.patch(&url),
                Method::Delete => self.client.delete(&url),
            };
            builder = builder
                .header(reqwest::header::CONTENT_TYPE, "application/json")
                .header(reqwest::header::ACCEPT, "application/json");
            if let Some(token) = &request.token {
                builder = builder.bearer_auth(token);
            }
            if !request.query.is_empty() {
                builder = builder.query(&request.query);
            }
            if let Some(body) = &request.body {
                builder = builder.json(body);
            }

            let response = builder.send().await.map_err(|e| {
                if e.is_timeout() {
                    GatewayError::Timeout
                } else {
                    GatewayError::Network(e.to_string())
                }
            })?;

            let status = response.status().as_u16();
            let bytes = response.bytes().await.map_err(|e| {
                if e.is_timeout() {
                    GatewayError::Timeout
                } else {
                    GatewayError::Network(e.to_string())
                }
            })?;

            if !(200..300).contains(&status) {
                let text = String::from_utf8_lossy(&bytes);
                let err = GatewayError::from_status(status, &text);
                tracing::debug!(
                    method = request.method.as_str(),
                    path = %request.path,
                    status,
                    "request failed"
                );
                return Err(err);
            }

            let body = if bytes.iter().all(u8::is_ascii_whitespace) {
                None
            } else {
                Some(
                    serde_json::from_slice(&bytes)
                        .map_err(|e| GatewayError::Decode(e.to_string()))?,
                )
            };
            Ok(ApiResponse::new(status, body))
        })
    }
}
