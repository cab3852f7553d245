use crate::errors::AppError;
use reqwest::header::HeaderName;
use serde::de::DeserializeOwned;
use std::fmt;
use std::time::Duration;
use url::Url;

/// Sent with every outbound call; the news upstream rejects anonymous clients.
pub const USER_AGENT: &str = "RandomUserExplorer/1.0 (Rust)";

/// A response body that can carry an upstream-reported "no data" condition.
///
/// Upstreams signal "not found" or errors inside an otherwise well-formed body
/// (a status field, an empty list). That is an expected outcome, so it is
/// reported as `None` rather than as an error.
pub trait UpstreamResponse: DeserializeOwned {
    type Payload;

    fn into_payload(self) -> Option<Self::Payload>;
}

/// Why a single upstream call could not produce a decoded body.
#[derive(Debug)]
pub enum UpstreamError {
    /// Connection refused, DNS failure, timeout or a broken body stream.
    Transport {
        upstream: &'static str,
        source: reqwest::Error,
    },
    /// The body is not the JSON shape the upstream documents.
    Decode {
        upstream: &'static str,
        message: String,
    },
    /// The request URL could not be assembled.
    InvalidRequest(String),
}

impl fmt::Display for UpstreamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UpstreamError::Transport { upstream, source } => {
                write!(f, "{} upstream request failed: {}", upstream, source)
            }
            UpstreamError::Decode { upstream, message } => {
                write!(f, "failed to decode {} upstream response: {}", upstream, message)
            }
            UpstreamError::InvalidRequest(msg) => write!(f, "invalid upstream request: {}", msg),
        }
    }
}

impl std::error::Error for UpstreamError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            UpstreamError::Transport { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// A fully-formed outbound request.
#[derive(Debug, Clone)]
pub struct UpstreamRequest {
    /// Short upstream name used in logs and errors.
    pub upstream: &'static str,
    pub method: reqwest::Method,
    pub url: Url,
    pub headers: Vec<(HeaderName, String)>,
    secret: Option<String>,
}

impl UpstreamRequest {
    pub fn get(upstream: &'static str, url: Url) -> Self {
        Self {
            upstream,
            method: reqwest::Method::GET,
            url,
            headers: Vec::new(),
            secret: None,
        }
    }

    pub fn header(mut self, name: HeaderName, value: impl Into<String>) -> Self {
        self.headers.push((name, value.into()));
        self
    }

    /// Marks a credential embedded in the URL so it never reaches the logs.
    pub fn redacting(mut self, secret: impl Into<String>) -> Self {
        self.secret = Some(secret.into());
        self
    }

    pub fn loggable_url(&self) -> String {
        let url = self.url.as_str();
        match self.secret.as_deref() {
            Some(secret) if !secret.is_empty() => url.replace(secret, "[REDACTED]"),
            _ => url.to_string(),
        }
    }
}

/// Thin typed wrapper around one outbound HTTP call. No caching, no retry.
#[derive(Clone)]
pub struct UpstreamClient {
    client: reqwest::Client,
}

impl UpstreamClient {
    /// Creates a new `UpstreamClient` whose calls are bounded by `timeout`.
    pub fn new(timeout: Duration) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| AppError::InternalError(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client })
    }

    /// Issues the request once and decodes the body as `R`.
    ///
    /// Non-2xx statuses are not errors by themselves: the upstreams used here
    /// describe failures in the body, so the body is always decoded and `R`
    /// decides whether it carries data.
    ///
    /// # Returns
    ///
    /// * `Ok(Some(payload))` - the upstream returned data.
    /// * `Ok(None)` - the upstream reported "not found" or an error condition.
    /// * `Err(UpstreamError)` - transport or decode failure.
    pub async fn call<R: UpstreamResponse>(
        &self,
        request: &UpstreamRequest,
    ) -> Result<Option<R::Payload>, UpstreamError> {
        let upstream = request.upstream;
        tracing::debug!("Calling {} upstream: {}", upstream, request.loggable_url());

        let mut builder = self
            .client
            .request(request.method.clone(), request.url.clone());
        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| UpstreamError::Transport {
                upstream,
                source: e.without_url(),
            })?;

        let status = response.status();
        if !status.is_success() {
            tracing::debug!("{} upstream answered {}", upstream, status);
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| UpstreamError::Transport {
                upstream,
                source: e.without_url(),
            })?;

        let decoded: R = serde_json::from_slice(&body).map_err(|e| UpstreamError::Decode {
            upstream,
            message: format!("{} (HTTP {})", e, status),
        })?;

        Ok(decoded.into_payload())
    }
}

/// Collapses a branch outcome to present/absent, logging why it is absent.
pub fn settle<T>(branch: &str, outcome: Result<Option<T>, UpstreamError>) -> Option<T> {
    match outcome {
        Ok(Some(payload)) => Some(payload),
        Ok(None) => {
            tracing::info!("{} upstream reported no data", branch);
            None
        }
        Err(e) => {
            tracing::warn!("{} branch degraded to absent: {}", branch, e);
            None
        }
    }
}
