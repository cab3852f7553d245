use crate::models::ErrorBody;
use crate::upstream_client::UpstreamError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use std::fmt;

/// Failures that reach the caller as an error response.
///
/// Only the identity fetch can produce one of these; the enrichment branches
/// degrade to "absent" instead.
#[derive(Debug, Clone)]
pub enum AppError {
    /// The primary upstream could not be reached (connection, DNS, timeout).
    UpstreamUnavailable(String),
    /// The primary upstream answered with something we could not use.
    InvalidUpstreamData(String),
    /// Internal server error.
    InternalError(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::UpstreamUnavailable(msg) => write!(f, "Upstream unavailable: {}", msg),
            AppError::InvalidUpstreamData(msg) => write!(f, "Invalid upstream data: {}", msg),
            AppError::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
    /// Maps every variant to a 500 with a generic public message; the detail only goes to the log.
    fn into_response(self) -> Response {
        let error_message = match &self {
            AppError::UpstreamUnavailable(msg) => {
                tracing::error!("Identity upstream unavailable: {}", msg);
                "Failed to fetch user data"
            }
            AppError::InvalidUpstreamData(msg) => {
                tracing::error!("Identity upstream returned unusable data: {}", msg);
                "Failed to get user data"
            }
            AppError::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                "Internal server error"
            }
        };

        let body = Json(ErrorBody {
            error: error_message.to_string(),
        });

        (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
    }
}

impl From<UpstreamError> for AppError {
    fn from(err: UpstreamError) -> Self {
        match err {
            UpstreamError::Transport { .. } => AppError::UpstreamUnavailable(err.to_string()),
            UpstreamError::Decode { .. } => AppError::InvalidUpstreamData(err.to_string()),
            UpstreamError::InvalidRequest(_) => AppError::InternalError(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_unavailable_maps_to_500_with_error_body() {
        let response =
            AppError::UpstreamUnavailable("connection refused".to_string()).into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(response).await;
        assert_eq!(body["error"], "Failed to fetch user data");
    }

    #[tokio::test]
    async fn test_invalid_data_maps_to_500_with_error_body() {
        let response =
            AppError::InvalidUpstreamData("missing results".to_string()).into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(response).await;
        assert_eq!(body["error"], "Failed to get user data");
    }

    #[test]
    fn test_decode_error_converts_to_invalid_data() {
        let err: AppError = UpstreamError::Decode {
            upstream: "identity",
            message: "expected value at line 1".to_string(),
        }
        .into();

        assert!(matches!(err, AppError::InvalidUpstreamData(_)));
    }
}
