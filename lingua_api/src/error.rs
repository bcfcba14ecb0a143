use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use lingua_core::TranslateError;
use thiserror::Error;
use tracing::{error, warn};

use crate::contract::v1::{ErrorDetail, ErrorResponse};

/// Failure of an API call, rendered as `{"error": {"kind", "message"}}`.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed request that never reached the agent.
    #[error("{0}")]
    BadRequest(String),

    #[error(transparent)]
    Translate(#[from] TranslateError),
}

impl ApiError {
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::BadRequest(_) => "validation",
            Self::Translate(err) => err.kind(),
        }
    }

    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) | Self::Translate(TranslateError::Validation(_)) => {
                StatusCode::BAD_REQUEST
            }
            Self::Translate(TranslateError::Provider(_)) => StatusCode::BAD_GATEWAY,
            Self::Translate(TranslateError::Persistence(_)) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        Self::BadRequest(format!("invalid request body: {err}"))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(kind = self.kind(), "Request failed: {self}");
        } else {
            warn!(kind = self.kind(), "Request rejected: {self}");
        }

        let body = ErrorResponse {
            error: ErrorDetail {
                kind: self.kind().to_string(),
                message: self.to_string(),
            },
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lingua_core::StoreError;

    #[test]
    fn test_status_per_kind() {
        let cases = [
            (ApiError::BadRequest("x".into()), StatusCode::BAD_REQUEST, "validation"),
            (
                TranslateError::Validation("too long".into()).into(),
                StatusCode::BAD_REQUEST,
                "validation",
            ),
            (
                TranslateError::Provider(anyhow::anyhow!("boom")).into(),
                StatusCode::BAD_GATEWAY,
                "provider",
            ),
            (
                TranslateError::from(StoreError::Unavailable("down".into())).into(),
                StatusCode::SERVICE_UNAVAILABLE,
                "persistence",
            ),
        ];

        for (err, status, kind) in cases {
            assert_eq!(err.status(), status);
            assert_eq!(err.kind(), kind);
        }
    }
}
