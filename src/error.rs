use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Error taxonomy of the relay. Every variant terminates at the HTTP
/// boundary as a structured JSON body, except the plain-text 405.
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    #[error("Method not allowed")]
    MethodNotAllowed,

    #[error("Forbidden: Invalid origin")]
    OriginRejected,

    #[error("Not found")]
    RouteNotFound,

    #[error("Missing contents field")]
    MissingContents,

    #[error("API key not configured")]
    ApiKeyNotConfigured,

    #[error("Gemini API error ({status}): {message}")]
    Upstream { status: StatusCode, message: String },

    #[error("Gemini API timeout")]
    UpstreamTimeout,

    #[error("Request to Gemini failed: {0}")]
    RequestFailed(reqwest::Error),

    #[error("Malformed JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("Failed to read request body: {0}")]
    BodyRead(#[from] axum::Error),
}

impl From<reqwest::Error> for RelayError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            RelayError::UpstreamTimeout
        } else {
            // URL stripped so the key query parameter never reaches a log line.
            RelayError::RequestFailed(e.without_url())
        }
    }
}

impl RelayError {
    /// Internal faults are collapsed to a generic client-facing body; the
    /// cause stays in server-side logs only.
    pub fn is_internal(&self) -> bool {
        matches!(
            self,
            RelayError::RequestFailed(_) | RelayError::InvalidJson(_) | RelayError::BodyRead(_)
        )
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        match self {
            RelayError::MethodNotAllowed => {
                (StatusCode::METHOD_NOT_ALLOWED, "Method not allowed").into_response()
            }
            RelayError::OriginRejected => {
                error_body(StatusCode::FORBIDDEN, "Forbidden: Invalid origin")
            }
            RelayError::RouteNotFound => error_body(StatusCode::NOT_FOUND, "Not found"),
            RelayError::MissingContents => {
                error_body(StatusCode::BAD_REQUEST, "Missing contents field")
            }
            RelayError::ApiKeyNotConfigured => {
                error_body(StatusCode::INTERNAL_SERVER_ERROR, "API key not configured")
            }
            RelayError::Upstream { status, message } => (
                status,
                Json(json!({ "error": message, "status": status.as_u16() })),
            )
                .into_response(),
            RelayError::UpstreamTimeout => {
                error_body(StatusCode::GATEWAY_TIMEOUT, "Gemini API timeout")
            }
            RelayError::RequestFailed(_) | RelayError::InvalidJson(_) | RelayError::BodyRead(_) => {
                error_body(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
        }
    }
}

fn error_body(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}
