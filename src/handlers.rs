use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    extract::State,
    http::Request,
    response::{IntoResponse, Response},
};
use http::{header, HeaderValue, Method, StatusCode};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::{config::RelayConfig, error::RelayError, relay};

/// The single recognized relay route.
pub const GENERATE_PATH: &str = "/api/gemini/generate";

const CORS_ALLOW_METHODS: &str = "POST, OPTIONS";
const CORS_ALLOW_HEADERS: &str = "Content-Type";
const CORS_MAX_AGE: &str = "86400";

pub async fn health_check() -> impl IntoResponse {
    StatusCode::OK
}

/// Relay entry point, registered as the router fallback so it owns method,
/// origin, and path dispatch for every request.
pub async fn relay_request(
    State(config): State<Arc<RelayConfig>>,
    request: Request<Body>,
) -> Response {
    let request_id = Uuid::new_v4();
    let (parts, body) = request.into_parts();
    let method = parts.method;
    let path = parts.uri.path().to_string();
    let origin = parts
        .headers
        .get(header::ORIGIN)
        .and_then(|v| v.to_str().ok())
        .map(String::from);

    info!(
        %request_id,
        %method,
        %path,
        origin = origin.as_deref().unwrap_or("-"),
        "Incoming request"
    );

    let response = dispatch(&config, method, &path, origin.as_deref(), body).await;
    tag_request_id(response, request_id)
}

async fn dispatch(
    config: &RelayConfig,
    method: Method,
    path: &str,
    origin: Option<&str>,
    body: Body,
) -> Response {
    if method == Method::OPTIONS {
        return preflight(config, origin);
    }
    if method == Method::GET && path == "/health" {
        return health_check().await.into_response();
    }
    // The 405 is deliberately plain text and carries no CORS headers.
    if method != Method::POST {
        return RelayError::MethodNotAllowed.into_response();
    }

    let Some(origin) = origin.filter(|o| config.is_allowed_origin(o)) else {
        warn!(
            origin = origin.unwrap_or("-"),
            "Rejected request from disallowed origin"
        );
        return with_cors(
            RelayError::OriginRejected.into_response(),
            config.fallback_origin(),
        );
    };

    let response = match path {
        GENERATE_PATH => match relay_body(config, body).await {
            Ok(response) => response,
            Err(e) if e.is_internal() => {
                error!(error = %e, "Relay request failed");
                e.into_response()
            }
            Err(e) => {
                warn!(error = %e, "Relay request rejected");
                e.into_response()
            }
        },
        _ => RelayError::RouteNotFound.into_response(),
    };
    with_cors(response, origin)
}

async fn relay_body(config: &RelayConfig, body: Body) -> Result<Response, RelayError> {
    let body_bytes = to_bytes(body, usize::MAX).await?;
    relay::forward_generate(config, body_bytes).await
}

/// Browser preflight. Echoes the caller origin when it validates, otherwise
/// the first configured origin, and advertises the relay's method/header
/// contract with a 24h cache.
fn preflight(config: &RelayConfig, origin: Option<&str>) -> Response {
    let mut response = StatusCode::NO_CONTENT.into_response();
    response.headers_mut().insert(
        header::ACCESS_CONTROL_MAX_AGE,
        HeaderValue::from_static(CORS_MAX_AGE),
    );
    with_cors(response, config.resolve_origin(origin))
}

fn with_cors(mut response: Response, origin: &str) -> Response {
    let headers = response.headers_mut();
    if let Ok(value) = HeaderValue::from_str(origin) {
        headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, value);
    }
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static(CORS_ALLOW_METHODS),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static(CORS_ALLOW_HEADERS),
    );
    response
}

fn tag_request_id(mut response: Response, request_id: Uuid) -> Response {
    if let Ok(value) = HeaderValue::from_str(&request_id.to_string()) {
        response.headers_mut().insert("x-request-id", value);
    }
    response
}
