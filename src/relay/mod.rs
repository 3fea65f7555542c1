use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use bytes::Bytes;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::{config::RelayConfig, error::RelayError};

mod client;
pub use client::CLIENT;

/// Generation parameters sent upstream when the caller supplies none.
/// Callers that do supply a `generationConfig` get it forwarded untouched.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub temperature: f64,
    pub top_k: u32,
    pub top_p: f64,
    pub max_output_tokens: u32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            temperature: 0.2,
            top_k: 40,
            top_p: 0.95,
            max_output_tokens: 2048,
        }
    }
}

/// Forwards a generate request to the Gemini API: validates the payload,
/// attaches the server-held key as a query parameter, and relays the
/// upstream result. The key never appears in the produced response.
pub async fn forward_generate(config: &RelayConfig, body: Bytes) -> Result<Response, RelayError> {
    let payload: Value = serde_json::from_slice(&body)?;

    let contents = payload
        .get("contents")
        .cloned()
        .ok_or(RelayError::MissingContents)?;

    let api_key = config
        .gemini_api_key
        .as_deref()
        .ok_or(RelayError::ApiKeyNotConfigured)?;

    // `contents` is opaque to the relay; only presence is checked.
    let generation_config = match payload.get("generationConfig") {
        Some(v) => v.clone(),
        None => serde_json::to_value(GenerationConfig::default())?,
    };
    let upstream_body = serde_json::json!({
        "contents": contents,
        "generationConfig": generation_config,
    });

    debug!(url = %config.upstream_url, "Forwarding generate request upstream");
    let response = CLIENT
        .post(&config.upstream_url)
        .query(&[("key", api_key)])
        .timeout(config.upstream_timeout)
        .json(&upstream_body)
        .send()
        .await?;

    let status = response.status();
    let data: Value = response.json().await?;

    if !status.is_success() {
        let message = data
            .get("error")
            .and_then(|e| e.get("message"))
            .and_then(Value::as_str)
            .unwrap_or("Gemini API error")
            .to_string();
        warn!(status = status.as_u16(), "Upstream returned an error");
        return Err(RelayError::Upstream { status, message });
    }

    Ok((StatusCode::OK, Json(data)).into_response())
}
