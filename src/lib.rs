//! Stateless relay between the marketing site's estimate demos and the
//! Gemini API. Validates the caller origin, injects the server-held API key,
//! and forwards the generate call, relaying the upstream result.

use std::sync::Arc;

use axum::Router;

pub mod config;
pub mod error;
pub mod handlers;
pub mod relay;

use config::RelayConfig;

/// Builds the relay router. All traffic funnels through the fallback
/// handler, which owns method, origin, and path dispatch.
pub fn app(config: Arc<RelayConfig>) -> Router {
    Router::new()
        .fallback(handlers::relay_request)
        .with_state(config)
}
