use std::{env, time::Duration};

use dotenv::dotenv;
use tracing::warn;

/// Generate endpoint of the Gemini API. Overridable through `GEMINI_API_URL`
/// for tests and alternate deployments.
pub const DEFAULT_UPSTREAM_URL: &str =
    "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.0-flash:generateContent";

const DEFAULT_UPSTREAM_TIMEOUT_SECS: u64 = 30;

/// Process-wide relay configuration, read once at startup and shared
/// immutably across requests.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    pub port: u16,
    pub host: String,
    /// Origin prefixes allowed to call the relay. Never empty.
    pub allowed_origins: Vec<String>,
    /// Absence is a per-request 500, not a startup failure: the process must
    /// come up so the misconfiguration is observable over HTTP.
    pub gemini_api_key: Option<String>,
    pub upstream_url: String,
    pub upstream_timeout: Duration,
}

impl RelayConfig {
    pub fn from_env() -> Self {
        dotenv().ok();

        let raw_origins = env::var("ALLOWED_ORIGINS").expect("ALLOWED_ORIGINS must be set");
        let allowed_origins: Vec<String> = raw_origins
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect();
        assert!(
            !allowed_origins.is_empty(),
            "ALLOWED_ORIGINS must list at least one origin"
        );

        let gemini_api_key = env::var("GEMINI_API_KEY").ok().filter(|k| !k.is_empty());
        if gemini_api_key.is_none() {
            warn!("GEMINI_API_KEY not set, generate requests will be rejected with 500");
        }

        Self {
            port: env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .expect("PORT must be a number"),
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            allowed_origins,
            gemini_api_key,
            upstream_url: env::var("GEMINI_API_URL")
                .unwrap_or_else(|_| DEFAULT_UPSTREAM_URL.to_string()),
            upstream_timeout: Duration::from_secs(
                env::var("UPSTREAM_TIMEOUT_SECS")
                    .unwrap_or_else(|_| DEFAULT_UPSTREAM_TIMEOUT_SECS.to_string())
                    .parse()
                    .expect("UPSTREAM_TIMEOUT_SECS must be a number"),
            ),
        }
    }

    /// Prefix match against the configured allow-list. Trailing path
    /// segments on the caller origin are tolerated.
    pub fn is_allowed_origin(&self, origin: &str) -> bool {
        self.allowed_origins
            .iter()
            .any(|allowed| origin.starts_with(allowed.as_str()))
    }

    /// Origin echoed in CORS headers when the caller's origin did not
    /// validate (absent, or preflight from an unknown origin).
    pub fn fallback_origin(&self) -> &str {
        &self.allowed_origins[0]
    }

    /// The validated caller origin, or the first configured origin when
    /// validation did not pass.
    pub fn resolve_origin<'a>(&'a self, origin: Option<&'a str>) -> &'a str {
        match origin {
            Some(o) if self.is_allowed_origin(o) => o,
            _ => self.fallback_origin(),
        }
    }
}
