//! Error taxonomy for the bridge.
//!
//! `GeminiError` classifies a single upstream call; `BridgeError` is what the
//! rotation policy reports to the message handler. Nothing here is
//! process-fatal: every variant ends up as a user-visible reply.

use thiserror::Error;

/// Failure of one Gemini API call.
///
/// Classification happens at the client boundary so the rotation policy only
/// has to distinguish "rate limited" from everything else.
#[derive(Debug, Error)]
pub enum GeminiError {
    /// The service signaled quota exhaustion (HTTP 429 or a
    /// RESOURCE_EXHAUSTED error body). Recoverable by key rotation.
    #[error("rate limited")]
    RateLimited,

    /// Any non-429 error response from the API.
    #[error("Gemini API error {status}: {message}")]
    Api { status: u16, message: String },

    /// Transport-level failure (DNS, TLS, timeout, malformed body).
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
}

/// Outcome of a full rotation pass over the key pool.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BridgeError {
    /// The key pool is empty; no request was attempted.
    #[error("no Gemini API keys configured")]
    NoKeysConfigured,

    /// Every key in the pool was rate limited in a single pass.
    #[error("all Gemini API keys are rate limited")]
    AllKeysExhausted,

    /// A non-rate-limit upstream failure. Not retried across keys.
    #[error("upstream error: {0}")]
    Upstream(String),
}

impl BridgeError {
    /// Reply text shown in the chat for this failure.
    pub fn user_message(&self) -> String {
        match self {
            Self::NoKeysConfigured => {
                "AI is not configured on this deployment (no API keys set).".to_string()
            }
            Self::AllKeysExhausted => {
                "All API keys are rate limited right now. Try again in a minute.".to_string()
            }
            Self::Upstream(detail) => format!("AI error: {detail}"),
        }
    }
}
