//! Configuration management

use anyhow::{Context, Result};

const DEFAULT_AUTHORIZED_USER: i64 = 6373322579;
const DEFAULT_PORT: u16 = 10000;
const DEFAULT_MODEL: &str = "gemini-2.0-flash";
const DEFAULT_HEARTBEAT_SECS: u64 = 60;

/// Bot configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Telegram bot token (required)
    pub telegram_token: String,

    /// The single user id allowed to talk to the bot
    pub authorized_user_id: i64,

    /// Gemini API keys, in rotation order. Empty means AI replies are
    /// disabled and the bot runs in bridge-only mode.
    pub gemini_api_keys: Vec<String>,

    /// Port for the health-check listener
    pub listen_port: u16,

    /// Gemini model name
    pub gemini_model: String,

    /// Heartbeat log interval in seconds
    pub heartbeat_secs: u64,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Only `TELEGRAM_TOKEN` is required; everything else has a default.
    pub fn from_env() -> Result<Self> {
        let telegram_token =
            std::env::var("TELEGRAM_TOKEN").context("TELEGRAM_TOKEN must be set")?;

        let authorized_user_id = std::env::var("AUTHORIZED_USER_ID")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_AUTHORIZED_USER);

        // GEMINI_API_KEYS is the comma-separated list; GEMINI_API_KEY is the
        // older single-key variable and still works as a fallback.
        let raw_keys = std::env::var("GEMINI_API_KEYS")
            .or_else(|_| std::env::var("GEMINI_API_KEY"))
            .unwrap_or_default();
        let gemini_api_keys = parse_key_list(&raw_keys);

        let listen_port = std::env::var("PORT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_PORT);

        let gemini_model =
            std::env::var("GEMINI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());

        let heartbeat_secs = std::env::var("HEARTBEAT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_HEARTBEAT_SECS);

        Ok(Self {
            telegram_token,
            authorized_user_id,
            gemini_api_keys,
            listen_port,
            gemini_model,
            heartbeat_secs,
        })
    }
}

/// Split a comma-separated key list, dropping blank entries.
pub fn parse_key_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|k| k.trim().to_string())
        .filter(|k| !k.is_empty())
        .collect()
}
