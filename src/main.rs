//! bridgebot - Entry Point
//!
//! Starts three independent loops: the health listener, the heartbeat
//! logger, and the Telegram event loop.

use bridgebot::telegram::BotData;
use bridgebot::{Config, GeminiClient, KeyPool, Rotator, SessionStore};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment
    dotenvy::dotenv().ok();

    let log_level = std::env::var("RUST_LOG")
        .map(|s| match s.to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::INFO,
        })
        .unwrap_or(Level::INFO);

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_ansi(true)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("bridgebot v{}", env!("CARGO_PKG_VERSION"));

    let config = Config::from_env()?;
    info!("Authorized user: {}", config.authorized_user_id);

    if config.gemini_api_keys.is_empty() {
        warn!("No Gemini API keys configured - AI replies disabled, bridge mode only");
    } else {
        info!(
            "{} Gemini key(s) configured, model {}",
            config.gemini_api_keys.len(),
            config.gemini_model
        );
    }

    let client = GeminiClient::new(&config.gemini_model)?;
    let pool = KeyPool::new(config.gemini_api_keys.clone());
    let rotator = Arc::new(Rotator::new(pool, Arc::new(client)));

    let data = Arc::new(BotData {
        authorized_user: config.authorized_user_id,
        sessions: SessionStore::new(),
        rotator,
    });

    // Health listener
    let port = config.listen_port;
    tokio::spawn(async move {
        if let Err(e) = bridgebot::health::run(port).await {
            tracing::error!("Health listener failed: {}", e);
        }
    });

    // Heartbeat logger
    tokio::spawn(bridgebot::heartbeat::run(
        Arc::clone(&data),
        Duration::from_secs(config.heartbeat_secs),
    ));

    // Telegram event loop (blocks until shutdown)
    bridgebot::telegram::run_bot(&config, data).await
}
