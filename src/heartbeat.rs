//! Periodic liveness log
//!
//! One `info!` line per interval so hosting logs show the process is alive,
//! plus idle-session pruning. Never touches key state.

use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::info;

use crate::telegram::BotData;

/// Sessions idle for longer than this are dropped on the next tick.
const SESSION_MAX_IDLE: Duration = Duration::from_secs(24 * 60 * 60);

/// Run the heartbeat loop until the process exits.
pub async fn run(data: Arc<BotData>, interval: Duration) {
    let started = Instant::now();
    let mut ticker = tokio::time::interval(interval);
    // First tick fires immediately; skip it so the startup banner stands alone.
    ticker.tick().await;

    loop {
        ticker.tick().await;

        let pruned = data.sessions.prune_idle(SESSION_MAX_IDLE).await;
        if pruned > 0 {
            info!("Pruned {} idle session(s)", pruned);
        }

        info!(
            "Heartbeat: alive {}s, {} session(s), {} key(s), cursor at {}",
            started.elapsed().as_secs(),
            data.sessions.len().await,
            data.rotator.key_count().await,
            data.rotator.position().await,
        );
    }
}
