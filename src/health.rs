//! Health-check listener
//!
//! Single-route axum server answering platform health probes. Fully
//! decoupled from message processing; shares no state with the bot.

use anyhow::Result;
use axum::{routing::get, Router};
use std::net::SocketAddr;
use tower_http::trace::TraceLayer;
use tracing::info;

const HEALTH_BODY: &str = "Bot is running!";

async fn root() -> &'static str {
    HEALTH_BODY
}

/// Build the router. `GET /` is the only route.
pub fn router() -> Router {
    Router::new()
        .route("/", get(root))
        .layer(TraceLayer::new_for_http())
}

/// Bind and serve until the process exits.
pub async fn run(port: u16) -> Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!("Health listener on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router()).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn body_text() {
        let body = tokio_test::block_on(root());
        assert_eq!(body, "Bot is running!");
    }
}
