//! bridgebot
//!
//! Telegram-to-Gemini bridge for a single authorized user.
//!
//! # Features
//!
//! - **Bridge mode**: echoes messages back (default)
//! - **AI mode**: forwards messages to the Gemini API, toggled per user
//! - **Key rotation**: rotates across API keys on rate limits
//! - **Chat cleanup**: best-effort bulk delete of recorded bot messages
//! - **Health endpoint**: `GET /` for platform probes
//! - **Heartbeat**: periodic liveness log line
//!
//! # Architecture
//!
//! ```text
//! Telegram ──► Dispatcher ──► Command Dispatch ──► Rotator ──► Gemini API
//!                                  │                  │
//!                                  └── SessionStore   └── KeyPool (shared cursor)
//!
//! side loops: axum health listener, heartbeat logger
//! ```

pub mod config;
pub mod error;
pub mod gemini;
pub mod health;
pub mod heartbeat;
pub mod keypool;
pub mod session;
pub mod telegram;


pub use config::Config;
pub use error::{BridgeError, GeminiError};
pub use gemini::{GeminiClient, TextGenerator};
pub use keypool::{KeyPool, Rotator};
pub use session::SessionStore;
