//! API key pool and rate-limit rotation
//!
//! One process-wide cursor over the configured keys. A rate-limited key
//! advances the cursor, so the next caller starts from wherever the last
//! rotation landed and an exhausted key stays skipped until it comes back
//! around the ring.

use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::warn;

use crate::error::{BridgeError, GeminiError};
use crate::gemini::TextGenerator;

/// Ordered credentials plus the shared rotation cursor.
pub struct KeyPool {
    keys: Vec<String>,
    index: usize,
}

impl KeyPool {
    /// Blank and whitespace-only entries are dropped. The cursor starts at 0.
    pub fn new(keys: Vec<String>) -> Self {
        let keys = keys
            .into_iter()
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .collect();
        Self { keys, index: 0 }
    }

    /// Parse a comma-separated key list, as configured in the environment.
    pub fn from_list(raw: &str) -> Self {
        Self::new(raw.split(',').map(str::to_string).collect())
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Current cursor position. Always `< len()` when the pool is non-empty.
    pub fn position(&self) -> usize {
        self.index
    }

    fn current(&self) -> &str {
        &self.keys[self.index]
    }

    fn advance(&mut self) {
        self.index = (self.index + 1) % self.keys.len();
    }
}

/// Rate-limit rotation policy over the shared pool.
pub struct Rotator {
    pool: Mutex<KeyPool>,
    generator: Arc<dyn TextGenerator>,
}

impl Rotator {
    pub fn new(pool: KeyPool, generator: Arc<dyn TextGenerator>) -> Self {
        Self {
            pool: Mutex::new(pool),
            generator,
        }
    }

    pub async fn key_count(&self) -> usize {
        self.pool.lock().await.len()
    }

    /// Cursor position, exposed for the heartbeat log and tests.
    pub async fn position(&self) -> usize {
        self.pool.lock().await.position()
    }

    /// Generate a completion, trying each key at most once.
    ///
    /// Starts from the shared cursor. A rate-limited key advances the cursor
    /// and the next key is tried; after a full unsuccessful pass the cursor
    /// is back where it started. On success the cursor stays on the key that
    /// answered. Non-rate-limit failures are returned immediately without
    /// trying other keys, so genuine request or service errors are not
    /// masked by rotation.
    pub async fn respond(&self, prompt: &str) -> Result<String, BridgeError> {
        let max_attempts = {
            let pool = self.pool.lock().await;
            if pool.is_empty() {
                return Err(BridgeError::NoKeysConfigured);
            }
            pool.len()
        };

        let mut attempts = 0;
        while attempts < max_attempts {
            let key = self.pool.lock().await.current().to_string();

            match self.generator.generate(&key, prompt).await {
                Ok(text) => return Ok(text),
                Err(GeminiError::RateLimited) => {
                    attempts += 1;
                    let mut pool = self.pool.lock().await;
                    warn!(
                        "Key #{} rate limited, rotating (attempt {}/{})",
                        pool.position(),
                        attempts,
                        max_attempts
                    );
                    pool.advance();
                }
                Err(err) => return Err(BridgeError::Upstream(err.to_string())),
            }
        }

        Err(BridgeError::AllKeysExhausted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_entries_are_filtered() {
        let pool = KeyPool::new(vec![
            "k1".to_string(),
            "  ".to_string(),
            String::new(),
            " k2 ".to_string(),
        ]);
        assert_eq!(pool.len(), 2);
    }

    #[test]
    fn list_parsing_filters_blanks() {
        let pool = KeyPool::from_list("k1, ,k2,,  k3  ");
        assert_eq!(pool.len(), 3);
        assert_eq!(pool.position(), 0);
    }

    #[test]
    fn empty_list_gives_empty_pool() {
        assert!(KeyPool::from_list("").is_empty());
        assert!(KeyPool::from_list(" , , ").is_empty());
    }

    #[test]
    fn advance_wraps_around() {
        let mut pool = KeyPool::from_list("a,b,c");
        pool.advance();
        pool.advance();
        assert_eq!(pool.position(), 2);
        pool.advance();
        assert_eq!(pool.position(), 0);
    }
}
