//! Per-user chat state
//!
//! Tracks the AI-mode flag and the message ids the bot has touched in each
//! chat, so a later "clear" can delete them. Nothing is persisted; a restart
//! starts everyone over in bridge mode.

use std::collections::HashMap;
use std::time::{Duration, Instant};
use teloxide::types::MessageId;
use tokio::sync::RwLock;

/// State tracked for one user.
#[derive(Debug, Clone)]
pub struct Session {
    pub ai_active: bool,
    pub message_ids: Vec<MessageId>,
    last_seen: Instant,
}

impl Session {
    fn new() -> Self {
        Self {
            ai_active: false,
            message_ids: Vec::new(),
            last_seen: Instant::now(),
        }
    }

    fn touch(&mut self) {
        self.last_seen = Instant::now();
    }
}

/// In-memory session store keyed by Telegram user id.
///
/// Sessions are created lazily on first touch. `prune_idle` keeps the map
/// bounded even though the expected user count is one.
pub struct SessionStore {
    sessions: RwLock<HashMap<i64, Session>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Record a message id as eligible for a later bulk delete.
    pub async fn record(&self, user_id: i64, message_id: MessageId) {
        let mut sessions = self.sessions.write().await;
        let session = sessions.entry(user_id).or_insert_with(Session::new);
        session.touch();
        session.message_ids.push(message_id);
    }

    pub async fn set_ai(&self, user_id: i64, active: bool) {
        let mut sessions = self.sessions.write().await;
        let session = sessions.entry(user_id).or_insert_with(Session::new);
        session.touch();
        session.ai_active = active;
    }

    pub async fn ai_active(&self, user_id: i64) -> bool {
        let sessions = self.sessions.read().await;
        sessions.get(&user_id).map(|s| s.ai_active).unwrap_or(false)
    }

    /// Take all recorded ids for a user, leaving the list empty.
    pub async fn drain_ids(&self, user_id: i64) -> Vec<MessageId> {
        let mut sessions = self.sessions.write().await;
        match sessions.get_mut(&user_id) {
            Some(session) => {
                session.touch();
                std::mem::take(&mut session.message_ids)
            }
            None => Vec::new(),
        }
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Drop sessions idle for longer than `max_idle`. Returns how many were
    /// removed.
    pub async fn prune_idle(&self, max_idle: Duration) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, s| s.last_seen.elapsed() < max_idle);
        before - sessions.len()
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}
