//! Chat Cleanup Integration Tests
//!
//! Best-effort bulk delete against a scripted cleaner: a failing deletion
//! must not stop the sweep, and the recorded-id list ends empty regardless.

use anyhow::Result;
use async_trait::async_trait;
use std::sync::Mutex;
use teloxide::types::{ChatId, MessageId};

use bridgebot::telegram::{clear_messages, MessageCleaner};
use bridgebot::SessionStore;

/// Cleaner that fails on scripted ids and records every attempt.
struct FlakyCleaner {
    fail_on: Vec<MessageId>,
    attempts: Mutex<Vec<MessageId>>,
}

impl FlakyCleaner {
    fn new(fail_on: &[i32]) -> Self {
        Self {
            fail_on: fail_on.iter().map(|id| MessageId(*id)).collect(),
            attempts: Mutex::new(Vec::new()),
        }
    }

    fn attempts(&self) -> Vec<MessageId> {
        self.attempts.lock().unwrap().clone()
    }
}

#[async_trait]
impl MessageCleaner for FlakyCleaner {
    async fn delete(&self, _chat_id: ChatId, message_id: MessageId) -> Result<()> {
        self.attempts.lock().unwrap().push(message_id);
        if self.fail_on.contains(&message_id) {
            anyhow::bail!("message to delete not found");
        }
        Ok(())
    }
}

#[tokio::test]
async fn failed_delete_does_not_stop_the_sweep() {
    let cleaner = FlakyCleaner::new(&[2]);
    let ids = vec![MessageId(1), MessageId(2), MessageId(3)];

    let failed = clear_messages(&cleaner, ChatId(10), &ids).await;

    // Deletion was attempted for 1, 2, AND 3
    assert_eq!(cleaner.attempts(), ids);
    assert_eq!(failed, 1);
}

#[tokio::test]
async fn all_failures_are_counted_not_propagated() {
    let cleaner = FlakyCleaner::new(&[1, 2, 3]);
    let ids = vec![MessageId(1), MessageId(2), MessageId(3)];

    let failed = clear_messages(&cleaner, ChatId(10), &ids).await;

    assert_eq!(cleaner.attempts(), ids);
    assert_eq!(failed, 3);
}

#[tokio::test]
async fn recorded_ids_end_empty_even_when_deletions_fail() {
    let store = SessionStore::new();
    store.record(42, MessageId(1)).await;
    store.record(42, MessageId(2)).await;
    store.record(42, MessageId(3)).await;

    let cleaner = FlakyCleaner::new(&[2]);
    let ids = store.drain_ids(42).await;
    clear_messages(&cleaner, ChatId(10), &ids).await;

    assert_eq!(cleaner.attempts().len(), 3);
    // The list is empty regardless of the failure
    assert!(store.drain_ids(42).await.is_empty());
}

#[tokio::test]
async fn empty_id_list_is_a_no_op() {
    let cleaner = FlakyCleaner::new(&[]);
    let failed = clear_messages(&cleaner, ChatId(10), &[]).await;
    assert_eq!(failed, 0);
    assert!(cleaner.attempts().is_empty());
}
