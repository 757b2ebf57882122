//! Telegram bridge for the bot
//!
//! Receives text messages from the single authorized user and dispatches
//! them: literal commands toggle AI mode or clear the chat, everything else
//! is either forwarded to Gemini (AI mode) or echoed back (bridge mode).
//!
//! Uses explicit Dispatcher pattern for reliable message polling.

use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;
use teloxide::{
    dispatching::UpdateFilterExt,
    dptree,
    error_handlers::LoggingErrorHandler,
    prelude::*,
    types::{ChatAction, MessageId, Update},
};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::keypool::Rotator;
use crate::session::SessionStore;

const HELP_TEXT: &str = "Cloud Bridge\n\n\
    Commands:\n\
    - start ai / stop ai - toggle Gemini replies\n\
    - clear - wipe chat history";

const BRIDGE_PREFIX: &str = "Bridge: ";

/// Telegram message size limit is 4096; leave headroom for safety.
const MAX_CHUNK: usize = 4000;

/// Shared state for the message handlers.
pub struct BotData {
    pub authorized_user: i64,
    pub sessions: SessionStore,
    pub rotator: Arc<Rotator>,
}

impl BotData {
    pub fn is_authorized(&self, user_id: i64) -> bool {
        user_id == self.authorized_user
    }
}

/// Seam between the clear command and the Telegram delete call.
#[async_trait]
pub trait MessageCleaner: Send + Sync {
    /// Delete one message from the chat transcript.
    async fn delete(&self, chat_id: ChatId, message_id: MessageId) -> Result<()>;
}

#[async_trait]
impl MessageCleaner for Bot {
    async fn delete(&self, chat_id: ChatId, message_id: MessageId) -> Result<()> {
        self.delete_message(chat_id, message_id).await?;
        Ok(())
    }
}

/// Literal commands, matched case-insensitively after trimming.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BotCommand {
    Help,
    Clear,
    StartAi,
    StopAi,
    /// Anything else: forwarded or echoed verbatim.
    Text(String),
}

/// Map message text to a command. Matching is exact-phrase only, no
/// argument parsing.
pub fn parse_command(text: &str) -> BotCommand {
    match text.trim().to_lowercase().as_str() {
        "/start" => BotCommand::Help,
        "clear" => BotCommand::Clear,
        "start ai" => BotCommand::StartAi,
        "stop ai" => BotCommand::StopAi,
        _ => BotCommand::Text(text.to_string()),
    }
}

/// Split a reply into Telegram-sized chunks on char boundaries.
pub fn chunk_message(text: &str) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut remaining = text;
    while !remaining.is_empty() {
        let split_at = remaining
            .char_indices()
            .take_while(|(i, _)| *i < MAX_CHUNK)
            .last()
            .map(|(i, c)| i + c.len_utf8())
            .unwrap_or(remaining.len());
        let (chunk, rest) = remaining.split_at(split_at);
        chunks.push(chunk.to_string());
        remaining = rest;
    }
    chunks
}

/// Run the bot with explicit Dispatcher for reliable polling. Blocks until
/// the dispatcher stops.
pub async fn run_bot(config: &Config, data: Arc<BotData>) -> Result<()> {
    let bot = Bot::new(&config.telegram_token);

    // Verify bot token by calling getMe
    info!("Verifying bot token...");
    match bot.get_me().await {
        Ok(me) => {
            info!(
                "Bot authenticated: @{} (ID: {})",
                me.username.as_deref().unwrap_or("unknown"),
                me.id
            );
        }
        Err(e) => {
            anyhow::bail!("Bot authentication failed: {}", e);
        }
    }

    // Delete any existing webhook to ensure polling works
    if let Err(e) = bot.delete_webhook().await {
        warn!("Failed to delete webhook: {} (continuing anyway)", e);
    }

    // Startup notification to the authorized user (crash/restart feedback)
    let startup_msg = format!(
        "Bot started at {} UTC.\nIf you see this unexpectedly, the bot may have crashed and restarted.",
        chrono::Utc::now().format("%Y-%m-%d %H:%M:%S")
    );
    match bot
        .send_message(ChatId(data.authorized_user), startup_msg)
        .await
    {
        Ok(sent) => data.sessions.record(data.authorized_user, sent.id).await,
        Err(e) => warn!(
            "Failed to send startup notification to {}: {}",
            data.authorized_user, e
        ),
    }

    let handler = dptree::entry().branch(Update::filter_message().endpoint(message_handler));

    info!("Starting dispatcher with long polling...");
    info!("Bot is now LIVE - send a message!");

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![data])
        .default_handler(|upd| async move {
            debug!("Unhandled update: {:?}", upd);
        })
        .error_handler(LoggingErrorHandler::with_custom_text(
            "Error in message handler",
        ))
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    warn!("Dispatcher stopped");
    Ok(())
}

/// Message handler endpoint for the dispatcher
async fn message_handler(bot: Bot, msg: Message, data: Arc<BotData>) -> ResponseResult<()> {
    if let Err(e) = handle_message(&bot, &msg, &data).await {
        tracing::error!("Error handling message: {}", e);
    }
    Ok(())
}

async fn handle_message(bot: &Bot, msg: &Message, data: &BotData) -> Result<()> {
    let user_id = msg.from.as_ref().map(|u| u.id.0 as i64).unwrap_or(0);
    let chat_id = msg.chat.id;

    let Some(text) = msg.text() else {
        return Ok(());
    };

    // Single-tenant guard: anyone else is ignored outright, no reply and no
    // state touched.
    if !data.is_authorized(user_id) {
        debug!("Ignoring message from unauthorized user {}", user_id);
        return Ok(());
    }

    info!(
        ">>> Message: user={}, chat={}, text={:?}",
        user_id,
        chat_id,
        text.chars().take(50).collect::<String>()
    );

    data.sessions.record(user_id, msg.id).await;

    match parse_command(text) {
        BotCommand::Help => {
            let sent = bot.send_message(chat_id, HELP_TEXT).await?;
            data.sessions.record(user_id, sent.id).await;
        }

        BotCommand::Clear => {
            let status = bot.send_message(chat_id, "Cleaning chat history...").await?;
            let ids = data.sessions.drain_ids(user_id).await;
            clear_messages(bot, chat_id, &ids).await;
            // Recorded after the sweep so it survives this clear but is
            // caught by the next one.
            data.sessions.record(user_id, status.id).await;
        }

        BotCommand::StartAi => {
            data.sessions.set_ai(user_id, true).await;
            let sent = bot.send_message(chat_id, "AI activated.").await?;
            data.sessions.record(user_id, sent.id).await;
        }

        BotCommand::StopAi => {
            data.sessions.set_ai(user_id, false).await;
            let sent = bot.send_message(chat_id, "AI deactivated.").await?;
            data.sessions.record(user_id, sent.id).await;
        }

        BotCommand::Text(prompt) => {
            if data.sessions.ai_active(user_id).await {
                bot.send_chat_action(chat_id, ChatAction::Typing).await?;
                let reply = match data.rotator.respond(&prompt).await {
                    Ok(text) => text,
                    Err(err) => err.user_message(),
                };
                send_recorded(bot, chat_id, user_id, data, &reply).await?;
            } else {
                info!("Bridge: {}", prompt);
                let echo = format!("{}{}", BRIDGE_PREFIX, prompt);
                send_recorded(bot, chat_id, user_id, data, &echo).await?;
            }
        }
    }

    Ok(())
}

/// Send a reply (chunked if needed) and record every sent id.
async fn send_recorded(
    bot: &Bot,
    chat_id: ChatId,
    user_id: i64,
    data: &BotData,
    text: &str,
) -> Result<()> {
    for chunk in chunk_message(text) {
        let sent = bot.send_message(chat_id, chunk).await?;
        data.sessions.record(user_id, sent.id).await;
    }
    Ok(())
}

/// Best-effort bulk delete. Individual failures are collected and logged
/// once; they never abort the remaining deletions. Returns how many
/// deletions failed.
pub async fn clear_messages(
    cleaner: &dyn MessageCleaner,
    chat_id: ChatId,
    ids: &[MessageId],
) -> usize {
    let mut failed = 0usize;
    for id in ids {
        if cleaner.delete(chat_id, *id).await.is_err() {
            failed += 1;
        }
    }
    if failed > 0 {
        warn!(
            "Cleared chat {}: {} of {} deletions failed (messages may be too old)",
            chat_id,
            failed,
            ids.len()
        );
    } else {
        info!("Cleared chat {}: {} message(s) deleted", chat_id, ids.len());
    }
    failed
}
