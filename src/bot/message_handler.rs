//! Message Handler module for processing incoming Telegram messages

use anyhow::Result;
use std::sync::Arc;
use teloxide::prelude::*;
use tracing::debug;

// Import localization
use crate::localization::t;

use super::dialogue_manager::{DialogueManager, KeyboardHint};
use super::ui_builder::create_keyboard;

async fn handle_text_message(
    bot: &Bot,
    msg: &Message,
    text: &str,
    manager: &DialogueManager,
) -> Result<()> {
    debug!(user_id = %msg.chat.id, message_length = text.len(), "Received text message from user");

    let reply = manager.handle_message(msg.chat.id, text).await;
    bot.send_message(msg.chat.id, reply.text)
        .reply_markup(create_keyboard(reply.keyboard))
        .await?;
    Ok(())
}

async fn handle_unsupported_message(bot: &Bot, msg: &Message) -> Result<()> {
    debug!(user_id = %msg.chat.id, "Received unsupported message type from user");

    bot.send_message(msg.chat.id, t("unsupported-message"))
        .reply_markup(create_keyboard(KeyboardHint::MainMenu))
        .await?;
    Ok(())
}

pub async fn message_handler(bot: Bot, msg: Message, manager: Arc<DialogueManager>) -> Result<()> {
    if let Some(text) = msg.text() {
        handle_text_message(&bot, &msg, text, &manager).await?;
    } else {
        handle_unsupported_message(&bot, &msg).await?;
    }

    Ok(())
}
