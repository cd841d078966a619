use std::sync::Arc;
use teloxide::prelude::*;
use teloxide::types::ChatAction;

use crate::bot::{outbound, AppState, HandlerResult};
use crate::content::models::{MediaKind, MediaRef};
use crate::conversation::Event;

/// Handler for every message that is not a known command.
pub async fn handle_message(bot: Bot, msg: Message, state: Arc<AppState>) -> HandlerResult {
    let Some(user) = msg.from.as_ref() else {
        return Ok(());
    };
    let user_id = user.id.0 as i64;

    let Some(event) = event_from(&msg) else {
        tracing::debug!(user_id, "Ignoring unsupported message");
        return Ok(());
    };

    if matches!(event, Event::Text(_)) {
        // Text may go to the LLM, which takes a while.
        if let Err(e) = bot.send_chat_action(msg.chat.id, ChatAction::Typing).await {
            tracing::debug!(user_id, "Chat action failed: {}", e);
        }
    }

    let replies = state.conversation.handle(user_id, event).await;
    outbound::deliver(&bot, msg.chat.id, None, replies).await;

    Ok(())
}

/// Media is passed on by Telegram file id and never downloaded.
fn event_from(msg: &Message) -> Option<Event> {
    if let Some(text) = msg.text() {
        return Some(Event::Text(text.to_string()));
    }

    let (kind, file_id) = if let Some(photos) = msg.photo() {
        // Sizes are ordered; the last one is the largest.
        (MediaKind::Photo, photos.last()?.file.id.to_string())
    } else if let Some(video) = msg.video() {
        (MediaKind::Video, video.file.id.to_string())
    } else if let Some(voice) = msg.voice() {
        (MediaKind::Voice, voice.file.id.to_string())
    } else if let Some(document) = msg.document() {
        (MediaKind::Document, document.file.id.to_string())
    } else {
        return None;
    };

    Some(Event::Media(MediaRef {
        kind,
        locator: file_id,
    }))
}
