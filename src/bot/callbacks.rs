use std::sync::Arc;
use teloxide::prelude::*;

use crate::bot::{outbound, AppState, HandlerResult};
use crate::conversation::Event;

pub async fn handle_callback(bot: Bot, q: CallbackQuery, state: Arc<AppState>) -> HandlerResult {
    let user_id = q.from.id.0 as i64;
    let chat_id = q
        .message
        .as_ref()
        .map(|m| m.chat().id)
        .unwrap_or(ChatId(user_id));

    let replies = match q.data.as_deref() {
        Some(data) => {
            tracing::debug!(user_id, data, "Callback received");
            state
                .conversation
                .handle(user_id, Event::Callback(data.to_string()))
                .await
        }
        // Game callbacks carry no data; just stop the spinner.
        None => Vec::new(),
    };

    outbound::deliver(&bot, chat_id, Some(q.id.as_str()), replies).await;
    Ok(())
}
