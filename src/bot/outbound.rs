//! Renders state-machine replies as Telegram requests.

use std::path::Path;

use teloxide::prelude::*;
use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup, InputFile};

use crate::content::models::{MediaKind, MediaRef};
use crate::conversation::{Keyboard, Reply};

/// Telegram's limit for a text message, in characters.
const TEXT_LIMIT: usize = 4096;
/// Telegram's limit for a media caption, in characters.
const CAPTION_LIMIT: usize = 1024;

/// Send every reply to `chat`. When the event came from a button,
/// `callback_id` is answered exactly once: with the first alert if there
/// is one, otherwise with an empty answer to stop the button spinner.
///
/// Send failures are logged and do not stop the remaining replies.
pub async fn deliver(bot: &Bot, chat: ChatId, callback_id: Option<&str>, replies: Vec<Reply>) {
    let mut unanswered = callback_id;

    for reply in replies {
        let result = match reply {
            Reply::Alert { text, show_alert } => match unanswered.take() {
                Some(id) => bot
                    .answer_callback_query(id)
                    .text(text)
                    .show_alert(show_alert)
                    .await
                    .map(|_| ()),
                // No button to answer; fall back to a plain message.
                None => send_text(bot, chat, &text, None).await,
            },
            Reply::Text { text, keyboard } => send_text(bot, chat, &text, keyboard.as_ref()).await,
            Reply::Media {
                media,
                caption,
                keyboard,
            } => send_media(bot, chat, &media, &caption, keyboard.as_ref()).await,
        };
        if let Err(e) = result {
            tracing::error!(chat_id = chat.0, "Failed to send reply: {}", e);
        }
    }

    if let Some(id) = unanswered {
        if let Err(e) = bot.answer_callback_query(id).await {
            tracing::warn!(chat_id = chat.0, "Failed to answer callback: {}", e);
        }
    }
}

async fn send_text(
    bot: &Bot,
    chat: ChatId,
    text: &str,
    keyboard: Option<&Keyboard>,
) -> Result<(), teloxide::RequestError> {
    let chunks = split_text(text, TEXT_LIMIT);
    let last = chunks.len().saturating_sub(1);
    for (i, chunk) in chunks.into_iter().enumerate() {
        let mut req = bot.send_message(chat, chunk);
        // The keyboard goes under the final chunk.
        if i == last {
            if let Some(keyboard) = keyboard {
                req = req.reply_markup(markup(keyboard));
            }
        }
        req.await?;
    }
    Ok(())
}

async fn send_media(
    bot: &Bot,
    chat: ChatId,
    media: &MediaRef,
    caption: &str,
    keyboard: Option<&Keyboard>,
) -> Result<(), teloxide::RequestError> {
    // A caption over the limit travels as a follow-up message instead.
    let fits = caption.chars().count() <= CAPTION_LIMIT;
    let file = input_file(media);
    let reply_markup = keyboard.filter(|_| fits).map(markup);

    match media.kind {
        MediaKind::Photo => {
            let mut req = bot.send_photo(chat, file);
            if fits {
                req = req.caption(caption);
            }
            if let Some(reply_markup) = reply_markup {
                req = req.reply_markup(reply_markup);
            }
            req.await?;
        }
        MediaKind::Video => {
            let mut req = bot.send_video(chat, file);
            if fits {
                req = req.caption(caption);
            }
            if let Some(reply_markup) = reply_markup {
                req = req.reply_markup(reply_markup);
            }
            req.await?;
        }
        MediaKind::Voice => {
            let mut req = bot.send_voice(chat, file);
            if fits {
                req = req.caption(caption);
            }
            if let Some(reply_markup) = reply_markup {
                req = req.reply_markup(reply_markup);
            }
            req.await?;
        }
        MediaKind::Document => {
            let mut req = bot.send_document(chat, file);
            if fits {
                req = req.caption(caption);
            }
            if let Some(reply_markup) = reply_markup {
                req = req.reply_markup(reply_markup);
            }
            req.await?;
        }
    }

    if !fits {
        send_text(bot, chat, caption, keyboard).await?;
    }
    Ok(())
}

/// Local files are uploaded; anything else is taken as a Telegram file id.
fn input_file(media: &MediaRef) -> InputFile {
    let path = Path::new(&media.locator);
    if path.is_file() {
        InputFile::file(path.to_path_buf())
    } else {
        InputFile::file_id(media.locator.clone())
    }
}

fn markup(keyboard: &Keyboard) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(keyboard.rows.iter().map(|row| {
        row.iter()
            .map(|b| InlineKeyboardButton::callback(b.label.clone(), b.data.clone()))
            .collect::<Vec<_>>()
    }))
}

/// Split into pieces of at most `limit` characters, breaking between lines
/// where possible.
fn split_text(text: &str, limit: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for line in text.split_inclusive('\n') {
        let line_len = line.chars().count();
        if current_len + line_len > limit && current_len > 0 {
            chunks.push(std::mem::take(&mut current));
            current_len = 0;
        }
        if line_len <= limit {
            current.push_str(line);
            current_len += line_len;
            continue;
        }
        // A single line longer than the limit is cut hard.
        for c in line.chars() {
            if current_len == limit {
                chunks.push(std::mem::take(&mut current));
                current_len = 0;
            }
            current.push(c);
            current_len += 1;
        }
    }
    if !current.is_empty() || chunks.is_empty() {
        chunks.push(current);
    }
    chunks
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversation::Button;

    #[test]
    fn short_text_is_one_chunk() {
        assert_eq!(split_text("hello", 10), vec!["hello"]);
        assert_eq!(split_text("", 10), vec![""]);
    }

    #[test]
    fn breaks_between_lines() {
        assert_eq!(split_text("aaaa\nbbbb\ncc", 10), vec!["aaaa\nbbbb\n", "cc"]);
    }

    #[test]
    fn long_text_respects_limit_on_char_boundaries() {
        let text = "سلام ".repeat(2000);
        let chunks = split_text(&text, TEXT_LIMIT);
        assert!(chunks.len() > 1);
        assert!(chunks.iter().all(|c| c.chars().count() <= TEXT_LIMIT));
        assert_eq!(chunks.concat(), text);
    }

    #[test]
    fn keyboard_rows_are_kept() {
        let keyboard = Keyboard::new(vec![
            vec![Button::new("a", "menu"), Button::new("b", "vip")],
            vec![Button::new("c", "chat")],
        ]);
        let rendered = markup(&keyboard);
        assert_eq!(rendered.inline_keyboard.len(), 2);
        assert_eq!(rendered.inline_keyboard[0].len(), 2);
    }
}
