//! License entry and the AI-backed states.

use chrono::Utc;

use super::{keyboards, main_menu, Conversation, Reply};
use crate::ai::hooks;
use crate::error::ClientError;
use crate::menu;
use crate::users::UserState;

impl Conversation {
    pub(super) async fn submit_license(&self, user: &mut UserState, code: &str, out: &mut Vec<Reply>) {
        if code.is_empty() {
            out.push(Reply::with_keyboard(menu::ASK_LICENSE, keyboards::back_to_menu()));
            return;
        }

        if self.licenses.verify(code).await {
            tracing::info!(user_id = user.user_id, "License accepted");
            user.grant_vip(code, Utc::now());
            user.reset();
            out.push(Reply::text(menu::LICENSE_OK));
            out.push(main_menu());
        } else {
            tracing::info!(user_id = user.user_id, "License rejected");
            out.push(Reply::with_keyboard(
                menu::LICENSE_INVALID,
                keyboards::back_to_menu(),
            ));
        }
    }

    pub(super) async fn write_hooks(&self, user: &UserState, topic: &str, out: &mut Vec<Reply>) {
        if topic.is_empty() {
            out.push(Reply::with_keyboard(menu::ASK_TOPIC, keyboards::back_to_menu()));
            return;
        }
        let style = hooks::random();
        tracing::debug!(user_id = user.user_id, style = style.name, "Generating hooks");

        let result = self.generator.generate(topic, style).await;
        out.push(reply_or_apology(user, result));
    }

    pub(super) async fn answer_question(
        &self,
        user: &UserState,
        question: &str,
        out: &mut Vec<Reply>,
    ) {
        if question.is_empty() {
            out.push(Reply::with_keyboard(menu::ASK_QUESTION, keyboards::back_to_menu()));
            return;
        }
        let result = self.generator.answer(question).await;
        out.push(reply_or_apology(user, result));
    }
}

/// The user stays in the same state either way so they can try again.
fn reply_or_apology(user: &UserState, result: Result<String, ClientError>) -> Reply {
    match result {
        Ok(text) => Reply::with_keyboard(text, keyboards::back_to_menu()),
        Err(e) => {
            tracing::warn!(user_id = user.user_id, "Generation failed: {}", e);
            Reply::with_keyboard(menu::GENERATION_FAILED, keyboards::back_to_menu())
        }
    }
}
