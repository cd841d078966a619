//! Per-user conversation state machine.
//!
//! Transport-independent: the bot layer turns Telegram updates into
//! [`Event`]s and renders the returned [`Reply`] list. Every event for one
//! user is handled under that user's session lock, so a user's events are
//! applied strictly in order while different users proceed concurrently.
//! User state is written back only when handling succeeds.

pub mod action;
mod admin;
mod assist;
mod browse;
pub mod event;
pub mod keyboards;
pub mod pager;

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::access::AccessPolicy;
use crate::ai::ContentGenerator;
use crate::content::ContentStore;
use crate::licensing::LicenseVerifier;
use crate::menu;
use crate::users::{StateTag, UserRepository, UserState};
use action::Action;
pub use event::{Button, Command, Event, Keyboard, Reply};

pub struct Conversation {
    content: Arc<ContentStore>,
    users: Arc<dyn UserRepository>,
    policy: AccessPolicy,
    licenses: Arc<dyn LicenseVerifier>,
    generator: Arc<dyn ContentGenerator>,
    admin_ids: HashSet<i64>,
    sessions: Mutex<HashMap<i64, Arc<Mutex<()>>>>,
}

impl Conversation {
    pub fn new(
        content: Arc<ContentStore>,
        users: Arc<dyn UserRepository>,
        policy: AccessPolicy,
        licenses: Arc<dyn LicenseVerifier>,
        generator: Arc<dyn ContentGenerator>,
        admin_ids: impl IntoIterator<Item = i64>,
    ) -> Self {
        Self {
            content,
            users,
            policy,
            licenses,
            generator,
            admin_ids: admin_ids.into_iter().collect(),
            sessions: Mutex::new(HashMap::new()),
        }
    }

    pub fn content(&self) -> &ContentStore {
        &self.content
    }

    pub fn is_admin(&self, user_id: i64) -> bool {
        self.admin_ids.contains(&user_id)
    }

    /// Handle one event. Never fails: errors become a generic apology and
    /// leave the stored user state as it was.
    pub async fn handle(&self, user_id: i64, event: Event) -> Vec<Reply> {
        let session = self.session(user_id).await;
        let turn = session.lock().await;

        let replies = match self.dispatch(user_id, &event).await {
            Ok(replies) => replies,
            Err(e) => {
                tracing::error!(user_id, event = ?event, "Handler failed: {:#}", e);
                vec![Reply::text(menu::GENERIC_ERROR)]
            }
        };

        drop(turn);
        self.release_session(user_id, &session).await;
        replies
    }

    async fn session(&self, user_id: i64) -> Arc<Mutex<()>> {
        let mut sessions = self.sessions.lock().await;
        sessions
            .entry(user_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Forget the lock once no other turn for this user holds or awaits it.
    async fn release_session(&self, user_id: i64, session: &Arc<Mutex<()>>) {
        let mut sessions = self.sessions.lock().await;
        // One reference in the map, one held by the caller.
        if Arc::strong_count(session) == 2 {
            sessions.remove(&user_id);
        }
    }

    #[cfg(test)]
    async fn open_sessions(&self) -> usize {
        self.sessions.lock().await.len()
    }

    async fn dispatch(&self, user_id: i64, event: &Event) -> anyhow::Result<Vec<Reply>> {
        let mut user = self.users.load(user_id).await?;
        let mut out = Vec::new();

        // An admin removed from the allowlist mid-flow falls back to Idle.
        if user.state().is_admin_flow() && !self.is_admin(user_id) {
            user.reset();
        }

        match event {
            Event::Command(command) => self.on_command(&mut user, *command, &mut out),
            Event::Callback(data) => self.on_callback(&mut user, data, &mut out).await,
            Event::Text(text) => self.on_text(&mut user, text.trim(), &mut out).await,
            Event::Media(media) => self.on_media(&mut user, media.clone(), &mut out),
        }

        self.users.save(&user).await?;
        Ok(out)
    }

    fn on_command(&self, user: &mut UserState, command: Command, out: &mut Vec<Reply>) {
        match command {
            Command::Start => {
                user.reset();
                out.push(main_menu());
            }
            Command::Help => out.push(Reply::text(menu::HELP)),
            Command::Admin => self.open_admin(user, out),
            Command::Cancel => {
                if user.state().is_admin_flow() {
                    self.cancel_admin(user, out);
                } else {
                    user.reset();
                    out.push(main_menu());
                }
            }
        }
    }

    async fn on_callback(&self, user: &mut UserState, data: &str, out: &mut Vec<Reply>) {
        match Action::parse(data) {
            Some(Action::User(action)) => self.on_user_action(user, action, out).await,
            Some(Action::Admin(action)) => self.on_admin_action(user, action, out).await,
            None => {
                tracing::debug!(user_id = user.user_id, data, "Unknown callback");
                out.push(Reply::alert(menu::NOT_AVAILABLE));
            }
        }
    }

    async fn on_text(&self, user: &mut UserState, text: &str, out: &mut Vec<Reply>) {
        if text.eq_ignore_ascii_case("!admin") {
            return self.open_admin(user, out);
        }

        match user.state() {
            StateTag::Idle => out.push(main_menu()),
            StateTag::AwaitingLicense => self.submit_license(user, text, out).await,
            StateTag::AwaitingTopic => self.write_hooks(user, text, out).await,
            StateTag::Chatting => self.answer_question(user, text, out).await,
            StateTag::AdminAwaitingSection => self.admin_section_text(user, text, out),
            StateTag::AdminAwaitingContent => self.admin_receive_text(user, text, out),
            StateTag::AdminAwaitingMediaChoice => self.admin_media_choice(user, text, out).await,
            StateTag::AdminAwaitingMedia => {
                out.push(Reply::with_keyboard(menu::ADMIN_ASK_MEDIA, keyboards::admin_cancel()))
            }
            StateTag::AdminAwaitingSaveConfirmation => {
                self.admin_save_confirmation(user, text, out).await
            }
            StateTag::AdminAwaitingEditId => self.admin_edit_target(user, text, out).await,
            StateTag::AdminAwaitingEditText => self.admin_apply_edit(user, text, out).await,
            StateTag::AdminAwaitingDeleteId => self.admin_delete(user, text, out).await,
        }
    }
}

fn main_menu() -> Reply {
    Reply::with_keyboard(menu::WELCOME, keyboards::main_menu())
}
