//! Menu navigation, content delivery and favorites.

use rand::seq::SliceRandom;
use rand::Rng;

use super::action::UserAction;
use super::pager::{self, Direction};
use super::{keyboards, main_menu, Conversation, Keyboard, Reply};
use crate::access::Access;
use crate::content::models::{ContentItem, MediaKind, MediaRef};
use crate::menu::{self, section_label};
use crate::users::{StateTag, UserState};

impl Conversation {
    pub(super) async fn on_user_action(
        &self,
        user: &mut UserState,
        action: UserAction,
        out: &mut Vec<Reply>,
    ) {
        // Any menu button abandons a half-finished prompt.
        if !matches!(action, UserAction::ToggleFavorite { .. }) {
            user.reset();
        }

        match action {
            UserAction::MainMenu => out.push(main_menu()),
            UserAction::TemplateMenu => out.push(Reply::with_keyboard(
                section_label("template"),
                keyboards::template_menu(),
            )),
            UserAction::Section(section) => self.open_section(user, &section, out).await,
            UserAction::Next => self.turn_page(user, Direction::Forward, out).await,
            UserAction::Prev => self.turn_page(user, Direction::Backward, out).await,
            UserAction::RandomIdea => self.random_idea(user, out).await,
            UserAction::Tutorial(section) => self.tutorial(user, &section, out).await,
            UserAction::AllFiles => self.all_files(user, out),
            UserAction::Vip => {
                if user.is_vip() {
                    out.push(Reply::with_keyboard(
                        menu::ALREADY_SUBSCRIBED,
                        keyboards::back_to_menu(),
                    ));
                } else {
                    ask_license(user, out);
                }
            }
            UserAction::Favorites => self.list_favorites(user, out).await,
            UserAction::ToggleFavorite { section, id } => {
                self.toggle_favorite(user, &section, &id, out).await
            }
            UserAction::EnterLicense => ask_license(user, out),
            UserAction::Chat => {
                require_license(user, StateTag::Chatting, menu::ASK_QUESTION, out)
            }
            UserAction::Generate => {
                require_license(user, StateTag::AwaitingTopic, menu::ASK_TOPIC, out)
            }
        }
    }

    fn check(&self, user: &UserState, section: &str, out: &mut Vec<Reply>) -> bool {
        match self.policy.can_access(user, section) {
            Access::Allowed => true,
            Access::Denied(reason) => {
                tracing::debug!(user_id = user.user_id, section, ?reason, "Access denied");
                out.push(Reply::alert(reason.message()));
                false
            }
        }
    }

    async fn open_section(&self, user: &mut UserState, section: &str, out: &mut Vec<Reply>) {
        if !menu::CONTENT_SECTIONS.contains(&section) {
            out.push(Reply::alert(menu::NOT_AVAILABLE));
            return;
        }
        if !self.check(user, section, out) {
            return;
        }
        let size = self.content.size(section).await;
        let Some(index) = pager::wrap(user.current_index(section), size) else {
            out.push(Reply::alert(menu::NO_CONTENT));
            return;
        };
        self.deliver(user, section, index, size, out).await;
    }

    async fn turn_page(&self, user: &mut UserState, direction: Direction, out: &mut Vec<Reply>) {
        let Some(section) = user.current_section().map(str::to_string) else {
            out.push(Reply::alert(menu::PICK_SECTION_FIRST));
            return;
        };
        if !self.check(user, &section, out) {
            return;
        }
        let size = self.content.size(&section).await;
        let Some(index) = pager::step(user.current_index(&section), size, direction) else {
            out.push(Reply::alert(menu::NO_CONTENT));
            return;
        };
        self.deliver(user, &section, index, size, out).await;
    }

    async fn random_idea(&self, user: &mut UserState, out: &mut Vec<Reply>) {
        let mut candidates = Vec::new();
        for section in menu::CONTENT_SECTIONS {
            if self.policy.can_access(user, section) != Access::Allowed {
                continue;
            }
            let size = self.content.size(section).await;
            if size > 0 {
                candidates.push((*section, size));
            }
        }

        let picked = {
            let mut rng = rand::thread_rng();
            candidates
                .choose(&mut rng)
                .copied()
                .map(|(section, size)| (section, size, rng.gen_range(0..size)))
        };
        match picked {
            Some((section, size, index)) => self.deliver(user, section, index, size, out).await,
            None => out.push(Reply::alert(menu::NO_CONTENT)),
        }
    }

    /// Send the item at `index`, move the pager there and bill the quota.
    async fn deliver(
        &self,
        user: &mut UserState,
        section: &str,
        index: usize,
        size: usize,
        out: &mut Vec<Reply>,
    ) {
        let Some(item) = self.content.get(section, index).await else {
            out.push(Reply::alert(menu::NO_CONTENT));
            return;
        };
        let caption = format!(
            "{}\n\n{} · {}/{}",
            item.text,
            section_label(section),
            index + 1,
            size
        );
        out.push(render(&item, caption, keyboards::pager(section, &item.id)));

        // A repeat tap on the item already on screen is not billed again.
        let on_screen =
            user.current_section() == Some(section) && user.current_index(section) == index;
        user.set_position(section, index);
        if !on_screen {
            self.policy.record_usage(user, section);
        }
    }

    async fn tutorial(&self, user: &UserState, section: &str, out: &mut Vec<Reply>) {
        if section != "template" && !menu::CONTENT_SECTIONS.contains(&section) {
            out.push(Reply::alert(menu::NOT_AVAILABLE));
            return;
        }
        if !self.check(user, menu::TUTORIAL_SECTION, out) {
            return;
        }
        match self.content.tutorial(section).await {
            Some(item) => {
                let caption = item.text.clone();
                out.push(render(&item, caption, keyboards::back_to_menu()));
            }
            None => out.push(Reply::alert(menu::NO_CONTENT)),
        }
    }

    fn all_files(&self, user: &UserState, out: &mut Vec<Reply>) {
        if !self.check(user, menu::ALL_FILES_SECTION, out) {
            return;
        }
        match self.content.archive_path() {
            Some(path) => out.push(Reply::Media {
                media: MediaRef {
                    kind: MediaKind::Document,
                    locator: path.to_string_lossy().into_owned(),
                },
                caption: section_label(menu::ALL_FILES_SECTION).to_string(),
                keyboard: Some(keyboards::back_to_menu()),
            }),
            None => out.push(Reply::alert(menu::NO_CONTENT)),
        }
    }

    async fn list_favorites(&self, user: &UserState, out: &mut Vec<Reply>) {
        if !self.check(user, menu::FAVORITES_SECTION, out) {
            return;
        }
        let start = out.len();
        for key in user.favorites() {
            let Some((section, id)) = key.split_once('/') else {
                continue;
            };
            if let Some(item) = self.content.get_by_id(section, id).await {
                let caption = format!("{}\n\n{}", item.text, section_label(section));
                out.push(render(&item, caption, keyboards::favorite(section, id)));
            }
        }
        if out.len() == start {
            out.push(Reply::with_keyboard(
                menu::NO_FAVORITES,
                keyboards::back_to_menu(),
            ));
        }
    }

    async fn toggle_favorite(
        &self,
        user: &mut UserState,
        section: &str,
        id: &str,
        out: &mut Vec<Reply>,
    ) {
        if !self.check(user, menu::FAVORITES_SECTION, out) {
            return;
        }
        if self.content.get_by_id(section, id).await.is_none() {
            out.push(Reply::alert(menu::NOT_AVAILABLE));
            return;
        }
        let added = user.toggle_favorite(&favorite_key(section, id));
        out.push(Reply::toast(if added {
            menu::FAVORITE_ADDED
        } else {
            menu::FAVORITE_REMOVED
        }));
    }
}

fn favorite_key(section: &str, id: &str) -> String {
    format!("{}/{}", section, id)
}

fn render(item: &ContentItem, caption: String, keyboard: Keyboard) -> Reply {
    match &item.media {
        Some(media) => Reply::Media {
            media: media.clone(),
            caption,
            keyboard: Some(keyboard),
        },
        None => Reply::with_keyboard(caption, keyboard),
    }
}

fn ask_license(user: &mut UserState, out: &mut Vec<Reply>) {
    user.set_state(StateTag::AwaitingLicense);
    out.push(Reply::with_keyboard(menu::ASK_LICENSE, keyboards::back_to_menu()));
}

fn require_license(user: &mut UserState, next: StateTag, prompt: &str, out: &mut Vec<Reply>) {
    if user.is_vip() {
        user.set_state(next);
        out.push(Reply::with_keyboard(prompt, keyboards::back_to_menu()));
    } else {
        out.push(Reply::with_keyboard(
            menu::LICENSE_REQUIRED,
            keyboards::license_required(),
        ));
    }
}
