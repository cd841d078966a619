//! Admin content management: add, view, edit and delete section items.

use super::action::AdminAction;
use super::{keyboards, main_menu, Conversation, Reply};
use crate::content::models::{ContentPatch, MediaRef, NewContent};
use crate::menu;
use crate::users::{PendingSubmission, StateTag, UserState};

/// Longest item preview in the section listing, in characters.
const PREVIEW_CHARS: usize = 60;

impl Conversation {
    pub(super) fn open_admin(&self, user: &mut UserState, out: &mut Vec<Reply>) {
        if !self.is_admin(user.user_id) {
            tracing::warn!(user_id = user.user_id, "Non-admin tried to open the admin menu");
            out.push(Reply::text(menu::PERMISSION_DENIED));
            return;
        }
        user.reset();
        user.set_state(StateTag::AdminAwaitingSection);
        out.push(admin_menu());
    }

    pub(super) fn cancel_admin(&self, user: &mut UserState, out: &mut Vec<Reply>) {
        let had_pending = user.pending().is_some();
        user.reset();
        if had_pending {
            out.push(Reply::with_keyboard(
                menu::ADMIN_CANCELLED,
                keyboards::admin_sections(),
            ));
        } else {
            out.push(Reply::text(menu::ADMIN_CANCELLED));
            out.push(main_menu());
        }
    }

    pub(super) async fn on_admin_action(
        &self,
        user: &mut UserState,
        action: AdminAction,
        out: &mut Vec<Reply>,
    ) {
        if !self.is_admin(user.user_id) {
            tracing::warn!(user_id = user.user_id, ?action, "Non-admin pressed an admin button");
            out.push(Reply::alert(menu::PERMISSION_DENIED));
            return;
        }

        let state = user.state();
        match action {
            AdminAction::Open => self.open_admin(user, out),
            AdminAction::Cancel => self.cancel_admin(user, out),
            AdminAction::Section(section) => {
                if !matches!(state, StateTag::Idle | StateTag::AdminAwaitingSection) {
                    return stale(out);
                }
                if !pick_section(user, &section, out) {
                    out.push(Reply::alert(menu::NOT_AVAILABLE));
                }
            }
            AdminAction::View => {
                let Some(section) = self.admin_section(user, StateTag::AdminAwaitingContent) else {
                    return stale(out);
                };
                out.push(self.section_listing(&section).await);
            }
            AdminAction::Edit => {
                if self.admin_section(user, StateTag::AdminAwaitingContent).is_none() {
                    return stale(out);
                }
                user.set_state(StateTag::AdminAwaitingEditId);
                out.push(Reply::with_keyboard(
                    menu::ADMIN_ASK_EDIT_ID,
                    keyboards::admin_cancel(),
                ));
            }
            AdminAction::Delete => {
                if self.admin_section(user, StateTag::AdminAwaitingContent).is_none() {
                    return stale(out);
                }
                user.set_state(StateTag::AdminAwaitingDeleteId);
                out.push(Reply::with_keyboard(
                    menu::ADMIN_ASK_DELETE_ID,
                    keyboards::admin_cancel(),
                ));
            }
            AdminAction::MediaYes => {
                if state != StateTag::AdminAwaitingMediaChoice {
                    return stale(out);
                }
                ask_media(user, out);
            }
            AdminAction::MediaNo => {
                if state != StateTag::AdminAwaitingMediaChoice {
                    return stale(out);
                }
                self.commit(user, out).await;
            }
            AdminAction::Save => {
                if !matches!(
                    state,
                    StateTag::AdminAwaitingMediaChoice | StateTag::AdminAwaitingSaveConfirmation
                ) {
                    return stale(out);
                }
                self.commit(user, out).await;
            }
        }
    }

    /// Section of the pending submission, if the user is in `expected`.
    fn admin_section(&self, user: &UserState, expected: StateTag) -> Option<String> {
        if user.state() != expected {
            return None;
        }
        user.pending().map(|p| p.section.clone())
    }

    async fn section_listing(&self, section: &str) -> Reply {
        let items = self.content.items(section).await;
        if items.is_empty() {
            return Reply::with_keyboard(menu::NO_CONTENT, keyboards::admin_actions());
        }
        let mut listing = format!("{} ({})\n", menu::section_label(section), items.len());
        for item in &items {
            let mut preview: String = item.text.chars().take(PREVIEW_CHARS).collect();
            if item.text.chars().count() > PREVIEW_CHARS {
                preview.push('…');
            }
            let media = item.media.as_ref().map_or("", |m| m.kind.as_str());
            listing.push_str(&format!("\n[{}] {} {}", item.id, media, preview.replace('\n', " ")));
        }
        Reply::with_keyboard(listing, keyboards::admin_actions())
    }

    // ── Text steps ─────────────────────────────────────────────────

    /// Section names typed by hand work like the section buttons.
    pub(super) fn admin_section_text(&self, user: &mut UserState, text: &str, out: &mut Vec<Reply>) {
        if !pick_section(user, text, out) {
            out.push(admin_menu());
        }
    }

    pub(super) fn admin_receive_text(&self, user: &mut UserState, text: &str, out: &mut Vec<Reply>) {
        let Some(pending) = user.pending_mut() else {
            return self.lost_pending(user, out);
        };
        if text.is_empty() {
            out.push(Reply::with_keyboard(
                menu::ADMIN_SEND_TEXT_FIRST,
                keyboards::admin_actions(),
            ));
            return;
        }
        pending.text = Some(text.to_string());

        if pending.media.is_some() {
            ask_save(user, out);
        } else {
            user.set_state(StateTag::AdminAwaitingMediaChoice);
            out.push(Reply::with_keyboard(
                menu::ADMIN_ASK_MEDIA_CHOICE,
                keyboards::media_choice(),
            ));
        }
    }

    pub(super) async fn admin_media_choice(&self, user: &mut UserState, text: &str, out: &mut Vec<Reply>) {
        match parse_yes_no(text) {
            Some(true) => ask_media(user, out),
            Some(false) => self.commit(user, out).await,
            None => out.push(Reply::with_keyboard(
                menu::ADMIN_ASK_MEDIA_CHOICE,
                keyboards::media_choice(),
            )),
        }
    }

    pub(super) async fn admin_save_confirmation(
        &self,
        user: &mut UserState,
        text: &str,
        out: &mut Vec<Reply>,
    ) {
        if text.eq_ignore_ascii_case("save") || parse_yes_no(text) == Some(true) {
            self.commit(user, out).await;
        } else {
            out.push(Reply::with_keyboard(menu::ADMIN_ASK_SAVE, keyboards::confirm_save()));
        }
    }

    pub(super) async fn admin_edit_target(&self, user: &mut UserState, id: &str, out: &mut Vec<Reply>) {
        let Some(pending) = user.pending_mut() else {
            return self.lost_pending(user, out);
        };
        let Some(item) = self.content.get_by_id(&pending.section, id).await else {
            out.push(Reply::with_keyboard(menu::ADMIN_NOT_FOUND, keyboards::admin_cancel()));
            return;
        };
        pending.target_id = Some(item.id.clone());
        user.set_state(StateTag::AdminAwaitingEditText);
        out.push(Reply::text(item.text));
        out.push(Reply::with_keyboard(
            menu::ADMIN_ASK_EDIT_TEXT,
            keyboards::admin_cancel(),
        ));
    }

    pub(super) async fn admin_apply_edit(&self, user: &mut UserState, text: &str, out: &mut Vec<Reply>) {
        let Some(PendingSubmission {
            section,
            target_id: Some(id),
            ..
        }) = user.pending().cloned()
        else {
            return self.lost_pending(user, out);
        };
        if text.is_empty() {
            out.push(Reply::with_keyboard(
                menu::ADMIN_ASK_EDIT_TEXT,
                keyboards::admin_cancel(),
            ));
            return;
        }

        let patch = ContentPatch {
            text: Some(text.to_string()),
            ..ContentPatch::default()
        };
        let message = match self.content.edit(&section, &id, patch).await {
            Ok(true) => menu::ADMIN_EDITED,
            Ok(false) => menu::ADMIN_NOT_FOUND,
            Err(e) => {
                tracing::error!(user_id = user.user_id, section = %section, id = %id, "Edit failed: {}", e);
                menu::ADMIN_WRITE_FAILED
            }
        };
        user.reset();
        out.push(Reply::with_keyboard(message, keyboards::admin_sections()));
    }

    pub(super) async fn admin_delete(&self, user: &mut UserState, id: &str, out: &mut Vec<Reply>) {
        let Some(section) = user.pending().map(|p| p.section.clone()) else {
            return self.lost_pending(user, out);
        };
        match self.content.delete(&section, id).await {
            Ok(true) => {
                user.reset();
                out.push(Reply::with_keyboard(menu::ADMIN_DELETED, keyboards::admin_sections()));
            }
            Ok(false) => {
                out.push(Reply::with_keyboard(menu::ADMIN_NOT_FOUND, keyboards::admin_cancel()))
            }
            Err(e) => {
                tracing::error!(user_id = user.user_id, section = %section, id, "Delete failed: {}", e);
                user.reset();
                out.push(Reply::with_keyboard(
                    menu::ADMIN_WRITE_FAILED,
                    keyboards::admin_sections(),
                ));
            }
        }
    }

    // ── Media ──────────────────────────────────────────────────────

    pub(super) fn on_media(&self, user: &mut UserState, media: MediaRef, out: &mut Vec<Reply>) {
        match user.state() {
            StateTag::AdminAwaitingMedia
            | StateTag::AdminAwaitingMediaChoice
            | StateTag::AdminAwaitingContent => {
                let Some(pending) = user.pending_mut() else {
                    return self.lost_pending(user, out);
                };
                tracing::debug!(kind = media.kind.as_str(), "Admin attached media");
                pending.media = Some(media);

                if pending.text.is_some() {
                    ask_save(user, out);
                } else {
                    user.set_state(StateTag::AdminAwaitingContent);
                    out.push(Reply::with_keyboard(
                        menu::ADMIN_SEND_TEXT_FIRST,
                        keyboards::admin_cancel(),
                    ));
                }
            }
            StateTag::AwaitingLicense => out.push(Reply::text(menu::ASK_LICENSE)),
            StateTag::AwaitingTopic => out.push(Reply::text(menu::ASK_TOPIC)),
            StateTag::Chatting => out.push(Reply::text(menu::ASK_QUESTION)),
            StateTag::Idle => out.push(main_menu()),
            StateTag::AdminAwaitingSection
            | StateTag::AdminAwaitingSaveConfirmation
            | StateTag::AdminAwaitingEditId
            | StateTag::AdminAwaitingEditText
            | StateTag::AdminAwaitingDeleteId => out.push(Reply::alert(menu::NOT_AVAILABLE)),
        }
    }

    // ── Commit ─────────────────────────────────────────────────────

    /// Write the pending submission. The admin ends up Idle either way.
    async fn commit(&self, user: &mut UserState, out: &mut Vec<Reply>) {
        let Some(pending) = user.take_pending() else {
            return self.lost_pending(user, out);
        };
        user.reset();

        let Some(text) = pending.text else {
            out.push(Reply::with_keyboard(
                menu::ADMIN_SEND_TEXT_FIRST,
                keyboards::admin_sections(),
            ));
            return;
        };
        let data = NewContent {
            text,
            media: pending.media,
            extra: None,
        };
        match self.content.add(&pending.section, data).await {
            Ok(id) => {
                tracing::info!(user_id = user.user_id, section = %pending.section, id = %id, "Admin added content");
                out.push(Reply::with_keyboard(
                    format!("{}\nid: {}", menu::ADMIN_SAVED, id),
                    keyboards::admin_sections(),
                ));
            }
            Err(e) => {
                tracing::error!(user_id = user.user_id, section = %pending.section, "Saving content failed: {}", e);
                out.push(Reply::with_keyboard(
                    menu::ADMIN_SAVE_FAILED,
                    keyboards::admin_sections(),
                ));
            }
        }
    }

    /// Admin state without a pending submission; only reachable from a
    /// record written by an older build.
    fn lost_pending(&self, user: &mut UserState, out: &mut Vec<Reply>) {
        tracing::warn!(user_id = user.user_id, state = ?user.state(), "Admin state without pending submission");
        user.reset();
        out.push(admin_menu());
    }
}

fn admin_menu() -> Reply {
    Reply::with_keyboard(menu::ADMIN_MENU, keyboards::admin_sections())
}

/// Start a submission for `section`. False if it is not a content section.
fn pick_section(user: &mut UserState, section: &str, out: &mut Vec<Reply>) -> bool {
    if !menu::CONTENT_SECTIONS.contains(&section) {
        return false;
    }
    user.start_submission(PendingSubmission::for_section(section));
    user.set_state(StateTag::AdminAwaitingContent);
    out.push(Reply::with_keyboard(
        format!("{}\n\n{}", menu::section_label(section), menu::ADMIN_ASK_TEXT),
        keyboards::admin_actions(),
    ));
    true
}

fn stale(out: &mut Vec<Reply>) {
    out.push(Reply::alert(menu::STALE_ACTION));
}

fn ask_media(user: &mut UserState, out: &mut Vec<Reply>) {
    user.set_state(StateTag::AdminAwaitingMedia);
    out.push(Reply::with_keyboard(menu::ADMIN_ASK_MEDIA, keyboards::admin_cancel()));
}

fn ask_save(user: &mut UserState, out: &mut Vec<Reply>) {
    user.set_state(StateTag::AdminAwaitingSaveConfirmation);
    out.push(Reply::with_keyboard(menu::ADMIN_ASK_SAVE, keyboards::confirm_save()));
}

fn parse_yes_no(text: &str) -> Option<bool> {
    match text.trim().to_lowercase().as_str() {
        "yes" | "y" | "بله" | "آره" => Some(true),
        "no" | "n" | "خیر" | "نه" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn yes_no_answers() {
        assert_eq!(parse_yes_no(" Yes "), Some(true));
        assert_eq!(parse_yes_no("بله"), Some(true));
        assert_eq!(parse_yes_no("NO"), Some(false));
        assert_eq!(parse_yes_no("maybe"), None);
    }
}
