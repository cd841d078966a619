use super::action::{AdminAction, UserAction};
use super::event::{Button, Keyboard};
use crate::menu::{self, section_label};

fn user(label: &str, action: UserAction) -> Button {
    Button::new(label, action.data())
}

fn admin(label: &str, action: AdminAction) -> Button {
    Button::new(label, action.data())
}

fn section(name: &str) -> Button {
    user(section_label(name), UserAction::Section(name.to_string()))
}

pub fn main_menu() -> Keyboard {
    Keyboard::new(vec![
        vec![user(section_label("template"), UserAction::TemplateMenu)],
        vec![section("reels_idea"), section("call_to_action")],
        vec![
            section("caption"),
            user(section_label(menu::RANDOM_SECTION), UserAction::RandomIdea),
        ],
        vec![section("interactive_story"), section("bio")],
        vec![section("roadmap")],
        vec![user(section_label(menu::ALL_FILES_SECTION), UserAction::AllFiles)],
        vec![
            user("💎 Lifetime VIP", UserAction::Vip),
            user(section_label(menu::FAVORITES_SECTION), UserAction::Favorites),
        ],
        vec![
            user("🔑 Enter license", UserAction::EnterLicense),
            user("🤖 Chat with AI", UserAction::Chat),
        ],
        vec![user("🪝 Hook generator", UserAction::Generate)],
    ])
}

pub fn template_menu() -> Keyboard {
    Keyboard::new(vec![
        vec![section("text_template"), section("image_template")],
        vec![user(
            section_label(menu::TUTORIAL_SECTION),
            UserAction::Tutorial("template".to_string()),
        )],
        vec![back_button()],
    ])
}

fn back_button() -> Button {
    user("🏠 Main menu", UserAction::MainMenu)
}

pub fn back_to_menu() -> Keyboard {
    Keyboard::new(vec![vec![back_button()]])
}

pub fn license_required() -> Keyboard {
    Keyboard::new(vec![
        vec![user("🔑 Enter license", UserAction::EnterLicense)],
        vec![back_button()],
    ])
}

/// Controls under a delivered item.
pub fn pager(section: &str, item_id: &str) -> Keyboard {
    Keyboard::new(vec![
        vec![
            user("« Previous", UserAction::Prev),
            user("Next »", UserAction::Next),
        ],
        vec![user(
            "⭐ Favorite",
            UserAction::ToggleFavorite {
                section: section.to_string(),
                id: item_id.to_string(),
            },
        )],
        vec![back_button()],
    ])
}

/// Controls under an item in the favorites listing.
pub fn favorite(section: &str, item_id: &str) -> Keyboard {
    Keyboard::new(vec![
        vec![user(
            "✖ Remove from favorites",
            UserAction::ToggleFavorite {
                section: section.to_string(),
                id: item_id.to_string(),
            },
        )],
        vec![back_button()],
    ])
}

pub fn admin_sections() -> Keyboard {
    let mut rows: Vec<Vec<Button>> = menu::CONTENT_SECTIONS
        .chunks(2)
        .map(|pair| {
            pair.iter()
                .map(|name| admin(section_label(name), AdminAction::Section(name.to_string())))
                .collect()
        })
        .collect();
    rows.push(vec![admin("✖ Close", AdminAction::Cancel)]);
    Keyboard::new(rows)
}

pub fn admin_actions() -> Keyboard {
    Keyboard::new(vec![
        vec![
            admin("📋 View", AdminAction::View),
            admin("✏️ Edit", AdminAction::Edit),
            admin("🗑 Delete", AdminAction::Delete),
        ],
        vec![admin("✖ Cancel", AdminAction::Cancel)],
    ])
}

pub fn media_choice() -> Keyboard {
    Keyboard::new(vec![
        vec![
            admin("📎 Add media", AdminAction::MediaYes),
            admin("💾 Save without media", AdminAction::MediaNo),
        ],
        vec![admin("✖ Cancel", AdminAction::Cancel)],
    ])
}

pub fn confirm_save() -> Keyboard {
    Keyboard::new(vec![
        vec![admin("💾 Save", AdminAction::Save)],
        vec![admin("✖ Cancel", AdminAction::Cancel)],
    ])
}

pub fn admin_cancel() -> Keyboard {
    Keyboard::new(vec![vec![admin("✖ Cancel", AdminAction::Cancel)]])
}

#[cfg(test)]
mod tests {
    use super::super::action::Action;
    use super::*;

    #[test]
    fn every_button_parses() {
        let keyboards = [
            main_menu(),
            template_menu(),
            back_to_menu(),
            license_required(),
            pager("caption", "admin-1"),
            favorite("bio", "7"),
            admin_sections(),
            admin_actions(),
            media_choice(),
            confirm_save(),
            admin_cancel(),
        ];
        for keyboard in &keyboards {
            for button in keyboard.buttons() {
                assert!(Action::parse(&button.data).is_some(), "{:?}", button);
            }
        }
    }
}
