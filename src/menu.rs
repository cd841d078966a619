//! Section catalogue, quota policy defaults and user-facing copy.

/// Sections backed by content files, in main-menu order.
pub const CONTENT_SECTIONS: &[&str] = &[
    "text_template",
    "image_template",
    "reels_idea",
    "call_to_action",
    "caption",
    "interactive_story",
    "bio",
    "roadmap",
];

/// Quota groups with a free-tier limit.
pub const LIMITED_SECTIONS: &[&str] = &[
    "template",
    "reels_idea",
    "call_to_action",
    "caption",
    "interactive_story",
    "bio",
];

/// Sections reserved for VIP users.
pub const LOCKED_SECTIONS: &[&str] = &["tutorial", "roadmap", "all_files", "favorites"];

pub const RANDOM_SECTION: &str = "complete_idea";
pub const TUTORIAL_SECTION: &str = "tutorial";
pub const ALL_FILES_SECTION: &str = "all_files";
pub const FAVORITES_SECTION: &str = "favorites";

pub fn section_label(section: &str) -> &str {
    match section {
        "template" => "📝 Million-dollar templates",
        "text_template" => "✍️ Text templates",
        "image_template" => "🖼 Image templates",
        "reels_idea" => "🎬 Reels ideas",
        "call_to_action" => "📣 Call to action",
        "caption" => "💬 Captions",
        "complete_idea" => "🎲 Complete idea (random)",
        "interactive_story" => "📲 Interactive stories",
        "bio" => "👤 Bio",
        "roadmap" => "🗺 Roadmap (Instagram algorithm)",
        "all_files" => "📦 All files (zip)",
        "tutorial" => "🎓 Tutorial",
        "favorites" => "⭐ Favorites",
        other => other,
    }
}

pub const WELCOME: &str = "👋 Welcome to Millionisho!\nPick one of the options below:";
pub const HELP: &str = "Available commands:\n\
    /start - main menu\n\
    /help - this message\n\
    /cancel - abort the current step\n\
    /admin - content management (admins only)";
pub const VIP_ONLY: &str = "🔒 This section is for VIP subscribers only.";
pub const LIMIT_REACHED: &str =
    "⏳ You've used your free items here. Get a subscription for full access to every template.";
pub const ALREADY_SUBSCRIBED: &str =
    "💎 You're already a VIP subscriber, no need for another subscription.";
pub const NO_CONTENT: &str = "📭 Nothing to show here yet.";
pub const PICK_SECTION_FIRST: &str = "Pick a section first.";
pub const NOT_AVAILABLE: &str = "This option is not available.";
pub const STALE_ACTION: &str = "This action is no longer active.";
pub const GENERIC_ERROR: &str = "❌ Something went wrong. Please try again.";
pub const PERMISSION_DENIED: &str = "⛔ You don't have access to this.";

pub const ASK_LICENSE: &str = "🔑 Please send your license code:";
pub const LICENSE_OK: &str = "✅ Your license has been verified! You now have VIP access.";
pub const LICENSE_INVALID: &str =
    "❌ That license is not valid.\nTry again or contact support.";
pub const LICENSE_REQUIRED: &str =
    "🔐 You need a valid license for this section.\nPlease enter your license first.";

pub const ASK_TOPIC: &str = "✍️ Send me a topic and I'll write hooks for it.";
pub const ASK_QUESTION: &str = "🤖 Ask your question and I'll answer with AI.";
pub const GENERATION_FAILED: &str =
    "❌ I couldn't generate a reply right now.\nPlease try again in a few minutes.";

pub const FAVORITE_ADDED: &str = "⭐ Added to favorites";
pub const FAVORITE_REMOVED: &str = "Removed from favorites";
pub const NO_FAVORITES: &str = "You have no favorites yet.";

pub const ADMIN_MENU: &str = "🛠 Content management\nPick a section:";
pub const ADMIN_ASK_TEXT: &str =
    "Send the text of the new item, or pick another action below.";
pub const ADMIN_ASK_MEDIA_CHOICE: &str = "Text saved. Attach a photo, video, voice or file?";
pub const ADMIN_ASK_MEDIA: &str = "Send the photo, video, voice or document.";
pub const ADMIN_ASK_SAVE: &str = "Media attached. Save this item?";
pub const ADMIN_SAVED: &str = "✅ Content saved.";
pub const ADMIN_SAVE_FAILED: &str = "❌ Saving the content failed. Please try again.";
pub const ADMIN_CANCELLED: &str = "Cancelled.";
pub const ADMIN_ASK_EDIT_ID: &str = "Send the id of the item to edit:";
pub const ADMIN_ASK_EDIT_TEXT: &str = "Send the new text:";
pub const ADMIN_ASK_DELETE_ID: &str = "Send the id of the item to delete:";
pub const ADMIN_EDITED: &str = "✅ Content updated.";
pub const ADMIN_DELETED: &str = "🗑 Content deleted.";
pub const ADMIN_NOT_FOUND: &str = "No item with that id.";
pub const ADMIN_WRITE_FAILED: &str = "❌ The change could not be saved.";
pub const ADMIN_SEND_TEXT_FIRST: &str = "Send the text first.";
