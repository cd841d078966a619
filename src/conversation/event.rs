use crate::content::models::MediaRef;

/// Slash commands the state machine understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Start,
    Help,
    Admin,
    Cancel,
}

/// One inbound update from a user, already stripped of transport details.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Command(Command),
    /// Opaque button payload.
    Callback(String),
    Text(String),
    Media(MediaRef),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Button {
    pub label: String,
    pub data: String,
}

impl Button {
    pub fn new(label: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            data: data.into(),
        }
    }
}

/// Inline keyboard as rows of buttons.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Keyboard {
    pub rows: Vec<Vec<Button>>,
}

impl Keyboard {
    pub fn new(rows: Vec<Vec<Button>>) -> Self {
        Self { rows }
    }

    pub fn buttons(&self) -> impl Iterator<Item = &Button> {
        self.rows.iter().flatten()
    }
}

/// One outbound operation for the transport to perform.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    Text {
        text: String,
        keyboard: Option<Keyboard>,
    },
    Media {
        media: MediaRef,
        caption: String,
        keyboard: Option<Keyboard>,
    },
    /// Answer to the button press that triggered this event.
    Alert { text: String, show_alert: bool },
}

impl Reply {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text {
            text: text.into(),
            keyboard: None,
        }
    }

    pub fn with_keyboard(text: impl Into<String>, keyboard: Keyboard) -> Self {
        Self::Text {
            text: text.into(),
            keyboard: Some(keyboard),
        }
    }

    /// Popup the user has to dismiss.
    pub fn alert(text: impl Into<String>) -> Self {
        Self::Alert {
            text: text.into(),
            show_alert: true,
        }
    }

    /// Short notification at the top of the chat.
    pub fn toast(text: impl Into<String>) -> Self {
        Self::Alert {
            text: text.into(),
            show_alert: false,
        }
    }

    pub fn body(&self) -> &str {
        match self {
            Self::Text { text, .. } => text,
            Self::Media { caption, .. } => caption,
            Self::Alert { text, .. } => text,
        }
    }

    pub fn keyboard(&self) -> Option<&Keyboard> {
        match self {
            Self::Text { keyboard, .. } | Self::Media { keyboard, .. } => keyboard.as_ref(),
            Self::Alert { .. } => None,
        }
    }
}
