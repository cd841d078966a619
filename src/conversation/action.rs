//! Button payloads. Every payload the keyboards emit parses back here.

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    User(UserAction),
    Admin(AdminAction),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserAction {
    MainMenu,
    TemplateMenu,
    Section(String),
    Next,
    Prev,
    RandomIdea,
    Tutorial(String),
    AllFiles,
    Vip,
    Favorites,
    ToggleFavorite { section: String, id: String },
    EnterLicense,
    Chat,
    Generate,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdminAction {
    Open,
    Section(String),
    View,
    Edit,
    Delete,
    MediaYes,
    MediaNo,
    Save,
    Cancel,
}

impl Action {
    pub fn parse(data: &str) -> Option<Self> {
        if let Some(rest) = data.strip_prefix("admin:") {
            return AdminAction::parse(rest).map(Self::Admin);
        }
        UserAction::parse(data).map(Self::User)
    }
}

impl UserAction {
    fn parse(data: &str) -> Option<Self> {
        let action = match data {
            "menu" => Self::MainMenu,
            "template" => Self::TemplateMenu,
            "nav:next" => Self::Next,
            "nav:prev" => Self::Prev,
            "random" => Self::RandomIdea,
            "all_files" => Self::AllFiles,
            "vip" => Self::Vip,
            "favorites" => Self::Favorites,
            "license" => Self::EnterLicense,
            "chat" => Self::Chat,
            "generate" => Self::Generate,
            _ => {
                if let Some(section) = data.strip_prefix("section:") {
                    Self::Section(non_empty(section)?)
                } else if let Some(section) = data.strip_prefix("tutorial:") {
                    Self::Tutorial(non_empty(section)?)
                } else if let Some(rest) = data.strip_prefix("fav:") {
                    let (section, id) = rest.split_once(':')?;
                    Self::ToggleFavorite {
                        section: non_empty(section)?,
                        id: non_empty(id)?,
                    }
                } else {
                    return None;
                }
            }
        };
        Some(action)
    }

    pub fn data(&self) -> String {
        match self {
            Self::MainMenu => "menu".to_string(),
            Self::TemplateMenu => "template".to_string(),
            Self::Section(s) => format!("section:{}", s),
            Self::Next => "nav:next".to_string(),
            Self::Prev => "nav:prev".to_string(),
            Self::RandomIdea => "random".to_string(),
            Self::Tutorial(s) => format!("tutorial:{}", s),
            Self::AllFiles => "all_files".to_string(),
            Self::Vip => "vip".to_string(),
            Self::Favorites => "favorites".to_string(),
            Self::ToggleFavorite { section, id } => format!("fav:{}:{}", section, id),
            Self::EnterLicense => "license".to_string(),
            Self::Chat => "chat".to_string(),
            Self::Generate => "generate".to_string(),
        }
    }
}

impl AdminAction {
    fn parse(data: &str) -> Option<Self> {
        let action = match data {
            "open" => Self::Open,
            "view" => Self::View,
            "edit" => Self::Edit,
            "delete" => Self::Delete,
            "media:yes" => Self::MediaYes,
            "media:no" => Self::MediaNo,
            "save" => Self::Save,
            "cancel" => Self::Cancel,
            _ => Self::Section(non_empty(data.strip_prefix("section:")?)?),
        };
        Some(action)
    }

    pub fn data(&self) -> String {
        let tail = match self {
            Self::Open => "open".to_string(),
            Self::Section(s) => format!("section:{}", s),
            Self::View => "view".to_string(),
            Self::Edit => "edit".to_string(),
            Self::Delete => "delete".to_string(),
            Self::MediaYes => "media:yes".to_string(),
            Self::MediaNo => "media:no".to_string(),
            Self::Save => "save".to_string(),
            Self::Cancel => "cancel".to_string(),
        };
        format!("admin:{}", tail)
    }
}

fn non_empty(s: &str) -> Option<String> {
    (!s.is_empty()).then(|| s.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_payloads() {
        assert_eq!(
            Action::parse("section:caption"),
            Some(Action::User(UserAction::Section("caption".into())))
        );
        assert_eq!(
            Action::parse("fav:bio:admin-3"),
            Some(Action::User(UserAction::ToggleFavorite {
                section: "bio".into(),
                id: "admin-3".into()
            }))
        );
        assert_eq!(
            Action::parse("admin:section:bio"),
            Some(Action::Admin(AdminAction::Section("bio".into())))
        );
        assert_eq!(Action::parse("admin:save"), Some(Action::Admin(AdminAction::Save)));
    }

    #[test]
    fn rejects_unknown_and_truncated_payloads() {
        for data in ["", "bogus", "section:", "fav:bio", "fav::1", "admin:", "admin:nope", "admin:section:"] {
            assert_eq!(Action::parse(data), None, "{:?}", data);
        }
    }

    #[test]
    fn emitted_payloads_fit_telegram_limit() {
        let longest = UserAction::ToggleFavorite {
            section: "interactive_story".into(),
            id: "admin-18446744073709551615".into(),
        };
        assert!(longest.data().len() <= 64);
    }
}
