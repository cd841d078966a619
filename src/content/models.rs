use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Kind of media attached to a content item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Photo,
    Video,
    Voice,
    Document,
}

impl MediaKind {
    pub fn from_str_loose(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "photo" | "image" => Some(Self::Photo),
            "video" => Some(Self::Video),
            "voice" | "audio" => Some(Self::Voice),
            "document" | "file" => Some(Self::Document),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Photo => "photo",
            Self::Video => "video",
            Self::Voice => "voice",
            Self::Document => "document",
        }
    }
}

/// A Telegram file id or a local path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaRef {
    pub kind: MediaKind,
    pub locator: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentItem {
    pub id: String,
    pub section: String,
    pub text: String,
    pub media: Option<MediaRef>,
    pub extra: Option<Map<String, Value>>,
}

/// Data for a new item; the store assigns the id.
#[derive(Debug, Clone, Default)]
pub struct NewContent {
    pub text: String,
    pub media: Option<MediaRef>,
    pub extra: Option<Map<String, Value>>,
}

/// Fields to merge into an existing item. `None` keeps the current value.
#[derive(Debug, Clone, Default)]
pub struct ContentPatch {
    pub text: Option<String>,
    pub media: Option<MediaRef>,
    pub extra: Option<Map<String, Value>>,
}

impl ContentPatch {
    pub fn apply(self, item: &mut ContentItem) {
        if let Some(text) = self.text {
            item.text = text;
        }
        if let Some(media) = self.media {
            item.media = Some(media);
        }
        if let Some(extra) = self.extra {
            match item.extra.as_mut() {
                Some(existing) => existing.extend(extra),
                None => item.extra = Some(extra),
            }
        }
    }
}

// ── On-disk records ────────────────────────────────────────────────

/// Ids in hand-written files are sometimes numbers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub(crate) enum RecordId {
    Text(String),
    Number(i64),
}

impl RecordId {
    fn into_string(self) -> String {
        match self {
            Self::Text(s) => s,
            Self::Number(n) => n.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct ContentRecord {
    pub id: RecordId,
    pub text: String,
    #[serde(default)]
    pub media_path: Option<String>,
    #[serde(default)]
    pub media_type: Option<String>,
    #[serde(default)]
    pub additional_info: Option<Value>,
}

impl ContentRecord {
    pub fn into_item(self, section: &str) -> ContentItem {
        let media = match (self.media_path, self.media_type.as_deref()) {
            (Some(path), Some(kind)) if !path.is_empty() => {
                MediaKind::from_str_loose(kind).map(|kind| MediaRef {
                    kind,
                    locator: path,
                })
            }
            _ => None,
        };
        let extra = match self.additional_info {
            Some(Value::Object(map)) => Some(map),
            _ => None,
        };

        ContentItem {
            id: self.id.into_string(),
            section: section.to_string(),
            text: self.text,
            media,
            extra,
        }
    }

    pub fn from_item(item: &ContentItem) -> Self {
        Self {
            id: RecordId::Text(item.id.clone()),
            text: item.text.clone(),
            media_path: item.media.as_ref().map(|m| m.locator.clone()),
            media_type: item.media.as_ref().map(|m| m.kind.as_str().to_string()),
            additional_info: item.extra.clone().map(Value::Object),
        }
    }
}

/// `<section>_admin.seq.json`: the next `admin-N` number to hand out.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub(crate) struct AdminSequence {
    pub next_id: u64,
}

/// `tutorials/<section>.json` holds a single object.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct TutorialRecord {
    pub text: String,
    #[serde(default)]
    pub media_path: Option<String>,
    #[serde(default)]
    pub media_type: Option<String>,
}

impl TutorialRecord {
    pub fn into_item(self, section: &str) -> ContentItem {
        ContentRecord {
            id: RecordId::Text("tutorial".to_string()),
            text: self.text,
            media_path: self.media_path,
            media_type: self.media_type,
            additional_info: None,
        }
        .into_item(section)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_ids_and_media_are_read() {
        let raw = r#"[
            {"id": 7, "text": "hello", "media_path": "AgAD", "media_type": "photo"},
            {"id": "x", "text": "plain", "additional_info": {"tag": "a"}}
        ]"#;
        let records: Vec<ContentRecord> = serde_json::from_str(raw).unwrap();
        let items: Vec<_> = records.into_iter().map(|r| r.into_item("caption")).collect();

        assert_eq!(items[0].id, "7");
        assert_eq!(
            items[0].media,
            Some(MediaRef {
                kind: MediaKind::Photo,
                locator: "AgAD".to_string()
            })
        );
        assert_eq!(items[1].media, None);
        assert_eq!(items[1].extra.as_ref().unwrap()["tag"], "a");
    }

    #[test]
    fn unknown_media_type_is_dropped() {
        let record = ContentRecord {
            id: RecordId::Number(1),
            text: "t".into(),
            media_path: Some("p".into()),
            media_type: Some("hologram".into()),
            additional_info: None,
        };
        assert!(record.into_item("bio").media.is_none());
    }

    #[test]
    fn patch_merges_extra() {
        let mut item = ContentItem {
            id: "1".into(),
            section: "bio".into(),
            text: "old".into(),
            media: None,
            extra: Some(Map::from_iter([("a".to_string(), Value::from(1))])),
        };
        ContentPatch {
            text: Some("new".into()),
            media: None,
            extra: Some(Map::from_iter([("b".to_string(), Value::from(2))])),
        }
        .apply(&mut item);

        assert_eq!(item.text, "new");
        let extra = item.extra.unwrap();
        assert_eq!(extra["a"], 1);
        assert_eq!(extra["b"], 2);
    }
}
