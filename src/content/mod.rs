pub mod models;

use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use tokio::fs;
use tokio::sync::{Mutex, RwLock};

use crate::error::StoreError;
use models::{
    AdminSequence, ContentItem, ContentPatch, ContentRecord, NewContent, TutorialRecord,
};

const ADMIN_ID_PREFIX: &str = "admin-";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Origin {
    Bulk,
    Admin,
}

#[derive(Debug, Clone)]
struct Stored {
    item: ContentItem,
    origin: Origin,
}

#[derive(Debug, Default)]
struct Section {
    items: Vec<Stored>,
    next_admin_seq: u64,
    /// Set when a file of this section could not be parsed.
    unavailable: bool,
}

impl Section {
    fn find(&self, id: &str) -> Option<usize> {
        self.items.iter().position(|s| s.item.id == id)
    }

    fn records(&self, origin: Origin) -> Vec<ContentRecord> {
        self.items
            .iter()
            .filter(|s| s.origin == origin)
            .map(|s| ContentRecord::from_item(&s.item))
            .collect()
    }
}

/// A section file that could not be read at load time.
#[derive(Debug, Clone)]
pub struct LoadError {
    pub section: String,
    pub path: PathBuf,
    pub message: String,
}

#[derive(Debug, Default)]
pub struct LoadReport {
    pub counts: Vec<(String, usize)>,
    pub errors: Vec<LoadError>,
}

/// In-memory index of content sections backed by JSON files.
///
/// Each section is read from `<dir>/<section>.json` (bulk) and
/// `<dir>/<section>_admin.json` (admin submissions). Mutations rewrite only
/// the file the touched item came from, under a per-section writer lock, and
/// reach memory only after the file write succeeded.
///
/// The highest `admin-N` ever handed out is kept in
/// `<dir>/<section>_admin.seq.json`, so deleted ids stay retired across
/// restarts.
pub struct ContentStore {
    dir: PathBuf,
    sections: Vec<String>,
    index: RwLock<HashMap<String, Section>>,
    writers: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl ContentStore {
    pub fn new(dir: impl Into<PathBuf>, sections: Vec<String>) -> Self {
        Self {
            dir: dir.into(),
            sections,
            index: RwLock::new(HashMap::new()),
            writers: Mutex::new(HashMap::new()),
        }
    }

    /// (Re)load every configured section from disk, replacing the index.
    pub async fn load(&self) -> LoadReport {
        let mut fresh = HashMap::new();
        let mut report = LoadReport::default();

        for section in &self.sections {
            match self.read_section(section).await {
                Ok(loaded) => {
                    report.counts.push((section.clone(), loaded.items.len()));
                    fresh.insert(section.clone(), loaded);
                }
                Err(err) => {
                    tracing::error!(
                        section = %err.section,
                        path = %err.path.display(),
                        "Skipping section: {}",
                        err.message
                    );
                    report.errors.push(err);
                    fresh.insert(
                        section.clone(),
                        Section {
                            unavailable: true,
                            ..Section::default()
                        },
                    );
                }
            }
        }

        *self.index.write().await = fresh;
        report
    }

    // ── Reads ──────────────────────────────────────────────────────

    pub async fn get(&self, section: &str, index: usize) -> Option<ContentItem> {
        let sections = self.index.read().await;
        sections
            .get(section)
            .and_then(|s| s.items.get(index))
            .map(|s| s.item.clone())
    }

    pub async fn get_by_id(&self, section: &str, id: &str) -> Option<ContentItem> {
        let sections = self.index.read().await;
        let s = sections.get(section)?;
        s.find(id).map(|pos| s.items[pos].item.clone())
    }

    pub async fn size(&self, section: &str) -> usize {
        self.index
            .read()
            .await
            .get(section)
            .map_or(0, |s| s.items.len())
    }

    pub async fn items(&self, section: &str) -> Vec<ContentItem> {
        self.index
            .read()
            .await
            .get(section)
            .map(|s| s.items.iter().map(|s| s.item.clone()).collect())
            .unwrap_or_default()
    }

    pub async fn tutorial(&self, section: &str) -> Option<ContentItem> {
        let path = self.dir.join("tutorials").join(format!("{}.json", section));
        let raw = match fs::read_to_string(&path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return None,
            Err(e) => {
                tracing::warn!(path = %path.display(), "Failed to read tutorial: {}", e);
                return None;
            }
        };
        match serde_json::from_str::<TutorialRecord>(&raw) {
            Ok(record) => Some(record.into_item(section)),
            Err(e) => {
                tracing::warn!(path = %path.display(), "Malformed tutorial: {}", e);
                None
            }
        }
    }

    /// Path of the all-content archive, if one has been published.
    pub fn archive_path(&self) -> Option<PathBuf> {
        let path = self.dir.join("all_content.zip");
        path.is_file().then_some(path)
    }

    // ── Mutations ──────────────────────────────────────────────────

    pub async fn add(&self, section: &str, data: NewContent) -> Result<String, StoreError> {
        let writer = self.writer(section).await;
        let _guard = writer.lock().await;

        let (item, next_seq, records) = {
            let sections = self.index.read().await;
            let current = sections.get(section);
            if current.is_some_and(|s| s.unavailable) {
                return Err(StoreError::SectionUnavailable(section.to_string()));
            }

            let mut seq = current.map_or(1, |s| s.next_admin_seq.max(1));
            let id = loop {
                let candidate = format!("{}{}", ADMIN_ID_PREFIX, seq);
                seq += 1;
                if current.map_or(true, |s| s.find(&candidate).is_none()) {
                    break candidate;
                }
            };

            let item = ContentItem {
                id,
                section: section.to_string(),
                text: data.text,
                media: data.media,
                extra: data.extra,
            };
            let mut records = current.map(|s| s.records(Origin::Admin)).unwrap_or_default();
            records.push(ContentRecord::from_item(&item));
            (item, seq, records)
        };

        // Retire the id before the item lands; a failed add only leaves a gap.
        self.persist(&self.sequence_path(section), &AdminSequence { next_id: next_seq })
            .await?;
        self.persist(&self.file_path(section, Origin::Admin), &records)
            .await?;

        let id = item.id.clone();
        let mut sections = self.index.write().await;
        let entry = sections.entry(section.to_string()).or_default();
        entry.items.push(Stored {
            item,
            origin: Origin::Admin,
        });
        entry.next_admin_seq = next_seq;

        tracing::info!(section, id = %id, "Content added");
        Ok(id)
    }

    /// Merge `patch` into the item. `Ok(false)` when the id is unknown.
    pub async fn edit(
        &self,
        section: &str,
        id: &str,
        patch: ContentPatch,
    ) -> Result<bool, StoreError> {
        let writer = self.writer(section).await;
        let _guard = writer.lock().await;

        let (updated, records) = {
            let sections = self.index.read().await;
            let Some(current) = sections.get(section) else {
                return Ok(false);
            };
            if current.unavailable {
                return Err(StoreError::SectionUnavailable(section.to_string()));
            }
            let Some(pos) = current.find(id) else {
                return Ok(false);
            };

            let mut updated = current.items[pos].clone();
            patch.apply(&mut updated.item);

            let records: Vec<ContentRecord> = current
                .items
                .iter()
                .enumerate()
                .filter(|(_, s)| s.origin == updated.origin)
                .map(|(i, s)| {
                    if i == pos {
                        ContentRecord::from_item(&updated.item)
                    } else {
                        ContentRecord::from_item(&s.item)
                    }
                })
                .collect();
            (updated, records)
        };

        self.persist(&self.file_path(section, updated.origin), &records)
            .await?;

        let mut sections = self.index.write().await;
        if let Some(entry) = sections.get_mut(section) {
            if let Some(pos) = entry.find(id) {
                entry.items[pos] = updated;
            }
        }
        tracing::info!(section, id, "Content edited");
        Ok(true)
    }

    /// Remove the item. `Ok(false)` when the id is unknown.
    pub async fn delete(&self, section: &str, id: &str) -> Result<bool, StoreError> {
        let writer = self.writer(section).await;
        let _guard = writer.lock().await;

        let (origin, records) = {
            let sections = self.index.read().await;
            let Some(current) = sections.get(section) else {
                return Ok(false);
            };
            if current.unavailable {
                return Err(StoreError::SectionUnavailable(section.to_string()));
            }
            let Some(pos) = current.find(id) else {
                return Ok(false);
            };

            let origin = current.items[pos].origin;
            let records: Vec<ContentRecord> = current
                .items
                .iter()
                .enumerate()
                .filter(|(i, s)| *i != pos && s.origin == origin)
                .map(|(_, s)| ContentRecord::from_item(&s.item))
                .collect();
            (origin, records)
        };

        self.persist(&self.file_path(section, origin), &records)
            .await?;

        let mut sections = self.index.write().await;
        if let Some(entry) = sections.get_mut(section) {
            if let Some(pos) = entry.find(id) {
                entry.items.remove(pos);
            }
        }
        tracing::info!(section, id, "Content deleted");
        Ok(true)
    }

    // ── Internals ──────────────────────────────────────────────────

    async fn writer(&self, section: &str) -> Arc<Mutex<()>> {
        let mut writers = self.writers.lock().await;
        writers
            .entry(section.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    fn file_path(&self, section: &str, origin: Origin) -> PathBuf {
        match origin {
            Origin::Bulk => self.dir.join(format!("{}.json", section)),
            Origin::Admin => self.dir.join(format!("{}_admin.json", section)),
        }
    }

    fn sequence_path(&self, section: &str) -> PathBuf {
        self.dir.join(format!("{}_admin.seq.json", section))
    }

    async fn read_section(&self, section: &str) -> Result<Section, LoadError> {
        let mut loaded = Section {
            next_admin_seq: self.read_sequence(section).await,
            ..Section::default()
        };

        for origin in [Origin::Bulk, Origin::Admin] {
            let path = self.file_path(section, origin);
            let Some(records) = read_records(&path).await.map_err(|message| LoadError {
                section: section.to_string(),
                path: path.clone(),
                message,
            })?
            else {
                continue;
            };

            for record in records {
                let item = record.into_item(section);
                if origin == Origin::Admin {
                    if let Some(seq) = item
                        .id
                        .strip_prefix(ADMIN_ID_PREFIX)
                        .and_then(|n| n.parse::<u64>().ok())
                    {
                        loaded.next_admin_seq = loaded.next_admin_seq.max(seq + 1);
                    }
                }
                loaded.items.push(Stored { item, origin });
            }
        }

        Ok(loaded)
    }

    /// Stored high-water mark, or 1. A broken file only loses the mark; the
    /// ids still present in the admin file keep the floor.
    async fn read_sequence(&self, section: &str) -> u64 {
        let path = self.sequence_path(section);
        let raw = match fs::read_to_string(&path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return 1,
            Err(e) => {
                tracing::warn!(path = %path.display(), "Failed to read id sequence: {}", e);
                return 1;
            }
        };
        match serde_json::from_str::<AdminSequence>(&raw) {
            Ok(seq) => seq.next_id.max(1),
            Err(e) => {
                tracing::warn!(path = %path.display(), "Malformed id sequence: {}", e);
                1
            }
        }
    }

    /// Write to a sibling temp file, then rename over the target.
    async fn persist<T>(&self, path: &Path, value: &T) -> Result<(), StoreError>
    where
        T: Serialize + ?Sized,
    {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        let json = serde_json::to_string_pretty(value)?;
        let mut tmp = path.as_os_str().to_owned();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);
        fs::write(&tmp, json).await?;
        if let Err(e) = fs::rename(&tmp, path).await {
            let _ = fs::remove_file(&tmp).await;
            return Err(e.into());
        }
        Ok(())
    }
}

/// `Ok(None)` when the file does not exist.
async fn read_records(path: &Path) -> Result<Option<Vec<ContentRecord>>, String> {
    match fs::read_to_string(path).await {
        Ok(raw) => serde_json::from_str(&raw)
            .map(Some)
            .map_err(|e| format!("malformed JSON: {}", e)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(format!("unreadable: {}", e)),
    }
}

#[cfg(test)]
mod tests {
    use super::models::{MediaKind, MediaRef};
    use super::*;
    use tempfile::TempDir;

    fn sections() -> Vec<String> {
        vec!["caption".to_string(), "bio".to_string()]
    }

    async fn store_with(files: &[(&str, &str)]) -> (TempDir, ContentStore, LoadReport) {
        let dir = tempfile::tempdir().unwrap();
        for (name, body) in files {
            std::fs::write(dir.path().join(name), body).unwrap();
        }
        let store = ContentStore::new(dir.path(), sections());
        let report = store.load().await;
        (dir, store, report)
    }

    #[tokio::test]
    async fn missing_files_give_empty_sections() {
        let (_dir, store, report) = store_with(&[]).await;
        assert!(report.errors.is_empty());
        assert_eq!(store.size("caption").await, 0);
        assert!(store.get("caption", 0).await.is_none());
    }

    #[tokio::test]
    async fn bulk_order_is_file_order() {
        let (_dir, store, _) = store_with(&[(
            "caption.json",
            r#"[{"id": 10, "text": "ten"}, {"id": 2, "text": "two"}]"#,
        )])
        .await;

        assert_eq!(store.size("caption").await, 2);
        assert_eq!(store.get("caption", 0).await.unwrap().text, "ten");
        assert_eq!(store.get("caption", 1).await.unwrap().text, "two");
        assert_eq!(store.get_by_id("caption", "2").await.unwrap().text, "two");
        assert!(store.get("caption", 2).await.is_none());
    }

    #[tokio::test]
    async fn malformed_section_is_skipped_and_read_only() {
        let (_dir, store, report) = store_with(&[
            ("caption.json", "{ not json"),
            ("bio.json", r#"[{"id": "1", "text": "bio"}]"#),
        ])
        .await;

        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].section, "caption");
        assert_eq!(store.size("caption").await, 0);
        assert_eq!(store.size("bio").await, 1);

        let err = store
            .add("caption", NewContent { text: "x".into(), ..Default::default() })
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::SectionUnavailable(_)));
    }

    #[tokio::test]
    async fn added_content_survives_reload_without_touching_bulk_file() {
        let bulk = r#"[{"id": "1", "text": "seed"}]"#;
        let (dir, store, _) = store_with(&[("caption.json", bulk)]).await;

        let media = MediaRef {
            kind: MediaKind::Video,
            locator: "BAACAg".to_string(),
        };
        let id = store
            .add(
                "caption",
                NewContent {
                    text: "fresh".into(),
                    media: Some(media.clone()),
                    extra: None,
                },
            )
            .await
            .unwrap();

        assert_eq!(store.size("caption").await, 2);
        let item = store.get_by_id("caption", &id).await.unwrap();
        assert_eq!(item.text, "fresh");
        assert_eq!(item.media, Some(media.clone()));

        assert_eq!(
            std::fs::read_to_string(dir.path().join("caption.json")).unwrap(),
            bulk
        );

        store.load().await;
        assert_eq!(store.size("caption").await, 2);
        let reloaded = store.get_by_id("caption", &id).await.unwrap();
        assert_eq!(reloaded.text, "fresh");
        assert_eq!(reloaded.media, Some(media));
    }

    #[tokio::test]
    async fn admin_ids_are_never_reused() {
        let (_dir, store, _) = store_with(&[]).await;
        let first = store
            .add("bio", NewContent { text: "a".into(), ..Default::default() })
            .await
            .unwrap();
        assert!(store.delete("bio", &first).await.unwrap());

        let second = store
            .add("bio", NewContent { text: "b".into(), ..Default::default() })
            .await
            .unwrap();
        assert_ne!(first, second);

        store.load().await;
        let third = store
            .add("bio", NewContent { text: "c".into(), ..Default::default() })
            .await
            .unwrap();
        assert_ne!(second, third);
    }

    #[tokio::test]
    async fn deleted_newest_id_stays_retired_after_restart() {
        let (dir, store, _) = store_with(&[]).await;
        let a = store
            .add("bio", NewContent { text: "a".into(), ..Default::default() })
            .await
            .unwrap();
        let b = store
            .add("bio", NewContent { text: "b".into(), ..Default::default() })
            .await
            .unwrap();
        assert!(store.delete("bio", &b).await.unwrap());

        let restarted = ContentStore::new(dir.path(), sections());
        restarted.load().await;
        assert!(restarted.get_by_id("bio", &a).await.is_some());
        let c = restarted
            .add("bio", NewContent { text: "c".into(), ..Default::default() })
            .await
            .unwrap();
        assert_ne!(c, a);
        assert_ne!(c, b);
        assert_eq!(c, "admin-3");
    }

    #[tokio::test]
    async fn edit_then_delete_apply_by_id() {
        let (_dir, store, _) = store_with(&[(
            "bio.json",
            r#"[{"id": "1", "text": "one"}, {"id": "2", "text": "two"}]"#,
        )])
        .await;

        let patch = ContentPatch {
            text: Some("TWO".into()),
            ..Default::default()
        };
        assert!(store.edit("bio", "2", patch).await.unwrap());
        assert!(store.delete("bio", "1").await.unwrap());
        assert_eq!(store.size("bio").await, 1);
        assert_eq!(store.get("bio", 0).await.unwrap().text, "TWO");
    }

    #[tokio::test]
    async fn edit_and_delete_report_unknown_ids() {
        let (_dir, store, _) = store_with(&[]).await;
        assert!(!store
            .edit("bio", "nope", ContentPatch::default())
            .await
            .unwrap());
        assert!(!store.delete("bio", "nope").await.unwrap());
    }

    #[tokio::test]
    async fn editing_bulk_item_rewrites_bulk_file() {
        let (dir, store, _) = store_with(&[(
            "bio.json",
            r#"[{"id": "1", "text": "old"}, {"id": "2", "text": "keep"}]"#,
        )])
        .await;

        let patch = ContentPatch {
            text: Some("new".into()),
            ..Default::default()
        };
        assert!(store.edit("bio", "1", patch).await.unwrap());
        assert!(!dir.path().join("bio_admin.json").exists());

        store.load().await;
        assert_eq!(store.get("bio", 0).await.unwrap().text, "new");
        assert_eq!(store.get("bio", 1).await.unwrap().text, "keep");
    }

    #[tokio::test]
    async fn failed_write_leaves_memory_untouched() {
        let (dir, store, _) = store_with(&[]).await;
        // A directory where the admin file should go makes the rename fail.
        std::fs::create_dir(dir.path().join("caption_admin.json")).unwrap();

        let result = store
            .add("caption", NewContent { text: "x".into(), ..Default::default() })
            .await;
        assert!(result.is_err());
        assert_eq!(store.size("caption").await, 0);
    }

    #[tokio::test]
    async fn concurrent_adds_to_one_section_all_persist() {
        let (_dir, store, _) = store_with(&[]).await;
        let store = Arc::new(store);

        let mut tasks = Vec::new();
        for i in 0..8 {
            let store = store.clone();
            tasks.push(tokio::spawn(async move {
                store
                    .add("caption", NewContent { text: format!("item {}", i), ..Default::default() })
                    .await
                    .unwrap()
            }));
        }
        for task in tasks {
            task.await.unwrap();
        }

        store.load().await;
        assert_eq!(store.size("caption").await, 8);
    }

    #[tokio::test]
    async fn tutorial_and_archive_lookup() {
        let (dir, store, _) = store_with(&[]).await;
        assert!(store.tutorial("template").await.is_none());
        assert!(store.archive_path().is_none());

        std::fs::create_dir(dir.path().join("tutorials")).unwrap();
        std::fs::write(
            dir.path().join("tutorials/template.json"),
            r#"{"text": "how to", "media_path": "vid", "media_type": "video"}"#,
        )
        .unwrap();
        std::fs::write(dir.path().join("all_content.zip"), b"PK").unwrap();

        let tutorial = store.tutorial("template").await.unwrap();
        assert_eq!(tutorial.text, "how to");
        assert_eq!(tutorial.media.unwrap().kind, MediaKind::Video);
        assert!(store.archive_path().is_some());
    }
}
