//! Per-user conversation record and the repository it lives in.

use std::collections::{BTreeSet, HashMap};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::content::models::MediaRef;

/// Where a user is in the conversation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StateTag {
    #[default]
    Idle,
    AwaitingLicense,
    AwaitingTopic,
    Chatting,
    AdminAwaitingSection,
    AdminAwaitingContent,
    AdminAwaitingMediaChoice,
    AdminAwaitingMedia,
    AdminAwaitingSaveConfirmation,
    AdminAwaitingEditId,
    AdminAwaitingEditText,
    AdminAwaitingDeleteId,
}

impl StateTag {
    pub fn is_admin_flow(&self) -> bool {
        matches!(
            self,
            Self::AdminAwaitingSection
                | Self::AdminAwaitingContent
                | Self::AdminAwaitingMediaChoice
                | Self::AdminAwaitingMedia
                | Self::AdminAwaitingSaveConfirmation
                | Self::AdminAwaitingEditId
                | Self::AdminAwaitingEditText
                | Self::AdminAwaitingDeleteId
        )
    }
}

/// An admin's half-finished submission.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PendingSubmission {
    pub section: String,
    pub text: Option<String>,
    pub media: Option<MediaRef>,
    /// Item being edited, once its id has been given.
    pub target_id: Option<String>,
}

impl PendingSubmission {
    pub fn for_section(section: &str) -> Self {
        Self {
            section: section.to_string(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserState {
    pub user_id: i64,
    is_vip: bool,
    vip_since: Option<DateTime<Utc>>,
    license_code: Option<String>,
    usage_counts: HashMap<String, u32>,
    current_section: Option<String>,
    current_index: HashMap<String, usize>,
    favorites: BTreeSet<String>,
    state: StateTag,
    pending: Option<PendingSubmission>,
}

impl UserState {
    pub fn new(user_id: i64) -> Self {
        Self {
            user_id,
            is_vip: false,
            vip_since: None,
            license_code: None,
            usage_counts: HashMap::new(),
            current_section: None,
            current_index: HashMap::new(),
            favorites: BTreeSet::new(),
            state: StateTag::Idle,
            pending: None,
        }
    }

    // ── VIP ────────────────────────────────────────────────────────

    pub fn is_vip(&self) -> bool {
        self.is_vip
    }

    pub fn vip_since(&self) -> Option<DateTime<Utc>> {
        self.vip_since
    }

    pub fn license_code(&self) -> Option<&str> {
        self.license_code.as_deref()
    }

    /// Grant VIP after a verified license. The first grant time is kept.
    pub fn grant_vip(&mut self, license_code: &str, at: DateTime<Utc>) {
        if !self.is_vip {
            self.vip_since = Some(at);
        }
        self.is_vip = true;
        self.license_code = Some(license_code.to_string());
    }

    // ── Usage ──────────────────────────────────────────────────────

    pub fn usage_count(&self, key: &str) -> u32 {
        self.usage_counts.get(key).copied().unwrap_or(0)
    }

    pub fn increment_usage(&mut self, key: &str) {
        *self.usage_counts.entry(key.to_string()).or_insert(0) += 1;
    }

    // ── Position ───────────────────────────────────────────────────

    pub fn current_section(&self) -> Option<&str> {
        self.current_section.as_deref()
    }

    pub fn current_index(&self, section: &str) -> usize {
        self.current_index.get(section).copied().unwrap_or(0)
    }

    pub fn set_position(&mut self, section: &str, index: usize) {
        self.current_section = Some(section.to_string());
        self.current_index.insert(section.to_string(), index);
    }

    // ── Favorites ──────────────────────────────────────────────────

    pub fn favorites(&self) -> &BTreeSet<String> {
        &self.favorites
    }

    /// Returns true if the key is now a favorite.
    pub fn toggle_favorite(&mut self, key: &str) -> bool {
        if self.favorites.remove(key) {
            false
        } else {
            self.favorites.insert(key.to_string());
            true
        }
    }

    // ── Conversation ───────────────────────────────────────────────

    pub fn state(&self) -> StateTag {
        self.state
    }

    pub fn set_state(&mut self, state: StateTag) {
        self.state = state;
    }

    pub fn pending(&self) -> Option<&PendingSubmission> {
        self.pending.as_ref()
    }

    pub fn pending_mut(&mut self) -> Option<&mut PendingSubmission> {
        self.pending.as_mut()
    }

    pub fn start_submission(&mut self, pending: PendingSubmission) {
        self.pending = Some(pending);
    }

    pub fn take_pending(&mut self) -> Option<PendingSubmission> {
        self.pending.take()
    }

    /// Back to `Idle`, dropping any pending submission.
    pub fn reset(&mut self) {
        self.state = StateTag::Idle;
        self.pending = None;
    }
}

/// Storage for user state, keyed by Telegram user id.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Fetch the user's state, creating a fresh record on first sight.
    async fn load(&self, user_id: i64) -> anyhow::Result<UserState>;

    async fn save(&self, state: &UserState) -> anyhow::Result<()>;
}

/// Process-lifetime store. State is lost on restart.
#[derive(Default)]
pub struct MemoryUserRepository {
    users: RwLock<HashMap<i64, UserState>>,
}

impl MemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn user_count(&self) -> usize {
        self.users.read().await.len()
    }
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn load(&self, user_id: i64) -> anyhow::Result<UserState> {
        if let Some(state) = self.users.read().await.get(&user_id) {
            return Ok(state.clone());
        }
        let mut users = self.users.write().await;
        Ok(users
            .entry(user_id)
            .or_insert_with(|| UserState::new(user_id))
            .clone())
    }

    async fn save(&self, state: &UserState) -> anyhow::Result<()> {
        self.users
            .write()
            .await
            .insert(state.user_id, state.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grant_vip_keeps_first_timestamp() {
        let mut user = UserState::new(1);
        let first = Utc::now();
        user.grant_vip("AAA", first);
        user.grant_vip("BBB", first + chrono::Duration::hours(1));

        assert!(user.is_vip());
        assert_eq!(user.vip_since(), Some(first));
        assert_eq!(user.license_code(), Some("BBB"));
    }

    #[test]
    fn favorites_toggle() {
        let mut user = UserState::new(1);
        assert!(user.toggle_favorite("caption/1"));
        assert!(user.favorites().contains("caption/1"));
        assert!(!user.toggle_favorite("caption/1"));
        assert!(user.favorites().is_empty());
    }

    #[test]
    fn reset_drops_pending() {
        let mut user = UserState::new(1);
        user.set_state(StateTag::AdminAwaitingContent);
        user.start_submission(PendingSubmission::for_section("bio"));
        user.reset();
        assert_eq!(user.state(), StateTag::Idle);
        assert!(user.pending().is_none());
    }

    #[test]
    fn state_round_trips_through_json() {
        let mut user = UserState::new(5);
        user.increment_usage("caption");
        user.set_position("caption", 2);
        user.set_state(StateTag::AwaitingTopic);

        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(json["state"], "awaiting_topic");
        let back: UserState = serde_json::from_value(json).unwrap();
        assert_eq!(back, user);
    }

    #[tokio::test]
    async fn memory_repository_creates_lazily_and_isolates_users() {
        let repo = MemoryUserRepository::new();
        let mut alice = repo.load(1).await.unwrap();
        assert_eq!(alice, UserState::new(1));
        assert_eq!(repo.user_count().await, 1);

        alice.increment_usage("bio");
        repo.save(&alice).await.unwrap();

        assert_eq!(repo.load(1).await.unwrap().usage_count("bio"), 1);
        assert_eq!(repo.load(2).await.unwrap().usage_count("bio"), 0);
    }
}
