//! Free-tier quotas and VIP-only sections.

use std::collections::{HashMap, HashSet};

use crate::menu;
use crate::users::UserState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    VipOnly,
    LimitReached,
}

impl DenyReason {
    pub fn message(&self) -> &'static str {
        match self {
            Self::VipOnly => menu::VIP_ONLY,
            Self::LimitReached => menu::LIMIT_REACHED,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Allowed,
    Denied(DenyReason),
}

#[derive(Debug, Clone)]
pub struct AccessPolicy {
    free_limits: HashMap<String, u32>,
    locked: HashSet<String>,
}

impl AccessPolicy {
    pub fn new(
        free_limits: impl IntoIterator<Item = (String, u32)>,
        locked: impl IntoIterator<Item = String>,
    ) -> Self {
        Self {
            free_limits: free_limits.into_iter().collect(),
            locked: locked.into_iter().collect(),
        }
    }

    /// The catalogue defaults with `free_limit` items per limited section.
    pub fn with_free_limit(free_limit: u32) -> Self {
        Self::new(
            menu::LIMITED_SECTIONS
                .iter()
                .map(|s| (s.to_string(), free_limit)),
            menu::LOCKED_SECTIONS.iter().map(|s| s.to_string()),
        )
    }

    /// Counter a section is billed against. Both template kinds share one quota.
    pub fn quota_key(section: &str) -> &str {
        match section {
            "text_template" | "image_template" => "template",
            other => other,
        }
    }

    pub fn can_access(&self, user: &UserState, section: &str) -> Access {
        if user.is_vip() {
            return Access::Allowed;
        }
        if self.locked.contains(section) {
            return Access::Denied(DenyReason::VipOnly);
        }
        let key = Self::quota_key(section);
        match self.free_limits.get(key) {
            Some(&limit) if user.usage_count(key) >= limit => {
                Access::Denied(DenyReason::LimitReached)
            }
            _ => Access::Allowed,
        }
    }

    /// Count one delivered item. No-op for VIPs and unlimited sections.
    pub fn record_usage(&self, user: &mut UserState, section: &str) {
        if user.is_vip() {
            return;
        }
        let key = Self::quota_key(section);
        if self.free_limits.contains_key(key) {
            user.increment_usage(key);
        }
    }
}

impl Default for AccessPolicy {
    fn default() -> Self {
        Self::with_free_limit(3)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn vip_bypasses_everything() {
        let policy = AccessPolicy::default();
        let mut user = UserState::new(1);
        for _ in 0..10 {
            user.increment_usage("caption");
        }
        user.grant_vip("code", Utc::now());

        for section in menu::CONTENT_SECTIONS.iter().chain(menu::LOCKED_SECTIONS) {
            assert_eq!(policy.can_access(&user, section), Access::Allowed, "{}", section);
        }
    }

    #[test]
    fn locked_section_denies_free_user() {
        let policy = AccessPolicy::default();
        let user = UserState::new(1);
        assert_eq!(
            policy.can_access(&user, "roadmap"),
            Access::Denied(DenyReason::VipOnly)
        );
    }

    #[test]
    fn limit_denial_is_idempotent() {
        let policy = AccessPolicy::with_free_limit(2);
        let mut user = UserState::new(1);

        for _ in 0..2 {
            assert_eq!(policy.can_access(&user, "caption"), Access::Allowed);
            policy.record_usage(&mut user, "caption");
        }
        for _ in 0..3 {
            assert_eq!(
                policy.can_access(&user, "caption"),
                Access::Denied(DenyReason::LimitReached)
            );
        }
        assert_eq!(user.usage_count("caption"), 2);
    }

    #[test]
    fn templates_share_one_quota() {
        let policy = AccessPolicy::with_free_limit(1);
        let mut user = UserState::new(1);
        policy.record_usage(&mut user, "text_template");
        assert_eq!(
            policy.can_access(&user, "image_template"),
            Access::Denied(DenyReason::LimitReached)
        );
    }

    #[test]
    fn unlimited_sections_are_not_counted() {
        let policy = AccessPolicy::default();
        let mut user = UserState::new(1);
        policy.record_usage(&mut user, "complete_idea");
        assert_eq!(user.usage_count("complete_idea"), 0);
        assert_eq!(policy.can_access(&user, "complete_idea"), Access::Allowed);
    }
}
