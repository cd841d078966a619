use std::collections::HashMap;
use std::time::{Duration, Instant};

/// License answers keyed by code, each valid for `ttl`.
/// When full, the oldest entry makes room.
#[derive(Debug)]
pub struct LicenseCache {
    ttl: Duration,
    max_size: usize,
    entries: HashMap<String, (bool, Instant)>,
}

impl LicenseCache {
    pub fn new(ttl: Duration, max_size: usize) -> Self {
        Self {
            ttl,
            max_size,
            entries: HashMap::new(),
        }
    }

    pub fn get(&mut self, code: &str, now: Instant) -> Option<bool> {
        match self.entries.get(code) {
            Some(&(valid, stored)) if now.duration_since(stored) < self.ttl => Some(valid),
            Some(_) => {
                self.entries.remove(code);
                None
            }
            None => None,
        }
    }

    pub fn insert(&mut self, code: &str, valid: bool, now: Instant) {
        if self.max_size == 0 {
            return;
        }
        if !self.entries.contains_key(code) && self.entries.len() >= self.max_size {
            self.entries.retain(|_, (_, stored)| now.duration_since(*stored) < self.ttl);
            if self.entries.len() >= self.max_size {
                if let Some(oldest) = self
                    .entries
                    .iter()
                    .min_by_key(|(_, (_, stored))| *stored)
                    .map(|(k, _)| k.clone())
                {
                    self.entries.remove(&oldest);
                }
            }
        }
        self.entries.insert(code.to_string(), (valid, now));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entries_expire_after_ttl() {
        let mut cache = LicenseCache::new(Duration::from_secs(60), 10);
        let t0 = Instant::now();
        cache.insert("A", true, t0);

        assert_eq!(cache.get("A", t0 + Duration::from_secs(59)), Some(true));
        assert_eq!(cache.get("A", t0 + Duration::from_secs(61)), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn oldest_entry_is_evicted_when_full() {
        let mut cache = LicenseCache::new(Duration::from_secs(600), 2);
        let t0 = Instant::now();
        cache.insert("A", true, t0);
        cache.insert("B", false, t0 + Duration::from_secs(1));
        cache.insert("C", true, t0 + Duration::from_secs(2));

        let now = t0 + Duration::from_secs(3);
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get("A", now), None);
        assert_eq!(cache.get("B", now), Some(false));
        assert_eq!(cache.get("C", now), Some(true));
    }

    #[test]
    fn zero_capacity_disables_caching() {
        let mut cache = LicenseCache::new(Duration::from_secs(600), 0);
        let t0 = Instant::now();
        cache.insert("A", true, t0);
        assert_eq!(cache.get("A", t0), None);
    }
}
