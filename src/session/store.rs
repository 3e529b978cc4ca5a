//! In-memory session store keyed by session id.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use serde_json::Value;

use crate::session::SessionData;

#[derive(Debug, Clone)]
struct StoredSession {
    values: HashMap<String, Value>,
    touched: Instant,
}

/// Process-wide session storage.
#[derive(Debug, Clone, Default)]
pub struct MemorySessionStore {
    inner: Arc<DashMap<String, StoredSession>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot for a request; unknown or missing ids give an unstarted session.
    pub fn load(&self, id: Option<&str>) -> SessionData {
        let Some(id) = id else {
            return SessionData::default();
        };
        match self.inner.get_mut(id) {
            Some(mut stored) => {
                stored.touched = Instant::now();
                SessionData::existing(id.to_string(), stored.values.clone())
            }
            None => SessionData::default(),
        }
    }

    /// Write a snapshot back if it changed.
    pub fn save(&self, data: &SessionData) {
        let (Some(id), true) = (data.id(), data.is_dirty()) else {
            return;
        };
        self.inner.insert(
            id.to_string(),
            StoredSession {
                values: data.values().clone(),
                touched: Instant::now(),
            },
        );
    }

    /// Drop sessions not loaded or saved within `max_idle`. Returns how many went.
    pub fn evict_idle(&self, max_idle: Duration) -> usize {
        let before = self.inner.len();
        self.inner
            .retain(|_, stored| stored.touched.elapsed() < max_idle);
        before.saturating_sub(self.inner.len())
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::Session;
    use serde_json::json;

    #[test]
    fn test_round_trip_through_store() {
        let store = MemorySessionStore::new();

        let mut first = store.load(None);
        first.set("user", json!("ann"));
        store.save(&first);
        let id = first.id().unwrap().to_string();

        let second = store.load(Some(&id));
        assert_eq!(second.get("user", Value::Null), json!("ann"));
        assert!(!second.was_started());
    }

    #[test]
    fn test_unknown_id_is_fresh() {
        let store = MemorySessionStore::new();
        let data = store.load(Some("nope"));
        assert!(data.id().is_none());
    }

    #[test]
    fn test_clean_session_not_saved() {
        let store = MemorySessionStore::new();
        let data = store.load(None);
        store.save(&data);
        assert!(store.is_empty());
    }

    #[test]
    fn test_clones_share_sessions() {
        let store = MemorySessionStore::new();
        let other = store.clone();

        let mut data = store.load(None);
        data.set("user", json!("ann"));
        store.save(&data);

        assert_eq!(other.len(), 1);
        let loaded = other.load(data.id());
        assert_eq!(loaded.get("user", Value::Null), json!("ann"));
    }

    #[test]
    fn test_evict_idle() {
        let store = MemorySessionStore::new();
        let mut data = store.load(None);
        data.set("user", json!("ann"));
        store.save(&data);

        assert_eq!(store.evict_idle(Duration::from_secs(3600)), 0);
        assert_eq!(store.len(), 1);

        assert_eq!(store.evict_idle(Duration::ZERO), 1);
        assert!(store.is_empty());
        assert!(store.load(data.id()).id().is_none());
    }
}
