//! Session subsystem.
//!
//! # Data Flow
//! ```text
//! Request cookie (session id, optional)
//!     → store.rs (load a SessionData snapshot)
//!     → handlers / access checks read and write through `Session`
//!     → store.rs (save snapshot, allocate id on first write)
//!     → Set-Cookie when a session was started during the request
//! ```
//!
//! # Design Decisions
//! - The session is an injected capability, never ambient state
//! - A session starts implicitly on the first `set` or `unset`
//! - Concurrent requests sharing a session are last-writer-wins
//! - A failed dispatch leaves the store untouched
//! - Idle sessions are evicted by `sweeper.rs`

pub mod store;
pub mod sweeper;

use std::collections::HashMap;

use serde_json::Value;

pub use store::MemorySessionStore;
pub use sweeper::SessionSweeper;

/// Key/value session access used by handlers and access checks.
pub trait Session {
    /// Value stored under `name`, or `default`.
    fn get(&self, name: &str, default: Value) -> Value;

    /// Store a value, starting the session if needed.
    fn set(&mut self, name: &str, value: Value);

    /// Remove a value, starting the session if needed.
    fn unset(&mut self, name: &str);
}

/// Per-request session snapshot.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionData {
    id: Option<String>,
    values: HashMap<String, Value>,
    started: bool,
    dirty: bool,
}

impl SessionData {
    /// An existing session loaded from a store.
    pub fn existing(id: String, values: HashMap<String, Value>) -> Self {
        Self {
            id: Some(id),
            values,
            started: false,
            dirty: false,
        }
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// True when this request created the session.
    pub fn was_started(&self) -> bool {
        self.started
    }

    /// True when a value changed during this request.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn values(&self) -> &HashMap<String, Value> {
        &self.values
    }

    fn start(&mut self) {
        if self.id.is_none() {
            self.id = Some(uuid::Uuid::new_v4().to_string());
            self.started = true;
            tracing::debug!("Session started");
        }
    }
}

impl Session for SessionData {
    fn get(&self, name: &str, default: Value) -> Value {
        self.values.get(name).cloned().unwrap_or(default)
    }

    fn set(&mut self, name: &str, value: Value) {
        self.start();
        self.values.insert(name.to_string(), value);
        self.dirty = true;
    }

    fn unset(&mut self, name: &str) {
        self.start();
        self.values.remove(name);
        self.dirty = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_get_returns_default_when_missing() {
        let session = SessionData::default();
        assert_eq!(session.get("user", json!("")), json!(""));
        assert!(session.id().is_none());
    }

    #[test]
    fn test_set_starts_session() {
        let mut session = SessionData::default();
        session.set("user", json!("ann"));
        assert!(session.was_started());
        assert!(session.id().is_some());
        assert_eq!(session.get("user", Value::Null), json!("ann"));
    }

    #[test]
    fn test_unset_starts_session_and_removes() {
        let mut values = HashMap::new();
        values.insert("user".to_string(), json!("ann"));
        let mut session = SessionData::existing("abc".into(), values);

        session.unset("user");
        assert!(!session.was_started());
        assert!(session.is_dirty());
        assert_eq!(session.get("user", Value::Null), Value::Null);

        let mut fresh = SessionData::default();
        fresh.unset("anything");
        assert!(fresh.was_started());
    }
}
