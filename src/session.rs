//! In-memory conversation sessions.
//!
//! A session keeps the most recent exchanges of one user conversation and
//! renders them as the summary handed to the orchestrator.

use std::collections::HashMap;
use std::sync::Mutex;

use tracing::debug;

/// Default number of exchanges kept per session.
pub const DEFAULT_MAX_HISTORY: usize = 2;

#[derive(Debug, Clone)]
struct Exchange {
    user: String,
    assistant: String,
}

#[derive(Debug, Default)]
struct Sessions {
    counter: u64,
    history: HashMap<String, Vec<Exchange>>,
}

/// Tracks per-session exchange history.
#[derive(Debug)]
pub struct SessionManager {
    max_history: usize,
    inner: Mutex<Sessions>,
}

impl Default for SessionManager {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_HISTORY)
    }
}

impl SessionManager {
    /// Creates a manager keeping `max_history` exchanges per session.
    #[must_use]
    pub fn new(max_history: usize) -> Self {
        Self {
            max_history,
            inner: Mutex::new(Sessions::default()),
        }
    }

    /// Opens a new, empty session and returns its id.
    pub fn create_session(&self) -> String {
        let mut inner = self
            .inner
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        inner.counter += 1;
        let id = format!("session_{}", inner.counter);
        inner.history.insert(id.clone(), Vec::new());
        debug!(session = %id, "session created");
        id
    }

    /// Records one question/answer pair, creating the session if needed.
    pub fn add_exchange(&self, session_id: &str, user: &str, assistant: &str) {
        let mut inner = self
            .inner
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let exchanges = inner.history.entry(session_id.to_string()).or_default();
        exchanges.push(Exchange {
            user: user.to_string(),
            assistant: assistant.to_string(),
        });
        let excess = exchanges.len().saturating_sub(self.max_history);
        exchanges.drain(..excess);
    }

    /// Renders the retained exchanges, oldest first.
    ///
    /// Returns `None` for unknown or empty sessions.
    #[must_use]
    pub fn history(&self, session_id: &str) -> Option<String> {
        let inner = self
            .inner
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let exchanges = inner.history.get(session_id)?;
        if exchanges.is_empty() {
            return None;
        }
        Some(
            exchanges
                .iter()
                .map(|e| format!("User: {}\nAssistant: {}", e.user, e.assistant))
                .collect::<Vec<_>>()
                .join("\n"),
        )
    }

    /// Forgets a session's history.
    pub fn clear_session(&self, session_id: &str) {
        let mut inner = self
            .inner
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        if let Some(exchanges) = inner.history.get_mut(session_id) {
            exchanges.clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_ids_are_sequential() {
        let manager = SessionManager::default();
        assert_eq!(manager.create_session(), "session_1");
        assert_eq!(manager.create_session(), "session_2");
    }

    #[test]
    fn test_new_session_has_no_history() {
        let manager = SessionManager::default();
        let id = manager.create_session();
        assert_eq!(manager.history(&id), None);
        assert_eq!(manager.history("session_unknown"), None);
    }

    #[test]
    fn test_history_format() {
        let manager = SessionManager::default();
        let id = manager.create_session();
        manager.add_exchange(&id, "What is MCP?", "A protocol.");
        assert_eq!(
            manager.history(&id).as_deref(),
            Some("User: What is MCP?\nAssistant: A protocol.")
        );
    }

    #[test]
    fn test_history_keeps_most_recent() {
        let manager = SessionManager::new(2);
        let id = manager.create_session();
        manager.add_exchange(&id, "q1", "a1");
        manager.add_exchange(&id, "q2", "a2");
        manager.add_exchange(&id, "q3", "a3");
        assert_eq!(
            manager.history(&id).as_deref(),
            Some("User: q2\nAssistant: a2\nUser: q3\nAssistant: a3")
        );
    }

    #[test]
    fn test_zero_history_keeps_nothing() {
        let manager = SessionManager::new(0);
        manager.add_exchange("s", "q", "a");
        assert_eq!(manager.history("s"), None);
    }

    #[test]
    fn test_clear_session() {
        let manager = SessionManager::default();
        let id = manager.create_session();
        manager.add_exchange(&id, "q", "a");
        manager.clear_session(&id);
        assert_eq!(manager.history(&id), None);
    }
}
