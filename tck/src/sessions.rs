//! Per-session SDK clients.

use dashmap::DashMap;
use hiero_sdk::Client;

/// Session used when a request carries no `sessionId`.
pub const DEFAULT_SESSION: &str = "default";

/// Clients keyed by session id. Safe to share between request handlers.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    clients: DashMap<String, Client>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `client` under `session_id`, returning any client it replaced.
    pub fn create(&self, session_id: &str, client: Client) -> Option<Client> {
        self.clients.insert(session_id.to_owned(), client)
    }

    pub fn get(&self, session_id: &str) -> Option<Client> {
        self.clients.get(session_id).map(|entry| entry.value().clone())
    }

    /// Forgets the session. `false` if there was nothing to forget.
    pub fn drop(&self, session_id: &str) -> bool {
        self.clients.remove(session_id).is_some()
    }

    pub fn len(&self) -> usize {
        self.clients.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_replace_and_drop() {
        let sessions = SessionRegistry::new();
        assert!(sessions.create("a", Client::for_testnet()).is_none());
        assert!(sessions.create("a", Client::for_mainnet()).is_some());
        assert_eq!(sessions.len(), 1);
        assert!(sessions.get("a").is_some());

        assert!(sessions.drop("a"));
        assert!(!sessions.drop("a"));
        assert!(sessions.get("a").is_none());
        assert_eq!(sessions.len(), 0);
    }
}
