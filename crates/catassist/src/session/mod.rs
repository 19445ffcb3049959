//! Bearer-token sessions with per-entry TTL.

use dashmap::DashMap;
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::time::{Duration, Instant};

const TOKEN_LEN: usize = 32;

/// A key derived from a bearer token; the raw token is never kept.
#[derive(Debug, Clone, Hash, Eq, PartialEq)]
pub struct SessionKey(String);

impl SessionKey {
    /// Creates a session key by hashing a bearer token.
    pub fn from_token(token: &str) -> Self {
        let digest = Sha256::digest(token.as_bytes());
        // First 16 bytes are plenty for a lookup key
        let hash = digest[..16].iter().map(|b| format!("{:02x}", b)).collect();
        Self(hash)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SessionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}...", &self.0[..8.min(self.0.len())])
    }
}

/// Who a session belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub email: String,
    pub name: String,
}

#[derive(Clone)]
struct SessionEntry {
    identity: Identity,
    opened_at: Instant,
    ttl: Duration,
}

impl SessionEntry {
    fn is_expired(&self) -> bool {
        self.opened_at.elapsed() >= self.ttl
    }
}

/// Thread-safe store of open sessions.
pub struct SessionStore {
    entries: DashMap<SessionKey, SessionEntry>,
    default_ttl: Duration,
}

impl SessionStore {
    pub fn new(default_ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            default_ttl,
        }
    }

    /// Opens a session for `identity` and returns the bearer token for it.
    pub fn open(&self, identity: Identity) -> String {
        self.open_with_ttl(identity, self.default_ttl)
    }

    /// Expired sessions are swept first, so tokens that are never read again
    /// do not pile up.
    pub fn open_with_ttl(&self, identity: Identity, ttl: Duration) -> String {
        self.cleanup_expired();

        let token = generate_token();
        self.entries.insert(
            SessionKey::from_token(&token),
            SessionEntry {
                identity,
                opened_at: Instant::now(),
                ttl,
            },
        );
        token
    }

    /// Looks up the identity behind a token, dropping the session if it expired.
    pub fn get(&self, token: &str) -> Option<Identity> {
        let key = SessionKey::from_token(token);
        self.entries.get(&key).and_then(|entry| {
            if !entry.is_expired() {
                Some(entry.identity.clone())
            } else {
                drop(entry);
                self.entries.remove(&key);
                None
            }
        })
    }

    /// Closes a session. Returns false if no such session was open.
    pub fn close(&self, token: &str) -> bool {
        self.entries
            .remove(&SessionKey::from_token(token))
            .is_some()
    }

    /// Returns the number of sessions, including expired ones.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn cleanup_expired(&self) {
        self.entries.retain(|_, entry| !entry.is_expired());
    }

    pub fn stats(&self) -> SessionStats {
        let mut total = 0;
        let mut expired = 0;

        for entry in self.entries.iter() {
            total += 1;
            if entry.is_expired() {
                expired += 1;
            }
        }

        SessionStats {
            total_sessions: total,
            expired_sessions: expired,
            active_sessions: total - expired,
        }
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(Duration::from_secs(60 * 60))
    }
}

/// Session store statistics for monitoring.
#[derive(Debug, Clone, Serialize)]
pub struct SessionStats {
    pub total_sessions: usize,
    pub expired_sessions: usize,
    pub active_sessions: usize,
}

fn generate_token() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(TOKEN_LEN)
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alice() -> Identity {
        Identity {
            email: "alice@example.com".into(),
            name: "Alice Johnson".into(),
        }
    }

    #[test]
    fn test_session_key_hashing() {
        let key1 = SessionKey::from_token("token123");
        let key2 = SessionKey::from_token("token123");
        let key3 = SessionKey::from_token("token456");

        assert_eq!(key1, key2);
        assert_ne!(key1, key3);
        assert_eq!(key1.as_str().len(), 32);
        assert!(!key1.as_str().contains("token"));
    }

    #[test]
    fn test_open_and_get() {
        let store = SessionStore::default();
        let token = store.open(alice());

        assert_eq!(token.len(), TOKEN_LEN);
        assert!(token.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_eq!(store.get(&token), Some(alice()));
        assert_eq!(store.get("not-a-token"), None);
    }

    #[test]
    fn test_close() {
        let store = SessionStore::default();
        let token = store.open(alice());

        assert!(store.close(&token));
        assert!(!store.close(&token));
        assert_eq!(store.get(&token), None);
    }

    #[test]
    fn test_expired_sessions_are_dropped() {
        let store = SessionStore::default();
        let live = store.open(alice());
        let stale = store.open_with_ttl(alice(), Duration::ZERO);

        let stats = store.stats();
        assert_eq!(stats.total_sessions, 2);
        assert_eq!(stats.expired_sessions, 1);
        assert_eq!(stats.active_sessions, 1);

        assert_eq!(store.get(&stale), None);
        assert_eq!(store.len(), 1);

        store.open_with_ttl(alice(), Duration::ZERO);
        store.cleanup_expired();
        assert_eq!(store.len(), 1);
        assert!(store.get(&live).is_some());
    }

    #[test]
    fn test_open_sweeps_abandoned_sessions() {
        let store = SessionStore::default();
        store.open_with_ttl(alice(), Duration::ZERO);
        store.open_with_ttl(alice(), Duration::ZERO);
        assert_eq!(store.len(), 1);

        let live = store.open(alice());

        assert_eq!(store.len(), 1);
        assert_eq!(store.stats().expired_sessions, 0);
        assert!(store.get(&live).is_some());
    }
}
