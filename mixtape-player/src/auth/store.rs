//! Authentication store
//!
//! Read from the UI side and from the background token task. A token pair is always
//! written as a unit; concurrent writers resolve last-write-wins.

use std::sync::RwLock;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: DateTime<Utc>,
}

impl TokenPair {
    /// Whether the access token expires within `margin` of `now` (or already has)
    pub fn expires_within(&self, margin: Duration, now: DateTime<Utc>) -> bool {
        self.expires_at - now <= margin
    }
}

pub trait AuthStore: Send + Sync {
    fn tokens(&self) -> Option<TokenPair>;

    fn store_tokens(&self, tokens: TokenPair);

    fn clear(&self);

    fn is_authenticated(&self) -> bool {
        self.tokens().is_some()
    }
}

/// Process-local store
#[derive(Debug, Default)]
pub struct InMemoryAuthStore {
    tokens: RwLock<Option<TokenPair>>,
}

impl InMemoryAuthStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tokens(tokens: TokenPair) -> Self {
        Self {
            tokens: RwLock::new(Some(tokens)),
        }
    }
}

impl AuthStore for InMemoryAuthStore {
    fn tokens(&self) -> Option<TokenPair> {
        self.tokens
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    fn store_tokens(&self, tokens: TokenPair) {
        *self.tokens.write().unwrap_or_else(|e| e.into_inner()) = Some(tokens);
    }

    fn clear(&self) {
        *self.tokens.write().unwrap_or_else(|e| e.into_inner()) = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair(suffix: &str, expires_in_secs: i64) -> TokenPair {
        TokenPair {
            access_token: format!("access-{suffix}"),
            refresh_token: format!("refresh-{suffix}"),
            expires_at: Utc::now() + Duration::seconds(expires_in_secs),
        }
    }

    #[test]
    fn test_store_round_trip_and_clear() {
        let store = InMemoryAuthStore::new();
        assert!(!store.is_authenticated());

        store.store_tokens(pair("a", 3600));
        assert!(store.is_authenticated());
        assert_eq!(store.tokens().unwrap().access_token, "access-a");

        store.store_tokens(pair("b", 3600));
        assert_eq!(store.tokens().unwrap().refresh_token, "refresh-b");

        store.clear();
        assert!(store.tokens().is_none());
    }

    #[test]
    fn test_expires_within_margin() {
        let now = Utc::now();
        let soon = pair("a", 30);
        let later = pair("b", 3600);
        assert!(soon.expires_within(Duration::seconds(60), now));
        assert!(!later.expires_within(Duration::seconds(60), now));
        assert!(pair("c", -10).expires_within(Duration::zero(), now));
    }

    #[test]
    fn test_concurrent_writers_never_tear_pairs() {
        let store = std::sync::Arc::new(InMemoryAuthStore::new());
        let writers: Vec<_> = (0..4)
            .map(|n| {
                let store = std::sync::Arc::clone(&store);
                std::thread::spawn(move || {
                    for _ in 0..200 {
                        store.store_tokens(pair(&n.to_string(), 3600));
                    }
                })
            })
            .collect();
        for _ in 0..200 {
            if let Some(tokens) = store.tokens() {
                let access = tokens.access_token.trim_start_matches("access-");
                let refresh = tokens.refresh_token.trim_start_matches("refresh-");
                assert_eq!(access, refresh);
            }
        }
        for writer in writers {
            writer.join().unwrap();
        }
    }
}
