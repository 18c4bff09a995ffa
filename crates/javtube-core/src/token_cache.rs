//! Process-wide cache of archive credentials
//!
//! Created once by whoever owns the scraper (the HTTP facade at startup)
//! and shared through an `Arc`. Entries are advisory: concurrent writers
//! race with last-write-wins, and an empty read just means the caller
//! fetches a fresh pair. Cleared on authentication failures, and
//! optionally expired after a TTL.

use std::time::{Duration, Instant};

use tokio::sync::RwLock;
use tracing::debug;

use crate::types::AuthToken;

struct Entry {
    token: AuthToken,
    stored_at: Instant,
}

/// Injectable `{csrfToken, sessionCookie}` cache
pub struct AuthTokenCache {
    entry: RwLock<Option<Entry>>,
    ttl: Option<Duration>,
}

impl AuthTokenCache {
    /// A cache whose entries live until cleared
    pub fn new() -> Self {
        Self {
            entry: RwLock::new(None),
            ttl: None,
        }
    }

    /// A cache whose entries read as empty once older than `ttl`
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            entry: RwLock::new(None),
            ttl: Some(ttl),
        }
    }

    pub fn ttl(&self) -> Option<Duration> {
        self.ttl
    }

    /// Returns the cached pair unless absent or expired
    pub async fn get(&self) -> Option<AuthToken> {
        let guard = self.entry.read().await;
        let entry = guard.as_ref()?;
        if let Some(ttl) = self.ttl
            && entry.stored_at.elapsed() >= ttl
        {
            debug!("cached archive token expired");
            return None;
        }
        Some(entry.token.clone())
    }

    /// Replaces the cached pair
    pub async fn store(&self, token: AuthToken) {
        *self.entry.write().await = Some(Entry {
            token,
            stored_at: Instant::now(),
        });
    }

    /// Drops the cached pair
    pub async fn clear(&self) {
        *self.entry.write().await = None;
    }

    pub async fn is_empty(&self) -> bool {
        self.get().await.is_none()
    }
}

impl Default for AuthTokenCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token(csrf: &str) -> AuthToken {
        AuthToken {
            csrf_token: csrf.to_string(),
            session_cookie: "session=1".to_string(),
        }
    }

    #[tokio::test]
    async fn test_cache_starts_empty() {
        let cache = AuthTokenCache::new();
        assert!(cache.is_empty().await);
        assert_eq!(cache.get().await, None);
    }

    #[tokio::test]
    async fn test_store_and_get() {
        let cache = AuthTokenCache::new();
        cache.store(token("a")).await;
        assert_eq!(cache.get().await, Some(token("a")));
    }

    #[tokio::test]
    async fn test_last_write_wins() {
        let cache = AuthTokenCache::new();
        cache.store(token("a")).await;
        cache.store(token("b")).await;
        assert_eq!(cache.get().await.unwrap().csrf_token, "b");
    }

    #[tokio::test]
    async fn test_clear() {
        let cache = AuthTokenCache::new();
        cache.store(token("a")).await;
        cache.clear().await;
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn test_ttl_expiry() {
        let cache = AuthTokenCache::with_ttl(Duration::from_millis(20));
        cache.store(token("a")).await;
        assert!(!cache.is_empty().await);

        tokio::time::sleep(Duration::from_millis(40)).await;
        assert!(cache.is_empty().await);
    }
}
