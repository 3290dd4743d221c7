use super::storage::{SessionStorage, KEY_ACCESS_TOKEN, KEY_REFRESH_TOKEN, KEY_TOKEN_EXPIRATION};
use crate::types::Session;
use chrono::{DateTime, TimeZone, Utc};
use std::sync::{Arc, PoisonError, RwLock};

/// Typed view over the persisted session fields. Reads go through to storage
/// every time; the only cross-key state is the lock that keeps compound reads
/// from observing a new token paired with a stale expiry.
#[derive(Clone)]
pub struct SessionStore {
    storage: Arc<dyn SessionStorage>,
    guard: Arc<RwLock<()>>,
}

impl SessionStore {
    pub fn new(storage: Arc<dyn SessionStorage>) -> Self {
        Self {
            storage,
            guard: Arc::new(RwLock::new(())),
        }
    }

    fn get_trimmed(&self, key: &str) -> Option<String> {
        let value = self.storage.get(key)?;
        let trimmed = value.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    }

    pub fn session(&self) -> Option<Session> {
        let _guard = self.guard.read().unwrap_or_else(PoisonError::into_inner);
        let access_token = self.get_trimmed(KEY_ACCESS_TOKEN)?;
        let refresh_token = self.get_trimmed(KEY_REFRESH_TOKEN)?;
        let millis: i64 = self.get_trimmed(KEY_TOKEN_EXPIRATION)?.parse().ok()?;
        let expires_at = Utc.timestamp_millis_opt(millis).single()?;
        Some(Session {
            access_token,
            refresh_token,
            expires_at,
        })
    }

    pub fn access_token(&self) -> Option<String> {
        let _guard = self.guard.read().unwrap_or_else(PoisonError::into_inner);
        self.get_trimmed(KEY_ACCESS_TOKEN)
    }

    pub fn refresh_token(&self) -> Option<String> {
        let _guard = self.guard.read().unwrap_or_else(PoisonError::into_inner);
        self.get_trimmed(KEY_REFRESH_TOKEN)
    }

    /// Called by the host at login. Everything after this point is driven by
    /// the refresh coordinator.
    pub fn install(&self, session: &Session) {
        let _guard = self.guard.write().unwrap_or_else(PoisonError::into_inner);
        self.storage.set(KEY_ACCESS_TOKEN, &session.access_token);
        self.storage.set(KEY_REFRESH_TOKEN, &session.refresh_token);
        self.storage.set(
            KEY_TOKEN_EXPIRATION,
            &session.expires_at.timestamp_millis().to_string(),
        );
    }

    /// Replace the access token and expiry in one step. The refresh token is
    /// left untouched; the renewal endpoint does not rotate it.
    pub fn apply_refresh(&self, access_token: &str, expires_at: DateTime<Utc>) {
        let _guard = self.guard.write().unwrap_or_else(PoisonError::into_inner);
        self.storage.set(KEY_ACCESS_TOKEN, access_token);
        self.storage
            .set(KEY_TOKEN_EXPIRATION, &expires_at.timestamp_millis().to_string());
    }

    pub fn clear(&self) {
        let _guard = self.guard.write().unwrap_or_else(PoisonError::into_inner);
        self.storage.remove(KEY_ACCESS_TOKEN);
        self.storage.remove(KEY_REFRESH_TOKEN);
        self.storage.remove(KEY_TOKEN_EXPIRATION);
    }
}
