use super::policy;
use crate::config::Config;
use crate::events::{InvalidationReason, SessionEvent, SessionEvents};
use crate::redact::redact_secrets;
use crate::state::SessionStore;
use crate::types::{RefreshTokenRequest, RefreshTokenResponse};
use chrono::{Duration, Utc};
use thiserror::Error;
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, warn};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RefreshError {
    /// The renewal call never completed. The old token stays in place until
    /// the next trigger.
    #[error("network error during token refresh: {0}")]
    Network(String),
    /// The renewal endpoint turned the refresh token down. The session is
    /// gone.
    #[error("renewal endpoint rejected the refresh token ({status})")]
    Rejected { status: u16 },
    #[error("no refresh token in session storage")]
    MissingSession,
    #[error("in-flight refresh ended without an outcome")]
    Interrupted,
}

type RefreshOutcome = Result<String, RefreshError>;

/// Keeps the session's access token usable for all callers. At most one
/// refresh is in flight per session; concurrent triggers fan in and await the
/// same outcome.
pub struct RefreshCoordinator {
    http: reqwest::Client,
    config: Config,
    store: SessionStore,
    events: SessionEvents,
    in_flight: Mutex<Option<broadcast::Sender<RefreshOutcome>>>,
}

impl RefreshCoordinator {
    pub fn new(
        http: reqwest::Client,
        config: Config,
        store: SessionStore,
        events: SessionEvents,
    ) -> Self {
        Self {
            http,
            config,
            store,
            events,
            in_flight: Mutex::new(None),
        }
    }

    /// Exchange the stored refresh token for a new access token, returning
    /// the new token. Callers arriving while a refresh is in flight await
    /// that refresh instead of starting another.
    pub async fn refresh(&self) -> RefreshOutcome {
        let mut rx = {
            let mut slot = self.in_flight.lock().await;
            match slot.as_ref() {
                Some(tx) => {
                    debug!("refresh already in flight, awaiting shared outcome");
                    tx.subscribe()
                }
                None => {
                    let (tx, _) = broadcast::channel(1);
                    *slot = Some(tx);
                    drop(slot);

                    let outcome = self.refresh_inner().await;

                    // Followers subscribed while the slot was held, so every
                    // one of them sees this send.
                    let mut slot = self.in_flight.lock().await;
                    if let Some(tx) = slot.take() {
                        let _ = tx.send(outcome.clone());
                    }
                    return outcome;
                }
            }
        };
        match rx.recv().await {
            Ok(outcome) => outcome,
            Err(_) => Err(RefreshError::Interrupted),
        }
    }

    /// Proactive path: refresh only when the stored token is near expiry.
    /// Returns whether a refresh was performed.
    pub async fn refresh_if_near_expiry(&self) -> Result<bool, RefreshError> {
        let Some(session) = self.store.session() else {
            debug!("no session present, skipping expiry check");
            return Ok(false);
        };
        if !policy::near_expiry(session.expires_at, Utc::now(), self.config.expiry_margin) {
            return Ok(false);
        }
        debug!("access token near expiry, refreshing");
        self.refresh().await.map(|_| true)
    }

    async fn refresh_inner(&self) -> RefreshOutcome {
        let Some(refresh_token) = self.store.refresh_token() else {
            warn!("refresh requested without a stored refresh token");
            self.invalidate(InvalidationReason::MissingCredentials);
            return Err(RefreshError::MissingSession);
        };

        let body = RefreshTokenRequest { refresh_token };
        let res = self
            .http
            .post(self.config.refresh_url())
            .json(&body)
            .send()
            .await;

        let res = match res {
            Ok(res) => res,
            Err(e) => {
                let msg = redact_secrets(&e.to_string()).to_string();
                warn!(error = %msg, "transient network failure during token refresh");
                return Err(RefreshError::Network(msg));
            }
        };

        if !res.status().is_success() {
            let status = res.status().as_u16();
            warn!(%status, "renewal endpoint rejected the refresh token");
            self.invalidate(InvalidationReason::RefreshRejected);
            return Err(RefreshError::Rejected { status });
        }

        let parsed: RefreshTokenResponse = match res.json().await {
            Ok(parsed) => parsed,
            Err(e) => {
                let msg = redact_secrets(&e.to_string()).to_string();
                warn!(error = %msg, "unreadable renewal response");
                return Err(RefreshError::Network(msg));
            }
        };

        let expires_at = Utc::now() + Duration::seconds(parsed.expires_in);
        self.store.apply_refresh(&parsed.access_token, expires_at);
        debug!(%expires_at, "access token refreshed");
        self.events.emit(SessionEvent::TokenRefreshed);
        Ok(parsed.access_token)
    }

    fn invalidate(&self, reason: InvalidationReason) {
        self.store.clear();
        self.events.emit(SessionEvent::SessionInvalidated { reason });
    }
}
