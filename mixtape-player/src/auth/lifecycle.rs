//! Background token lifecycle task
//!
//! Each check yields a [`TokenOutcome`]:
//! - `Success`: token still valid, refreshed, or no user signed in (benign skip)
//! - `Failure`: refresh rejected; callers force re-authentication
//! - `Retry`: transient error or refresh still pending
//!
//! [`TokenLifecycleManager::spawn`] runs checks on an interval, backs off on `Retry`
//! and stops at the first `Failure`.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use mixtape_common::events::{EventBus, PlayerEvent, TokenOutcome};
use mixtape_common::time;
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::store::{AuthStore, TokenPair};

/// Why a refresh attempt did not produce tokens
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RefreshError {
    /// Authoritative rejection (revoked or expired refresh token)
    #[error("Refresh rejected: {0}")]
    Rejected(String),

    /// Network or server hiccup
    #[error("Transient refresh error: {0}")]
    Transient(String),

    /// Refresh response was still loading when the check ran
    #[error("Refresh still pending")]
    Pending,
}

/// Network side of token refresh
#[async_trait]
pub trait TokenRefresher: Send + Sync {
    async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, RefreshError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenLifecycleConfig {
    /// Delay between checks while healthy
    pub check_interval: Duration,
    /// Refresh when the access token expires within this window
    pub refresh_margin: chrono::Duration,
    /// First delay after a `Retry`; doubles on each consecutive retry
    pub retry_delay: Duration,
    /// Upper bound for the retry delay
    pub max_retry_delay: Duration,
}

impl Default for TokenLifecycleConfig {
    fn default() -> Self {
        Self {
            check_interval: Duration::from_secs(15 * 60),
            refresh_margin: chrono::Duration::minutes(5),
            retry_delay: Duration::from_secs(5),
            max_retry_delay: Duration::from_secs(5 * 60),
        }
    }
}

pub struct TokenLifecycleManager {
    store: Arc<dyn AuthStore>,
    refresher: Arc<dyn TokenRefresher>,
    config: TokenLifecycleConfig,
    event_bus: Option<EventBus>,
}

impl TokenLifecycleManager {
    pub fn new(
        store: Arc<dyn AuthStore>,
        refresher: Arc<dyn TokenRefresher>,
        config: TokenLifecycleConfig,
    ) -> Self {
        Self {
            store,
            refresher,
            config,
            event_bus: None,
        }
    }

    pub fn with_event_bus(mut self, event_bus: EventBus) -> Self {
        self.event_bus = Some(event_bus);
        self
    }

    /// Run one check
    ///
    /// Authentication is checked before any network call; a signed-out user is a
    /// `Success` so the scheduler does not loop on retries.
    pub async fn check_once(&self) -> TokenOutcome {
        let outcome = self.evaluate().await;
        if let Some(bus) = &self.event_bus {
            bus.emit_lossy(PlayerEvent::TokenCheckCompleted {
                outcome,
                timestamp: time::now(),
            });
        }
        outcome
    }

    async fn evaluate(&self) -> TokenOutcome {
        if !self.store.is_authenticated() {
            debug!("No signed-in user, token check skipped");
            return TokenOutcome::Success;
        }
        let Some(tokens) = self.store.tokens() else {
            debug!("Signed-out between checks, token check skipped");
            return TokenOutcome::Success;
        };

        if !tokens.expires_within(self.config.refresh_margin, time::now()) {
            debug!(expires_at = %tokens.expires_at, "Access token still valid");
            return TokenOutcome::Success;
        }

        match self.refresher.refresh(&tokens.refresh_token).await {
            Ok(refreshed) => {
                if !self.store.is_authenticated() {
                    // User signed out while the refresh was in flight
                    info!("Discarding refreshed tokens for signed-out user");
                    return TokenOutcome::Success;
                }
                info!(expires_at = %refreshed.expires_at, "Access token refreshed");
                self.store.store_tokens(refreshed);
                TokenOutcome::Success
            }
            Err(RefreshError::Rejected(reason)) => {
                warn!(%reason, "Token refresh rejected, re-authentication required");
                TokenOutcome::Failure
            }
            Err(e @ RefreshError::Transient(_)) | Err(e @ RefreshError::Pending) => {
                warn!(error = %e, "Token refresh will be retried");
                TokenOutcome::Retry
            }
        }
    }

    /// Run checks in the background until one fails
    ///
    /// The first check runs immediately. The returned handle resolves to the terminating
    /// `Failure`; abort it to stop the task earlier.
    pub fn spawn(self: Arc<Self>) -> JoinHandle<TokenOutcome> {
        tokio::spawn(async move {
            info!(
                interval_ms = self.config.check_interval.as_millis() as u64,
                "Token lifecycle task started"
            );
            let mut retry_delay = self.config.retry_delay;
            loop {
                let delay = match self.check_once().await {
                    TokenOutcome::Success => {
                        retry_delay = self.config.retry_delay;
                        self.config.check_interval
                    }
                    TokenOutcome::Retry => {
                        let delay = retry_delay.min(self.config.max_retry_delay);
                        retry_delay = (retry_delay * 2).min(self.config.max_retry_delay);
                        debug!(delay_ms = delay.as_millis() as u64, "Token check backing off");
                        delay
                    }
                    TokenOutcome::Failure => {
                        info!("Token lifecycle task stopped after rejected refresh");
                        return TokenOutcome::Failure;
                    }
                };
                tokio::time::sleep(delay).await;
            }
        })
    }
}
