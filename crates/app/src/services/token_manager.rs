//! Token lifecycle — cache-first access with single-flight forced refresh.

use std::future::Future;
use std::time::Instant;

use tokio::sync::Mutex;

use cems_domain::token::AccessToken;

use crate::ports::login::LoginAutomator;
use crate::ports::token_provider::TokenProvider;
use crate::ports::token_store::TokenStore;

/// State guarded by the refresh lock.
#[derive(Debug, Default)]
struct RefreshState {
    /// When the last successful login completed.
    last_refresh: Option<Instant>,
}

/// The sole entry point for "give me a usable token".
///
/// Without a forced refresh, a cached token is trusted and returned as-is —
/// no per-call network validation, so a poll cycle over many devices costs
/// zero verification requests. When a refresh is needed, the login flow runs
/// under a process-wide lock: a login opens a real browser session, and
/// concurrent sessions would waste resources and trip the portal's bot
/// defenses. Callers that were waiting on an in-flight refresh reuse its
/// result instead of opening a second browser.
pub struct TokenLifecycleManager<S, L> {
    store: S,
    login: L,
    refresh: Mutex<RefreshState>,
}

impl<S: TokenStore, L: LoginAutomator> TokenLifecycleManager<S, L> {
    /// Create a manager over the given store and login automation.
    pub fn new(store: S, login: L) -> Self {
        Self {
            store,
            login,
            refresh: Mutex::new(RefreshState::default()),
        }
    }

    /// Return a usable token, or `None` when login fails.
    pub async fn access_token(&self, force_refresh: bool) -> Option<AccessToken> {
        if !force_refresh {
            if let Some(token) = self.store.load().await {
                return Some(token);
            }
        }

        let wait_started = Instant::now();
        let mut state = self.refresh.lock().await;

        // Another caller may have finished a refresh while we were waiting
        // on the lock; its token is as fresh as one we would obtain now.
        if state
            .last_refresh
            .is_some_and(|completed| completed >= wait_started)
        {
            if let Some(token) = self.store.load().await {
                return Some(token);
            }
        }

        if force_refresh {
            tracing::info!("forced refresh requested, running login automation");
        } else {
            tracing::info!("no cached token, running login automation");
        }

        match self.login.acquire_token().await {
            Ok(token) => {
                if let Err(err) = self.store.save(&token).await {
                    // A token we cannot cache is still usable for this cycle.
                    tracing::warn!(%err, "failed to persist refreshed token");
                }
                state.last_refresh = Some(Instant::now());
                Some(token)
            }
            Err(err) => {
                tracing::error!(%err, "login automation failed, no token available");
                None
            }
        }
    }
}

impl<S: TokenStore, L: LoginAutomator> TokenProvider for TokenLifecycleManager<S, L> {
    fn access_token(
        &self,
        force_refresh: bool,
    ) -> impl Future<Output = Option<AccessToken>> + Send {
        Self::access_token(self, force_refresh)
    }
}
