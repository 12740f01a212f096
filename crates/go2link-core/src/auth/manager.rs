use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::api::{Method, RemoteApi};
use crate::config::DEFAULT_REFRESH_MARGIN_SECS;
use crate::utils::unix_now;

use super::{Credential, RefreshError, StoreError, Token, TokenStore};

/// Login endpoint, takes `email` and the hashed `password`
pub const LOGIN_PATH: &str = "login/email";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenState {
    /// Nothing held
    NoToken,
    /// Held and not yet past `exp`, but inside the safety margin
    Cached,
    /// Held and good for at least the safety margin
    Valid,
    /// Held and past `exp`
    Expired,
}

/// Owns the cached access token and its on-disk copy.
///
/// Expired tokens are never handed out. They are deleted from disk whenever
/// detected: at load time, by `state`/`is_expired`, by `evict_expired`, or
/// by `ensure_valid`.
pub struct TokenManager {
    store: TokenStore,
    remote: Arc<dyn RemoteApi>,
    token: Option<Token>,
    margin_secs: i64,
}

impl TokenManager {
    pub fn new(store: TokenStore, remote: Arc<dyn RemoteApi>) -> Self {
        Self::with_margin(store, remote, DEFAULT_REFRESH_MARGIN_SECS)
    }

    /// Load the cached token, dropping it if unparseable or already expired.
    pub fn with_margin(store: TokenStore, remote: Arc<dyn RemoteApi>, margin_secs: i64) -> Self {
        let token = Self::load_cached(&store);
        Self {
            store,
            remote,
            token,
            margin_secs,
        }
    }

    fn load_cached(store: &TokenStore) -> Option<Token> {
        let Some(raw) = store.load() else {
            info!(path = %store.path().display(), "No cached token");
            return None;
        };

        match Token::parse(raw) {
            Ok(token) if token.is_past_expiry(unix_now()) => {
                warn!(
                    expired_at = ?token.expires_at_local(),
                    "Cached token already expired, deleting"
                );
                Self::discard(store);
                None
            }
            Ok(token) => {
                info!(
                    remaining_secs = token.seconds_until_expiry(unix_now()),
                    expires_at = ?token.expires_at_local(),
                    "Loaded cached token"
                );
                Some(token)
            }
            Err(e) => {
                warn!(error = %e, "Failed to parse cached token, deleting");
                Self::discard(store);
                None
            }
        }
    }

    fn discard(store: &TokenStore) {
        if let Err(e) = store.delete() {
            warn!(error = %e, "Failed to delete token file");
        }
    }

    /// Current state of the held token. A token found past `exp` has its
    /// on-disk copy deleted; the in-memory copy is hidden by `get_token`
    /// until `evict_expired` drops it.
    pub fn state(&self) -> TokenState {
        let now = unix_now();
        match self.token {
            None => TokenState::NoToken,
            Some(ref token) if token.is_past_expiry(now) => {
                if self.store.path().exists() {
                    warn!(
                        expired_at = ?token.expires_at_local(),
                        "Held token expired, deleting"
                    );
                    Self::discard(&self.store);
                }
                TokenState::Expired
            }
            Some(ref token) if token.needs_refresh(now, self.margin_secs) => TokenState::Cached,
            Some(_) => TokenState::Valid,
        }
    }

    /// True unless a token is held and good for at least the safety margin
    pub fn is_expired(&self) -> bool {
        self.state() != TokenState::Valid
    }

    /// The held token, if it has not passed `exp`. No side effects.
    pub fn get_token(&self) -> Option<&Token> {
        self.token
            .as_ref()
            .filter(|token| !token.is_past_expiry(unix_now()))
    }

    pub fn expires_at(&self) -> Option<i64> {
        self.token.as_ref().map(Token::expires_at)
    }

    pub fn seconds_until_expiry(&self) -> Option<i64> {
        self.token
            .as_ref()
            .map(|token| token.seconds_until_expiry(unix_now()).max(0))
    }

    pub fn store(&self) -> &TokenStore {
        &self.store
    }

    /// Drop a held token that has passed `exp`, from memory and disk.
    /// Returns whether anything was evicted.
    pub fn evict_expired(&mut self) -> bool {
        let expired = self
            .token
            .as_ref()
            .is_some_and(|token| token.is_past_expiry(unix_now()));
        if !expired {
            return false;
        }
        debug!("Evicting expired token");
        self.token = None;
        Self::discard(&self.store);
        true
    }

    /// Log in and replace the held token.
    ///
    /// On failure the previously held token, if any, is left untouched.
    pub async fn try_refresh(&mut self, credential: &Credential) -> Result<Token, RefreshError> {
        let password = credential.password_hash();
        let body = [("email", credential.identifier()), ("password", password.as_str())];

        let envelope = self
            .remote
            .call(LOGIN_PATH, &body, None, Method::Post)
            .await?;

        let raw = envelope
            .data
            .get("accessToken")
            .and_then(|v| v.as_str())
            .filter(|s| !s.is_empty())
            .ok_or(RefreshError::MissingAccessToken)?;
        let token = Token::parse(raw)?;

        // A failed write only costs a re-login next run
        if let Err(e) = self.store.save(token.as_str()) {
            warn!(error = %e, "Failed to persist token");
        }

        info!(
            remaining_secs = token.seconds_until_expiry(unix_now()),
            expires_at = ?token.expires_at_local(),
            "Obtained new token"
        );
        self.token = Some(token.clone());
        Ok(token)
    }

    pub async fn refresh(&mut self, credential: &Credential) -> Option<Token> {
        match self.try_refresh(credential).await {
            Ok(token) => Some(token),
            Err(e) => {
                warn!(
                    error = %e,
                    retryable = e.is_retryable(),
                    "Token refresh failed"
                );
                None
            }
        }
    }

    /// Load-or-fetch: the held token while it is valid, otherwise a fresh one.
    ///
    /// If the refresh fails, a held token that has not yet passed `exp` is
    /// still returned.
    pub async fn ensure_valid(&mut self, credential: &Credential) -> Option<Token> {
        if !self.is_expired() {
            return self.token.clone();
        }

        self.evict_expired();
        if let Some(token) = self.refresh(credential).await {
            return Some(token);
        }
        self.get_token().cloned()
    }

    /// Forget the token and delete the cached copy
    pub fn logout(&mut self) -> Result<(), StoreError> {
        self.token = None;
        self.store.delete()
    }
}
