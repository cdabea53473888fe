//! Session ownership and single-flight token refresh.

use tokio::sync::{watch, Mutex, RwLock};

use super::{decode_claims, Role, SessionStore, SessionUser, StoredSession};
use crate::api::read_payload;
use crate::errors::ClientError;
use crate::models::{RefreshResult, SignInResult, TokenRequest};

/// Lifetime assumed for a token that carries no `exp` claim.
const DEFAULT_SESSION_MILLIS: i64 = 24 * 60 * 60 * 1000;

/// Authentication state, broadcast to observers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthState {
    SignedIn(SessionUser),
    SignedOut,
    /// The session was lost (refresh failed); the user must sign in again.
    SignInRequired,
}

/// Owns the current session and its persisted copy.
///
/// Concurrent requests rejected with 401 call [`SessionManager::refresh_after_rejection`]
/// with the token they were sent with. Callers serialize on the refresh gate; the first
/// one refreshes, the rest find a newer token already in place and reuse it.
#[derive(Debug)]
pub struct SessionManager {
    http: reqwest::Client,
    base_url: String,
    store: SessionStore,
    current: RwLock<Option<StoredSession>>,
    refresh_gate: Mutex<()>,
    state_tx: watch::Sender<AuthState>,
}

impl SessionManager {
    /// Create a manager, restoring a persisted session if one is valid.
    pub async fn load(
        http: reqwest::Client,
        base_url: impl Into<String>,
        store: SessionStore,
    ) -> Result<Self, ClientError> {
        let restored = store.load().await?;
        let state = match &restored {
            Some(session) => {
                tracing::info!("Restored session for {}", session.user.username);
                AuthState::SignedIn(session.user.clone())
            }
            None => AuthState::SignedOut,
        };
        let (state_tx, _) = watch::channel(state);

        Ok(Self {
            http,
            base_url: base_url.into(),
            store,
            current: RwLock::new(restored),
            refresh_gate: Mutex::new(()),
            state_tx,
        })
    }

    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.state_tx.subscribe()
    }

    pub async fn access_token(&self) -> Option<String> {
        self.current.read().await.as_ref().map(|s| s.token.clone())
    }

    pub async fn user(&self) -> Option<SessionUser> {
        self.current.read().await.as_ref().map(|s| s.user.clone())
    }

    pub async fn session(&self) -> Option<StoredSession> {
        self.current.read().await.clone()
    }

    /// Build and persist a session from a sign-in result.
    ///
    /// The role is the first role granted. The user id and expiry come from the token's
    /// claims when it has them; otherwise the session lasts 24 hours.
    pub async fn establish(&self, result: SignInResult) -> Result<SessionUser, ClientError> {
        let role_name = result
            .roles
            .first()
            .ok_or_else(|| ClientError::Validation("Sign-in granted no roles".to_string()))?;
        let role = Role::parse(role_name)
            .ok_or_else(|| ClientError::Validation(format!("Unknown role {}", role_name)))?;

        let claims = decode_claims(&result.token);
        let now = chrono::Utc::now().timestamp_millis();
        let expires_at = claims
            .as_ref()
            .and_then(|c| c.exp)
            .map(|exp| exp * 1000)
            .unwrap_or(now + DEFAULT_SESSION_MILLIS);

        let user = SessionUser {
            id: claims.and_then(|c| c.user_id),
            username: result.username,
            role,
        };
        let session = StoredSession {
            refresh_token: result.token.clone(),
            token: result.token,
            expires_at,
            user: user.clone(),
        };

        self.store.save(&session).await?;
        *self.current.write().await = Some(session);
        self.state_tx.send_replace(AuthState::SignedIn(user.clone()));
        tracing::info!("Signed in as {} ({})", user.username, user.role);

        Ok(user)
    }

    /// Forget the session locally and on disk.
    pub async fn clear(&self, state: AuthState) -> Result<(), ClientError> {
        *self.current.write().await = None;
        let removed = self.store.clear().await;
        self.state_tx.send_replace(state);
        removed
    }

    /// Obtain a usable token after a request sent with `rejected` came back 401.
    pub async fn refresh_after_rejection(&self, rejected: &str) -> Result<String, ClientError> {
        let _gate = self.refresh_gate.lock().await;

        let Some(session) = self.current.read().await.clone() else {
            return Err(ClientError::Auth("Sign-in required".to_string()));
        };
        if session.token != rejected {
            tracing::debug!("Token already refreshed by another request");
            return Ok(session.token);
        }

        match self.request_refresh(&session.refresh_token).await {
            Ok(refreshed) => {
                let next = StoredSession {
                    token: refreshed.token,
                    refresh_token: refreshed.refresh_token,
                    expires_at: chrono::Utc::now().timestamp_millis()
                        + refreshed.expires_in * 1000,
                    user: session.user,
                };
                if let Err(e) = self.store.save(&next).await {
                    tracing::warn!("Failed to persist refreshed session: {}", e);
                }
                let token = next.token.clone();
                *self.current.write().await = Some(next);
                tracing::info!("Access token refreshed");
                Ok(token)
            }
            Err(e) => {
                tracing::warn!("Token refresh failed: {}", e);
                if let Err(e) = self.clear(AuthState::SignInRequired).await {
                    tracing::warn!("Failed to remove session file: {}", e);
                }
                Err(ClientError::Auth(
                    "Session expired, sign in again".to_string(),
                ))
            }
        }
    }

    async fn request_refresh(&self, refresh_token: &str) -> Result<RefreshResult, ClientError> {
        let response = self
            .http
            .post(format!("{}/api/v1/auth/refresh", self.base_url))
            .json(&TokenRequest {
                token: refresh_token.to_string(),
            })
            .send()
            .await?;
        read_payload(response).await
    }
}
