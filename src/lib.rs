//! ACM Client
//!
//! Typed client for the ACM crop management backend: validated requests, a query cache
//! with stale-while-error reads, optimistic mutations with rollback, and a persisted
//! session with single-flight token refresh.

pub mod api;
pub mod auth;
pub mod cache;
pub mod config;
pub mod errors;
pub mod models;
pub mod mutation;
pub mod repo;

use std::sync::Arc;

use tokio::sync::watch;

use api::ApiClient;
use auth::{authorize, AccessDecision, AuthState, Role, SessionManager, SessionStore, SessionUser};
use cache::QueryClient;
use config::Config;
use errors::ClientError;
use models::{
    IntrospectResult, ResetPasswordRequest, SignInRequest, SignUpRequest, SignUpResult,
};
use repo::Repository;

/// Entry point: one session, one cache, one repository.
#[derive(Debug, Clone)]
pub struct AcmClient {
    api: Arc<ApiClient>,
    repo: Repository,
}

impl AcmClient {
    /// Build a client from configuration, restoring a persisted session if one is valid.
    pub async fn from_config(config: &Config) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| ClientError::Config(format!("Failed to build HTTP client: {}", e)))?;

        let store = SessionStore::new(config.session_path.clone());
        let session = Arc::new(SessionManager::load(http.clone(), &config.api_base_url, store).await?);
        let api = Arc::new(ApiClient::new(http, &config.api_base_url, session));
        let repo = Repository::new(api.clone(), QueryClient::new());

        Ok(Self { api, repo })
    }

    pub fn repo(&self) -> &Repository {
        &self.repo
    }

    pub fn session(&self) -> &Arc<SessionManager> {
        self.api.session()
    }

    // ==================== SESSION OPERATIONS ====================

    /// Sign in and persist the session. The cache is cleared so nothing read under a
    /// previous identity survives.
    pub async fn sign_in(&self, username: &str, password: &str) -> Result<SessionUser, ClientError> {
        let request = SignInRequest {
            username: username.to_string(),
            password: password.to_string(),
        };
        let result = api::auth::sign_in(&self.api, &request).await?;
        let user = self.session().establish(result).await?;
        self.repo.cache().clear().await;
        Ok(user)
    }

    pub async fn sign_up(&self, request: &SignUpRequest) -> Result<SignUpResult, ClientError> {
        api::auth::sign_up(&self.api, request).await
    }

    /// Sign out. The backend is told on a best-effort basis; the local session and the
    /// cache are always dropped.
    pub async fn sign_out(&self) -> Result<(), ClientError> {
        if let Some(token) = self.session().access_token().await {
            if let Err(e) = api::auth::sign_out(&self.api, &token).await {
                tracing::warn!("Backend sign-out failed: {}", e);
            }
        }
        self.repo.cache().clear().await;
        self.session().clear(AuthState::SignedOut).await?;
        tracing::info!("Signed out");
        Ok(())
    }

    pub async fn current_user(&self) -> Option<SessionUser> {
        self.session().user().await
    }

    /// Gate a view on the current session's role.
    pub async fn authorize(&self, allowed: &[Role]) -> AccessDecision {
        let user = self.current_user().await;
        authorize(user.as_ref(), allowed)
    }

    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.session().subscribe()
    }

    pub async fn reset_password(&self, request: &ResetPasswordRequest) -> Result<(), ClientError> {
        api::auth::reset_password(&self.api, request).await
    }

    /// Ask the backend whether the current token is still active.
    pub async fn introspect(&self) -> Result<IntrospectResult, ClientError> {
        let token = self
            .session()
            .access_token()
            .await
            .ok_or_else(|| ClientError::Auth("Sign-in required".to_string()))?;
        api::auth::introspect(&self.api, &token).await
    }
}

#[cfg(test)]
mod tests;
