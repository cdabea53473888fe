//! Persisted session state.
//!
//! One JSON file holds the tokens, their expiry and the user. A missing, unreadable or
//! expired file means nobody is signed in.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::SessionUser;
use crate::errors::ClientError;

/// Session as written to disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredSession {
    pub token: String,
    pub refresh_token: String,
    /// Milliseconds since the epoch.
    pub expires_at: i64,
    pub user: SessionUser,
}

impl StoredSession {
    pub fn is_expired(&self, now_millis: i64) -> bool {
        self.expires_at <= now_millis
    }
}

#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the session if one is present and still valid. Expired or corrupt files are
    /// removed.
    pub async fn load(&self) -> Result<Option<StoredSession>, ClientError> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let session = match serde_json::from_str::<StoredSession>(&raw) {
            Ok(session) => session,
            Err(e) => {
                tracing::warn!("Discarding unreadable session file {:?}: {}", self.path, e);
                self.clear().await?;
                return Ok(None);
            }
        };

        if session.is_expired(chrono::Utc::now().timestamp_millis()) {
            tracing::info!("Stored session expired, removing {:?}", self.path);
            self.clear().await?;
            return Ok(None);
        }

        Ok(Some(session))
    }

    pub async fn save(&self, session: &StoredSession) -> Result<(), ClientError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        let body = serde_json::to_vec_pretty(session)?;
        tokio::fs::write(&self.path, body).await?;
        Ok(())
    }

    pub async fn clear(&self) -> Result<(), ClientError> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Role;
    use tempfile::TempDir;

    fn session(expires_at: i64) -> StoredSession {
        StoredSession {
            token: "t".to_string(),
            refresh_token: "t".to_string(),
            expires_at,
            user: SessionUser {
                id: Some(3),
                username: "farmer1".to_string(),
                role: Role::Farmer,
            },
        }
    }

    #[tokio::test]
    async fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let store = SessionStore::new(dir.path().join("nested").join("session.json"));
        assert_eq!(store.load().await.unwrap(), None);

        let stored = session(chrono::Utc::now().timestamp_millis() + 60_000);
        store.save(&stored).await.unwrap();
        assert_eq!(store.load().await.unwrap(), Some(stored));

        let raw = std::fs::read_to_string(store.path()).unwrap();
        assert!(raw.contains("refreshToken"));
        assert!(raw.contains("expiresAt"));
    }

    #[tokio::test]
    async fn test_expired_session_is_removed() {
        let dir = TempDir::new().unwrap();
        let store = SessionStore::new(dir.path().join("session.json"));
        store.save(&session(1)).await.unwrap();

        assert_eq!(store.load().await.unwrap(), None);
        assert!(!store.path().exists());
    }

    #[tokio::test]
    async fn test_corrupt_session_is_removed() {
        let dir = TempDir::new().unwrap();
        let store = SessionStore::new(dir.path().join("session.json"));
        std::fs::write(store.path(), "{not json").unwrap();

        assert_eq!(store.load().await.unwrap(), None);
        assert!(!store.path().exists());
    }
}
