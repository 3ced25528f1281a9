//! Persisted SSO token

use chrono::{DateTime, Duration, Utc};
use fuelbot_provider_api::{AuthError, AuthResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Tokens are refreshed this long before they actually expire
const EXPIRY_MARGIN_SECS: i64 = 60;

/// OAuth token pair as stored on disk
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredToken {
    pub access_token: String,
    pub refresh_token: String,
    /// `None` when the expiry is unknown; such tokens are refreshed on use
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(default = "default_token_type")]
    pub token_type: String,
}

fn default_token_type() -> String {
    "Bearer".to_string()
}

impl StoredToken {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        match self.expires_at {
            Some(at) => now > at - Duration::seconds(EXPIRY_MARGIN_SECS),
            None => true,
        }
    }
}

impl fmt::Debug for StoredToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoredToken")
            .field("expires_at", &self.expires_at)
            .field("token_type", &self.token_type)
            .finish_non_exhaustive()
    }
}

/// JSON token file
#[derive(Debug, Clone)]
pub struct TokenFile {
    path: PathBuf,
}

impl TokenFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn load(&self) -> AuthResult<StoredToken> {
        let content = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            AuthError::TokenUnavailable(format!("{}: {}", self.path.display(), e))
        })?;
        serde_json::from_str(&content).map_err(|e| {
            AuthError::TokenUnavailable(format!("{}: malformed token file: {}", self.path.display(), e))
        })
    }

    /// Replace the file atomically
    pub async fn save(&self, token: &StoredToken) -> AuthResult<()> {
        let json = serde_json::to_string_pretty(token)
            .map_err(|e| AuthError::RefreshFailed(format!("unable to encode token: {}", e)))?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let tmp = self.path.with_extension("tmp");
        tokio::fs::write(&tmp, json).await?;
        tokio::fs::rename(&tmp, &self.path).await?;

        debug!(path = %self.path.display(), "Saved token");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn token(expires_at: Option<DateTime<Utc>>) -> StoredToken {
        StoredToken {
            access_token: "access".into(),
            refresh_token: "refresh".into(),
            expires_at,
            token_type: "Bearer".into(),
        }
    }

    #[test]
    fn expiry_has_margin() {
        let now = Utc.with_ymd_and_hms(2021, 5, 8, 0, 0, 0).unwrap();
        assert!(!token(Some(now + Duration::minutes(5))).is_expired(now));
        assert!(token(Some(now + Duration::seconds(30))).is_expired(now));
        assert!(token(Some(now - Duration::minutes(5))).is_expired(now));
        assert!(token(None).is_expired(now));
    }

    #[tokio::test]
    async fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let file = TokenFile::new(dir.path().join("nested").join("auth.json"));
        let stored = token(Some(Utc.with_ymd_and_hms(2021, 5, 8, 0, 20, 0).unwrap()));

        file.save(&stored).await.unwrap();
        assert_eq!(file.load().await.unwrap(), stored);
        assert!(!dir.path().join("nested").join("auth.tmp").exists());
    }

    #[tokio::test]
    async fn missing_file_is_token_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let file = TokenFile::new(dir.path().join("auth.json"));
        assert!(matches!(file.load().await, Err(AuthError::TokenUnavailable(_))));
    }

    #[tokio::test]
    async fn malformed_file_is_token_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("auth.json");
        tokio::fs::write(&path, "not json").await.unwrap();

        let err = TokenFile::new(path).load().await.unwrap_err();
        assert!(matches!(err, AuthError::TokenUnavailable(msg) if msg.contains("malformed")));
    }

    #[test]
    fn token_type_defaults_to_bearer() {
        let json = r#"{"access_token":"a","refresh_token":"r","expires_at":null}"#;
        let t: StoredToken = serde_json::from_str(json).unwrap();
        assert_eq!(t.token_type, "Bearer");
    }

    #[test]
    fn debug_hides_secrets() {
        let rendered = format!("{:?}", token(None));
        assert!(!rendered.contains("access"));
        assert!(!rendered.contains("refresh"));
    }
}
