//! EVE SSO credential provider
//!
//! The token file is provisioned out of band by the login flow. This
//! provider only renews it with the refresh token and resolves the
//! character the token belongs to.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use fuelbot_provider_api::{AuthContext, AuthError, AuthResult, CredentialProvider};
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::{StoredToken, TokenFile};

pub const SSO_TOKEN_URL: &str = "https://login.eveonline.com/v2/oauth/token";
pub const SSO_VERIFY_URL: &str = "https://login.eveonline.com/oauth/verify";

/// SSO application credentials
#[derive(Clone)]
pub struct SsoConfig {
    pub client_id: String,
    pub client_secret: String,
    pub token_url: String,
    pub verify_url: String,
}

impl SsoConfig {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            token_url: SSO_TOKEN_URL.to_string(),
            verify_url: SSO_VERIFY_URL.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
    #[serde(default)]
    token_type: Option<String>,
    #[serde(default)]
    refresh_token: Option<String>,
}

impl TokenResponse {
    /// SSO may omit the refresh token, in which case the old one stays valid
    fn into_stored(self, previous_refresh: &str, now: DateTime<Utc>) -> StoredToken {
        StoredToken {
            access_token: self.access_token,
            refresh_token: self
                .refresh_token
                .unwrap_or_else(|| previous_refresh.to_string()),
            expires_at: Some(now + Duration::seconds(self.expires_in)),
            token_type: self.token_type.unwrap_or_else(|| "Bearer".to_string()),
        }
    }
}

#[derive(Debug, Deserialize)]
struct VerifyResponse {
    #[serde(rename = "CharacterID")]
    character_id: i64,
    #[serde(rename = "CharacterName", default)]
    character_name: String,
}

/// Credential provider backed by a token file and the SSO endpoints
pub struct SsoCredentials {
    http: reqwest::Client,
    config: SsoConfig,
    token_file: TokenFile,
    /// Serializes load / refresh / save so concurrent callers refresh once
    refresh_lock: Mutex<()>,
}

impl SsoCredentials {
    pub fn new(http: reqwest::Client, config: SsoConfig, token_file: TokenFile) -> Self {
        Self {
            http,
            config,
            token_file,
            refresh_lock: Mutex::new(()),
        }
    }

    async fn current_token(&self) -> AuthResult<StoredToken> {
        let _guard = self.refresh_lock.lock().await;

        let token = self.token_file.load().await?;
        let now = fuelbot_util::now();
        if !token.is_expired(now) {
            return Ok(token);
        }

        debug!(path = %self.token_file.path().display(), "Access token expired, refreshing");
        let refreshed = self.refresh(&token, now).await?;
        self.token_file.save(&refreshed).await?;
        Ok(refreshed)
    }

    async fn refresh(&self, token: &StoredToken, now: DateTime<Utc>) -> AuthResult<StoredToken> {
        let params = [
            ("grant_type", "refresh_token"),
            ("refresh_token", token.refresh_token.as_str()),
        ];

        let response = self
            .http
            .post(&self.config.token_url)
            .basic_auth(&self.config.client_id, Some(&self.config.client_secret))
            .form(&params)
            .send()
            .await
            .map_err(auth_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AuthError::RefreshFailed(format!("HTTP {}: {}", status, body)));
        }

        let body: TokenResponse = response.json().await.map_err(auth_error)?;
        Ok(body.into_stored(&token.refresh_token, now))
    }

    async fn verify(&self, token: &StoredToken) -> AuthResult<VerifyResponse> {
        let response = self
            .http
            .get(&self.config.verify_url)
            .bearer_auth(&token.access_token)
            .send()
            .await
            .map_err(auth_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(AuthError::VerifyFailed(format!("HTTP {}", status)));
        }

        response
            .json()
            .await
            .map_err(|e| AuthError::VerifyFailed(e.to_string()))
    }
}

fn auth_error(e: reqwest::Error) -> AuthError {
    if e.is_timeout() {
        AuthError::Timeout
    } else {
        AuthError::RefreshFailed(e.to_string())
    }
}

#[async_trait]
impl CredentialProvider for SsoCredentials {
    async fn authenticate(&self) -> AuthResult<AuthContext> {
        let token = self.current_token().await?;
        let verified = self.verify(&token).await?;

        info!(
            character_id = verified.character_id,
            character_name = %verified.character_name,
            "Authenticated"
        );

        Ok(AuthContext::new(token.access_token, verified.character_id))
    }
}
