//! OAuth authorization-code flow for linking platform accounts.
//!
//! One client serves all platforms: each carries its own endpoints, scopes,
//! and credentials in an [`OAuthConfig`]. The anti-forgery `state` handed out
//! with an authorization URL is held in memory with a short TTL and consumed
//! exactly once on callback; the PKCE verifier rides along with it.

use std::collections::HashMap;
use std::sync::Mutex;

use base64::Engine;
use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use reqwest::Client;
use serde::Deserialize;
use sha2::{Digest, Sha256};

use crate::constants::OAUTH_STATE_TTL_MINUTES;
use crate::error::CoreError;
use crate::models::{Platform, SocialMediaAccount};

/// Per-platform OAuth endpoints, scopes, and client credentials.
#[derive(Debug, Clone)]
pub struct OAuthConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    pub scopes: Vec<String>,
    pub authorize_url: String,
    pub token_url: String,
    pub profile_url: String,
}

impl OAuthConfig {
    /// Config with the platform's reference endpoints, reading credentials
    /// from `{PLATFORM}_CLIENT_ID` / `{PLATFORM}_CLIENT_SECRET`.
    pub fn from_env(platform: Platform, app_url: &str) -> Self {
        let prefix = platform.as_str().to_uppercase();
        let client_id = std::env::var(format!("{}_CLIENT_ID", prefix)).unwrap_or_default();
        let client_secret = std::env::var(format!("{}_CLIENT_SECRET", prefix)).unwrap_or_default();
        Self::with_credentials(platform, client_id, client_secret, app_url)
    }

    pub fn with_credentials(
        platform: Platform,
        client_id: String,
        client_secret: String,
        app_url: &str,
    ) -> Self {
        let (authorize_url, token_url, profile_url, scopes): (&str, &str, &str, &[&str]) =
            match platform {
                Platform::Youtube => (
                    "https://accounts.google.com/o/oauth2/v2/auth",
                    "https://oauth2.googleapis.com/token",
                    "https://www.googleapis.com/youtube/v3/channels?part=snippet&mine=true",
                    &["https://www.googleapis.com/auth/youtube.upload"],
                ),
                Platform::Instagram => (
                    "https://api.instagram.com/oauth/authorize",
                    "https://api.instagram.com/oauth/access_token",
                    "https://graph.instagram.com/me?fields=id,username",
                    &["instagram_basic", "instagram_content_publish"],
                ),
                Platform::Twitter => (
                    "https://twitter.com/i/oauth2/authorize",
                    "https://api.twitter.com/2/oauth2/token",
                    "https://api.twitter.com/2/users/me",
                    &["tweet.read", "tweet.write", "users.read"],
                ),
            };

        Self {
            client_id,
            client_secret,
            redirect_uri: format!("{}/oauth/{}/callback", app_url.trim_end_matches('/'), platform),
            scopes: scopes.iter().map(|s| s.to_string()).collect(),
            authorize_url: authorize_url.to_string(),
            token_url: token_url.to_string(),
            profile_url: profile_url.to_string(),
        }
    }
}

struct PendingAuthorization {
    platform: Platform,
    code_verifier: String,
    created_at: DateTime<Utc>,
}

pub struct OAuthClient {
    configs: HashMap<Platform, OAuthConfig>,
    pending: Mutex<HashMap<String, PendingAuthorization>>,
    http: Client,
}

#[derive(Debug)]
pub struct AuthorizeRequest {
    pub url: String,
    pub state: String,
}

impl OAuthClient {
    pub fn new(configs: HashMap<Platform, OAuthConfig>) -> Self {
        Self {
            configs,
            pending: Mutex::new(HashMap::new()),
            http: Client::new(),
        }
    }

    /// Client configured for every supported platform from the environment.
    pub fn from_env(app_url: &str) -> Self {
        let configs = Platform::ALL
            .into_iter()
            .map(|p| (p, OAuthConfig::from_env(p, app_url)))
            .collect();
        Self::new(configs)
    }

    fn config(&self, platform: Platform) -> Result<&OAuthConfig, CoreError> {
        self.configs
            .get(&platform)
            .ok_or_else(|| CoreError::UnsupportedPlatform {
                platform: platform.to_string(),
            })
    }

    /// Generate PKCE code verifier and challenge
    fn generate_pkce() -> (String, String) {
        let verifier_bytes: [u8; 32] = rand::rng().random();
        let code_verifier = base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(verifier_bytes);

        let mut hasher = Sha256::new();
        hasher.update(code_verifier.as_bytes());
        let hash = hasher.finalize();
        let code_challenge = base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(hash);

        (code_verifier, code_challenge)
    }

    /// Generate random state for CSRF protection
    fn generate_state() -> String {
        let bytes: [u8; 16] = rand::rng().random();
        base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes)
    }

    /// Step 1: build the authorization URL and record the pending state.
    pub fn authorize_url(&self, platform: Platform) -> Result<AuthorizeRequest, CoreError> {
        let config = self.config(platform)?;
        let state = Self::generate_state();
        let (code_verifier, code_challenge) = Self::generate_pkce();
        let scope = config.scopes.join(" ");

        let url = format!(
            "{}?response_type=code&client_id={}&redirect_uri={}&scope={}&state={}&code_challenge={}&code_challenge_method=S256",
            config.authorize_url,
            percent_encode(&config.client_id),
            percent_encode(&config.redirect_uri),
            percent_encode(&scope),
            percent_encode(&state),
            percent_encode(&code_challenge)
        );

        let now = Utc::now();
        let mut pending = self.pending.lock().unwrap_or_else(|e| e.into_inner());
        pending.retain(|_, entry| now - entry.created_at <= Duration::minutes(OAUTH_STATE_TTL_MINUTES));
        pending.insert(
            state.clone(),
            PendingAuthorization {
                platform,
                code_verifier,
                created_at: now,
            },
        );

        Ok(AuthorizeRequest { url, state })
    }

    /// Consume a pending state. Unknown, expired, or cross-platform states
    /// all fail the same way.
    fn consume_state(&self, platform: Platform, state: &str) -> Result<String, CoreError> {
        let mut pending = self.pending.lock().unwrap_or_else(|e| e.into_inner());
        let entry = pending.remove(state).ok_or(CoreError::StateMismatch)?;
        if entry.platform != platform
            || Utc::now() - entry.created_at > Duration::minutes(OAUTH_STATE_TTL_MINUTES)
        {
            return Err(CoreError::StateMismatch);
        }
        Ok(entry.code_verifier)
    }

    /// Step 2: validate the state, exchange the code, fetch the profile, and
    /// build the connected-account record.
    pub async fn handle_callback(
        &self,
        platform: Platform,
        code: &str,
        state: &str,
    ) -> Result<SocialMediaAccount, CoreError> {
        let code_verifier = self.consume_state(platform, state)?;
        let config = self.config(platform)?;

        let token = self.exchange_code(config, code, &code_verifier).await?;
        let username = self
            .fetch_username(platform, config, &token.access_token)
            .await?;

        Ok(SocialMediaAccount {
            id: uuid::Uuid::new_v4().to_string(),
            platform,
            username,
            access_token: token.access_token,
            refresh_token: token.refresh_token,
            expires_at: token.expires_in.map(|secs| Utc::now() + Duration::seconds(secs)),
        })
    }

    async fn exchange_code(
        &self,
        config: &OAuthConfig,
        code: &str,
        code_verifier: &str,
    ) -> Result<TokenResponse, CoreError> {
        let params = [
            ("client_id", config.client_id.as_str()),
            ("client_secret", config.client_secret.as_str()),
            ("code", code),
            ("grant_type", "authorization_code"),
            ("redirect_uri", config.redirect_uri.as_str()),
            ("code_verifier", code_verifier),
        ];

        let resp = self.http.post(&config.token_url).form(&params).send().await?;

        if !resp.status().is_success() {
            let text = resp.text().await?;
            return Err(CoreError::TokenExchangeFailed(text));
        }

        Ok(resp.json().await?)
    }

    /// The single token-refresh path. Providers that rotate refresh tokens
    /// send a new one; otherwise the account keeps its current token.
    pub async fn refresh_account(
        &self,
        account: &SocialMediaAccount,
    ) -> Result<SocialMediaAccount, CoreError> {
        let config = self.config(account.platform)?;
        let refresh_token = account.refresh_token.as_deref().ok_or_else(|| {
            CoreError::TokenRefreshFailed("account has no refresh token".to_string())
        })?;

        let params = [
            ("client_id", config.client_id.as_str()),
            ("client_secret", config.client_secret.as_str()),
            ("refresh_token", refresh_token),
            ("grant_type", "refresh_token"),
        ];

        let resp = self.http.post(&config.token_url).form(&params).send().await?;

        if !resp.status().is_success() {
            let text = resp.text().await?;
            return Err(CoreError::TokenRefreshFailed(text));
        }

        let token: TokenResponse = resp.json().await?;
        let mut refreshed = account.clone();
        refreshed.access_token = token.access_token;
        if token.refresh_token.is_some() {
            refreshed.refresh_token = token.refresh_token;
        }
        refreshed.expires_at = token.expires_in.map(|secs| Utc::now() + Duration::seconds(secs));
        Ok(refreshed)
    }

    async fn fetch_username(
        &self,
        platform: Platform,
        config: &OAuthConfig,
        access_token: &str,
    ) -> Result<String, CoreError> {
        let resp = self
            .http
            .get(&config.profile_url)
            .header("Authorization", format!("Bearer {}", access_token))
            .send()
            .await?;

        if !resp.status().is_success() {
            let text = resp.text().await?;
            return Err(CoreError::ProfileFetchFailed(text));
        }

        let username = match platform {
            Platform::Youtube => {
                let channels: YoutubeChannelList = resp.json().await?;
                channels
                    .items
                    .into_iter()
                    .next()
                    .map(|c| c.snippet.title)
                    .unwrap_or_else(|| "YouTube Channel".to_string())
            }
            Platform::Instagram => resp.json::<InstagramProfile>().await?.username,
            Platform::Twitter => resp.json::<TwitterUserResponse>().await?.data.username,
        };

        Ok(username)
    }
}

fn percent_encode(s: &str) -> String {
    percent_encoding::utf8_percent_encode(s, percent_encoding::NON_ALPHANUMERIC).to_string()
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct YoutubeChannelList {
    #[serde(default)]
    items: Vec<YoutubeChannel>,
}

#[derive(Debug, Deserialize)]
struct YoutubeChannel {
    snippet: YoutubeSnippet,
}

#[derive(Debug, Deserialize)]
struct YoutubeSnippet {
    title: String,
}

#[derive(Debug, Deserialize)]
struct InstagramProfile {
    username: String,
}

#[derive(Debug, Deserialize)]
struct TwitterUserResponse {
    data: TwitterUser,
}

#[derive(Debug, Deserialize)]
struct TwitterUser {
    username: String,
}
