//! OAuth endpoints (/auth/{platform}/*, /oauth/{platform}/callback)

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::Redirect,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_governor::{
    GovernorLayer, governor::GovernorConfigBuilder, key_extractor::SmartIpKeyExtractor,
};

use crate::AppState;
use crate::models::{Platform, SocialMediaAccount};
use crate::services::error::LogCoreErr;

pub fn routes() -> Router<Arc<AppState>> {
    // Rate limit: Stricter for OAuth - 5 requests per minute to prevent abuse
    let rate_limit_config = GovernorConfigBuilder::default()
        .per_second(12) // Refill rate
        .burst_size(5) // Allow burst of 5 requests, then 1 per 12 seconds
        .key_extractor(SmartIpKeyExtractor)
        .finish()
        .expect("Failed to build rate limit config");

    let rate_limit_layer = GovernorLayer {
        config: rate_limit_config.into(),
    };

    // The provider callback is not rate limited: it must always be able to
    // bounce the browser back into the dashboard.
    Router::new()
        .route("/auth/{platform}", get(auth_start))
        .route("/auth/{platform}/token", post(auth_token))
        .layer(rate_limit_layer)
        .route("/oauth/{platform}/callback", get(oauth_callback))
}

#[derive(Serialize)]
struct AuthUrlResponse {
    url: String,
}

/// GET /auth/{platform} - Start OAuth flow, returns URL to redirect user to
async fn auth_start(
    State(state): State<Arc<AppState>>,
    Path(platform): Path<String>,
) -> Result<Json<AuthUrlResponse>, StatusCode> {
    let platform: Platform = platform.parse().log_api("Authorize URL error")?;
    let request = state
        .oauth
        .authorize_url(platform)
        .log_api("Authorize URL error")?;

    Ok(Json(AuthUrlResponse { url: request.url }))
}

#[derive(Deserialize)]
struct TokenRequest {
    code: String,
    state: String,
}

/// POST /auth/{platform}/token - Exchange OAuth code for a connected account
async fn auth_token(
    State(state): State<Arc<AppState>>,
    Path(platform): Path<String>,
    Json(req): Json<TokenRequest>,
) -> Result<Json<SocialMediaAccount>, StatusCode> {
    let platform: Platform = platform.parse().log_api("Token exchange error")?;
    let account = state
        .oauth
        .handle_callback(platform, &req.code, &req.state)
        .await
        .log_api("Token exchange error")?;

    state.store.save_social_account(&account);
    tracing::info!(platform = %platform, username = %account.username, "account connected");

    Ok(Json(account))
}

#[derive(Deserialize)]
struct CallbackQuery {
    code: Option<String>,
    state: Option<String>,
    error: Option<String>,
}

/// GET /oauth/{platform}/callback - Provider redirect target. Bounces the
/// result back into the dashboard as query parameters; the frontend then
/// posts the code to /auth/{platform}/token.
async fn oauth_callback(
    Path(platform): Path<String>,
    Query(query): Query<CallbackQuery>,
) -> Redirect {
    if let Some(error) = query.error {
        tracing::warn!(platform = %platform, "OAuth callback returned error: {}", error);
        return Redirect::to(&format!("/?error={}", encode(&error)));
    }

    let Some(code) = query.code else {
        return Redirect::to(&format!(
            "/?error={}",
            encode("No authorization code received")
        ));
    };

    let mut target = format!("/?platform={}&code={}", encode(&platform), encode(&code));
    if let Some(state) = query.state {
        target.push_str(&format!("&state={}", encode(&state)));
    }
    Redirect::to(&target)
}

fn encode(value: &str) -> String {
    percent_encoding::utf8_percent_encode(value, percent_encoding::NON_ALPHANUMERIC).to_string()
}
