//! Error taxonomy shared across the store, OAuth flow, gateway, and pipeline.

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::models::Platform;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Unsupported platform: {platform}")]
    UnsupportedPlatform { platform: String },

    #[error("Failed to exchange code for token: {0}")]
    TokenExchangeFailed(String),

    #[error("Failed to refresh token: {0}")]
    TokenRefreshFailed(String),

    #[error("Failed to get user profile: {0}")]
    ProfileFetchFailed(String),

    /// The OAuth `state` was unknown, expired, or already consumed.
    #[error("OAuth state mismatch")]
    StateMismatch,

    #[error("Cannot schedule video in the past: {scheduled}")]
    PastScheduleDate { scheduled: DateTime<Utc> },

    #[error("No connected accounts for the selected platforms")]
    NoAccountsForPlatforms,

    /// The video is in a terminal state (published or failed) and cannot be
    /// scheduled or published again.
    #[error("Video {id} has already been published or failed")]
    AlreadyPublished { id: String },

    #[error("Video not found: {id}")]
    VideoNotFound { id: String },

    #[error("Upload to {platform} failed: {message}")]
    Upload { platform: Platform, message: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}
