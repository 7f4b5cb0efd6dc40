//! Shared data models used across modules

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// A supported social-media platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Youtube,
    Instagram,
    Twitter,
}

impl Platform {
    pub const ALL: [Platform; 3] = [Platform::Youtube, Platform::Instagram, Platform::Twitter];

    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Youtube => "youtube",
            Platform::Instagram => "instagram",
            Platform::Twitter => "twitter",
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Platform {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "youtube" => Ok(Platform::Youtube),
            "instagram" => Ok(Platform::Instagram),
            "twitter" => Ok(Platform::Twitter),
            other => Err(CoreError::UnsupportedPlatform {
                platform: other.to_string(),
            }),
        }
    }
}

/// Lifecycle state of a video post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    Draft,
    Scheduled,
    Published,
    Failed,
}

impl PostStatus {
    /// Published and failed are terminal: the pipeline never leaves them.
    pub fn is_terminal(&self) -> bool {
        matches!(self, PostStatus::Published | PostStatus::Failed)
    }
}

/// A video post moving through the scheduling pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoPost {
    pub id: String,
    pub title: String,
    pub description: String,
    pub video_url: String,
    pub thumbnail_url: String,
    pub scheduled_date: DateTime<Utc>,
    pub status: PostStatus,
    pub platforms: Vec<Platform>,
    /// External content id per platform, set once published.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform_ids: Option<BTreeMap<Platform, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analytics: Option<VideoAnalytics>,
}

/// Aggregated engagement metrics for a published video.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct VideoAnalytics {
    pub views: u64,
    pub likes: u64,
    pub comments: u64,
    pub shares: u64,
    pub engagement_rate: f64,
}

impl VideoAnalytics {
    /// Merge per-platform snapshots: counters sum, engagement rate is the
    /// arithmetic mean. Returns None when there is nothing to merge.
    pub fn aggregate(snapshots: &[VideoAnalytics]) -> Option<VideoAnalytics> {
        if snapshots.is_empty() {
            return None;
        }
        let mut total = VideoAnalytics::default();
        for snap in snapshots {
            total.views += snap.views;
            total.likes += snap.likes;
            total.comments += snap.comments;
            total.shares += snap.shares;
            total.engagement_rate += snap.engagement_rate;
        }
        total.engagement_rate /= snapshots.len() as f64;
        Some(total)
    }
}

/// A connected social-media account with its OAuth tokens.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SocialMediaAccount {
    pub id: String,
    pub platform: Platform,
    pub username: String,
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    /// When the access token expires. None means the provider did not say.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionTier {
    Free,
    Premium,
}

/// Account settings for the dashboard user. The video quota is carried for
/// display but not enforced anywhere.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserSettings {
    pub id: String,
    pub email: String,
    pub subscription_tier: SubscriptionTier,
    pub max_videos: u32,
    #[serde(default)]
    pub social_accounts: Vec<SocialMediaAccount>,
}
