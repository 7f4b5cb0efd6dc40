//! Instagram adapter (stub)

use async_trait::async_trait;

use super::PlatformClient;
use crate::error::CoreError;
use crate::models::{Platform, SocialMediaAccount, VideoAnalytics, VideoPost};

pub struct InstagramClient;

#[async_trait]
impl PlatformClient for InstagramClient {
    fn platform(&self) -> Platform {
        Platform::Instagram
    }

    async fn upload_video(
        &self,
        video: &VideoPost,
        account: &SocialMediaAccount,
    ) -> Result<String, CoreError> {
        tracing::info!(
            video = %video.id,
            account = %account.username,
            "Uploading {} to Instagram",
            video.title
        );
        Ok("instagram-video-id".to_string())
    }

    async fn fetch_analytics(
        &self,
        _content_id: &str,
        _account: &SocialMediaAccount,
    ) -> Result<VideoAnalytics, CoreError> {
        Ok(VideoAnalytics {
            views: 500,
            likes: 200,
            comments: 75,
            shares: 30,
            engagement_rate: 63.0,
        })
    }
}
