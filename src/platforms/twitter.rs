//! Twitter adapter (stub)

use async_trait::async_trait;

use super::PlatformClient;
use crate::error::CoreError;
use crate::models::{Platform, SocialMediaAccount, VideoAnalytics, VideoPost};

pub struct TwitterClient;

#[async_trait]
impl PlatformClient for TwitterClient {
    fn platform(&self) -> Platform {
        Platform::Twitter
    }

    async fn upload_video(
        &self,
        video: &VideoPost,
        account: &SocialMediaAccount,
    ) -> Result<String, CoreError> {
        tracing::info!(
            video = %video.id,
            account = %account.username,
            "Uploading {} to Twitter",
            video.title
        );
        Ok("twitter-video-id".to_string())
    }

    async fn fetch_analytics(
        &self,
        _content_id: &str,
        _account: &SocialMediaAccount,
    ) -> Result<VideoAnalytics, CoreError> {
        Ok(VideoAnalytics {
            views: 300,
            likes: 150,
            comments: 40,
            shares: 60,
            engagement_rate: 83.3,
        })
    }
}
