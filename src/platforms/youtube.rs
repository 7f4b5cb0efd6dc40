//! YouTube adapter (stub)

use async_trait::async_trait;

use super::PlatformClient;
use crate::error::CoreError;
use crate::models::{Platform, SocialMediaAccount, VideoAnalytics, VideoPost};

pub struct YoutubeClient;

#[async_trait]
impl PlatformClient for YoutubeClient {
    fn platform(&self) -> Platform {
        Platform::Youtube
    }

    async fn upload_video(
        &self,
        video: &VideoPost,
        account: &SocialMediaAccount,
    ) -> Result<String, CoreError> {
        tracing::info!(
            video = %video.id,
            account = %account.username,
            "Uploading {} to YouTube",
            video.title
        );
        Ok("youtube-video-id".to_string())
    }

    async fn fetch_analytics(
        &self,
        _content_id: &str,
        _account: &SocialMediaAccount,
    ) -> Result<VideoAnalytics, CoreError> {
        Ok(VideoAnalytics {
            views: 1000,
            likes: 100,
            comments: 50,
            shares: 25,
            engagement_rate: 17.5,
        })
    }
}
