//! Platform gateway: one adapter per social-media platform.
//!
//! Adapters implement [`PlatformClient`] and are looked up through a
//! [`PlatformRegistry`]. The bundled adapters are stubs that skip the real
//! network call and answer with fixed data; swapping in a real client is a
//! matter of registering a different implementation.

pub mod instagram;
pub mod twitter;
pub mod youtube;

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::try_join_all;

use crate::error::CoreError;
use crate::models::{Platform, SocialMediaAccount, VideoAnalytics, VideoPost};

#[async_trait]
pub trait PlatformClient: Send + Sync {
    fn platform(&self) -> Platform;

    /// Upload a video on behalf of an account. Returns the external content id.
    async fn upload_video(
        &self,
        video: &VideoPost,
        account: &SocialMediaAccount,
    ) -> Result<String, CoreError>;

    /// Fetch current engagement metrics for previously uploaded content.
    async fn fetch_analytics(
        &self,
        content_id: &str,
        account: &SocialMediaAccount,
    ) -> Result<VideoAnalytics, CoreError>;
}

/// Lookup from platform to its registered adapter.
pub struct PlatformRegistry {
    clients: HashMap<Platform, Arc<dyn PlatformClient>>,
}

impl PlatformRegistry {
    pub fn new(clients: Vec<Arc<dyn PlatformClient>>) -> Self {
        let mut map: HashMap<Platform, Arc<dyn PlatformClient>> = HashMap::new();
        for client in clients {
            let platform = client.platform();
            if map.insert(platform, client).is_some() {
                tracing::warn!("Duplicate adapter for {}, keeping the last one", platform);
            }
        }
        Self { clients: map }
    }

    /// Registry wired with the stub adapters for every supported platform.
    pub fn stubs() -> Self {
        Self::new(vec![
            Arc::new(youtube::YoutubeClient),
            Arc::new(instagram::InstagramClient),
            Arc::new(twitter::TwitterClient),
        ])
    }

    pub fn client(&self, platform: Platform) -> Result<&Arc<dyn PlatformClient>, CoreError> {
        self.clients
            .get(&platform)
            .ok_or_else(|| CoreError::UnsupportedPlatform {
                platform: platform.to_string(),
            })
    }

    /// Upload the same video through every account concurrently. Any single
    /// failure fails the whole batch.
    pub async fn upload_to_all(
        &self,
        video: &VideoPost,
        accounts: &[SocialMediaAccount],
    ) -> Result<BTreeMap<Platform, String>, CoreError> {
        let uploads = accounts.iter().map(|account| async move {
            let client = self.client(account.platform)?;
            let content_id = client.upload_video(video, account).await?;
            Ok::<_, CoreError>((account.platform, content_id))
        });
        Ok(try_join_all(uploads).await?.into_iter().collect())
    }

    /// Fetch analytics for the video through every account concurrently,
    /// joining all snapshots. Uses the stored per-platform content id when
    /// the video carries one, the video id otherwise.
    pub async fn analytics_for_all(
        &self,
        video: &VideoPost,
        accounts: &[SocialMediaAccount],
    ) -> Result<Vec<VideoAnalytics>, CoreError> {
        let polls = accounts.iter().map(|account| async move {
            let client = self.client(account.platform)?;
            let content_id = video
                .platform_ids
                .as_ref()
                .and_then(|ids| ids.get(&account.platform))
                .map(String::as_str)
                .unwrap_or(&video.id);
            client.fetch_analytics(content_id, account).await
        });
        try_join_all(polls).await
    }
}
