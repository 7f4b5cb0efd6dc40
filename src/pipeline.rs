//! Scheduling and publish pipeline.
//!
//! Drives a video post through draft -> scheduled -> published / failed,
//! with scheduled -> draft on cancel. Publishing fans out to every connected
//! account on the video's target platforms; a successful publish arms a
//! recurring analytics poll. Both the one-shot publish timer and the poll
//! task are tracked per video id so cancel, reschedule, delete, and shutdown
//! can abort them deterministically — at most one live timer of each kind
//! per video.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration as StdDuration;

use chrono::{DateTime, Utc};
use tokio::task::JoinHandle;

use crate::error::CoreError;
use crate::models::{PostStatus, SocialMediaAccount, VideoAnalytics, VideoPost};
use crate::oauth::OAuthClient;
use crate::platforms::PlatformRegistry;
use crate::store::Store;

#[derive(Default)]
struct VideoTimers {
    publish: Option<JoinHandle<()>>,
    analytics: Option<JoinHandle<()>>,
}

pub struct VideoPipeline {
    store: Arc<Store>,
    platforms: Arc<PlatformRegistry>,
    oauth: Arc<OAuthClient>,
    analytics_poll: StdDuration,
    timers: Mutex<HashMap<String, VideoTimers>>,
}

impl VideoPipeline {
    pub fn with_poll_interval(
        store: Arc<Store>,
        platforms: Arc<PlatformRegistry>,
        oauth: Arc<OAuthClient>,
        analytics_poll: StdDuration,
    ) -> Arc<Self> {
        Arc::new(Self {
            store,
            platforms,
            oauth,
            analytics_poll,
            timers: Mutex::new(HashMap::new()),
        })
    }

    /// Persist the video as scheduled and arm its publish timer. Fails
    /// without touching the store when the date is not in the future or the
    /// video already reached a terminal state.
    pub fn schedule_video(self: &Arc<Self>, video: &VideoPost) -> Result<VideoPost, CoreError> {
        if video.scheduled_date <= Utc::now() {
            return Err(CoreError::PastScheduleDate {
                scheduled: video.scheduled_date,
            });
        }
        let stored_terminal = self
            .store
            .video_post(&video.id)
            .is_some_and(|v| v.status.is_terminal());
        if stored_terminal || video.status.is_terminal() {
            return Err(CoreError::AlreadyPublished {
                id: video.id.clone(),
            });
        }

        self.cancel_publish_timer(&video.id);

        let mut scheduled = video.clone();
        scheduled.status = PostStatus::Scheduled;
        self.store.save_video_post(&scheduled);
        self.arm_publish_timer(&scheduled.id, scheduled.scheduled_date);

        tracing::info!(video = %scheduled.id, "scheduled for {}", scheduled.scheduled_date);
        Ok(scheduled)
    }

    fn arm_publish_timer(self: &Arc<Self>, id: &str, at: DateTime<Utc>) {
        let pipeline = Arc::clone(self);
        let video_id = id.to_string();
        // Past-due dates (e.g. re-armed after a restart) fire immediately
        let delay = (at - Utc::now()).to_std().unwrap_or(StdDuration::ZERO);

        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            pipeline.fire_publish(&video_id).await;
        });

        let mut timers = self.timers.lock().unwrap_or_else(|e| e.into_inner());
        let entry = timers.entry(id.to_string()).or_default();
        if let Some(prev) = entry.publish.replace(handle) {
            prev.abort();
        }
    }

    /// Timer body. Skips silently when the video was cancelled or deleted
    /// while the timer was pending; any publish error marks the record failed.
    async fn fire_publish(self: &Arc<Self>, id: &str) {
        match self.store.video_post(id) {
            Some(video) if video.status == PostStatus::Scheduled => {}
            _ => return,
        }

        if let Err(e) = self.publish_video(id).await {
            tracing::error!(video = %id, "Scheduled publish failed: {}", e);
            if let Some(mut video) = self.store.video_post(id) {
                if !video.status.is_terminal() {
                    video.status = PostStatus::Failed;
                    self.store.save_video_post(&video);
                }
            }
        }
    }

    /// Publish now: resolve accounts, refresh expired tokens, fan out the
    /// upload, persist the result, and start analytics polling.
    pub async fn publish_video(self: &Arc<Self>, id: &str) -> Result<VideoPost, CoreError> {
        let video = self
            .store
            .video_post(id)
            .ok_or_else(|| CoreError::VideoNotFound { id: id.to_string() })?;
        if video.status.is_terminal() {
            return Err(CoreError::AlreadyPublished {
                id: video.id.clone(),
            });
        }

        let accounts: Vec<SocialMediaAccount> = self
            .store
            .social_accounts()
            .into_iter()
            .filter(|a| video.platforms.contains(&a.platform))
            .collect();
        if accounts.is_empty() {
            return Err(CoreError::NoAccountsForPlatforms);
        }

        match self.run_publish(&video, accounts).await {
            Ok(published) => {
                tracing::info!(video = %published.id, "published to {} platform(s)", published.platforms.len());
                Ok(published)
            }
            Err(e) => {
                tracing::error!(video = %video.id, "Publish failed: {}", e);
                let mut failed = video;
                failed.status = PostStatus::Failed;
                self.store.save_video_post(&failed);
                Err(e)
            }
        }
    }

    async fn run_publish(
        self: &Arc<Self>,
        video: &VideoPost,
        accounts: Vec<SocialMediaAccount>,
    ) -> Result<VideoPost, CoreError> {
        let accounts = self.fresh_accounts(accounts).await?;
        self.process_video(video).await;

        let platform_ids = self.platforms.upload_to_all(video, &accounts).await?;

        let mut published = video.clone();
        published.status = PostStatus::Published;
        published.platform_ids = Some(platform_ids);
        self.store.save_video_post(&published);

        self.start_analytics(&published.id);
        Ok(published)
    }

    /// Refresh any account whose token has expired, persisting the update.
    /// Accounts without an expiry, or without a refresh token, are used as
    /// stored.
    async fn fresh_accounts(
        &self,
        accounts: Vec<SocialMediaAccount>,
    ) -> Result<Vec<SocialMediaAccount>, CoreError> {
        let mut out = Vec::with_capacity(accounts.len());
        for account in accounts {
            let expired = account.expires_at.is_some_and(|at| at < Utc::now());
            if !expired {
                out.push(account);
                continue;
            }
            if account.refresh_token.is_none() {
                tracing::warn!(account = %account.id, "Token expired with no refresh token, using stored token");
                out.push(account);
                continue;
            }
            let refreshed = self.oauth.refresh_account(&account).await?;
            self.store.save_social_account(&refreshed);
            out.push(refreshed);
        }
        Ok(out)
    }

    /// Pre-upload processing hook (transcoding, thumbnail extraction).
    async fn process_video(&self, video: &VideoPost) {
        tracing::info!(video = %video.id, "Processing video: {}", video.title);
    }

    /// Arm the recurring analytics poll for a published video. The first
    /// poll runs immediately; the task stops on its own when the video
    /// disappears from the store and is aborted on delete and shutdown.
    fn start_analytics(self: &Arc<Self>, id: &str) {
        let pipeline = Arc::clone(self);
        let video_id = id.to_string();
        let poll = self.analytics_poll;

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(poll);
            loop {
                ticker.tick().await;
                let Some(video) = pipeline.store.video_post(&video_id) else {
                    break;
                };
                if let Err(e) = pipeline.poll_analytics(&video).await {
                    tracing::warn!(video = %video_id, "Analytics poll failed: {}", e);
                }
            }
        });

        let mut timers = self.timers.lock().unwrap_or_else(|e| e.into_inner());
        let entry = timers.entry(id.to_string()).or_default();
        if let Some(prev) = entry.analytics.replace(handle) {
            prev.abort();
        }
    }

    /// One poll cycle: fetch per-platform snapshots through the accounts
    /// currently in the store and persist the aggregate onto the record.
    async fn poll_analytics(&self, video: &VideoPost) -> Result<(), CoreError> {
        let accounts: Vec<SocialMediaAccount> = self
            .store
            .social_accounts()
            .into_iter()
            .filter(|a| video.platforms.contains(&a.platform))
            .collect();

        let snapshots = self.platforms.analytics_for_all(video, &accounts).await?;
        let Some(aggregate) = VideoAnalytics::aggregate(&snapshots) else {
            return Ok(());
        };

        // Re-read before writing: the record may have changed during the fetch
        let Some(mut current) = self.store.video_post(&video.id) else {
            return Ok(());
        };
        current.analytics = Some(aggregate);
        self.store.save_video_post(&current);
        Ok(())
    }

    /// Abort the pending publish and put a scheduled video back into draft.
    /// Returns whether a scheduled record was reverted.
    pub fn cancel_scheduled_video(&self, id: &str) -> bool {
        self.cancel_publish_timer(id);
        match self.store.video_post(id) {
            Some(mut video) if video.status == PostStatus::Scheduled => {
                video.status = PostStatus::Draft;
                self.store.save_video_post(&video);
                tracing::info!(video = %id, "schedule cancelled");
                true
            }
            _ => false,
        }
    }

    /// Re-schedule with a new date. The prior timer is cancelled before the
    /// new one is armed, so the publish fires exactly once. Unknown ids are
    /// a no-op.
    pub fn reschedule_video(
        self: &Arc<Self>,
        id: &str,
        new_date: DateTime<Utc>,
    ) -> Result<Option<VideoPost>, CoreError> {
        let Some(mut video) = self.store.video_post(id) else {
            return Ok(None);
        };
        video.scheduled_date = new_date;
        self.schedule_video(&video).map(Some)
    }

    /// Delete a video and stop any timers attached to it.
    pub fn remove_video(&self, id: &str) {
        self.abort_timers(id);
        self.store.delete_video_post(id);
    }

    /// Re-arm timers after a restart: pending schedules fire again (past-due
    /// ones immediately) and published videos resume analytics polling.
    pub fn restore(self: &Arc<Self>) {
        for video in self.store.video_posts() {
            match video.status {
                PostStatus::Scheduled => self.arm_publish_timer(&video.id, video.scheduled_date),
                PostStatus::Published => self.start_analytics(&video.id),
                _ => {}
            }
        }
    }

    /// Abort every live timer.
    pub fn shutdown(&self) {
        let mut timers = self.timers.lock().unwrap_or_else(|e| e.into_inner());
        for (_, entry) in timers.drain() {
            if let Some(handle) = entry.publish {
                handle.abort();
            }
            if let Some(handle) = entry.analytics {
                handle.abort();
            }
        }
    }

    fn cancel_publish_timer(&self, id: &str) {
        let mut timers = self.timers.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(entry) = timers.get_mut(id) {
            if let Some(handle) = entry.publish.take() {
                handle.abort();
            }
        }
    }

    fn abort_timers(&self, id: &str) {
        let mut timers = self.timers.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(entry) = timers.remove(id) {
            if let Some(handle) = entry.publish {
                handle.abort();
            }
            if let Some(handle) = entry.analytics {
                handle.abort();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Platform;
    use crate::oauth::OAuthConfig;
    use crate::platforms::PlatformClient;
    use async_trait::async_trait;
    use chrono::Duration;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    struct MockClient {
        platform: Platform,
        uploads: Arc<AtomicUsize>,
        polls: Arc<AtomicUsize>,
        fail_uploads: bool,
    }

    impl MockClient {
        fn new(platform: Platform) -> (Arc<Self>, Arc<AtomicUsize>, Arc<AtomicUsize>) {
            let uploads = Arc::new(AtomicUsize::new(0));
            let polls = Arc::new(AtomicUsize::new(0));
            let client = Arc::new(Self {
                platform,
                uploads: uploads.clone(),
                polls: polls.clone(),
                fail_uploads: false,
            });
            (client, uploads, polls)
        }

        fn failing(platform: Platform) -> (Arc<Self>, Arc<AtomicUsize>) {
            let uploads = Arc::new(AtomicUsize::new(0));
            let client = Arc::new(Self {
                platform,
                uploads: uploads.clone(),
                polls: Arc::new(AtomicUsize::new(0)),
                fail_uploads: true,
            });
            (client, uploads)
        }
    }

    #[async_trait]
    impl PlatformClient for MockClient {
        fn platform(&self) -> Platform {
            self.platform
        }

        async fn upload_video(
            &self,
            _video: &VideoPost,
            _account: &SocialMediaAccount,
        ) -> Result<String, CoreError> {
            self.uploads.fetch_add(1, Ordering::SeqCst);
            if self.fail_uploads {
                return Err(CoreError::Upload {
                    platform: self.platform,
                    message: "mock upload failure".to_string(),
                });
            }
            Ok(format!("{}-content-id", self.platform))
        }

        async fn fetch_analytics(
            &self,
            _content_id: &str,
            _account: &SocialMediaAccount,
        ) -> Result<VideoAnalytics, CoreError> {
            self.polls.fetch_add(1, Ordering::SeqCst);
            Ok(VideoAnalytics {
                views: 10,
                likes: 5,
                comments: 2,
                shares: 1,
                engagement_rate: 50.0,
            })
        }
    }

    fn pipeline_with(
        clients: Vec<Arc<dyn PlatformClient>>,
        oauth: OAuthClient,
        poll: StdDuration,
    ) -> (Arc<VideoPipeline>, Arc<Store>) {
        let store = Arc::new(Store::in_memory());
        let pipeline = VideoPipeline::with_poll_interval(
            store.clone(),
            Arc::new(PlatformRegistry::new(clients)),
            Arc::new(oauth),
            poll,
        );
        (pipeline, store)
    }

    fn no_oauth() -> OAuthClient {
        OAuthClient::new(HashMap::new())
    }

    fn draft(id: &str, offset_ms: i64) -> VideoPost {
        VideoPost {
            id: id.to_string(),
            title: format!("video {}", id),
            description: String::new(),
            video_url: "https://cdn.example.com/v.mp4".to_string(),
            thumbnail_url: String::new(),
            scheduled_date: Utc::now() + Duration::milliseconds(offset_ms),
            status: PostStatus::Draft,
            platforms: vec![Platform::Twitter],
            platform_ids: None,
            analytics: None,
        }
    }

    fn twitter_account(id: &str) -> SocialMediaAccount {
        SocialMediaAccount {
            id: id.to_string(),
            platform: Platform::Twitter,
            username: "tester".to_string(),
            access_token: "token".to_string(),
            refresh_token: None,
            expires_at: None,
        }
    }

    #[tokio::test]
    async fn test_past_date_rejected_without_store_mutation() {
        let (client, _, _) = MockClient::new(Platform::Twitter);
        let (pipeline, store) = pipeline_with(vec![client], no_oauth(), StdDuration::from_secs(60));

        let err = pipeline.schedule_video(&draft("v1", -1000)).unwrap_err();
        assert!(matches!(err, CoreError::PastScheduleDate { .. }));
        assert!(store.video_posts().is_empty());
    }

    #[tokio::test]
    async fn test_schedule_publishes_at_the_scheduled_time() {
        let (client, uploads, _) = MockClient::new(Platform::Twitter);
        let (pipeline, store) = pipeline_with(vec![client], no_oauth(), StdDuration::from_secs(60));
        store.save_social_account(&twitter_account("acc1"));

        let scheduled = pipeline.schedule_video(&draft("v1", 100)).unwrap();
        assert_eq!(scheduled.status, PostStatus::Scheduled);
        assert_eq!(store.video_post("v1").unwrap().status, PostStatus::Scheduled);

        tokio::time::sleep(StdDuration::from_millis(500)).await;

        let published = store.video_post("v1").unwrap();
        assert_eq!(published.status, PostStatus::Published);
        assert_eq!(uploads.load(Ordering::SeqCst), 1);
        assert_eq!(
            published
                .platform_ids
                .as_ref()
                .and_then(|ids| ids.get(&Platform::Twitter))
                .map(String::as_str),
            Some("twitter-content-id")
        );
        // First analytics poll runs immediately after publish
        assert!(published.analytics.is_some());
        assert_eq!(published.analytics.unwrap().views, 10);
    }

    #[tokio::test]
    async fn test_publish_without_matching_accounts() {
        let (client, uploads, _) = MockClient::new(Platform::Twitter);
        let (pipeline, store) = pipeline_with(vec![client], no_oauth(), StdDuration::from_secs(60));
        store.save_video_post(&draft("v1", 60_000));

        let err = pipeline.publish_video("v1").await.unwrap_err();
        assert!(matches!(err, CoreError::NoAccountsForPlatforms));
        // No gateway call, status untouched
        assert_eq!(uploads.load(Ordering::SeqCst), 0);
        assert_eq!(store.video_post("v1").unwrap().status, PostStatus::Draft);
    }

    #[tokio::test]
    async fn test_cancel_prevents_publish() {
        let (client, uploads, _) = MockClient::new(Platform::Twitter);
        let (pipeline, store) = pipeline_with(vec![client], no_oauth(), StdDuration::from_secs(60));
        store.save_social_account(&twitter_account("acc1"));

        pipeline.schedule_video(&draft("v1", 150)).unwrap();
        assert!(pipeline.cancel_scheduled_video("v1"));
        assert_eq!(store.video_post("v1").unwrap().status, PostStatus::Draft);

        tokio::time::sleep(StdDuration::from_millis(400)).await;
        assert_eq!(store.video_post("v1").unwrap().status, PostStatus::Draft);
        assert_eq!(uploads.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_cancel_of_unknown_or_draft_is_noop() {
        let (client, _, _) = MockClient::new(Platform::Twitter);
        let (pipeline, store) = pipeline_with(vec![client], no_oauth(), StdDuration::from_secs(60));

        assert!(!pipeline.cancel_scheduled_video("missing"));

        store.save_video_post(&draft("v1", 60_000));
        assert!(!pipeline.cancel_scheduled_video("v1"));
        assert_eq!(store.video_post("v1").unwrap().status, PostStatus::Draft);
    }

    #[tokio::test]
    async fn test_reschedule_fires_exactly_once() {
        let (client, uploads, _) = MockClient::new(Platform::Twitter);
        let (pipeline, store) = pipeline_with(vec![client], no_oauth(), StdDuration::from_secs(60));
        store.save_social_account(&twitter_account("acc1"));

        pipeline.schedule_video(&draft("v1", 150)).unwrap();
        let rescheduled = pipeline
            .reschedule_video("v1", Utc::now() + Duration::milliseconds(350))
            .unwrap()
            .expect("video exists");
        assert_eq!(rescheduled.status, PostStatus::Scheduled);

        // Past the first deadline, before the second: nothing yet
        tokio::time::sleep(StdDuration::from_millis(250)).await;
        assert_eq!(uploads.load(Ordering::SeqCst), 0);

        tokio::time::sleep(StdDuration::from_millis(400)).await;
        assert_eq!(uploads.load(Ordering::SeqCst), 1);
        assert_eq!(store.video_post("v1").unwrap().status, PostStatus::Published);
    }

    #[tokio::test]
    async fn test_reschedule_unknown_id_is_noop() {
        let (client, _, _) = MockClient::new(Platform::Twitter);
        let (pipeline, _store) = pipeline_with(vec![client], no_oauth(), StdDuration::from_secs(60));

        let result = pipeline
            .reschedule_video("missing", Utc::now() + Duration::hours(1))
            .unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_terminal_video_cannot_be_scheduled_or_published() {
        let (client, _, _) = MockClient::new(Platform::Twitter);
        let (pipeline, store) = pipeline_with(vec![client], no_oauth(), StdDuration::from_secs(60));
        store.save_social_account(&twitter_account("acc1"));

        let mut published = draft("v1", 60_000);
        published.status = PostStatus::Published;
        store.save_video_post(&published);

        let err = pipeline.publish_video("v1").await.unwrap_err();
        assert!(matches!(err, CoreError::AlreadyPublished { .. }));

        let mut again = draft("v1", 60_000);
        again.status = PostStatus::Draft;
        let err = pipeline.schedule_video(&again).unwrap_err();
        assert!(matches!(err, CoreError::AlreadyPublished { .. }));
    }

    #[tokio::test]
    async fn test_publish_unknown_video() {
        let (client, _, _) = MockClient::new(Platform::Twitter);
        let (pipeline, _store) = pipeline_with(vec![client], no_oauth(), StdDuration::from_secs(60));

        let err = pipeline.publish_video("missing").await.unwrap_err();
        assert!(matches!(err, CoreError::VideoNotFound { .. }));
    }

    #[tokio::test]
    async fn test_failed_upload_marks_video_failed() {
        let (client, uploads) = MockClient::failing(Platform::Twitter);
        let (pipeline, store) = pipeline_with(vec![client], no_oauth(), StdDuration::from_secs(60));
        store.save_social_account(&twitter_account("acc1"));
        store.save_video_post(&draft("v1", 60_000));

        let err = pipeline.publish_video("v1").await.unwrap_err();
        assert!(matches!(err, CoreError::Upload { .. }));
        assert_eq!(uploads.load(Ordering::SeqCst), 1);
        assert_eq!(store.video_post("v1").unwrap().status, PostStatus::Failed);
    }

    #[tokio::test]
    async fn test_timer_skips_when_record_no_longer_scheduled() {
        let (client, uploads, _) = MockClient::new(Platform::Twitter);
        let (pipeline, store) = pipeline_with(vec![client], no_oauth(), StdDuration::from_secs(60));
        store.save_social_account(&twitter_account("acc1"));

        pipeline.schedule_video(&draft("v1", 100)).unwrap();

        // Flip the record back to draft behind the pipeline's back; the
        // timer must notice and do nothing.
        let mut video = store.video_post("v1").unwrap();
        video.status = PostStatus::Draft;
        store.save_video_post(&video);

        tokio::time::sleep(StdDuration::from_millis(400)).await;
        assert_eq!(uploads.load(Ordering::SeqCst), 0);
        assert_eq!(store.video_post("v1").unwrap().status, PostStatus::Draft);
    }

    #[tokio::test]
    async fn test_remove_video_stops_analytics_polling() {
        let (client, _, polls) = MockClient::new(Platform::Twitter);
        let (pipeline, store) =
            pipeline_with(vec![client], no_oauth(), StdDuration::from_millis(50));
        store.save_social_account(&twitter_account("acc1"));
        store.save_video_post(&draft("v1", 60_000));

        pipeline.publish_video("v1").await.unwrap();
        tokio::time::sleep(StdDuration::from_millis(180)).await;
        assert!(polls.load(Ordering::SeqCst) >= 2);

        pipeline.remove_video("v1");
        assert!(store.video_post("v1").is_none());

        tokio::time::sleep(StdDuration::from_millis(100)).await;
        let frozen = polls.load(Ordering::SeqCst);
        tokio::time::sleep(StdDuration::from_millis(250)).await;
        assert_eq!(polls.load(Ordering::SeqCst), frozen);
    }

    #[tokio::test]
    async fn test_restore_rearms_overdue_schedule() {
        let (client, uploads, _) = MockClient::new(Platform::Twitter);
        let (pipeline, store) = pipeline_with(vec![client], no_oauth(), StdDuration::from_secs(60));
        store.save_social_account(&twitter_account("acc1"));

        // A schedule left over from before a restart, already past due
        let mut video = draft("v1", -5_000);
        video.status = PostStatus::Scheduled;
        store.save_video_post(&video);

        pipeline.restore();
        tokio::time::sleep(StdDuration::from_millis(300)).await;

        assert_eq!(store.video_post("v1").unwrap().status, PostStatus::Published);
        assert_eq!(uploads.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_publish_refreshes_expired_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .and(body_string_contains("grant_type=refresh_token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "refreshed-token",
                "expires_in": 3600
            })))
            .mount(&server)
            .await;

        let mut config = OAuthConfig::with_credentials(
            Platform::Twitter,
            "cid".to_string(),
            "secret".to_string(),
            "http://localhost:3000",
        );
        config.token_url = format!("{}/token", server.uri());
        let mut configs = HashMap::new();
        configs.insert(Platform::Twitter, config);

        let (client, uploads, _) = MockClient::new(Platform::Twitter);
        let (pipeline, store) =
            pipeline_with(vec![client], OAuthClient::new(configs), StdDuration::from_secs(60));

        let mut account = twitter_account("acc1");
        account.refresh_token = Some("r1".to_string());
        account.expires_at = Some(Utc::now() - Duration::hours(1));
        store.save_social_account(&account);
        store.save_video_post(&draft("v1", 60_000));

        pipeline.publish_video("v1").await.unwrap();

        assert_eq!(uploads.load(Ordering::SeqCst), 1);
        let stored = store.social_account("acc1").unwrap();
        assert_eq!(stored.access_token, "refreshed-token");
        assert_eq!(stored.refresh_token.as_deref(), Some("r1"));
    }

    #[tokio::test]
    async fn test_shutdown_aborts_pending_timers() {
        let (client, uploads, _) = MockClient::new(Platform::Twitter);
        let (pipeline, store) = pipeline_with(vec![client], no_oauth(), StdDuration::from_secs(60));
        store.save_social_account(&twitter_account("acc1"));

        pipeline.schedule_video(&draft("v1", 150)).unwrap();
        pipeline.shutdown();

        tokio::time::sleep(StdDuration::from_millis(400)).await;
        assert_eq!(uploads.load(Ordering::SeqCst), 0);
        // Still scheduled in the store; restore() would re-arm it
        assert_eq!(store.video_post("v1").unwrap().status, PostStatus::Scheduled);
    }
}
