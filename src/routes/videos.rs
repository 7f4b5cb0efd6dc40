//! Video post CRUD and scheduling actions (/videos/*)

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::AppState;
use crate::models::{Platform, PostStatus, VideoPost};
use crate::services::error::LogCoreErr;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/videos", get(list_videos).post(create_video))
        .route(
            "/videos/{id}",
            get(get_video).put(update_video).delete(delete_video),
        )
        .route("/videos/{id}/schedule", post(schedule_video))
        .route("/videos/{id}/cancel", post(cancel_video))
        .route("/videos/{id}/reschedule", post(reschedule_video))
        .route("/videos/{id}/publish", post(publish_video))
}

/// GET /videos - List every video post
async fn list_videos(State(state): State<Arc<AppState>>) -> Json<Vec<VideoPost>> {
    Json(state.store.video_posts())
}

#[derive(Deserialize)]
struct CreateVideoRequest {
    title: String,
    #[serde(default)]
    description: String,
    video_url: String,
    #[serde(default)]
    thumbnail_url: String,
    scheduled_date: DateTime<Utc>,
    platforms: Vec<Platform>,
}

/// POST /videos - Create a new post as a draft
async fn create_video(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateVideoRequest>,
) -> (StatusCode, Json<VideoPost>) {
    let video = VideoPost {
        id: Uuid::new_v4().to_string(),
        title: req.title,
        description: req.description,
        video_url: req.video_url,
        thumbnail_url: req.thumbnail_url,
        scheduled_date: req.scheduled_date,
        status: PostStatus::Draft,
        platforms: req.platforms,
        platform_ids: None,
        analytics: None,
    };
    state.store.save_video_post(&video);

    (StatusCode::CREATED, Json(video))
}

/// GET /videos/{id}
async fn get_video(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<VideoPost>, StatusCode> {
    state.store.video_post(&id).map(Json).ok_or(StatusCode::NOT_FOUND)
}

#[derive(Deserialize)]
struct UpdateVideoRequest {
    title: Option<String>,
    description: Option<String>,
    video_url: Option<String>,
    thumbnail_url: Option<String>,
    scheduled_date: Option<DateTime<Utc>>,
    platforms: Option<Vec<Platform>>,
}

/// PUT /videos/{id} - Edit a draft or failed post. The result is a draft
/// again, so a failed post can be fixed up and rescheduled. Scheduled posts
/// must be cancelled first; published posts are immutable.
async fn update_video(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<UpdateVideoRequest>,
) -> Result<Json<VideoPost>, StatusCode> {
    let mut video = state
        .store
        .video_post(&id)
        .ok_or(StatusCode::NOT_FOUND)?;
    if matches!(video.status, PostStatus::Scheduled | PostStatus::Published) {
        return Err(StatusCode::CONFLICT);
    }

    if let Some(title) = req.title {
        video.title = title;
    }
    if let Some(description) = req.description {
        video.description = description;
    }
    if let Some(video_url) = req.video_url {
        video.video_url = video_url;
    }
    if let Some(thumbnail_url) = req.thumbnail_url {
        video.thumbnail_url = thumbnail_url;
    }
    if let Some(scheduled_date) = req.scheduled_date {
        video.scheduled_date = scheduled_date;
    }
    if let Some(platforms) = req.platforms {
        video.platforms = platforms;
    }
    video.status = PostStatus::Draft;
    state.store.save_video_post(&video);

    Ok(Json(video))
}

/// DELETE /videos/{id} - Remove the post and stop any pending timers.
/// Deleting an unknown id is a no-op.
async fn delete_video(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> StatusCode {
    state.pipeline.remove_video(&id);
    StatusCode::NO_CONTENT
}

#[derive(Deserialize)]
struct ScheduleRequest {
    scheduled_date: DateTime<Utc>,
}

/// POST /videos/{id}/schedule - Arm the publish timer for a future date
async fn schedule_video(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<ScheduleRequest>,
) -> Result<Json<VideoPost>, StatusCode> {
    let mut video = state
        .store
        .video_post(&id)
        .ok_or(StatusCode::NOT_FOUND)?;
    video.scheduled_date = req.scheduled_date;

    let scheduled = state
        .pipeline
        .schedule_video(&video)
        .log_api("Schedule error")?;
    Ok(Json(scheduled))
}

/// POST /videos/{id}/cancel - Revert a scheduled post to draft. A no-op for
/// posts that are not scheduled.
async fn cancel_video(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<VideoPost>, StatusCode> {
    state.pipeline.cancel_scheduled_video(&id);
    state.store.video_post(&id).map(Json).ok_or(StatusCode::NOT_FOUND)
}

/// POST /videos/{id}/reschedule - Move the pending publish to a new date
async fn reschedule_video(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<ScheduleRequest>,
) -> Result<Json<VideoPost>, StatusCode> {
    let video = state
        .pipeline
        .reschedule_video(&id, req.scheduled_date)
        .log_api("Reschedule error")?;
    video.map(Json).ok_or(StatusCode::NOT_FOUND)
}

/// POST /videos/{id}/publish - Publish immediately
async fn publish_video(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<VideoPost>, StatusCode> {
    let published = state
        .pipeline
        .publish_video(&id)
        .await
        .log_api("Publish error")?;
    Ok(Json(published))
}
