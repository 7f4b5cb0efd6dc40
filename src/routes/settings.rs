//! User settings endpoints (/settings)

use axum::{Json, Router, extract::State, routing::get};
use std::sync::Arc;

use crate::AppState;
use crate::models::UserSettings;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/settings", get(get_settings).put(put_settings))
}

/// GET /settings - Current settings, or null when never saved
async fn get_settings(State(state): State<Arc<AppState>>) -> Json<Option<UserSettings>> {
    Json(state.store.user_settings())
}

/// PUT /settings - Replace the settings record
async fn put_settings(
    State(state): State<Arc<AppState>>,
    Json(settings): Json<UserSettings>,
) -> Json<UserSettings> {
    state.store.save_user_settings(&settings);
    Json(settings)
}
