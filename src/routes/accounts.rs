//! Connected account endpoints (/accounts/*)

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::get,
};
use std::sync::Arc;

use crate::AppState;
use crate::models::SocialMediaAccount;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/accounts", get(list_accounts))
        .route("/accounts/{id}", axum::routing::delete(disconnect_account))
}

/// GET /accounts - List connected accounts
async fn list_accounts(State(state): State<Arc<AppState>>) -> Json<Vec<SocialMediaAccount>> {
    Json(state.store.social_accounts())
}

/// DELETE /accounts/{id} - Disconnect an account. Unknown ids are a no-op.
async fn disconnect_account(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> StatusCode {
    if let Some(account) = state.store.social_account(&id) {
        tracing::info!(platform = %account.platform, username = %account.username, "account disconnected");
    }
    state.store.delete_social_account(&id);
    StatusCode::NO_CONTENT
}
