use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument};

use crate::{auth::jwt::AuthUser, onboarding::repo, state::AppState};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/onboarding/draft", get(get_draft).put(put_draft))
        .route("/onboarding/complete", post(complete))
}

fn internal<E: std::fmt::Display>(e: E) -> (StatusCode, String) {
    (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
}

/// Accepts whatever partial state the onboarding wizard has; the write is
/// coalesced and happens shortly after, so this returns before the draft is
/// durable.
#[instrument(skip(state, draft))]
pub async fn put_draft(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(draft): Json<serde_json::Value>,
) -> StatusCode {
    state.drafts.queue(user_id, draft);
    StatusCode::NO_CONTENT
}

#[instrument(skip(state))]
pub async fn get_draft(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<serde_json::Value>, (StatusCode, String)> {
    state.drafts.flush().await.map_err(internal)?;
    let draft = repo::get_draft(&state.db, user_id)
        .await
        .map_err(internal)?
        .ok_or((StatusCode::NOT_FOUND, "No draft".to_string()))?;
    Ok(Json(draft))
}

#[instrument(skip(state))]
pub async fn complete(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<StatusCode, (StatusCode, String)> {
    state.drafts.flush().await.map_err(internal)?;
    repo::clear_draft(&state.db, user_id)
        .await
        .map_err(internal)?;
    info!(user_id = %user_id, "onboarding completed");
    Ok(StatusCode::NO_CONTENT)
}
