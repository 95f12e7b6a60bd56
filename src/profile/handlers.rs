use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use tracing::{info, instrument, warn};

use crate::{
    auth::jwt::AuthUser,
    domain::{goals, units::round3},
    profile::dto::{ProfileResponse, SetGoalRequest, UpdateProfileRequest},
    profile::repo,
    state::AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/profile", get(get_profile).put(put_profile))
        .route("/profile/goal", put(put_goal))
}

fn internal<E: std::fmt::Display>(e: E) -> (StatusCode, String) {
    (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
}

#[instrument(skip(state))]
pub async fn get_profile(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<ProfileResponse>, (StatusCode, String)> {
    let profile = repo::get(&state.db, user_id).await.map_err(internal)?;
    Ok(Json(
        profile.map(ProfileResponse::from).unwrap_or_else(ProfileResponse::empty),
    ))
}

#[instrument(skip(state, payload))]
pub async fn put_profile(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<Json<ProfileResponse>, (StatusCode, String)> {
    for target in [payload.calorie_target, payload.water_target_ml]
        .into_iter()
        .flatten()
    {
        if !target.is_finite() || target <= 0.0 {
            return Err((StatusCode::BAD_REQUEST, "Targets must be positive".into()));
        }
    }

    let profile = repo::upsert(
        &state.db,
        user_id,
        payload.display_name.as_deref(),
        payload.weight_unit.as_str(),
        payload.calorie_target,
        payload.water_target_ml,
    )
    .await
    .map_err(internal)?;

    info!(user_id = %user_id, "profile updated");
    Ok(Json(ProfileResponse::from(profile)))
}

#[instrument(skip(state, payload))]
pub async fn put_goal(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<SetGoalRequest>,
) -> Result<Json<ProfileResponse>, (StatusCode, String)> {
    let current_kg = payload.unit.to_kg(payload.current_weight);
    let target_kg = payload.unit.to_kg(payload.target_weight);

    if let Err(e) = goals::validate_goal_weight(payload.goal_kind, current_kg, target_kg) {
        warn!(user_id = %user_id, goal = payload.goal_kind.as_str(), error = %e, "goal rejected");
        return Err((StatusCode::UNPROCESSABLE_ENTITY, e.i18n_key()));
    }

    // Keep sub-gram precision so a target entered in pounds round-trips.
    let profile = repo::set_goal(
        &state.db,
        user_id,
        payload.goal_kind.as_str(),
        round3(target_kg),
    )
    .await
    .map_err(internal)?;

    info!(user_id = %user_id, goal = payload.goal_kind.as_str(), "goal updated");
    Ok(Json(ProfileResponse::from(profile)))
}
