use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::{
    auth::jwt::AuthUser,
    diary::dto::{CreateEntryRequest, DayQuery, EntryDetails, EntryResponse, ScorePreviewRequest},
    diary::repo::{self, NewEntry},
    domain::datekey::parse_day_key,
    domain::score::{compute_avo_score, normalize_to_basis, AvoScoreResult},
    state::AppState,
};

pub fn read_routes() -> Router<AppState> {
    Router::new()
        .route("/diary", get(list_entries))
        .route("/diary/:id", get(get_entry))
}

pub fn write_routes() -> Router<AppState> {
    Router::new()
        .route("/diary", post(create_entry))
        .route("/diary/:id", axum::routing::delete(delete_entry))
        .route("/score", post(score_preview))
}

fn internal<E: std::fmt::Display>(e: E) -> (StatusCode, String) {
    (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
}

#[instrument(skip(state, payload))]
pub async fn create_entry(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<CreateEntryRequest>,
) -> Result<(StatusCode, Json<EntryDetails>), (StatusCode, String)> {
    let day = parse_day_key(&payload.day)
        .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;
    if payload.name.trim().is_empty() {
        return Err((StatusCode::BAD_REQUEST, "name is required".into()));
    }
    if !payload.serving_amount.is_finite() || payload.serving_amount <= 0.0 {
        return Err((
            StatusCode::BAD_REQUEST,
            "serving_amount must be positive".into(),
        ));
    }

    let per100 = normalize_to_basis(&payload.nutrients, payload.serving_amount);
    let scored = compute_avo_score(&per100);

    let entry = repo::insert(
        &state.db,
        NewEntry {
            user_id,
            day,
            name: payload.name.trim(),
            serving_amount: payload.serving_amount,
            serving_unit: &payload.serving_unit,
            nutrients: &payload.nutrients,
            score: scored.score as i16,
            grade: scored.grade.as_str(),
        },
    )
    .await
    .map_err(internal)?;

    info!(user_id = %user_id, entry_id = %entry.id, score = scored.score, "diary entry created");
    Ok((
        StatusCode::CREATED,
        Json(EntryDetails {
            entry: EntryResponse::from(entry),
            reasons: scored.reasons,
        }),
    ))
}

#[instrument(skip(state))]
pub async fn list_entries(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(q): Query<DayQuery>,
) -> Result<Json<Vec<EntryResponse>>, (StatusCode, String)> {
    let day = parse_day_key(&q.day).map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;
    let entries = repo::list_by_day(&state.db, user_id, day)
        .await
        .map_err(internal)?;
    Ok(Json(entries.into_iter().map(EntryResponse::from).collect()))
}

#[instrument(skip(state))]
pub async fn get_entry(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<EntryDetails>, (StatusCode, String)> {
    let entry = repo::get(&state.db, user_id, id)
        .await
        .map_err(internal)?
        .ok_or((StatusCode::NOT_FOUND, "Entry not found".to_string()))?;

    // Reasons are not persisted; recompute them from the stored nutrients.
    let per100 = normalize_to_basis(&entry.nutrients(), entry.serving_amount);
    let scored = compute_avo_score(&per100);

    Ok(Json(EntryDetails {
        entry: EntryResponse::from(entry),
        reasons: scored.reasons,
    }))
}

#[instrument(skip(state))]
pub async fn delete_entry(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, (StatusCode, String)> {
    let removed = repo::delete(&state.db, user_id, id)
        .await
        .map_err(internal)?;
    if !removed {
        warn!(user_id = %user_id, entry_id = %id, "delete for missing entry");
        return Err((StatusCode::NOT_FOUND, "Entry not found".into()));
    }
    Ok(StatusCode::NO_CONTENT)
}

/// Score a nutrient profile without logging anything.
#[instrument(skip(payload))]
pub async fn score_preview(
    AuthUser(_user_id): AuthUser,
    Json(payload): Json<ScorePreviewRequest>,
) -> Json<AvoScoreResult> {
    let per100 = match payload.serving_amount {
        Some(amount) => normalize_to_basis(&payload.nutrients, amount),
        None => payload.nutrients,
    };
    Json(compute_avo_score(&per100))
}
