use std::collections::HashMap;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use time::Date;
use tracing::instrument;

use crate::{
    auth::jwt::AuthUser,
    diary::dto::DayQuery,
    domain::datekey::{add_days, clamp_day, format_day_key, parse_day_key},
    domain::units::round1,
    profile, summary::repo,
    state::AppState,
};

/// Longest span the range endpoint will aggregate in one call.
const MAX_RANGE_DAYS: i64 = 30;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/summary", get(get_summary))
        .route("/summary/range", get(get_range_summary))
}

#[derive(Debug, Serialize)]
pub struct DaySummary {
    pub day: String,
    pub entries: i64,
    pub calories_in: f64,
    pub protein_g: f64,
    pub carb_g: f64,
    pub fat_g: f64,
    pub sugar_g: f64,
    pub fiber_g: f64,
    pub sodium_mg: f64,
    pub water_ml: f64,
    pub exercise_kcal: f64,
    pub calorie_target: Option<f64>,
    /// Target minus eaten, with exercise calories credited back.
    pub calories_remaining: Option<f64>,
    pub water_target_ml: Option<f64>,
    pub water_remaining_ml: Option<f64>,
}

fn internal<E: std::fmt::Display>(e: E) -> (StatusCode, String) {
    (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
}

#[instrument(skip(state))]
pub async fn get_summary(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(q): Query<DayQuery>,
) -> Result<Json<DaySummary>, (StatusCode, String)> {
    let day = parse_day_key(&q.day).map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;

    let macros = repo::macro_totals(&state.db, user_id, day)
        .await
        .map_err(internal)?;
    let water_ml = repo::water_total_ml(&state.db, user_id, day)
        .await
        .map_err(internal)?;
    let exercise_kcal = repo::exercise_burned_kcal(&state.db, user_id, day)
        .await
        .map_err(internal)?;
    let profile = profile::repo::get(&state.db, user_id)
        .await
        .map_err(internal)?;

    let calorie_target = profile.as_ref().and_then(|p| p.calorie_target);
    let water_target_ml = profile.as_ref().and_then(|p| p.water_target_ml);

    Ok(Json(DaySummary {
        day: q.day,
        entries: macros.entries,
        calories_in: round1(macros.calories),
        protein_g: round1(macros.protein_g),
        carb_g: round1(macros.carb_g),
        fat_g: round1(macros.fat_g),
        sugar_g: round1(macros.sugar_g),
        fiber_g: round1(macros.fiber_g),
        sodium_mg: round1(macros.sodium_mg),
        water_ml: round1(water_ml),
        exercise_kcal: round1(exercise_kcal),
        calorie_target,
        calories_remaining: calorie_target
            .map(|t| round1(t - macros.calories + exercise_kcal)),
        water_target_ml,
        water_remaining_ml: water_target_ml.map(|t| round1((t - water_ml).max(0.0))),
    }))
}

/// Inclusive day range ending at `end`; defaults to the trailing week. An
/// explicit `start` is clamped so one request cannot sweep unbounded history.
#[derive(Debug, Deserialize)]
pub struct RangeQuery {
    pub end: String,
    pub start: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RangeDay {
    pub day: String,
    pub calories_in: f64,
    pub water_ml: f64,
    pub exercise_kcal: f64,
}

#[instrument(skip(state))]
pub async fn get_range_summary(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(q): Query<RangeQuery>,
) -> Result<Json<Vec<RangeDay>>, (StatusCode, String)> {
    let end = parse_day_key(&q.end).map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;
    let start = match &q.start {
        Some(s) => {
            let parsed =
                parse_day_key(s).map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;
            clamp_day(parsed, add_days(end, -(MAX_RANGE_DAYS - 1)), end)
        }
        None => add_days(end, -6),
    };

    let calories = index_by_day(
        repo::calories_by_day(&state.db, user_id, start, end)
            .await
            .map_err(internal)?,
    );
    let water = index_by_day(
        repo::water_by_day(&state.db, user_id, start, end)
            .await
            .map_err(internal)?,
    );
    let exercise = index_by_day(
        repo::exercise_by_day(&state.db, user_id, start, end)
            .await
            .map_err(internal)?,
    );

    let span = (end - start).whole_days();
    let mut days = Vec::with_capacity(span as usize + 1);
    for i in 0..=span {
        let day = add_days(start, i);
        days.push(RangeDay {
            day: format_day_key(day),
            calories_in: round1(calories.get(&day).copied().unwrap_or(0.0)),
            water_ml: round1(water.get(&day).copied().unwrap_or(0.0)),
            exercise_kcal: round1(exercise.get(&day).copied().unwrap_or(0.0)),
        });
    }
    Ok(Json(days))
}

fn index_by_day(rows: Vec<repo::DayTotal>) -> HashMap<Date, f64> {
    rows.into_iter().map(|r| (r.day, r.total)).collect()
}
