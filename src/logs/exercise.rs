use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::{Date, OffsetDateTime};
use tracing::instrument;
use uuid::Uuid;

use crate::{
    auth::jwt::AuthUser,
    diary::dto::DayQuery,
    domain::datekey::{format_day_key, parse_day_key},
    state::AppState,
};

#[derive(Debug, Deserialize)]
pub struct CreateExerciseRequest {
    pub day: String,
    pub name: String,
    pub duration_min: f64,
    pub calories_burned: f64,
}

#[derive(Debug, Serialize)]
pub struct ExerciseLogResponse {
    pub id: Uuid,
    pub day: String,
    pub name: String,
    pub duration_min: f64,
    pub calories_burned: f64,
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, FromRow)]
pub struct ExerciseLog {
    pub id: Uuid,
    pub user_id: Uuid,
    pub day: Date,
    pub name: String,
    pub duration_min: f64,
    pub calories_burned: f64,
    pub created_at: OffsetDateTime,
}

impl From<ExerciseLog> for ExerciseLogResponse {
    fn from(l: ExerciseLog) -> Self {
        Self {
            id: l.id,
            day: format_day_key(l.day),
            name: l.name,
            duration_min: l.duration_min,
            calories_burned: l.calories_burned,
            created_at: l.created_at,
        }
    }
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/exercise", get(list).post(create))
        .route("/exercise/:id", delete(remove))
}

fn internal<E: std::fmt::Display>(e: E) -> (StatusCode, String) {
    (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
}

// ---- repo ----

pub async fn insert(
    db: &PgPool,
    user_id: Uuid,
    day: Date,
    name: &str,
    duration_min: f64,
    calories_burned: f64,
) -> anyhow::Result<ExerciseLog> {
    let row = sqlx::query_as::<_, ExerciseLog>(
        r#"
        INSERT INTO exercise_logs (user_id, day, name, duration_min, calories_burned)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id, user_id, day, name, duration_min, calories_burned, created_at
        "#,
    )
    .bind(user_id)
    .bind(day)
    .bind(name)
    .bind(duration_min)
    .bind(calories_burned)
    .fetch_one(db)
    .await?;
    Ok(row)
}

pub async fn list_by_day(
    db: &PgPool,
    user_id: Uuid,
    day: Date,
) -> anyhow::Result<Vec<ExerciseLog>> {
    let rows = sqlx::query_as::<_, ExerciseLog>(
        r#"
        SELECT id, user_id, day, name, duration_min, calories_burned, created_at
        FROM exercise_logs
        WHERE user_id = $1 AND day = $2
        ORDER BY created_at DESC
        "#,
    )
    .bind(user_id)
    .bind(day)
    .fetch_all(db)
    .await?;
    Ok(rows)
}

pub async fn delete_log(db: &PgPool, user_id: Uuid, id: Uuid) -> anyhow::Result<bool> {
    let result = sqlx::query("DELETE FROM exercise_logs WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(user_id)
        .execute(db)
        .await?;
    Ok(result.rows_affected() > 0)
}

// ---- handlers ----

#[instrument(skip(state, payload))]
pub async fn create(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<CreateExerciseRequest>,
) -> Result<(StatusCode, Json<ExerciseLogResponse>), (StatusCode, String)> {
    let day = parse_day_key(&payload.day)
        .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;
    if payload.name.trim().is_empty() {
        return Err((StatusCode::BAD_REQUEST, "name is required".into()));
    }
    for value in [payload.duration_min, payload.calories_burned] {
        if !value.is_finite() || value < 0.0 {
            return Err((
                StatusCode::BAD_REQUEST,
                "duration and calories must be non-negative".into(),
            ));
        }
    }

    let log = insert(
        &state.db,
        user_id,
        day,
        payload.name.trim(),
        payload.duration_min,
        payload.calories_burned,
    )
    .await
    .map_err(internal)?;
    Ok((StatusCode::CREATED, Json(ExerciseLogResponse::from(log))))
}

#[instrument(skip(state))]
pub async fn list(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(q): Query<DayQuery>,
) -> Result<Json<Vec<ExerciseLogResponse>>, (StatusCode, String)> {
    let day = parse_day_key(&q.day).map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;
    let logs = list_by_day(&state.db, user_id, day)
        .await
        .map_err(internal)?;
    Ok(Json(
        logs.into_iter().map(ExerciseLogResponse::from).collect(),
    ))
}

#[instrument(skip(state))]
pub async fn remove(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, (StatusCode, String)> {
    if !delete_log(&state.db, user_id, id).await.map_err(internal)? {
        return Err((StatusCode::NOT_FOUND, "Log not found".into()));
    }
    Ok(StatusCode::NO_CONTENT)
}
