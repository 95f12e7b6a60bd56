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
    domain::datekey::{format_day_key, parse_day_key},
    domain::units::{round2, WeightUnit},
    state::AppState,
};

// Hard sanity bounds for a logged body weight, in kilograms.
const WEIGHT_MIN_KG: f64 = 20.0;
const WEIGHT_MAX_KG: f64 = 500.0;

#[derive(Debug, Deserialize)]
pub struct CreateWeightRequest {
    pub day: String,
    pub weight: f64,
    #[serde(default = "default_unit")]
    pub unit: WeightUnit,
}

fn default_unit() -> WeightUnit {
    WeightUnit::Kg
}

#[derive(Debug, Deserialize)]
pub struct Pagination {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

fn default_limit() -> i64 {
    30
}

#[derive(Debug, Serialize)]
pub struct WeightLogResponse {
    pub id: Uuid,
    pub day: String,
    pub weight_kg: f64,
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, FromRow)]
pub struct WeightLog {
    pub id: Uuid,
    pub user_id: Uuid,
    pub day: Date,
    pub weight_kg: f64,
    pub created_at: OffsetDateTime,
}

impl From<WeightLog> for WeightLogResponse {
    fn from(l: WeightLog) -> Self {
        Self {
            id: l.id,
            day: format_day_key(l.day),
            weight_kg: l.weight_kg,
            created_at: l.created_at,
        }
    }
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/weight", get(list).post(create))
        .route("/weight/:id", delete(remove))
}

fn internal<E: std::fmt::Display>(e: E) -> (StatusCode, String) {
    (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
}

// ---- repo ----

pub async fn insert(
    db: &PgPool,
    user_id: Uuid,
    day: Date,
    weight_kg: f64,
) -> anyhow::Result<WeightLog> {
    let row = sqlx::query_as::<_, WeightLog>(
        r#"
        INSERT INTO weight_logs (user_id, day, weight_kg)
        VALUES ($1, $2, $3)
        RETURNING id, user_id, day, weight_kg, created_at
        "#,
    )
    .bind(user_id)
    .bind(day)
    .bind(weight_kg)
    .fetch_one(db)
    .await?;
    Ok(row)
}

pub async fn list_recent(
    db: &PgPool,
    user_id: Uuid,
    limit: i64,
    offset: i64,
) -> anyhow::Result<Vec<WeightLog>> {
    let rows = sqlx::query_as::<_, WeightLog>(
        r#"
        SELECT id, user_id, day, weight_kg, created_at
        FROM weight_logs
        WHERE user_id = $1
        ORDER BY day DESC, created_at DESC
        LIMIT $2 OFFSET $3
        "#,
    )
    .bind(user_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(db)
    .await?;
    Ok(rows)
}

pub async fn delete_log(db: &PgPool, user_id: Uuid, id: Uuid) -> anyhow::Result<bool> {
    let result = sqlx::query("DELETE FROM weight_logs WHERE id = $1 AND user_id = $2")
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
    Json(payload): Json<CreateWeightRequest>,
) -> Result<(StatusCode, Json<WeightLogResponse>), (StatusCode, String)> {
    let day = parse_day_key(&payload.day)
        .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;

    let weight_kg = payload.unit.to_kg(payload.weight);
    if !weight_kg.is_finite() || !(WEIGHT_MIN_KG..=WEIGHT_MAX_KG).contains(&weight_kg) {
        return Err((StatusCode::BAD_REQUEST, "weight out of range".into()));
    }

    let log = insert(&state.db, user_id, day, round2(weight_kg))
        .await
        .map_err(internal)?;
    Ok((StatusCode::CREATED, Json(WeightLogResponse::from(log))))
}

#[instrument(skip(state))]
pub async fn list(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(p): Query<Pagination>,
) -> Result<Json<Vec<WeightLogResponse>>, (StatusCode, String)> {
    let limit = p.limit.clamp(1, 200);
    let offset = p.offset.max(0);
    let logs = list_recent(&state.db, user_id, limit, offset)
        .await
        .map_err(internal)?;
    Ok(Json(logs.into_iter().map(WeightLogResponse::from).collect()))
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
