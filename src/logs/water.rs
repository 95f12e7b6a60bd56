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
    domain::units::WaterUnit,
    state::AppState,
};

#[derive(Debug, Deserialize)]
pub struct CreateWaterRequest {
    pub day: String,
    pub amount: f64,
    #[serde(default = "default_unit")]
    pub unit: WaterUnit,
}

fn default_unit() -> WaterUnit {
    WaterUnit::Ml
}

#[derive(Debug, Serialize)]
pub struct WaterLogResponse {
    pub id: Uuid,
    pub day: String,
    pub amount_ml: f64,
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, FromRow)]
pub struct WaterLog {
    pub id: Uuid,
    pub user_id: Uuid,
    pub day: Date,
    pub amount_ml: f64,
    pub created_at: OffsetDateTime,
}

impl From<WaterLog> for WaterLogResponse {
    fn from(l: WaterLog) -> Self {
        Self {
            id: l.id,
            day: format_day_key(l.day),
            amount_ml: l.amount_ml,
            created_at: l.created_at,
        }
    }
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/water", get(list).post(create))
        .route("/water/:id", delete(remove))
}

fn internal<E: std::fmt::Display>(e: E) -> (StatusCode, String) {
    (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
}

// ---- repo ----

pub async fn insert(
    db: &PgPool,
    user_id: Uuid,
    day: Date,
    amount_ml: f64,
) -> anyhow::Result<WaterLog> {
    let row = sqlx::query_as::<_, WaterLog>(
        r#"
        INSERT INTO water_logs (user_id, day, amount_ml)
        VALUES ($1, $2, $3)
        RETURNING id, user_id, day, amount_ml, created_at
        "#,
    )
    .bind(user_id)
    .bind(day)
    .bind(amount_ml)
    .fetch_one(db)
    .await?;
    Ok(row)
}

pub async fn list_by_day(db: &PgPool, user_id: Uuid, day: Date) -> anyhow::Result<Vec<WaterLog>> {
    let rows = sqlx::query_as::<_, WaterLog>(
        r#"
        SELECT id, user_id, day, amount_ml, created_at
        FROM water_logs
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
    let result = sqlx::query("DELETE FROM water_logs WHERE id = $1 AND user_id = $2")
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
    Json(payload): Json<CreateWaterRequest>,
) -> Result<(StatusCode, Json<WaterLogResponse>), (StatusCode, String)> {
    let day = parse_day_key(&payload.day)
        .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;
    if !payload.amount.is_finite() || payload.amount <= 0.0 {
        return Err((StatusCode::BAD_REQUEST, "amount must be positive".into()));
    }
    let amount_ml = payload.unit.to_ml(payload.amount);

    let log = insert(&state.db, user_id, day, amount_ml)
        .await
        .map_err(internal)?;
    Ok((StatusCode::CREATED, Json(WaterLogResponse::from(log))))
}

#[instrument(skip(state))]
pub async fn list(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(q): Query<DayQuery>,
) -> Result<Json<Vec<WaterLogResponse>>, (StatusCode, String)> {
    let day = parse_day_key(&q.day).map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;
    let logs = list_by_day(&state.db, user_id, day)
        .await
        .map_err(internal)?;
    Ok(Json(logs.into_iter().map(WaterLogResponse::from).collect()))
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
