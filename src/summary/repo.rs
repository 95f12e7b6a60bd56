use sqlx::{FromRow, PgPool};
use time::Date;
use uuid::Uuid;

/// Macro totals for one diary day, all sums coalesced to zero.
#[derive(Debug, Clone, Default, FromRow)]
pub struct MacroTotals {
    pub entries: i64,
    pub calories: f64,
    pub protein_g: f64,
    pub carb_g: f64,
    pub fat_g: f64,
    pub sugar_g: f64,
    pub fiber_g: f64,
    pub sodium_mg: f64,
}

pub async fn macro_totals(db: &PgPool, user_id: Uuid, day: Date) -> anyhow::Result<MacroTotals> {
    let totals = sqlx::query_as::<_, MacroTotals>(
        r#"
        SELECT COUNT(*) AS entries,
               COALESCE(SUM(calories), 0)::float8 AS calories,
               COALESCE(SUM(protein_g), 0)::float8 AS protein_g,
               COALESCE(SUM(carb_g), 0)::float8 AS carb_g,
               COALESCE(SUM(fat_g), 0)::float8 AS fat_g,
               COALESCE(SUM(sugar_g), 0)::float8 AS sugar_g,
               COALESCE(SUM(fiber_g), 0)::float8 AS fiber_g,
               COALESCE(SUM(sodium_mg), 0)::float8 AS sodium_mg
        FROM diary_entries
        WHERE user_id = $1 AND day = $2
        "#,
    )
    .bind(user_id)
    .bind(day)
    .fetch_one(db)
    .await?;
    Ok(totals)
}

/// One day's summed value inside a range query.
#[derive(Debug, Clone, FromRow)]
pub struct DayTotal {
    pub day: Date,
    pub total: f64,
}

async fn totals_by_day(
    db: &PgPool,
    sql: &str,
    user_id: Uuid,
    start: Date,
    end: Date,
) -> anyhow::Result<Vec<DayTotal>> {
    let rows = sqlx::query_as::<_, DayTotal>(sql)
        .bind(user_id)
        .bind(start)
        .bind(end)
        .fetch_all(db)
        .await?;
    Ok(rows)
}

pub async fn calories_by_day(
    db: &PgPool,
    user_id: Uuid,
    start: Date,
    end: Date,
) -> anyhow::Result<Vec<DayTotal>> {
    totals_by_day(
        db,
        r#"
        SELECT day, COALESCE(SUM(calories), 0)::float8 AS total
        FROM diary_entries
        WHERE user_id = $1 AND day BETWEEN $2 AND $3
        GROUP BY day
        "#,
        user_id,
        start,
        end,
    )
    .await
}

pub async fn water_by_day(
    db: &PgPool,
    user_id: Uuid,
    start: Date,
    end: Date,
) -> anyhow::Result<Vec<DayTotal>> {
    totals_by_day(
        db,
        r#"
        SELECT day, COALESCE(SUM(amount_ml), 0)::float8 AS total
        FROM water_logs
        WHERE user_id = $1 AND day BETWEEN $2 AND $3
        GROUP BY day
        "#,
        user_id,
        start,
        end,
    )
    .await
}

pub async fn exercise_by_day(
    db: &PgPool,
    user_id: Uuid,
    start: Date,
    end: Date,
) -> anyhow::Result<Vec<DayTotal>> {
    totals_by_day(
        db,
        r#"
        SELECT day, COALESCE(SUM(calories_burned), 0)::float8 AS total
        FROM exercise_logs
        WHERE user_id = $1 AND day BETWEEN $2 AND $3
        GROUP BY day
        "#,
        user_id,
        start,
        end,
    )
    .await
}

pub async fn water_total_ml(db: &PgPool, user_id: Uuid, day: Date) -> anyhow::Result<f64> {
    let total: f64 = sqlx::query_scalar(
        r#"
        SELECT COALESCE(SUM(amount_ml), 0)::float8
        FROM water_logs
        WHERE user_id = $1 AND day = $2
        "#,
    )
    .bind(user_id)
    .bind(day)
    .fetch_one(db)
    .await?;
    Ok(total)
}

pub async fn exercise_burned_kcal(db: &PgPool, user_id: Uuid, day: Date) -> anyhow::Result<f64> {
    let total: f64 = sqlx::query_scalar(
        r#"
        SELECT COALESCE(SUM(calories_burned), 0)::float8
        FROM exercise_logs
        WHERE user_id = $1 AND day = $2
        "#,
    )
    .bind(user_id)
    .bind(day)
    .fetch_one(db)
    .await?;
    Ok(total)
}
