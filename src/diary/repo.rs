use sqlx::{FromRow, PgPool};
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use crate::domain::score::AvoScoreInput;

#[derive(Debug, Clone, FromRow)]
pub struct DiaryEntry {
    pub id: Uuid,
    pub user_id: Uuid,
    pub day: Date,
    pub name: String,
    pub serving_amount: f64,
    pub serving_unit: String,
    pub calories: f64,
    pub protein_g: f64,
    pub carb_g: f64,
    pub fiber_g: f64,
    pub sugar_g: f64,
    pub fat_g: f64,
    pub sat_fat_g: f64,
    pub trans_fat_g: f64,
    pub sodium_mg: f64,
    pub score: i16,
    pub grade: String,
    pub created_at: OffsetDateTime,
}

impl DiaryEntry {
    /// Serving-basis nutrients as stored, for re-normalizing and re-scoring.
    pub fn nutrients(&self) -> AvoScoreInput {
        AvoScoreInput {
            calories: self.calories,
            carb_g: self.carb_g,
            fiber_g: self.fiber_g,
            protein_g: self.protein_g,
            fat_g: self.fat_g,
            sugar_g: self.sugar_g,
            sat_fat_g: self.sat_fat_g,
            trans_fat_g: self.trans_fat_g,
            sodium_mg: self.sodium_mg,
        }
    }
}

pub struct NewEntry<'a> {
    pub user_id: Uuid,
    pub day: Date,
    pub name: &'a str,
    pub serving_amount: f64,
    pub serving_unit: &'a str,
    pub nutrients: &'a AvoScoreInput,
    pub score: i16,
    pub grade: &'a str,
}

const COLUMNS: &str = "id, user_id, day, name, serving_amount, serving_unit, calories, \
                       protein_g, carb_g, fiber_g, sugar_g, fat_g, sat_fat_g, trans_fat_g, \
                       sodium_mg, score, grade, created_at";

pub async fn insert(db: &PgPool, entry: NewEntry<'_>) -> anyhow::Result<DiaryEntry> {
    let n = entry.nutrients;
    let row = sqlx::query_as::<_, DiaryEntry>(&format!(
        r#"
        INSERT INTO diary_entries
            (user_id, day, name, serving_amount, serving_unit, calories, protein_g, carb_g,
             fiber_g, sugar_g, fat_g, sat_fat_g, trans_fat_g, sodium_mg, score, grade)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
        RETURNING {COLUMNS}
        "#
    ))
    .bind(entry.user_id)
    .bind(entry.day)
    .bind(entry.name)
    .bind(entry.serving_amount)
    .bind(entry.serving_unit)
    .bind(n.calories)
    .bind(n.protein_g)
    .bind(n.carb_g)
    .bind(n.fiber_g)
    .bind(n.sugar_g)
    .bind(n.fat_g)
    .bind(n.sat_fat_g)
    .bind(n.trans_fat_g)
    .bind(n.sodium_mg)
    .bind(entry.score)
    .bind(entry.grade)
    .fetch_one(db)
    .await?;
    Ok(row)
}

pub async fn list_by_day(db: &PgPool, user_id: Uuid, day: Date) -> anyhow::Result<Vec<DiaryEntry>> {
    let rows = sqlx::query_as::<_, DiaryEntry>(&format!(
        r#"
        SELECT {COLUMNS}
        FROM diary_entries
        WHERE user_id = $1 AND day = $2
        ORDER BY created_at DESC
        "#
    ))
    .bind(user_id)
    .bind(day)
    .fetch_all(db)
    .await?;
    Ok(rows)
}

pub async fn get(db: &PgPool, user_id: Uuid, id: Uuid) -> anyhow::Result<Option<DiaryEntry>> {
    let row = sqlx::query_as::<_, DiaryEntry>(&format!(
        r#"
        SELECT {COLUMNS}
        FROM diary_entries
        WHERE id = $1 AND user_id = $2
        "#
    ))
    .bind(id)
    .bind(user_id)
    .fetch_optional(db)
    .await?;
    Ok(row)
}

/// Returns whether a row was actually removed.
pub async fn delete(db: &PgPool, user_id: Uuid, id: Uuid) -> anyhow::Result<bool> {
    let result = sqlx::query("DELETE FROM diary_entries WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(user_id)
        .execute(db)
        .await?;
    Ok(result.rows_affected() > 0)
}
