use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::diary::repo::DiaryEntry;
use crate::domain::datekey::format_day_key;
use crate::domain::score::{AvoScoreInput, Grade};

/// A logged food. Nutrient fields describe the serving as eaten; the server
/// normalizes to a per-100 basis before scoring.
#[derive(Debug, Deserialize)]
pub struct CreateEntryRequest {
    pub name: String,
    pub day: String,
    pub serving_amount: f64,
    pub serving_unit: String,
    #[serde(flatten)]
    pub nutrients: AvoScoreInput,
}

#[derive(Debug, Deserialize)]
pub struct DayQuery {
    pub day: String,
}

/// Nutrient payload for the ad-hoc scoring preview. With `serving_amount`
/// the values are rescaled to per-100 first; without it they are taken as
/// already normalized.
#[derive(Debug, Deserialize)]
pub struct ScorePreviewRequest {
    pub serving_amount: Option<f64>,
    #[serde(flatten)]
    pub nutrients: AvoScoreInput,
}

#[derive(Debug, Serialize)]
pub struct EntryResponse {
    pub id: Uuid,
    pub name: String,
    pub day: String,
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
    pub grade: Grade,
    pub created_at: OffsetDateTime,
}

impl From<DiaryEntry> for EntryResponse {
    fn from(e: DiaryEntry) -> Self {
        Self {
            id: e.id,
            name: e.name,
            day: format_day_key(e.day),
            serving_amount: e.serving_amount,
            serving_unit: e.serving_unit,
            calories: e.calories,
            protein_g: e.protein_g,
            carb_g: e.carb_g,
            fiber_g: e.fiber_g,
            sugar_g: e.sugar_g,
            fat_g: e.fat_g,
            sat_fat_g: e.sat_fat_g,
            trans_fat_g: e.trans_fat_g,
            sodium_mg: e.sodium_mg,
            score: e.score,
            grade: Grade::parse(&e.grade).unwrap_or(Grade::F),
            created_at: e.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct EntryDetails {
    #[serde(flatten)]
    pub entry: EntryResponse,
    pub reasons: Vec<&'static str>,
}
