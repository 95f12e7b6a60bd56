use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, FromRow)]
pub struct Profile {
    pub user_id: Uuid,
    pub display_name: Option<String>,
    pub weight_unit: String,
    pub goal_kind: Option<String>,
    pub goal_weight_kg: Option<f64>,
    pub calorie_target: Option<f64>,
    pub water_target_ml: Option<f64>,
    pub updated_at: OffsetDateTime,
}

const COLUMNS: &str = "user_id, display_name, weight_unit, goal_kind, goal_weight_kg, \
                       calorie_target, water_target_ml, updated_at";

pub async fn get(db: &PgPool, user_id: Uuid) -> anyhow::Result<Option<Profile>> {
    let profile = sqlx::query_as::<_, Profile>(&format!(
        "SELECT {COLUMNS} FROM profiles WHERE user_id = $1"
    ))
    .bind(user_id)
    .fetch_optional(db)
    .await?;
    Ok(profile)
}

pub async fn upsert(
    db: &PgPool,
    user_id: Uuid,
    display_name: Option<&str>,
    weight_unit: &str,
    calorie_target: Option<f64>,
    water_target_ml: Option<f64>,
) -> anyhow::Result<Profile> {
    let profile = sqlx::query_as::<_, Profile>(&format!(
        r#"
        INSERT INTO profiles (user_id, display_name, weight_unit, calorie_target, water_target_ml)
        VALUES ($1, $2, $3, $4, $5)
        ON CONFLICT (user_id) DO UPDATE SET
            display_name = EXCLUDED.display_name,
            weight_unit = EXCLUDED.weight_unit,
            calorie_target = EXCLUDED.calorie_target,
            water_target_ml = EXCLUDED.water_target_ml,
            updated_at = now()
        RETURNING {COLUMNS}
        "#
    ))
    .bind(user_id)
    .bind(display_name)
    .bind(weight_unit)
    .bind(calorie_target)
    .bind(water_target_ml)
    .fetch_one(db)
    .await?;
    Ok(profile)
}

pub async fn set_goal(
    db: &PgPool,
    user_id: Uuid,
    goal_kind: &str,
    goal_weight_kg: f64,
) -> anyhow::Result<Profile> {
    let profile = sqlx::query_as::<_, Profile>(&format!(
        r#"
        INSERT INTO profiles (user_id, goal_kind, goal_weight_kg)
        VALUES ($1, $2, $3)
        ON CONFLICT (user_id) DO UPDATE SET
            goal_kind = EXCLUDED.goal_kind,
            goal_weight_kg = EXCLUDED.goal_weight_kg,
            updated_at = now()
        RETURNING {COLUMNS}
        "#
    ))
    .bind(user_id)
    .bind(goal_kind)
    .bind(goal_weight_kg)
    .fetch_one(db)
    .await?;
    Ok(profile)
}
