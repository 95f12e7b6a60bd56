use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::domain::goals::GoalKind;
use crate::domain::units::{round1, WeightUnit};
use crate::profile::repo::Profile;

#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub display_name: Option<String>,
    #[serde(default = "default_weight_unit")]
    pub weight_unit: WeightUnit,
    pub calorie_target: Option<f64>,
    pub water_target_ml: Option<f64>,
}

fn default_weight_unit() -> WeightUnit {
    WeightUnit::Kg
}

/// Goal update carries the current weight so the server can validate the
/// target against it; both values are in `unit`.
#[derive(Debug, Deserialize)]
pub struct SetGoalRequest {
    pub goal_kind: GoalKind,
    pub current_weight: f64,
    pub target_weight: f64,
    #[serde(default = "default_weight_unit")]
    pub unit: WeightUnit,
}

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub display_name: Option<String>,
    pub weight_unit: WeightUnit,
    pub goal_kind: Option<GoalKind>,
    pub goal_weight_kg: Option<f64>,
    /// Goal weight converted into the user's display unit.
    pub goal_weight: Option<f64>,
    pub calorie_target: Option<f64>,
    pub water_target_ml: Option<f64>,
    pub updated_at: Option<OffsetDateTime>,
}

impl ProfileResponse {
    /// What a brand-new account looks like before the first profile write.
    pub fn empty() -> Self {
        Self {
            display_name: None,
            weight_unit: WeightUnit::Kg,
            goal_kind: None,
            goal_weight_kg: None,
            goal_weight: None,
            calorie_target: None,
            water_target_ml: None,
            updated_at: None,
        }
    }
}

impl From<Profile> for ProfileResponse {
    fn from(p: Profile) -> Self {
        let weight_unit = WeightUnit::parse(&p.weight_unit).unwrap_or(WeightUnit::Kg);
        Self {
            display_name: p.display_name,
            weight_unit,
            goal_kind: p.goal_kind.as_deref().and_then(GoalKind::parse),
            goal_weight_kg: p.goal_weight_kg,
            goal_weight: p.goal_weight_kg.map(|kg| round1(weight_unit.from_kg(kg))),
            calorie_target: p.calorie_target,
            water_target_ml: p.water_target_ml,
            updated_at: Some(p.updated_at),
        }
    }
}
