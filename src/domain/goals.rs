use serde::{Deserialize, Serialize};
use thiserror::Error;

/// What the user is trying to do with their body weight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GoalKind {
    Lose,
    Gain,
    Maintain,
    Recomp,
}

impl GoalKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            GoalKind::Lose => "lose",
            GoalKind::Gain => "gain",
            GoalKind::Maintain => "maintain",
            GoalKind::Recomp => "recomp",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "lose" => Some(GoalKind::Lose),
            "gain" => Some(GoalKind::Gain),
            "maintain" => Some(GoalKind::Maintain),
            "recomp" => Some(GoalKind::Recomp),
            _ => None,
        }
    }
}

/// Plausibility bounds for any goal weight, in kilograms.
pub const GOAL_WEIGHT_MIN_KG: f64 = 30.0;
pub const GOAL_WEIGHT_MAX_KG: f64 = 300.0;
/// Maintain/recomp targets may drift this far from the current weight.
pub const MAINTAIN_BAND_KG: f64 = 2.5;

/// Validation failures, worded as the translation keys the clients show.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GoalWeightError {
    #[error("goals.errors.weight_out_of_range")]
    OutOfRange,
    #[error("goals.errors.lose_target_not_below_current")]
    LoseTargetNotBelowCurrent,
    #[error("goals.errors.gain_target_not_above_current")]
    GainTargetNotAboveCurrent,
    #[error("goals.errors.maintain_target_too_far")]
    MaintainTargetTooFar,
}

impl GoalWeightError {
    pub fn i18n_key(&self) -> String {
        self.to_string()
    }
}

/// Check a target weight against the chosen goal, both in kilograms.
pub fn validate_goal_weight(
    kind: GoalKind,
    current_kg: f64,
    target_kg: f64,
) -> Result<(), GoalWeightError> {
    if !current_kg.is_finite() || !target_kg.is_finite() {
        return Err(GoalWeightError::OutOfRange);
    }
    if !(GOAL_WEIGHT_MIN_KG..=GOAL_WEIGHT_MAX_KG).contains(&target_kg) {
        return Err(GoalWeightError::OutOfRange);
    }
    match kind {
        GoalKind::Lose if target_kg >= current_kg => {
            Err(GoalWeightError::LoseTargetNotBelowCurrent)
        }
        GoalKind::Gain if target_kg <= current_kg => {
            Err(GoalWeightError::GainTargetNotAboveCurrent)
        }
        GoalKind::Maintain | GoalKind::Recomp
            if (target_kg - current_kg).abs() > MAINTAIN_BAND_KG =>
        {
            Err(GoalWeightError::MaintainTargetTooFar)
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lose_requires_target_below_current() {
        assert_eq!(validate_goal_weight(GoalKind::Lose, 90.0, 80.0), Ok(()));
        assert_eq!(
            validate_goal_weight(GoalKind::Lose, 90.0, 90.0),
            Err(GoalWeightError::LoseTargetNotBelowCurrent)
        );
        assert_eq!(
            validate_goal_weight(GoalKind::Lose, 90.0, 95.0),
            Err(GoalWeightError::LoseTargetNotBelowCurrent)
        );
    }

    #[test]
    fn gain_requires_target_above_current() {
        assert_eq!(validate_goal_weight(GoalKind::Gain, 60.0, 65.0), Ok(()));
        assert_eq!(
            validate_goal_weight(GoalKind::Gain, 60.0, 60.0),
            Err(GoalWeightError::GainTargetNotAboveCurrent)
        );
    }

    #[test]
    fn maintain_and_recomp_allow_a_small_band() {
        for kind in [GoalKind::Maintain, GoalKind::Recomp] {
            assert_eq!(validate_goal_weight(kind, 70.0, 72.5), Ok(()));
            assert_eq!(validate_goal_weight(kind, 70.0, 67.5), Ok(()));
            assert_eq!(
                validate_goal_weight(kind, 70.0, 73.0),
                Err(GoalWeightError::MaintainTargetTooFar)
            );
        }
    }

    #[test]
    fn implausible_targets_are_rejected_for_every_goal() {
        for kind in [
            GoalKind::Lose,
            GoalKind::Gain,
            GoalKind::Maintain,
            GoalKind::Recomp,
        ] {
            assert_eq!(
                validate_goal_weight(kind, 80.0, 20.0),
                Err(GoalWeightError::OutOfRange)
            );
            assert_eq!(
                validate_goal_weight(kind, 80.0, 400.0),
                Err(GoalWeightError::OutOfRange)
            );
            assert_eq!(
                validate_goal_weight(kind, 80.0, f64::NAN),
                Err(GoalWeightError::OutOfRange)
            );
        }
    }

    #[test]
    fn error_messages_are_translation_keys() {
        assert_eq!(
            GoalWeightError::OutOfRange.i18n_key(),
            "goals.errors.weight_out_of_range"
        );
        assert_eq!(
            GoalWeightError::MaintainTargetTooFar.i18n_key(),
            "goals.errors.maintain_target_too_far"
        );
    }
}
