use serde::{Deserialize, Serialize};

/// Nutrient quantities of a food, normalized to a per-100 g (or per-100 mL)
/// basis. Callers are responsible for the basis; [`normalize_to_basis`]
/// rescales an arbitrary serving measurement first.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AvoScoreInput {
    pub calories: f64,
    pub carb_g: f64,
    pub fiber_g: f64,
    pub protein_g: f64,
    pub fat_g: f64,
    pub sugar_g: f64,
    pub sat_fat_g: f64,
    pub trans_fat_g: f64,
    pub sodium_mg: f64,
}

/// Letter grade derived from the numeric score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Grade {
    A,
    B,
    C,
    D,
    F,
}

impl Grade {
    pub fn for_score(score: u8) -> Self {
        match score {
            85..=u8::MAX => Grade::A,
            70..=84 => Grade::B,
            55..=69 => Grade::C,
            40..=54 => Grade::D,
            _ => Grade::F,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Grade::A => "A",
            Grade::B => "B",
            Grade::C => "C",
            Grade::D => "D",
            Grade::F => "F",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "A" => Some(Grade::A),
            "B" => Some(Grade::B),
            "C" => Some(Grade::C),
            "D" => Some(Grade::D),
            "F" => Some(Grade::F),
            _ => None,
        }
    }
}

impl std::fmt::Display for Grade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AvoScoreResult {
    pub score: u8,
    pub grade: Grade,
    /// 1-2 translation keys explaining the dominant contributions.
    pub reasons: Vec<&'static str>,
}

// Reason tags are the i18n keys the clients already translate.
pub const REASON_HIGH_PROTEIN: &str = "avo_score.reasons.high_protein";
pub const REASON_HIGH_FIBER: &str = "avo_score.reasons.high_fiber";
pub const REASON_HIGH_UNSAT_FAT: &str = "avo_score.reasons.high_unsat_fat";
pub const REASON_HIGH_SUGAR: &str = "avo_score.reasons.high_sugar";
pub const REASON_HIGH_SODIUM: &str = "avo_score.reasons.high_sodium";
pub const REASON_HIGH_SAT_FAT: &str = "avo_score.reasons.high_sat_fat";
pub const REASON_HIGH_TRANS_FAT: &str = "avo_score.reasons.high_trans_fat";
pub const REASON_HIGH_FAT: &str = "avo_score.reasons.high_fat";
pub const REASON_BALANCED: &str = "avo_score.reasons.balanced";
pub const REASON_NO_MACRO_DATA: &str = "avo_score.reasons.no_macro_data";

// Calorie floor keeping the per-100-kcal base sane for near-zero-calorie
// foods (water, diet soda).
const KCAL_FLOOR: f64 = 20.0;

// Positive axes: density target (g per 100 kcal) and score weight.
const PROTEIN_TARGET: f64 = 10.0;
const PROTEIN_WEIGHT: f64 = 30.0;
const FIBER_TARGET: f64 = 5.0;
const FIBER_WEIGHT: f64 = 30.0;
const UNSAT_FAT_TARGET: f64 = 10.0;
const UNSAT_FAT_WEIGHT: f64 = 27.0;

// Penalty axes, same clamp-and-scale shape.
const SUGAR_TARGET: f64 = 12.0;
const SUGAR_WEIGHT: f64 = 15.0;
const SODIUM_TARGET_MG: f64 = 400.0;
const SODIUM_WEIGHT: f64 = 12.0;
const SAT_FAT_TARGET: f64 = 4.0;
const SAT_FAT_WEIGHT: f64 = 12.0;
const TRANS_FAT_TARGET: f64 = 0.5;
const TRANS_FAT_WEIGHT: f64 = 8.0;
const TOTAL_FAT_TARGET: f64 = 15.0;
const TOTAL_FAT_WEIGHT: f64 = 2.0;

// Sugar co-occurring with protein/fiber (plain yogurt, whole fruit) is
// penalized less than isolated sugar; the buffers compound.
const SUGAR_BUFFER: f64 = 0.3;
const SUGAR_BUFFER_PROTEIN_DENSITY: f64 = 3.0;
const SUGAR_BUFFER_FIBER_DENSITY: f64 = 2.0;

// Carve-out for lean dairy profiles that the fat/sugar axes would otherwise
// punish.
const DAIRY_BONUS: f64 = 6.0;
const DAIRY_PROTEIN_DENSITY_MIN: f64 = 5.0;
const DAIRY_FAT_DENSITY_MAX: f64 = 2.0;
const DAIRY_SUGAR_DENSITY_MAX: f64 = 18.0;

// Reason selection thresholds.
const POSITIVE_REASON_MIN_PTS: f64 = 5.0;
const PENALTY_REASON_MIN_PTS: f64 = 6.0;
const SAT_FAT_FLAG_DENSITY: f64 = 2.4;

fn finite(v: f64) -> f64 {
    if v.is_finite() {
        v
    } else {
        0.0
    }
}

fn clamp01(v: f64) -> f64 {
    v.clamp(0.0, 1.0)
}

/// Score a per-100-basis nutrient profile.
///
/// Total over any input: non-finite fields degrade to zero, the score is
/// always in 0..=100 and `reasons` always has one or two entries.
pub fn compute_avo_score(input: &AvoScoreInput) -> AvoScoreResult {
    let calories = finite(input.calories);
    let carb = finite(input.carb_g);
    let fiber = finite(input.fiber_g);
    let protein = finite(input.protein_g);
    let fat = finite(input.fat_g);
    let sugar = finite(input.sugar_g);
    let sat_fat = finite(input.sat_fat_g);
    let trans_fat = finite(input.trans_fat_g);
    let sodium = finite(input.sodium_mg);

    let k = calories.max(KCAL_FLOOR) / 100.0;

    let net_carb = (carb - fiber).max(0.0);
    let unsat_fat = (fat - sat_fat - trans_fat).max(0.0);

    let protein_d = protein / k;
    let fiber_d = fiber / k;
    let unsat_d = unsat_fat / k;
    let sugar_d = sugar / k;
    let sodium_d = sodium / k;
    let sat_fat_d = sat_fat / k;
    let trans_fat_d = trans_fat / k;
    let fat_d = fat / k;

    let protein_pts = clamp01(protein_d / PROTEIN_TARGET) * PROTEIN_WEIGHT;
    let fiber_pts = clamp01(fiber_d / FIBER_TARGET) * FIBER_WEIGHT;
    let unsat_pts = clamp01(unsat_d / UNSAT_FAT_TARGET) * UNSAT_FAT_WEIGHT;

    let mut sugar_pen = clamp01(sugar_d / SUGAR_TARGET) * SUGAR_WEIGHT;
    if protein_d >= SUGAR_BUFFER_PROTEIN_DENSITY {
        sugar_pen *= SUGAR_BUFFER;
    }
    if fiber_d >= SUGAR_BUFFER_FIBER_DENSITY {
        sugar_pen *= SUGAR_BUFFER;
    }
    let sodium_pen = clamp01(sodium_d / SODIUM_TARGET_MG) * SODIUM_WEIGHT;
    let sat_fat_pen = clamp01(sat_fat_d / SAT_FAT_TARGET) * SAT_FAT_WEIGHT;
    let trans_fat_pen = clamp01(trans_fat_d / TRANS_FAT_TARGET) * TRANS_FAT_WEIGHT;
    let fat_pen = clamp01(fat_d / TOTAL_FAT_TARGET) * TOTAL_FAT_WEIGHT;

    let dairy_bonus = if protein_d >= DAIRY_PROTEIN_DENSITY_MIN
        && fat_d <= DAIRY_FAT_DENSITY_MAX
        && sugar_d <= DAIRY_SUGAR_DENSITY_MAX
    {
        DAIRY_BONUS
    } else {
        0.0
    };

    let raw = protein_pts + fiber_pts + unsat_pts + dairy_bonus
        - (sugar_pen + sodium_pen + sat_fat_pen + trans_fat_pen + fat_pen);
    let score = raw.round().clamp(0.0, 100.0) as u8;

    // Atwater estimate, net carbs at 4 kcal/g and fiber at 2.
    let macro_kcal = 4.0 * net_carb + 2.0 * fiber + 4.0 * protein + 9.0 * fat;

    let positives = [
        (REASON_HIGH_PROTEIN, protein_pts),
        (REASON_HIGH_FIBER, fiber_pts),
        (REASON_HIGH_UNSAT_FAT, unsat_pts),
    ];
    let penalties = [
        (REASON_HIGH_SUGAR, sugar_pen),
        (REASON_HIGH_SODIUM, sodium_pen),
        (REASON_HIGH_SAT_FAT, sat_fat_pen),
        (REASON_HIGH_TRANS_FAT, trans_fat_pen),
        (REASON_HIGH_FAT, fat_pen),
    ];
    let reasons = pick_reasons(&positives, &penalties, sat_fat_d, macro_kcal);

    AvoScoreResult {
        score,
        grade: Grade::for_score(score),
        reasons,
    }
}

/// Rank contributions and keep at most two tags, strong positives first.
///
/// The saturated-fat flag is checked twice on purpose: once through the
/// weighted-penalty ranking and once against the raw density threshold. The
/// two can disagree near the boundary; the raw check wins a slot when it
/// fires. TODO(nutrition): reconcile the 2.4 g/100kcal flag with the weighted
/// sat-fat cutoff once product decides which one is authoritative.
fn pick_reasons(
    positives: &[(&'static str, f64); 3],
    penalties: &[(&'static str, f64); 5],
    sat_fat_d: f64,
    macro_kcal: f64,
) -> Vec<&'static str> {
    let mut pos: Vec<(&'static str, f64)> = positives
        .iter()
        .copied()
        .filter(|(_, pts)| *pts >= POSITIVE_REASON_MIN_PTS)
        .collect();
    pos.sort_by(|a, b| b.1.total_cmp(&a.1));

    let mut pen: Vec<(&'static str, f64)> = penalties
        .iter()
        .copied()
        .filter(|(_, pts)| *pts >= PENALTY_REASON_MIN_PTS)
        .collect();
    pen.sort_by(|a, b| b.1.total_cmp(&a.1));

    let mut reasons: Vec<&'static str> = pos
        .into_iter()
        .chain(pen)
        .map(|(key, _)| key)
        .take(2)
        .collect();

    if sat_fat_d >= SAT_FAT_FLAG_DENSITY && !reasons.contains(&REASON_HIGH_SAT_FAT) {
        if reasons.len() < 2 {
            reasons.push(REASON_HIGH_SAT_FAT);
        } else {
            reasons[1] = REASON_HIGH_SAT_FAT;
        }
    }

    if reasons.is_empty() {
        reasons.push(if macro_kcal > 0.0 {
            REASON_BALANCED
        } else {
            REASON_NO_MACRO_DATA
        });
    }

    reasons
}

/// Rescale a serving-sized measurement to the per-100 basis the scorer
/// expects. The denominator is floored at 1 so a zero or garbage serving
/// amount cannot blow the values up.
pub fn normalize_to_basis(input: &AvoScoreInput, serving_amount: f64) -> AvoScoreInput {
    let factor = 100.0 / finite(serving_amount).max(1.0);
    AvoScoreInput {
        calories: finite(input.calories) * factor,
        carb_g: finite(input.carb_g) * factor,
        fiber_g: finite(input.fiber_g) * factor,
        protein_g: finite(input.protein_g) * factor,
        fat_g: finite(input.fat_g) * factor,
        sugar_g: finite(input.sugar_g) * factor,
        sat_fat_g: finite(input.sat_fat_g) * factor,
        trans_fat_g: finite(input.trans_fat_g) * factor,
        sodium_mg: finite(input.sodium_mg) * factor,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(calories: f64) -> AvoScoreInput {
        AvoScoreInput {
            calories,
            ..Default::default()
        }
    }

    #[test]
    fn all_zero_input_scores_zero_with_no_data_reason() {
        let result = compute_avo_score(&AvoScoreInput::default());
        assert_eq!(result.score, 0);
        assert_eq!(result.grade, Grade::F);
        assert_eq!(result.reasons, vec![REASON_NO_MACRO_DATA]);
    }

    #[test]
    fn water_profile_reports_no_macro_data() {
        let result = compute_avo_score(&input(0.0));
        assert_eq!(result.reasons, vec![REASON_NO_MACRO_DATA]);
    }

    #[test]
    fn plain_nonfat_yogurt_gets_dairy_bonus_and_protein_reason() {
        // Per 100 g: 50 kcal, 10 g protein, 9 g carb all sugar, no fat.
        // k = 0.5, so densities are exactly twice the gram values.
        let yogurt = AvoScoreInput {
            calories: 50.0,
            carb_g: 9.0,
            protein_g: 10.0,
            sugar_g: 9.0,
            sodium_mg: 50.0,
            ..Default::default()
        };
        let with_bonus = compute_avo_score(&yogurt);
        assert_eq!(with_bonus.reasons, vec![REASON_HIGH_PROTEIN]);

        // Sugar density 19 instead of 18 voids the carve-out while both sugar
        // penalties clamp to the same value, so the delta is the bonus itself.
        let sweeter = AvoScoreInput {
            carb_g: 9.5,
            sugar_g: 9.5,
            ..yogurt
        };
        let without_bonus = compute_avo_score(&sweeter);
        assert_eq!(with_bonus.score, without_bonus.score + 6);
    }

    #[test]
    fn candy_bar_fails_with_sugar_and_sat_fat_reasons() {
        let candy = AvoScoreInput {
            calories: 500.0,
            carb_g: 60.0,
            sugar_g: 50.0,
            fat_g: 14.0,
            sat_fat_g: 12.0,
            sodium_mg: 100.0,
            ..Default::default()
        };
        let result = compute_avo_score(&candy);
        assert!(matches!(result.grade, Grade::D | Grade::F));
        assert!(result.reasons.contains(&REASON_HIGH_SUGAR));
        assert!(result.reasons.contains(&REASON_HIGH_SAT_FAT));
    }

    #[test]
    fn score_is_bounded_over_extreme_inputs() {
        let extremes = [-1e9, -1.0, 0.0, 0.5, 20.0, 100.0, 1e6, 1e300];
        for &calories in &extremes {
            for &grams in &extremes {
                let result = compute_avo_score(&AvoScoreInput {
                    calories,
                    carb_g: grams,
                    fiber_g: grams,
                    protein_g: grams,
                    fat_g: grams,
                    sugar_g: grams,
                    sat_fat_g: grams,
                    trans_fat_g: grams,
                    sodium_mg: grams,
                });
                assert!(result.score <= 100);
                let n = result.reasons.len();
                assert!(n == 1 || n == 2, "reasons cap violated: {:?}", result.reasons);
            }
        }
    }

    #[test]
    fn nan_and_infinity_degrade_to_zero() {
        let result = compute_avo_score(&AvoScoreInput {
            calories: f64::NAN,
            carb_g: f64::INFINITY,
            fiber_g: f64::NEG_INFINITY,
            protein_g: f64::NAN,
            fat_g: f64::NAN,
            sugar_g: f64::NAN,
            sat_fat_g: f64::NAN,
            trans_fat_g: f64::NAN,
            sodium_mg: f64::NAN,
        });
        assert_eq!(result.score, 0);
        assert_eq!(result.reasons, vec![REASON_NO_MACRO_DATA]);
    }

    #[test]
    fn scoring_is_deterministic() {
        let profile = AvoScoreInput {
            calories: 250.0,
            carb_g: 30.0,
            fiber_g: 6.0,
            protein_g: 12.0,
            fat_g: 9.0,
            sugar_g: 8.0,
            sat_fat_g: 2.0,
            trans_fat_g: 0.1,
            sodium_mg: 300.0,
        };
        let a = compute_avo_score(&profile);
        let b = compute_avo_score(&profile);
        assert_eq!(a.score, b.score);
        assert_eq!(a.grade, b.grade);
        assert_eq!(a.reasons, b.reasons);
    }

    #[test]
    fn more_protein_or_fiber_never_lowers_the_score() {
        let base = AvoScoreInput {
            calories: 200.0,
            carb_g: 25.0,
            sugar_g: 10.0,
            fat_g: 5.0,
            sat_fat_g: 1.0,
            sodium_mg: 200.0,
            ..Default::default()
        };
        let mut last = compute_avo_score(&base).score;
        for step in 1..=40 {
            let bumped = AvoScoreInput {
                protein_g: step as f64 * 0.5,
                ..base
            };
            let score = compute_avo_score(&bumped).score;
            assert!(score >= last, "protein {} dropped score", step);
            last = score;
        }
        last = compute_avo_score(&base).score;
        for step in 1..=40 {
            let bumped = AvoScoreInput {
                fiber_g: step as f64 * 0.25,
                ..base
            };
            let score = compute_avo_score(&bumped).score;
            assert!(score >= last, "fiber {} dropped score", step);
            last = score;
        }
    }

    #[test]
    fn more_sugar_sodium_or_sat_fat_never_raises_the_score() {
        let base = AvoScoreInput {
            calories: 300.0,
            carb_g: 40.0,
            protein_g: 8.0,
            fat_g: 10.0,
            ..Default::default()
        };
        let mut last = compute_avo_score(&base).score;
        for step in 1..=30 {
            let bumped = AvoScoreInput {
                sugar_g: step as f64,
                ..base
            };
            let score = compute_avo_score(&bumped).score;
            assert!(score <= last, "sugar {} raised score", step);
            last = score;
        }
        last = compute_avo_score(&base).score;
        for step in 1..=30 {
            let bumped = AvoScoreInput {
                sodium_mg: step as f64 * 100.0,
                ..base
            };
            let score = compute_avo_score(&bumped).score;
            assert!(score <= last, "sodium {} raised score", step);
            last = score;
        }
        last = compute_avo_score(&base).score;
        for step in 1..=20 {
            let bumped = AvoScoreInput {
                sat_fat_g: step as f64 * 0.5,
                ..base
            };
            let score = compute_avo_score(&bumped).score;
            assert!(score <= last, "sat fat {} raised score", step);
            last = score;
        }
    }

    #[test]
    fn sugar_buffers_compound() {
        // 100 kcal basis so densities equal raw grams. Some unsaturated fat
        // keeps the baseline above the zero clamp.
        let sugary = AvoScoreInput {
            calories: 100.0,
            carb_g: 20.0,
            sugar_g: 8.0,
            fat_g: 5.0,
            ..Default::default()
        };
        let unbuffered = compute_avo_score(&sugary).score;

        let with_protein = compute_avo_score(&AvoScoreInput {
            protein_g: 3.0,
            ..sugary
        })
        .score;
        // Protein at the buffer threshold is worth 9 positive points; any
        // gain beyond that is the recovered sugar penalty.
        assert!(with_protein > unbuffered + 9);

        let with_both = compute_avo_score(&AvoScoreInput {
            protein_g: 3.0,
            fiber_g: 2.0,
            ..sugary
        })
        .score;
        // Fiber at its buffer threshold is worth 12 positive points; the
        // extra point on top is the compounding 0.3 * 0.3 buffer.
        assert!(with_both > with_protein + 12);
    }

    #[test]
    fn grade_boundaries_are_exact() {
        assert_eq!(Grade::for_score(85), Grade::A);
        assert_eq!(Grade::for_score(84), Grade::B);
        assert_eq!(Grade::for_score(70), Grade::B);
        assert_eq!(Grade::for_score(69), Grade::C);
        assert_eq!(Grade::for_score(55), Grade::C);
        assert_eq!(Grade::for_score(54), Grade::D);
        assert_eq!(Grade::for_score(40), Grade::D);
        assert_eq!(Grade::for_score(39), Grade::F);
        assert_eq!(Grade::for_score(100), Grade::A);
        assert_eq!(Grade::for_score(0), Grade::F);
    }

    #[test]
    fn grade_round_trips_through_strings() {
        for grade in [Grade::A, Grade::B, Grade::C, Grade::D, Grade::F] {
            assert_eq!(Grade::parse(grade.as_str()), Some(grade));
        }
        assert_eq!(Grade::parse("E"), None);
    }

    #[test]
    fn raw_sat_fat_density_forces_the_flag() {
        // Sat-fat density 2.4 g/100kcal is below the weighted-penalty cutoff
        // (penalty 7.2 makes the cut, but sugar and sodium outrank it), yet
        // the raw-density check must still surface the flag.
        let profile = AvoScoreInput {
            calories: 100.0,
            carb_g: 20.0,
            sugar_g: 15.0,
            fat_g: 3.0,
            sat_fat_g: 2.4,
            sodium_mg: 400.0,
            ..Default::default()
        };
        let result = compute_avo_score(&profile);
        assert!(result.reasons.contains(&REASON_HIGH_SAT_FAT));
        assert!(result.reasons.len() <= 2);
    }

    #[test]
    fn balanced_fallback_when_nothing_dominates() {
        let mild = AvoScoreInput {
            calories: 120.0,
            carb_g: 15.0,
            fiber_g: 0.5,
            protein_g: 1.0,
            fat_g: 2.0,
            sugar_g: 2.0,
            sodium_mg: 40.0,
            ..Default::default()
        };
        let result = compute_avo_score(&mild);
        assert_eq!(result.reasons, vec![REASON_BALANCED]);
    }

    #[test]
    fn normalize_rescales_to_per_100() {
        let serving = AvoScoreInput {
            calories: 110.0,
            carb_g: 8.0,
            protein_g: 20.0,
            sodium_mg: 100.0,
            ..Default::default()
        };
        let per100 = normalize_to_basis(&serving, 200.0);
        assert!((per100.calories - 55.0).abs() < 1e-9);
        assert!((per100.protein_g - 10.0).abs() < 1e-9);
        assert!((per100.sodium_mg - 50.0).abs() < 1e-9);
    }

    #[test]
    fn normalize_floors_the_serving_amount() {
        let serving = AvoScoreInput {
            calories: 10.0,
            ..Default::default()
        };
        let zero = normalize_to_basis(&serving, 0.0);
        let nan = normalize_to_basis(&serving, f64::NAN);
        assert!((zero.calories - 1000.0).abs() < 1e-9);
        assert!((nan.calories - 1000.0).abs() < 1e-9);
    }
}
