use serde::{Deserialize, Serialize};

/// Kilograms per pound (exact, by definition of the avoirdupois pound).
pub const KG_PER_LB: f64 = 0.45359237;
/// Milliliters per US fluid ounce.
pub const ML_PER_FL_OZ: f64 = 29.5735;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeightUnit {
    Kg,
    Lb,
}

impl WeightUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            WeightUnit::Kg => "kg",
            WeightUnit::Lb => "lb",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "kg" => Some(WeightUnit::Kg),
            "lb" => Some(WeightUnit::Lb),
            _ => None,
        }
    }

    /// Convert a value in this unit to kilograms, the canonical storage unit.
    pub fn to_kg(&self, value: f64) -> f64 {
        match self {
            WeightUnit::Kg => value,
            WeightUnit::Lb => lb_to_kg(value),
        }
    }

    pub fn from_kg(&self, kg: f64) -> f64 {
        match self {
            WeightUnit::Kg => kg,
            WeightUnit::Lb => kg_to_lb(kg),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WaterUnit {
    Ml,
    FlOz,
}

impl WaterUnit {
    /// Convert a value in this unit to milliliters, the canonical storage unit.
    pub fn to_ml(&self, value: f64) -> f64 {
        match self {
            WaterUnit::Ml => value,
            WaterUnit::FlOz => value * ML_PER_FL_OZ,
        }
    }
}

pub fn lb_to_kg(lb: f64) -> f64 {
    lb * KG_PER_LB
}

pub fn kg_to_lb(kg: f64) -> f64 {
    kg / KG_PER_LB
}

pub fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

pub fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

pub fn round3(v: f64) -> f64 {
    (v * 1000.0).round() / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pound_conversion_round_trips() {
        assert!((lb_to_kg(1.0) - 0.45359237).abs() < 1e-12);
        assert!((kg_to_lb(lb_to_kg(154.0)) - 154.0).abs() < 1e-9);
    }

    #[test]
    fn weight_unit_to_canonical_kg() {
        assert_eq!(WeightUnit::Kg.to_kg(80.0), 80.0);
        assert!((WeightUnit::Lb.to_kg(176.37) - 80.0).abs() < 0.01);
    }

    #[test]
    fn water_unit_to_canonical_ml() {
        assert_eq!(WaterUnit::Ml.to_ml(250.0), 250.0);
        assert!((WaterUnit::FlOz.to_ml(8.0) - 236.588).abs() < 0.001);
    }

    #[test]
    fn rounding_is_half_up() {
        assert_eq!(round1(2.25), 2.3);
        assert_eq!(round1(2.24), 2.2);
        assert_eq!(round2(0.005), 0.01);
        assert_eq!(round3(1.6666), 1.667);
    }

    #[test]
    fn unit_strings_round_trip() {
        assert_eq!(WeightUnit::parse("kg"), Some(WeightUnit::Kg));
        assert_eq!(WeightUnit::parse("lb"), Some(WeightUnit::Lb));
        assert_eq!(WeightUnit::parse("stone"), None);
        assert_eq!(WeightUnit::Lb.as_str(), "lb");
    }
}
