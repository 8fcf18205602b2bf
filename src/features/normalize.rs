//! Derivations and min/max normalization of the cumulative record.

use std::collections::BTreeMap;

use tracing::{debug, warn};

use crate::form::answer::{AnswerValue, CumulativeRecord};
use crate::utils::math::normalize;

/// How a raw field maps into the normalized record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldRule {
    /// Rescaled into [0, 1] against fixed bounds.
    Range { min: f64, max: f64 },
    /// Binary indicator: truncated to an integer, held to {0, 1}.
    Indicator,
    /// Copied through as a float, held to [0, 1].
    Passthrough,
}

/// Per-field rules applied by [`FeatureNormalizer`].
pub const NORMALIZATION_TABLE: &[(&str, FieldRule)] = &[
    ("Alcohol Consumption", FieldRule::Range { min: 0.0, max: 10.0 }),
    ("BMI", FieldRule::Range { min: 15.0, max: 40.0 }),
    ("Diabetes", FieldRule::Indicator),
    ("Diastolic", FieldRule::Range { min: 40.0, max: 120.0 }),
    ("Heart Rate", FieldRule::Range { min: 40.0, max: 180.0 }),
    ("Diet_Healthy", FieldRule::Passthrough),
    ("Family History", FieldRule::Indicator),
    ("Medication Use", FieldRule::Indicator),
    ("Obesity", FieldRule::Indicator),
    ("Physical Activity Days Per Week", FieldRule::Range { min: 0.0, max: 7.0 }),
    ("Previous Heart Problems", FieldRule::Indicator),
    ("Sex_Male", FieldRule::Indicator),
    ("Sleep Hours Per Day", FieldRule::Range { min: 0.0, max: 24.0 }),
    ("Smoking", FieldRule::Indicator),
    ("Stress Level", FieldRule::Range { min: 0.0, max: 10.0 }),
    ("Systolic", FieldRule::Range { min: 80.0, max: 200.0 }),
];

pub const DEFAULT_MALE_LABEL: &str = "Masculino";
pub const DEFAULT_OBESITY_THRESHOLD: f64 = 30.0;

/// Canonical field name to normalized value.
pub type NormalizedRecord = BTreeMap<String, f64>;

#[derive(Debug, Clone, PartialEq)]
pub struct FeatureNormalizer {
    male_label: String,
    obesity_threshold: f64,
}

impl Default for FeatureNormalizer {
    fn default() -> Self {
        Self::new(DEFAULT_MALE_LABEL, DEFAULT_OBESITY_THRESHOLD)
    }
}

impl FeatureNormalizer {
    pub fn new(male_label: impl Into<String>, obesity_threshold: f64) -> Self {
        Self {
            male_label: male_label.into(),
            obesity_threshold,
        }
    }

    /// Apply the categorical derivations to a copy of `record`.
    ///
    /// `Sex` is replaced by the `Sex_Male` indicator. A numeric, non-zero `BMI`
    /// sets `Obesity`.
    pub fn derive(&self, record: &CumulativeRecord) -> CumulativeRecord {
        let mut derived = record.clone();

        if let Some(sex) = derived.get("Sex").filter(|v| !v.is_blank()).cloned() {
            let is_male = sex.to_string().trim() == self.male_label;
            derived.insert("Sex_Male", AnswerValue::Flag(is_male));
            derived.remove("Sex");
        }

        match derived.get("BMI").map(|v| (v.as_f64(), v.clone())) {
            Some((Some(bmi), _)) if bmi != 0.0 => {
                derived.insert("Obesity", AnswerValue::Flag(bmi >= self.obesity_threshold));
            }
            Some((None, raw)) if !raw.is_blank() => {
                warn!(value = %raw, "BMI is not numeric, obesity not derived");
            }
            _ => {}
        }

        derived
    }

    /// Normalize the fields of `record` covered by [`NORMALIZATION_TABLE`].
    /// Absent or non-numeric fields are omitted.
    pub fn normalize(&self, record: &CumulativeRecord) -> NormalizedRecord {
        let derived = self.derive(record);
        let mut out = NormalizedRecord::new();

        for (name, rule) in NORMALIZATION_TABLE {
            let Some(raw) = derived.get(name) else {
                continue;
            };
            let Some(value) = raw.as_f64() else {
                warn!(field = %name, value = %raw, "non-numeric value dropped from normalization");
                continue;
            };
            let normalized = match rule {
                FieldRule::Range { min, max } => normalize(value, *min, *max),
                FieldRule::Indicator => value.trunc().clamp(0.0, 1.0),
                FieldRule::Passthrough => value.clamp(0.0, 1.0),
            };
            out.insert((*name).to_string(), normalized);
        }

        debug!(fields = out.len(), "normalized record");
        out
    }
}
