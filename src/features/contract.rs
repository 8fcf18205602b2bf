//! Versioned feature contracts shared with the prediction backend.

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::{IntakeError, Result};

pub const CARDIO_RISK_SCORE: &str = "Cardio_Risk_Score";
pub const MEDICAL_RISK: &str = "Medical_Risk";
pub const LIFESTYLE_RISK: &str = "Lifestyle_Risk";

/// Backend revision the feature vector is built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContractVersion {
    /// Seven features ending in heart rate.
    V1,
    /// Seven features ending in systolic pressure.
    #[default]
    V2,
}

impl fmt::Display for ContractVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContractVersion::V1 => f.write_str("v1"),
            ContractVersion::V2 => f.write_str("v2"),
        }
    }
}

impl FromStr for ContractVersion {
    type Err = IntakeError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "v1" | "1" => Ok(ContractVersion::V1),
            "v2" | "2" => Ok(ContractVersion::V2),
            other => Err(IntakeError::Config {
                message: format!("Unknown contract version '{}', expected v1 or v2", other),
            }),
        }
    }
}

/// An aggregate score: the unweighted mean of its inputs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompositeScore {
    pub key: &'static str,
    pub inputs: &'static [&'static str],
}

/// Declared shape of the feature vector for one contract version.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureContract {
    pub version: ContractVersion,
    pub scores: &'static [CompositeScore],
    /// Normalized fields copied into the output under their own names.
    pub passthrough: &'static [&'static str],
}

const RISK_SCORES: &[CompositeScore] = &[
    CompositeScore {
        key: CARDIO_RISK_SCORE,
        inputs: &[
            "Obesity",
            "Smoking",
            "Alcohol Consumption",
            "Diabetes",
            "Previous Heart Problems",
            "Family History",
        ],
    },
    CompositeScore {
        key: MEDICAL_RISK,
        inputs: &[
            "Diabetes",
            "Previous Heart Problems",
            "Family History",
            "Medication Use",
        ],
    },
    CompositeScore {
        key: LIFESTYLE_RISK,
        inputs: &["Smoking", "Alcohol Consumption", "Obesity"],
    },
];

const V1_PASSTHROUGH: &[&str] = &["Sex_Male", "BMI", "Diastolic", "Heart Rate"];

const V2_PASSTHROUGH: &[&str] = &["Sex_Male", "BMI", "Diastolic", "Systolic"];

impl FeatureContract {
    pub fn for_version(version: ContractVersion) -> Self {
        match version {
            ContractVersion::V1 => Self {
                version,
                scores: RISK_SCORES,
                passthrough: V1_PASSTHROUGH,
            },
            ContractVersion::V2 => Self {
                version,
                scores: RISK_SCORES,
                passthrough: V2_PASSTHROUGH,
            },
        }
    }

    /// Output keys in wire order: scores first, then passthrough vitals.
    pub fn keys(&self) -> Vec<&'static str> {
        self.scores
            .iter()
            .map(|s| s.key)
            .chain(self.passthrough.iter().copied())
            .collect()
    }

    /// Reject a vector whose keys differ from the declared set or whose values are unusable.
    pub fn validate(&self, vector: &FeatureVector) -> Result<()> {
        let expected = self.keys();
        let actual: Vec<&str> = vector.keys().collect();

        let missing: Vec<&str> = expected
            .iter()
            .copied()
            .filter(|k| !actual.contains(k))
            .collect();
        let extra: Vec<&str> = actual
            .iter()
            .copied()
            .filter(|k| !expected.contains(k))
            .collect();

        if !missing.is_empty() || !extra.is_empty() {
            return Err(self.violation(format!(
                "feature keys mismatch (missing: [{}], unexpected: [{}])",
                missing.join(", "),
                extra.join(", ")
            )));
        }
        if actual != expected {
            return Err(self.violation(format!(
                "feature keys out of order: got [{}]",
                actual.join(", ")
            )));
        }

        for (key, value) in vector.iter() {
            if !value.is_finite() {
                return Err(self.violation(format!("{} is not a finite number", key)));
            }
        }
        for score in self.scores {
            let value = vector.get(score.key).unwrap_or_default();
            if !(0.0..=1.0).contains(&value) {
                return Err(self.violation(format!(
                    "{} = {} is outside [0, 1]",
                    score.key, value
                )));
            }
        }
        Ok(())
    }

    pub(crate) fn violation(&self, message: String) -> IntakeError {
        IntakeError::ContractViolation {
            version: self.version.to_string(),
            message,
        }
    }
}

/// The ordered numeric features sent to the backend.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    version: ContractVersion,
    values: Vec<(&'static str, f64)>,
}

impl FeatureVector {
    pub(crate) fn new(version: ContractVersion) -> Self {
        Self {
            version,
            values: Vec::new(),
        }
    }

    pub(crate) fn push(&mut self, key: &'static str, value: f64) {
        self.values.push((key, value));
    }

    pub fn version(&self) -> ContractVersion {
        self.version
    }

    pub fn get(&self, key: &str) -> Option<f64> {
        self.values.iter().find(|(k, _)| *k == key).map(|(_, v)| *v)
    }

    pub fn keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.values.iter().map(|(k, _)| *k)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, f64)> + '_ {
        self.values.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl Serialize for FeatureVector {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (key, value) in &self.values {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vector_for(contract: &FeatureContract, value: f64) -> FeatureVector {
        let mut v = FeatureVector::new(contract.version);
        for key in contract.keys() {
            v.push(key, value);
        }
        v
    }

    #[test]
    fn test_v2_keys_match_backend_order() {
        let contract = FeatureContract::for_version(ContractVersion::V2);
        assert_eq!(
            contract.keys(),
            vec![
                "Cardio_Risk_Score",
                "Medical_Risk",
                "Lifestyle_Risk",
                "Sex_Male",
                "BMI",
                "Diastolic",
                "Systolic"
            ]
        );
        let v1 = FeatureContract::for_version(ContractVersion::V1);
        assert_eq!(v1.keys().last(), Some(&"Heart Rate"));
    }

    #[test]
    fn test_validate_rejects_missing_and_extra_keys() {
        let contract = FeatureContract::for_version(ContractVersion::V2);
        let mut vector = vector_for(&contract, 0.5);
        assert!(contract.validate(&vector).is_ok());

        vector.push("Heart Rate", 0.3);
        let err = contract.validate(&vector).unwrap_err();
        assert!(err.to_string().contains("unexpected: [Heart Rate]"));

        let mut short = FeatureVector::new(contract.version);
        for key in contract.keys().into_iter().take(6) {
            short.push(key, 0.5);
        }
        let err = contract.validate(&short).unwrap_err();
        assert!(err.to_string().contains("missing: [Systolic]"));
    }

    #[test]
    fn test_validate_rejects_out_of_range_scores() {
        let contract = FeatureContract::for_version(ContractVersion::V2);
        let vector = vector_for(&contract, 1.5);
        assert!(matches!(
            contract.validate(&vector),
            Err(IntakeError::ContractViolation { .. })
        ));
    }

    #[test]
    fn test_serializes_as_ordered_flat_object() {
        let contract = FeatureContract::for_version(ContractVersion::V2);
        let vector = vector_for(&contract, 0.25);
        let json = serde_json::to_string(&vector).unwrap();
        assert!(json.starts_with(r#"{"Cardio_Risk_Score":0.25,"Medical_Risk":0.25"#));
        assert!(json.ends_with(r#""Systolic":0.25}"#));
    }

    #[test]
    fn test_parses_versions() {
        assert_eq!("V1".parse::<ContractVersion>().unwrap(), ContractVersion::V1);
        assert_eq!("2".parse::<ContractVersion>().unwrap(), ContractVersion::V2);
        assert!("v3".parse::<ContractVersion>().is_err());
    }
}
