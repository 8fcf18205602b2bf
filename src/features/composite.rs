//! Aggregate risk scores and feature-vector assembly.

use tracing::debug;

use super::contract::{FeatureContract, FeatureVector};
use super::normalize::NormalizedRecord;
use crate::error::Result;
use crate::utils::math::mean;

#[derive(Debug, Clone, PartialEq)]
pub struct CompositeFeatureBuilder {
    contract: FeatureContract,
}

impl CompositeFeatureBuilder {
    pub fn new(contract: FeatureContract) -> Self {
        Self { contract }
    }

    pub fn contract(&self) -> &FeatureContract {
        &self.contract
    }

    /// Build the contract's feature vector from a normalized record.
    ///
    /// Missing score inputs count as 0. A missing passthrough vital is a
    /// contract violation, as is any vector the contract would reject.
    pub fn build(&self, normalized: &NormalizedRecord) -> Result<FeatureVector> {
        let mut vector = FeatureVector::new(self.contract.version);

        for score in self.contract.scores {
            let inputs: Vec<f64> = score
                .inputs
                .iter()
                .map(|name| normalized.get(*name).copied().unwrap_or(0.0))
                .collect();
            vector.push(score.key, mean(&inputs));
        }

        let missing: Vec<&str> = self
            .contract
            .passthrough
            .iter()
            .copied()
            .filter(|key| !normalized.contains_key(*key))
            .collect();
        if !missing.is_empty() {
            return Err(self.contract.violation(format!(
                "required fields absent from normalized record: {}",
                missing.join(", ")
            )));
        }
        for key in self.contract.passthrough {
            if let Some(value) = normalized.get(*key) {
                vector.push(*key, *value);
            }
        }

        self.contract.validate(&vector)?;
        debug!(version = %self.contract.version, features = ?vector, "feature vector built");
        Ok(vector)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::IntakeError;
    use crate::features::contract::ContractVersion;

    fn full_record() -> NormalizedRecord {
        [
            ("Obesity", 1.0),
            ("Smoking", 1.0),
            ("Alcohol Consumption", 0.5),
            ("Diabetes", 0.0),
            ("Previous Heart Problems", 0.0),
            ("Family History", 1.0),
            ("Medication Use", 1.0),
            ("Sex_Male", 1.0),
            ("BMI", 0.68),
            ("Diastolic", 0.5),
            ("Systolic", 0.4),
            ("Heart Rate", 0.3),
            ("Stress Level", 0.9),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
    }

    #[test]
    fn test_cardio_risk_is_mean_of_six_indicators() {
        let builder =
            CompositeFeatureBuilder::new(FeatureContract::for_version(ContractVersion::V2));
        let vector = builder.build(&full_record()).unwrap();

        let cardio = vector.get("Cardio_Risk_Score").unwrap();
        assert!((cardio - 3.5 / 6.0).abs() < 1e-12);
        assert!((vector.get("Medical_Risk").unwrap() - 0.5).abs() < 1e-12);
        assert!((vector.get("Lifestyle_Risk").unwrap() - 2.5 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_output_has_exactly_contract_keys() {
        for version in [ContractVersion::V1, ContractVersion::V2] {
            let contract = FeatureContract::for_version(version);
            let builder = CompositeFeatureBuilder::new(contract.clone());
            let vector = builder.build(&full_record()).unwrap();
            assert_eq!(vector.keys().collect::<Vec<_>>(), contract.keys());
            assert_eq!(vector.get("Stress Level"), None);
        }
    }

    #[test]
    fn test_missing_score_inputs_count_as_zero() {
        let builder =
            CompositeFeatureBuilder::new(FeatureContract::for_version(ContractVersion::V2));
        let mut record = full_record();
        record.remove("Medication Use");
        let vector = builder.build(&record).unwrap();
        assert!((vector.get("Medical_Risk").unwrap() - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_missing_vital_is_a_contract_violation() {
        let builder =
            CompositeFeatureBuilder::new(FeatureContract::for_version(ContractVersion::V2));
        let mut record = full_record();
        record.remove("Systolic");
        match builder.build(&record) {
            Err(IntakeError::ContractViolation { version, message }) => {
                assert_eq!(version, "v2");
                assert!(message.contains("Systolic"));
            }
            other => panic!("expected contract violation, got {other:?}"),
        }
    }
}
