//! Turns a cumulative record into the backend's feature vector.

pub mod composite;
pub mod contract;
pub mod normalize;

pub use composite::CompositeFeatureBuilder;
pub use contract::{ContractVersion, FeatureContract, FeatureVector};
pub use normalize::{FeatureNormalizer, NormalizedRecord};

use crate::config::FeaturesConfig;
use crate::error::Result;
use crate::form::answer::CumulativeRecord;

/// Normalizer plus builder for one contract version.
#[derive(Debug, Clone, PartialEq)]
pub struct FeaturePipeline {
    normalizer: FeatureNormalizer,
    builder: CompositeFeatureBuilder,
}

impl FeaturePipeline {
    pub fn new(normalizer: FeatureNormalizer, contract: FeatureContract) -> Self {
        Self {
            normalizer,
            builder: CompositeFeatureBuilder::new(contract),
        }
    }

    pub fn for_version(version: ContractVersion) -> Self {
        Self::new(
            FeatureNormalizer::default(),
            FeatureContract::for_version(version),
        )
    }

    pub fn from_config(config: &FeaturesConfig) -> Self {
        Self::new(
            FeatureNormalizer::new(config.male_label.clone(), config.obesity_threshold),
            FeatureContract::for_version(config.contract_version),
        )
    }

    pub fn contract(&self) -> &FeatureContract {
        self.builder.contract()
    }

    /// Derive, normalize, and compose. Never mutates `record`.
    pub fn build(&self, record: &CumulativeRecord) -> Result<FeatureVector> {
        let normalized = self.normalizer.normalize(record);
        self.builder.build(&normalized)
    }
}

impl Default for FeaturePipeline {
    fn default() -> Self {
        Self::for_version(ContractVersion::default())
    }
}
