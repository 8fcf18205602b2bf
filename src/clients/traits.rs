use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::features::FeatureVector;

/// Label the backend uses for the high-risk class.
pub const HIGH_RISK_LABEL: &str = "ALTO";

/// Successful `/predict` response body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResponse {
    pub risk: String,
    pub probability_high: f64,
    pub probability_low: f64,
    pub confidence: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debug: Option<serde_json::Value>,
}

impl PredictionResponse {
    pub fn is_high_risk(&self) -> bool {
        self.risk == HIGH_RISK_LABEL
    }
}

/// `/model-info` response body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelInfo {
    #[serde(default)]
    pub model_type: Option<String>,
    pub features: Vec<String>,
    #[serde(default)]
    pub features_count: Option<usize>,
    #[serde(default)]
    pub status: Option<String>,
}

#[async_trait]
pub trait Predictor: Send + Sync {
    async fn predict(&self, features: &FeatureVector) -> Result<PredictionResponse>;
}
