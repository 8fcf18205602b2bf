use async_trait::async_trait;
use reqwest::{Client, Response};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::clients::traits::{ModelInfo, PredictionResponse, Predictor};
use crate::config::BackendConfig;
use crate::error::{IntakeError, Result};
use crate::features::{FeatureContract, FeatureVector};

/// HTTP client for the risk-prediction backend.
#[derive(Clone, Debug)]
pub struct PredictionClient {
    predict_url: String,
    model_info_url: String,
    timeout_ms: u64,
    max_retries: u32,
    retry_delay: Duration,
    client: Client,
}

impl PredictionClient {
    pub fn new(config: &BackendConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| IntakeError::Config {
                message: format!("Failed to build HTTP client: {}", e),
            })?;

        Ok(Self {
            predict_url: config.predict_url(),
            model_info_url: config.model_info_url(),
            timeout_ms: config.timeout_ms,
            max_retries: config.max_retries,
            retry_delay: Duration::from_millis(config.retry_delay_ms),
            client,
        })
    }

    pub fn predict_url(&self) -> &str {
        &self.predict_url
    }

    /// POST the feature vector. Connection-level failures are retried; HTTP
    /// error statuses are returned as-is since the classifier is deterministic.
    pub async fn predict(&self, features: &FeatureVector) -> Result<PredictionResponse> {
        let mut attempt = 0;
        let res = loop {
            match self.client.post(&self.predict_url).json(features).send().await {
                Ok(res) => break res,
                Err(err) if attempt < self.max_retries && (err.is_connect() || err.is_timeout()) => {
                    attempt += 1;
                    warn!(
                        attempt,
                        max_retries = self.max_retries,
                        error = %err,
                        "prediction request failed, retrying"
                    );
                    tokio::time::sleep(self.retry_delay).await;
                }
                Err(err) => return Err(self.map_send_error(err, "prediction request")),
            }
        };

        let body = self.read_body(res).await?;
        let response: PredictionResponse =
            serde_json::from_value(body).map_err(|e| IntakeError::Transport {
                status: None,
                message: format!("Malformed prediction response: {}", e),
            })?;

        for (name, value) in [
            ("probability_high", response.probability_high),
            ("probability_low", response.probability_low),
            ("confidence", response.confidence),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(IntakeError::Transport {
                    status: None,
                    message: format!("Malformed prediction response: {} = {} outside [0, 1]", name, value),
                });
            }
        }

        info!(risk = %response.risk, probability_high = response.probability_high, "prediction received");
        Ok(response)
    }

    /// Fetch the backend's declared feature list.
    pub async fn model_info(&self) -> Result<ModelInfo> {
        let res = self
            .client
            .get(&self.model_info_url)
            .send()
            .await
            .map_err(|e| self.map_send_error(e, "model info request"))?;
        let body = self.read_body(res).await?;
        Ok(serde_json::from_value(body)?)
    }

    /// Contract keys the backend does not list, in contract order.
    pub fn contract_gaps(contract: &FeatureContract, info: &ModelInfo) -> Vec<&'static str> {
        contract
            .keys()
            .into_iter()
            .filter(|k| !info.features.iter().any(|f| f == k))
            .collect()
    }

    /// Read a JSON body, turning non-2xx statuses and `{"error": ...}` bodies into transport errors.
    async fn read_body(&self, res: Response) -> Result<Value> {
        let status = res.status();
        let text = res.text().await.map_err(|e| IntakeError::Transport {
            status: Some(status.as_u16()),
            message: format!("Failed to read backend response: {}", e),
        })?;
        let body: Option<Value> = serde_json::from_str(&text).ok();
        let error_message = body
            .as_ref()
            .and_then(|b| b.get("error"))
            .and_then(|e| e.as_str())
            .map(str::to_string);

        if !status.is_success() {
            let detail = error_message.unwrap_or(text);
            debug!(status = status.as_u16(), detail = %detail, "backend returned error status");
            return Err(IntakeError::Transport {
                status: Some(status.as_u16()),
                message: format!("Backend returned {}: {}", status, detail),
            });
        }
        if let Some(message) = error_message {
            return Err(IntakeError::Transport {
                status: Some(status.as_u16()),
                message: format!("Backend error: {}", message),
            });
        }

        body.ok_or_else(|| IntakeError::Transport {
            status: Some(status.as_u16()),
            message: "Backend response is not valid JSON".to_string(),
        })
    }

    fn map_send_error(&self, err: reqwest::Error, operation: &str) -> IntakeError {
        if err.is_timeout() {
            IntakeError::Timeout {
                operation: operation.to_string(),
                timeout_ms: self.timeout_ms,
            }
        } else {
            err.into()
        }
    }
}

#[async_trait]
impl Predictor for PredictionClient {
    async fn predict(&self, features: &FeatureVector) -> Result<PredictionResponse> {
        PredictionClient::predict(self, features).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::ContractVersion;

    #[test]
    fn test_contract_gaps_report_unlisted_keys() {
        let info = ModelInfo {
            model_type: Some("XGBoost".into()),
            features: [
                "Cardio_Risk_Score",
                "Medical_Risk",
                "Lifestyle_Risk",
                "Sex_Male",
                "BMI",
                "Diastolic",
                "Heart Rate",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            features_count: Some(7),
            status: None,
        };

        let v1 = FeatureContract::for_version(ContractVersion::V1);
        let v2 = FeatureContract::for_version(ContractVersion::V2);
        assert!(PredictionClient::contract_gaps(&v1, &info).is_empty());
        assert_eq!(PredictionClient::contract_gaps(&v2, &info), vec!["Systolic"]);
    }

    #[test]
    fn test_builds_urls_from_config() {
        let config = BackendConfig {
            base_url: "http://127.0.0.1:5000/".into(),
            ..BackendConfig::default()
        };
        let client = PredictionClient::new(&config).unwrap();
        assert_eq!(client.predict_url(), "http://127.0.0.1:5000/predict");
    }
}
