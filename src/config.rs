use serde::{Deserialize, Serialize};

use crate::error::{IntakeError, Result};
use crate::features::ContractVersion;
use crate::features::normalize::{DEFAULT_MALE_LABEL, DEFAULT_OBESITY_THRESHOLD};

const MAX_RETRIES_CAP: u32 = 5;

/// Main configuration structure loaded from cardio_intake.toml and environment variables
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub features: FeaturesConfig,
    /// Runtime configuration loaded from environment variables
    #[serde(skip)]
    pub runtime: RuntimeConfig,
}

/// Prediction backend endpoint and transport behavior
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BackendConfig {
    pub base_url: String,
    pub predict_path: String,
    pub model_info_path: String,
    pub timeout_ms: u64,
    pub max_retries: u32,
    pub retry_delay_ms: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:5000".to_string(),
            predict_path: "/predict".to_string(),
            model_info_path: "/model-info".to_string(),
            timeout_ms: 10_000,
            max_retries: 2,
            retry_delay_ms: 500,
        }
    }
}

impl BackendConfig {
    pub fn predict_url(&self) -> String {
        join_url(&self.base_url, &self.predict_path)
    }

    pub fn model_info_url(&self) -> String {
        join_url(&self.base_url, &self.model_info_path)
    }
}

fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// Feature contract and derivation parameters
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct FeaturesConfig {
    pub contract_version: ContractVersion,
    pub male_label: String,
    pub obesity_threshold: f64,
}

impl Default for FeaturesConfig {
    fn default() -> Self {
        Self {
            contract_version: ContractVersion::default(),
            male_label: DEFAULT_MALE_LABEL.to_string(),
            obesity_threshold: DEFAULT_OBESITY_THRESHOLD,
        }
    }
}

/// Runtime configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub log_level: String,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            log_level: "cardio_intake=info".to_string(),
        }
    }
}

impl RuntimeConfig {
    pub fn load_from_env() -> Self {
        Self {
            log_level: std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "cardio_intake=info".to_string()),
        }
    }
}

impl Config {
    /// Load configuration from TOML file and environment variables
    /// Uses CARDIO_INTAKE_CONFIG environment variable or defaults to "cardio_intake.toml"
    pub fn load() -> Result<Self> {
        if let Ok(env_path) = std::env::var("CARDIO_ENV_FILE") {
            let _ = dotenvy::from_path(env_path);
        } else {
            let _ = dotenvy::dotenv();
        }

        let config_path = std::env::var("CARDIO_INTAKE_CONFIG")
            .unwrap_or_else(|_| "cardio_intake.toml".to_string());

        let mut config = match std::fs::read_to_string(&config_path) {
            Ok(content) => Self::from_toml_str(&content)?,
            Err(_) => {
                tracing::warn!("Config file {} not found, using defaults", config_path);
                Self::default()
            }
        };

        config.apply_env_overrides()?;
        config.runtime = RuntimeConfig::load_from_env();
        config.validate()?;

        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        Ok(config)
    }

    fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(url) = std::env::var("CARDIO_BACKEND_URL") {
            self.backend.base_url = url;
            tracing::debug!("CARDIO_BACKEND_URL env override applied");
        }
        if let Some(timeout) = std::env::var("CARDIO_BACKEND_TIMEOUT_MS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
        {
            self.backend.timeout_ms = timeout;
        }
        if let Some(retries) = std::env::var("CARDIO_BACKEND_MAX_RETRIES")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
        {
            self.backend.max_retries = retries;
        }
        if let Some(delay) = std::env::var("CARDIO_BACKEND_RETRY_DELAY_MS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
        {
            self.backend.retry_delay_ms = delay;
        }
        if let Ok(version) = std::env::var("CARDIO_CONTRACT_VERSION") {
            self.features.contract_version = version.parse()?;
            tracing::debug!("CARDIO_CONTRACT_VERSION env override applied");
        }
        Ok(())
    }

    /// Validate the configuration, clamping soft limits
    pub fn validate(&mut self) -> Result<()> {
        let url = self.backend.base_url.trim();
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(IntakeError::Config {
                message: format!(
                    "Backend URL '{}' must start with http:// or https://",
                    self.backend.base_url
                ),
            });
        }
        if self.backend.timeout_ms == 0 {
            return Err(IntakeError::Config {
                message: "backend.timeout_ms must be > 0".to_string(),
            });
        }
        if self.backend.max_retries > MAX_RETRIES_CAP {
            tracing::warn!(
                "max_retries {} exceeds max {}, clamping",
                self.backend.max_retries,
                MAX_RETRIES_CAP
            );
            self.backend.max_retries = MAX_RETRIES_CAP;
        }
        let threshold = self.features.obesity_threshold;
        if threshold.is_nan() || threshold <= 0.0 {
            return Err(IntakeError::Config {
                message: "features.obesity_threshold must be > 0".to_string(),
            });
        }
        if self.features.male_label.trim().is_empty() {
            return Err(IntakeError::Config {
                message: "features.male_label cannot be empty".to_string(),
            });
        }
        Ok(())
    }
}
