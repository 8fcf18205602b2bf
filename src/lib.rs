pub mod clients;
pub mod config;
pub mod error;
pub mod features;
pub mod form;
pub mod sessions;
pub mod submission;
pub mod utils;

pub use clients::{PredictionClient, PredictionResponse, Predictor};
pub use config::Config;
pub use error::{IntakeError, Result};
pub use features::{ContractVersion, FeatureContract, FeaturePipeline, FeatureVector};
pub use form::{FormSource, Questionnaire, StaticFormSource};
pub use sessions::{FormSession, SessionState, StepAction, StepView};
pub use submission::{RiskReport, SubmissionOutcome, submit};
