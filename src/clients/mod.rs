pub mod prediction;
pub mod traits;

pub use prediction::PredictionClient;
pub use traits::{ModelInfo, PredictionResponse, Predictor};
