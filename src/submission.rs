//! Top-level submission handler and the display-ready result types.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use tracing::{info, warn};
use uuid::Uuid;

use crate::clients::{PredictionResponse, Predictor};
use crate::error::{IntakeError, Result};
use crate::features::{FeaturePipeline, FeatureVector};
use crate::form::FormSource;
use crate::sessions::{FormSession, SessionState};

/// Prediction mapped for presentation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskReport {
    pub session_id: Uuid,
    pub risk: String,
    pub is_high: bool,
    pub probability_high: f64,
    pub probability_low: f64,
    pub confidence: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debug: Option<serde_json::Value>,
    pub features: FeatureVector,
    pub assessed_at: DateTime<Utc>,
}

impl RiskReport {
    pub fn new(session_id: Uuid, features: FeatureVector, response: PredictionResponse) -> Self {
        Self {
            session_id,
            is_high: response.is_high_risk(),
            risk: response.risk,
            probability_high: response.probability_high,
            probability_low: response.probability_low,
            confidence: response.confidence,
            debug: response.debug,
            features,
            assessed_at: Utc::now(),
        }
    }

    pub fn headline(&self) -> String {
        format!("RISCO {}", self.risk)
    }
}

fn percent(p: f64) -> String {
    format!("{:.1}%", p * 100.0)
}

impl fmt::Display for RiskReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.headline())?;
        writeln!(
            f,
            "Probabilidade de risco alto: {}",
            percent(self.probability_high)
        )?;
        writeln!(
            f,
            "Probabilidade de risco baixo: {}",
            percent(self.probability_low)
        )?;
        write!(f, "Confiança: {}", percent(self.confidence))
    }
}

/// Result of one final-submission attempt, for the presentation layer to render.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SubmissionOutcome {
    Completed(RiskReport),
    ValidationFailed { step: usize, fields: Vec<String> },
    TransportFailed { message: String },
}

impl SubmissionOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, SubmissionOutcome::Completed(_))
    }
}

/// Puts the session back on the final step if the request never settles,
/// e.g. when the `submit` future is dropped mid-flight.
struct InFlight<'a> {
    session: &'a mut FormSession,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if self.session.state() == SessionState::Submitting
            && self.session.fail_submission().is_ok()
        {
            warn!(session = %self.session.id(), "submission abandoned before the backend replied");
        }
    }
}

/// Run the final submission for `session`.
///
/// Validation and transport failures come back as outcomes and leave the
/// session on the final step. Contract violations and invalid transitions are
/// returned as errors: they are never sent to the backend. Dropping the
/// returned future while the request is pending also returns the session to
/// the final step.
pub async fn submit<S, P>(
    session: &mut FormSession,
    source: &S,
    pipeline: &FeaturePipeline,
    predictor: &P,
) -> Result<SubmissionOutcome>
where
    S: FormSource + ?Sized,
    P: Predictor + ?Sized,
{
    let features = match session.begin_submission(source, pipeline) {
        Ok(features) => features,
        Err(IntakeError::Validation { step, fields }) => {
            return Ok(SubmissionOutcome::ValidationFailed { step, fields });
        }
        Err(err) => return Err(err),
    };

    let in_flight = InFlight { session };
    let session = &mut *in_flight.session;
    match predictor.predict(&features).await {
        Ok(response) => {
            session.complete_submission()?;
            let report = RiskReport::new(session.id(), features, response);
            info!(session = %report.session_id, risk = %report.risk, "assessment completed");
            Ok(SubmissionOutcome::Completed(report))
        }
        Err(err) if err.is_recoverable() => {
            session.fail_submission()?;
            warn!(session = %session.id(), error = %err, "prediction failed");
            Ok(SubmissionOutcome::TransportFailed {
                message: err.to_string(),
            })
        }
        Err(err) => {
            session.fail_submission()?;
            Err(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::{
        CompositeFeatureBuilder, ContractVersion, FeatureContract, NormalizedRecord,
    };

    fn vector() -> FeatureVector {
        let record: NormalizedRecord = [
            ("Sex_Male", 1.0),
            ("BMI", 0.5),
            ("Diastolic", 0.5),
            ("Systolic", 0.5),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();
        CompositeFeatureBuilder::new(FeatureContract::for_version(ContractVersion::V2))
            .build(&record)
            .unwrap()
    }

    #[test]
    fn test_report_formats_percentages() {
        let report = RiskReport::new(
            Uuid::nil(),
            vector(),
            PredictionResponse {
                risk: "ALTO".into(),
                probability_high: 0.8234,
                probability_low: 0.1766,
                confidence: 0.8234,
                debug: None,
            },
        );
        assert!(report.is_high);
        let text = report.to_string();
        assert!(text.starts_with("RISCO ALTO"));
        assert!(text.contains("Probabilidade de risco alto: 82.3%"));
        assert!(text.contains("Probabilidade de risco baixo: 17.7%"));
    }

    #[test]
    fn test_outcome_serializes_with_tag() {
        let outcome = SubmissionOutcome::TransportFailed {
            message: "bad input".into(),
        };
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["outcome"], "transport_failed");
        assert_eq!(json["message"], "bad input");
    }
}
