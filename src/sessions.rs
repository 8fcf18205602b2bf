//! The step-wise form state machine.
//!
//! A [`FormSession`] owns the current step and the cumulative record for one
//! respondent. Data only flows into the record on a successful `proceed` (or
//! final submission); going back never removes merged fields.

use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{IntakeError, Result};
use crate::features::{FeaturePipeline, FeatureVector};
use crate::form::{
    CumulativeRecord, FieldExtractor, FormSource, Questionnaire, StepDefinition, StepValidator,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SessionState {
    Collecting { step: usize },
    /// A final submission is in flight.
    Submitting,
    Submitted,
}

/// What the presentation layer offers on the current screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StepAction {
    Next,
    FinalSubmit,
    Waiting,
    Done,
}

/// Snapshot of the current screen: title, progress, and primary action.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepView {
    pub step: usize,
    pub total_steps: usize,
    pub title: String,
    /// Fraction in [0, 1]; `(step - 1) / N` while collecting, 1.0 once submitted.
    pub progress: f64,
    pub action: StepAction,
    pub can_go_back: bool,
}

pub struct FormSession {
    id: Uuid,
    questionnaire: Arc<Questionnaire>,
    state: SessionState,
    record: CumulativeRecord,
}

impl FormSession {
    pub fn new(questionnaire: Arc<Questionnaire>) -> Self {
        let id = Uuid::new_v4();
        info!(session = %id, steps = questionnaire.total_steps(), "form session started");
        Self {
            id,
            questionnaire,
            state: SessionState::Collecting { step: 1 },
            record: CumulativeRecord::new(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn record(&self) -> &CumulativeRecord {
        &self.record
    }

    pub fn total_steps(&self) -> usize {
        self.questionnaire.total_steps()
    }

    /// Current step while collecting.
    pub fn current_step(&self) -> Option<usize> {
        match self.state {
            SessionState::Collecting { step } => Some(step),
            _ => None,
        }
    }

    pub fn view(&self) -> StepView {
        let total = self.total_steps();
        match self.state {
            SessionState::Collecting { step } => StepView {
                step,
                total_steps: total,
                title: self
                    .questionnaire
                    .step(step)
                    .map(|s| s.title.clone())
                    .unwrap_or_default(),
                progress: (step - 1) as f64 / total as f64,
                action: if step == total {
                    StepAction::FinalSubmit
                } else {
                    StepAction::Next
                },
                can_go_back: step > 1,
            },
            SessionState::Submitting => StepView {
                step: total,
                total_steps: total,
                title: self
                    .questionnaire
                    .step(total)
                    .map(|s| s.title.clone())
                    .unwrap_or_default(),
                progress: (total - 1) as f64 / total as f64,
                action: StepAction::Waiting,
                can_go_back: false,
            },
            SessionState::Submitted => StepView {
                step: total,
                total_steps: total,
                title: self.questionnaire.completion_title.clone(),
                progress: 1.0,
                action: StepAction::Done,
                can_go_back: false,
            },
        }
    }

    /// Extract and validate the current step; on success merge it and advance.
    ///
    /// On validation failure nothing changes. The final step is left through
    /// [`FormSession::begin_submission`] instead.
    pub fn proceed<S: FormSource + ?Sized>(&mut self, source: &S) -> Result<StepView> {
        let step = self.collecting_step("proceed")?;
        if step >= self.total_steps() {
            return Err(IntakeError::InvalidTransition {
                message: format!("step {} is the final step; submit instead", step),
            });
        }

        self.collect(step, source)?;
        self.state = SessionState::Collecting { step: step + 1 };
        info!(session = %self.id, from = step, to = step + 1, "step completed");
        Ok(self.view())
    }

    /// Move to the previous step. A no-op on step 1. Never touches the record.
    pub fn back(&mut self) -> Result<StepView> {
        let step = self.collecting_step("back")?;
        if step > 1 {
            self.state = SessionState::Collecting { step: step - 1 };
            debug!(session = %self.id, from = step, to = step - 1, "moved back");
        }
        Ok(self.view())
    }

    /// Validate and merge the final step, then build the feature vector.
    ///
    /// On success the session enters `Submitting` and rejects further actions
    /// until [`FormSession::complete_submission`] or [`FormSession::fail_submission`].
    /// A contract violation leaves the session on the final step.
    pub fn begin_submission<S: FormSource + ?Sized>(
        &mut self,
        source: &S,
        pipeline: &FeaturePipeline,
    ) -> Result<FeatureVector> {
        if self.state == SessionState::Submitting {
            return Err(IntakeError::InvalidTransition {
                message: "a submission is already pending".to_string(),
            });
        }
        let step = self.collecting_step("submit")?;
        let total = self.total_steps();
        if step != total {
            return Err(IntakeError::InvalidTransition {
                message: format!("cannot submit from step {} of {}", step, total),
            });
        }

        self.collect(step, source)?;
        let features = pipeline.build(&self.record)?;
        self.state = SessionState::Submitting;
        info!(session = %self.id, version = %features.version(), "submission started");
        Ok(features)
    }

    pub fn complete_submission(&mut self) -> Result<()> {
        self.expect_submitting()?;
        self.state = SessionState::Submitted;
        info!(session = %self.id, "submission completed");
        Ok(())
    }

    /// Return to the final step after a failed request. The record is kept so
    /// the user can retry without re-entering earlier steps.
    pub fn fail_submission(&mut self) -> Result<()> {
        self.expect_submitting()?;
        self.state = SessionState::Collecting {
            step: self.total_steps(),
        };
        info!(session = %self.id, "submission failed, awaiting retry");
        Ok(())
    }

    fn collect<S: FormSource + ?Sized>(&mut self, step: usize, source: &S) -> Result<()> {
        let definition = self.step_definition(step)?;
        let data = FieldExtractor::extract(definition, source);
        StepValidator::validate(definition, &data)?;
        self.record.merge(data);
        debug!(session = %self.id, step, record = ?self.record, "step merged");
        Ok(())
    }

    fn step_definition(&self, step: usize) -> Result<&StepDefinition> {
        self.questionnaire
            .step(step)
            .ok_or_else(|| IntakeError::Internal {
                message: format!("step {} is not defined", step),
            })
    }

    fn collecting_step(&self, action: &str) -> Result<usize> {
        match self.state {
            SessionState::Collecting { step } => Ok(step),
            SessionState::Submitting => Err(IntakeError::InvalidTransition {
                message: format!("cannot {} while a submission is pending", action),
            }),
            SessionState::Submitted => Err(IntakeError::InvalidTransition {
                message: format!("cannot {} after the form was submitted", action),
            }),
        }
    }

    fn expect_submitting(&self) -> Result<()> {
        if self.state == SessionState::Submitting {
            Ok(())
        } else {
            Err(IntakeError::InvalidTransition {
                message: "no submission is pending".to_string(),
            })
        }
    }
}
