//! Reads a step's controls into a typed [`RawAnswer`].

use tracing::debug;

use super::answer::{AnswerValue, RawAnswer};
use super::source::{ControlValue, FormSource};
use super::steps::StepDefinition;

/// Coerce a free-text value: finite numbers become `Number`, anything else is kept
/// as trimmed text (the empty string included).
pub fn coerce_input(raw: &str) -> AnswerValue {
    let trimmed = raw.trim();
    match trimmed.parse::<f64>() {
        Ok(n) if !trimmed.is_empty() && n.is_finite() => AnswerValue::Number(n),
        _ => AnswerValue::Text(trimmed.to_string()),
    }
}

pub struct FieldExtractor;

impl FieldExtractor {
    /// Extract every control of `step` that the source renders.
    ///
    /// Radio groups without a selection are omitted; checkboxes are always present.
    pub fn extract<S: FormSource + ?Sized>(step: &StepDefinition, source: &S) -> RawAnswer {
        let mut data = RawAnswer::new();

        for field in &step.fields {
            if !source.is_field_present(step.index, &field.name) {
                debug!(step = step.index, field = %field.name, "control not rendered, skipping");
                continue;
            }
            let Some(value) = source.field_value(step.index, &field.name) else {
                continue;
            };

            match value {
                ControlValue::Choice(Some(selected)) => {
                    data.insert(field.name.clone(), AnswerValue::Text(selected));
                }
                ControlValue::Choice(None) => {}
                ControlValue::Checked(checked) => {
                    data.insert(field.name.clone(), AnswerValue::Flag(checked));
                }
                ControlValue::Input(raw) => {
                    data.insert(field.name.clone(), coerce_input(&raw));
                }
            }
        }

        debug!(step = step.index, fields = data.len(), "extracted step data");
        data
    }
}
