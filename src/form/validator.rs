//! Required-field checks for a single step.

use tracing::debug;

use super::answer::{AnswerValue, RawAnswer};
use super::steps::{ControlKind, FieldSpec, StepDefinition};
use crate::error::{IntakeError, Result};

pub struct StepValidator;

impl StepValidator {
    /// Check every required field of `step` against the extracted `data`.
    ///
    /// Returns `IntakeError::Validation` naming each failing field.
    pub fn validate(step: &StepDefinition, data: &RawAnswer) -> Result<()> {
        let missing: Vec<String> = step
            .required_fields()
            .filter(|field| !Self::is_satisfied(field, data.get(&field.name)))
            .map(|field| field.name.clone())
            .collect();

        if missing.is_empty() {
            return Ok(());
        }

        debug!(step = step.index, missing = ?missing, "step validation failed");
        Err(IntakeError::Validation {
            step: step.index,
            fields: missing,
        })
    }

    pub fn is_valid(step: &StepDefinition, data: &RawAnswer) -> bool {
        Self::validate(step, data).is_ok()
    }

    fn is_satisfied(field: &FieldSpec, value: Option<&AnswerValue>) -> bool {
        match (&field.kind, value) {
            // The extractor only records a radio group when one member is selected.
            (ControlKind::Radio { .. }, Some(v)) => !v.is_blank(),
            (ControlKind::Radio { .. }, None) => false,
            // Checkboxes always carry a 0/1 value.
            (ControlKind::Checkbox, _) => true,
            (ControlKind::Select { options }, Some(v)) => is_selected_option(v, options),
            (ControlKind::Text | ControlKind::Number, Some(v)) => !v.is_blank(),
            (_, None) => false,
        }
    }
}

/// The first option is the placeholder; the value must match one of the rest.
fn is_selected_option(value: &AnswerValue, options: &[String]) -> bool {
    if value.is_blank() {
        return false;
    }
    match options.split_first() {
        Some((placeholder, choices)) if !choices.is_empty() => {
            !matches_option(value, placeholder) && choices.iter().any(|o| matches_option(value, o))
        }
        Some((placeholder, _)) => !matches_option(value, placeholder),
        None => true,
    }
}

fn matches_option(value: &AnswerValue, option: &str) -> bool {
    let option = option.trim();
    match value {
        AnswerValue::Text(s) => s.trim() == option,
        AnswerValue::Number(n) => option.parse::<f64>().is_ok_and(|o| o == *n),
        AnswerValue::Flag(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::steps::Questionnaire;

    fn record(pairs: &[(&str, AnswerValue)]) -> RawAnswer {
        pairs.iter().cloned().collect()
    }

    #[test]
    fn test_zero_is_a_valid_answer() {
        let q = Questionnaire::cardio();
        let data = record(&[
            ("Physical Activity Days Per Week", AnswerValue::Number(0.0)),
            ("Sleep Hours Per Day", AnswerValue::Text("0".into())),
        ]);
        assert!(StepValidator::is_valid(q.step(4).unwrap(), &data));
    }

    #[test]
    fn test_blank_text_fails_and_names_field() {
        let q = Questionnaire::cardio();
        let data = record(&[
            ("Physical Activity Days Per Week", AnswerValue::Number(3.0)),
            ("Sleep Hours Per Day", AnswerValue::Text(String::new())),
        ]);
        match StepValidator::validate(q.step(4).unwrap(), &data) {
            Err(IntakeError::Validation { step, fields }) => {
                assert_eq!(step, 4);
                assert_eq!(fields, vec!["Sleep Hours Per Day".to_string()]);
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_radio_requires_selection() {
        let q = Questionnaire::cardio();
        let step = q.step(1).unwrap();
        let without = record(&[("Age", AnswerValue::Number(45.0))]);
        assert!(!StepValidator::is_valid(step, &without));

        let with = record(&[
            ("Age", AnswerValue::Number(45.0)),
            ("Sex", AnswerValue::Text("Feminino".into())),
        ]);
        assert!(StepValidator::is_valid(step, &with));
    }

    #[test]
    fn test_select_rejects_placeholder() {
        let step = StepDefinition {
            index: 1,
            title: "t".into(),
            fields: vec![FieldSpec::required(
                "Diet",
                ControlKind::Select {
                    options: vec!["Selecione".into(), "Boa".into(), "Ruim".into()],
                },
            )],
        };
        let placeholder = record(&[("Diet", AnswerValue::Text("Selecione".into()))]);
        let empty = record(&[("Diet", AnswerValue::Text(String::new()))]);
        let chosen = record(&[("Diet", AnswerValue::Text("Boa".into()))]);

        assert!(!StepValidator::is_valid(&step, &placeholder));
        assert!(!StepValidator::is_valid(&step, &empty));
        assert!(StepValidator::is_valid(&step, &chosen));
    }

    #[test]
    fn test_numeric_select_option_zero_is_not_placeholder() {
        let q = Questionnaire::cardio();
        let data = record(&[
            ("Alcohol Consumption", AnswerValue::Number(2.0)),
            ("Stress Level", AnswerValue::Number(5.0)),
            ("Diet_Healthy", AnswerValue::Number(0.0)),
        ]);
        assert!(StepValidator::is_valid(q.step(3).unwrap(), &data));
    }

    #[test]
    fn test_select_rejects_value_outside_options() {
        let q = Questionnaire::cardio();
        let data = record(&[
            ("Alcohol Consumption", AnswerValue::Number(2.0)),
            ("Stress Level", AnswerValue::Number(5.0)),
            ("Diet_Healthy", AnswerValue::Number(5.0)),
        ]);
        match StepValidator::validate(q.step(3).unwrap(), &data) {
            Err(IntakeError::Validation { fields, .. }) => {
                assert_eq!(fields, vec!["Diet_Healthy".to_string()]);
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_optional_checkbox_never_blocks() {
        let q = Questionnaire::cardio();
        let data = record(&[
            ("Alcohol Consumption", AnswerValue::Number(2.0)),
            ("Stress Level", AnswerValue::Number(5.0)),
            ("Diet_Healthy", AnswerValue::Number(1.0)),
        ]);
        assert!(StepValidator::is_valid(q.step(3).unwrap(), &data));
    }
}
