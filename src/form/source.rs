//! Capability interface over whatever renders the form.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use crate::error::{IntakeError, Result};

/// Current state of one control as read from the form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlValue {
    /// Radio group: the value of the selected member, if any.
    Choice(Option<String>),
    Checked(bool),
    /// Text, number, or select: the raw untrimmed value.
    Input(String),
}

/// Read access to the controls of each step.
pub trait FormSource {
    fn field_value(&self, step: usize, field: &str) -> Option<ControlValue>;

    fn is_field_present(&self, step: usize, field: &str) -> bool {
        self.field_value(step, field).is_some()
    }
}

/// In-memory form state, loadable from a JSON answers file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StaticFormSource {
    #[serde(default)]
    steps: BTreeMap<usize, HashMap<String, ControlValue>>,
}

impl StaticFormSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| IntakeError::Config {
            message: format!("Cannot read answers file {}: {}", path.display(), e),
        })?;
        Self::from_json(&content)
    }

    pub fn set(&mut self, step: usize, field: &str, value: ControlValue) -> &mut Self {
        self.steps
            .entry(step)
            .or_default()
            .insert(field.to_string(), value);
        self
    }

    pub fn input(&mut self, step: usize, field: &str, value: &str) -> &mut Self {
        self.set(step, field, ControlValue::Input(value.to_string()))
    }

    pub fn choose(&mut self, step: usize, field: &str, value: &str) -> &mut Self {
        self.set(step, field, ControlValue::Choice(Some(value.to_string())))
    }

    pub fn check(&mut self, step: usize, field: &str, checked: bool) -> &mut Self {
        self.set(step, field, ControlValue::Checked(checked))
    }
}

impl FormSource for StaticFormSource {
    fn field_value(&self, step: usize, field: &str) -> Option<ControlValue> {
        self.steps.get(&step).and_then(|s| s.get(field)).cloned()
    }

    fn is_field_present(&self, step: usize, field: &str) -> bool {
        self.steps.get(&step).is_some_and(|s| s.contains_key(field))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loads_answers_file_format() {
        let source = StaticFormSource::from_json(
            r#"{"steps": {"1": {
                "Age": {"input": "45"},
                "Sex": {"choice": "Masculino"},
                "Diabetes": {"checked": false}
            }}}"#,
        )
        .unwrap();

        assert_eq!(
            source.field_value(1, "Age"),
            Some(ControlValue::Input("45".into()))
        );
        assert_eq!(
            source.field_value(1, "Sex"),
            Some(ControlValue::Choice(Some("Masculino".into())))
        );
        assert!(source.is_field_present(1, "Diabetes"));
        assert!(!source.is_field_present(2, "Age"));
    }
}
