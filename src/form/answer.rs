//! Typed answer values and the per-step / cumulative answer records.

use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

/// A single coerced answer.
#[derive(Debug, Clone, PartialEq)]
pub enum AnswerValue {
    Number(f64),
    Text(String),
    /// Checkbox state, serialized as 0/1.
    Flag(bool),
}

impl AnswerValue {
    /// Numeric view of the answer. Text is parsed after trimming; flags map to 0/1.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            AnswerValue::Number(n) => Some(*n),
            AnswerValue::Flag(b) => Some(if *b { 1.0 } else { 0.0 }),
            AnswerValue::Text(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
        }
    }

    /// True for text that is empty after trimming. Numbers (including zero) are never blank.
    pub fn is_blank(&self) -> bool {
        matches!(self, AnswerValue::Text(s) if s.trim().is_empty())
    }
}

impl fmt::Display for AnswerValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnswerValue::Number(n) => write!(f, "{}", n),
            AnswerValue::Text(s) => f.write_str(s),
            AnswerValue::Flag(b) => write!(f, "{}", u8::from(*b)),
        }
    }
}

impl Serialize for AnswerValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            AnswerValue::Number(n) => serializer.serialize_f64(*n),
            AnswerValue::Text(s) => serializer.serialize_str(s),
            AnswerValue::Flag(b) => serializer.serialize_u8(u8::from(*b)),
        }
    }
}

/// Field name to answer, for one step or merged across steps.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct RawAnswer {
    fields: BTreeMap<String, AnswerValue>,
}

/// The merged answers of every completed step.
pub type CumulativeRecord = RawAnswer;

impl RawAnswer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: AnswerValue) {
        self.fields.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<&AnswerValue> {
        self.fields.get(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<AnswerValue> {
        self.fields.remove(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &AnswerValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Merge `other` into this record. Keys already present are overwritten.
    pub fn merge(&mut self, other: RawAnswer) {
        self.fields.extend(other.fields);
    }
}

impl<K: Into<String>> FromIterator<(K, AnswerValue)> for RawAnswer {
    fn from_iter<I: IntoIterator<Item = (K, AnswerValue)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}
