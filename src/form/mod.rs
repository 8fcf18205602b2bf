//! Step-wise answer collection: extraction, validation, and step metadata.

pub mod answer;
pub mod extractor;
pub mod source;
pub mod steps;
pub mod validator;

pub use answer::{AnswerValue, CumulativeRecord, RawAnswer};
pub use extractor::FieldExtractor;
pub use source::{ControlValue, FormSource, StaticFormSource};
pub use steps::{ControlKind, FieldSpec, Questionnaire, StepDefinition};
pub use validator::StepValidator;
