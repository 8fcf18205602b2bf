//! Static step metadata: which controls each step renders and which are required.

use serde::{Deserialize, Serialize};

/// Kind of input control backing a field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ControlKind {
    /// Group of mutually exclusive options sharing the field name.
    Radio { options: Vec<String> },
    Checkbox,
    /// Single-choice select. The first option is the placeholder.
    Select { options: Vec<String> },
    Text,
    Number,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSpec {
    pub name: String,
    #[serde(flatten)]
    pub kind: ControlKind,
    #[serde(default)]
    pub required: bool,
}

impl FieldSpec {
    pub fn required(name: &str, kind: ControlKind) -> Self {
        Self {
            name: name.to_string(),
            kind,
            required: true,
        }
    }

    pub fn optional(name: &str, kind: ControlKind) -> Self {
        Self {
            name: name.to_string(),
            kind,
            required: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepDefinition {
    /// 1-based step index.
    pub index: usize,
    pub title: String,
    pub fields: Vec<FieldSpec>,
}

impl StepDefinition {
    pub fn required_fields(&self) -> impl Iterator<Item = &FieldSpec> {
        self.fields.iter().filter(|f| f.required)
    }
}

/// Ordered set of steps making up one questionnaire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Questionnaire {
    pub steps: Vec<StepDefinition>,
    pub completion_title: String,
}

impl Questionnaire {
    pub fn total_steps(&self) -> usize {
        self.steps.len()
    }

    pub fn step(&self, index: usize) -> Option<&StepDefinition> {
        index
            .checked_sub(1)
            .and_then(|i| self.steps.get(i))
            .filter(|s| s.index == index)
    }

    /// The four-step cardiovascular risk questionnaire.
    pub fn cardio() -> Self {
        let yes_no = || vec![String::new(), "1".to_string(), "0".to_string()];
        Self {
            steps: vec![
                StepDefinition {
                    index: 1,
                    title: "1. Seu Perfil e Histórico".to_string(),
                    fields: vec![
                        FieldSpec::required("Age", ControlKind::Number),
                        FieldSpec::required(
                            "Sex",
                            ControlKind::Radio {
                                options: vec!["Masculino".to_string(), "Feminino".to_string()],
                            },
                        ),
                        FieldSpec::optional("Family History", ControlKind::Checkbox),
                        FieldSpec::optional("Previous Heart Problems", ControlKind::Checkbox),
                        FieldSpec::optional("Diabetes", ControlKind::Checkbox),
                        FieldSpec::optional("Medication Use", ControlKind::Checkbox),
                    ],
                },
                StepDefinition {
                    index: 2,
                    title: "2. Suas Medidas de Saúde".to_string(),
                    fields: vec![
                        FieldSpec::required("BMI", ControlKind::Number),
                        FieldSpec::required("Systolic", ControlKind::Number),
                        FieldSpec::required("Diastolic", ControlKind::Number),
                        FieldSpec::required("Heart Rate", ControlKind::Number),
                    ],
                },
                StepDefinition {
                    index: 3,
                    title: "3. Seu Estilo de Vida".to_string(),
                    fields: vec![
                        FieldSpec::optional("Smoking", ControlKind::Checkbox),
                        FieldSpec::required("Alcohol Consumption", ControlKind::Number),
                        FieldSpec::required("Stress Level", ControlKind::Number),
                        FieldSpec::required("Diet_Healthy", ControlKind::Select { options: yes_no() }),
                    ],
                },
                StepDefinition {
                    index: 4,
                    title: "4. Seus Hábitos Diários".to_string(),
                    fields: vec![
                        FieldSpec::required("Physical Activity Days Per Week", ControlKind::Number),
                        FieldSpec::required("Sleep Hours Per Day", ControlKind::Number),
                    ],
                },
            ],
            completion_title: "Avaliação Concluída!".to_string(),
        }
    }
}

impl Default for Questionnaire {
    fn default() -> Self {
        Self::cardio()
    }
}
