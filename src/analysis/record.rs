//! Structured clinical note and the fixed fallback/error records

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Placeholder used for any text field the model did not provide.
pub const NOT_AVAILABLE: &str = "N/A";

/// Placeholder patient name.
pub const DEFAULT_PATIENT_NAME: &str = "Patient";

fn not_available() -> String {
    NOT_AVAILABLE.to_string()
}

fn default_patient_name() -> String {
    DEFAULT_PATIENT_NAME.to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientInfo {
    #[serde(default = "default_patient_name")]
    pub name: String,
    #[serde(default = "not_available")]
    pub age: String,
    #[serde(default = "not_available")]
    pub gender: String,
}

impl Default for PatientInfo {
    fn default() -> Self {
        Self {
            name: default_patient_name(),
            age: not_available(),
            gender: not_available(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Medication {
    #[serde(default = "not_available")]
    pub name: String,
    #[serde(default = "not_available")]
    pub dosage: String,
    #[serde(default = "not_available")]
    pub frequency: String,
    #[serde(default = "not_available")]
    pub duration: String,
}

impl Medication {
    pub fn new(
        name: impl Into<String>,
        dosage: impl Into<String>,
        frequency: impl Into<String>,
        duration: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            dosage: dosage.into(),
            frequency: frequency.into(),
            duration: duration.into(),
        }
    }
}

/// Normalized clinical note. Every field is always populated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructuredRecord {
    #[serde(default)]
    pub patient_info: PatientInfo,
    #[serde(default)]
    pub symptoms: Vec<String>,
    #[serde(default = "not_available")]
    pub diagnosis: String,
    #[serde(default)]
    pub medications: Vec<Medication>,
    #[serde(default = "not_available")]
    pub instructions: String,
}

impl Default for StructuredRecord {
    fn default() -> Self {
        Self {
            patient_info: PatientInfo::default(),
            symptoms: Vec::new(),
            diagnosis: not_available(),
            medications: Vec::new(),
            instructions: not_available(),
        }
    }
}

impl StructuredRecord {
    /// Record returned when the model reply cannot be parsed as JSON.
    pub fn parse_fallback() -> Self {
        Self {
            patient_info: PatientInfo::default(),
            symptoms: vec!["Please try again - parsing error".to_string()],
            diagnosis: "Unable to analyze - please retry".to_string(),
            medications: vec![Medication::new(
                "Please regenerate",
                NOT_AVAILABLE,
                NOT_AVAILABLE,
                NOT_AVAILABLE,
            )],
            instructions: "The AI response was malformed. Please try again.".to_string(),
        }
    }

    /// Build a complete record from whatever JSON the model produced.
    ///
    /// Missing, null or mistyped fields fall back to placeholders; numbers and
    /// booleans are rendered as text so `"age": 28` survives as `"28"`.
    pub fn from_value(value: &Value) -> Self {
        let patient = value.get("patientInfo");

        Self {
            patient_info: PatientInfo {
                name: text_field(patient, "name").unwrap_or_else(default_patient_name),
                age: text_field(patient, "age").unwrap_or_else(not_available),
                gender: text_field(patient, "gender").unwrap_or_else(not_available),
            },
            symptoms: match value.get("symptoms") {
                Some(Value::Array(items)) => items.iter().filter_map(scalar_text).collect(),
                Some(other) => scalar_text(other).into_iter().collect(),
                None => Vec::new(),
            },
            diagnosis: text_field(Some(value), "diagnosis").unwrap_or_else(not_available),
            medications: match value.get("medications") {
                Some(Value::Array(items)) => items
                    .iter()
                    .filter(|item| item.is_object())
                    .map(|item| Medication {
                        name: text_field(Some(item), "name").unwrap_or_else(not_available),
                        dosage: text_field(Some(item), "dosage").unwrap_or_else(not_available),
                        frequency: text_field(Some(item), "frequency")
                            .unwrap_or_else(not_available),
                        duration: text_field(Some(item), "duration")
                            .unwrap_or_else(not_available),
                    })
                    .collect(),
                _ => Vec::new(),
            },
            instructions: text_field(Some(value), "instructions").unwrap_or_else(not_available),
        }
    }

    /// Whether the model listed more than one medication.
    pub fn needs_interaction_check(&self) -> bool {
        self.medications.len() > 1
    }
}

fn text_field(parent: Option<&Value>, key: &str) -> Option<String> {
    parent.and_then(|p| p.get(key)).and_then(scalar_text)
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Body returned with a server-error status when the model call itself failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpstreamErrorRecord {
    pub error: String,
    pub details: String,
    #[serde(flatten)]
    pub record: StructuredRecord,
}

impl UpstreamErrorRecord {
    pub fn new(details: impl Into<String>) -> Self {
        let details = details.into();
        Self {
            error: "Failed to analyze consultation".to_string(),
            details: if details.trim().is_empty() {
                "Unknown error".to_string()
            } else {
                details
            },
            record: StructuredRecord {
                patient_info: PatientInfo {
                    name: "Error".to_string(),
                    age: not_available(),
                    gender: not_available(),
                },
                symptoms: vec!["API Error occurred".to_string()],
                diagnosis: "System error - please try again".to_string(),
                medications: Vec::new(),
                instructions: "Please try again".to_string(),
            },
        }
    }
}
