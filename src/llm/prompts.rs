use crate::llm::client::{ChatMessage, CompletionRequest};

/// System instruction that pins the model to bare JSON output.
pub const SYSTEM_PROMPT: &str = "You are an expert medical AI assistant. You analyze doctor-patient \
consultations and extract structured medical information. You ONLY respond with valid JSON, \
no markdown, no backticks, no explanations.";

/// Schema example embedded in the user prompt.
pub const EXAMPLE_RECORD_JSON: &str = r#"{
  "patientInfo": {
    "name": "Patient name if mentioned, otherwise 'Patient'",
    "age": "Age if mentioned, otherwise 'N/A'",
    "gender": "Gender if mentioned, otherwise 'N/A'"
  },
  "symptoms": ["list", "of", "symptoms", "mentioned"],
  "diagnosis": "Primary diagnosis based on the symptoms described",
  "medications": [
    {
      "name": "Medication name",
      "dosage": "Dosage amount (e.g., 500mg)",
      "frequency": "How often (e.g., Three times daily)",
      "duration": "How long (e.g., 5 days)"
    }
  ],
  "instructions": "Patient care instructions, rest recommendations, and follow-up advice"
}"#;

/// Build the user message for a consultation transcript.
pub fn build_analysis_prompt(transcript: &str) -> String {
    format!(
        "Analyze this doctor-patient consultation transcript and extract structured medical information.\n\
\n\
TRANSCRIPT:\n\
{transcript}\n\
\n\
Respond with ONLY valid JSON in this EXACT format (no markdown, no backticks):\n\
{EXAMPLE_RECORD_JSON}\n\
\n\
Important:\n\
- Extract actual information from the transcript\n\
- For medications, use appropriate treatments for the symptoms\n\
- If diagnosis is mentioned, use it; otherwise infer from symptoms\n\
- Keep it medically accurate and professional\n\
- Respond ONLY with the JSON object, nothing else"
    )
}

/// The full two-message exchange sent for every analysis.
pub fn build_analysis_request(transcript: &str, temperature: f32, max_tokens: u32) -> CompletionRequest {
    CompletionRequest {
        messages: vec![
            ChatMessage::system(SYSTEM_PROMPT),
            ChatMessage::user(build_analysis_prompt(transcript)),
        ],
        temperature,
        max_tokens,
    }
}
