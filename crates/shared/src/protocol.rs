use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnquiryOutcome {
    pub title: Option<String>,
    pub availability: Option<String>,
    pub estimated_cost: Option<String>,
    pub next_steps: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ContactOutcome {
    pub mailto: Option<String>,
    pub preview: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum Outcome {
    Enquiry(EnquiryOutcome),
    Contact(ContactOutcome),
    Acknowledged,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TransportResponse {
    Json(serde_json::Value),
    Text(String),
    Synthesized(Outcome),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionState {
    #[default]
    Idle,
    Validating,
    Submitting,
    Success,
    Error,
}
