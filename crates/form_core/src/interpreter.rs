//! Turns transport results into purpose-specific outcomes.
//!
//! Everything here is a pure function of its inputs. When a backend reply has
//! an unexpected shape the summaries are synthesized locally from the payload
//! instead.

use chrono::NaiveDate;
use serde_json::Value;
use shared::{
    domain::{FormDescriptor, FormPurpose, Interest, Payload},
    protocol::{ContactOutcome, EnquiryOutcome, Outcome, TransportResponse},
};

pub const DEFAULT_RECIPIENT: &str = "support@geminiparts.co.za";
pub const DEFAULT_SENDER_NAME: &str = "Gemini Parts customer";
pub const DEFAULT_TOPIC: &str = "general enquiry";
pub const DEFAULT_CONTACT_CHANNEL: &str = "your chosen channel";
pub const TAILORED_PROPOSAL: &str = "We will prepare a tailored proposal.";
pub const GENERIC_NEXT_STEPS: &str =
    "We will confirm the soonest delivery or fitment slot and send you a detailed quote.";
pub const CONTACT_PREVIEW: &str =
    "Click “Open email draft” to finalise your message in your email client.";

const CRLF: &str = "\r\n";

#[derive(Debug, Clone)]
pub struct ResponseInterpreter {
    default_recipient: String,
}

impl Default for ResponseInterpreter {
    fn default() -> Self {
        Self::new(DEFAULT_RECIPIENT)
    }
}

impl ResponseInterpreter {
    pub fn new(default_recipient: impl Into<String>) -> Self {
        Self {
            default_recipient: default_recipient.into(),
        }
    }

    pub fn interpret(
        &self,
        descriptor: &FormDescriptor,
        response: &TransportResponse,
        payload: &Payload,
    ) -> Outcome {
        match descriptor.purpose {
            FormPurpose::Enquiry => Outcome::Enquiry(match response {
                TransportResponse::Synthesized(Outcome::Enquiry(summary)) => summary.clone(),
                TransportResponse::Json(Value::Object(map)) => EnquiryOutcome {
                    title: json_text(map.get("title")),
                    availability: json_text(map.get("availability")),
                    estimated_cost: json_text(map.get("estimatedCost")),
                    next_steps: json_text(map.get("nextSteps")),
                },
                _ => self.enquiry_summary(payload),
            }),
            FormPurpose::Contact => Outcome::Contact(match response {
                TransportResponse::Synthesized(Outcome::Contact(detail)) => detail.clone(),
                TransportResponse::Json(Value::Object(map)) => ContactOutcome {
                    mailto: json_text(map.get("mailto")),
                    preview: json_text(map.get("preview")),
                },
                _ => self.contact_summary(descriptor, payload),
            }),
            FormPurpose::Other => Outcome::Acknowledged,
        }
    }

    /// Outcome produced without any backend.
    pub fn synthesize(&self, descriptor: &FormDescriptor, payload: &Payload) -> Outcome {
        match descriptor.purpose {
            FormPurpose::Enquiry => Outcome::Enquiry(self.enquiry_summary(payload)),
            FormPurpose::Contact => Outcome::Contact(self.contact_summary(descriptor, payload)),
            FormPurpose::Other => Outcome::Acknowledged,
        }
    }

    pub fn enquiry_summary(&self, payload: &Payload) -> EnquiryOutcome {
        let record = Interest::parse(payload.get("interest").unwrap_or_default()).record();
        let quantity = parse_quantity(payload.get("quantity"));

        let estimated_cost = if record.base_price > 0 {
            format_currency(quantity.max(1.0) * f64::from(record.base_price))
        } else {
            TAILORED_PROPOSAL.to_string()
        };

        let next_steps = match payload.non_empty("preferredDate") {
            Some(date) => format!(
                "We will confirm fitment or delivery options for {} and share a detailed quote via {}.",
                format_date(date),
                payload
                    .non_empty("contactMethod")
                    .unwrap_or(DEFAULT_CONTACT_CHANNEL)
            ),
            None => GENERIC_NEXT_STEPS.to_string(),
        };

        EnquiryOutcome {
            title: Some(format!("Estimated summary for {}", record.title)),
            availability: Some(record.availability.to_string()),
            estimated_cost: Some(estimated_cost),
            next_steps: Some(next_steps),
        }
    }

    pub fn contact_summary(&self, descriptor: &FormDescriptor, payload: &Payload) -> ContactOutcome {
        let recipient = descriptor
            .recipient
            .as_deref()
            .unwrap_or(&self.default_recipient);
        let name = payload.non_empty("name").unwrap_or(DEFAULT_SENDER_NAME);
        let topic = payload.non_empty("messageType").unwrap_or(DEFAULT_TOPIC);
        let message = payload.get("message").unwrap_or_default();
        let email = payload.get("email").unwrap_or_default();

        let subject = format!("[{}] Message from {name}", topic.to_uppercase());

        let mut body = format!("Hello Gemini Parts,{CRLF}{CRLF}{message}{CRLF}{CRLF}");
        if let Some(phone) = payload.non_empty("phone") {
            body.push_str(&format!("Phone: {phone}{CRLF}"));
        }
        if let Some(reference) = payload.non_empty("reference") {
            body.push_str(&format!("Reference: {reference}{CRLF}"));
        }
        body.push_str(&format!("Sent from: {name} ({email})"));

        ContactOutcome {
            mailto: Some(format!(
                "mailto:{recipient}?subject={}&body={}",
                urlencoding::encode(&subject),
                urlencoding::encode(&body)
            )),
            preview: Some(CONTACT_PREVIEW.to_string()),
        }
    }
}

/// Missing, blank or unparseable quantities count as one unit.
fn parse_quantity(raw: Option<&str>) -> f64 {
    raw.map(str::trim)
        .filter(|v| !v.is_empty())
        .and_then(|v| v.parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .unwrap_or(1.0)
}

fn format_date(raw: &str) -> String {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map(|date| date.format("%Y/%m/%d").to_string())
        .unwrap_or_else(|_| raw.to_string())
}

/// Formats rands the way `en-ZA` renders `ZAR`: `R 4 350,00` with no-break
/// spaces.
pub fn format_currency(amount: f64) -> String {
    const NBSP: char = '\u{a0}';

    let fixed = format!("{:.2}", amount.abs());
    let (whole, fraction) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(NBSP);
        }
        grouped.push(digit);
    }

    let is_zero = whole.bytes().chain(fraction.bytes()).all(|b| b == b'0');
    let sign = if amount < 0.0 && !is_zero { "-" } else { "" };
    format!("{sign}R{NBSP}{grouped},{fraction}")
}

/// Reads a backend field the way the page treats truthy values.
fn json_text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) if n.as_f64().is_some_and(|v| v != 0.0) => Some(n.to_string()),
        Value::Bool(true) => Some("true".to_string()),
        _ => None,
    }
}

#[cfg(test)]
#[path = "tests/interpreter_tests.rs"]
mod tests;
