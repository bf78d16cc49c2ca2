//! Writes status text and outcomes into the form's output regions.

use shared::protocol::{ContactOutcome, EnquiryOutcome, Outcome};

use crate::form::{Form, StatusModifier, StatusRegion};

pub const LOADING_MESSAGE: &str = "Submitting your details…";
pub const SUCCESS_MESSAGE: &str = "Thank you! We have received your submission.";
pub const ERROR_MESSAGE: &str =
    "We could not submit your request right now. Please try again or call us.";

pub fn set_status(status: Option<&mut StatusRegion>, modifier: StatusModifier, message: &str) {
    let Some(status) = status else {
        return;
    };
    status.modifier = Some(modifier);
    status.text = message.to_string();
}

/// Hides the result region and email-draft link ahead of a new submission.
pub fn clear_outputs(form: &mut Form) {
    if let Some(mailto) = form.mailto.as_mut() {
        mailto.hidden = true;
    }
    if let Some(result) = form.result.as_mut() {
        result.hidden = true;
        result.html.clear();
    }
}

pub fn render_success(form: &mut Form, outcome: &Outcome) {
    set_status(form.status.as_mut(), StatusModifier::Success, SUCCESS_MESSAGE);
    match outcome {
        Outcome::Enquiry(summary) => {
            if let Some(result) = form.result.as_mut() {
                result.html = render_enquiry_summary(summary);
                result.hidden = false;
            }
        }
        Outcome::Contact(detail) => render_contact(form, detail),
        Outcome::Acknowledged => {}
    }
}

fn render_contact(form: &mut Form, detail: &ContactOutcome) {
    let Some(mailto) = form.mailto.as_mut() else {
        return;
    };
    if let Some(href) = &detail.mailto {
        mailto.href = Some(href.clone());
        mailto.hidden = false;
    }
    if let (Some(preview), Some(status)) = (&detail.preview, form.status.as_mut()) {
        status.text = preview.clone();
    }
}

pub fn render_enquiry_summary(summary: &EnquiryOutcome) -> String {
    let mut html = String::new();
    if let Some(title) = &summary.title {
        html.push_str(&format!("<h3>{}</h3>", escape_html(title)));
    }
    if let Some(availability) = &summary.availability {
        html.push_str(&format!(
            "<p><strong>Availability:</strong> {}</p>",
            escape_html(availability)
        ));
    }
    if let Some(cost) = &summary.estimated_cost {
        html.push_str(&format!(
            "<p><strong>Estimated cost:</strong> {}</p>",
            escape_html(cost)
        ));
    }
    if let Some(next_steps) = &summary.next_steps {
        html.push_str(&format!("<p>{}</p>", escape_html(next_steps)));
    }
    html
}

fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
