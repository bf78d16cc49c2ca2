//! Field validation and inline error state.

use chrono::NaiveDate;

use crate::form::{Control, ControlKind, FieldWrapper, Form};

pub const FALLBACK_MESSAGE: &str = "Please provide a valid value.";

/// Native constraint check for a single control.
///
/// Returns `None` when the control is valid, otherwise its validation message,
/// which may be empty.
pub fn validation_message(control: &Control) -> Option<String> {
    if control.disabled || control.kind == ControlKind::Hidden {
        return None;
    }
    if let Some(custom) = control.custom_validity.as_deref().filter(|m| !m.is_empty()) {
        return Some(custom.trim().to_string());
    }

    let constraints = &control.constraints;
    let value = control.value.as_str();

    if control.kind == ControlKind::Checkbox {
        return (constraints.required && !control.checked)
            .then(|| "Please tick this box if you want to proceed.".to_string());
    }
    if value.is_empty() {
        return constraints
            .required
            .then(|| "Please fill out this field.".to_string());
    }

    match control.kind {
        ControlKind::Email if !looks_like_email(value) => {
            return Some("Please enter an email address.".to_string());
        }
        ControlKind::Number => {
            let Ok(number) = value.trim().parse::<f64>() else {
                return Some("Please enter a number.".to_string());
            };
            if let Some(min) = constraints.min.filter(|min| number < *min) {
                return Some(format!("Value must be greater than or equal to {min}."));
            }
            if let Some(max) = constraints.max.filter(|max| number > *max) {
                return Some(format!("Value must be less than or equal to {max}."));
            }
        }
        ControlKind::Date if NaiveDate::parse_from_str(value, "%Y-%m-%d").is_err() => {
            return Some("Please enter a valid date.".to_string());
        }
        ControlKind::Select if !control.options.iter().any(|o| o == value) => {
            return Some("Please select an item in the list.".to_string());
        }
        _ => {}
    }

    let length = value.chars().count();
    if let Some(min) = constraints.min_length.filter(|min| length < *min) {
        return Some(format!(
            "Please lengthen this text to {min} characters or more (you are currently using {length} characters)."
        ));
    }
    if let Some(max) = constraints.max_length.filter(|max| length > *max) {
        return Some(format!(
            "Please shorten this text to {max} characters or less (you are currently using {length} characters)."
        ));
    }
    if let Some(pattern) = &constraints.pattern {
        if !pattern.is_match(value) {
            return Some("Please match the requested format.".to_string());
        }
    }

    None
}

fn looks_like_email(value: &str) -> bool {
    let mut parts = value.split('@');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(local), Some(domain), None) => {
            !local.is_empty() && !domain.is_empty() && !value.contains(char::is_whitespace)
        }
        _ => false,
    }
}

pub fn clear_field_error(wrapper: &mut FieldWrapper) {
    wrapper.has_error = false;
    if let Some(slot) = wrapper.error_slot.as_mut() {
        slot.clear();
    }
}

/// Resynchronizes every declared wrapper and returns the indices of invalid
/// ones in document order.
pub fn validate_form(form: &mut Form) -> Vec<usize> {
    let mut invalid = Vec::new();
    for (index, wrapper) in form.fields.iter_mut().enumerate() {
        if !wrapper.declared {
            continue;
        }
        match validation_message(&wrapper.control) {
            Some(message) => {
                wrapper.has_error = true;
                if let Some(slot) = wrapper.error_slot.as_mut() {
                    *slot = if message.is_empty() {
                        FALLBACK_MESSAGE.to_string()
                    } else {
                        message
                    };
                }
                invalid.push(index);
            }
            None => clear_field_error(wrapper),
        }
    }
    invalid
}

#[cfg(test)]
#[path = "tests/validator_tests.rs"]
mod tests;
