//! Plain-text rendering of a form after dispatch.

use std::fmt::Write;

use form_core::Form;

pub fn render(form: &Form) -> String {
    let mut out = String::new();

    if let Some(status) = &form.status {
        let class = status.modifier.map(|m| m.class()).unwrap_or("-");
        let _ = writeln!(out, "status [{class}]: {}", status.text);
    }

    for field in form.fields.iter().filter(|f| f.has_error) {
        let _ = writeln!(out, "error {}: {}", field.control.name, field.error_text());
    }
    if let Some(focused) = form.focused() {
        let _ = writeln!(out, "focus: {focused}");
    }

    if let Some(result) = form.result.as_ref().filter(|r| !r.hidden) {
        let _ = writeln!(out, "result: {}", result.html);
    }
    if let Some(href) = form
        .mailto
        .as_ref()
        .filter(|m| !m.hidden)
        .and_then(|m| m.href.as_deref())
    {
        let _ = writeln!(out, "email draft: {href}");
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use form_core::{form::StatusModifier, Control, ControlKind, FieldWrapper};
    use shared::domain::FormDescriptor;

    #[test]
    fn lists_status_errors_and_focus() {
        let mut form = Form::new(FormDescriptor::default())
            .with_field(FieldWrapper::new(Control::new("email", ControlKind::Email)))
            .with_status_region()
            .with_result_region();
        form.fields[0].has_error = true;
        form.fields[0].error_slot = Some("Please fill out this field.".into());
        form.focus(0);
        if let Some(status) = form.status.as_mut() {
            status.modifier = Some(StatusModifier::Error);
            status.text = "Try again".into();
        }

        assert_eq!(
            render(&form),
            "status [is-error]: Try again\nerror email: Please fill out this field.\nfocus: email\n"
        );
    }
}
