//! Headless model of an enhanced form's DOM subtree.

use regex::Regex;
use shared::{
    domain::{FormDescriptor, Payload},
    error::DescriptorError,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlKind {
    Text,
    Email,
    Tel,
    Number,
    Date,
    TextArea,
    Select,
    Checkbox,
    Hidden,
}

impl ControlKind {
    pub fn parse(raw: &str) -> Result<Self, DescriptorError> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "" | "text" => Ok(Self::Text),
            "email" => Ok(Self::Email),
            "tel" => Ok(Self::Tel),
            "number" => Ok(Self::Number),
            "date" => Ok(Self::Date),
            "textarea" => Ok(Self::TextArea),
            "select" => Ok(Self::Select),
            "checkbox" => Ok(Self::Checkbox),
            "hidden" => Ok(Self::Hidden),
            other => Err(DescriptorError::UnknownFieldKind(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Constraints {
    pub required: bool,
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub pattern: Option<Regex>,
}

#[derive(Debug, Clone)]
pub struct Control {
    pub name: String,
    pub kind: ControlKind,
    pub value: String,
    pub default_value: String,
    pub checked: bool,
    pub default_checked: bool,
    pub disabled: bool,
    pub constraints: Constraints,
    pub options: Vec<String>,
    pub custom_validity: Option<String>,
    pub focused: bool,
}

impl Control {
    pub fn new(name: impl Into<String>, kind: ControlKind) -> Self {
        let default_value = match kind {
            ControlKind::Checkbox => "on".to_string(),
            _ => String::new(),
        };
        Self {
            name: name.into(),
            kind,
            value: default_value.clone(),
            default_value,
            checked: false,
            default_checked: false,
            disabled: false,
            constraints: Constraints::default(),
            options: Vec::new(),
            custom_validity: None,
            focused: false,
        }
    }

    pub fn required(mut self) -> Self {
        self.constraints.required = true;
        self
    }

    pub fn with_default(mut self, value: impl Into<String>) -> Self {
        self.default_value = value.into();
        self.value = self.default_value.clone();
        self
    }

    pub fn with_checked(mut self, checked: bool) -> Self {
        self.default_checked = checked;
        self.checked = checked;
        self
    }

    pub fn with_options<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options = options.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_length(mut self, min: Option<usize>, max: Option<usize>) -> Self {
        self.constraints.min_length = min;
        self.constraints.max_length = max;
        self
    }

    pub fn with_range(mut self, min: Option<f64>, max: Option<f64>) -> Self {
        self.constraints.min = min;
        self.constraints.max = max;
        self
    }

    /// Compiles an HTML `pattern` attribute, which must match the whole value.
    pub fn with_pattern(mut self, pattern: &str) -> Result<Self, DescriptorError> {
        let regex = Regex::new(&format!("^(?:{pattern})$")).map_err(|e| {
            DescriptorError::InvalidPattern {
                field: self.name.clone(),
                reason: e.to_string(),
            }
        })?;
        self.constraints.pattern = Some(regex);
        Ok(self)
    }

    pub fn set_value(&mut self, value: impl Into<String>) {
        self.value = value.into();
    }

    pub fn reset(&mut self) {
        self.value = self.default_value.clone();
        self.checked = self.default_checked;
    }
}

/// A control with its label grouping and error slot.
#[derive(Debug, Clone)]
pub struct FieldWrapper {
    pub control: Control,
    /// Only declared field wrappers take part in validation.
    pub declared: bool,
    pub has_error: bool,
    /// `None` when the wrapper has no error slot.
    pub error_slot: Option<String>,
}

impl FieldWrapper {
    pub fn new(control: Control) -> Self {
        Self {
            control,
            declared: true,
            has_error: false,
            error_slot: Some(String::new()),
        }
    }

    /// A control placed directly in the form, outside any field wrapper.
    pub fn bare(control: Control) -> Self {
        Self {
            control,
            declared: false,
            has_error: false,
            error_slot: None,
        }
    }

    pub fn without_error_slot(mut self) -> Self {
        self.error_slot = None;
        self
    }

    pub fn error_text(&self) -> &str {
        self.error_slot.as_deref().unwrap_or_default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusModifier {
    Loading,
    Success,
    Error,
}

impl StatusModifier {
    pub fn class(self) -> &'static str {
        match self {
            Self::Loading => "is-loading",
            Self::Success => "is-success",
            Self::Error => "is-error",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusRegion {
    pub text: String,
    pub modifier: Option<StatusModifier>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultRegion {
    pub hidden: bool,
    pub html: String,
}

impl Default for ResultRegion {
    fn default() -> Self {
        Self {
            hidden: true,
            html: String::new(),
        }
    }
}

/// The "open email draft" link revealed after a contact submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailtoAction {
    pub hidden: bool,
    pub href: Option<String>,
}

impl Default for MailtoAction {
    fn default() -> Self {
        Self {
            hidden: true,
            href: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubmitControl {
    pub disabled: bool,
    pub busy: bool,
}

impl SubmitControl {
    pub fn engage(&mut self) {
        self.disabled = true;
        self.busy = true;
    }

    pub fn release(&mut self) {
        self.disabled = false;
        self.busy = false;
    }
}

#[derive(Debug, Clone)]
pub struct Form {
    pub descriptor: FormDescriptor,
    pub fields: Vec<FieldWrapper>,
    pub status: Option<StatusRegion>,
    pub result: Option<ResultRegion>,
    pub mailto: Option<MailtoAction>,
    pub submit: SubmitControl,
    /// Set once the controller takes over native validation.
    pub novalidate: bool,
}

impl Form {
    pub fn new(descriptor: FormDescriptor) -> Self {
        Self {
            descriptor,
            fields: Vec::new(),
            status: None,
            result: None,
            mailto: None,
            submit: SubmitControl::default(),
            novalidate: false,
        }
    }

    pub fn with_field(mut self, field: FieldWrapper) -> Self {
        self.fields.push(field);
        self
    }

    pub fn with_status_region(mut self) -> Self {
        self.status = Some(StatusRegion::default());
        self
    }

    pub fn with_result_region(mut self) -> Self {
        self.result = Some(ResultRegion::default());
        self
    }

    pub fn with_mailto_action(mut self) -> Self {
        self.mailto = Some(MailtoAction::default());
        self
    }

    pub fn field(&self, name: &str) -> Option<&FieldWrapper> {
        self.fields.iter().find(|f| f.control.name == name)
    }

    pub fn field_mut(&mut self, name: &str) -> Option<&mut FieldWrapper> {
        self.fields.iter_mut().find(|f| f.control.name == name)
    }

    /// Moves focus to the control of the wrapper at `index`.
    pub fn focus(&mut self, index: usize) {
        for (i, field) in self.fields.iter_mut().enumerate() {
            field.control.focused = i == index;
        }
    }

    pub fn focused(&self) -> Option<&str> {
        self.fields
            .iter()
            .find(|f| f.control.focused)
            .map(|f| f.control.name.as_str())
    }

    /// Collects the successful controls in document order.
    pub fn payload(&self) -> Payload {
        let mut payload = Payload::new();
        for field in &self.fields {
            let control = &field.control;
            if control.disabled || control.name.is_empty() {
                continue;
            }
            if control.kind == ControlKind::Checkbox && !control.checked {
                continue;
            }
            payload.set(control.name.clone(), control.value.clone());
        }
        payload
    }

    pub fn reset(&mut self) {
        for field in &mut self.fields {
            field.control.reset();
        }
    }
}

#[cfg(test)]
#[path = "tests/form_tests.rs"]
mod tests;
