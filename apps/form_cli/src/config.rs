use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{anyhow, Context};
use form_core::{
    interpreter::DEFAULT_RECIPIENT, transport::MOCK_LATENCY, Control, ControlKind, FieldWrapper,
    Form,
};
use serde::Deserialize;
use shared::domain::{
    FormDescriptor, ACTION_ATTR, FORM_TYPE_ATTR, METHOD_ATTR, MOCK_ATTR, RECIPIENT_ATTR,
};
use url::Url;

pub const DEFAULT_CONFIG_PATH: &str = "forms.toml";
const DEFAULT_PAGE_URL: &str = "https://www.geminiparts.co.za/";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub page_url: String,
    pub default_recipient: String,
    pub mock_latency_ms: u64,
    /// Behave as if no network were available.
    pub force_mock: bool,
    pub forms: Vec<FormDeclaration>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            page_url: DEFAULT_PAGE_URL.into(),
            default_recipient: DEFAULT_RECIPIENT.into(),
            mock_latency_ms: MOCK_LATENCY.as_millis() as u64,
            force_mock: false,
            forms: default_forms(),
        }
    }
}

impl Settings {
    pub fn page_url(&self) -> anyhow::Result<Url> {
        Url::parse(&self.page_url).with_context(|| format!("invalid page_url '{}'", self.page_url))
    }

    pub fn mock_latency(&self) -> Duration {
        Duration::from_millis(self.mock_latency_ms)
    }

    pub fn form(&self, id: &str) -> anyhow::Result<&FormDeclaration> {
        self.forms
            .iter()
            .find(|f| f.id == id)
            .ok_or_else(|| anyhow!("no form declared with id '{id}'"))
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FormDeclaration {
    pub id: String,
    pub form_type: Option<String>,
    pub mock: bool,
    pub recipient: Option<String>,
    pub method: Option<String>,
    pub action: Option<String>,
    pub status_region: bool,
    pub result_region: bool,
    pub mailto_action: bool,
    pub fields: Vec<FieldDeclaration>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FieldDeclaration {
    pub name: String,
    pub kind: String,
    pub required: bool,
    pub default: Option<String>,
    pub checked: bool,
    pub options: Vec<String>,
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub pattern: Option<String>,
    /// `false` for controls that sit outside a field wrapper.
    pub wrapped: bool,
}

impl Default for FieldDeclaration {
    fn default() -> Self {
        Self {
            name: String::new(),
            kind: "text".into(),
            required: false,
            default: None,
            checked: false,
            options: Vec::new(),
            min_length: None,
            max_length: None,
            min: None,
            max: None,
            pattern: None,
            wrapped: true,
        }
    }
}

impl FormDeclaration {
    /// Markup attributes as the page would carry them.
    pub fn attributes(&self) -> HashMap<String, String> {
        let mut attrs = HashMap::new();
        attrs.insert(MOCK_ATTR.to_string(), self.mock.to_string());
        if let Some(v) = &self.form_type {
            attrs.insert(FORM_TYPE_ATTR.to_string(), v.clone());
        }
        if let Some(v) = &self.recipient {
            attrs.insert(RECIPIENT_ATTR.to_string(), v.clone());
        }
        if let Some(v) = &self.method {
            attrs.insert(METHOD_ATTR.to_string(), v.clone());
        }
        if let Some(v) = &self.action {
            attrs.insert(ACTION_ATTR.to_string(), v.clone());
        }
        attrs
    }

    pub fn build(&self) -> anyhow::Result<Form> {
        let descriptor = FormDescriptor::from_attributes(&self.attributes())
            .with_context(|| format!("invalid declaration for form '{}'", self.id))?;
        let mut form = Form::new(descriptor);
        for field in &self.fields {
            let control = field
                .control()
                .with_context(|| format!("invalid field '{}' in form '{}'", field.name, self.id))?;
            form = form.with_field(if field.wrapped {
                FieldWrapper::new(control)
            } else {
                FieldWrapper::bare(control)
            });
        }
        if self.status_region {
            form = form.with_status_region();
        }
        if self.result_region {
            form = form.with_result_region();
        }
        if self.mailto_action {
            form = form.with_mailto_action();
        }
        Ok(form)
    }
}

impl FieldDeclaration {
    fn control(&self) -> anyhow::Result<Control> {
        let mut control = Control::new(self.name.clone(), ControlKind::parse(&self.kind)?)
            .with_checked(self.checked)
            .with_options(self.options.iter().cloned())
            .with_length(self.min_length, self.max_length)
            .with_range(self.min, self.max);
        if let Some(default) = &self.default {
            control = control.with_default(default.clone());
        }
        if let Some(pattern) = &self.pattern {
            control = control.with_pattern(pattern)?;
        }
        if self.required {
            control = control.required();
        }
        Ok(control)
    }
}

fn field(name: &str, kind: &str, required: bool) -> FieldDeclaration {
    FieldDeclaration {
        name: name.into(),
        kind: kind.into(),
        required,
        ..FieldDeclaration::default()
    }
}

/// The enquiry and contact forms published on the site.
fn default_forms() -> Vec<FormDeclaration> {
    vec![
        FormDeclaration {
            id: "enquiry".into(),
            form_type: Some("enquiry".into()),
            mock: true,
            action: Some("/api/enquiries".into()),
            status_region: true,
            result_region: true,
            fields: vec![
                field("name", "text", true),
                field("email", "email", true),
                field("phone", "tel", false),
                FieldDeclaration {
                    options: [
                        "brakes",
                        "filters",
                        "suspension",
                        "cooling",
                        "electrical",
                        "accessories",
                        "fleet",
                    ]
                    .map(String::from)
                    .to_vec(),
                    ..field("interest", "select", true)
                },
                FieldDeclaration {
                    default: Some("1".into()),
                    min: Some(1.0),
                    ..field("quantity", "number", false)
                },
                field("preferredDate", "date", false),
                FieldDeclaration {
                    options: ["", "email", "phone", "WhatsApp"].map(String::from).to_vec(),
                    ..field("contactMethod", "select", false)
                },
                field("notes", "textarea", false),
            ],
            ..FormDeclaration::default()
        },
        FormDeclaration {
            id: "contact".into(),
            form_type: Some("contact".into()),
            mock: true,
            recipient: Some(DEFAULT_RECIPIENT.into()),
            action: Some("/api/contact".into()),
            status_region: true,
            mailto_action: true,
            fields: vec![
                field("name", "text", true),
                field("email", "email", true),
                field("phone", "tel", false),
                FieldDeclaration {
                    default: Some("general enquiry".into()),
                    options: ["general enquiry", "quote", "order", "returns"]
                        .map(String::from)
                        .to_vec(),
                    ..field("messageType", "select", true)
                },
                field("reference", "text", false),
                FieldDeclaration {
                    min_length: Some(10),
                    ..field("message", "textarea", true)
                },
            ],
            ..FormDeclaration::default()
        },
    ]
}

/// Reads `path` (or `forms.toml` when present) and applies environment
/// overrides.
pub fn load_settings(path: Option<&Path>) -> anyhow::Result<Settings> {
    let (path, explicit) = match path {
        Some(path) => (path.to_path_buf(), true),
        None => (PathBuf::from(DEFAULT_CONFIG_PATH), false),
    };

    let settings = match fs::read_to_string(&path) {
        Ok(raw) => parse_settings(&raw)
            .with_context(|| format!("failed to parse config '{}'", path.display()))?,
        Err(err) if explicit => {
            return Err(err).with_context(|| format!("failed to read config '{}'", path.display()))
        }
        Err(_) => Settings::default(),
    };

    Ok(apply_env_overrides(settings, |key| std::env::var(key).ok()))
}

pub fn parse_settings(raw: &str) -> anyhow::Result<Settings> {
    let mut settings: Settings = toml::from_str(raw)?;
    if settings.forms.is_empty() {
        settings.forms = default_forms();
    }
    Ok(settings)
}

/// Checkbox and flag values given on the command line or in the environment.
pub fn is_truthy(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "on" | "yes"
    )
}

pub fn apply_env_overrides(
    mut settings: Settings,
    lookup: impl Fn(&str) -> Option<String>,
) -> Settings {
    let var = |short: &str, long: &str| lookup(long).or_else(|| lookup(short));

    if let Some(v) = var("FORMS_PAGE_URL", "APP__PAGE_URL") {
        settings.page_url = v;
    }
    if let Some(v) = var("FORMS_DEFAULT_RECIPIENT", "APP__DEFAULT_RECIPIENT") {
        settings.default_recipient = v;
    }
    if let Some(v) = var("FORMS_MOCK_LATENCY_MS", "APP__MOCK_LATENCY_MS") {
        if let Ok(parsed) = v.parse::<u64>() {
            settings.mock_latency_ms = parsed;
        }
    }
    if let Some(v) = var("FORMS_FORCE_MOCK", "APP__FORCE_MOCK") {
        settings.force_mock = is_truthy(&v);
    }

    settings
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
