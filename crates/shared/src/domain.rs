use std::{collections::HashMap, fmt};

use serde::{ser::SerializeMap, Deserialize, Serialize, Serializer};

use crate::error::DescriptorError;

pub const MOCK_ATTR: &str = "data-mock";
pub const FORM_TYPE_ATTR: &str = "data-form-type";
pub const RECIPIENT_ATTR: &str = "data-recipient";
pub const METHOD_ATTR: &str = "method";
pub const ACTION_ATTR: &str = "action";

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FormPurpose {
    Enquiry,
    Contact,
    #[default]
    #[serde(other)]
    Other,
}

impl FormPurpose {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "enquiry" => Self::Enquiry,
            "contact" => Self::Contact,
            _ => Self::Other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Enquiry => "enquiry",
            Self::Contact => "contact",
            Self::Other => "other",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    #[default]
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    pub fn parse(raw: &str) -> Result<Self, DescriptorError> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "" | "POST" => Ok(Self::Post),
            "GET" => Ok(Self::Get),
            "PUT" => Ok(Self::Put),
            "PATCH" => Ok(Self::Patch),
            "DELETE" => Ok(Self::Delete),
            _ => Err(DescriptorError::UnsupportedMethod(raw.to_string())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FormDescriptor {
    pub purpose: FormPurpose,
    pub mock: bool,
    pub recipient: Option<String>,
    pub action: Option<String>,
    pub method: HttpMethod,
}

impl FormDescriptor {
    pub fn from_attributes(attrs: &HashMap<String, String>) -> Result<Self, DescriptorError> {
        let non_empty = |key: &str| {
            attrs
                .get(key)
                .map(|v| v.trim())
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };

        let method = match attrs.get(METHOD_ATTR) {
            Some(raw) => HttpMethod::parse(raw)?,
            None => HttpMethod::default(),
        };

        Ok(Self {
            purpose: attrs
                .get(FORM_TYPE_ATTR)
                .map(|v| FormPurpose::parse(v))
                .unwrap_or_default(),
            mock: attrs.get(MOCK_ATTR).map(String::as_str) == Some("true"),
            recipient: non_empty(RECIPIENT_ATTR),
            action: non_empty(ACTION_ATTR),
            method,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Payload {
    entries: Vec<(String, String)>,
}

impl Payload {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn non_empty(&self, name: &str) -> Option<&str> {
        self.get(name).filter(|v| !v.is_empty())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Payload {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut payload = Payload::new();
        for (k, v) in iter {
            payload.set(k, v);
        }
        payload
    }
}

impl Serialize for Payload {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (k, v) in &self.entries {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Interest {
    Brakes,
    Filters,
    Suspension,
    Cooling,
    Electrical,
    Accessories,
    Fleet,
    Custom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InterestRecord {
    pub title: &'static str,
    pub base_price: u32,
    pub availability: &'static str,
}

impl Interest {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "brakes" => Self::Brakes,
            "filters" => Self::Filters,
            "suspension" => Self::Suspension,
            "cooling" => Self::Cooling,
            "electrical" => Self::Electrical,
            "accessories" => Self::Accessories,
            "fleet" => Self::Fleet,
            _ => Self::Custom,
        }
    }

    pub fn record(self) -> InterestRecord {
        match self {
            Self::Brakes => InterestRecord {
                title: "Brake systems & hydraulics",
                base_price: 1450,
                availability: "In stock at our Johannesburg distribution centre",
            },
            Self::Filters => InterestRecord {
                title: "Filters & service kits",
                base_price: 980,
                availability: "Available for overnight delivery nationwide",
            },
            Self::Suspension => InterestRecord {
                title: "Suspension & steering",
                base_price: 2120,
                availability: "Limited stock — reserve soon for guaranteed delivery",
            },
            Self::Cooling => InterestRecord {
                title: "Cooling & climate control",
                base_price: 1750,
                availability: "Ships within 24 hours from Gauteng warehouse",
            },
            Self::Electrical => InterestRecord {
                title: "Engine electrics & sensors",
                base_price: 1580,
                availability: "Live-tested and ready for dispatch",
            },
            Self::Accessories => InterestRecord {
                title: "Accessories & detailing",
                base_price: 650,
                availability: "In stock — customise your order in the quote stage",
            },
            Self::Fleet => InterestRecord {
                title: "Fleet maintenance contract",
                base_price: 0,
                availability: "Dedicated account manager will confirm contract terms",
            },
            Self::Custom => InterestRecord {
                title: "Custom parts request",
                base_price: 1200,
                availability: "We will confirm availability with our supplier network.",
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attrs(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn descriptor_defaults_to_post_without_mock() {
        let descriptor = FormDescriptor::from_attributes(&attrs(&[(FORM_TYPE_ATTR, "enquiry")]))
            .expect("descriptor");
        assert_eq!(descriptor.purpose, FormPurpose::Enquiry);
        assert_eq!(descriptor.method, HttpMethod::Post);
        assert!(!descriptor.mock);
        assert!(descriptor.action.is_none());
    }

    #[test]
    fn descriptor_mock_flag_requires_literal_true() {
        let on = FormDescriptor::from_attributes(&attrs(&[(MOCK_ATTR, "true")])).expect("on");
        let off = FormDescriptor::from_attributes(&attrs(&[(MOCK_ATTR, "yes")])).expect("off");
        assert!(on.mock);
        assert!(!off.mock);
    }

    #[test]
    fn descriptor_reads_method_case_insensitively() {
        let descriptor = FormDescriptor::from_attributes(&attrs(&[
            (METHOD_ATTR, "get"),
            (ACTION_ATTR, "/api/quote"),
            (RECIPIENT_ATTR, "  "),
        ]))
        .expect("descriptor");
        assert_eq!(descriptor.method, HttpMethod::Get);
        assert_eq!(descriptor.action.as_deref(), Some("/api/quote"));
        assert!(descriptor.recipient.is_none());
    }

    #[test]
    fn descriptor_rejects_unknown_method() {
        let err = FormDescriptor::from_attributes(&attrs(&[(METHOD_ATTR, "TRACE")]))
            .expect_err("unsupported");
        assert!(matches!(err, DescriptorError::UnsupportedMethod(m) if m == "TRACE"));
    }

    #[test]
    fn unknown_purpose_maps_to_other() {
        assert_eq!(FormPurpose::parse("newsletter"), FormPurpose::Other);
    }

    #[test]
    fn payload_set_replaces_in_place() {
        let mut payload = Payload::new();
        payload.set("name", "A");
        payload.set("email", "a@example.com");
        payload.set("name", "B");
        let entries: Vec<_> = payload.iter().collect();
        assert_eq!(entries, vec![("name", "B"), ("email", "a@example.com")]);
    }

    #[test]
    fn payload_serializes_as_flat_object_in_order() {
        let payload: Payload = [("quantity", "2"), ("interest", "brakes")].into_iter().collect();
        let json = serde_json::to_string(&payload).expect("json");
        assert_eq!(json, r#"{"quantity":"2","interest":"brakes"}"#);
    }

    #[test]
    fn unknown_interest_uses_custom_record() {
        let record = Interest::parse("turbo").record();
        assert_eq!(record.title, "Custom parts request");
        assert_eq!(record.base_price, 1200);
    }
}
