//! Contact form fields and the submission payload.

use crate::dom::{Document, NodeId};
use crate::i18n::LanguageCode;
use serde::Serialize;

/// Value `num_locations` returns to when the form is cleared.
pub const DEFAULT_LOCATIONS: &str = "1";

/// Attribute naming the payload field an input feeds.
pub const FIELD_ATTR: &str = "data-field";

/// Values entered into the contact form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ContactForm {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub country_code: String,
    pub country: String,
    pub business_name: String,
    pub num_locations: String,
    pub referral_source: String,
    pub marketing_consent: bool,
}

/// Body of `POST /contacts/submit`.
#[derive(Debug, Clone, Serialize)]
pub struct ContactSubmission {
    #[serde(flatten)]
    pub form: ContactForm,
    pub language_preference: LanguageCode,
}

impl ContactForm {
    /// Copy of the form with every text value trimmed.
    pub fn trimmed(&self) -> Self {
        Self {
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            email: self.email.trim().to_string(),
            phone: self.phone.trim().to_string(),
            country_code: self.country_code.trim().to_string(),
            country: self.country.trim().to_string(),
            business_name: self.business_name.trim().to_string(),
            num_locations: self.num_locations.trim().to_string(),
            referral_source: self.referral_source.trim().to_string(),
            marketing_consent: self.marketing_consent,
        }
    }

    /// Assemble a fresh payload for one submission attempt.
    pub fn payload(&self, language: LanguageCode) -> ContactSubmission {
        ContactSubmission {
            form: self.trimmed(),
            language_preference: language,
        }
    }

    /// Reset after a successful submission. The country code selection is
    /// kept.
    pub fn clear(&mut self) {
        let country_code = std::mem::take(&mut self.country_code);
        *self = Self {
            country_code,
            num_locations: DEFAULT_LOCATIONS.to_string(),
            ..Self::default()
        };
    }

    fn field_mut(&mut self, name: &str) -> Option<&mut String> {
        match name {
            "first_name" => Some(&mut self.first_name),
            "last_name" => Some(&mut self.last_name),
            "email" => Some(&mut self.email),
            "phone" => Some(&mut self.phone),
            "country_code" => Some(&mut self.country_code),
            "country" => Some(&mut self.country),
            "business_name" => Some(&mut self.business_name),
            "num_locations" => Some(&mut self.num_locations),
            "referral_source" => Some(&mut self.referral_source),
            _ => None,
        }
    }

    /// Read the form's inputs from the document.
    ///
    /// Inputs name their field with `data-field`; values come from the
    /// `value` attribute. Radio inputs count only when `checked`. The
    /// `#marketing` checkbox feeds `marketing_consent`.
    pub fn collect(document: &Document, form: NodeId) -> Self {
        let mut values = Self::default();

        for node in document.descendants(form) {
            let Some(el) = document.get(node) else { continue };
            if !matches!(el.tag(), "input" | "select") {
                continue;
            }
            let input_type = el.get_attribute("type").unwrap_or("text");
            let checked = el.has_attribute("checked");

            let Some(field) = el.get_attribute(FIELD_ATTR) else {
                if input_type == "checkbox" && el.id() == Some("marketing") {
                    values.marketing_consent = checked;
                }
                continue;
            };

            if input_type == "checkbox" {
                if field == "marketing_consent" {
                    values.marketing_consent = checked;
                }
                continue;
            }
            if input_type == "radio" && !checked {
                continue;
            }
            if let Some(slot) = values.field_mut(field) {
                *slot = el.get_attribute("value").unwrap_or_default().trim().to_string();
            }
        }

        values
    }

    /// Clear the form's inputs in the document: text inputs emptied,
    /// checkboxes unchecked, the `1` location radio checked, and selects
    /// other than `.country-code` reset.
    pub fn clear_inputs(document: &mut Document, form: NodeId) {
        for node in document.descendants(form) {
            let Some(el) = document.get_mut(node) else { continue };
            let tag = el.tag().to_string();
            let input_type = el.get_attribute("type").unwrap_or("text").to_string();
            match (tag.as_str(), input_type.as_str()) {
                ("input", "text" | "email" | "tel") => el.set_attribute("value", ""),
                ("input", "checkbox") => el.remove_attribute("checked"),
                ("input", "radio") => {
                    if el.get_attribute("value") == Some(DEFAULT_LOCATIONS) {
                        el.set_attribute("checked", "");
                    } else {
                        el.remove_attribute("checked");
                    }
                }
                ("select", _) if !el.has_class("country-code") => el.set_attribute("value", ""),
                _ => {}
            }
        }
    }
}
