//! Dictionary coverage validation.
//!
//! Compares a translated dictionary against the default-language dictionary
//! and reports keys that would fall back to raw key text on the page.

use crate::i18n::Dictionary;
use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;

/// Validation report containing errors and warnings about a dictionary.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ValidationReport {
    /// Keys present in the default dictionary but missing from the translation
    pub errors: Vec<String>,

    /// Non-critical findings: extra keys, empty values, markup mismatches
    pub warnings: Vec<String>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    pub fn is_clean(&self) -> bool {
        !self.has_errors() && !self.has_warnings()
    }
}

pub struct DictionaryValidator;

static TAG_REGEX: OnceLock<Regex> = OnceLock::new();

impl DictionaryValidator {
    /// Validate `translated` against `canonical`.
    ///
    /// Checks that:
    /// - every canonical leaf key exists in the translation
    /// - the translation has no keys the canonical dictionary lacks
    /// - no translated string is empty
    /// - strings carrying markup keep the same tags
    pub fn validate(canonical: &Dictionary, translated: &Dictionary) -> ValidationReport {
        let mut report = ValidationReport::new();
        let canonical_leaves = canonical.leaves();
        let translated_leaves = translated.leaves();

        for (key, original) in &canonical_leaves {
            match translated_leaves.get(key) {
                None => report.errors.push(format!("Missing key: {}", key)),
                Some(value) => {
                    if let (Value::String(original), Value::String(value)) = (original, value) {
                        if value.trim().is_empty() && !original.trim().is_empty() {
                            report.warnings.push(format!("Empty translation: {}", key));
                        }
                        let original_tags = Self::extract_tags(original);
                        let translated_tags = Self::extract_tags(value);
                        if original_tags != translated_tags {
                            report.warnings.push(format!(
                                "Markup mismatch in {}: original has {:?}, translation has {:?}",
                                key, original_tags, translated_tags
                            ));
                        }
                    }
                }
            }
        }

        for key in translated_leaves.keys() {
            if !canonical_leaves.contains_key(key) {
                report.warnings.push(format!("Extra key: {}", key));
            }
        }

        report
    }

    /// Tag names of every HTML tag in `text`, in order (`br`, `/strong`, ...).
    fn extract_tags(text: &str) -> Vec<String> {
        let regex =
            TAG_REGEX.get_or_init(|| Regex::new(r"<\s*(/?[a-zA-Z][a-zA-Z0-9]*)[^>]*>").unwrap());

        regex
            .captures_iter(text)
            .filter_map(|cap| cap.get(1).map(|m| m.as_str().to_lowercase()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::i18n::LanguageCode;
    use serde_json::json;

    fn en(value: Value) -> Dictionary {
        Dictionary::from_value(LanguageCode::En, value).unwrap()
    }

    fn ar(value: Value) -> Dictionary {
        Dictionary::from_value(LanguageCode::Ar, value).unwrap()
    }

    #[test]
    fn test_clean_report() {
        let report = DictionaryValidator::validate(
            &en(json!({"common": {"logo": "Wasla"}})),
            &ar(json!({"common": {"logo": "وصلة"}})),
        );
        assert!(report.is_clean());
    }

    #[test]
    fn test_missing_key_is_error() {
        let report = DictionaryValidator::validate(
            &en(json!({"form": {"title": "Contact", "submit": "Send"}})),
            &ar(json!({"form": {"title": "اتصل"}})),
        );
        assert_eq!(report.errors, vec!["Missing key: form.submit"]);
    }

    #[test]
    fn test_extra_and_empty_are_warnings() {
        let report = DictionaryValidator::validate(
            &en(json!({"a": "A"})),
            &ar(json!({"a": "  ", "b": "ب"})),
        );
        assert!(!report.has_errors());
        assert!(report.warnings.contains(&"Empty translation: a".to_string()));
        assert!(report.warnings.contains(&"Extra key: b".to_string()));
    }

    #[test]
    fn test_markup_mismatch() {
        let report = DictionaryValidator::validate(
            &en(json!({"hero": "Grow<br>faster"})),
            &ar(json!({"hero": "انمُ أسرع"})),
        );
        assert_eq!(report.warnings.len(), 1);
        assert!(report.warnings[0].contains("Markup mismatch in hero"));
    }

    #[test]
    fn test_extract_tags() {
        let tags = DictionaryValidator::extract_tags("<strong>Hi</strong><br/> <a href='x'>y</a>");
        assert_eq!(tags, vec!["strong", "/strong", "br", "a", "/a"]);
    }
}
