//! Language code: the closed set of languages the site is translated into.

use crate::i18n::{I18nError, LanguageConfig, LanguageRegistry, TextDirection};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A supported language.
///
/// Parsing goes through `FromStr`, which rejects anything outside the
/// supported set, so a `LanguageCode` value is always valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LanguageCode {
    En,
    Ar,
}

impl LanguageCode {
    /// Every supported language.
    pub const ALL: [LanguageCode; 2] = [LanguageCode::En, LanguageCode::Ar];

    /// ISO 639-1 code, as persisted and as used in dictionary file names.
    pub fn code(self) -> &'static str {
        match self {
            LanguageCode::En => "en",
            LanguageCode::Ar => "ar",
        }
    }

    /// The default language from the registry.
    pub fn default_language() -> LanguageCode {
        LanguageRegistry::get().default_language()
    }

    /// Registry metadata for this language.
    ///
    /// # Panics
    /// Panics if the registry has no entry for this code, which would mean
    /// the registry table and this enum are out of sync.
    pub fn config(self) -> &'static LanguageConfig {
        LanguageRegistry::get()
            .config(self)
            .expect("every LanguageCode has a registry entry")
    }

    pub fn name(self) -> &'static str {
        self.config().name
    }

    pub fn native_name(self) -> &'static str {
        self.config().native_name
    }

    pub fn flag(self) -> &'static str {
        self.config().flag
    }

    pub fn short_label(self) -> &'static str {
        self.config().short_label
    }

    pub fn direction(self) -> TextDirection {
        self.config().direction
    }

    pub fn is_default(self) -> bool {
        self.config().is_default
    }

    /// CSS class marking the document with the active language.
    pub fn css_class(self) -> String {
        format!("lang-{}", self.code())
    }
}

impl FromStr for LanguageCode {
    type Err = I18nError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LanguageRegistry::get()
            .get_by_code(s)
            .map(|config| config.code)
            .ok_or_else(|| I18nError::UnsupportedLanguage(s.to_string()))
    }
}

impl fmt::Display for LanguageCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}
