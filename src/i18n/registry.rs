//! Language registry: Single source of truth for all supported languages.
//!
//! The registry is immutable and initialized lazily with `OnceLock`, so every
//! `LanguageCode` can resolve its display metadata without carrying it around.

use crate::i18n::LanguageCode;
use std::sync::OnceLock;

/// Writing direction of a language's script.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextDirection {
    Ltr,
    Rtl,
}

impl TextDirection {
    /// Value used for the `dir` attribute.
    pub fn as_str(self) -> &'static str {
        match self {
            TextDirection::Ltr => "ltr",
            TextDirection::Rtl => "rtl",
        }
    }
}

/// Metadata for a supported language.
#[derive(Debug, Clone)]
pub struct LanguageConfig {
    /// The language this entry describes
    pub code: LanguageCode,

    /// English name of the language (e.g., "English", "Arabic")
    pub name: &'static str,

    /// Native name of the language (e.g., "English", "العربية")
    pub native_name: &'static str,

    /// Flag glyph shown by the language switcher
    pub flag: &'static str,

    /// Short label shown next to the flag (e.g., "EN")
    pub short_label: &'static str,

    /// Natural writing direction of the script
    pub direction: TextDirection,

    /// Whether this is the default language (exactly one entry)
    pub is_default: bool,
}

/// Registry of every supported language.
pub struct LanguageRegistry {
    languages: Vec<LanguageConfig>,
}

static REGISTRY: OnceLock<LanguageRegistry> = OnceLock::new();

impl LanguageRegistry {
    /// Get the registry instance.
    pub fn get() -> &'static LanguageRegistry {
        REGISTRY.get_or_init(|| LanguageRegistry {
            languages: default_languages(),
        })
    }

    /// Get the configuration for a language.
    ///
    /// # Returns
    /// * `Some(&LanguageConfig)` if the language has an entry
    /// * `None` otherwise
    pub fn config(&self, code: LanguageCode) -> Option<&LanguageConfig> {
        self.languages.iter().find(|lang| lang.code == code)
    }

    /// Look up a language by its ISO 639-1 code string.
    pub fn get_by_code(&self, code: &str) -> Option<&LanguageConfig> {
        self.languages.iter().find(|lang| lang.code.code() == code)
    }

    /// All registered languages, in switcher display order.
    pub fn list_all(&self) -> &[LanguageConfig] {
        &self.languages
    }

    /// The default language, used when nothing valid is persisted and as the
    /// fallback dictionary.
    pub fn default_language(&self) -> LanguageCode {
        self.languages
            .iter()
            .find(|lang| lang.is_default)
            .map(|lang| lang.code)
            .unwrap_or(LanguageCode::En)
    }
}

fn default_languages() -> Vec<LanguageConfig> {
    vec![
        LanguageConfig {
            code: LanguageCode::En,
            name: "English",
            native_name: "English",
            flag: "🇺🇸",
            short_label: "EN",
            direction: TextDirection::Ltr,
            is_default: true,
        },
        LanguageConfig {
            code: LanguageCode::Ar,
            name: "Arabic",
            native_name: "العربية",
            flag: "🇸🇦",
            short_label: "AR",
            direction: TextDirection::Rtl,
            is_default: false,
        },
    ]
}
