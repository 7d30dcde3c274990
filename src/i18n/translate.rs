use crate::i18n::LanguageCode;
use std::sync::Arc;

/// Read-only translation capability handed to components that show
/// user-facing text.
pub trait Translate: Send + Sync {
    /// Translation for `key`, or `default` if it does not resolve.
    fn t_or(&self, key: &str, default: &str) -> String;

    /// The active language.
    fn language(&self) -> LanguageCode;

    /// Translation for `key`, or `key` itself if it does not resolve.
    fn t(&self, key: &str) -> String {
        self.t_or(key, key)
    }
}

/// Translator used when no i18n service is available: every key resolves to
/// the caller's default and the language is the default language.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityTranslator;

impl Translate for IdentityTranslator {
    fn t_or(&self, _key: &str, default: &str) -> String {
        default.to_string()
    }

    fn language(&self) -> LanguageCode {
        LanguageCode::default_language()
    }
}

/// Resolve an optional translator to a usable one.
pub fn translator_or_identity(translator: Option<Arc<dyn Translate>>) -> Arc<dyn Translate> {
    translator.unwrap_or_else(|| Arc::new(IdentityTranslator))
}
