use crate::i18n::{Dictionary, LanguageCode};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

/// Loaded dictionaries, keyed by language.
///
/// Each language is inserted at most once and never evicted; a dictionary
/// handed out through `get` is shared and never mutated.
#[derive(Debug, Default)]
pub struct TranslationStore {
    entries: RwLock<HashMap<LanguageCode, Arc<Dictionary>>>,
}

impl TranslationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, language: LanguageCode) -> Option<Arc<Dictionary>> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&language)
            .cloned()
    }

    pub fn contains(&self, language: LanguageCode) -> bool {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(&language)
    }

    /// Store `dictionary` for `language` unless one is already present.
    ///
    /// Returns `true` if the dictionary was inserted.
    pub fn insert(&self, language: LanguageCode, dictionary: Dictionary) -> bool {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        if entries.contains_key(&language) {
            return false;
        }
        entries.insert(language, Arc::new(dictionary));
        true
    }

    /// Languages currently loaded, sorted.
    pub fn loaded(&self) -> Vec<LanguageCode> {
        let mut languages: Vec<_> = self
            .entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .copied()
            .collect();
        languages.sort();
        languages
    }
}
