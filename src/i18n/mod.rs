//! Internationalization (i18n) module.
//!
//! Runtime translation for the site's pages: detect the visitor's language,
//! load its dictionary, answer key lookups, and announce language changes.
//!
//! # Architecture
//!
//! - `registry` / `language`: the closed set of supported languages and their metadata
//! - `dictionary` / `store`: loaded dictionaries, one per language, never mutated
//! - `storage`: the persisted language choice and start-up detection
//! - `loader`: fetching dictionaries over HTTP or from a directory
//! - `service`: the `I18n` service tying these together
//! - `translate`: the read-only `Translate` capability given to page components
//! - `validator` / `metrics`: dictionary coverage checks and counters
//!
//! # Example
//!
//! ```rust,ignore
//! use wasla_site::i18n::{I18n, LanguageCode};
//!
//! let i18n = I18n::from_config(&config)?;
//! i18n.init(&mut document).await;
//! let label = i18n.t("common.getStarted");
//! i18n.set_language("ar", &mut document).await?;
//! ```

mod dictionary;
mod error;
mod language;
mod loader;
mod metrics;
mod registry;
mod service;
mod storage;
mod store;
mod translate;
mod validator;

pub use dictionary::{Dictionary, KEY_SEPARATOR};
pub use error::{I18nError, LoadError, StorageError};
pub use language::LanguageCode;
pub use loader::{DictionaryLoader, DictionarySource};
pub use metrics::{I18nMetrics, MetricsReport};
pub use registry::{LanguageConfig, LanguageRegistry, TextDirection};
pub use service::{I18n, I18nEvent};
pub use storage::{
    FileStorage, LanguageDetector, MemoryStorage, PreferenceStorage, LANGUAGE_STORAGE_KEY,
};
pub use store::TranslationStore;
pub use translate::{translator_or_identity, IdentityTranslator, Translate};
pub use validator::{DictionaryValidator, ValidationReport};
