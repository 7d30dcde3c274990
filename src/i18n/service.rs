//! The i18n service: owns the active language and the loaded dictionaries,
//! and is their only writer.

use crate::config::Config;
use crate::dom::{Document, LOADING_CLASS};
use crate::i18n::{
    Dictionary, DictionaryLoader, DictionaryValidator, FileStorage, I18nError, I18nMetrics,
    LanguageCode, LanguageDetector, PreferenceStorage, TextDirection, Translate,
    TranslationStore, ValidationReport,
};
use anyhow::{Context, Result};
use futures::future::{self, BoxFuture, FutureExt, Shared};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};

/// Buffered events per subscriber before the oldest are dropped.
const EVENT_CAPACITY: usize = 16;

/// Notifications broadcast to page components.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum I18nEvent {
    /// The initial dictionary is loaded and document metadata applied.
    Ready(LanguageCode),
    /// The active language changed; its dictionary (or the fallback) is loaded.
    LanguageChanged(LanguageCode),
}

type PendingLoad = Shared<BoxFuture<'static, ()>>;

/// Shared state needed by load futures, which must outlive any borrow of the
/// service.
#[derive(Clone)]
struct Loads {
    loader: DictionaryLoader,
    store: Arc<TranslationStore>,
    metrics: Arc<I18nMetrics>,
    in_flight: Arc<Mutex<HashMap<LanguageCode, PendingLoad>>>,
    default_language: LanguageCode,
}

impl Loads {
    /// Load `language` once. Callers arriving while a load is in flight
    /// await that same load.
    fn load(&self, language: LanguageCode) -> BoxFuture<'static, ()> {
        if self.store.contains(language) {
            return future::ready(()).boxed();
        }

        let pending = {
            let mut in_flight = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
            in_flight
                .entry(language)
                .or_insert_with(|| {
                    let loads = self.clone();
                    async move { loads.fetch_into_store(language).await }
                        .boxed()
                        .shared()
                })
                .clone()
        };

        let in_flight = Arc::clone(&self.in_flight);
        async move {
            pending.clone().await;
            let mut in_flight = in_flight.lock().unwrap_or_else(PoisonError::into_inner);
            if in_flight
                .get(&language)
                .is_some_and(|current| current.ptr_eq(&pending))
            {
                in_flight.remove(&language);
            }
        }
        .boxed()
    }

    async fn fetch_into_store(self, language: LanguageCode) {
        self.metrics.record_fetch();
        match self.loader.fetch(language).await {
            Ok(dictionary) => {
                self.store.insert(language, dictionary);
                info!("Loaded dictionary for '{}'", language);
            }
            Err(e) => {
                self.metrics.record_fetch_failure();
                error!("Error loading language '{}': {}", language, e);

                if language != self.default_language {
                    self.metrics.record_fallback();
                    warn!(
                        "Falling back to '{}' dictionary for '{}'",
                        self.default_language, language
                    );
                    self.load(self.default_language).await;
                }
            }
        }
    }
}

/// Translation service shared by every page component.
///
/// Lookups are synchronous; loading and language changes are async. Internal
/// locks are never held across an await point.
pub struct I18n {
    detector: LanguageDetector,
    loads: Loads,
    current: RwLock<LanguageCode>,
    events: broadcast::Sender<I18nEvent>,
}

impl I18n {
    /// Create the service. The starting language is detected (and, if
    /// nothing valid was stored, persisted) immediately.
    pub fn new(
        loader: DictionaryLoader,
        storage: Arc<dyn PreferenceStorage>,
        default_language: LanguageCode,
    ) -> Self {
        let detector = LanguageDetector::new(storage, default_language);
        let current = detector.detect();
        let (events, _) = broadcast::channel(EVENT_CAPACITY);

        Self {
            detector,
            loads: Loads {
                loader,
                store: Arc::new(TranslationStore::new()),
                metrics: Arc::new(I18nMetrics::new()),
                in_flight: Arc::new(Mutex::new(HashMap::new())),
                default_language,
            },
            current: RwLock::new(current),
            events,
        }
    }

    /// Build the service from configuration: HTTP or directory dictionaries,
    /// and file-backed preference storage.
    pub fn from_config(config: &Config) -> Result<Self> {
        let loader = match &config.i18n_dir {
            Some(dir) => DictionaryLoader::directory(dir),
            None => DictionaryLoader::http(
                config.http_client().context("Failed to build i18n HTTP client")?,
                config.i18n_base_url.clone(),
            ),
        };
        let storage = Arc::new(FileStorage::new(&config.language_storage_path));

        Ok(Self::new(loader, storage, config.default_language))
    }

    /// The persisted language if supported, else the default (persisted).
    pub fn detect_language(&self) -> LanguageCode {
        self.detector.detect()
    }

    pub fn default_language(&self) -> LanguageCode {
        self.loads.default_language
    }

    /// Load the dictionary for `language` if it is not loaded yet.
    ///
    /// Never fails: a failed non-default load falls back to the default
    /// dictionary, and failures are logged and counted.
    pub async fn load_language(&self, language: LanguageCode) {
        self.loads.load(language).await;
    }

    /// Load the current language and apply it to the document, then announce
    /// readiness.
    pub async fn init(&self, document: &mut Document) {
        let language = self.language();
        debug!("i18n init with language '{}'", language);

        self.load_language(language).await;
        self.apply_language(document);

        info!("i18n initialized ({})", language);
        let _ = self.events.send(I18nEvent::Ready(language));
    }

    /// Write language metadata onto the document element and reveal content.
    ///
    /// The layout stays left-to-right for every language.
    pub fn apply_language(&self, document: &mut Document) {
        let language = self.language();
        let html = document.document_element_mut();

        html.set_attribute("lang", language.code());
        html.set_attribute("dir", TextDirection::Ltr.as_str());
        for code in LanguageCode::ALL {
            html.remove_class(&code.css_class());
        }
        html.add_class(&language.css_class());
        html.remove_class(LOADING_CLASS);
    }

    /// Translation for `key` in the active language, or `default`.
    ///
    /// When the active language has no dictionary (its load failed or is
    /// still running), the default language's dictionary answers instead.
    pub fn t_or(&self, key: &str, default: &str) -> String {
        let store = &self.loads.store;
        let dictionary = store
            .get(self.language())
            .or_else(|| store.get(self.loads.default_language));

        match dictionary.and_then(|d| d.text(key)) {
            Some(text) => {
                self.loads.metrics.record_lookup_hit();
                text
            }
            None => {
                self.loads.metrics.record_lookup_miss();
                default.to_string()
            }
        }
    }

    /// Translation for `key`, or `key` itself.
    pub fn t(&self, key: &str) -> String {
        self.t_or(key, key)
    }

    /// Switch to the language named by `code`.
    ///
    /// Unsupported codes are rejected and leave all state unchanged.
    pub async fn set_language(
        &self,
        code: &str,
        document: &mut Document,
    ) -> Result<LanguageCode, I18nError> {
        let language = code.parse::<LanguageCode>().map_err(|e| {
            warn!("Invalid language: {}", code);
            e
        })?;
        self.change_language(language, document).await;
        Ok(language)
    }

    /// Switch to `language`: persist it, load its dictionary, re-apply the
    /// document metadata, then broadcast `LanguageChanged`.
    pub async fn change_language(&self, language: LanguageCode, document: &mut Document) {
        let previous = {
            let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);
            std::mem::replace(&mut *current, language)
        };
        info!("Changing language from '{}' to '{}'", previous, language);

        if let Err(e) = self.detector.persist_blocking(language).await {
            warn!("Could not persist language '{}': {}", language, e);
        }

        self.load_language(language).await;
        self.apply_language(document);

        let _ = self.events.send(I18nEvent::LanguageChanged(language));
        debug!("languageChanged dispatched ({})", language);
    }

    /// Load every dictionary and check each translation against the default
    /// language's.
    ///
    /// A translation that failed to load is reported as not loaded and is
    /// checked as if empty, so every canonical key counts as missing. Without
    /// a default dictionary nothing can be checked and every translation
    /// reports that as its error.
    pub async fn validate_dictionaries(&self) -> Vec<(LanguageCode, ValidationReport)> {
        let default_language = self.default_language();
        self.load_language(default_language).await;
        let canonical = self.store().get(default_language);

        let mut reports = Vec::new();
        for language in LanguageCode::ALL {
            if language == default_language {
                continue;
            }
            self.load_language(language).await;

            let report = match (&canonical, self.store().get(language)) {
                (Some(canonical), Some(translated)) => {
                    DictionaryValidator::validate(canonical, &translated)
                }
                (Some(canonical), None) => {
                    let mut report = DictionaryValidator::validate(canonical, &Dictionary::default());
                    report
                        .errors
                        .insert(0, format!("Dictionary for '{}' not loaded", language));
                    report
                }
                (None, _) => {
                    let mut report = ValidationReport::new();
                    report.errors.push(format!(
                        "Default dictionary '{}' not loaded",
                        default_language
                    ));
                    report
                }
            };
            reports.push((language, report));
        }
        reports
    }

    pub fn language(&self) -> LanguageCode {
        *self.current.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn is_language(&self, language: LanguageCode) -> bool {
        self.language() == language
    }

    pub fn is_arabic(&self) -> bool {
        self.is_language(LanguageCode::Ar)
    }

    pub fn is_english(&self) -> bool {
        self.is_language(LanguageCode::En)
    }

    /// Whether the active language's dictionary is loaded.
    pub fn is_ready(&self) -> bool {
        self.loads.store.contains(self.language())
    }

    pub fn subscribe(&self) -> broadcast::Receiver<I18nEvent> {
        self.events.subscribe()
    }

    pub fn store(&self) -> &TranslationStore {
        &self.loads.store
    }

    pub fn metrics(&self) -> &I18nMetrics {
        &self.loads.metrics
    }
}

impl Translate for I18n {
    fn t_or(&self, key: &str, default: &str) -> String {
        I18n::t_or(self, key, default)
    }

    fn language(&self) -> LanguageCode {
        I18n::language(self)
    }
}
