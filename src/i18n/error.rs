use crate::i18n::LanguageCode;
use thiserror::Error;

/// Errors surfaced by the i18n service to its callers.
#[derive(Debug, Error)]
pub enum I18nError {
    /// A language code outside the supported set. Never stored or persisted.
    #[error("Unsupported language code: '{0}'")]
    UnsupportedLanguage(String),
}

/// Failure to fetch or parse a dictionary.
///
/// Load errors stay inside the i18n service: they drive the fallback to the
/// default language and are logged, but are never returned from
/// `I18n::load_language`.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Dictionary request for '{language}' failed: {source}")]
    Transport {
        language: LanguageCode,
        #[source]
        source: reqwest::Error,
    },

    #[error("Dictionary for '{language}' returned HTTP {status}")]
    Status { language: LanguageCode, status: u16 },

    #[error("Failed to read dictionary file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Dictionary for '{language}' is not valid JSON: {source}")]
    Parse {
        language: LanguageCode,
        #[source]
        source: serde_json::Error,
    },

    #[error("Dictionary for '{language}' must be a JSON object at the top level")]
    NotAnObject { language: LanguageCode },
}

impl LoadError {
    /// Whether retrying the same fetch could succeed.
    ///
    /// Transport failures, 429 and 5xx are retried; other statuses, missing
    /// files and malformed JSON are not.
    pub fn is_retryable(&self) -> bool {
        match self {
            LoadError::Transport { .. } => true,
            LoadError::Status { status, .. } => *status == 429 || *status >= 500,
            LoadError::Io { .. } | LoadError::Parse { .. } | LoadError::NotAnObject { .. } => {
                false
            }
        }
    }
}

/// Failure to read or write the persisted language preference.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Preference storage I/O error at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Preference file {path} is not valid JSON: {source}")]
    Corrupt {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Preference write task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}
