use crate::i18n::LanguageCode;
use anyhow::{Context, Result};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    // Backend
    pub base_url: String,

    // Dictionaries
    pub i18n_base_url: String,
    pub i18n_dir: Option<PathBuf>,

    // Language preference
    pub language_storage_path: PathBuf,
    pub default_language: LanguageCode,

    // HTTP
    pub request_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let base_url = std::env::var("SITE_BASE_URL")
            .unwrap_or_else(|_| "http://localhost:8000".to_string())
            .trim_end_matches('/')
            .to_string();

        let default_language = match std::env::var("DEFAULT_LANGUAGE") {
            Ok(code) => code
                .parse::<LanguageCode>()
                .with_context(|| format!("DEFAULT_LANGUAGE '{}' is not supported", code))?,
            Err(_) => LanguageCode::default_language(),
        };

        Ok(Self {
            i18n_base_url: std::env::var("I18N_BASE_URL")
                .unwrap_or_else(|_| format!("{}/static/i18n", base_url)),
            i18n_dir: std::env::var("I18N_DIR").ok().map(PathBuf::from),
            base_url,

            language_storage_path: std::env::var("LANGUAGE_STORAGE_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(".wasla/preferences.json")),
            default_language,

            request_timeout: Duration::from_secs(
                std::env::var("REQUEST_TIMEOUT_SECS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(10),
            ),
        })
    }

    /// Configuration pointing every endpoint at `base_url`, with defaults for
    /// everything else.
    pub fn for_base_url(base_url: &str) -> Self {
        let base_url = base_url.trim_end_matches('/').to_string();
        Self {
            i18n_base_url: format!("{}/static/i18n", base_url),
            i18n_dir: None,
            base_url,
            language_storage_path: PathBuf::from(".wasla/preferences.json"),
            default_language: LanguageCode::default_language(),
            request_timeout: Duration::from_secs(10),
        }
    }

    /// HTTP client shared by the page components: request timeout applied,
    /// session cookies kept between requests.
    pub fn http_client(&self) -> Result<reqwest::Client> {
        reqwest::Client::builder()
            .timeout(self.request_timeout)
            .cookie_store(true)
            .build()
            .context("Failed to build HTTP client")
    }
}
