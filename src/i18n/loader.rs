//! Fetches dictionaries from their static JSON resources.

use crate::i18n::{Dictionary, LanguageCode, LoadError};
use crate::retry::{with_retry_if, RetryConfig};
use std::path::PathBuf;
use tracing::debug;

/// Where dictionaries come from.
#[derive(Debug, Clone)]
pub enum DictionarySource {
    /// `GET {base_url}/{code}.json`
    Http {
        client: reqwest::Client,
        base_url: String,
    },
    /// `{dir}/{code}.json` on the local filesystem
    Directory(PathBuf),
}

/// Loads one dictionary per call. Stateless apart from its source, so it can
/// be cloned into in-flight load futures.
#[derive(Debug, Clone)]
pub struct DictionaryLoader {
    source: DictionarySource,
    retry: RetryConfig,
}

impl DictionaryLoader {
    pub fn http(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            source: DictionarySource::Http {
                client,
                base_url: base_url.into(),
            },
            retry: RetryConfig::dictionary_fetch(),
        }
    }

    pub fn directory(dir: impl Into<PathBuf>) -> Self {
        Self {
            source: DictionarySource::Directory(dir.into()),
            retry: RetryConfig::none(),
        }
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    pub fn source(&self) -> &DictionarySource {
        &self.source
    }

    /// Location of the dictionary resource for `language`.
    pub fn location(&self, language: LanguageCode) -> String {
        match &self.source {
            DictionarySource::Http { base_url, .. } => {
                format!("{}/{}.json", base_url.trim_end_matches('/'), language.code())
            }
            DictionarySource::Directory(dir) => dir
                .join(format!("{}.json", language.code()))
                .display()
                .to_string(),
        }
    }

    /// Fetch and parse the dictionary for `language`, retrying transient
    /// failures according to the retry policy.
    pub async fn fetch(&self, language: LanguageCode) -> Result<Dictionary, LoadError> {
        with_retry_if(
            &self.retry,
            &format!("Dictionary fetch ({})", language),
            || self.fetch_once(language),
            LoadError::is_retryable,
        )
        .await
    }

    async fn fetch_once(&self, language: LanguageCode) -> Result<Dictionary, LoadError> {
        let location = self.location(language);
        debug!("Fetching dictionary from {}", location);

        let body = match &self.source {
            DictionarySource::Http { client, .. } => {
                let response = client
                    .get(&location)
                    .send()
                    .await
                    .map_err(|source| LoadError::Transport { language, source })?;

                if !response.status().is_success() {
                    return Err(LoadError::Status {
                        language,
                        status: response.status().as_u16(),
                    });
                }

                response
                    .text()
                    .await
                    .map_err(|source| LoadError::Transport { language, source })?
            }
            DictionarySource::Directory(_) => tokio::fs::read_to_string(&location)
                .await
                .map_err(|source| LoadError::Io {
                    path: location.clone(),
                    source,
                })?,
        };

        Dictionary::from_json_str(language, &body)
    }
}
