//! LibreTranslate-compatible HTTP translation provider.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::application::translator::{TranslationProvider, TranslatorCapability, TranslatorError};
use crate::config::TranslationSettings;

use super::error::InfraError;

const ERROR_BODY_LIMIT: usize = 512;

#[derive(Debug, Serialize)]
struct TranslateRequestBody<'a> {
    q: &'a str,
    source: &'a str,
    target: &'a str,
    format: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    api_key: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct TranslateResponseBody {
    #[serde(rename = "translatedText")]
    translated_text: String,
}

#[derive(Clone, Debug)]
pub struct HttpTranslationProvider {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
}

impl HttpTranslationProvider {
    pub fn new(
        endpoint: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, InfraError> {
        let client = Client::builder()
            .user_agent(Self::user_agent())
            .timeout(timeout)
            .build()
            .map_err(|err| InfraError::translator(err.to_string()))?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
            api_key,
        })
    }

    pub fn user_agent() -> &'static str {
        concat!("parlance/", env!("CARGO_PKG_VERSION"))
    }
}

#[async_trait]
impl TranslationProvider for HttpTranslationProvider {
    fn name(&self) -> &'static str {
        "http"
    }

    async fn translate(
        &self,
        text: &str,
        source_language: &str,
        target_language: &str,
    ) -> Result<String, TranslatorError> {
        let body = TranslateRequestBody {
            q: text,
            source: source_language,
            target: target_language,
            format: "text",
            api_key: self.api_key.as_deref(),
        };

        let resp = self
            .client
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await
            .map_err(|err| TranslatorError::Transport(err.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let mut message = resp.text().await.unwrap_or_default();
            if message.len() > ERROR_BODY_LIMIT {
                let mut end = ERROR_BODY_LIMIT;
                while !message.is_char_boundary(end) {
                    end -= 1;
                }
                message.truncate(end);
            }
            return Err(TranslatorError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: TranslateResponseBody = resp
            .json()
            .await
            .map_err(|err| TranslatorError::Decode(err.to_string()))?;
        Ok(parsed.translated_text)
    }
}

/// Resolve provider availability once from configuration.
pub fn build_translator(settings: &TranslationSettings) -> Result<TranslatorCapability, InfraError> {
    match settings.endpoint.as_ref() {
        Some(endpoint) => {
            let provider =
                HttpTranslationProvider::new(endpoint, settings.api_key.clone(), settings.timeout)?;
            info!(target: "parlance::translation", endpoint = %endpoint, "translation provider configured");
            Ok(TranslatorCapability::available(Arc::new(provider)))
        }
        None => {
            info!(
                target: "parlance::translation",
                "translation endpoint not configured; translate requests will answer 503"
            );
            Ok(TranslatorCapability::unavailable(
                "translation endpoint is not configured",
            ))
        }
    }
}
