//! Translation provider port.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TranslatorError {
    #[error("translation request failed: {0}")]
    Transport(String),
    #[error("translation service answered {status}: {message}")]
    Rejected { status: u16, message: String },
    #[error("translation response could not be decoded: {0}")]
    Decode(String),
    #[error("translation did not finish within {0:?}")]
    Timeout(Duration),
}

#[async_trait]
pub trait TranslationProvider: Send + Sync {
    /// Short label used in logs and metrics.
    fn name(&self) -> &'static str;

    async fn translate(
        &self,
        text: &str,
        source_language: &str,
        target_language: &str,
    ) -> Result<String, TranslatorError>;
}

/// Whether a provider is configured, decided once at startup.
#[derive(Clone)]
pub enum TranslatorCapability {
    Available(Arc<dyn TranslationProvider>),
    Unavailable { reason: String },
}

impl TranslatorCapability {
    pub fn available(provider: Arc<dyn TranslationProvider>) -> Self {
        Self::Available(provider)
    }

    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::Unavailable {
            reason: reason.into(),
        }
    }
}

impl fmt::Debug for TranslatorCapability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Available(provider) => f
                .debug_tuple("Available")
                .field(&provider.name())
                .finish(),
            Self::Unavailable { reason } => f
                .debug_struct("Unavailable")
                .field("reason", reason)
                .finish(),
        }
    }
}
