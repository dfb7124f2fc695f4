//! External classifier backends for affiliations the keyword rules cannot decide.
//!
//! Every backend implements [`AffiliationBackend`]. Exactly one is active per run,
//! selected by [`build_backend`] from [`ClassifierConfig::backend`]:
//!
//! - `ollama` - local Ollama inference server ([`OllamaBackend`])
//! - `openai` - OpenAI chat completions ([`OpenAiBackend`])
//! - `huggingface` - Hugging Face zero-shot classification ([`HuggingFaceBackend`])
//! - `none` - always academic ([`NoOpBackend`])
//!
//! Backends report failures through [`BackendError`]. Degrading a failure to
//! "academic" is left to [`AffiliationClassifier`](crate::AffiliationClassifier),
//! which also records why the verdict was defaulted.

mod huggingface;
pub mod mock;
mod noop;
mod ollama;
mod openai;

pub use huggingface::HuggingFaceBackend;
pub use mock::MockBackend;
pub use noop::NoOpBackend;
pub use ollama::OllamaBackend;
pub use openai::OpenAiBackend;

use async_trait::async_trait;
use std::sync::Arc;

use crate::config::{BackendKind, ClassifierConfig};

/// Token whose presence in a backend answer means "industry"
pub const INDUSTRY_LABEL: &str = "industry";

/// Label offered to backends alongside [`INDUSTRY_LABEL`]
pub const ACADEMIC_LABEL: &str = "academic";

/// A model-backed tie-breaker for ambiguous affiliations
#[async_trait]
pub trait AffiliationBackend: Send + Sync + std::fmt::Debug {
    /// Short identifier used in logs ("ollama", "openai", ...)
    fn id(&self) -> &str;

    /// Ask the backend whether `affiliation` is an industry affiliation
    async fn decide(&self, affiliation: &str) -> Result<bool, BackendError>;
}

/// Errors a backend can report
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BackendError {
    /// Connection or transport failure
    #[error("Network error: {0}")]
    Network(String),

    /// The request exceeded the configured timeout
    #[error("Request timed out")]
    Timeout,

    /// The backend answered with a non-success status
    #[error("Backend returned status {0}")]
    Status(u16),

    /// The response body did not have the expected shape
    #[error("Parse error: {0}")]
    Parse(String),

    /// A hosted backend was selected without credentials
    #[error("Missing credentials: set {0}")]
    MissingCredentials(&'static str),

    /// The backend could not be constructed
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<reqwest::Error> for BackendError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            BackendError::Timeout
        } else if err.is_decode() {
            BackendError::Parse(err.to_string())
        } else if let Some(status) = err.status() {
            BackendError::Status(status.as_u16())
        } else {
            BackendError::Network(err.to_string())
        }
    }
}

/// Whether a backend answer names the industry label
pub fn label_is_industry(answer: &str) -> bool {
    answer.to_lowercase().contains(INDUSTRY_LABEL)
}

/// Natural-language prompt used by generative backends
pub fn classification_prompt(affiliation: &str) -> String {
    format!(
        "Classify this affiliation as '{academic}' or '{industry}':\n\n{affiliation}\n\nAnswer only '{academic}' or '{industry}'.",
        academic = ACADEMIC_LABEL,
        industry = INDUSTRY_LABEL,
        affiliation = affiliation,
    )
}

/// Reject non-success responses before decoding the body
pub(crate) fn ensure_success(response: &reqwest::Response) -> Result<(), BackendError> {
    let status = response.status();
    if status.is_success() {
        Ok(())
    } else {
        Err(BackendError::Status(status.as_u16()))
    }
}

/// Construct the backend selected by `config`
pub fn build_backend(config: &ClassifierConfig) -> Result<Arc<dyn AffiliationBackend>, BackendError> {
    let timeout = config.timeout();
    let backend: Arc<dyn AffiliationBackend> = match config.backend {
        BackendKind::Ollama => Arc::new(OllamaBackend::new(&config.ollama, timeout)?),
        BackendKind::OpenAi => {
            if config.openai.api_key.is_none() {
                tracing::warn!("OpenAI backend selected but OPENAI_API_KEY is not set; ambiguous affiliations will default to academic");
            }
            Arc::new(OpenAiBackend::new(&config.openai, timeout)?)
        }
        BackendKind::HuggingFace => {
            if config.huggingface.api_token.is_none() {
                tracing::warn!("Hugging Face backend selected but HF_API_TOKEN is not set; ambiguous affiliations will default to academic");
            }
            Arc::new(HuggingFaceBackend::new(&config.huggingface, timeout)?)
        }
        BackendKind::None => Arc::new(NoOpBackend),
    };

    tracing::debug!(backend = backend.id(), timeout_secs = config.timeout_secs, "Classifier backend ready");
    Ok(backend)
}
