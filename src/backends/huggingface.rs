//! Hosted Hugging Face zero-shot classification backend.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{
    ensure_success, label_is_industry, AffiliationBackend, BackendError, ACADEMIC_LABEL,
    INDUSTRY_LABEL,
};
use crate::config::HuggingFaceConfig;
use crate::utils::HttpClient;

/// Classifies affiliations with a zero-shot NLI model on the Inference API
///
/// The affiliation is scored against the candidate labels `academic` and
/// `industry`; the top-ranked label decides.
#[derive(Clone)]
pub struct HuggingFaceBackend {
    client: HttpClient,
    api_url: String,
    api_token: Option<String>,
}

impl std::fmt::Debug for HuggingFaceBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HuggingFaceBackend")
            .field("api_url", &self.api_url)
            .field("has_api_token", &self.api_token.is_some())
            .finish()
    }
}

#[derive(Debug, Serialize)]
struct ZeroShotRequest<'a> {
    inputs: &'a str,
    parameters: ZeroShotParameters,
}

#[derive(Debug, Serialize)]
struct ZeroShotParameters {
    candidate_labels: [&'static str; 2],
}

#[derive(Debug, Deserialize)]
struct ZeroShotResponse {
    labels: Vec<String>,
}

impl HuggingFaceBackend {
    pub fn new(config: &HuggingFaceConfig, timeout: Duration) -> Result<Self, BackendError> {
        let client =
            HttpClient::with_timeout(timeout).map_err(|e| BackendError::Config(e.to_string()))?;

        Ok(Self {
            client,
            api_url: config.api_url.clone(),
            api_token: config.api_token.clone(),
        })
    }
}

#[async_trait]
impl AffiliationBackend for HuggingFaceBackend {
    fn id(&self) -> &str {
        "huggingface"
    }

    async fn decide(&self, affiliation: &str) -> Result<bool, BackendError> {
        let token = self
            .api_token
            .as_deref()
            .ok_or(BackendError::MissingCredentials("HF_API_TOKEN"))?;

        let request = ZeroShotRequest {
            inputs: affiliation,
            parameters: ZeroShotParameters {
                candidate_labels: [ACADEMIC_LABEL, INDUSTRY_LABEL],
            },
        };

        let response = self
            .client
            .client()
            .post(&self.api_url)
            .bearer_auth(token)
            .json(&request)
            .send()
            .await?;
        ensure_success(&response)?;

        let body: ZeroShotResponse = response.json().await?;
        let top_label = body
            .labels
            .first()
            .ok_or_else(|| BackendError::Parse("response contained no labels".to_string()))?;
        tracing::debug!(label = %top_label, "Hugging Face top label");

        Ok(label_is_industry(top_label))
    }
}
