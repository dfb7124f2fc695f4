//! Local Ollama inference server backend.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{classification_prompt, ensure_success, label_is_industry, AffiliationBackend, BackendError};
use crate::config::OllamaConfig;
use crate::utils::HttpClient;

/// Classifies affiliations with a model served by Ollama's `/api/generate`
#[derive(Debug, Clone)]
pub struct OllamaBackend {
    client: HttpClient,
    endpoint: String,
    model: String,
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: String,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: String,
}

impl OllamaBackend {
    pub fn new(config: &OllamaConfig, timeout: Duration) -> Result<Self, BackendError> {
        let client =
            HttpClient::with_timeout(timeout).map_err(|e| BackendError::Config(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            model: config.model.clone(),
        })
    }

    fn generate_url(&self) -> String {
        format!("{}/api/generate", self.endpoint)
    }
}

#[async_trait]
impl AffiliationBackend for OllamaBackend {
    fn id(&self) -> &str {
        "ollama"
    }

    async fn decide(&self, affiliation: &str) -> Result<bool, BackendError> {
        let request = GenerateRequest {
            model: &self.model,
            prompt: classification_prompt(affiliation),
            stream: false,
        };

        let response = self
            .client
            .client()
            .post(self.generate_url())
            .json(&request)
            .send()
            .await?;
        ensure_success(&response)?;

        let body: GenerateResponse = response.json().await?;
        let answer = body.response.trim().to_lowercase();
        tracing::debug!(model = %self.model, %answer, "Ollama model response");

        Ok(label_is_industry(&answer))
    }
}
