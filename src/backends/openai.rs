//! Hosted OpenAI chat completions backend.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{classification_prompt, ensure_success, label_is_industry, AffiliationBackend, BackendError};
use crate::config::OpenAiConfig;
use crate::utils::HttpClient;

/// Classifies affiliations with an OpenAI chat model
#[derive(Clone)]
pub struct OpenAiBackend {
    client: HttpClient,
    base_url: String,
    model: String,
    api_key: Option<String>,
}

// Keeps the API key out of debug output.
impl std::fmt::Debug for OpenAiBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiBackend")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("has_api_key", &self.api_key.is_some())
            .finish()
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    temperature: f32,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

impl OpenAiBackend {
    pub fn new(config: &OpenAiConfig, timeout: Duration) -> Result<Self, BackendError> {
        let client =
            HttpClient::with_timeout(timeout).map_err(|e| BackendError::Config(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key: config.api_key.clone(),
        })
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

#[async_trait]
impl AffiliationBackend for OpenAiBackend {
    fn id(&self) -> &str {
        "openai"
    }

    async fn decide(&self, affiliation: &str) -> Result<bool, BackendError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(BackendError::MissingCredentials("OPENAI_API_KEY"))?;

        let request = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: classification_prompt(affiliation),
            }],
            temperature: 0.0,
        };

        let response = self
            .client
            .client()
            .post(self.completions_url())
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await?;
        ensure_success(&response)?;

        let body: ChatResponse = response.json().await?;
        let answer = body
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content.trim().to_lowercase())
            .ok_or_else(|| BackendError::Parse("response contained no choices".to_string()))?;
        tracing::debug!(model = %self.model, %answer, "OpenAI model response");

        Ok(label_is_industry(&answer))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use serde_json::json;

    fn backend_for(url: &str, api_key: Option<&str>) -> OpenAiBackend {
        let config = OpenAiConfig {
            base_url: url.to_string(),
            model: "gpt-3.5-turbo".to_string(),
            api_key: api_key.map(String::from),
        };
        OpenAiBackend::new(&config, Duration::from_secs(5)).unwrap()
    }

    fn chat_body(content: &str) -> String {
        json!({
            "id": "chatcmpl-1",
            "choices": [{"index": 0, "message": {"role": "assistant", "content": content}}]
        })
        .to_string()
    }

    #[tokio::test]
    async fn test_industry_answer_with_bearer_auth() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .match_header("authorization", "Bearer sk-test")
            .match_body(Matcher::PartialJson(json!({
                "model": "gpt-3.5-turbo",
                "temperature": 0.0
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(chat_body("Industry"))
            .create_async()
            .await;

        let backend = backend_for(&server.url(), Some("sk-test"));
        assert_eq!(backend.decide("Genentech, South San Francisco").await, Ok(true));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_academic_answer() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_body(chat_body("academic"))
            .create_async()
            .await;

        let backend = backend_for(&server.url(), Some("sk-test"));
        assert_eq!(backend.decide("Max Planck Gesellschaft").await, Ok(false));
    }

    #[tokio::test]
    async fn test_missing_key_fails_without_request() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .expect(0)
            .create_async()
            .await;

        let backend = backend_for(&server.url(), None);
        assert_eq!(
            backend.decide("Anything").await,
            Err(BackendError::MissingCredentials("OPENAI_API_KEY"))
        );
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_empty_choices_is_parse_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_body(r#"{"choices": []}"#)
            .create_async()
            .await;

        let backend = backend_for(&server.url(), Some("sk-test"));
        assert!(matches!(
            backend.decide("Anything").await,
            Err(BackendError::Parse(_))
        ));
    }

    #[tokio::test]
    async fn test_unauthorized_status() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/chat/completions")
            .with_status(401)
            .create_async()
            .await;

        let backend = backend_for(&server.url(), Some("sk-bad"));
        assert_eq!(backend.decide("Anything").await, Err(BackendError::Status(401)));
    }

    #[test]
    fn test_debug_hides_api_key() {
        let backend = backend_for("https://api.openai.com/v1", Some("sk-secret"));
        let rendered = format!("{:?}", backend);
        assert!(!rendered.contains("sk-secret"));
        assert!(rendered.contains("has_api_key: true"));
    }
}
