//! Configuration management.
//!
//! Settings are layered: built-in defaults, then an optional TOML file, then
//! environment variables prefixed with `PUBMED_FILTER_` (nested keys use `__`,
//! e.g. `PUBMED_FILTER_CLASSIFIER__BACKEND=openai`). Command-line flags are
//! applied on top by the binary.
//!
//! # Configuration File Format
//!
//! ```toml
//! [pubmed]
//! base_url = "https://eutils.ncbi.nlm.nih.gov/entrez/eutils"
//! max_results = 20
//! email = "you@example.org"
//!
//! [classifier]
//! backend = "ollama"          # ollama | openai | huggingface | none
//! timeout_secs = 30
//! concurrency = 1
//!
//! [classifier.ollama]
//! endpoint = "http://localhost:11434"
//! model = "gemma3"
//!
//! [classifier.openai]
//! base_url = "https://api.openai.com/v1"
//! model = "gpt-3.5-turbo"
//!
//! [classifier.huggingface]
//! api_url = "https://api-inference.huggingface.co/models/MoritzLaurer/DeBERTa-v3-base-mnli-fever-anli"
//!
//! [logging]
//! level = "info"
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable prefix for configuration overrides
pub const ENV_PREFIX: &str = "PUBMED_FILTER";

/// File name looked up in the working directory
pub const LOCAL_CONFIG_FILE: &str = "pubmed-industry-filter.toml";

const REDACTED: &str = "***";

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// PubMed E-utilities settings
    #[serde(default)]
    pub pubmed: PubMedConfig,

    /// Affiliation classifier settings
    #[serde(default)]
    pub classifier: ClassifierConfig,

    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// PubMed E-utilities configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PubMedConfig {
    /// Base URL of the E-utilities service
    #[serde(default = "default_pubmed_base_url")]
    pub base_url: String,

    /// Number of IDs requested from esearch
    #[serde(default = "default_max_results")]
    pub max_results: usize,

    /// Contact email sent with each request, as NCBI recommends
    #[serde(default)]
    pub email: Option<String>,

    /// NCBI API key for higher rate limits
    #[serde(default)]
    pub api_key: Option<String>,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for PubMedConfig {
    fn default() -> Self {
        Self {
            base_url: default_pubmed_base_url(),
            max_results: default_max_results(),
            email: None,
            api_key: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl PubMedConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn default_pubmed_base_url() -> String {
    "https://eutils.ncbi.nlm.nih.gov/entrez/eutils".to_string()
}

fn default_max_results() -> usize {
    20
}

fn default_timeout_secs() -> u64 {
    30
}

/// Which external classifier handles ambiguous affiliations
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Local Ollama inference server
    #[default]
    Ollama,
    /// OpenAI chat completions API
    OpenAi,
    /// Hugging Face zero-shot classification API
    HuggingFace,
    /// No model; ambiguous affiliations are academic
    None,
}

impl BackendKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendKind::Ollama => "ollama",
            BackendKind::OpenAi => "openai",
            BackendKind::HuggingFace => "huggingface",
            BackendKind::None => "none",
        }
    }
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classifier configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierConfig {
    /// Active backend
    #[serde(default)]
    pub backend: BackendKind,

    /// Per-request timeout for backend calls, in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Maximum in-flight classification calls
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    #[serde(default)]
    pub ollama: OllamaConfig,

    #[serde(default)]
    pub openai: OpenAiConfig,

    #[serde(default)]
    pub huggingface: HuggingFaceConfig,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::default(),
            timeout_secs: default_timeout_secs(),
            concurrency: default_concurrency(),
            ollama: OllamaConfig::default(),
            openai: OpenAiConfig::default(),
            huggingface: HuggingFaceConfig::default(),
        }
    }
}

impl ClassifierConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn default_concurrency() -> usize {
    1
}

/// Ollama backend configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OllamaConfig {
    #[serde(default = "default_ollama_endpoint")]
    pub endpoint: String,

    #[serde(default = "default_ollama_model")]
    pub model: String,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            endpoint: default_ollama_endpoint(),
            model: default_ollama_model(),
        }
    }
}

fn default_ollama_endpoint() -> String {
    "http://localhost:11434".to_string()
}

fn default_ollama_model() -> String {
    "gemma3".to_string()
}

/// OpenAI backend configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAiConfig {
    #[serde(default = "default_openai_base_url")]
    pub base_url: String,

    #[serde(default = "default_openai_model")]
    pub model: String,

    /// Falls back to `OPENAI_API_KEY`
    #[serde(default)]
    pub api_key: Option<String>,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            base_url: default_openai_base_url(),
            model: default_openai_model(),
            api_key: None,
        }
    }
}

fn default_openai_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_openai_model() -> String {
    "gpt-3.5-turbo".to_string()
}

/// Hugging Face backend configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HuggingFaceConfig {
    /// Full inference URL of a zero-shot classification model
    #[serde(default = "default_huggingface_api_url")]
    pub api_url: String,

    /// Falls back to `HF_API_TOKEN`
    #[serde(default)]
    pub api_token: Option<String>,
}

impl Default for HuggingFaceConfig {
    fn default() -> Self {
        Self {
            api_url: default_huggingface_api_url(),
            api_token: None,
        }
    }
}

fn default_huggingface_api_url() -> String {
    "https://api-inference.huggingface.co/models/MoritzLaurer/DeBERTa-v3-base-mnli-fever-anli"
        .to_string()
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Fill unset credentials from their conventional environment variables
    pub fn apply_env_fallbacks(&mut self) {
        self.apply_fallbacks_from(|var| std::env::var(var).ok());
    }

    fn apply_fallbacks_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        for (slot, var) in [
            (&mut self.classifier.openai.api_key, "OPENAI_API_KEY"),
            (&mut self.classifier.huggingface.api_token, "HF_API_TOKEN"),
            (&mut self.pubmed.api_key, "NCBI_API_KEY"),
            (&mut self.pubmed.email, "NCBI_EMAIL"),
        ] {
            if slot.is_none() {
                *slot = lookup(var).filter(|v| !v.is_empty());
            }
        }
    }

    /// Render as TOML with credentials masked
    pub fn to_redacted_toml(&self) -> Result<String, ConfigError> {
        let mut shown = self.clone();
        for secret in [
            &mut shown.classifier.openai.api_key,
            &mut shown.classifier.huggingface.api_token,
            &mut shown.pubmed.api_key,
        ] {
            if secret.is_some() {
                *secret = Some(REDACTED.to_string());
            }
        }
        toml::to_string_pretty(&shown).map_err(|e| ConfigError::Serialize(e.to_string()))
    }
}

/// Load configuration from an optional file plus environment overrides
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    let mut config = load_layers(path, None)?;
    config.apply_env_fallbacks();
    Ok(config)
}

/// File then `PUBMED_FILTER_*` variables; `env` replaces the process environment
fn load_layers(
    path: Option<&Path>,
    env: Option<config::Map<String, String>>,
) -> Result<Config, ConfigError> {
    let mut builder = config::Config::builder();
    if let Some(path) = path {
        builder = builder.add_source(config::File::from(path));
    }

    let settings = builder
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true)
                .source(env),
        )
        .build()?;

    Ok(settings.try_deserialize()?)
}

/// Find a configuration file in the working directory or the user config dir
pub fn find_config_file() -> Option<PathBuf> {
    let local = PathBuf::from(LOCAL_CONFIG_FILE);
    if local.is_file() {
        return Some(local);
    }

    dirs::config_dir()
        .map(|dir| dir.join("pubmed-industry-filter").join("config.toml"))
        .filter(|path| path.is_file())
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Serialize error: {0}")]
    Serialize(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.pubmed.max_results, 20);
        assert_eq!(config.classifier.backend, BackendKind::Ollama);
        assert_eq!(config.classifier.timeout_secs, 30);
        assert_eq!(config.classifier.concurrency, 1);
        assert_eq!(config.classifier.ollama.model, "gemma3");
        assert_eq!(config.classifier.openai.model, "gpt-3.5-turbo");
    }

    #[test]
    fn test_config_file_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let toml_content = r#"
[pubmed]
max_results = 50
email = "lab@example.org"

[classifier]
backend = "huggingface"
timeout_secs = 5
concurrency = 4

[classifier.ollama]
model = "llama3"

[classifier.huggingface]
api_token = "hf-test"

[logging]
level = "debug"
"#;

        let mut file = File::create(&path).unwrap();
        file.write_all(toml_content.as_bytes()).unwrap();

        let config = load_config(Some(path.as_path())).unwrap();

        assert_eq!(config.pubmed.max_results, 50);
        assert_eq!(config.pubmed.email.as_deref(), Some("lab@example.org"));
        assert_eq!(config.classifier.backend, BackendKind::HuggingFace);
        assert_eq!(config.classifier.timeout(), Duration::from_secs(5));
        assert_eq!(config.classifier.concurrency, 4);
        assert_eq!(config.classifier.ollama.model, "llama3");
        assert_eq!(config.classifier.ollama.endpoint, "http://localhost:11434");
        assert_eq!(
            config.classifier.huggingface.api_token.as_deref(),
            Some("hf-test")
        );
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_config_file_nonexistent() {
        let path = PathBuf::from("/nonexistent/config.toml");
        assert!(load_config(Some(path.as_path())).is_err());
    }

    #[test]
    fn test_config_file_unknown_backend() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "[classifier]\nbackend = \"gpt-9\"\n").unwrap();

        assert!(load_config(Some(path.as_path())).is_err());
    }

    #[test]
    fn test_env_layer_overrides_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[classifier]\nbackend = \"ollama\"\nconcurrency = 2\n").unwrap();

        let env = config::Map::from_iter([
            ("PUBMED_FILTER_CLASSIFIER__BACKEND".to_string(), "openai".to_string()),
            ("PUBMED_FILTER_CLASSIFIER__OLLAMA__MODEL".to_string(), "llama3".to_string()),
            ("PUBMED_FILTER_PUBMED__MAX_RESULTS".to_string(), "75".to_string()),
            ("UNRELATED_VAR".to_string(), "ignored".to_string()),
        ]);
        let config = load_layers(Some(path.as_path()), Some(env)).unwrap();

        assert_eq!(config.classifier.backend, BackendKind::OpenAi);
        assert_eq!(config.classifier.concurrency, 2);
        assert_eq!(config.classifier.ollama.model, "llama3");
        assert_eq!(config.pubmed.max_results, 75);
    }

    #[test]
    fn test_credential_fallbacks_fill_only_unset_values() {
        let mut config = Config::default();
        config.classifier.openai.api_key = Some("from-file".to_string());

        config.apply_fallbacks_from(|var| match var {
            "OPENAI_API_KEY" => Some("sk-env".to_string()),
            "HF_API_TOKEN" => Some("hf-env".to_string()),
            "NCBI_EMAIL" => Some(String::new()),
            _ => None,
        });

        assert_eq!(config.classifier.openai.api_key.as_deref(), Some("from-file"));
        assert_eq!(config.classifier.huggingface.api_token.as_deref(), Some("hf-env"));
        assert_eq!(config.pubmed.api_key, None);
        assert_eq!(config.pubmed.email, None);
    }

    #[test]
    fn test_redacted_toml_masks_secrets() {
        let mut config = Config::default();
        config.classifier.openai.api_key = Some("sk-very-secret".to_string());

        let rendered = config.to_redacted_toml().unwrap();
        assert!(!rendered.contains("sk-very-secret"));
        assert!(rendered.contains(REDACTED));
        assert!(rendered.contains("backend = \"ollama\""));
    }
}
