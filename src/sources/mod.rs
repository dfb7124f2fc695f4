//! Article sources that supply records to the filter.
//!
//! A source turns a search term into fully populated [`Article`] records
//! (title, date, ordered authors with affiliations). Retrieval concerns such as
//! URL construction and XML parsing live entirely behind the [`ArticleSource`]
//! trait.

pub mod mock;
mod pubmed;

pub use mock::MockSource;
pub use pubmed::{extract_email, PubMedSource};

use async_trait::async_trait;

use crate::models::Article;

/// Search parameters for an article source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleQuery {
    /// Search term in the source's query syntax
    pub term: String,

    /// Maximum number of articles to retrieve
    pub max_results: usize,
}

impl ArticleQuery {
    pub fn new(term: impl Into<String>) -> Self {
        Self {
            term: term.into(),
            max_results: 20,
        }
    }

    pub fn max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }
}

/// A provider of article metadata
#[async_trait]
pub trait ArticleSource: Send + Sync + std::fmt::Debug {
    /// Unique identifier for this source
    fn id(&self) -> &str;

    /// Retrieve the articles matching `query`
    async fn fetch(&self, query: &ArticleQuery) -> Result<Vec<Article>, SourceError>;
}

/// Errors that can occur when retrieving articles
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// Network or HTTP error
    #[error("Network error: {0}")]
    Network(String),

    /// Parsing error (XML)
    #[error("Parse error: {0}")]
    Parse(String),

    /// Invalid request parameters
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// API error from the source
    #[error("API error: {0}")]
    Api(String),
}

impl From<reqwest::Error> for SourceError {
    fn from(err: reqwest::Error) -> Self {
        SourceError::Network(err.to_string())
    }
}

impl From<quick_xml::Error> for SourceError {
    fn from(err: quick_xml::Error) -> Self {
        SourceError::Parse(format!("Malformed PubMed XML: {}", err))
    }
}
