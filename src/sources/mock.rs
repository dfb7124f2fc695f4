//! Mock source for testing purposes.

use async_trait::async_trait;

use crate::models::Article;
use crate::sources::{ArticleQuery, ArticleSource, SourceError};

/// A mock source that returns predefined articles.
#[derive(Debug, Default)]
pub struct MockSource {
    articles: Vec<Article>,
}

impl MockSource {
    /// Create a mock source returning `articles`.
    pub fn new(articles: Vec<Article>) -> Self {
        Self { articles }
    }
}

#[async_trait]
impl ArticleSource for MockSource {
    fn id(&self) -> &str {
        "mock"
    }

    async fn fetch(&self, query: &ArticleQuery) -> Result<Vec<Article>, SourceError> {
        Ok(self.articles.iter().take(query.max_results).cloned().collect())
    }
}
