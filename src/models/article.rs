//! Article and author records as delivered by an article source.

use serde::{Deserialize, Serialize};

/// A single author entry on an article
///
/// Any of the string fields may be empty; an empty affiliation is treated as
/// academic by the classifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    /// Display name ("ForeName LastName" or a collective name)
    pub name: String,

    /// Free-text institutional affiliation
    #[serde(default)]
    pub affiliation: String,

    /// Contact email, usually extracted from the affiliation text
    #[serde(default)]
    pub email: String,
}

impl Author {
    /// Create a new author
    pub fn new(
        name: impl Into<String>,
        affiliation: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            affiliation: affiliation.into(),
            email: email.into(),
        }
    }

    /// Whether the author carries any non-blank affiliation text
    pub fn has_affiliation(&self) -> bool {
        !self.affiliation.trim().is_empty()
    }
}

/// An article with its ordered author list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    /// PubMed identifier
    pub pmid: String,

    /// Article title
    pub title: String,

    /// Publication date as reported by the source ("Unknown" when absent)
    pub publication_date: String,

    /// Authors in byline order
    #[serde(default)]
    pub authors: Vec<Author>,
}

impl Article {
    /// Create an article with no authors
    pub fn new(
        pmid: impl Into<String>,
        title: impl Into<String>,
        publication_date: impl Into<String>,
    ) -> Self {
        Self {
            pmid: pmid.into(),
            title: title.into(),
            publication_date: publication_date.into(),
            authors: Vec::new(),
        }
    }

    /// Append a single author
    pub fn with_author(mut self, author: Author) -> Self {
        self.authors.push(author);
        self
    }

    /// Replace the author list
    pub fn authors(mut self, authors: Vec<Author>) -> Self {
        self.authors = authors;
        self
    }
}
