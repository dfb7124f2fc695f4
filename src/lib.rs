//! # PubMed Industry Filter
//!
//! Fetches article metadata from PubMed and reports the articles that have at
//! least one author affiliated with a company rather than an academic
//! institution.
//!
//! ## Architecture
//!
//! - [`classifier`]: keyword cascade deciding academic vs. industry per affiliation
//! - [`backends`]: model backends consulted when the keyword rules are inconclusive
//! - [`filter`]: applies the classifier across articles and builds report rows
//! - [`sources`]: article retrieval (PubMed E-utilities)
//! - [`report`]: CSV and console output
//! - [`models`]: Article, Author, ReportRow and classification types
//! - [`config`]: layered configuration
//! - [`utils`]: HTTP client

pub mod backends;
pub mod classifier;
pub mod config;
pub mod filter;
pub mod models;
pub mod report;
pub mod sources;
pub mod utils;

// Re-export commonly used types
pub use backends::{build_backend, AffiliationBackend, BackendError};
pub use classifier::AffiliationClassifier;
pub use filter::ArticleFilter;
pub use models::{Article, Author, Classification, DecisionReason, ReportRow};
pub use sources::{ArticleQuery, ArticleSource, PubMedSource};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
