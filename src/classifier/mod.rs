//! Affiliation classifier: keyword rules first, model fallback last.
//!
//! The cascade for one affiliation string:
//!
//! 1. empty or blank text is academic;
//! 2. any company keyword makes it industry;
//! 3. any academic keyword makes it academic;
//! 4. otherwise the configured [`AffiliationBackend`] decides, and a backend
//!    failure is academic.
//!
//! A string containing both kinds of keyword is industry, because company
//! keywords are checked first.

mod keywords;

pub use keywords::{first_match, ACADEMIC_KEYWORDS, COMPANY_KEYWORDS};

use std::sync::Arc;

use crate::backends::AffiliationBackend;
use crate::models::{Classification, DecisionReason};

/// Decides whether an affiliation is academic or industry
#[derive(Debug, Clone)]
pub struct AffiliationClassifier {
    backend: Arc<dyn AffiliationBackend>,
}

impl AffiliationClassifier {
    pub fn new(backend: Arc<dyn AffiliationBackend>) -> Self {
        Self { backend }
    }

    /// Apply only the deterministic tiers; `None` means the text is ambiguous
    pub fn classify_rules(affiliation: &str) -> Option<Classification> {
        if affiliation.trim().is_empty() {
            return Some(Classification::academic(DecisionReason::MissingAffiliation));
        }

        let text = affiliation.to_lowercase();

        if let Some(kw) = first_match(&text, COMPANY_KEYWORDS) {
            return Some(Classification::industry(DecisionReason::CompanyKeyword(kw)));
        }

        if let Some(kw) = first_match(&text, ACADEMIC_KEYWORDS) {
            return Some(Classification::academic(DecisionReason::AcademicKeyword(kw)));
        }

        None
    }

    /// Run the full cascade and report the decision path
    pub async fn classify_detailed(&self, affiliation: &str) -> Classification {
        if let Some(decided) = Self::classify_rules(affiliation) {
            tracing::trace!(%affiliation, reason = %decided.reason, "Affiliation decided by rules");
            return decided;
        }

        tracing::debug!(%affiliation, backend = self.backend.id(), "Ambiguous affiliation, asking backend");
        match self.backend.decide(affiliation).await {
            Ok(industry) => Classification {
                industry,
                reason: DecisionReason::Model,
            },
            Err(e) => {
                tracing::warn!(%affiliation, backend = self.backend.id(), error = %e, "Classifier backend failed, defaulting to academic");
                Classification::academic(DecisionReason::BackendFailed(e.to_string()))
            }
        }
    }

    /// True when `affiliation` is an industry (non-academic) affiliation
    pub async fn classify(&self, affiliation: &str) -> bool {
        self.classify_detailed(affiliation).await.industry
    }
}
