//! Outcome of classifying a single affiliation string.

use std::fmt;

/// Why the classifier reached its verdict
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecisionReason {
    /// Affiliation was empty or blank
    MissingAffiliation,
    /// A company keyword matched (carries the keyword)
    CompanyKeyword(&'static str),
    /// An academic keyword matched (carries the keyword)
    AcademicKeyword(&'static str),
    /// No keyword matched; the external backend decided
    Model,
    /// No keyword matched and the backend failed; defaulted to academic
    BackendFailed(String),
}

impl fmt::Display for DecisionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecisionReason::MissingAffiliation => write!(f, "missing affiliation"),
            DecisionReason::CompanyKeyword(kw) => write!(f, "company keyword '{}'", kw),
            DecisionReason::AcademicKeyword(kw) => write!(f, "academic keyword '{}'", kw),
            DecisionReason::Model => write!(f, "model decision"),
            DecisionReason::BackendFailed(msg) => write!(f, "backend failed: {}", msg),
        }
    }
}

/// Verdict for one affiliation together with the path that produced it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    /// True when the affiliation is considered industry / non-academic
    pub industry: bool,

    /// Decision path taken
    pub reason: DecisionReason,
}

impl Classification {
    pub fn industry(reason: DecisionReason) -> Self {
        Self {
            industry: true,
            reason,
        }
    }

    pub fn academic(reason: DecisionReason) -> Self {
        Self {
            industry: false,
            reason,
        }
    }

    /// Whether the verdict came from the fallback default rather than evidence
    pub fn is_defaulted(&self) -> bool {
        matches!(self.reason, DecisionReason::BackendFailed(_))
    }
}
