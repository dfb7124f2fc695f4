//! Scripted backend for testing purposes.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use super::{AffiliationBackend, BackendError};

/// A backend that returns predefined verdicts and records every call.
#[derive(Debug)]
pub struct MockBackend {
    default: Result<bool, BackendError>,
    verdicts: HashMap<String, Result<bool, BackendError>>,
    delays: HashMap<String, Duration>,
    calls: Mutex<Vec<String>>,
}

impl MockBackend {
    /// A backend that answers `industry` for every affiliation.
    pub fn returning(industry: bool) -> Self {
        Self::with_default(Ok(industry))
    }

    /// A backend that fails every call with `error`.
    pub fn failing(error: BackendError) -> Self {
        Self::with_default(Err(error))
    }

    fn with_default(default: Result<bool, BackendError>) -> Self {
        Self {
            default,
            verdicts: HashMap::new(),
            delays: HashMap::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Override the answer for one affiliation string.
    pub fn with_verdict(
        mut self,
        affiliation: impl Into<String>,
        verdict: Result<bool, BackendError>,
    ) -> Self {
        self.verdicts.insert(affiliation.into(), verdict);
        self
    }

    /// Delay the answer for one affiliation string.
    pub fn with_delay(mut self, affiliation: impl Into<String>, delay: Duration) -> Self {
        self.delays.insert(affiliation.into(), delay);
        self
    }

    /// Affiliations passed to `decide`, in call order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl AffiliationBackend for MockBackend {
    fn id(&self) -> &str {
        "mock"
    }

    async fn decide(&self, affiliation: &str) -> Result<bool, BackendError> {
        self.calls.lock().unwrap().push(affiliation.to_string());

        if let Some(delay) = self.delays.get(affiliation) {
            tokio::time::sleep(*delay).await;
        }

        self.verdicts
            .get(affiliation)
            .unwrap_or(&self.default)
            .clone()
    }
}
