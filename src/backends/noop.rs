//! Backend that never consults a model.

use async_trait::async_trait;

use super::{AffiliationBackend, BackendError};

/// Treats every ambiguous affiliation as academic
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpBackend;

#[async_trait]
impl AffiliationBackend for NoOpBackend {
    fn id(&self) -> &str {
        "none"
    }

    async fn decide(&self, _affiliation: &str) -> Result<bool, BackendError> {
        Ok(false)
    }
}
