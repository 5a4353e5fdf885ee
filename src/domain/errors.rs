use thiserror::Error;

use super::perceptor::PerceptorId;
use super::report::ValidationReport;

#[derive(Debug, Error)]
pub enum PerceptorError {
    /// Structural or business validation rejected the payload. Carries the
    /// full report; callers surface every violated field, never just the
    /// first one.
    #[error("validation failed: {0}")]
    Validation(ValidationReport),
    #[error("perceptor {0} does not exist")]
    NotFound(PerceptorId),
    #[error("perceptor {0} is outside the caller's permission scope")]
    Forbidden(PerceptorId),
    /// The version stamp the caller read no longer matches the stored entity.
    #[error("version conflict: {0}")]
    Conflict(String),
    /// The reference-data collaborator does not know the requested catalog.
    #[error("catalog '{0}' does not exist")]
    CatalogNotFound(String),
    /// Transport or persistence failure in a collaborator; fatal for the
    /// request, never retried here.
    #[error("collaborator unavailable: {0}")]
    Unavailable(String),
}

impl PerceptorError {
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable(message.into())
    }
}
