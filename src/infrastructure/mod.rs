use async_trait::async_trait;

use crate::domain::{
    errors::PerceptorError,
    perceptor::{
        CodeLabel, Manager, NewPerceptor, Perceptor, PerceptorId, PerceptorPatch, PerceptorStatus,
        SearchCriteria,
    },
};

pub mod in_memory;

/// Persistence collaborator. `create` assigns the entity code; the mutating
/// calls take the version the caller resolved and return `Ok(None)` when the
/// id does not exist.
#[async_trait]
pub trait PerceptorRepository: Send + Sync {
    async fn create(&self, draft: NewPerceptor) -> Result<Perceptor, PerceptorError>;
    async fn find_by_id(&self, id: &PerceptorId) -> Result<Option<Perceptor>, PerceptorError>;
    async fn search(&self, criteria: SearchCriteria) -> Result<Vec<Perceptor>, PerceptorError>;
    async fn update(
        &self,
        id: &PerceptorId,
        patch: PerceptorPatch,
        expected_version: i64,
    ) -> Result<Option<Perceptor>, PerceptorError>;
    async fn set_status(
        &self,
        id: &PerceptorId,
        status: PerceptorStatus,
        expected_version: i64,
    ) -> Result<Option<Perceptor>, PerceptorError>;
}

/// Reference-data collaborator supplying code/label pairs for dropdown-style
/// fields. Unknown keys fail with `CatalogNotFound`.
#[async_trait]
pub trait CatalogService: Send + Sync {
    async fn codes_for(&self, key: &str) -> Result<Vec<CodeLabel>, PerceptorError>;
}

/// Directory of staff managers, used both to scope non-administrator callers
/// and to resolve manager references during business validation.
#[async_trait]
pub trait ManagerDirectory: Send + Sync {
    async fn manager_for_user(&self, user_id: &str) -> Result<Option<Manager>, PerceptorError>;
    async fn find(&self, manager_id: &str) -> Result<Option<Manager>, PerceptorError>;
}
