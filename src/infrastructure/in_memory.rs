use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::domain::{
    errors::PerceptorError,
    perceptor::{
        CodeLabel, Manager, NewPerceptor, Perceptor, PerceptorId, PerceptorPatch, PerceptorStatus,
        SearchCriteria,
    },
};

use super::{CatalogService, ManagerDirectory, PerceptorRepository};

/// First code handed out by the in-memory sequence. The counter only moves
/// forward, so codes are never reused even after deactivation.
const FIRST_CODE: u32 = 1001;

pub struct InMemoryPerceptorRepository {
    perceptors: RwLock<HashMap<(String, u32), Perceptor>>,
    next_code: AtomicU32,
}

impl InMemoryPerceptorRepository {
    pub fn new() -> Self {
        Self {
            perceptors: RwLock::new(HashMap::new()),
            next_code: AtomicU32::new(FIRST_CODE),
        }
    }

    fn key(id: &PerceptorId) -> Option<(String, u32)> {
        id.code.map(|code| (id.category.clone(), code))
    }
}

impl Default for InMemoryPerceptorRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PerceptorRepository for InMemoryPerceptorRepository {
    async fn create(&self, draft: NewPerceptor) -> Result<Perceptor, PerceptorError> {
        let code = self.next_code.fetch_add(1, Ordering::SeqCst);
        let now = Utc::now();
        let created = Perceptor {
            id: PerceptorId::new(draft.category.clone(), Some(code)),
            name: draft.name,
            priority_code: draft.priority_code,
            specialty_code: draft.specialty_code,
            activity_code: draft.activity_code,
            line_code: draft.line_code,
            manager: draft.manager,
            notes: draft.notes,
            status: PerceptorStatus::Active,
            version: 1,
            created_at: now,
            updated_at: now,
        };

        self.perceptors
            .write()
            .await
            .insert((draft.category, code), created.clone());

        Ok(created)
    }

    async fn find_by_id(&self, id: &PerceptorId) -> Result<Option<Perceptor>, PerceptorError> {
        let Some(key) = Self::key(id) else {
            return Ok(None);
        };
        Ok(self.perceptors.read().await.get(&key).cloned())
    }

    async fn search(&self, criteria: SearchCriteria) -> Result<Vec<Perceptor>, PerceptorError> {
        let mut items = self
            .perceptors
            .read()
            .await
            .values()
            .filter(|item| item.id.category == criteria.category)
            .cloned()
            .collect::<Vec<_>>();

        if let Some(manager) = &criteria.manager {
            items.retain(|item| item.manager.as_deref() == Some(manager.as_str()));
        }
        if let Some(name_contains) = &criteria.name_contains {
            let needle = name_contains.to_lowercase();
            items.retain(|item| item.name.to_lowercase().contains(&needle));
        }
        if let Some(code) = criteria.code {
            items.retain(|item| item.id.code == Some(code));
        }
        if let Some(status) = criteria.status {
            items.retain(|item| item.status == status);
        }

        items.sort_by_key(|item| item.id.code);
        Ok(items)
    }

    async fn update(
        &self,
        id: &PerceptorId,
        patch: PerceptorPatch,
        expected_version: i64,
    ) -> Result<Option<Perceptor>, PerceptorError> {
        let Some(key) = Self::key(id) else {
            return Ok(None);
        };

        let mut perceptors = self.perceptors.write().await;
        let Some(perceptor) = perceptors.get_mut(&key) else {
            return Ok(None);
        };

        if perceptor.version != expected_version {
            return Err(PerceptorError::conflict(format!(
                "perceptor {} is at version {}, caller expected {}",
                perceptor.id, perceptor.version, expected_version
            )));
        }

        perceptor.name = patch.name;
        perceptor.priority_code = patch.priority_code;
        perceptor.specialty_code = patch.specialty_code;
        perceptor.activity_code = patch.activity_code;
        perceptor.line_code = patch.line_code;
        perceptor.manager = patch.manager;
        perceptor.notes = patch.notes;
        perceptor.version += 1;
        perceptor.updated_at = Utc::now();

        Ok(Some(perceptor.clone()))
    }

    async fn set_status(
        &self,
        id: &PerceptorId,
        status: PerceptorStatus,
        expected_version: i64,
    ) -> Result<Option<Perceptor>, PerceptorError> {
        let Some(key) = Self::key(id) else {
            return Ok(None);
        };

        let mut perceptors = self.perceptors.write().await;
        let Some(perceptor) = perceptors.get_mut(&key) else {
            return Ok(None);
        };

        if perceptor.version != expected_version {
            return Err(PerceptorError::conflict(format!(
                "perceptor {} is at version {}, caller expected {}",
                perceptor.id, perceptor.version, expected_version
            )));
        }

        perceptor.status = status;
        perceptor.version += 1;
        perceptor.updated_at = Utc::now();

        Ok(Some(perceptor.clone()))
    }
}

#[derive(Default)]
pub struct InMemoryCatalog {
    catalogs: HashMap<String, Vec<CodeLabel>>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_catalog(
        mut self,
        key: impl Into<String>,
        entries: Vec<CodeLabel>,
    ) -> Self {
        self.catalogs.insert(key.into(), entries);
        self
    }
}

#[async_trait]
impl CatalogService for InMemoryCatalog {
    async fn codes_for(&self, key: &str) -> Result<Vec<CodeLabel>, PerceptorError> {
        self.catalogs
            .get(key)
            .cloned()
            .ok_or_else(|| PerceptorError::CatalogNotFound(key.to_string()))
    }
}

#[derive(Default)]
pub struct InMemoryManagerDirectory {
    managers: HashMap<String, Manager>,
    assignments: HashMap<String, String>,
}

impl InMemoryManagerDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_manager(mut self, manager: Manager) -> Self {
        self.managers.insert(manager.id.clone(), manager);
        self
    }

    /// Binds a user account to one of the registered managers.
    pub fn with_assignment(
        mut self,
        user_id: impl Into<String>,
        manager_id: impl Into<String>,
    ) -> Self {
        self.assignments.insert(user_id.into(), manager_id.into());
        self
    }
}

#[async_trait]
impl ManagerDirectory for InMemoryManagerDirectory {
    async fn manager_for_user(&self, user_id: &str) -> Result<Option<Manager>, PerceptorError> {
        let Some(manager_id) = self.assignments.get(user_id) else {
            return Ok(None);
        };
        Ok(self.managers.get(manager_id).cloned())
    }

    async fn find(&self, manager_id: &str) -> Result<Option<Manager>, PerceptorError> {
        Ok(self.managers.get(manager_id).cloned())
    }
}
