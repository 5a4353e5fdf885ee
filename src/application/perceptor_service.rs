use std::sync::Arc;

use tracing::{debug, error};

use crate::domain::{
    errors::PerceptorError,
    perceptor::{CATEGORY_HOSPITAL, CallerContext, CodeLabel, Perceptor, PerceptorId, PerceptorStatus},
    report::ValidationReport,
};
use crate::infrastructure::{CatalogService, ManagerDirectory, PerceptorRepository};

use super::dto::{
    ConfirmationResponse, FormAction, HospitalForm, HospitalFormView, ListFormView,
    PerceptorResponse, SearchForm, SearchResultsView,
};
use super::validation::{ValidationPipeline, validate_search_criteria};
use super::{CATALOG_ACTIVITY, CATALOG_LINE, CATALOG_PRIORITY, CATALOG_SITUATION, CATALOG_SPECIALTY};

const MSG_CREATED: &str = "The perceptor has been created successfully";
const MSG_UPDATED: &str = "The hospital has been updated successfully";
const MSG_DEACTIVATED: &str = "The hospital has been deactivated successfully";
const MSG_SEIZED: &str = "The hospital has been seized successfully";
const MSG_REACTIVATED: &str = "The hospital has been reactivated successfully";

/// Lifecycle manager and search component for hospital perceptors. Owns the
/// status field: every transition goes through the shared resolve/authorize
/// step before anything is mutated, and validation runs before any mutating
/// operation reaches the repository.
pub struct PerceptorService {
    repository: Arc<dyn PerceptorRepository>,
    catalog: Arc<dyn CatalogService>,
    managers: Arc<dyn ManagerDirectory>,
    pipeline: ValidationPipeline,
}

impl PerceptorService {
    pub fn new(
        repository: Arc<dyn PerceptorRepository>,
        catalog: Arc<dyn CatalogService>,
        managers: Arc<dyn ManagerDirectory>,
    ) -> Self {
        let pipeline = ValidationPipeline::new(catalog.clone(), managers.clone());
        Self {
            repository,
            catalog,
            managers,
            pipeline,
        }
    }

    /// Search home: an empty criteria form, prefiltered to the caller's own
    /// manager when the caller is not an administrator. A failed manager
    /// lookup is logged and the filter left empty rather than failing the
    /// request.
    pub async fn list_form(&self, ctx: &CallerContext) -> Result<ListFormView, PerceptorError> {
        let mut search = SearchForm::default();

        if !ctx.is_admin {
            match self.managers.manager_for_user(&ctx.user_id).await {
                Ok(Some(manager)) => search.manager = Some(manager.id),
                Ok(None) => debug!(user = %ctx.user_id, "caller has no manager assignment"),
                Err(err) => error!(user = %ctx.user_id, error = %err, "manager lookup failed"),
            }
        }

        Ok(ListFormView {
            search,
            priorities: self.load_catalog(CATALOG_PRIORITY).await?,
            situations: self.load_catalog(CATALOG_SITUATION).await?,
        })
    }

    /// Check-only validation of search criteria: structural phase only, no
    /// search executed, no collaborator touched.
    pub fn search_check_only(&self, form: &SearchForm) -> ValidationReport {
        validate_search_criteria(form)
    }

    /// Criteria search. The category discriminator is force-set to the
    /// hospital category whatever the raw payload carried.
    pub async fn search(&self, form: SearchForm) -> Result<SearchResultsView, PerceptorError> {
        let report = validate_search_criteria(&form);
        if !report.is_empty() {
            return Err(PerceptorError::Validation(report));
        }

        let criteria = form.into_criteria(CATEGORY_HOSPITAL);
        let perceptors = self
            .repository
            .search(criteria)
            .await?
            .into_iter()
            .map(PerceptorResponse::from)
            .collect();

        Ok(SearchResultsView { perceptors })
    }

    /// Empty detail form for the create path, with its catalogs.
    pub async fn new_form(&self) -> Result<HospitalFormView, PerceptorError> {
        self.form_view(HospitalForm::empty(), FormAction::New).await
    }

    /// Check-only validation of a hospital form, for live client feedback.
    pub async fn check_hospital(
        &self,
        form: &HospitalForm,
    ) -> Result<ValidationReport, PerceptorError> {
        self.pipeline.check_only(form).await
    }

    /// Creates a new hospital in `Active` state. The repository assigns the
    /// code; a previously used code is never handed out again.
    pub async fn create(
        &self,
        _ctx: &CallerContext,
        form: HospitalForm,
    ) -> Result<ConfirmationResponse, PerceptorError> {
        self.pipeline.submit(&form).await?;

        let created = self.repository.create(form.into_draft()).await?;
        Ok(confirmation(created, MSG_CREATED))
    }

    /// Read-for-edit: the permission check runs here too, before the form is
    /// ever shown.
    pub async fn edit_form(
        &self,
        ctx: &CallerContext,
        id: PerceptorId,
    ) -> Result<HospitalFormView, PerceptorError> {
        let perceptor = self.resolve(ctx, &id).await?;
        self.form_view(HospitalForm::from_entity(&perceptor), FormAction::Update)
            .await
    }

    /// Overwrites the non-status fields of an existing hospital. Status is
    /// untouched; a stale version stamp fails with `Conflict`.
    pub async fn update(
        &self,
        ctx: &CallerContext,
        form: HospitalForm,
    ) -> Result<ConfirmationResponse, PerceptorError> {
        let id = form.id.clone();
        self.resolve(ctx, &id).await?;
        self.pipeline.submit(&form).await?;

        let expected_version = form.version;
        let updated = self
            .repository
            .update(&id, form.into_patch(), expected_version)
            .await?
            .ok_or(PerceptorError::NotFound(id))?;

        Ok(confirmation(updated, MSG_UPDATED))
    }

    pub async fn deactivate(
        &self,
        ctx: &CallerContext,
        id: PerceptorId,
    ) -> Result<ConfirmationResponse, PerceptorError> {
        self.transition(ctx, id, PerceptorStatus::Inactive, MSG_DEACTIVATED)
            .await
    }

    pub async fn seize(
        &self,
        ctx: &CallerContext,
        id: PerceptorId,
    ) -> Result<ConfirmationResponse, PerceptorError> {
        self.transition(ctx, id, PerceptorStatus::Seized, MSG_SEIZED)
            .await
    }

    pub async fn reactivate(
        &self,
        ctx: &CallerContext,
        id: PerceptorId,
    ) -> Result<ConfirmationResponse, PerceptorError> {
        self.transition(ctx, id, PerceptorStatus::Active, MSG_REACTIVATED)
            .await
    }

    /// Shared transition step: resolve, authorize, then move the status.
    /// Re-entry into the current state is a no-op success, preserving the
    /// source's permissive behavior (pinned by tests for deactivate).
    async fn transition(
        &self,
        ctx: &CallerContext,
        id: PerceptorId,
        target: PerceptorStatus,
        message: &str,
    ) -> Result<ConfirmationResponse, PerceptorError> {
        let current = self.resolve(ctx, &id).await?;

        if current.status == target {
            debug!(id = %id, status = %target, "status already set, nothing to do");
            return Ok(confirmation(current, message));
        }

        let updated = self
            .repository
            .set_status(&id, target, current.version)
            .await?
            .ok_or(PerceptorError::NotFound(id))?;

        Ok(confirmation(updated, message))
    }

    /// Resolve step shared by every single-entity operation: look the entity
    /// up, then check the caller's scope before anything else happens.
    async fn resolve(
        &self,
        ctx: &CallerContext,
        id: &PerceptorId,
    ) -> Result<Perceptor, PerceptorError> {
        let perceptor = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| PerceptorError::NotFound(id.clone()))?;

        self.authorize(ctx, &perceptor).await?;
        Ok(perceptor)
    }

    /// Administrators see everything; other callers only reach entities that
    /// are unassigned or owned by the manager their account resolves to.
    async fn authorize(
        &self,
        ctx: &CallerContext,
        perceptor: &Perceptor,
    ) -> Result<(), PerceptorError> {
        if ctx.is_admin {
            return Ok(());
        }

        let Some(owner) = perceptor.manager.as_deref() else {
            return Ok(());
        };

        let manager = self.managers.manager_for_user(&ctx.user_id).await?;
        match manager {
            Some(manager) if manager.id == owner => Ok(()),
            _ => Err(PerceptorError::Forbidden(perceptor.id.clone())),
        }
    }

    async fn form_view(
        &self,
        hospital: HospitalForm,
        action: FormAction,
    ) -> Result<HospitalFormView, PerceptorError> {
        Ok(HospitalFormView {
            hospital,
            action,
            priorities: self.load_catalog(CATALOG_PRIORITY).await?,
            specialties: self.load_catalog(CATALOG_SPECIALTY).await?,
            activities: self.load_catalog(CATALOG_ACTIVITY).await?,
            lines: self.load_catalog(CATALOG_LINE).await?,
        })
    }

    /// Degrade, don't abort: an unknown catalog key renders as an empty
    /// dropdown; only transport failures abort the request.
    async fn load_catalog(&self, key: &str) -> Result<Vec<CodeLabel>, PerceptorError> {
        match self.catalog.codes_for(key).await {
            Ok(codes) => Ok(codes),
            Err(PerceptorError::CatalogNotFound(key)) => {
                error!(catalog = %key, "cannot find catalog of values");
                Ok(Vec::new())
            }
            Err(other) => Err(other),
        }
    }
}

fn confirmation(perceptor: Perceptor, message: &str) -> ConfirmationResponse {
    ConfirmationResponse {
        perceptor: PerceptorResponse::from(perceptor),
        message: message.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use crate::application::{
        CATALOG_ACTIVITY, CATALOG_LINE, CATALOG_PRIORITY, CATALOG_SITUATION, CATALOG_SPECIALTY,
    };
    use crate::domain::perceptor::Manager;
    use crate::infrastructure::in_memory::{
        InMemoryCatalog, InMemoryManagerDirectory, InMemoryPerceptorRepository,
    };

    use super::*;

    fn seeded_catalog() -> InMemoryCatalog {
        InMemoryCatalog::new()
            .with_catalog(
                CATALOG_PRIORITY,
                vec![CodeLabel::new("1", "Critical"), CodeLabel::new("2", "Normal")],
            )
            .with_catalog(
                CATALOG_SITUATION,
                vec![CodeLabel::new("active", "Active"), CodeLabel::new("inactive", "Inactive")],
            )
            .with_catalog(
                CATALOG_SPECIALTY,
                vec![CodeLabel::new("CARD", "Cardiology"), CodeLabel::new("ONCO", "Oncology")],
            )
            .with_catalog(CATALOG_ACTIVITY, vec![CodeLabel::new("GEN", "General care")])
            .with_catalog(CATALOG_LINE, vec![CodeLabel::new("HLT", "Health")])
    }

    fn service() -> PerceptorService {
        service_with_directory(InMemoryManagerDirectory::new())
    }

    fn service_with_directory(directory: InMemoryManagerDirectory) -> PerceptorService {
        PerceptorService::new(
            Arc::new(InMemoryPerceptorRepository::new()),
            Arc::new(seeded_catalog()),
            Arc::new(directory),
        )
    }

    fn valid_form() -> HospitalForm {
        let mut form = HospitalForm::empty();
        form.name = "St. Mary".to_string();
        form.priority_code = "1".to_string();
        form.specialty_code = "CARD".to_string();
        form
    }

    #[tokio::test]
    async fn create_yields_active_entity_with_fresh_code() {
        let service = service();
        let ctx = CallerContext::admin("root");

        let created = service.create(&ctx, valid_form()).await.expect("create");
        assert_eq!(created.perceptor.status, PerceptorStatus::Active);
        assert_eq!(created.perceptor.id.code, Some(1001));
        assert_eq!(created.message, MSG_CREATED);

        let second = service.create(&ctx, valid_form()).await.expect("create");
        assert_eq!(second.perceptor.id.code, Some(1002));
    }

    #[tokio::test]
    async fn create_rejects_invalid_draft_without_side_effects() {
        let service = service();
        let ctx = CallerContext::admin("root");

        let mut form = valid_form();
        form.name = String::new();
        form.specialty_code = "NEURO".to_string();

        let result = service.create(&ctx, form).await;
        let Err(PerceptorError::Validation(report)) = result else {
            panic!("expected validation failure");
        };
        assert!(report.has_field("name"));
        assert!(report.has_field("specialty_code"));

        let results = service.search(SearchForm::default()).await.expect("search");
        assert!(results.perceptors.is_empty(), "nothing may be stored");
    }

    #[tokio::test]
    async fn deactivate_twice_is_an_idempotent_success() {
        let service = service();
        let ctx = CallerContext::admin("root");
        let created = service.create(&ctx, valid_form()).await.expect("create");
        let id = created.perceptor.id;

        let first = service.deactivate(&ctx, id.clone()).await.expect("deactivate");
        assert_eq!(first.perceptor.status, PerceptorStatus::Inactive);
        assert_eq!(first.message, MSG_DEACTIVATED);

        let second = service.deactivate(&ctx, id).await.expect("deactivate again");
        assert_eq!(second.perceptor.status, PerceptorStatus::Inactive);
        assert_eq!(second.message, MSG_DEACTIVATED);
    }

    #[tokio::test]
    async fn seize_then_reactivate_returns_to_active() {
        let service = service();
        let ctx = CallerContext::admin("root");
        let created = service.create(&ctx, valid_form()).await.expect("create");
        let id = created.perceptor.id;

        let seized = service.seize(&ctx, id.clone()).await.expect("seize");
        assert_eq!(seized.perceptor.status, PerceptorStatus::Seized);

        let reactivated = service.reactivate(&ctx, id).await.expect("reactivate");
        assert_eq!(reactivated.perceptor.status, PerceptorStatus::Active);
    }

    #[tokio::test]
    async fn transitions_on_unknown_id_yield_not_found() {
        let service = service();
        let ctx = CallerContext::admin("root");
        let id = PerceptorId::hospital(4242);

        assert!(matches!(
            service.deactivate(&ctx, id.clone()).await,
            Err(PerceptorError::NotFound(_))
        ));
        assert!(matches!(
            service.seize(&ctx, id.clone()).await,
            Err(PerceptorError::NotFound(_))
        ));
        assert!(matches!(
            service.reactivate(&ctx, id.clone()).await,
            Err(PerceptorError::NotFound(_))
        ));
        assert!(matches!(
            service.edit_form(&ctx, id).await,
            Err(PerceptorError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn foreign_manager_entity_is_forbidden_for_non_admin() {
        let directory = InMemoryManagerDirectory::new()
            .with_manager(Manager {
                id: "mgr-1".to_string(),
                name: "Alice".to_string(),
            })
            .with_manager(Manager {
                id: "mgr-2".to_string(),
                name: "Bob".to_string(),
            })
            .with_assignment("bob", "mgr-2");
        let service = service_with_directory(directory);

        let admin = CallerContext::admin("root");
        let mut form = valid_form();
        form.manager = Some("mgr-1".to_string());
        let created = service.create(&admin, form).await.expect("create");
        let id = created.perceptor.id;

        let bob = CallerContext::user("bob");
        assert!(matches!(
            service.deactivate(&bob, id.clone()).await,
            Err(PerceptorError::Forbidden(_))
        ));
        assert!(matches!(
            service.edit_form(&bob, id.clone()).await,
            Err(PerceptorError::Forbidden(_))
        ));

        // Administrators pass the same check.
        assert!(service.edit_form(&admin, id).await.is_ok());
    }

    #[tokio::test]
    async fn unassigned_entity_is_reachable_by_any_caller() {
        let service = service();
        let admin = CallerContext::admin("root");
        let created = service.create(&admin, valid_form()).await.expect("create");

        let anyone = CallerContext::user("carol");
        let deactivated = service
            .deactivate(&anyone, created.perceptor.id)
            .await
            .expect("unassigned entity is global");
        assert_eq!(deactivated.perceptor.status, PerceptorStatus::Inactive);
    }

    #[tokio::test]
    async fn update_overwrites_fields_but_not_status() {
        let service = service();
        let ctx = CallerContext::admin("root");
        let created = service.create(&ctx, valid_form()).await.expect("create");
        let id = created.perceptor.id;

        service.deactivate(&ctx, id.clone()).await.expect("deactivate");

        let mut form = service
            .edit_form(&ctx, id.clone())
            .await
            .expect("edit form")
            .hospital;
        form.name = "St. Mary North".to_string();

        let updated = service.update(&ctx, form).await.expect("update");
        assert_eq!(updated.perceptor.name, "St. Mary North");
        assert_eq!(updated.perceptor.status, PerceptorStatus::Inactive);
        assert_eq!(updated.message, MSG_UPDATED);
    }

    #[tokio::test]
    async fn update_with_stale_version_conflicts() {
        let service = service();
        let ctx = CallerContext::admin("root");
        let created = service.create(&ctx, valid_form()).await.expect("create");
        let id = created.perceptor.id;

        let stale_form = service
            .edit_form(&ctx, id.clone())
            .await
            .expect("edit form")
            .hospital;

        // Someone else transitions the entity in between.
        service.seize(&ctx, id).await.expect("seize");

        let result = service.update(&ctx, stale_form).await;
        assert!(matches!(result, Err(PerceptorError::Conflict(_))));
    }

    #[tokio::test]
    async fn search_forces_the_hospital_category() {
        let service = service();
        let ctx = CallerContext::admin("root");
        service.create(&ctx, valid_form()).await.expect("create");

        let form = SearchForm {
            category: Some("X".to_string()),
            ..SearchForm::default()
        };

        let results = service.search(form).await.expect("search");
        assert_eq!(results.perceptors.len(), 1);
        assert!(results
            .perceptors
            .iter()
            .all(|p| p.id.category == CATEGORY_HOSPITAL));
    }

    #[tokio::test]
    async fn list_form_prefills_manager_for_non_admin() {
        let directory = InMemoryManagerDirectory::new()
            .with_manager(Manager {
                id: "mgr-1".to_string(),
                name: "Alice".to_string(),
            })
            .with_assignment("alice", "mgr-1");
        let service = service_with_directory(directory);

        let view = service
            .list_form(&CallerContext::user("alice"))
            .await
            .expect("list form");
        assert_eq!(view.search.manager.as_deref(), Some("mgr-1"));

        let admin_view = service
            .list_form(&CallerContext::admin("root"))
            .await
            .expect("list form");
        assert!(admin_view.search.manager.is_none());
    }

    #[tokio::test]
    async fn missing_catalog_renders_empty_dropdowns() {
        let service = PerceptorService::new(
            Arc::new(InMemoryPerceptorRepository::new()),
            Arc::new(InMemoryCatalog::new()),
            Arc::new(InMemoryManagerDirectory::new()),
        );

        let view = service.new_form().await.expect("degrade, don't abort");
        assert!(view.priorities.is_empty());
        assert!(view.specialties.is_empty());
    }
}
