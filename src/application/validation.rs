use std::sync::Arc;

use tracing::error;

use crate::domain::{errors::PerceptorError, report::ValidationReport};
use crate::infrastructure::{CatalogService, ManagerDirectory};

use super::dto::{HospitalForm, SearchForm};
use super::{CATALOG_ACTIVITY, CATALOG_LINE, CATALOG_PRIORITY, CATALOG_SPECIALTY};

const MAX_NAME_LEN: usize = 100;
const MAX_CODE_LEN: usize = 10;
const MAX_SEARCH_CODE: u32 = 999_999;

/// Structural phase: field presence, format, and range checks that need no
/// stored state. Collects every violation instead of stopping at the first.
pub fn validate_structural(form: &HospitalForm) -> ValidationReport {
    let mut report = ValidationReport::new();

    let name = form.name.trim();
    if name.is_empty() {
        report.reject("name", "required", "display name must not be blank");
    } else if name.len() > MAX_NAME_LEN {
        report.reject(
            "name",
            "too_long",
            format!("display name must be at most {MAX_NAME_LEN} characters"),
        );
    }

    let priority = form.priority_code.trim();
    if priority.is_empty() {
        report.reject("priority_code", "required", "priority code is required");
    } else {
        match priority.parse::<u8>() {
            Ok(value) if (1..=9).contains(&value) => {}
            _ => report.reject(
                "priority_code",
                "out_of_range",
                "priority code must be a number between 1 and 9",
            ),
        }
    }

    let specialty = form.specialty_code.trim();
    if specialty.is_empty() {
        // Hospital-specific required sub-field.
        report.reject(
            "specialty_code",
            "required",
            "specialty is required for hospitals",
        );
    } else {
        check_code_format(&mut report, "specialty_code", specialty);
    }

    if let Some(activity) = form.activity_code.as_deref() {
        check_optional_code(&mut report, "activity_code", activity);
    }
    if let Some(line) = form.line_code.as_deref() {
        check_optional_code(&mut report, "line_code", line);
    }

    report
}

/// Business phase: cross-field and existence checks backed by collaborators.
/// A missing catalog is logged and that check skipped, mirroring the source's
/// catch-and-log on catalog lookups; transport failures propagate.
pub async fn validate_business(
    form: &HospitalForm,
    catalog: &dyn CatalogService,
    managers: &dyn ManagerDirectory,
) -> Result<ValidationReport, PerceptorError> {
    let mut report = ValidationReport::new();

    let checks: [(&str, &str, Option<String>); 4] = [
        (
            "priority_code",
            CATALOG_PRIORITY,
            non_blank(form.priority_code.trim()),
        ),
        (
            "specialty_code",
            CATALOG_SPECIALTY,
            non_blank(&form.specialty_code.trim().to_uppercase()),
        ),
        (
            "activity_code",
            CATALOG_ACTIVITY,
            form.activity_code.as_deref().and_then(|v| non_blank(v.trim())),
        ),
        (
            "line_code",
            CATALOG_LINE,
            form.line_code.as_deref().and_then(|v| non_blank(v.trim())),
        ),
    ];

    for (field, catalog_key, value) in checks {
        let Some(value) = value else {
            continue;
        };
        match catalog.codes_for(catalog_key).await {
            Ok(codes) => {
                if !codes.iter().any(|entry| entry.code == value) {
                    report.reject(
                        field,
                        "unknown_code",
                        format!("code '{value}' is not in the {catalog_key} catalog"),
                    );
                }
            }
            Err(PerceptorError::CatalogNotFound(key)) => {
                error!(catalog = %key, "cannot find catalog of values, skipping check");
            }
            Err(other) => return Err(other),
        }
    }

    if let Some(manager) = form.manager.as_deref().and_then(|v| non_blank(v.trim())) {
        if managers.find(&manager).await?.is_none() {
            report.reject(
                "manager",
                "unknown_manager",
                format!("manager '{manager}' does not resolve"),
            );
        }
    }

    Ok(report)
}

/// Restricted structural-only check run before the search path; it never
/// touches the business phase.
pub fn validate_search_criteria(form: &SearchForm) -> ValidationReport {
    let mut report = ValidationReport::new();

    if let Some(code) = form.code {
        if code == 0 || code > MAX_SEARCH_CODE {
            report.reject(
                "code",
                "out_of_range",
                format!("code must be between 1 and {MAX_SEARCH_CODE}"),
            );
        }
    }
    if let Some(name_contains) = form.name_contains.as_deref() {
        if name_contains.trim().is_empty() {
            report.reject(
                "name_contains",
                "blank",
                "name filter must not be blank when present",
            );
        }
    }
    if let Some(manager) = form.manager.as_deref() {
        if manager.trim().is_empty() {
            report.reject(
                "manager",
                "blank",
                "manager filter must not be blank when present",
            );
        }
    }

    report
}

/// Explicit two-phase pipeline guarding every mutating operation. Both modes
/// run the same validators and produce the same report shape; they differ
/// only in when the business phase runs.
pub struct ValidationPipeline {
    catalog: Arc<dyn CatalogService>,
    managers: Arc<dyn ManagerDirectory>,
}

impl ValidationPipeline {
    pub fn new(catalog: Arc<dyn CatalogService>, managers: Arc<dyn ManagerDirectory>) -> Self {
        Self { catalog, managers }
    }

    /// Check-only mode, used for live form feedback. Fail-fast: when the
    /// structural phase already produced errors the business phase is
    /// skipped and no collaborator is invoked.
    pub async fn check_only(
        &self,
        form: &HospitalForm,
    ) -> Result<ValidationReport, PerceptorError> {
        let report = validate_structural(form);
        if !report.is_empty() {
            return Ok(report);
        }
        validate_business(form, self.catalog.as_ref(), self.managers.as_ref()).await
    }

    /// Submit mode: both phases always run against the same report, so the
    /// caller sees every violated field at once.
    pub async fn submit(&self, form: &HospitalForm) -> Result<(), PerceptorError> {
        let mut report = validate_structural(form);
        report.merge(validate_business(form, self.catalog.as_ref(), self.managers.as_ref()).await?);

        if report.is_empty() {
            Ok(())
        } else {
            Err(PerceptorError::Validation(report))
        }
    }
}

fn non_blank(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

fn check_code_format(report: &mut ValidationReport, field: &str, value: &str) {
    if value.len() > MAX_CODE_LEN {
        report.reject(
            field,
            "too_long",
            format!("{field} must be at most {MAX_CODE_LEN} characters"),
        );
    } else if !value.chars().all(|c| c.is_ascii_alphanumeric()) {
        report.reject(
            field,
            "format",
            format!("{field} must contain only letters and digits"),
        );
    }
}

fn check_optional_code(report: &mut ValidationReport, field: &str, value: &str) {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        report.reject(field, "blank", format!("{field} must not be blank when present"));
    } else {
        check_code_format(report, field, trimmed);
    }
}
