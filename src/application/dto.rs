use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::perceptor::{
    CATEGORY_HOSPITAL, CodeLabel, NewPerceptor, Perceptor, PerceptorId, PerceptorPatch,
    PerceptorStatus, SearchCriteria,
};

/// Hospital detail form, shared by the create and update paths. `version`
/// carries the stamp the client read so a stale submit fails with a conflict
/// instead of overwriting a concurrent change.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HospitalForm {
    #[serde(default = "default_hospital_id")]
    pub id: PerceptorId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub priority_code: String,
    #[serde(default)]
    pub specialty_code: String,
    #[serde(default)]
    pub activity_code: Option<String>,
    #[serde(default)]
    pub line_code: Option<String>,
    #[serde(default)]
    pub manager: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default = "default_version")]
    pub version: i64,
}

impl HospitalForm {
    pub fn empty() -> Self {
        Self {
            id: default_hospital_id(),
            name: String::new(),
            priority_code: String::new(),
            specialty_code: String::new(),
            activity_code: None,
            line_code: None,
            manager: None,
            notes: None,
            version: default_version(),
        }
    }

    pub fn from_entity(perceptor: &Perceptor) -> Self {
        Self {
            id: perceptor.id.clone(),
            name: perceptor.name.clone(),
            priority_code: perceptor.priority_code.clone(),
            specialty_code: perceptor.specialty_code.clone(),
            activity_code: perceptor.activity_code.clone(),
            line_code: perceptor.line_code.clone(),
            manager: perceptor.manager.clone(),
            notes: perceptor.notes.clone(),
            version: perceptor.version,
        }
    }

    pub fn into_draft(self) -> NewPerceptor {
        NewPerceptor {
            category: CATEGORY_HOSPITAL.to_string(),
            name: self.name.trim().to_string(),
            priority_code: self.priority_code.trim().to_string(),
            specialty_code: self.specialty_code.trim().to_uppercase(),
            activity_code: normalize_optional(self.activity_code),
            line_code: normalize_optional(self.line_code),
            manager: normalize_optional(self.manager),
            notes: normalize_optional(self.notes),
        }
    }

    pub fn into_patch(self) -> PerceptorPatch {
        PerceptorPatch {
            name: self.name.trim().to_string(),
            priority_code: self.priority_code.trim().to_string(),
            specialty_code: self.specialty_code.trim().to_uppercase(),
            activity_code: normalize_optional(self.activity_code),
            line_code: normalize_optional(self.line_code),
            manager: normalize_optional(self.manager),
            notes: normalize_optional(self.notes),
        }
    }
}

/// Search criteria as submitted by the client. Whatever `category` says, the
/// search path overrides it with the controller's bound category.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchForm {
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub manager: Option<String>,
    #[serde(default)]
    pub name_contains: Option<String>,
    #[serde(default)]
    pub code: Option<u32>,
    #[serde(default)]
    pub status: Option<PerceptorStatus>,
}

impl SearchForm {
    pub fn into_criteria(self, category: &str) -> SearchCriteria {
        SearchCriteria {
            // Hardcoded server-side; the raw payload is not trusted here.
            category: category.to_string(),
            manager: normalize_optional(self.manager),
            name_contains: normalize_optional(self.name_contains),
            code: self.code,
            status: self.status,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PerceptorResponse {
    pub id: PerceptorId,
    pub name: String,
    pub priority_code: String,
    pub specialty_code: String,
    pub activity_code: Option<String>,
    pub line_code: Option<String>,
    pub manager: Option<String>,
    pub notes: Option<String>,
    pub status: PerceptorStatus,
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Perceptor> for PerceptorResponse {
    fn from(value: Perceptor) -> Self {
        Self {
            id: value.id,
            name: value.name,
            priority_code: value.priority_code,
            specialty_code: value.specialty_code,
            activity_code: value.activity_code,
            line_code: value.line_code,
            manager: value.manager,
            notes: value.notes,
            status: value.status,
            version: value.version,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

/// Result of a successful mutation: the updated entity plus the cosmetic
/// confirmation message shown to the user.
#[derive(Debug, Serialize)]
pub struct ConfirmationResponse {
    pub perceptor: PerceptorResponse,
    pub message: String,
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FormAction {
    New,
    Update,
}

/// Detail form plus the catalog data its dropdowns are rendered from.
#[derive(Debug, Serialize)]
pub struct HospitalFormView {
    pub hospital: HospitalForm,
    pub action: FormAction,
    pub priorities: Vec<CodeLabel>,
    pub specialties: Vec<CodeLabel>,
    pub activities: Vec<CodeLabel>,
    pub lines: Vec<CodeLabel>,
}

/// Search form plus the catalogs backing its filter dropdowns.
#[derive(Debug, Serialize)]
pub struct ListFormView {
    pub search: SearchForm,
    pub priorities: Vec<CodeLabel>,
    pub situations: Vec<CodeLabel>,
}

#[derive(Debug, Serialize)]
pub struct SearchResultsView {
    pub perceptors: Vec<PerceptorResponse>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

fn normalize_optional(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn default_hospital_id() -> PerceptorId {
    PerceptorId::draft(CATEGORY_HOSPITAL)
}

const fn default_version() -> i64 {
    1
}
