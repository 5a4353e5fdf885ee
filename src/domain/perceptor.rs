use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Category discriminator for hospital perceptors.
pub const CATEGORY_HOSPITAL: &str = "H";

/// Composite perceptor identifier: a fixed category discriminator plus a
/// numeric code that is unique within the category. The code is `None` on a
/// draft and assigned exactly once, at creation; it is never reused.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PerceptorId {
    pub category: String,
    pub code: Option<u32>,
}

impl PerceptorId {
    pub fn new(category: impl Into<String>, code: Option<u32>) -> Self {
        Self {
            category: category.into(),
            code,
        }
    }

    /// Draft identifier for a category, before the code is assigned.
    pub fn draft(category: impl Into<String>) -> Self {
        Self::new(category, None)
    }

    pub fn hospital(code: u32) -> Self {
        Self::new(CATEGORY_HOSPITAL, Some(code))
    }

    pub fn is_assigned(&self) -> bool {
        self.code.is_some()
    }
}

impl fmt::Display for PerceptorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.code {
            Some(code) => write!(f, "{}/{}", self.category, code),
            None => write!(f, "{}/-", self.category),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PerceptorStatus {
    Active,
    Inactive,
    Seized,
}

impl fmt::Display for PerceptorStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
            Self::Seized => "seized",
        };
        f.write_str(label)
    }
}

/// A benefit/payment recipient entity. `status` is mutated only by the
/// lifecycle manager; `version` is bumped on every mutation so a concurrent
/// resolve-then-mutate loses with a conflict instead of a silent overwrite.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Perceptor {
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

/// Draft of a perceptor before the repository assigns its code.
#[derive(Debug, Clone)]
pub struct NewPerceptor {
    pub category: String,
    pub name: String,
    pub priority_code: String,
    pub specialty_code: String,
    pub activity_code: Option<String>,
    pub line_code: Option<String>,
    pub manager: Option<String>,
    pub notes: Option<String>,
}

/// Full overwrite of the non-status fields of an existing perceptor.
#[derive(Debug, Clone)]
pub struct PerceptorPatch {
    pub name: String,
    pub priority_code: String,
    pub specialty_code: String,
    pub activity_code: Option<String>,
    pub line_code: Option<String>,
    pub manager: Option<String>,
    pub notes: Option<String>,
}

/// Criteria for the read-only search path. The category is always force-set
/// server-side for the controller's bound category; it never comes from the
/// raw payload.
#[derive(Debug, Clone)]
pub struct SearchCriteria {
    pub category: String,
    pub manager: Option<String>,
    pub name_contains: Option<String>,
    pub code: Option<u32>,
    pub status: Option<PerceptorStatus>,
}

impl SearchCriteria {
    pub fn for_category(category: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            manager: None,
            name_contains: None,
            code: None,
            status: None,
        }
    }
}

/// Catalog entry for dropdown-style fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeLabel {
    pub code: String,
    pub label: String,
}

impl CodeLabel {
    pub fn new(code: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            label: label.into(),
        }
    }
}

/// Staff account responsible for a subset of perceptors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manager {
    pub id: String,
    pub name: String,
}

/// Explicit caller identity passed into every operation, replacing the
/// ambient security-context lookup of the original controller.
#[derive(Debug, Clone)]
pub struct CallerContext {
    pub user_id: String,
    pub is_admin: bool,
}

impl CallerContext {
    pub fn admin(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            is_admin: true,
        }
    }

    pub fn user(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            is_admin: false,
        }
    }
}
