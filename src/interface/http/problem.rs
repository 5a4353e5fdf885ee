use axum::{
    Json,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use uuid::Uuid;

use crate::domain::{errors::PerceptorError, report::ValidationError};

pub type ApiResult<T> = Result<T, ApiProblem>;

/// RFC 9457 problem response. Validation failures additionally carry the full
/// field-level report so clients can annotate every violated field at once.
#[derive(Debug)]
pub struct ApiProblem {
    status: StatusCode,
    title: &'static str,
    detail: String,
    kind: &'static str,
    errors: Option<Vec<ValidationError>>,
    correlation_id: String,
}

impl ApiProblem {
    pub fn from_domain(error: PerceptorError) -> Self {
        match error {
            PerceptorError::Validation(report) => Self::new(
                StatusCode::BAD_REQUEST,
                "Validation failed",
                "https://perceptores.dev/problems/validation",
                report.to_string(),
                Some(report.errors().to_vec()),
            ),
            PerceptorError::NotFound(id) => Self::new(
                StatusCode::NOT_FOUND,
                "Perceptor not found",
                "https://perceptores.dev/problems/not-found",
                format!("perceptor {id} does not exist"),
                None,
            ),
            PerceptorError::Forbidden(id) => Self::new(
                StatusCode::FORBIDDEN,
                "Forbidden",
                "https://perceptores.dev/problems/forbidden",
                format!("perceptor {id} is outside the caller's permission scope"),
                None,
            ),
            PerceptorError::Conflict(detail) => Self::new(
                StatusCode::CONFLICT,
                "Version conflict",
                "https://perceptores.dev/problems/conflict",
                detail,
                None,
            ),
            PerceptorError::CatalogNotFound(key) => Self::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Reference data missing",
                "https://perceptores.dev/problems/catalog",
                format!("catalog '{key}' does not exist"),
                None,
            ),
            PerceptorError::Unavailable(detail) => Self::new(
                StatusCode::BAD_GATEWAY,
                "Collaborator unavailable",
                "https://perceptores.dev/problems/unavailable",
                detail,
                None,
            ),
        }
    }

    fn new(
        status: StatusCode,
        title: &'static str,
        kind: &'static str,
        detail: impl Into<String>,
        errors: Option<Vec<ValidationError>>,
    ) -> Self {
        Self {
            status,
            title,
            detail: detail.into(),
            kind,
            errors,
            correlation_id: Uuid::new_v4().to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
struct ProblemDetails {
    #[serde(rename = "type")]
    kind: String,
    title: String,
    status: u16,
    detail: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    errors: Option<Vec<ValidationError>>,
    correlation_id: String,
}

impl IntoResponse for ApiProblem {
    fn into_response(self) -> Response {
        let payload = ProblemDetails {
            kind: self.kind.to_string(),
            title: self.title.to_string(),
            status: self.status.as_u16(),
            detail: self.detail,
            errors: self.errors,
            correlation_id: self.correlation_id,
        };

        let mut response = (self.status, Json(payload)).into_response();
        response.headers_mut().insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/problem+json"),
        );

        response
    }
}
