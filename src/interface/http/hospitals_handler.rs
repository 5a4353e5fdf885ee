use axum::{
    Json,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
};

use crate::{
    application::dto::{
        ConfirmationResponse, HealthResponse, HospitalForm, HospitalFormView, ListFormView,
        SearchForm, SearchResultsView,
    },
    domain::{
        perceptor::{CallerContext, PerceptorId},
        report::ValidationReport,
    },
    interface::http::problem::{ApiProblem, ApiResult},
    state::AppState,
};

pub async fn healthcheck() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

/// Search home: criteria form prefilled for the caller plus the filter
/// catalogs.
pub async fn list_form(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<Json<ListFormView>> {
    let ctx = caller_context(&headers);
    let view = state
        .hospital_service
        .list_form(&ctx)
        .await
        .map_err(ApiProblem::from_domain)?;
    Ok(Json(view))
}

/// Check-only validation of search criteria: returns the report and signals
/// bad request when it is non-empty. Nothing is searched.
pub async fn validate_search(
    State(state): State<AppState>,
    Json(form): Json<SearchForm>,
) -> (StatusCode, Json<ValidationReport>) {
    let report = state.hospital_service.search_check_only(&form);
    let status = if report.is_empty() {
        StatusCode::OK
    } else {
        StatusCode::BAD_REQUEST
    };
    (status, Json(report))
}

pub async fn search(
    State(state): State<AppState>,
    Json(form): Json<SearchForm>,
) -> ApiResult<Json<SearchResultsView>> {
    let results = state
        .hospital_service
        .search(form)
        .await
        .map_err(ApiProblem::from_domain)?;
    Ok(Json(results))
}

pub async fn new_form(State(state): State<AppState>) -> ApiResult<Json<HospitalFormView>> {
    let view = state
        .hospital_service
        .new_form()
        .await
        .map_err(ApiProblem::from_domain)?;
    Ok(Json(view))
}

/// Check-only validation of the hospital form (the asynchronous pre-check
/// path): fail-fast structural phase, then business checks.
pub async fn validate_hospital(
    State(state): State<AppState>,
    Json(form): Json<HospitalForm>,
) -> ApiResult<(StatusCode, Json<ValidationReport>)> {
    let report = state
        .hospital_service
        .check_hospital(&form)
        .await
        .map_err(ApiProblem::from_domain)?;

    let status = if report.is_empty() {
        StatusCode::OK
    } else {
        StatusCode::BAD_REQUEST
    };
    Ok((status, Json(report)))
}

pub async fn create(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(form): Json<HospitalForm>,
) -> ApiResult<(StatusCode, Json<ConfirmationResponse>)> {
    let ctx = caller_context(&headers);
    let created = state
        .hospital_service
        .create(&ctx, form)
        .await
        .map_err(ApiProblem::from_domain)?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn edit_form(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path((category, code)): Path<(String, u32)>,
) -> ApiResult<Json<HospitalFormView>> {
    let ctx = caller_context(&headers);
    let view = state
        .hospital_service
        .edit_form(&ctx, PerceptorId::new(category, Some(code)))
        .await
        .map_err(ApiProblem::from_domain)?;
    Ok(Json(view))
}

pub async fn update(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(form): Json<HospitalForm>,
) -> ApiResult<Json<ConfirmationResponse>> {
    let ctx = caller_context(&headers);
    let updated = state
        .hospital_service
        .update(&ctx, form)
        .await
        .map_err(ApiProblem::from_domain)?;
    Ok(Json(updated))
}

pub async fn deactivate(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path((category, code)): Path<(String, u32)>,
) -> ApiResult<Json<ConfirmationResponse>> {
    let ctx = caller_context(&headers);
    let result = state
        .hospital_service
        .deactivate(&ctx, PerceptorId::new(category, Some(code)))
        .await
        .map_err(ApiProblem::from_domain)?;
    Ok(Json(result))
}

pub async fn seize(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path((category, code)): Path<(String, u32)>,
) -> ApiResult<Json<ConfirmationResponse>> {
    let ctx = caller_context(&headers);
    let result = state
        .hospital_service
        .seize(&ctx, PerceptorId::new(category, Some(code)))
        .await
        .map_err(ApiProblem::from_domain)?;
    Ok(Json(result))
}

pub async fn reactivate(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path((category, code)): Path<(String, u32)>,
) -> ApiResult<Json<ConfirmationResponse>> {
    let ctx = caller_context(&headers);
    let result = state
        .hospital_service
        .reactivate(&ctx, PerceptorId::new(category, Some(code)))
        .await
        .map_err(ApiProblem::from_domain)?;
    Ok(Json(result))
}

/// The caller identity normally established by the authentication front-end.
/// Transport of that identity is out of scope here; headers stand in for it.
fn caller_context(headers: &HeaderMap) -> CallerContext {
    let user_id = headers
        .get("x-user-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("anonymous")
        .to_string();
    let is_admin = headers
        .get("x-admin")
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value == "true" || value == "1");

    CallerContext { user_id, is_admin }
}
