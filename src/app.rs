use axum::{
    Router,
    http::{HeaderName, Method},
    routing::{get, post},
};
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::{
    interface::http::hospitals_handler::{
        create, deactivate, edit_form, healthcheck, list_form, new_form, reactivate, search,
        seize, update, validate_hospital, validate_search,
    },
    state::AppState,
};

pub fn build_router(state: AppState) -> Router {
    let request_id_header = HeaderName::from_static("x-request-id");

    Router::new()
        .route("/health", get(healthcheck))
        .route("/api/v1/hospitals", get(list_form))
        .route("/api/v1/hospitals/search", post(search))
        .route("/api/v1/hospitals/search/validation", post(validate_search))
        .route("/api/v1/hospitals/new", get(new_form).post(create))
        .route("/api/v1/hospitals/validation", post(validate_hospital))
        .route("/api/v1/hospitals/edit", post(update))
        .route("/api/v1/hospitals/{category}/{code}/edit", get(edit_form))
        .route(
            "/api/v1/hospitals/{category}/{code}/deactivate",
            post(deactivate),
        )
        .route("/api/v1/hospitals/{category}/{code}/seize", post(seize))
        .route(
            "/api/v1/hospitals/{category}/{code}/reactivate",
            post(reactivate),
        )
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::new(request_id_header.clone()))
        .layer(SetRequestIdLayer::new(request_id_header, MakeRequestUuid))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_headers(Any)
                .allow_methods([Method::GET, Method::POST, Method::OPTIONS]),
        )
        .with_state(state)
}
