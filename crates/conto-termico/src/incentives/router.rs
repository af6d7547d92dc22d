use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde_json::json;

use super::error::IncentiveError;
use super::service::{
    CalculationRequest, CombineRequest, IncentiveService, ResolveRequest, ValidationRequest,
};

/// Router exposing the catalogue, resolver, calculators and combination engine.
pub fn incentive_router(service: Arc<IncentiveService>) -> Router {
    Router::new()
        .route("/api/v1/incentives/catalog", get(catalog_handler))
        .route("/api/v1/incentives/resolve", post(resolve_handler))
        .route("/api/v1/incentives/calculate", post(calculate_handler))
        .route("/api/v1/incentives/explain", post(explain_handler))
        .route("/api/v1/incentives/combine", post(combine_handler))
        .route("/api/v1/incentives/validate", post(validate_handler))
        .with_state(service)
}

fn error_response(error: IncentiveError) -> Response {
    let status = match &error {
        IncentiveError::InvalidCombination { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        other if other.is_input_error() => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    let payload = match &error {
        IncentiveError::Validation(validation) => json!({
            "error": error.to_string(),
            "issues": validation.issues,
        }),
        _ => json!({
            "error": error.to_string(),
        }),
    };
    (status, axum::Json(payload)).into_response()
}

pub(crate) async fn catalog_handler(State(service): State<Arc<IncentiveService>>) -> Response {
    (StatusCode::OK, axum::Json(service.catalog_view())).into_response()
}

pub(crate) async fn resolve_handler(
    State(service): State<Arc<IncentiveService>>,
    axum::Json(request): axum::Json<ResolveRequest>,
) -> Response {
    match service.resolve(&request.subject, &request.building) {
        Ok(resolved) => (StatusCode::OK, axum::Json(resolved)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn calculate_handler(
    State(service): State<Arc<IncentiveService>>,
    axum::Json(request): axum::Json<CalculationRequest>,
) -> Response {
    match service.calculate(&request) {
        Ok(response) => (StatusCode::OK, axum::Json(response)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn explain_handler(
    State(service): State<Arc<IncentiveService>>,
    axum::Json(request): axum::Json<CalculationRequest>,
) -> Response {
    match service.explain(&request) {
        Ok(explained) => (StatusCode::OK, axum::Json(explained)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn combine_handler(
    State(service): State<Arc<IncentiveService>>,
    axum::Json(request): axum::Json<CombineRequest>,
) -> Response {
    let result = service.combine_selection(&request);
    (StatusCode::OK, axum::Json(result)).into_response()
}

pub(crate) async fn validate_handler(
    State(service): State<Arc<IncentiveService>>,
    axum::Json(request): axum::Json<ValidationRequest>,
) -> Response {
    let report = service.validate(&request);
    (StatusCode::OK, axum::Json(report)).into_response()
}
