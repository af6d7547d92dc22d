use crate::infra::{AppState, QuoteEnvelope};
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use conto_termico::error::AppError;
use conto_termico::incentives::{
    export_csv, incentive_router, CalculationContext, IncentiveService,
};
use serde_json::json;
use std::sync::Arc;

pub(crate) fn with_incentive_routes(service: Arc<IncentiveService>) -> Router {
    let quotes = Router::new()
        .route("/api/v1/incentives/quote", post(quote_endpoint))
        .route("/api/v1/incentives/export", post(export_endpoint))
        .with_state(service.clone());

    incentive_router(service)
        .merge(quotes)
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

/// Validates the selection before combining it.
pub(crate) async fn quote_endpoint(
    State(service): State<Arc<IncentiveService>>,
    Json(request): Json<CalculationContext>,
) -> Result<Json<QuoteEnvelope>, AppError> {
    let result = service.quote(&request)?;
    Ok(Json(QuoteEnvelope::new(service.catalog().ruleset(), result)))
}

pub(crate) async fn export_endpoint(
    State(service): State<Arc<IncentiveService>>,
    Json(request): Json<CalculationContext>,
) -> Result<impl IntoResponse, AppError> {
    let result = service.quote(&request)?;
    let mut buffer = Vec::new();
    export_csv(&result, &mut buffer)?;
    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/csv; charset=utf-8")],
        buffer,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use conto_termico::incentives::{
        IncentiveError, InterventionId, InterventionParams, OperatorType,
    };
    use metrics_exporter_prometheus::PrometheusBuilder;
    use std::sync::atomic::AtomicBool;
    use tower::ServiceExt;

    fn district_heating() -> CalculationContext {
        CalculationContext::new(OperatorType::PrivateResidential).select(
            InterventionId::Teleriscaldamento,
            InterventionParams::new()
                .with("potenza_contrattuale", 60.0)
                .with("costo_totale", 12_000.0),
        )
    }

    fn app_state(ready: bool) -> AppState {
        AppState {
            readiness: Arc::new(AtomicBool::new(ready)),
            metrics: Arc::new(PrometheusBuilder::new().build_recorder().handle()),
        }
    }

    #[tokio::test]
    async fn readiness_reflects_startup_flag() {
        let pending = readiness_endpoint(Extension(app_state(false)))
            .await
            .into_response();
        assert_eq!(pending.status(), StatusCode::SERVICE_UNAVAILABLE);

        let ready = readiness_endpoint(Extension(app_state(true)))
            .await
            .into_response();
        assert_eq!(ready.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn quote_endpoint_stamps_the_result() {
        let service = Arc::new(IncentiveService::default());
        let Json(envelope) = quote_endpoint(State(service), Json(district_heating()))
            .await
            .expect("quote builds");

        assert_eq!(envelope.ruleset, "Conto Termico 3.0");
        assert!((envelope.result.total - 0.65 * 9_600.0).abs() < 1e-6);
    }

    #[tokio::test]
    async fn quote_endpoint_rejects_incomplete_inputs() {
        let service = Arc::new(IncentiveService::default());
        let request = CalculationContext::new(OperatorType::PrivateResidential).select(
            InterventionId::Teleriscaldamento,
            InterventionParams::new().with("potenza_contrattuale", 60.0),
        );

        let err = quote_endpoint(State(service), Json(request))
            .await
            .expect_err("missing cost is rejected");
        assert!(matches!(
            err,
            AppError::Incentive(IncentiveError::Validation(_))
        ));
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn export_route_answers_with_csv() {
        let app = with_incentive_routes(Arc::new(IncentiveService::default()));
        let response = app
            .oneshot(
                Request::post("/api/v1/incentives/export")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(serde_json::to_vec(&district_heating()).unwrap()))
                    .unwrap(),
            )
            .await
            .expect("route executes");

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "text/csv; charset=utf-8"
        );
        let body = axum::body::to_bytes(response.into_body(), 1 << 20)
            .await
            .expect("body readable");
        let text = String::from_utf8(body.to_vec()).expect("utf-8 body");
        assert!(text.starts_with("riga,intervento"));
        assert!(text.contains("totale,,,6240.00,,6240.00,"));
    }
}
