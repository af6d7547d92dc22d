use crate::cli::ServeArgs;
use crate::infra::AppState;
use crate::routes::with_incentive_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use conto_termico::config::AppConfig;
use conto_termico::error::AppError;
use conto_termico::incentives::{IncentiveService, RuleCatalog};
use conto_termico::telemetry;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let catalog = RuleCatalog::for_ruleset(config.ruleset);
    let interventions = catalog.interventions().len();
    let incentive_service = Arc::new(IncentiveService::new(catalog));

    let app = with_incentive_routes(incentive_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        ruleset = config.ruleset.label(),
        interventions,
        %addr,
        "incentive service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
