use crate::cli::ServeArgs;
use crate::infra::{refresh_blocking, AppState};
use crate::routes::router;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use lifecycle_risk::config::AppConfig;
use lifecycle_risk::error::AppError;
use lifecycle_risk::ingest::CsvFileSource;
use lifecycle_risk::scoring::ScoringEngine;
use lifecycle_risk::snapshot::SnapshotStore;
use lifecycle_risk::telemetry;
use std::sync::Arc;
use tracing::{info, warn};

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let source = Arc::new(CsvFileSource::new(config.data.path.clone()));
    let engine = ScoringEngine::new(config.scoring_config());
    let store = Arc::new(SnapshotStore::new(source, engine));

    // The service still starts without an extract; /ready reports it.
    if refresh_blocking(store.clone()).await.is_err() {
        warn!(
            path = %config.data.path.display(),
            "starting without district data; POST /api/v1/refresh once the extract is available"
        );
    }

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let app_state = AppState {
        store: store.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let app = router()
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!(
        ?config.environment,
        %addr,
        profile = ?config.scoring.profile,
        ready = store.is_ready(),
        "lifecycle risk service listening"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
