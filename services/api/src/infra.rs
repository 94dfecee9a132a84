use lifecycle_risk::error::AppError;
use lifecycle_risk::scoring::ScoredTable;
use lifecycle_risk::snapshot::SnapshotStore;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) store: Arc<SnapshotStore>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Runs a refresh on the blocking pool; loading and scoring an extract is
/// file IO plus a full pass over every district.
pub(crate) async fn refresh_blocking(
    store: Arc<SnapshotStore>,
) -> Result<Arc<ScoredTable>, AppError> {
    let refreshed = tokio::task::spawn_blocking(move || store.refresh())
        .await
        .map_err(|err| AppError::Io(std::io::Error::new(std::io::ErrorKind::Other, err)))?;
    Ok(refreshed?)
}
