//! Owned holder for the current scored table.
//!
//! Readers take a cheap `Arc` clone and never block a refresh for longer than
//! the pointer swap. A refresh builds the complete replacement table before
//! taking the write lock, so readers see either the old or the new table.

use crate::ingest::{DistrictSource, IngestError};
use crate::scoring::{DistrictRecord, ScoredTable, ScoringEngine, ScoringError};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use tracing::{info, warn};

#[derive(Debug, thiserror::Error)]
pub enum RefreshError {
    #[error(transparent)]
    Source(#[from] IngestError),
    #[error(transparent)]
    Scoring(#[from] ScoringError),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SnapshotStatus {
    pub ready: bool,
    pub records_loaded: usize,
    pub states: usize,
    pub epoch: u64,
    pub loaded_at: Option<DateTime<Utc>>,
    pub source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
}

pub struct SnapshotStore {
    source: Arc<dyn DistrictSource>,
    engine: ScoringEngine,
    current: RwLock<Option<Arc<ScoredTable>>>,
    // Holds the last issued epoch; also serializes refreshes.
    refresh: Mutex<u64>,
    last_error: Mutex<Option<String>>,
}

impl SnapshotStore {
    pub fn new(source: Arc<dyn DistrictSource>, engine: ScoringEngine) -> Self {
        Self {
            source,
            engine,
            current: RwLock::new(None),
            refresh: Mutex::new(0),
            last_error: Mutex::new(None),
        }
    }

    pub fn engine(&self) -> &ScoringEngine {
        &self.engine
    }

    /// Load the source, score it and swap it in. On failure the previous
    /// table keeps serving.
    pub fn refresh(&self) -> Result<Arc<ScoredTable>, RefreshError> {
        let mut epoch = self.refresh.lock().unwrap_or_else(PoisonError::into_inner);
        let next_epoch = *epoch + 1;
        let source = self.source.describe();

        let built = self
            .source
            .load()
            .map_err(RefreshError::from)
            .and_then(|rows| {
                self.engine
                    .score(rows, next_epoch)
                    .map_err(RefreshError::from)
            });

        match built {
            Ok(table) => {
                let table = Arc::new(table);
                *self.current.write().unwrap_or_else(PoisonError::into_inner) =
                    Some(Arc::clone(&table));
                *epoch = next_epoch;
                *self.last_error.lock().unwrap_or_else(PoisonError::into_inner) = None;
                info!(
                    records = table.len(),
                    states = table.state_count(),
                    epoch = next_epoch,
                    %source,
                    "district snapshot refreshed"
                );
                Ok(table)
            }
            Err(err) => {
                warn!(error = %err, %source, epoch = *epoch, "district snapshot refresh failed");
                *self.last_error.lock().unwrap_or_else(PoisonError::into_inner) =
                    Some(err.to_string());
                Err(err)
            }
        }
    }

    pub fn current(&self) -> Option<Arc<ScoredTable>> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// The loaded table, or an empty one scored with this store's profile.
    pub fn current_or_empty(&self) -> Arc<ScoredTable> {
        self.current()
            .unwrap_or_else(|| Arc::new(self.engine.empty_table()))
    }

    pub fn is_ready(&self) -> bool {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    pub fn lookup(&self, district_id: &str) -> Option<DistrictRecord> {
        self.current()
            .and_then(|table| table.get(district_id).cloned())
    }

    pub fn status(&self) -> SnapshotStatus {
        let current = self.current();
        let last_error = self
            .last_error
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();

        SnapshotStatus {
            ready: current.is_some(),
            records_loaded: current.as_ref().map_or(0, |table| table.len()),
            states: current.as_ref().map_or(0, |table| table.state_count()),
            epoch: current.as_ref().map_or(0, |table| table.epoch()),
            loaded_at: current.as_ref().map(|table| table.built_at()),
            source: self.source.describe(),
            last_error,
        }
    }
}

impl std::fmt::Debug for SnapshotStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SnapshotStore")
            .field("source", &self.source.describe())
            .field("ready", &self.is_ready())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::StaticSource;
    use crate::scoring::RawDistrict;
    use std::sync::atomic::{AtomicBool, Ordering};

    fn rows() -> Vec<RawDistrict> {
        vec![
            RawDistrict::new("D-1", "Alpha", "Kerala", 1_000, 950, 10).with_demographic_updates(20),
            RawDistrict::new("D-2", "Beta", "Bihar", 1_000, 700, 80).with_demographic_updates(90),
        ]
    }

    /// Source that fails once `broken` is set.
    struct FlakySource {
        broken: AtomicBool,
    }

    impl DistrictSource for FlakySource {
        fn load(&self) -> Result<Vec<RawDistrict>, IngestError> {
            if self.broken.load(Ordering::SeqCst) {
                Err(IngestError::Io {
                    path: "flaky.csv".into(),
                    source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
                })
            } else {
                Ok(rows())
            }
        }

        fn describe(&self) -> String {
            "flaky.csv".to_string()
        }
    }

    #[test]
    fn store_is_not_ready_until_first_refresh() {
        let store = SnapshotStore::new(
            Arc::new(StaticSource::new(rows())),
            ScoringEngine::default(),
        );
        assert!(!store.is_ready());
        assert!(store.current_or_empty().is_empty());
        assert_eq!(store.status().epoch, 0);

        let table = store.refresh().expect("refresh succeeds");
        assert_eq!(table.len(), 2);
        assert!(store.is_ready());
        assert_eq!(store.lookup("D-2").map(|record| record.state), Some("Bihar".to_string()));
        assert!(store.lookup("missing").is_none());
    }

    #[test]
    fn failed_refresh_keeps_previous_table() {
        let source = Arc::new(FlakySource {
            broken: AtomicBool::new(false),
        });
        let store = SnapshotStore::new(source.clone(), ScoringEngine::default());
        let first = store.refresh().expect("first refresh succeeds");

        source.broken.store(true, Ordering::SeqCst);
        assert!(matches!(store.refresh(), Err(RefreshError::Source(_))));

        let current = store.current().expect("old table still served");
        assert!(Arc::ptr_eq(&first, &current));
        let status = store.status();
        assert_eq!(status.epoch, 1);
        assert!(status.last_error.is_some());
    }

    #[test]
    fn epochs_advance_per_successful_refresh() {
        let store = SnapshotStore::new(
            Arc::new(StaticSource::new(rows())),
            ScoringEngine::default(),
        );
        store.refresh().expect("refresh succeeds");
        let second = store.refresh().expect("refresh succeeds");
        assert_eq!(second.epoch(), 2);
        assert_eq!(store.status().records_loaded, 2);
    }
}
