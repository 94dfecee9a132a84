//! District-level lifecycle risk scoring.
//!
//! Raw administrative counters are loaded through a [`ingest::DistrictSource`],
//! normalized into "1 = good" sub-indices, combined into the risk-oriented
//! composite (ALHS, higher means more strain) by a
//! [`scoring::ScoringEngine`], published through a [`snapshot::SnapshotStore`]
//! and summarised by the pure functions in [`aggregate`].

pub mod aggregate;
pub mod config;
pub mod error;
pub mod ingest;
pub mod scoring;
pub mod snapshot;
pub mod synthetic;
pub mod telemetry;
