//! Loading the raw district extract.

mod normalizer;
mod parser;

use crate::scoring::RawDistrict;
use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("failed to read district extract {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid district extract: {0}")]
    Csv(#[from] csv::Error),
}

impl IngestError {
    pub fn is_missing_source(&self) -> bool {
        matches!(self, Self::Io { source, .. } if source.kind() == std::io::ErrorKind::NotFound)
    }
}

/// Where a refresh pulls its raw rows from.
pub trait DistrictSource: Send + Sync {
    fn load(&self) -> Result<Vec<RawDistrict>, IngestError>;

    /// Human-readable origin, used in logs and status payloads.
    fn describe(&self) -> String;
}

/// CSV extract on disk, re-read on every load.
#[derive(Debug, Clone)]
pub struct CsvFileSource {
    path: PathBuf,
}

impl CsvFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl DistrictSource for CsvFileSource {
    fn load(&self) -> Result<Vec<RawDistrict>, IngestError> {
        let file = File::open(&self.path).map_err(|source| IngestError::Io {
            path: self.path.clone(),
            source,
        })?;
        read_extract(file)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// Fixed in-memory rows.
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    rows: Vec<RawDistrict>,
}

impl StaticSource {
    pub fn new(rows: Vec<RawDistrict>) -> Self {
        Self { rows }
    }
}

impl DistrictSource for StaticSource {
    fn load(&self) -> Result<Vec<RawDistrict>, IngestError> {
        Ok(self.rows.clone())
    }

    fn describe(&self) -> String {
        format!("in-memory extract ({} rows)", self.rows.len())
    }
}

pub fn read_extract<R: Read>(reader: R) -> Result<Vec<RawDistrict>, IngestError> {
    Ok(parser::parse_records(reader)?)
}

pub fn write_extract<W: Write>(writer: W, rows: &[RawDistrict]) -> Result<(), IngestError> {
    Ok(parser::write_records(writer, rows)?)
}
