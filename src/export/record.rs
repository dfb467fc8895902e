//! Persisted simulation runs.

use crate::core::{Sample, Trace};
use crate::export::{write_atomic, ExportError};
use crate::simulation::SimulationConfig;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::debug;
use uuid::Uuid;

/// Version identifier for the trace record format
pub const TRACE_RECORD_VERSION: u32 = 1;

/// A trace together with the context needed to plot or replay it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TraceRecord {
    /// Record format version
    pub version: u32,

    /// Unique run identifier
    pub id: Uuid,

    /// When the record was created
    pub created_at: DateTime<Utc>,

    /// Continuous variable names, in vector order
    pub variables: Vec<String>,

    /// Step and horizon of the run
    pub config: SimulationConfig,

    /// Recorded samples
    pub trace: Trace,
}

impl TraceRecord {
    pub fn new(variables: Vec<String>, config: SimulationConfig, trace: Trace) -> Self {
        Self {
            version: TRACE_RECORD_VERSION,
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            variables,
            config,
            trace,
        }
    }

    /// `(time, value)` series of one continuous variable.
    pub fn series(&self, variable: &str) -> Option<Vec<(f64, f64)>> {
        let index = self.variables.iter().position(|v| v == variable)?;
        self.trace
            .iter()
            .map(|s: &Sample| s.continuous.get(index).map(|value| (s.time, *value)))
            .collect()
    }

    fn check_version(self) -> Result<Self, ExportError> {
        if self.version != TRACE_RECORD_VERSION {
            return Err(ExportError::UnsupportedVersion {
                found: self.version,
                supported: TRACE_RECORD_VERSION,
            });
        }
        Ok(self)
    }

    pub fn to_json(&self) -> Result<String, ExportError> {
        serde_json::to_string_pretty(self)
            .map_err(|e| ExportError::SerializationFailed(e.to_string()))
    }

    pub fn from_json(json: &str) -> Result<Self, ExportError> {
        let record: Self = serde_json::from_str(json)
            .map_err(|e| ExportError::DeserializationFailed(e.to_string()))?;
        record.check_version()
    }

    /// Compact binary encoding for long runs.
    pub fn to_bytes(&self) -> Result<Vec<u8>, ExportError> {
        bincode::serialize(self).map_err(|e| ExportError::SerializationFailed(e.to_string()))
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ExportError> {
        let record: Self = bincode::deserialize(bytes)
            .map_err(|e| ExportError::DeserializationFailed(e.to_string()))?;
        record.check_version()
    }

    /// Write the record as JSON, atomically replacing `path`.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), ExportError> {
        let path = path.as_ref();
        write_atomic(path, self.to_json()?.as_bytes())?;
        debug!(
            path = %path.display(),
            id = %self.id,
            samples = self.trace.len(),
            "Saved trace record"
        );
        Ok(())
    }

    pub fn read_json(path: impl AsRef<Path>) -> Result<Self, ExportError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|source| ExportError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }
}
