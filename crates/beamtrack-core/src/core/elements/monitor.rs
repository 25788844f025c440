use super::ElementError;
use serde::Serialize;
use tracing::warn;

/// How a beam monitor persists what it sees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MonitorBackend {
    /// Reduced characteristics per pass plus a full particle dump per pass.
    Csv,
    /// Reduced characteristics per pass only.
    Summary,
}

impl MonitorBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            MonitorBackend::Csv => "csv",
            MonitorBackend::Summary => "summary",
        }
    }
}

/// Zero-length diagnostic element.
///
/// A monitor is a plain value; the passes it records are kept by the engine under
/// the monitor's name, so placing the same monitor twice in a lattice produces one
/// series with two entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BeamMonitor {
    pub name: String,
    pub backend: String,
}

impl BeamMonitor {
    pub fn new(name: impl Into<String>, backend: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            backend: backend.into(),
        }
    }

    /// Maps the backend name onto an available backend. HDF5-family names fall back
    /// to CSV output.
    pub fn resolve_backend(&self) -> Result<MonitorBackend, ElementError> {
        match self.backend.to_ascii_lowercase().as_str() {
            "csv" | "default" => Ok(MonitorBackend::Csv),
            "summary" => Ok(MonitorBackend::Summary),
            "h5" | "hdf5" | "openpmd" => {
                warn!(
                    monitor = %self.name,
                    backend = %self.backend,
                    "HDF5 output is not available, writing CSV instead."
                );
                Ok(MonitorBackend::Csv)
            }
            _ => Err(ElementError::UnknownBackend {
                monitor: self.name.clone(),
                backend: self.backend.clone(),
            }),
        }
    }
}
