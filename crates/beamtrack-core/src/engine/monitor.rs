use super::error::EngineError;
use crate::core::diagnostics::{ReducedBeamCharacteristics, output};
use crate::core::elements::{BeamMonitor, MonitorBackend};
use crate::core::models::particle::ParticleContainer;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, warn};

#[derive(Debug, Clone)]
pub(crate) struct MonitorSeries {
    backend: MonitorBackend,
    records: Vec<ReducedBeamCharacteristics>,
}

/// Per-name state of every beam monitor in the lattice.
#[derive(Debug, Clone, Default)]
pub(crate) struct MonitorRegistry {
    series: BTreeMap<String, MonitorSeries>,
}

impl MonitorRegistry {
    /// Records one pass of the bunch through `monitor`. With an output directory and the
    /// CSV backend, the particles of this pass are dumped right away.
    pub(crate) fn record(
        &mut self,
        monitor: &BeamMonitor,
        container: &ParticleContainer,
        step: usize,
        output_dir: Option<&Path>,
    ) -> Result<(), EngineError> {
        let backend = monitor.resolve_backend()?;
        let series = self
            .series
            .entry(monitor.name.clone())
            .or_insert_with(|| MonitorSeries {
                backend,
                records: Vec::new(),
            });
        if series.backend != backend {
            warn!(
                monitor = %monitor.name,
                kept = series.backend.as_str(),
                ignored = backend.as_str(),
                "Beam monitors sharing a name use different backends; keeping the first."
            );
        }

        let pass = series.records.len() + 1;
        series
            .records
            .push(ReducedBeamCharacteristics::compute(container, step));
        debug!(monitor = %monitor.name, pass, "Beam monitor pass recorded.");

        if let (Some(dir), MonitorBackend::Csv) = (output_dir, series.backend) {
            let path = dir.join(format!("monitor_{}_{:05}.csv", monitor.name, pass));
            output::write_particles(&path, container)?;
        }
        Ok(())
    }

    pub(crate) fn records(&self, name: &str) -> Option<&[ReducedBeamCharacteristics]> {
        self.series.get(name).map(|s| s.records.as_slice())
    }

    pub(crate) fn total_passes(&self) -> usize {
        self.series.values().map(|s| s.records.len()).sum()
    }

    pub(crate) fn names(&self) -> impl Iterator<Item = &str> {
        self.series.keys().map(String::as_str)
    }

    /// Writes one `monitor_<name>.csv` series file per monitor.
    pub(crate) fn write_series(&self, dir: &Path) -> Result<(), EngineError> {
        for (name, series) in &self.series {
            let path = dir.join(format!("monitor_{}.csv", name));
            output::write_reduced(&path, &series.records)?;
        }
        Ok(())
    }
}
