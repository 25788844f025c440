use super::moments::ReducedBeamCharacteristics;
use crate::core::models::particle::ParticleContainer;
use crate::core::models::ref_particle::RefParticle;
use serde::Serialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum DiagnosticsError {
    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("CSV writing error for '{path}': {source}")]
    Csv { path: String, source: csv::Error },
}

impl DiagnosticsError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_string_lossy().to_string(),
            source,
        }
    }

    fn csv(path: &Path, source: csv::Error) -> Self {
        Self::Csv {
            path: path.to_string_lossy().to_string(),
            source,
        }
    }
}

#[derive(Debug, Serialize)]
struct RefParticleRecord {
    s: f64,
    t: f64,
    charge_qe: f64,
    mass_mev: f64,
    kin_energy_mev: f64,
    gamma: f64,
    beta: f64,
    beta_gamma: f64,
    rigidity_tm: f64,
}

impl From<&RefParticle> for RefParticleRecord {
    fn from(r: &RefParticle) -> Self {
        Self {
            s: r.s,
            t: r.t,
            charge_qe: r.charge_qe,
            mass_mev: r.mass_mev,
            kin_energy_mev: r.kin_energy_mev,
            gamma: r.gamma(),
            beta: r.beta(),
            beta_gamma: r.beta_gamma(),
            rigidity_tm: r.rigidity_tm(),
        }
    }
}

/// Gives `dir` a fresh, empty state. An existing directory is moved aside to
/// `<dir>.old.<n>` using the first unused `n`, and its new location is returned.
pub fn prepare_output_dir(dir: &Path) -> Result<Option<PathBuf>, DiagnosticsError> {
    let mut moved = None;
    if dir.exists() {
        let base = dir.as_os_str().to_string_lossy().to_string();
        let backup = (1..)
            .map(|n| PathBuf::from(format!("{base}.old.{n}")))
            .find(|p| !p.exists())
            .unwrap_or_else(|| PathBuf::from(format!("{base}.old")));
        std::fs::rename(dir, &backup).map_err(|e| DiagnosticsError::io(dir, e))?;
        info!("Moved existing output directory {:?} to {:?}", dir, &backup);
        moved = Some(backup);
    }
    std::fs::create_dir_all(dir).map_err(|e| DiagnosticsError::io(dir, e))?;
    Ok(moved)
}

fn write_records<T: Serialize>(
    path: &Path,
    records: impl IntoIterator<Item = T>,
) -> Result<(), DiagnosticsError> {
    let mut writer = csv::Writer::from_path(path).map_err(|e| DiagnosticsError::csv(path, e))?;
    let mut count = 0usize;
    for record in records {
        writer
            .serialize(record)
            .map_err(|e| DiagnosticsError::csv(path, e))?;
        count += 1;
    }
    writer.flush().map_err(|e| DiagnosticsError::io(path, e))?;
    debug!(records = count, "Wrote {:?}", path);
    Ok(())
}

/// One row per macro-particle, lost particles included.
pub fn write_particles(path: &Path, container: &ParticleContainer) -> Result<(), DiagnosticsError> {
    write_records(path, container.particles())
}

pub fn write_ref_particle(path: &Path, ref_particle: &RefParticle) -> Result<(), DiagnosticsError> {
    write_records(path, [RefParticleRecord::from(ref_particle)])
}

pub fn write_reduced(
    path: &Path,
    records: &[ReducedBeamCharacteristics],
) -> Result<(), DiagnosticsError> {
    write_records(path, records)
}
