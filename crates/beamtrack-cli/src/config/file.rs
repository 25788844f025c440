use crate::error::{CliError, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct FileSimulationConfig {
    pub particle_shape: Option<u8>,
    pub space_charge: Option<bool>,
    pub diagnostics: Option<bool>,
    pub slice_step_diagnostics: Option<bool>,
    pub output_dir: Option<PathBuf>,
    pub seed: Option<u64>,
}

#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct FileRefParticleConfig {
    pub charge_qe: Option<f64>,
    pub mass_mev: Option<f64>,
    pub kin_energy_mev: Option<f64>,
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum FileDistributionKind {
    Waterbag,
    Gaussian,
}

#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct FileDistributionConfig {
    #[serde(rename = "type")]
    pub kind: Option<FileDistributionKind>,
    pub sigma_x: Option<f64>,
    pub sigma_y: Option<f64>,
    pub sigma_t: Option<f64>,
    pub sigma_px: Option<f64>,
    pub sigma_py: Option<f64>,
    pub sigma_pt: Option<f64>,
    pub mu_xpx: Option<f64>,
    pub mu_ypy: Option<f64>,
    pub mu_tpt: Option<f64>,
}

#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct FileBunchConfig {
    pub charge_c: Option<f64>,
    pub num_particles: Option<usize>,
    pub distribution: Option<FileDistributionConfig>,
}

/// A named element definition. Thick elements default to one slice; a monitor
/// without a `name` takes the table key.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields, rename_all = "kebab-case", tag = "type")]
pub enum FileElement {
    Drift {
        ds: f64,
        nslice: Option<usize>,
    },
    ChrDrift {
        ds: f64,
        nslice: Option<usize>,
    },
    Quad {
        ds: f64,
        k: f64,
        nslice: Option<usize>,
    },
    ChrQuad {
        ds: f64,
        k: f64,
        nslice: Option<usize>,
    },
    BeamMonitor {
        name: Option<String>,
        backend: Option<String>,
    },
}

#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct FileLatticeConfig {
    pub line: Vec<String>,
}

/// The TOML input deck as written by the user, before defaults are applied.
#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct FileConfig {
    pub simulation: Option<FileSimulationConfig>,
    pub reference_particle: Option<FileRefParticleConfig>,
    pub bunch: Option<FileBunchConfig>,
    #[serde(default)]
    pub elements: BTreeMap<String, FileElement>,
    pub lattice: Option<FileLatticeConfig>,
}

impl FileConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading input deck from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })
    }

    pub fn from_toml(content: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(content)
    }
}
