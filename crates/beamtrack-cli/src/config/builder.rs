use super::defaults::DefaultsConfig;
use super::file::{
    FileBunchConfig, FileConfig, FileDistributionConfig, FileDistributionKind, FileElement,
    FileRefParticleConfig,
};
use super::models::AppConfig;
use crate::cli::{InspectArgs, RunArgs};
use crate::error::{CliError, Result};
use crate::utils::parser::{self, ParseError};
use beamtrack::core::distribution::{Distribution, DistributionParams};
use beamtrack::core::elements::{BeamMonitor, ChrDrift, ChrQuad, Drift, Element, Quad};
use beamtrack::core::lattice::Lattice;
use beamtrack::core::models::ref_particle::RefParticle;
use beamtrack::engine::config::SimulationConfigBuilder;
use beamtrack::workflows::track::{BunchSpec, TrackingSetup};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Values given as dedicated command-line flags. They take precedence over the deck
/// and over `--set`.
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    pub output_dir: Option<PathBuf>,
    pub seed: Option<u64>,
    pub num_particles: Option<usize>,
    pub diagnostics: Option<bool>,
    pub slice_step_diagnostics: Option<bool>,
}

impl From<&RunArgs> for CliOverrides {
    fn from(args: &RunArgs) -> Self {
        let toggle = |on: bool, off: bool| match (on, off) {
            (true, false) => Some(true),
            (false, true) => Some(false),
            _ => None,
        };
        Self {
            output_dir: args.output_dir.clone(),
            seed: args.seed,
            num_particles: args.num_particles,
            diagnostics: toggle(args.diagnostics.diagnostics, args.diagnostics.no_diagnostics),
            slice_step_diagnostics: toggle(
                args.slice_diagnostics.slice_diagnostics,
                args.slice_diagnostics.no_slice_diagnostics,
            ),
        }
    }
}

pub fn build_run_config(args: &RunArgs) -> Result<AppConfig> {
    build_config(&args.config, &args.set_values, &CliOverrides::from(args))
}

pub fn build_inspect_config(args: &InspectArgs) -> Result<AppConfig> {
    build_config(&args.config, &args.set_values, &CliOverrides::default())
}

/// Merges defaults < deck file < `--set` values < dedicated flags into a tracking setup.
pub fn build_config(
    deck_path: &Path,
    set_values: &[String],
    overrides: &CliOverrides,
) -> Result<AppConfig> {
    let file_config = FileConfig::from_file(deck_path)?;
    let file_config = apply_set_values(file_config, set_values)?;
    let (line, setup) = build_setup(file_config, overrides)?;
    Ok(AppConfig {
        deck_path: deck_path.to_path_buf(),
        line,
        setup,
    })
}

pub fn build_setup(
    mut file_config: FileConfig,
    overrides: &CliOverrides,
) -> Result<(Vec<String>, TrackingSetup)> {
    let defaults = DefaultsConfig::default();

    let sim_file = file_config.simulation.take().unwrap_or_default();
    let config = SimulationConfigBuilder::new()
        .particle_shape(sim_file.particle_shape.unwrap_or(defaults.particle_shape))
        .space_charge(sim_file.space_charge.unwrap_or(defaults.space_charge))
        .diagnostics(
            overrides
                .diagnostics
                .or(sim_file.diagnostics)
                .unwrap_or(defaults.diagnostics),
        )
        .slice_step_diagnostics(
            overrides
                .slice_step_diagnostics
                .or(sim_file.slice_step_diagnostics)
                .unwrap_or(defaults.slice_step_diagnostics),
        )
        .output_dir(
            overrides
                .output_dir
                .clone()
                .or(sim_file.output_dir)
                .unwrap_or_else(|| defaults.output_dir.clone()),
        )
        .seed(overrides.seed.or(sim_file.seed))
        .build()
        .map_err(|e| CliError::Config(e.to_string()))?;

    let ref_particle = merge_ref_particle(file_config.reference_particle.take().unwrap_or_default())?;
    let bunch = merge_bunch(
        file_config.bunch.take().unwrap_or_default(),
        overrides.num_particles,
        &defaults,
    )?;

    let line = file_config
        .lattice
        .take()
        .ok_or_else(|| CliError::Config("`[lattice]` section with a `line` is required.".to_string()))?
        .line;
    let lattice = assemble_lattice(&line, &file_config.elements, &defaults)?;

    Ok((
        line,
        TrackingSetup {
            config,
            ref_particle,
            bunch,
            lattice,
        },
    ))
}

fn merge_ref_particle(file_val: FileRefParticleConfig) -> Result<RefParticle> {
    let required = |value: Option<f64>, key: &str| {
        value.ok_or_else(|| CliError::Config(format!("`reference-particle.{}` is required.", key)))
    };
    let mut ref_particle = RefParticle::new();
    ref_particle
        .set_charge_qe(required(file_val.charge_qe, "charge-qe")?)
        .set_mass_mev(required(file_val.mass_mev, "mass-mev")?)
        .set_kin_energy_mev(required(file_val.kin_energy_mev, "kin-energy-mev")?);
    ref_particle
        .validate()
        .map_err(|e| CliError::Config(e.to_string()))?;
    Ok(ref_particle)
}

fn merge_bunch(
    file_val: FileBunchConfig,
    cli_num_particles: Option<usize>,
    defaults: &DefaultsConfig,
) -> Result<BunchSpec> {
    let charge_c = file_val
        .charge_c
        .ok_or_else(|| CliError::Config("`bunch.charge-c` is required.".to_string()))?;
    let num_particles = cli_num_particles
        .or(file_val.num_particles)
        .unwrap_or(defaults.num_particles);
    let distribution = merge_distribution(
        file_val.distribution.ok_or_else(|| {
            CliError::Config("`[bunch.distribution]` section is required.".to_string())
        })?,
        defaults,
    )?;
    Ok(BunchSpec {
        charge_c,
        distribution,
        num_particles,
    })
}

fn merge_distribution(
    file_val: FileDistributionConfig,
    defaults: &DefaultsConfig,
) -> Result<Distribution> {
    let sigma = |value: Option<f64>, key: &str| {
        value.ok_or_else(|| {
            CliError::Config(format!("`bunch.distribution` requires `{}`", key))
        })
    };
    let params = DistributionParams {
        sigma_x: sigma(file_val.sigma_x, "sigma-x")?,
        sigma_y: sigma(file_val.sigma_y, "sigma-y")?,
        sigma_t: sigma(file_val.sigma_t, "sigma-t")?,
        sigma_px: sigma(file_val.sigma_px, "sigma-px")?,
        sigma_py: sigma(file_val.sigma_py, "sigma-py")?,
        sigma_pt: sigma(file_val.sigma_pt, "sigma-pt")?,
        mu_xpx: file_val.mu_xpx.unwrap_or(defaults.correlation),
        mu_ypy: file_val.mu_ypy.unwrap_or(defaults.correlation),
        mu_tpt: file_val.mu_tpt.unwrap_or(defaults.correlation),
    };
    params
        .validate()
        .map_err(|e| CliError::Config(e.to_string()))?;

    let kind = file_val.kind.ok_or_else(|| {
        CliError::Config("`bunch.distribution.type` is required (waterbag or gaussian).".to_string())
    })?;
    Ok(match kind {
        FileDistributionKind::Waterbag => Distribution::Waterbag(params),
        FileDistributionKind::Gaussian => Distribution::Gaussian(params),
    })
}

fn to_element(name: &str, file_val: &FileElement, defaults: &DefaultsConfig) -> Element {
    let slices = |n: Option<usize>| n.unwrap_or(defaults.nslice);
    match file_val {
        FileElement::Drift { ds, nslice } => Drift::new(*ds, slices(*nslice)).into(),
        FileElement::ChrDrift { ds, nslice } => ChrDrift::new(*ds, slices(*nslice)).into(),
        FileElement::Quad { ds, k, nslice } => Quad::new(*ds, *k, slices(*nslice)).into(),
        FileElement::ChrQuad { ds, k, nslice } => ChrQuad::new(*ds, *k, slices(*nslice)).into(),
        FileElement::BeamMonitor { name: label, backend } => BeamMonitor::new(
            label.as_deref().unwrap_or(name),
            backend.as_deref().unwrap_or(&defaults.monitor_backend),
        )
        .into(),
    }
}

/// Resolves the `line` names against the element table, keeping their order.
fn assemble_lattice(
    line: &[String],
    elements: &BTreeMap<String, FileElement>,
    defaults: &DefaultsConfig,
) -> Result<Lattice> {
    let mut resolved = Vec::with_capacity(line.len());
    for name in line {
        let file_val = elements.get(name).ok_or_else(|| {
            CliError::Config(format!(
                "Lattice line references unknown element '{}'.",
                name
            ))
        })?;
        resolved.push(to_element(name, file_val, defaults));
    }

    let used: BTreeSet<&str> = line.iter().map(String::as_str).collect();
    for name in elements.keys().filter(|n| !used.contains(n.as_str())) {
        warn!("Element '{}' is defined but not used in the lattice line.", name);
    }

    let mut lattice = Lattice::new();
    lattice.extend(resolved).map_err(|e| CliError::Config(e.to_string()))?;
    debug!(
        elements = lattice.len(),
        length_m = lattice.total_length(),
        "Lattice assembled from deck."
    );
    Ok(lattice)
}

fn parse_error(e: ParseError) -> CliError {
    CliError::Argument(e.to_string())
}

fn float(key: &str, value: &str) -> Result<f64> {
    parser::parse_value(key, value, "float").map_err(parse_error)
}

fn integer<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    parser::parse_value(key, value, "integer").map_err(parse_error)
}

fn boolean(key: &str, value: &str) -> Result<bool> {
    parser::parse_value(key, value, "boolean").map_err(parse_error)
}

fn apply_element_value(
    config: &mut FileConfig,
    key: &str,
    name: &str,
    field: &str,
    value: &str,
) -> Result<()> {
    let element = config.elements.get_mut(name).ok_or_else(|| {
        CliError::Config(format!("--set refers to unknown element '{}' in '{}'", name, key))
    })?;
    match (element, field) {
        (
            FileElement::Drift { ds, .. }
            | FileElement::ChrDrift { ds, .. }
            | FileElement::Quad { ds, .. }
            | FileElement::ChrQuad { ds, .. },
            "ds",
        ) => *ds = float(key, value)?,
        (FileElement::Quad { k, .. } | FileElement::ChrQuad { k, .. }, "k") => {
            *k = float(key, value)?
        }
        (
            FileElement::Drift { nslice, .. }
            | FileElement::ChrDrift { nslice, .. }
            | FileElement::Quad { nslice, .. }
            | FileElement::ChrQuad { nslice, .. },
            "nslice",
        ) => *nslice = Some(integer(key, value)?),
        (FileElement::BeamMonitor { name, .. }, "name") => *name = Some(value.to_string()),
        (FileElement::BeamMonitor { backend, .. }, "backend") => {
            *backend = Some(value.to_string())
        }
        _ => {
            return Err(CliError::Config(format!(
                "Unsupported element field for --set: '{}'",
                key
            )));
        }
    }
    Ok(())
}

fn apply_set_values(mut config: FileConfig, set_values: &[String]) -> Result<FileConfig> {
    for kv_pair in set_values {
        let (key, value) = parser::parse_key_value(kv_pair).map_err(parse_error)?;

        if let Some(element_key) = parser::parse_element_key(key) {
            let (name, field) = element_key.map_err(parse_error)?;
            apply_element_value(&mut config, key, name, field, value)?;
            continue;
        }

        match key {
            "simulation.particle-shape" => {
                config
                    .simulation
                    .get_or_insert_with(Default::default)
                    .particle_shape = Some(integer(key, value)?)
            }
            "simulation.space-charge" => {
                config
                    .simulation
                    .get_or_insert_with(Default::default)
                    .space_charge = Some(boolean(key, value)?)
            }
            "simulation.diagnostics" => {
                config
                    .simulation
                    .get_or_insert_with(Default::default)
                    .diagnostics = Some(boolean(key, value)?)
            }
            "simulation.slice-step-diagnostics" => {
                config
                    .simulation
                    .get_or_insert_with(Default::default)
                    .slice_step_diagnostics = Some(boolean(key, value)?)
            }
            "simulation.output-dir" => {
                config
                    .simulation
                    .get_or_insert_with(Default::default)
                    .output_dir = Some(PathBuf::from(value))
            }
            "simulation.seed" => {
                config
                    .simulation
                    .get_or_insert_with(Default::default)
                    .seed = Some(integer(key, value)?)
            }
            "reference-particle.charge-qe" => {
                config
                    .reference_particle
                    .get_or_insert_with(Default::default)
                    .charge_qe = Some(float(key, value)?)
            }
            "reference-particle.mass-mev" => {
                config
                    .reference_particle
                    .get_or_insert_with(Default::default)
                    .mass_mev = Some(float(key, value)?)
            }
            "reference-particle.kin-energy-mev" => {
                config
                    .reference_particle
                    .get_or_insert_with(Default::default)
                    .kin_energy_mev = Some(float(key, value)?)
            }
            "bunch.charge-c" => {
                config
                    .bunch
                    .get_or_insert_with(Default::default)
                    .charge_c = Some(float(key, value)?)
            }
            "bunch.num-particles" => {
                config
                    .bunch
                    .get_or_insert_with(Default::default)
                    .num_particles = Some(integer(key, value)?)
            }
            "bunch.distribution.type" => {
                let kind = match value {
                    "waterbag" => FileDistributionKind::Waterbag,
                    "gaussian" => FileDistributionKind::Gaussian,
                    _ => {
                        return Err(CliError::Config(format!(
                            "Unknown distribution type '{}'. Expected 'waterbag' or 'gaussian'.",
                            value
                        )));
                    }
                };
                distribution(&mut config).kind = Some(kind);
            }
            _ => match key.strip_prefix("bunch.distribution.") {
                Some(field) => {
                    let v = Some(float(key, value)?);
                    let d = distribution(&mut config);
                    match field {
                        "sigma-x" => d.sigma_x = v,
                        "sigma-y" => d.sigma_y = v,
                        "sigma-t" => d.sigma_t = v,
                        "sigma-px" => d.sigma_px = v,
                        "sigma-py" => d.sigma_py = v,
                        "sigma-pt" => d.sigma_pt = v,
                        "mu-xpx" => d.mu_xpx = v,
                        "mu-ypy" => d.mu_ypy = v,
                        "mu-tpt" => d.mu_tpt = v,
                        _ => {
                            return Err(CliError::Config(format!(
                                "Unsupported configuration key for --set: '{}'",
                                key
                            )));
                        }
                    }
                }
                None => {
                    return Err(CliError::Config(format!(
                        "Unsupported configuration key for --set: '{}'",
                        key
                    )));
                }
            },
        }
    }
    Ok(config)
}

fn distribution(config: &mut FileConfig) -> &mut FileDistributionConfig {
    config
        .bunch
        .get_or_insert_with(Default::default)
        .distribution
        .get_or_insert_with(Default::default)
}
