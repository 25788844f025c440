use super::config::SimulationConfig;
use super::error::EngineError;
use super::monitor::MonitorRegistry;
use super::progress::{Progress, ProgressReporter};
use super::push::push_slice;
use crate::core::constants::ELEMENTARY_CHARGE;
use crate::core::diagnostics::{ReducedBeamCharacteristics, output};
use crate::core::distribution::Distribution;
use crate::core::lattice::Lattice;
use crate::core::models::particle::ParticleContainer;
use crate::core::models::ref_particle::RefParticle;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::path::PathBuf;
use tracing::{debug, info, instrument, warn};

/// What an `evolve` call did to the bunch.
#[derive(Debug, Clone, PartialEq)]
pub struct EvolveSummary {
    pub initial: ReducedBeamCharacteristics,
    pub final_state: ReducedBeamCharacteristics,
    pub steps: usize,
    pub lost: usize,
    pub final_s: f64,
    pub monitor_passes: usize,
}

/// A beam-tracking simulation: particle container, lattice and diagnostics state.
///
/// The expected call sequence mirrors a run script:
///
/// 1. [`Simulation::new`] with a validated [`SimulationConfig`];
/// 2. [`Simulation::init_grids`] to prepare the output directory;
/// 3. set the reference particle through [`Simulation::ref_particle_mut`];
/// 4. [`Simulation::add_particles`] to sample the bunch;
/// 5. fill [`Simulation::lattice_mut`];
/// 6. [`Simulation::evolve`];
/// 7. [`Simulation::finalize`].
#[derive(Debug)]
pub struct Simulation {
    config: SimulationConfig,
    container: ParticleContainer,
    lattice: Lattice,
    monitors: MonitorRegistry,
    history: Vec<ReducedBeamCharacteristics>,
    rng: StdRng,
    step: usize,
    grids_initialized: bool,
}

impl Simulation {
    pub fn new(config: SimulationConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            config,
            container: ParticleContainer::new(),
            lattice: Lattice::new(),
            monitors: MonitorRegistry::default(),
            history: Vec::new(),
            rng,
            step: 0,
            grids_initialized: false,
        }
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Prepares the simulation domain. With diagnostics enabled, the output directory
    /// is given a clean state and any previous content is moved aside.
    #[instrument(skip_all, name = "init_grids")]
    pub fn init_grids(&mut self) -> Result<(), EngineError> {
        if self.config.space_charge {
            warn!("Space charge is requested but no field solver is available; evolve will refuse to run.");
        }
        if self.config.diagnostics {
            if let Some(previous) = output::prepare_output_dir(&self.config.output_dir)? {
                info!("Previous diagnostics preserved at {:?}", previous);
            }
        }
        info!(
            particle_shape = self.config.particle_shape,
            output_dir = ?self.config.output_dir,
            "Grids initialized."
        );
        self.grids_initialized = true;
        Ok(())
    }

    pub fn particle_container(&self) -> &ParticleContainer {
        &self.container
    }

    pub fn particle_container_mut(&mut self) -> &mut ParticleContainer {
        &mut self.container
    }

    pub fn ref_particle(&self) -> &RefParticle {
        self.container.ref_particle()
    }

    pub fn ref_particle_mut(&mut self) -> &mut RefParticle {
        self.container.ref_particle_mut()
    }

    pub fn lattice(&self) -> &Lattice {
        &self.lattice
    }

    pub fn lattice_mut(&mut self) -> &mut Lattice {
        &mut self.lattice
    }

    /// Reduced beam characteristics recorded so far, in tracking order.
    pub fn history(&self) -> &[ReducedBeamCharacteristics] {
        &self.history
    }

    pub fn monitor_records(&self, name: &str) -> Option<&[ReducedBeamCharacteristics]> {
        self.monitors.records(name)
    }

    pub fn monitor_names(&self) -> Vec<&str> {
        self.monitors.names().collect()
    }

    /// Samples `npart` macro-particles from `distribution` carrying `bunch_charge_c`
    /// coulombs in total, and appends them to the container.
    #[instrument(skip(self, distribution), fields(distribution = distribution.name()))]
    pub fn add_particles(
        &mut self,
        bunch_charge_c: f64,
        distribution: &Distribution,
        npart: usize,
    ) -> Result<(), EngineError> {
        if !self.grids_initialized {
            return Err(EngineError::GridsNotInitialized("add_particles"));
        }
        if npart == 0 {
            return Err(EngineError::InvalidBunch(
                "the number of macro-particles must be positive".to_string(),
            ));
        }
        if !bunch_charge_c.is_finite() || bunch_charge_c <= 0.0 {
            return Err(EngineError::InvalidBunch(format!(
                "bunch charge must be finite and positive (got {} C)",
                bunch_charge_c
            )));
        }
        self.container.ref_particle().validate()?;
        distribution.validate()?;

        let charge_qe = self.container.ref_particle().charge_qe.abs();
        let weight = bunch_charge_c / (charge_qe * ELEMENTARY_CHARGE * npart as f64);

        let rng = &mut self.rng;
        let coords: Vec<[f64; 6]> = (0..npart).map(|_| distribution.sample(rng)).collect();
        self.container.add_particles(coords, weight);

        info!(
            npart,
            weight,
            total = self.container.len(),
            "Bunch particles added."
        );
        Ok(())
    }

    /// Tracks the bunch through every element of the lattice, slice by slice.
    #[instrument(skip_all, name = "evolve")]
    pub fn evolve(&mut self, reporter: &ProgressReporter) -> Result<EvolveSummary, EngineError> {
        if !self.grids_initialized {
            return Err(EngineError::GridsNotInitialized("evolve"));
        }
        if self.config.space_charge {
            return Err(EngineError::Unsupported("space charge"));
        }
        self.container.ref_particle().validate()?;
        if self.container.is_empty() {
            return Err(EngineError::EmptyBunch);
        }
        if self.lattice.is_empty() {
            warn!("The lattice is empty; the bunch will not move.");
        }

        let output_dir: Option<PathBuf> = self
            .config
            .diagnostics
            .then(|| self.config.output_dir.clone());

        // === Initial diagnostics ===
        reporter.report(Progress::PhaseStart {
            name: "Initial Diagnostics",
        });
        let initial = ReducedBeamCharacteristics::compute(&self.container, self.step);
        self.history.push(initial);
        if let Some(dir) = &output_dir {
            output::write_particles(&dir.join("initial_beam.csv"), &self.container)?;
            output::write_ref_particle(
                &dir.join("initial_ref_particle.csv"),
                self.container.ref_particle(),
            )?;
        }
        reporter.report(Progress::PhaseFinish);

        // === Element loop ===
        reporter.report(Progress::PhaseStart { name: "Tracking" });
        reporter.report(Progress::TaskStart {
            total_steps: self.lattice.total_slices() as u64,
        });
        let first_step = self.step;

        for (index, element) in self.lattice.iter().enumerate() {
            debug!(
                index,
                kind = element.kind(),
                s = self.container.ref_particle().s,
                "Entering element."
            );

            if let Some(monitor) = element.as_monitor() {
                self.monitors
                    .record(monitor, &self.container, self.step, output_dir.as_deref())?;
                reporter.report(Progress::TaskIncrement);
                continue;
            }

            for _ in 0..element.nslice() {
                push_slice(&mut self.container, element);
                self.step += 1;
                if self.config.slice_step_diagnostics {
                    self.history
                        .push(ReducedBeamCharacteristics::compute(&self.container, self.step));
                }
                reporter.report(Progress::TaskIncrement);
            }

            if !self.config.slice_step_diagnostics {
                self.history
                    .push(ReducedBeamCharacteristics::compute(&self.container, self.step));
            }
        }
        reporter.report(Progress::TaskFinish);
        reporter.report(Progress::PhaseFinish);

        // === Final diagnostics ===
        reporter.report(Progress::PhaseStart {
            name: "Final Diagnostics",
        });
        let final_state = ReducedBeamCharacteristics::compute(&self.container, self.step);
        if let Some(dir) = &output_dir {
            output::write_particles(&dir.join("output_beam.csv"), &self.container)?;
            output::write_ref_particle(
                &dir.join("output_ref_particle.csv"),
                self.container.ref_particle(),
            )?;
            output::write_reduced(&dir.join("reduced_beam_characteristics.csv"), &self.history)?;
            self.monitors.write_series(dir)?;
        }
        reporter.report(Progress::PhaseFinish);

        let lost = self.container.num_lost();
        if lost > 0 {
            warn!(lost, "Particles were lost during tracking.");
        }

        let summary = EvolveSummary {
            initial,
            final_state,
            steps: self.step - first_step,
            lost,
            final_s: self.container.ref_particle().s,
            monitor_passes: self.monitors.total_passes(),
        };
        info!(
            steps = summary.steps,
            final_s = summary.final_s,
            lost = summary.lost,
            "Evolve finished."
        );
        Ok(summary)
    }

    /// Ends the run and releases the particle data.
    pub fn finalize(self) {
        info!(
            particles = self.container.len(),
            steps = self.step,
            monitors = self.monitors.names().count(),
            "Simulation finalized."
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::distribution::DistributionParams;
    use crate::core::elements::{BeamMonitor, ChrDrift, Drift};
    use crate::engine::config::SimulationConfigBuilder;
    use tempfile::tempdir;

    fn config(dir: PathBuf, diagnostics: bool) -> SimulationConfig {
        SimulationConfigBuilder::new()
            .particle_shape(2)
            .diagnostics(diagnostics)
            .output_dir(dir)
            .seed(Some(17))
            .build()
            .unwrap()
    }

    fn distribution() -> Distribution {
        Distribution::Gaussian(DistributionParams {
            sigma_x: 1e-3,
            sigma_y: 1e-3,
            sigma_t: 1e-3,
            sigma_px: 1e-4,
            sigma_py: 1e-4,
            sigma_pt: 1e-3,
            ..Default::default()
        })
    }

    fn ready_simulation(dir: PathBuf, diagnostics: bool) -> Simulation {
        let mut sim = Simulation::new(config(dir, diagnostics));
        sim.init_grids().unwrap();
        sim.ref_particle_mut()
            .set_charge_qe(1.0)
            .set_mass_mev(938.27208816)
            .set_kin_energy_mev(250.0);
        sim
    }

    #[test]
    fn add_particles_requires_initialized_grids() {
        let dir = tempdir().unwrap();
        let mut sim = Simulation::new(config(dir.path().join("diags"), false));
        let result = sim.add_particles(1e-9, &distribution(), 10);
        assert!(matches!(
            result,
            Err(EngineError::GridsNotInitialized("add_particles"))
        ));
    }

    #[test]
    fn add_particles_assigns_weight_from_bunch_charge() {
        let dir = tempdir().unwrap();
        let mut sim = ready_simulation(dir.path().join("diags"), false);
        sim.add_particles(1.0e-9, &distribution(), 1000).unwrap();

        let c = sim.particle_container();
        assert_eq!(c.len(), 1000);
        let expected_weight = 1.0e-9 / (ELEMENTARY_CHARGE * 1000.0);
        assert!((c.particles()[0].weight / expected_weight - 1.0).abs() < 1e-12);
        assert!((c.total_charge() - 1.0e-9).abs() < 1e-18);
    }

    #[test]
    fn add_particles_rejects_invalid_requests() {
        let dir = tempdir().unwrap();
        let mut sim = ready_simulation(dir.path().join("diags"), false);
        assert!(matches!(
            sim.add_particles(1e-9, &distribution(), 0),
            Err(EngineError::InvalidBunch(_))
        ));
        assert!(matches!(
            sim.add_particles(-1.0, &distribution(), 10),
            Err(EngineError::InvalidBunch(_))
        ));
        let bad = Distribution::Waterbag(DistributionParams {
            mu_xpx: 1.5,
            ..Default::default()
        });
        assert!(matches!(
            sim.add_particles(1e-9, &bad, 10),
            Err(EngineError::Distribution(_))
        ));
    }

    #[test]
    fn evolve_refuses_space_charge() {
        let dir = tempdir().unwrap();
        let config = SimulationConfigBuilder::new()
            .particle_shape(2)
            .space_charge(true)
            .diagnostics(false)
            .output_dir(dir.path().join("diags"))
            .build()
            .unwrap();
        let mut sim = Simulation::new(config);
        sim.init_grids().unwrap();
        sim.ref_particle_mut()
            .set_charge_qe(1.0)
            .set_mass_mev(938.27208816)
            .set_kin_energy_mev(250.0);
        sim.add_particles(1e-9, &distribution(), 10).unwrap();
        assert!(matches!(
            sim.evolve(&ProgressReporter::new()),
            Err(EngineError::Unsupported("space charge"))
        ));
    }

    #[test]
    fn evolve_on_empty_container_fails() {
        let dir = tempdir().unwrap();
        let mut sim = ready_simulation(dir.path().join("diags"), false);
        assert!(matches!(
            sim.evolve(&ProgressReporter::new()),
            Err(EngineError::EmptyBunch)
        ));
    }

    #[test]
    fn evolve_records_one_entry_per_element_without_slice_diagnostics() {
        let dir = tempdir().unwrap();
        let mut sim = ready_simulation(dir.path().join("diags"), false);
        sim.add_particles(1e-9, &distribution(), 200).unwrap();
        sim.lattice_mut()
            .extend::<_, crate::core::elements::Element>([
                BeamMonitor::new("mon", "summary").into(),
                Drift::new(1.0, 10).into(),
                ChrDrift::new(2.0, 5).into(),
                BeamMonitor::new("mon", "summary").into(),
            ])
            .unwrap();

        let summary = sim.evolve(&ProgressReporter::new()).unwrap();
        assert_eq!(summary.steps, 15);
        assert_eq!(summary.monitor_passes, 2);
        assert!((summary.final_s - 3.0).abs() < 1e-12);
        // initial + one per thick element
        assert_eq!(sim.history().len(), 3);
        assert_eq!(sim.monitor_records("mon").map(<[_]>::len), Some(2));
        // a drift only grows the beam
        assert!(summary.final_state.sig_x > summary.initial.sig_x);
        assert!(!dir.path().join("diags").exists());
        sim.finalize();
    }

    #[test]
    fn evolve_writes_diagnostics_files() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("diags");
        let mut sim = ready_simulation(out.clone(), true);
        sim.add_particles(1e-9, &distribution(), 50).unwrap();
        sim.lattice_mut()
            .extend::<_, crate::core::elements::Element>([
                BeamMonitor::new("monitor", "csv").into(),
                ChrDrift::new(1.0, 2).into(),
            ])
            .unwrap();
        sim.evolve(&ProgressReporter::new()).unwrap();

        for file in [
            "initial_beam.csv",
            "initial_ref_particle.csv",
            "output_beam.csv",
            "output_ref_particle.csv",
            "reduced_beam_characteristics.csv",
            "monitor_monitor.csv",
            "monitor_monitor_00001.csv",
        ] {
            assert!(out.join(file).exists(), "missing {file}");
        }
    }
}
