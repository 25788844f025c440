use crate::core::diagnostics::ReducedBeamCharacteristics;
use crate::core::distribution::Distribution;
use crate::core::lattice::Lattice;
use crate::core::models::ref_particle::RefParticle;
use crate::engine::config::SimulationConfig;
use crate::engine::error::EngineError;
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::simulation::{EvolveSummary, Simulation};
use std::collections::BTreeMap;
use tracing::{info, instrument};

/// The particle bunch to inject: total charge, shape and macro-particle count.
#[derive(Debug, Clone, PartialEq)]
pub struct BunchSpec {
    /// Total bunch charge (C).
    pub charge_c: f64,
    pub distribution: Distribution,
    pub num_particles: usize,
}

/// Everything needed to run one tracking job.
#[derive(Debug, Clone)]
pub struct TrackingSetup {
    pub config: SimulationConfig,
    pub ref_particle: RefParticle,
    pub bunch: BunchSpec,
    pub lattice: Lattice,
}

#[derive(Debug, Clone)]
pub struct TrackingResult {
    pub summary: EvolveSummary,
    /// Reduced beam characteristics in tracking order, starting at step 0.
    pub history: Vec<ReducedBeamCharacteristics>,
    /// Per-pass records of every beam monitor, keyed by monitor name.
    pub monitors: BTreeMap<String, Vec<ReducedBeamCharacteristics>>,
    pub final_ref_particle: RefParticle,
}

#[instrument(skip_all, name = "tracking_workflow")]
pub fn run(setup: &TrackingSetup, reporter: &ProgressReporter) -> Result<TrackingResult, EngineError> {
    // === Phase 0: Initialisation ===
    reporter.report(Progress::PhaseStart {
        name: "Initialization",
    });
    info!(
        elements = setup.lattice.len(),
        length_m = setup.lattice.total_length(),
        npart = setup.bunch.num_particles,
        "Starting tracking workflow."
    );

    let mut sim = Simulation::new(setup.config.clone());
    sim.init_grids()?;

    let r = &setup.ref_particle;
    sim.ref_particle_mut()
        .set_charge_qe(r.charge_qe)
        .set_mass_mev(r.mass_mev)
        .set_kin_energy_mev(r.kin_energy_mev);
    sim.ref_particle().validate()?;
    reporter.report(Progress::PhaseFinish);

    // === Phase 1: Bunch ===
    reporter.report(Progress::PhaseStart {
        name: "Bunch Initialization",
    });
    sim.add_particles(
        setup.bunch.charge_c,
        &setup.bunch.distribution,
        setup.bunch.num_particles,
    )?;
    reporter.report(Progress::PhaseFinish);

    // === Phase 2: Lattice ===
    sim.lattice_mut().extend(setup.lattice.iter().cloned())?;
    reporter.report(Progress::Message(format!(
        "Lattice assembled: {} elements, {} slices",
        sim.lattice().len(),
        sim.lattice().total_slices()
    )));

    // === Phase 3: Tracking ===
    let summary = sim.evolve(reporter)?;

    // === Phase 4: Collect results ===
    let monitors = sim
        .monitor_names()
        .into_iter()
        .filter_map(|name| {
            sim.monitor_records(name)
                .map(|records| (name.to_string(), records.to_vec()))
        })
        .collect();
    let result = TrackingResult {
        summary,
        history: sim.history().to_vec(),
        monitors,
        final_ref_particle: *sim.ref_particle(),
    };
    sim.finalize();

    info!(
        steps = result.summary.steps,
        lost = result.summary.lost,
        "Tracking workflow complete."
    );
    Ok(result)
}
