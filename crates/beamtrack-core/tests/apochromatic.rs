use beamtrack::core::constants::ELECTRON_MASS_MEV;
use beamtrack::core::distribution::{Distribution, DistributionParams};
use beamtrack::core::elements::{BeamMonitor, ChrDrift, ChrQuad, Element};
use beamtrack::core::lattice::Lattice;
use beamtrack::core::models::ref_particle::RefParticle;
use beamtrack::engine::config::SimulationConfigBuilder;
use beamtrack::engine::progress::ProgressReporter;
use beamtrack::workflows::track::{self, BunchSpec, TrackingSetup};
use std::path::Path;
use tempfile::tempdir;

const NSLICE: usize = 25;

const QUADS: [(f64, f64); 8] = [
    (1.2258333333, 0.5884),
    (1.5677083333, -0.7525),
    (1.205625, 0.5787),
    (1.2502083333, -0.6001),
    (1.2502083333, 0.6001),
    (1.205625, -0.5787),
    (1.5677083333, 0.7525),
    (1.2258333333, -0.5884),
];

fn apochromatic_lattice() -> Lattice {
    let monitor = BeamMonitor::new("monitor", "csv");
    let dr1 = ChrDrift::new(1.0, NSLICE);
    let dr2 = ChrDrift::new(10.0, NSLICE);
    let q: Vec<ChrQuad> = QUADS
        .iter()
        .map(|&(ds, k)| ChrQuad::new(ds, k, NSLICE))
        .collect();

    let mut lattice = Lattice::new();
    lattice
        .extend::<_, Element>([
            monitor.clone().into(),
            dr1.into(),
            q[0].into(),
            q[1].into(),
            q[2].into(),
            dr2.into(),
            q[3].into(),
            q[4].into(),
            dr2.into(),
            q[5].into(),
            q[6].into(),
            q[7].into(),
            dr1.into(),
            monitor.into(),
        ])
        .unwrap();
    lattice
}

fn apochromatic_setup(output_dir: &Path, num_particles: usize) -> TrackingSetup {
    let mut ref_particle = RefParticle::new();
    ref_particle
        .set_charge_qe(-1.0)
        .set_mass_mev(0.510998950)
        .set_kin_energy_mev(100.0e3);

    TrackingSetup {
        config: SimulationConfigBuilder::new()
            .particle_shape(2)
            .space_charge(false)
            .slice_step_diagnostics(true)
            .output_dir(output_dir.to_path_buf())
            .seed(Some(2024))
            .build()
            .unwrap(),
        ref_particle,
        bunch: BunchSpec {
            charge_c: 1.0e-9,
            distribution: Distribution::Waterbag(DistributionParams {
                sigma_x: 1.288697604e-6,
                sigma_y: 1.288697604e-6,
                sigma_t: 1.0e-6,
                sigma_px: 3.965223396e-6,
                sigma_py: 3.965223396e-6,
                sigma_pt: 0.01,
                mu_xpx: 0.0,
                mu_ypy: 0.0,
                mu_tpt: 0.0,
            }),
            num_particles,
        },
        lattice: apochromatic_lattice(),
    }
}

#[test]
fn setup_holds_the_canonical_parameters() {
    let dir = tempdir().unwrap();
    let setup = apochromatic_setup(&dir.path().join("diags"), 100_000);

    assert_eq!(setup.config.particle_shape, 2);
    assert!(!setup.config.space_charge);
    assert!(setup.config.slice_step_diagnostics);
    assert_eq!(setup.ref_particle.charge_qe, -1.0);
    assert_eq!(setup.ref_particle.mass_mev, ELECTRON_MASS_MEV);
    assert_eq!(setup.ref_particle.kin_energy_mev, 100.0e3);
    assert_eq!(setup.bunch.charge_c, 1.0e-9);
    assert_eq!(setup.bunch.num_particles, 100_000);

    let kinds: Vec<_> = setup.lattice.iter().map(Element::kind).collect();
    assert_eq!(
        kinds,
        [
            "BeamMonitor",
            "ChrDrift",
            "ChrQuad",
            "ChrQuad",
            "ChrQuad",
            "ChrDrift",
            "ChrQuad",
            "ChrQuad",
            "ChrDrift",
            "ChrQuad",
            "ChrQuad",
            "ChrQuad",
            "ChrDrift",
            "BeamMonitor"
        ]
    );

    let strengths: Vec<f64> = setup.lattice.iter().filter_map(Element::strength).collect();
    let expected: Vec<f64> = QUADS.iter().map(|&(_, k)| k).collect();
    assert_eq!(strengths, expected);
    assert!(setup.lattice.iter().all(|e| e.nslice() == 1 || e.nslice() == NSLICE));
    assert!((setup.lattice.total_length() - 32.4987499998).abs() < 1e-9);
    assert_eq!(setup.lattice.total_slices(), 12 * NSLICE + 2);
}

#[test]
fn reduced_bunch_tracks_through_the_full_line() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("diags");
    let setup = apochromatic_setup(&out, 2_000);

    let result = track::run(&setup, &ProgressReporter::new()).unwrap();

    assert_eq!(result.summary.steps, 12 * NSLICE);
    assert_eq!(result.summary.lost, 0);
    assert_eq!(result.summary.monitor_passes, 2);
    assert!((result.summary.final_s - 32.4987499998).abs() < 1e-9);
    assert_eq!(result.history.len(), 12 * NSLICE + 1);
    assert_eq!(result.monitors["monitor"].len(), 2);

    let initial = &result.summary.initial;
    assert_eq!(initial.alive, 2_000);
    assert!((initial.charge_c.abs() - 1.0e-9).abs() < 1e-18);
    assert!((initial.sig_x / 1.288697604e-6 - 1.0).abs() < 0.1);
    assert!((initial.sig_pt / 0.01 - 1.0).abs() < 0.1);

    for file in [
        "initial_beam.csv",
        "initial_ref_particle.csv",
        "output_beam.csv",
        "output_ref_particle.csv",
        "reduced_beam_characteristics.csv",
        "monitor_monitor.csv",
        "monitor_monitor_00001.csv",
        "monitor_monitor_00002.csv",
    ] {
        assert!(out.join(file).is_file(), "missing {file}");
    }
}

#[test]
fn rerun_moves_previous_output_aside() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("diags");
    let setup = apochromatic_setup(&out, 50);

    track::run(&setup, &ProgressReporter::new()).unwrap();
    track::run(&setup, &ProgressReporter::new()).unwrap();

    assert!(out.join("output_beam.csv").is_file());
    assert!(dir.path().join("diags.old.1").join("output_beam.csv").is_file());
}

#[test]
fn seeded_runs_are_reproducible() {
    let dir = tempdir().unwrap();
    let a = apochromatic_setup(&dir.path().join("a"), 200);
    let b = apochromatic_setup(&dir.path().join("b"), 200);

    let ra = track::run(&a, &ProgressReporter::new()).unwrap();
    let rb = track::run(&b, &ProgressReporter::new()).unwrap();
    // parallel reductions may sum in a different order
    let close = |a: f64, b: f64| (a - b).abs() <= 1e-12 * a.abs().max(b.abs());
    for (x, y) in [
        (ra.summary.initial.sig_x, rb.summary.initial.sig_x),
        (ra.summary.initial.sig_pt, rb.summary.initial.sig_pt),
        (ra.summary.final_state.sig_x, rb.summary.final_state.sig_x),
        (ra.summary.final_state.emittance_y, rb.summary.final_state.emittance_y),
    ] {
        assert!(close(x, y), "{x} != {y}");
    }
}
