use crate::cli::InspectArgs;
use crate::config::builder;
use crate::config::models::AppConfig;
use crate::error::Result;
use beamtrack::core::elements::{Element, Kinematics};
use std::fmt::Write;
use tracing::info;

pub async fn run(args: InspectArgs) -> Result<()> {
    info!("Inspecting input deck {:?}", &args.config);
    let app = builder::build_inspect_config(&args)?;
    print!("{}", render_report(&app));
    Ok(())
}

/// Reference kinematics, bunch, lattice table and linear map of a deck.
pub fn render_report(app: &AppConfig) -> String {
    let setup = &app.setup;
    let r = &setup.ref_particle;
    let mut out = String::new();

    let _ = writeln!(out, "Input deck: {}", app.deck_path.display());
    let _ = writeln!(out);
    let _ = writeln!(out, "Reference particle");
    let _ = writeln!(out, "  charge        {:>14} qe", r.charge_qe);
    let _ = writeln!(out, "  mass          {:>14.9} MeV", r.mass_mev);
    let _ = writeln!(out, "  kinetic       {:>14.6e} MeV", r.kin_energy_mev);
    let _ = writeln!(out, "  gamma         {:>14.6e}", r.gamma());
    let _ = writeln!(out, "  beta          {:>14.12}", r.beta());
    let _ = writeln!(out, "  beta*gamma    {:>14.6e}", r.beta_gamma());
    let _ = writeln!(out, "  rigidity      {:>14.6e} T*m", r.rigidity_tm());
    let _ = writeln!(out);

    let bunch = &setup.bunch;
    let p = bunch.distribution.params();
    let _ = writeln!(
        out,
        "Bunch: {} C in {} macro-particles, {} distribution",
        bunch.charge_c,
        bunch.num_particles,
        bunch.distribution.name()
    );
    let _ = writeln!(
        out,
        "  sigma (x, y, t)    = ({:e}, {:e}, {:e})",
        p.sigma_x, p.sigma_y, p.sigma_t
    );
    let _ = writeln!(
        out,
        "  sigma (px, py, pt) = ({:e}, {:e}, {:e})",
        p.sigma_px, p.sigma_py, p.sigma_pt
    );
    let _ = writeln!(
        out,
        "  mu (xpx, ypy, tpt) = ({}, {}, {})",
        p.mu_xpx, p.mu_ypy, p.mu_tpt
    );
    let _ = writeln!(out);

    let _ = writeln!(
        out,
        "{:>4}  {:<12} {:<12} {:>14} {:>10} {:>7} {:>14}",
        "#", "name", "kind", "ds [m]", "k [1/m^2]", "nslice", "s_end [m]"
    );
    let mut s = 0.0;
    for (i, (name, element)) in app.line.iter().zip(setup.lattice.iter()).enumerate() {
        s += element.ds();
        let k = element
            .strength()
            .map(|k| format!("{k}"))
            .unwrap_or_else(|| "-".to_string());
        let _ = writeln!(
            out,
            "{:>4}  {:<12} {:<12} {:>14.10} {:>10} {:>7} {:>14.10}",
            i,
            name,
            element.kind(),
            element.ds(),
            k,
            element.nslice(),
            s
        );
    }
    let _ = writeln!(
        out,
        "Total length: {:.10} m in {} slices",
        setup.lattice.total_length(),
        setup.lattice.total_slices()
    );
    if setup.lattice.iter().any(|e| matches!(e, Element::ChrDrift(_) | Element::ChrQuad(_))) {
        let _ = writeln!(
            out,
            "Chromatic elements are shown by their on-momentum linear map."
        );
    }
    let _ = writeln!(out);

    let kin = Kinematics::from(r);
    let map = setup.lattice.linear_map(&kin);
    let _ = writeln!(out, "Linear transfer map (x, px, y, py, t, pt)");
    for row in map.row_iter() {
        let cells: Vec<String> = row.iter().map(|v| format!("{:>13.6e}", v)).collect();
        let _ = writeln!(out, "  {}", cells.join(" "));
    }
    let _ = writeln!(out, "  det = {:.12}", map.determinant());
    out
}
