use crate::cli::RunArgs;
use crate::config::builder;
use crate::error::Result;
use crate::utils::progress::CliProgressHandler;
use beamtrack::engine::progress::ProgressReporter;
use beamtrack::workflows::track::{self, TrackingResult};
use std::fmt::Write;
use tracing::info;

pub async fn run(args: RunArgs, quiet: bool) -> Result<()> {
    info!("Building tracking setup from {:?}", &args.config);
    let app = builder::build_run_config(&args)?;
    let setup = &app.setup;

    let progress_handler = if quiet {
        CliProgressHandler::hidden()
    } else {
        CliProgressHandler::new()
    };
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    if !quiet {
        println!(
            "Tracking {} macro-particles through {} elements ({:.4} m)...",
            setup.bunch.num_particles,
            setup.lattice.len(),
            setup.lattice.total_length()
        );
    }
    info!("Invoking the core tracking workflow...");

    let result = tokio::task::block_in_place(|| track::run(setup, &reporter))?;

    if !quiet {
        print!("{}", render_summary(&result));
        if setup.config.diagnostics {
            println!(
                "✓ Diagnostics written to: {}",
                setup.config.output_dir.display()
            );
        }
    }
    Ok(())
}

/// Human-readable digest of a finished run.
pub fn render_summary(result: &TrackingResult) -> String {
    let s = &result.summary;
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Tracking complete: {} slices, final s = {:.6} m, {} particle(s) lost.",
        s.steps, s.final_s, s.lost
    );
    let _ = writeln!(out, "  {:<12} {:>14} {:>14}", "", "initial", "final");
    let rows = [
        ("sig_x [m]", s.initial.sig_x, s.final_state.sig_x),
        ("sig_y [m]", s.initial.sig_y, s.final_state.sig_y),
        ("sig_t [m]", s.initial.sig_t, s.final_state.sig_t),
        ("sig_pt", s.initial.sig_pt, s.final_state.sig_pt),
        ("emit_x [m]", s.initial.emittance_x, s.final_state.emittance_x),
        ("emit_y [m]", s.initial.emittance_y, s.final_state.emittance_y),
        ("emit_t [m]", s.initial.emittance_t, s.final_state.emittance_t),
    ];
    for (label, initial, last) in rows {
        let _ = writeln!(out, "  {:<12} {:>14.6e} {:>14.6e}", label, initial, last);
    }
    for (name, records) in &result.monitors {
        let _ = writeln!(out, "  monitor '{}': {} pass(es)", name, records.len());
    }
    out
}
