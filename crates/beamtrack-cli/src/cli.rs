use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    version,
    about = "beamtrack - track charged-particle bunches through drift and quadrupole lattices.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output and progress bars
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Set the number of threads used for particle pushes and beam moments.
    /// Defaults to the number of available logical cores.
    #[arg(short = 'j', long, global = true, value_name = "NUM")]
    pub threads: Option<usize>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Sample the bunch, track it through the lattice and write diagnostics.
    Run(RunArgs),
    /// Print the reference particle, the assembled lattice and its linear transfer map.
    Inspect(InspectArgs),
}

/// Arguments for the `run` subcommand.
#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// Path to the input deck in TOML format.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub config: PathBuf,

    /// Override the diagnostics output directory.
    #[arg(short, long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Override the sampling seed.
    #[arg(long, value_name = "INT")]
    pub seed: Option<u64>,

    /// Override the number of macro-particles.
    #[arg(short = 'n', long, value_name = "INT")]
    pub num_particles: Option<usize>,

    #[command(flatten)]
    pub diagnostics: DiagnosticsToggle,

    #[command(flatten)]
    pub slice_diagnostics: SliceDiagnosticsToggle,

    /// Set a specific deck value, overriding the config file.
    /// Can be used multiple times. Example: -S elements.q1.k=0.59
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE", num_args(0..))]
    pub set_values: Vec<String>,
}

/// Mutually exclusive flags overriding `simulation.diagnostics`.
#[derive(Args, Debug, Clone, Copy, Default)]
#[group(required = false, multiple = false)]
pub struct DiagnosticsToggle {
    /// Force writing the diagnostics output directory.
    #[arg(long)]
    pub diagnostics: bool,
    /// Track without writing any diagnostics files.
    #[arg(long)]
    pub no_diagnostics: bool,
}

/// Mutually exclusive flags overriding `simulation.slice-step-diagnostics`.
#[derive(Args, Debug, Clone, Copy, Default)]
#[group(required = false, multiple = false)]
pub struct SliceDiagnosticsToggle {
    /// Record reduced beam characteristics after every slice.
    #[arg(long)]
    pub slice_diagnostics: bool,
    /// Record reduced beam characteristics after every element only.
    #[arg(long)]
    pub no_slice_diagnostics: bool,
}

/// Arguments for the `inspect` subcommand.
#[derive(Args, Debug, Clone)]
pub struct InspectArgs {
    /// Path to the input deck in TOML format.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub config: PathBuf,

    /// Set a specific deck value, overriding the config file.
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE", num_args(0..))]
    pub set_values: Vec<String>,
}
