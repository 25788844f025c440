use std::path::PathBuf;

/// Values used when neither the deck, `--set` nor a flag provides one.
pub struct DefaultsConfig {
    pub particle_shape: u8,
    pub space_charge: bool,
    pub diagnostics: bool,
    pub slice_step_diagnostics: bool,
    pub output_dir: PathBuf,
    pub num_particles: usize,
    pub nslice: usize,
    pub monitor_backend: String,
    pub correlation: f64,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            particle_shape: 2,
            space_charge: false,
            diagnostics: true,
            slice_step_diagnostics: false,
            output_dir: PathBuf::from("diags"),
            num_particles: 10_000,
            nslice: 1,
            monitor_backend: "csv".to_string(),
            correlation: 0.0,
        }
    }
}
