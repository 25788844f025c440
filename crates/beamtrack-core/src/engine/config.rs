use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),
    #[error("Particle shape must be 1, 2 or 3 (got {0})")]
    InvalidParticleShape(u8),
}

/// Numerical parameters and output control of a simulation run.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationConfig {
    /// B-spline order of the particle shape used for charge deposition.
    pub particle_shape: u8,
    /// Space-charge kicks between slices. Only `false` can be tracked.
    pub space_charge: bool,
    /// Write any diagnostics at all.
    pub diagnostics: bool,
    /// Record reduced beam characteristics after every slice instead of every element.
    pub slice_step_diagnostics: bool,
    pub output_dir: PathBuf,
    /// Seed for bunch sampling; `None` draws one from the OS.
    pub seed: Option<u64>,
}

#[derive(Default)]
pub struct SimulationConfigBuilder {
    particle_shape: Option<u8>,
    space_charge: Option<bool>,
    diagnostics: Option<bool>,
    slice_step_diagnostics: Option<bool>,
    output_dir: Option<PathBuf>,
    seed: Option<u64>,
}

impl SimulationConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn particle_shape(mut self, order: u8) -> Self {
        self.particle_shape = Some(order);
        self
    }
    pub fn space_charge(mut self, enabled: bool) -> Self {
        self.space_charge = Some(enabled);
        self
    }
    pub fn diagnostics(mut self, enabled: bool) -> Self {
        self.diagnostics = Some(enabled);
        self
    }
    pub fn slice_step_diagnostics(mut self, enabled: bool) -> Self {
        self.slice_step_diagnostics = Some(enabled);
        self
    }
    pub fn output_dir(mut self, dir: PathBuf) -> Self {
        self.output_dir = Some(dir);
        self
    }
    pub fn seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    pub fn build(self) -> Result<SimulationConfig, ConfigError> {
        let particle_shape = self
            .particle_shape
            .ok_or(ConfigError::MissingParameter("particle_shape"))?;
        if !(1..=3).contains(&particle_shape) {
            return Err(ConfigError::InvalidParticleShape(particle_shape));
        }
        Ok(SimulationConfig {
            particle_shape,
            space_charge: self.space_charge.unwrap_or(false),
            diagnostics: self.diagnostics.unwrap_or(true),
            slice_step_diagnostics: self.slice_step_diagnostics.unwrap_or(false),
            output_dir: self
                .output_dir
                .ok_or(ConfigError::MissingParameter("output_dir"))?,
            seed: self.seed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_applies_defaults_for_optional_switches() {
        let config = SimulationConfigBuilder::new()
            .particle_shape(2)
            .output_dir(PathBuf::from("diags"))
            .build()
            .unwrap();
        assert_eq!(config.particle_shape, 2);
        assert!(!config.space_charge);
        assert!(config.diagnostics);
        assert!(!config.slice_step_diagnostics);
        assert_eq!(config.seed, None);
    }

    #[test]
    fn missing_output_dir_is_reported() {
        let result = SimulationConfigBuilder::new().particle_shape(1).build();
        assert_eq!(result, Err(ConfigError::MissingParameter("output_dir")));
    }

    #[test]
    fn particle_shape_out_of_range_is_rejected() {
        let result = SimulationConfigBuilder::new()
            .particle_shape(4)
            .output_dir(PathBuf::from("diags"))
            .build();
        assert_eq!(result, Err(ConfigError::InvalidParticleShape(4)));
    }
}
