use crate::core::diagnostics::DiagnosticsError;
use crate::core::distribution::DistributionError;
use crate::core::elements::ElementError;
use crate::core::models::ref_particle::RefParticleError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Invalid reference particle: {0}")]
    RefParticle(#[from] RefParticleError),

    #[error("Invalid bunch distribution: {0}")]
    Distribution(#[from] DistributionError),

    #[error("Invalid lattice element: {0}")]
    Element(#[from] ElementError),

    #[error("Diagnostics output failed: {source}")]
    Diagnostics {
        #[from]
        source: DiagnosticsError,
    },

    #[error("Invalid bunch: {0}")]
    InvalidBunch(String),

    #[error("Grids are not initialized; call init_grids() before {0}")]
    GridsNotInitialized(&'static str),

    #[error("The particle container is empty, nothing to track")]
    EmptyBunch,

    #[error("Unsupported feature: {0}")]
    Unsupported(&'static str),
}
