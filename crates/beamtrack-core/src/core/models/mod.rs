//! Particle models: the reference particle and the macro-particle container.

pub mod particle;
pub mod ref_particle;
