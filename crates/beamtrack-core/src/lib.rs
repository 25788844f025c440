//! # beamtrack Core Library
//!
//! A library for tracking charged-particle bunches through beamline lattices made of
//! drifts, quadrupoles and beam monitors.
//!
//! ## Architectural Philosophy
//!
//! The library follows a three-layer architecture so that physics, orchestration and
//! user-facing entry points stay separate.
//!
//! - **[`core`]: The Foundation.** Stateless data models (`RefParticle`, `ParticleContainer`),
//!   bunch distributions, beamline elements with their pure push maps, the `Lattice`,
//!   reduced beam characteristics and CSV diagnostics writers.
//!
//! - **[`engine`]: The Logic Core.** The stateful `Simulation` that owns the particle
//!   container and the lattice, initialises the diagnostics directory, populates the
//!   bunch and drives the element-by-element `evolve` loop.
//!
//! - **[`workflows`]: The Public API.** Runs a complete tracking job from a declarative
//!   `TrackingSetup`, which is what the command-line tool uses.

pub mod core;
pub mod engine;
pub mod workflows;
