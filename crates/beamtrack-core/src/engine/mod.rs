//! # Engine Module
//!
//! The stateful layer of beamtrack. It owns the particle container and the lattice,
//! prepares the diagnostics directory, populates the bunch and drives the
//! element-by-element, slice-by-slice `evolve` loop.
//!
//! ## Architecture
//!
//! - **Configuration** ([`config`]) - Numerical parameters and output control, built via a builder
//! - **Simulation** ([`simulation`]) - Initialisation, bunch population, lattice and evolve
//! - **Progress Monitoring** ([`progress`]) - Callback-based progress events
//! - **Error Handling** ([`error`]) - Engine-level error type wrapping the core errors
//!
//! Particle pushes and moment reductions run in parallel through rayon when the
//! `parallel` feature is enabled.

pub mod config;
pub mod error;
pub(crate) mod monitor;
pub mod progress;
pub(crate) mod push;
pub mod simulation;
