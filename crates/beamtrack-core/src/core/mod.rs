//! # Core Module
//!
//! Fundamental building blocks for beam tracking: the reference particle and the
//! macro-particle container, statistical bunch distributions, beamline elements and
//! their transfer maps, the lattice, and beam diagnostics.
//!
//! ## Architecture
//!
//! - **Physical Constants** ([`constants`]) - CODATA values used across the crate
//! - **Particle Models** ([`models`]) - Reference particle kinematics and macro-particles
//! - **Distributions** ([`distribution`]) - Moment-based sampling of six-dimensional bunches
//! - **Elements** ([`elements`]) - Drifts, quadrupoles and monitors with their slice maps
//! - **Lattice** ([`lattice`]) - Ordered sequence of elements traversed during tracking
//! - **Diagnostics** ([`diagnostics`]) - Reduced beam characteristics and CSV output
//!
//! ## Coordinate Convention
//!
//! Particles carry `(x, px, y, py, t, pt)` relative to the reference particle:
//! `x`, `y` and `t` (c times the arrival-time delay) in meters, and the momenta
//! normalised to the reference momentum, with `pt = -ΔE / (p₀c)`.

pub mod constants;
pub mod diagnostics;
pub mod distribution;
pub mod elements;
pub mod lattice;
pub mod models;
