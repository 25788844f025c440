//! # Workflows Module
//!
//! High-level entry points that run a complete tracking job in one call.
//!
//! ## Overview
//!
//! A workflow takes a fully declarative description of a run (simulation
//! configuration, reference particle, bunch and lattice), drives the
//! [`Simulation`](crate::engine::simulation::Simulation) through its whole
//! lifecycle and returns the results. This is the layer the command-line tool uses.
//!
//! ## Architecture
//!
//! - **Tracking Workflow** ([`track`]) - Initialise, populate the bunch, assemble the
//!   lattice, evolve and finalize.

pub mod track;
