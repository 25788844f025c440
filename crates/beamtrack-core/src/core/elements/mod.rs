//! Beamline elements and their slice maps.
//!
//! Every thick element is split into `nslice` equal slices of length `ds / nslice`.
//! [`Element::slice_map`] resolves an element once per slice into a [`SliceMap`], which
//! is then applied to every particle of the bunch.

pub mod drift;
pub mod monitor;
pub mod quad;

pub use drift::{ChrDrift, Drift};
pub use monitor::{BeamMonitor, MonitorBackend};
pub use quad::{ChrQuad, Quad};

use crate::core::models::particle::Particle;
use crate::core::models::ref_particle::RefParticle;
use nalgebra::Matrix6;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ElementError {
    #[error("{kind}: length ds must be finite and non-negative (got {ds})")]
    InvalidLength { kind: &'static str, ds: f64 },
    #[error("{kind}: nslice must be at least 1")]
    InvalidSliceCount { kind: &'static str },
    #[error("{kind}: focusing strength k must be finite (got {k})")]
    InvalidStrength { kind: &'static str, k: f64 },
    #[error("Beam monitor name cannot be empty")]
    EmptyMonitorName,
    #[error("Beam monitor name '{0}' may only contain ASCII letters, digits, '_' and '-'")]
    InvalidMonitorName(String),
    #[error("Beam monitor '{monitor}' uses unknown backend '{backend}'")]
    UnknownBackend { monitor: String, backend: String },
}

/// Reference kinematics needed by the element maps.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Kinematics {
    pub beta: f64,
    pub beta_gamma: f64,
}

impl From<&RefParticle> for Kinematics {
    fn from(r: &RefParticle) -> Self {
        Self {
            beta: r.beta(),
            beta_gamma: r.beta_gamma(),
        }
    }
}

/// A single slice of an element, resolved against the reference kinematics.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SliceMap {
    Identity,
    Linear(Matrix6<f64>),
    ExactDrift { h: f64 },
    ChromaticQuad { h: f64, k: f64 },
}

impl SliceMap {
    #[inline]
    pub fn apply(&self, p: &mut Particle, kin: &Kinematics) {
        if p.lost {
            return;
        }
        match self {
            SliceMap::Identity => {}
            SliceMap::Linear(m) => {
                let v = m * p.phase_space();
                p.set_phase_space(&v);
            }
            SliceMap::ExactDrift { h } => drift::exact_drift(p, *h, kin),
            SliceMap::ChromaticQuad { h, k } => quad::chromatic_quad(p, *h, *k, kin),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum Element {
    Drift(Drift),
    ChrDrift(ChrDrift),
    Quad(Quad),
    ChrQuad(ChrQuad),
    BeamMonitor(BeamMonitor),
}

impl Element {
    pub fn kind(&self) -> &'static str {
        match self {
            Element::Drift(_) => "Drift",
            Element::ChrDrift(_) => "ChrDrift",
            Element::Quad(_) => "Quad",
            Element::ChrQuad(_) => "ChrQuad",
            Element::BeamMonitor(_) => "BeamMonitor",
        }
    }

    pub fn ds(&self) -> f64 {
        match self {
            Element::Drift(e) => e.ds,
            Element::ChrDrift(e) => e.ds,
            Element::Quad(e) => e.ds,
            Element::ChrQuad(e) => e.ds,
            Element::BeamMonitor(_) => 0.0,
        }
    }

    pub fn nslice(&self) -> usize {
        match self {
            Element::Drift(e) => e.nslice,
            Element::ChrDrift(e) => e.nslice,
            Element::Quad(e) => e.nslice,
            Element::ChrQuad(e) => e.nslice,
            Element::BeamMonitor(_) => 1,
        }
    }

    pub fn strength(&self) -> Option<f64> {
        match self {
            Element::Quad(e) => Some(e.k),
            Element::ChrQuad(e) => Some(e.k),
            _ => None,
        }
    }

    #[inline]
    pub fn slice_ds(&self) -> f64 {
        self.ds() / self.nslice() as f64
    }

    pub fn as_monitor(&self) -> Option<&BeamMonitor> {
        match self {
            Element::BeamMonitor(m) => Some(m),
            _ => None,
        }
    }

    pub fn validate(&self) -> Result<(), ElementError> {
        let kind = self.kind();
        if let Element::BeamMonitor(m) = self {
            if m.name.trim().is_empty() {
                return Err(ElementError::EmptyMonitorName);
            }
            // the name becomes part of the series file names
            if !m
                .name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
            {
                return Err(ElementError::InvalidMonitorName(m.name.clone()));
            }
            m.resolve_backend()?;
            return Ok(());
        }

        let ds = self.ds();
        if !ds.is_finite() || ds < 0.0 {
            return Err(ElementError::InvalidLength { kind, ds });
        }
        if self.nslice() == 0 {
            return Err(ElementError::InvalidSliceCount { kind });
        }
        if let Some(k) = self.strength() {
            if !k.is_finite() {
                return Err(ElementError::InvalidStrength { kind, k });
            }
        }
        Ok(())
    }

    pub fn slice_map(&self, kin: &Kinematics) -> SliceMap {
        let h = self.slice_ds();
        match self {
            Element::Drift(_) => SliceMap::Linear(drift::drift_matrix(h, kin)),
            Element::Quad(q) => SliceMap::Linear(quad::quad_matrix(h, q.k, kin)),
            Element::ChrDrift(_) => SliceMap::ExactDrift { h },
            Element::ChrQuad(q) => SliceMap::ChromaticQuad { h, k: q.k },
            Element::BeamMonitor(_) => SliceMap::Identity,
        }
    }

    /// First-order transfer matrix of the whole element. Chromatic elements are
    /// represented by their on-momentum linearisation.
    pub fn linear_matrix(&self, kin: &Kinematics) -> Matrix6<f64> {
        match self {
            Element::Drift(e) => drift::drift_matrix(e.ds, kin),
            Element::ChrDrift(e) => drift::drift_matrix(e.ds, kin),
            Element::Quad(e) => quad::quad_matrix(e.ds, e.k, kin),
            Element::ChrQuad(e) => quad::quad_matrix(e.ds, e.k, kin),
            Element::BeamMonitor(_) => Matrix6::identity(),
        }
    }
}

impl From<Drift> for Element {
    fn from(e: Drift) -> Self {
        Element::Drift(e)
    }
}

impl From<ChrDrift> for Element {
    fn from(e: ChrDrift) -> Self {
        Element::ChrDrift(e)
    }
}

impl From<Quad> for Element {
    fn from(e: Quad) -> Self {
        Element::Quad(e)
    }
}

impl From<ChrQuad> for Element {
    fn from(e: ChrQuad) -> Self {
        Element::ChrQuad(e)
    }
}

impl From<BeamMonitor> for Element {
    fn from(e: BeamMonitor) -> Self {
        Element::BeamMonitor(e)
    }
}
