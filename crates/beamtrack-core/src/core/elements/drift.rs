use super::Kinematics;
use crate::core::models::particle::Particle;
use nalgebra::Matrix6;
use serde::Serialize;

/// Field-free region, first-order (linear) map.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Drift {
    pub ds: f64,
    pub nslice: usize,
}

impl Drift {
    pub fn new(ds: f64, nslice: usize) -> Self {
        Self { ds, nslice }
    }
}

/// Field-free region with the exact, chromatic drift map.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ChrDrift {
    pub ds: f64,
    pub nslice: usize,
}

impl ChrDrift {
    pub fn new(ds: f64, nslice: usize) -> Self {
        Self { ds, nslice }
    }
}

/// Linear drift transfer matrix for a length `h`.
pub fn drift_matrix(h: f64, kin: &Kinematics) -> Matrix6<f64> {
    let mut m = Matrix6::identity();
    m[(0, 1)] = h;
    m[(2, 3)] = h;
    m[(4, 5)] = h / (kin.beta_gamma * kin.beta_gamma);
    m
}

/// Exact drift of length `h`. Marks the particle lost when its longitudinal
/// momentum becomes imaginary.
pub fn exact_drift(p: &mut Particle, h: f64, kin: &Kinematics) {
    let inv_beta = 1.0 / kin.beta;
    let inv_bg2 = 1.0 / (kin.beta_gamma * kin.beta_gamma);
    let arg = (p.pt - inv_beta).powi(2) - inv_bg2 - p.px * p.px - p.py * p.py;
    if !(arg > 0.0) {
        p.lost = true;
        return;
    }
    let pzden = arg.sqrt();

    p.x += h * p.px / pzden;
    p.y += h * p.py / pzden;
    p.t -= h * (inv_beta + (p.pt - inv_beta) / pzden);
}
