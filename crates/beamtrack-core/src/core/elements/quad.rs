use super::Kinematics;
use crate::core::models::particle::Particle;
use nalgebra::Matrix6;
use serde::Serialize;

/// Quadrupole with the linear (on-momentum) map.
///
/// `k` is the normalised gradient in 1/m²; `k > 0` focuses horizontally.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Quad {
    pub ds: f64,
    pub k: f64,
    pub nslice: usize,
}

impl Quad {
    pub fn new(ds: f64, k: f64, nslice: usize) -> Self {
        Self { ds, k, nslice }
    }
}

/// Quadrupole whose focusing strength scales with the particle's momentum deviation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ChrQuad {
    pub ds: f64,
    pub k: f64,
    pub nslice: usize,
}

impl ChrQuad {
    pub fn new(ds: f64, k: f64, nslice: usize) -> Self {
        Self { ds, k, nslice }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Plane {
    Focusing,
    Defocusing,
    Free,
}

fn planes(k: f64) -> (Plane, Plane) {
    if k > 0.0 {
        (Plane::Focusing, Plane::Defocusing)
    } else if k < 0.0 {
        (Plane::Defocusing, Plane::Focusing)
    } else {
        (Plane::Free, Plane::Free)
    }
}

/// 2×2 block `[[m11, m12], [m21, m22]]` for one transverse plane with `δ1 = 1`.
fn plane_block(plane: Plane, h: f64, omega: f64) -> [[f64; 2]; 2] {
    match plane {
        Plane::Focusing => {
            let (s, c) = (omega * h).sin_cos();
            [[c, s / omega], [-omega * s, c]]
        }
        Plane::Defocusing => {
            let (s, c) = ((omega * h).sinh(), (omega * h).cosh());
            [[c, s / omega], [omega * s, c]]
        }
        Plane::Free => [[1.0, h], [0.0, 1.0]],
    }
}

/// Linear quadrupole transfer matrix for a length `h`.
pub fn quad_matrix(h: f64, k: f64, kin: &Kinematics) -> Matrix6<f64> {
    let omega = k.abs().sqrt();
    let (px, py) = planes(k);
    let bx = plane_block(px, h, omega);
    let by = plane_block(py, h, omega);

    let mut m = Matrix6::identity();
    for i in 0..2 {
        for j in 0..2 {
            m[(i, j)] = bx[i][j];
            m[(2 + i, 2 + j)] = by[i][j];
        }
    }
    m[(4, 5)] = h / (kin.beta_gamma * kin.beta_gamma);
    m
}

/// Advances one plane of the chromatic quadrupole and returns the new `(q, p)` plus
/// `∫ p² ds` over the slice, which feeds the time-of-flight update.
fn advance_plane(q: f64, p: f64, h: f64, omega: f64, delta1: f64, plane: Plane) -> (f64, f64, f64) {
    match plane {
        Plane::Free => (q + h * p / delta1, p, h * p * p),
        Plane::Focusing => {
            let (s, c) = (omega * h).sin_cos();
            let a = omega * delta1 * q;
            let s2 = (2.0 * omega * h).sin() / (4.0 * omega);
            let integral = a * a * (h / 2.0 - s2) + p * p * (h / 2.0 + s2) - a * p * s * s / omega;
            (c * q + s / (omega * delta1) * p, -a * s + c * p, integral)
        }
        Plane::Defocusing => {
            let (s, c) = ((omega * h).sinh(), (omega * h).cosh());
            let a = omega * delta1 * q;
            let s2 = (2.0 * omega * h).sinh() / (4.0 * omega);
            let integral = a * a * (s2 - h / 2.0) + p * p * (s2 + h / 2.0) + a * p * s * s / omega;
            (c * q + s / (omega * delta1) * p, a * s + c * p, integral)
        }
    }
}

/// Chromatic quadrupole slice of length `h` in the paraxial approximation.
///
/// The focusing strength seen by a particle is `k / δ1` with
/// `δ1 = sqrt(1 - 2 pt / β + pt²)`, the relative total momentum.
pub fn chromatic_quad(p: &mut Particle, h: f64, k: f64, kin: &Kinematics) {
    let inv_beta = 1.0 / kin.beta;
    let d2 = 1.0 - 2.0 * p.pt * inv_beta + p.pt * p.pt;
    if !(d2 > 0.0) {
        p.lost = true;
        return;
    }
    let delta1 = d2.sqrt();
    let omega = (k.abs() / delta1).sqrt();
    let (plane_x, plane_y) = planes(k);

    let (x, px, ix) = advance_plane(p.x, p.px, h, omega, delta1, plane_x);
    let (y, py, iy) = advance_plane(p.y, p.py, h, omega, delta1, plane_y);

    let dt_dpt = inv_beta - p.pt;
    p.t += h * dt_dpt / delta1 - h * inv_beta + dt_dpt / (2.0 * d2 * delta1) * (ix + iy);
    p.x = x;
    p.px = px;
    p.y = y;
    p.py = py;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::elements::drift::drift_matrix;

    fn kin() -> Kinematics {
        let gamma: f64 = 1.0 + 100.0e3 / 0.510998950;
        let beta_gamma = (gamma * gamma - 1.0).sqrt();
        Kinematics {
            beta: beta_gamma / gamma,
            beta_gamma,
        }
    }

    #[test]
    fn quad_matrix_is_symplectic() {
        for k in [0.5884, -0.7525, 0.0] {
            let m = quad_matrix(1.2258333333, k, &kin());
            assert!((m.determinant() - 1.0).abs() < 1e-10, "k = {k}");
        }
    }

    #[test]
    fn zero_strength_quad_is_a_drift() {
        let q = quad_matrix(1.5, 0.0, &kin());
        let d = drift_matrix(1.5, &kin());
        assert!((q - d).abs().max() < 1e-15);
    }

    #[test]
    fn slices_compose_to_the_full_element() {
        let k = kin();
        let full = quad_matrix(1.0, 0.6, &k);
        let slice = quad_matrix(0.04, 0.6, &k);
        let composed = (0..25).fold(Matrix6::identity(), |acc, _| slice * acc);
        assert!((full - composed).abs().max() < 1e-12);
    }

    #[test]
    fn focusing_plane_swaps_with_sign_of_k() {
        let m = quad_matrix(1.0, 0.5, &kin());
        assert!(m[(1, 0)] < 0.0);
        assert!(m[(3, 2)] > 0.0);

        let m = quad_matrix(1.0, -0.5, &kin());
        assert!(m[(1, 0)] > 0.0);
        assert!(m[(3, 2)] < 0.0);
    }

    #[test]
    fn chromatic_quad_on_momentum_matches_linear_transverse_map() {
        let k = kin();
        let coords = [1e-6, 3e-6, -2e-6, 1e-6, 0.0, 0.0];
        let mut chromatic = Particle::new(0, coords, 1.0);
        chromatic_quad(&mut chromatic, 1.2, 0.5787, &k);

        let v = quad_matrix(1.2, 0.5787, &k) * Particle::new(1, coords, 1.0).phase_space();
        assert!((chromatic.x - v[0]).abs() < 1e-15);
        assert!((chromatic.px - v[1]).abs() < 1e-15);
        assert!((chromatic.y - v[2]).abs() < 1e-15);
        assert!((chromatic.py - v[3]).abs() < 1e-15);
    }

    #[test]
    fn higher_momentum_particles_are_focused_less() {
        let k = kin();
        // pt < 0 means more energy than the reference
        let mut on = Particle::new(0, [1e-3, 0.0, 0.0, 0.0, 0.0, 0.0], 1.0);
        let mut off = Particle::new(1, [1e-3, 0.0, 0.0, 0.0, 0.0, -0.05], 1.0);
        chromatic_quad(&mut on, 1.0, 0.6, &k);
        chromatic_quad(&mut off, 1.0, 0.6, &k);
        assert!(off.x > on.x);
    }

    #[test]
    fn betatron_motion_delays_the_particle() {
        let k = kin();
        let mut p = Particle::new(0, [1e-3, 0.0, 1e-3, 0.0, 0.0, 0.0], 1.0);
        chromatic_quad(&mut p, 1.0, 0.6, &k);
        assert!(p.t > 0.0);
    }

    #[test]
    fn chromatic_quad_slices_compose_to_the_full_element() {
        let k = kin();
        let coords = [1e-3, -2e-4, 5e-4, 3e-4, 0.0, 2e-3];
        for strength in [0.5884, -0.7525] {
            let mut whole = Particle::new(0, coords, 1.0);
            chromatic_quad(&mut whole, 1.0, strength, &k);

            let mut sliced = Particle::new(1, coords, 1.0);
            for _ in 0..8 {
                chromatic_quad(&mut sliced, 1.0 / 8.0, strength, &k);
            }

            assert!((whole.x - sliced.x).abs() < 1e-15, "k = {strength}");
            assert!((whole.px - sliced.px).abs() < 1e-15, "k = {strength}");
            assert!((whole.y - sliced.y).abs() < 1e-15, "k = {strength}");
            assert!((whole.py - sliced.py).abs() < 1e-15, "k = {strength}");
            assert!((whole.t - sliced.t).abs() < 1e-14, "k = {strength}");
            assert_eq!(whole.pt, sliced.pt);
        }
    }
}
