use super::ref_particle::RefParticle;
use crate::core::constants::ELEMENTARY_CHARGE;
use nalgebra::Vector6;
use serde::Serialize;

/// A macro-particle in reference-normalised phase-space coordinates.
///
/// `weight` is the number of real particles represented by this macro-particle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Particle {
    pub id: u64,
    pub x: f64,
    pub px: f64,
    pub y: f64,
    pub py: f64,
    pub t: f64,
    pub pt: f64,
    pub weight: f64,
    pub lost: bool,
}

impl Particle {
    pub fn new(id: u64, coords: [f64; 6], weight: f64) -> Self {
        let [x, px, y, py, t, pt] = coords;
        Self {
            id,
            x,
            px,
            y,
            py,
            t,
            pt,
            weight,
            lost: false,
        }
    }

    #[inline]
    pub fn phase_space(&self) -> Vector6<f64> {
        Vector6::new(self.x, self.px, self.y, self.py, self.t, self.pt)
    }

    #[inline]
    pub fn set_phase_space(&mut self, v: &Vector6<f64>) {
        self.x = v[0];
        self.px = v[1];
        self.y = v[2];
        self.py = v[3];
        self.t = v[4];
        self.pt = v[5];
    }
}

/// Owns the reference particle and every macro-particle of the bunch.
#[derive(Debug, Clone, Default)]
pub struct ParticleContainer {
    ref_particle: RefParticle,
    particles: Vec<Particle>,
    next_id: u64,
}

impl ParticleContainer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ref_particle(&self) -> &RefParticle {
        &self.ref_particle
    }

    pub fn ref_particle_mut(&mut self) -> &mut RefParticle {
        &mut self.ref_particle
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub(crate) fn particles_mut(&mut self) -> &mut [Particle] {
        &mut self.particles
    }

    /// Appends freshly sampled coordinates, assigning consecutive ids.
    pub fn add_particles(&mut self, coords: impl IntoIterator<Item = [f64; 6]>, weight: f64) {
        for c in coords {
            self.particles.push(Particle::new(self.next_id, c, weight));
            self.next_id += 1;
        }
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn num_alive(&self) -> usize {
        self.particles.iter().filter(|p| !p.lost).count()
    }

    pub fn num_lost(&self) -> usize {
        self.len() - self.num_alive()
    }

    /// Charge carried by the surviving macro-particles (C).
    pub fn total_charge(&self) -> f64 {
        let q = self.ref_particle.charge_qe * ELEMENTARY_CHARGE;
        self.particles
            .iter()
            .filter(|p| !p.lost)
            .map(|p| p.weight * q)
            .sum()
    }
}
