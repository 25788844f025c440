use crate::core::constants::SPEED_OF_LIGHT;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum RefParticleError {
    #[error("Reference particle rest mass must be finite and positive (got {0} MeV)")]
    InvalidMass(f64),
    #[error("Reference particle kinetic energy must be finite and positive (got {0} MeV)")]
    InvalidKineticEnergy(f64),
    #[error("Reference particle charge must be finite and non-zero (got {0} qe)")]
    InvalidCharge(f64),
}

/// The design particle that the bunch coordinates are measured against.
///
/// Species and energy are set once through the chainable setters before tracking;
/// afterwards the engine only advances the path length `s` and the time-of-flight
/// coordinate `t` as the reference moves through the lattice.
///
/// A freshly constructed reference particle is unset (all zeros) and fails
/// [`RefParticle::validate`].
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct RefParticle {
    /// Charge in units of the elementary charge.
    pub charge_qe: f64,
    /// Rest energy in MeV.
    pub mass_mev: f64,
    /// Kinetic energy in MeV.
    pub kin_energy_mev: f64,
    /// Integrated path length along the lattice (m).
    pub s: f64,
    /// Time of flight times c (m).
    pub t: f64,
}

impl RefParticle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_charge_qe(&mut self, charge_qe: f64) -> &mut Self {
        self.charge_qe = charge_qe;
        self
    }

    pub fn set_mass_mev(&mut self, mass_mev: f64) -> &mut Self {
        self.mass_mev = mass_mev;
        self
    }

    pub fn set_kin_energy_mev(&mut self, kin_energy_mev: f64) -> &mut Self {
        self.kin_energy_mev = kin_energy_mev;
        self
    }

    pub fn validate(&self) -> Result<(), RefParticleError> {
        if !self.charge_qe.is_finite() || self.charge_qe == 0.0 {
            return Err(RefParticleError::InvalidCharge(self.charge_qe));
        }
        if !self.mass_mev.is_finite() || self.mass_mev <= 0.0 {
            return Err(RefParticleError::InvalidMass(self.mass_mev));
        }
        if !self.kin_energy_mev.is_finite() || self.kin_energy_mev <= 0.0 {
            return Err(RefParticleError::InvalidKineticEnergy(self.kin_energy_mev));
        }
        Ok(())
    }

    /// Lorentz factor.
    #[inline]
    pub fn gamma(&self) -> f64 {
        1.0 + self.kin_energy_mev / self.mass_mev
    }

    #[inline]
    pub fn beta_gamma(&self) -> f64 {
        let gamma = self.gamma();
        (gamma * gamma - 1.0).sqrt()
    }

    #[inline]
    pub fn beta(&self) -> f64 {
        self.beta_gamma() / self.gamma()
    }

    /// Energy coordinate of the reference itself, `-γ`.
    #[inline]
    pub fn pt(&self) -> f64 {
        -self.gamma()
    }

    /// Momentum times c, in MeV.
    #[inline]
    pub fn momentum_mev(&self) -> f64 {
        self.mass_mev * self.beta_gamma()
    }

    /// Magnetic rigidity in T·m.
    pub fn rigidity_tm(&self) -> f64 {
        self.momentum_mev() * 1.0e6 / (SPEED_OF_LIGHT * self.charge_qe.abs())
    }

    /// Advances the path state through a slice of length `ds`.
    pub(crate) fn advance(&mut self, ds: f64) {
        self.s += ds;
        self.t += ds / self.beta();
    }
}
