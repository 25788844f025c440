use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum DistributionError {
    #[error("Spread '{name}' must be finite and non-negative (got {value})")]
    InvalidSpread { name: &'static str, value: f64 },
    #[error("Correlation '{name}' must lie strictly between -1 and 1 (got {value})")]
    InvalidCorrelation { name: &'static str, value: f64 },
}

/// Second-moment description of a six-dimensional bunch.
///
/// Each canonical pair `(q, p)` is described by two spreads and one correlation
/// coefficient `μ`. The sampled bunch has `<q²> = σq² / (1 - μ²)`,
/// `<p²> = σp² / (1 - μ²)` and `<qp> = -μ σq σp / (1 - μ²)`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct DistributionParams {
    pub sigma_x: f64,
    pub sigma_y: f64,
    pub sigma_t: f64,
    pub sigma_px: f64,
    pub sigma_py: f64,
    pub sigma_pt: f64,
    pub mu_xpx: f64,
    pub mu_ypy: f64,
    pub mu_tpt: f64,
}

impl DistributionParams {
    pub fn validate(&self) -> Result<(), DistributionError> {
        let spreads = [
            ("sigma_x", self.sigma_x),
            ("sigma_y", self.sigma_y),
            ("sigma_t", self.sigma_t),
            ("sigma_px", self.sigma_px),
            ("sigma_py", self.sigma_py),
            ("sigma_pt", self.sigma_pt),
        ];
        for (name, value) in spreads {
            if !value.is_finite() || value < 0.0 {
                return Err(DistributionError::InvalidSpread { name, value });
            }
        }

        let correlations = [
            ("mu_xpx", self.mu_xpx),
            ("mu_ypy", self.mu_ypy),
            ("mu_tpt", self.mu_tpt),
        ];
        for (name, value) in correlations {
            if !value.is_finite() || value.abs() >= 1.0 {
                return Err(DistributionError::InvalidCorrelation { name, value });
            }
        }
        Ok(())
    }

    /// Maps unit-covariance coordinates onto the requested moments, plane by plane.
    pub(crate) fn transform(&self, u: [f64; 6]) -> [f64; 6] {
        let (x, px) = correlate(u[0], u[1], self.sigma_x, self.sigma_px, self.mu_xpx);
        let (y, py) = correlate(u[2], u[3], self.sigma_y, self.sigma_py, self.mu_ypy);
        let (t, pt) = correlate(u[4], u[5], self.sigma_t, self.sigma_pt, self.mu_tpt);
        [x, px, y, py, t, pt]
    }
}

#[inline]
fn correlate(q: f64, p: f64, sigma_q: f64, sigma_p: f64, mu: f64) -> (f64, f64) {
    let root = (1.0 - mu * mu).sqrt();
    (sigma_q * q / root, sigma_p * (-mu * q / root + p))
}
