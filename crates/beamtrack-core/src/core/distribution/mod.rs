//! Statistical bunch distributions.
//!
//! A [`Distribution`] turns second-moment parameters into macro-particle coordinates.
//! Sampling first draws a unit-covariance point from the distribution's shape and then
//! applies the correlated per-plane scaling in [`DistributionParams`].

pub mod params;
pub mod sampling;

pub use params::{DistributionError, DistributionParams};

use rand::Rng;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind")]
pub enum Distribution {
    /// Uniformly filled six-dimensional ellipsoid.
    Waterbag(DistributionParams),
    /// Six-dimensional Gaussian.
    Gaussian(DistributionParams),
}

impl Distribution {
    pub fn params(&self) -> &DistributionParams {
        match self {
            Distribution::Waterbag(p) | Distribution::Gaussian(p) => p,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Distribution::Waterbag(_) => "Waterbag",
            Distribution::Gaussian(_) => "Gaussian",
        }
    }

    pub fn validate(&self) -> Result<(), DistributionError> {
        self.params().validate()
    }

    /// Draws one set of `(x, px, y, py, t, pt)` coordinates.
    pub fn sample(&self, rng: &mut impl Rng) -> [f64; 6] {
        let unit = match self {
            Distribution::Waterbag(_) => sampling::unit_waterbag(rng),
            Distribution::Gaussian(_) => sampling::unit_gaussian(rng),
        };
        self.params().transform(unit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn rms(values: impl Iterator<Item = f64> + Clone) -> f64 {
        let n = values.clone().count() as f64;
        let mean = values.clone().sum::<f64>() / n;
        (values.map(|v| (v - mean).powi(2)).sum::<f64>() / n).sqrt()
    }

    #[test]
    fn waterbag_sample_reproduces_requested_spreads() {
        let params = DistributionParams {
            sigma_x: 1.288697604e-6,
            sigma_y: 1.288697604e-6,
            sigma_t: 1.0e-6,
            sigma_px: 3.965223396e-6,
            sigma_py: 3.965223396e-6,
            sigma_pt: 0.01,
            ..Default::default()
        };
        let distr = Distribution::Waterbag(params);
        let mut rng = StdRng::seed_from_u64(2024);
        let samples: Vec<_> = (0..40_000).map(|_| distr.sample(&mut rng)).collect();

        let sx = rms(samples.iter().map(|s| s[0]));
        let spt = rms(samples.iter().map(|s| s[5]));
        assert!((sx / params.sigma_x - 1.0).abs() < 0.03);
        assert!((spt / params.sigma_pt - 1.0).abs() < 0.03);
    }

    #[test]
    fn seeded_sampling_is_deterministic() {
        let distr = Distribution::Gaussian(DistributionParams {
            sigma_x: 1.0,
            sigma_px: 1.0,
            ..Default::default()
        });
        let a: Vec<_> = {
            let mut rng = StdRng::seed_from_u64(5);
            (0..10).map(|_| distr.sample(&mut rng)).collect()
        };
        let b: Vec<_> = {
            let mut rng = StdRng::seed_from_u64(5);
            (0..10).map(|_| distr.sample(&mut rng)).collect()
        };
        assert_eq!(a, b);
    }

    #[test]
    fn zero_spreads_collapse_to_the_reference() {
        let distr = Distribution::Waterbag(DistributionParams::default());
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(distr.sample(&mut rng), [0.0; 6]);
    }
}
