use rand::Rng;
use rand_distr::StandardNormal;

/// Waterbag radius that gives unit variance per coordinate in six dimensions.
const WATERBAG_RADIUS: f64 = 2.828_427_124_746_190_1; // sqrt(8)

/// Six independent standard-normal coordinates.
pub fn unit_gaussian(rng: &mut impl Rng) -> [f64; 6] {
    std::array::from_fn(|_| rng.sample(StandardNormal))
}

/// A point uniformly distributed inside the six-ball of radius `sqrt(8)`.
///
/// A uniformly filled ball in n dimensions has `<q²> = R² / (n + 2)`, so this radius
/// yields unit covariance.
pub fn unit_waterbag(rng: &mut impl Rng) -> [f64; 6] {
    let direction = loop {
        let g = unit_gaussian(rng);
        let norm = g.iter().map(|v| v * v).sum::<f64>().sqrt();
        if norm > f64::MIN_POSITIVE {
            break g.map(|v| v / norm);
        }
    };
    let radius = rng.gen_range(0.0..1.0_f64).powf(1.0 / 6.0) * WATERBAG_RADIUS;
    direction.map(|v| v * radius)
}
