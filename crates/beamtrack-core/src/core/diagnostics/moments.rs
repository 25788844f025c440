use crate::core::models::particle::{Particle, ParticleContainer};
use serde::Serialize;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

trait Accumulate: Default + Send {
    fn add(self, p: &Particle) -> Self;
    fn merge(self, other: Self) -> Self;
}

#[cfg(feature = "parallel")]
fn reduce<A: Accumulate>(particles: &[Particle], seed: impl Fn() -> A + Sync + Send) -> A {
    particles
        .par_iter()
        .filter(|p| !p.lost)
        .fold(&seed, |acc, p| acc.add(p))
        .reduce(&seed, A::merge)
}

#[cfg(not(feature = "parallel"))]
fn reduce<A: Accumulate>(particles: &[Particle], seed: impl Fn() -> A + Sync + Send) -> A {
    particles
        .iter()
        .filter(|p| !p.lost)
        .fold(seed(), |acc, p| acc.add(p))
}

#[derive(Debug, Default, Clone, Copy)]
struct FirstMoments {
    count: usize,
    weight: f64,
    sums: [f64; 6],
}

impl Accumulate for FirstMoments {
    fn add(mut self, p: &Particle) -> Self {
        self.count += 1;
        self.weight += p.weight;
        let v = [p.x, p.px, p.y, p.py, p.t, p.pt];
        for (s, c) in self.sums.iter_mut().zip(v) {
            *s += p.weight * c;
        }
        self
    }

    fn merge(mut self, other: Self) -> Self {
        self.count += other.count;
        self.weight += other.weight;
        for (s, o) in self.sums.iter_mut().zip(other.sums) {
            *s += o;
        }
        self
    }
}

/// Weighted central second moments: per plane `<qq>`, `<pp>`, `<qp>`.
#[derive(Debug, Clone, Copy)]
struct SecondMoments {
    mean: [f64; 6],
    planes: [[f64; 3]; 3],
}

impl Default for SecondMoments {
    fn default() -> Self {
        Self {
            mean: [0.0; 6],
            planes: [[0.0; 3]; 3],
        }
    }
}

impl Accumulate for SecondMoments {
    fn add(mut self, p: &Particle) -> Self {
        let v = [p.x, p.px, p.y, p.py, p.t, p.pt];
        for (plane, acc) in self.planes.iter_mut().enumerate() {
            let q = v[2 * plane] - self.mean[2 * plane];
            let m = v[2 * plane + 1] - self.mean[2 * plane + 1];
            acc[0] += p.weight * q * q;
            acc[1] += p.weight * m * m;
            acc[2] += p.weight * q * m;
        }
        self
    }

    fn merge(mut self, other: Self) -> Self {
        for (a, b) in self.planes.iter_mut().zip(other.planes) {
            for (x, y) in a.iter_mut().zip(b) {
                *x += y;
            }
        }
        self
    }
}

/// Weighted statistics of the surviving bunch at one point of the lattice.
///
/// `sig_*` are rms spreads about the mean, `emittance_*` the rms emittances
/// `sqrt(<q²><p²> - <qp>²)`, and `alpha`/`beta` the Twiss parameters derived from them.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct ReducedBeamCharacteristics {
    pub step: usize,
    pub s: f64,
    pub alive: usize,
    pub charge_c: f64,
    pub x_mean: f64,
    pub px_mean: f64,
    pub y_mean: f64,
    pub py_mean: f64,
    pub t_mean: f64,
    pub pt_mean: f64,
    pub sig_x: f64,
    pub sig_px: f64,
    pub sig_y: f64,
    pub sig_py: f64,
    pub sig_t: f64,
    pub sig_pt: f64,
    pub emittance_x: f64,
    pub emittance_y: f64,
    pub emittance_t: f64,
    pub alpha_x: f64,
    pub beta_x: f64,
    pub alpha_y: f64,
    pub beta_y: f64,
}

impl ReducedBeamCharacteristics {
    pub fn compute(container: &ParticleContainer, step: usize) -> Self {
        let particles = container.particles();
        let s = container.ref_particle().s;

        let first = reduce(particles, FirstMoments::default);
        if first.count == 0 || first.weight <= 0.0 {
            return Self {
                step,
                s,
                ..Default::default()
            };
        }
        let mean = first.sums.map(|v| v / first.weight);

        let second = reduce(particles, || SecondMoments {
            mean,
            ..Default::default()
        });
        let [[xx, pxpx, xpx], [yy, pypy, ypy], [tt, ptpt, tpt]] =
            second.planes.map(|plane| plane.map(|v| v / first.weight));

        let emittance = |qq: f64, pp: f64, qp: f64| (qq * pp - qp * qp).max(0.0).sqrt();
        let emittance_x = emittance(xx, pxpx, xpx);
        let emittance_y = emittance(yy, pypy, ypy);
        let twiss = |qq: f64, qp: f64, eps: f64| {
            if eps > 0.0 {
                (-qp / eps, qq / eps)
            } else {
                (0.0, 0.0)
            }
        };
        let (alpha_x, beta_x) = twiss(xx, xpx, emittance_x);
        let (alpha_y, beta_y) = twiss(yy, ypy, emittance_y);

        Self {
            step,
            s,
            alive: first.count,
            charge_c: container.total_charge(),
            x_mean: mean[0],
            px_mean: mean[1],
            y_mean: mean[2],
            py_mean: mean[3],
            t_mean: mean[4],
            pt_mean: mean[5],
            sig_x: xx.sqrt(),
            sig_px: pxpx.sqrt(),
            sig_y: yy.sqrt(),
            sig_py: pypy.sqrt(),
            sig_t: tt.sqrt(),
            sig_pt: ptpt.sqrt(),
            emittance_x,
            emittance_y,
            emittance_t: emittance(tt, ptpt, tpt),
            alpha_x,
            beta_x,
            alpha_y,
            beta_y,
        }
    }
}
