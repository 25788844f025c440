use crate::core::elements::{Element, Kinematics};
use crate::core::models::particle::ParticleContainer;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Pushes every particle and the reference particle through one slice of `element`.
pub(crate) fn push_slice(container: &mut ParticleContainer, element: &Element) {
    let kin = Kinematics::from(container.ref_particle());
    let map = element.slice_map(&kin);

    #[cfg(not(feature = "parallel"))]
    let iterator = container.particles_mut().iter_mut();

    #[cfg(feature = "parallel")]
    let iterator = container.particles_mut().par_iter_mut();

    iterator.for_each(|p| map.apply(p, &kin));

    container.ref_particle_mut().advance(element.slice_ds());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::elements::{ChrDrift, Quad};

    fn container() -> ParticleContainer {
        let mut c = ParticleContainer::new();
        c.ref_particle_mut()
            .set_charge_qe(-1.0)
            .set_mass_mev(0.510998950)
            .set_kin_energy_mev(100.0e3);
        c.add_particles(
            vec![[1e-6, 1e-6, 0.0, 0.0, 0.0, 0.0], [0.0, 0.0, -1e-6, 2e-6, 0.0, 0.0]],
            1.0,
        );
        c
    }

    #[test]
    fn slices_advance_reference_path_length() {
        let mut c = container();
        let element = Element::from(ChrDrift::new(1.0, 4));
        for _ in 0..element.nslice() {
            push_slice(&mut c, &element);
        }
        assert!((c.ref_particle().s - 1.0).abs() < 1e-12);
        assert!((c.particles()[0].x - 2e-6).abs() < 1e-15);
        assert!((c.particles()[1].y - 1e-6).abs() < 1e-15);
    }

    #[test]
    fn sliced_linear_quad_matches_single_matrix() {
        let mut sliced = container();
        let element = Element::from(Quad::new(1.0, 0.6, 25));
        for _ in 0..25 {
            push_slice(&mut sliced, &element);
        }

        let whole = container();
        let kin = Kinematics::from(whole.ref_particle());
        let v = element.linear_matrix(&kin) * whole.particles()[0].phase_space();
        assert!((sliced.particles()[0].x - v[0]).abs() < 1e-18);
        assert!((sliced.particles()[0].px - v[1]).abs() < 1e-18);
    }
}
