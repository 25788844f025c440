use super::elements::{Element, ElementError, Kinematics};
use nalgebra::Matrix6;
use tracing::debug;

/// Ordered sequence of beamline elements.
///
/// Insertion order is traversal order. Elements are validated as they are inserted
/// and are never reordered or deduplicated; the same element may appear several times.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Lattice {
    elements: Vec<Element>,
}

impl Lattice {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, element: impl Into<Element>) -> Result<(), ElementError> {
        let element = element.into();
        element.validate()?;
        debug!(kind = element.kind(), ds = element.ds(), "Appending lattice element.");
        self.elements.push(element);
        Ok(())
    }

    /// Appends every element in order. Nothing is appended if any element is invalid.
    pub fn extend<I, E>(&mut self, elements: I) -> Result<(), ElementError>
    where
        I: IntoIterator<Item = E>,
        E: Into<Element>,
    {
        let batch: Vec<Element> = elements.into_iter().map(Into::into).collect();
        for element in &batch {
            element.validate()?;
        }
        debug!(count = batch.len(), "Extending lattice.");
        self.elements.extend(batch);
        Ok(())
    }

    pub fn clear(&mut self) {
        self.elements.clear();
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Element> {
        self.elements.iter()
    }

    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    /// Summed element length (m).
    pub fn total_length(&self) -> f64 {
        self.elements.iter().map(Element::ds).sum()
    }

    /// Total number of slices the engine will push through.
    pub fn total_slices(&self) -> usize {
        self.elements.iter().map(Element::nslice).sum()
    }

    /// First-order transfer matrix of the full line, first element applied first.
    pub fn linear_map(&self, kin: &Kinematics) -> Matrix6<f64> {
        self.elements
            .iter()
            .fold(Matrix6::identity(), |acc, e| e.linear_matrix(kin) * acc)
    }
}

impl<'a> IntoIterator for &'a Lattice {
    type Item = &'a Element;
    type IntoIter = std::slice::Iter<'a, Element>;

    fn into_iter(self) -> Self::IntoIter {
        self.elements.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::elements::{BeamMonitor, ChrDrift, ChrQuad, Drift, Quad};

    fn kin() -> Kinematics {
        Kinematics {
            beta: 0.999,
            beta_gamma: 22.33,
        }
    }

    #[test]
    fn insertion_order_is_preserved_with_repeats() {
        let monitor = BeamMonitor::new("monitor", "csv");
        let dr1 = ChrDrift::new(1.0, 25);
        let q1 = ChrQuad::new(1.2258333333, 0.5884, 25);

        let mut lattice = Lattice::new();
        lattice
            .extend::<_, Element>([
                monitor.clone().into(),
                dr1.into(),
                q1.into(),
                dr1.into(),
                monitor.into(),
            ])
            .unwrap();

        let kinds: Vec<_> = lattice.iter().map(Element::kind).collect();
        assert_eq!(
            kinds,
            ["BeamMonitor", "ChrDrift", "ChrQuad", "ChrDrift", "BeamMonitor"]
        );
        assert_eq!(lattice.len(), 5);
        assert!((lattice.total_length() - 3.2258333333).abs() < 1e-12);
        assert_eq!(lattice.total_slices(), 77);
    }

    #[test]
    fn invalid_element_in_batch_leaves_lattice_untouched() {
        let mut lattice = Lattice::new();
        lattice.push(Drift::new(1.0, 1)).unwrap();

        let result = lattice.extend([Drift::new(2.0, 1), Drift::new(f64::NAN, 1)]);
        assert!(result.is_err());
        assert_eq!(lattice.len(), 1);
    }

    #[test]
    fn monitor_names_that_escape_the_output_dir_are_rejected() {
        let mut lattice = Lattice::new();
        let result = lattice.extend::<_, Element>([
            BeamMonitor::new("../escaped", "summary").into(),
            Drift::new(1.0, 5).into(),
            BeamMonitor::new("sub/dir", "summary").into(),
        ]);
        assert!(matches!(
            result,
            Err(crate::core::elements::ElementError::InvalidMonitorName(_))
        ));
        assert!(lattice.is_empty());
    }

    #[test]
    fn linear_map_composes_in_traversal_order() {
        let mut lattice = Lattice::new();
        lattice.push(Quad::new(0.5, 1.0, 1)).unwrap();
        lattice.push(Drift::new(2.0, 1)).unwrap();

        let k = kin();
        let expected = Element::from(Drift::new(2.0, 1)).linear_matrix(&k)
            * Element::from(Quad::new(0.5, 1.0, 1)).linear_matrix(&k);
        assert!((lattice.linear_map(&k) - expected).abs().max() < 1e-15);
    }

    #[test]
    fn opposite_quad_pair_focuses_both_planes() {
        let (l, k_quad) = (0.2, 1.0);
        let mut lattice = Lattice::new();
        lattice.push(Quad::new(l, k_quad, 1)).unwrap();
        lattice.push(Quad::new(l, -k_quad, 1)).unwrap();
        let m = lattice.linear_map(&kin());

        let omega: f64 = k_quad.sqrt();
        let (s, c) = (omega * l).sin_cos();
        let (sh, ch) = ((omega * l).sinh(), (omega * l).cosh());
        let f = nalgebra::Matrix2::new(c, s / omega, -omega * s, c);
        let d = nalgebra::Matrix2::new(ch, sh / omega, omega * sh, ch);

        // x sees focusing first, y sees defocusing first
        let mx = d * f;
        let my = f * d;
        for i in 0..2 {
            for j in 0..2 {
                assert!((m[(i, j)] - mx[(i, j)]).abs() < 1e-14);
                assert!((m[(2 + i, 2 + j)] - my[(i, j)]).abs() < 1e-14);
            }
        }

        // the reversed line swaps the diagonal and keeps the focal length
        assert!((m[(0, 0)] - m[(3, 3)]).abs() < 1e-14);
        assert!((m[(1, 1)] - m[(2, 2)]).abs() < 1e-14);
        assert!((m[(1, 0)] - m[(3, 2)]).abs() < 1e-14);

        // net focusing, close to the thick-lens limit -(2/3) k² L³
        let expected = -2.0 / 3.0 * k_quad * k_quad * l.powi(3);
        assert!(m[(1, 0)] < 0.0);
        assert!((m[(1, 0)] - expected).abs() < 0.05 * expected.abs());
    }

    #[test]
    fn empty_lattice_has_identity_map() {
        let lattice = Lattice::new();
        assert!(lattice.is_empty());
        assert_eq!(lattice.linear_map(&kin()), Matrix6::identity());
    }
}
