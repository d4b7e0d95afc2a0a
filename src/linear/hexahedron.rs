//! Linear hexahedron

use crate::linear::{
    finish_evaluation, newton_parametric, LinearCell, PARAMETRIC_TOLERANCE,
};
use crate::types::{PositionEvaluation, RealScalar, ReferenceCellType, Result};

/// An eight-point trilinear hexahedron.
#[derive(Clone, Debug)]
pub struct Hexahedron<T: RealScalar> {
    points: [[T; 3]; 8],
    ids: [usize; 8],
}

impl<T: RealScalar> Hexahedron<T> {
    /// Create a degenerate hexahedron at the origin.
    pub fn new() -> Self {
        Self {
            points: [[T::zero(); 3]; 8],
            ids: [0; 8],
        }
    }
}

impl<T: RealScalar> Default for Hexahedron<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: RealScalar> LinearCell<T> for Hexahedron<T> {
    fn cell_type(&self) -> ReferenceCellType {
        ReferenceCellType::Hexahedron
    }

    fn points(&self) -> &[[T; 3]] {
        &self.points
    }

    fn ids(&self) -> &[usize] {
        &self.ids
    }

    fn set_corner(&mut self, local: usize, x: [T; 3], id: usize) {
        self.points[local] = x;
        self.ids[local] = id;
    }

    fn evaluate_position(&self, x: &[T; 3]) -> Result<PositionEvaluation<T>> {
        let tol = T::from(PARAMETRIC_TOLERANCE).unwrap();
        let pc = newton_parametric(ReferenceCellType::Hexahedron, &self.points, x)?;
        let inside = pc.iter().all(|&p| p >= -tol && p <= T::one() + tol);
        let mut clamped = pc;
        for p in clamped.iter_mut() {
            *p = num::clamp(*p, T::zero(), T::one());
        }
        Ok(finish_evaluation(self, x, pc, inside, clamped))
    }
}
