//! Linear quadrilateral

use crate::linear::{
    finish_evaluation, newton_parametric, LinearCell, PARAMETRIC_TOLERANCE,
};
use crate::types::{PositionEvaluation, RealScalar, ReferenceCellType, Result};

/// A four-point bilinear quadrilateral.
#[derive(Clone, Debug)]
pub struct Quadrilateral<T: RealScalar> {
    points: [[T; 3]; 4],
    ids: [usize; 4],
}

impl<T: RealScalar> Quadrilateral<T> {
    /// Create a degenerate quadrilateral at the origin.
    pub fn new() -> Self {
        Self {
            points: [[T::zero(); 3]; 4],
            ids: [0; 4],
        }
    }
}

impl<T: RealScalar> Default for Quadrilateral<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: RealScalar> LinearCell<T> for Quadrilateral<T> {
    fn cell_type(&self) -> ReferenceCellType {
        ReferenceCellType::Quadrilateral
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
        let pc = newton_parametric(ReferenceCellType::Quadrilateral, &self.points, x)?;
        let inside = pc[..2]
            .iter()
            .all(|&p| p >= -tol && p <= T::one() + tol);
        let clamped = [
            num::clamp(pc[0], T::zero(), T::one()),
            num::clamp(pc[1], T::zero(), T::one()),
            T::zero(),
        ];
        Ok(finish_evaluation(self, x, pc, inside, clamped))
    }
}
