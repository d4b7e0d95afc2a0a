//! Linear line segment

use crate::linear::{
    dot3, finish_evaluation, norm2, sub3, LinearCell, PARAMETRIC_TOLERANCE,
};
use crate::types::{CellError, PositionEvaluation, RealScalar, ReferenceCellType, Result};

/// A two-point line segment.
#[derive(Clone, Debug)]
pub struct Line<T: RealScalar> {
    points: [[T; 3]; 2],
    ids: [usize; 2],
}

impl<T: RealScalar> Line<T> {
    /// Create a degenerate segment at the origin.
    pub fn new() -> Self {
        Self {
            points: [[T::zero(); 3]; 2],
            ids: [0; 2],
        }
    }
}

impl<T: RealScalar> Default for Line<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: RealScalar> LinearCell<T> for Line<T> {
    fn cell_type(&self) -> ReferenceCellType {
        ReferenceCellType::Interval
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
        let d = sub3(&self.points[1], &self.points[0]);
        let len2 = norm2(&d);
        if len2 <= T::epsilon() {
            return Err(CellError::DegenerateCell);
        }
        let t = dot3(&sub3(x, &self.points[0]), &d) / len2;
        let inside = t >= -tol && t <= T::one() + tol;
        let clamped = num::clamp(t, T::zero(), T::one());
        Ok(finish_evaluation(
            self,
            x,
            [t, T::zero(), T::zero()],
            inside,
            [clamped, T::zero(), T::zero()],
        ))
    }
}
