//! Linear triangle

use crate::linear::{
    closest_point_on_triangle, dot3, finish_evaluation, sub3, LinearCell, PARAMETRIC_TOLERANCE,
};
use crate::types::{CellError, PositionEvaluation, RealScalar, ReferenceCellType, Result};
use num::Float;

/// A three-point triangle.
#[derive(Clone, Debug)]
pub struct Triangle<T: RealScalar> {
    points: [[T; 3]; 3],
    ids: [usize; 3],
}

impl<T: RealScalar> Triangle<T> {
    /// Create a degenerate triangle at the origin.
    pub fn new() -> Self {
        Self {
            points: [[T::zero(); 3]; 3],
            ids: [0; 3],
        }
    }
}

impl<T: RealScalar> Default for Triangle<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: RealScalar> LinearCell<T> for Triangle<T> {
    fn cell_type(&self) -> ReferenceCellType {
        ReferenceCellType::Triangle
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
        let [a, b, c] = &self.points;
        let e1 = sub3(b, a);
        let e2 = sub3(c, a);
        let r = sub3(x, a);
        // In-plane projection through the Gram system of the edge vectors
        let g00 = dot3(&e1, &e1);
        let g01 = dot3(&e1, &e2);
        let g11 = dot3(&e2, &e2);
        let det = g00 * g11 - g01 * g01;
        if Float::abs(det) <= T::epsilon() * (g00 * g11 + T::epsilon()) {
            return Err(CellError::DegenerateCell);
        }
        let r1 = dot3(&e1, &r);
        let r2 = dot3(&e2, &r);
        let s = (r1 * g11 - r2 * g01) / det;
        let t = (r2 * g00 - r1 * g01) / det;
        let inside = s >= -tol && t >= -tol && s + t <= T::one() + tol;
        let clamped = if inside {
            [s, t, T::zero()]
        } else {
            let (_, bary) = closest_point_on_triangle(x, a, b, c);
            [bary[0], bary[1], T::zero()]
        };
        Ok(finish_evaluation(
            self,
            x,
            [s, t, T::zero()],
            inside,
            clamped,
        ))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::types::PositionStatus;
    use approx::assert_relative_eq;

    fn triangle() -> Triangle<f64> {
        let mut tri = Triangle::new();
        tri.set_corner(0, [0.0, 0.0, 0.0], 0);
        tri.set_corner(1, [2.0, 0.0, 0.0], 1);
        tri.set_corner(2, [0.0, 2.0, 0.0], 2);
        tri
    }

    #[test]
    fn test_corners() {
        let tri = triangle();
        for (i, x) in [[0.0, 0.0, 0.0], [2.0, 0.0, 0.0], [0.0, 2.0, 0.0]]
            .iter()
            .enumerate()
        {
            let p = tri.evaluate_position(x).unwrap();
            assert_eq!(p.status, PositionStatus::Inside);
            assert_relative_eq!(p.dist2, 0.0, epsilon = 1e-12);
            assert_relative_eq!(p.weights[i], 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_above_plane() {
        let p = triangle().evaluate_position(&[0.5, 0.5, 2.0]).unwrap();
        assert_eq!(p.status, PositionStatus::Inside);
        assert_relative_eq!(p.dist2, 4.0, epsilon = 1e-12);
        assert_relative_eq!(p.closest_point[2], 0.0, epsilon = 1e-12);
        assert_relative_eq!(p.pcoords[0], 0.25, epsilon = 1e-12);
    }

    #[test]
    fn test_outside_edge() {
        let p = triangle().evaluate_position(&[2.0, 2.0, 0.0]).unwrap();
        assert_eq!(p.status, PositionStatus::Outside);
        assert_relative_eq!(p.closest_point[0], 1.0, epsilon = 1e-12);
        assert_relative_eq!(p.closest_point[1], 1.0, epsilon = 1e-12);
        assert_relative_eq!(p.dist2, 2.0, epsilon = 1e-12);
        assert_relative_eq!(p.pcoords[0] + p.pcoords[1], 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_degenerate() {
        let mut tri = Triangle::<f64>::new();
        tri.set_corner(1, [1.0, 0.0, 0.0], 1);
        tri.set_corner(2, [2.0, 0.0, 0.0], 2);
        assert!(tri.evaluate_position(&[0.0, 1.0, 0.0]).is_err());
    }

    #[test]
    fn test_intersect_with_line() {
        let hit = triangle()
            .intersect_with_line(&[0.5, 0.5, -1.0], &[0.5, 0.5, 1.0], 1e-10)
            .unwrap()
            .unwrap();
        assert_relative_eq!(hit.t, 0.5, epsilon = 1e-12);
        assert_relative_eq!(hit.pcoords[0], 0.25, epsilon = 1e-12);
        assert_relative_eq!(hit.pcoords[1], 0.25, epsilon = 1e-12);
    }
}
