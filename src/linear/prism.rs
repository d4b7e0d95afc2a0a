//! Linear prism

use crate::linear::{
    closest_point_on_triangle, finish_evaluation, newton_parametric, LinearCell,
    PARAMETRIC_TOLERANCE,
};
use crate::types::{PositionEvaluation, RealScalar, ReferenceCellType, Result};

/// A six-point triangular prism.
#[derive(Clone, Debug)]
pub struct Prism<T: RealScalar> {
    points: [[T; 3]; 6],
    ids: [usize; 6],
}

impl<T: RealScalar> Prism<T> {
    /// Create a degenerate prism at the origin.
    pub fn new() -> Self {
        Self {
            points: [[T::zero(); 3]; 6],
            ids: [0; 6],
        }
    }
}

impl<T: RealScalar> Default for Prism<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: RealScalar> LinearCell<T> for Prism<T> {
    fn cell_type(&self) -> ReferenceCellType {
        ReferenceCellType::Prism
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
        let pc = newton_parametric(ReferenceCellType::Prism, &self.points, x)?;
        let inside = pc[0] >= -tol
            && pc[1] >= -tol
            && pc[0] + pc[1] <= T::one() + tol
            && pc[2] >= -tol
            && pc[2] <= T::one() + tol;
        let clamped = if inside {
            pc
        } else {
            // Clamp the triangular coordinates onto the reference triangle
            // and the axial coordinate onto the unit interval
            let (_, bary) = closest_point_on_triangle(
                &[pc[0], pc[1], T::zero()],
                &[T::zero(); 3],
                &[T::one(), T::zero(), T::zero()],
                &[T::zero(), T::one(), T::zero()],
            );
            [bary[0], bary[1], num::clamp(pc[2], T::zero(), T::one())]
        };
        Ok(finish_evaluation(self, x, pc, inside, clamped))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::reference_cell;
    use crate::types::PositionStatus;
    use approx::assert_relative_eq;

    fn prism() -> Prism<f64> {
        let mut prism = Prism::new();
        for (i, v) in reference_cell::vertices::<f64>(ReferenceCellType::Prism)
            .iter()
            .enumerate()
        {
            prism.set_corner(i, [v[0], v[1], 2.0 * v[2]], i);
        }
        prism
    }

    #[test]
    fn test_corners() {
        let prism = prism();
        let verts = reference_cell::vertices::<f64>(ReferenceCellType::Prism);
        for (i, v) in verts.iter().enumerate() {
            let p = prism.evaluate_position(&[v[0], v[1], 2.0 * v[2]]).unwrap();
            assert_eq!(p.status, PositionStatus::Inside);
            assert_relative_eq!(p.dist2, 0.0, epsilon = 1e-12);
            assert_relative_eq!(p.weights[i], 1.0, epsilon = 1e-10);
        }
    }

    #[test]
    fn test_interior() {
        let p = prism().evaluate_position(&[0.25, 0.25, 1.0]).unwrap();
        assert_eq!(p.status, PositionStatus::Inside);
        assert_relative_eq!(p.pcoords[0], 0.25, epsilon = 1e-10);
        assert_relative_eq!(p.pcoords[2], 0.5, epsilon = 1e-10);
    }

    #[test]
    fn test_outside_quad_face() {
        let p = prism().evaluate_position(&[1.0, 1.0, 1.0]).unwrap();
        assert_eq!(p.status, PositionStatus::Outside);
        assert_relative_eq!(p.pcoords[0] + p.pcoords[1], 1.0, epsilon = 1e-10);
        assert_relative_eq!(p.closest_point[0], 0.5, epsilon = 1e-10);
        assert_relative_eq!(p.closest_point[1], 0.5, epsilon = 1e-10);
        assert_relative_eq!(p.dist2, 0.5, epsilon = 1e-10);
    }

    #[test]
    fn test_outside_above() {
        let p = prism().evaluate_position(&[0.25, 0.25, 3.0]).unwrap();
        assert_eq!(p.status, PositionStatus::Outside);
        assert_relative_eq!(p.pcoords[2], 1.0, epsilon = 1e-10);
        assert_relative_eq!(p.dist2, 1.0, epsilon = 1e-10);
    }

    #[test]
    fn test_intersect_with_line() {
        let hit = prism()
            .intersect_with_line(&[0.25, 0.25, -1.0], &[0.25, 0.25, 1.0], 1e-10)
            .unwrap()
            .unwrap();
        assert_relative_eq!(hit.t, 0.5, epsilon = 1e-12);
        assert_relative_eq!(hit.pcoords[0], 0.25, epsilon = 1e-12);
    }

    #[test]
    fn test_triangulate() {
        let tri = prism().triangulate();
        assert_eq!(tri.verts_per_cell, 4);
        assert_eq!(tri.point_ids.len(), 12);
    }
}
