//! Linear tetrahedron

use crate::linear::{
    closest_point_on_triangle, finish_evaluation, norm2, solve3, sub3, LinearCell,
    PARAMETRIC_TOLERANCE,
};
use crate::reference_cell;
use crate::types::{PositionEvaluation, RealScalar, ReferenceCellType, Result};
use num::Float;

/// A four-point tetrahedron.
#[derive(Clone, Debug)]
pub struct Tetrahedron<T: RealScalar> {
    points: [[T; 3]; 4],
    ids: [usize; 4],
}

impl<T: RealScalar> Tetrahedron<T> {
    /// Create a degenerate tetrahedron at the origin.
    pub fn new() -> Self {
        Self {
            points: [[T::zero(); 3]; 4],
            ids: [0; 4],
        }
    }
}

impl<T: RealScalar> Default for Tetrahedron<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: RealScalar> LinearCell<T> for Tetrahedron<T> {
    fn cell_type(&self) -> ReferenceCellType {
        ReferenceCellType::Tetrahedron
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
        let [a, b, c, d] = &self.points;
        let cols = [sub3(b, a), sub3(c, a), sub3(d, a)];
        let pc = solve3(&cols, &sub3(x, a))?;
        let inside = pc.iter().all(|&p| p >= -tol) && pc[0] + pc[1] + pc[2] <= T::one() + tol;
        let clamped = if inside {
            pc
        } else {
            // Closest point over the four boundary faces, mapped back to
            // parametric coordinates of the reference tetrahedron
            let verts = reference_cell::vertices::<T>(ReferenceCellType::Tetrahedron);
            let mut best = [T::zero(); 3];
            let mut best_d = Float::max_value();
            for face in reference_cell::faces(ReferenceCellType::Tetrahedron) {
                let (closest, bary) = closest_point_on_triangle(
                    x,
                    &self.points[face[0]],
                    &self.points[face[1]],
                    &self.points[face[2]],
                );
                let dist2 = norm2(&sub3(x, &closest));
                if dist2 < best_d {
                    best_d = dist2;
                    let w = [T::one() - bary[0] - bary[1], bary[0], bary[1]];
                    best = [T::zero(); 3];
                    for (wi, vi) in w.iter().zip(face.iter()) {
                        for (pd, vd) in best.iter_mut().zip(verts[*vi].iter()) {
                            *pd = *pd + *wi * *vd;
                        }
                    }
                }
            }
            best
        };
        Ok(finish_evaluation(self, x, pc, inside, clamped))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::types::PositionStatus;
    use approx::assert_relative_eq;

    fn tetrahedron() -> Tetrahedron<f64> {
        let mut tet = Tetrahedron::new();
        tet.set_corner(0, [0.0, 0.0, 0.0], 0);
        tet.set_corner(1, [1.0, 0.0, 0.0], 1);
        tet.set_corner(2, [0.0, 1.0, 0.0], 2);
        tet.set_corner(3, [0.0, 0.0, 1.0], 3);
        tet
    }

    #[test]
    fn test_corners() {
        let tet = tetrahedron();
        for (i, x) in [
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [0.0, 1.0, 0.0],
            [0.0, 0.0, 1.0],
        ]
        .iter()
        .enumerate()
        {
            let p = tet.evaluate_position(x).unwrap();
            assert_eq!(p.status, PositionStatus::Inside);
            assert_relative_eq!(p.dist2, 0.0, epsilon = 1e-12);
            assert_relative_eq!(p.weights[i], 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_interior() {
        let p = tetrahedron().evaluate_position(&[0.25, 0.25, 0.25]).unwrap();
        assert_eq!(p.status, PositionStatus::Inside);
        assert_relative_eq!(p.pcoords[0], 0.25, epsilon = 1e-12);
        assert_relative_eq!(p.weights[0], 0.25, epsilon = 1e-12);
    }

    #[test]
    fn test_outside_base() {
        let p = tetrahedron().evaluate_position(&[0.2, 0.2, -1.0]).unwrap();
        assert_eq!(p.status, PositionStatus::Outside);
        assert_relative_eq!(p.dist2, 1.0, epsilon = 1e-12);
        assert_relative_eq!(p.closest_point[0], 0.2, epsilon = 1e-12);
        assert_relative_eq!(p.closest_point[2], 0.0, epsilon = 1e-12);
        assert_relative_eq!(p.pcoords[2], 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_outside_vertex() {
        let p = tetrahedron().evaluate_position(&[2.0, -1.0, -1.0]).unwrap();
        assert_eq!(p.status, PositionStatus::Outside);
        assert_relative_eq!(p.closest_point[0], 1.0, epsilon = 1e-12);
        assert_relative_eq!(p.pcoords[0], 1.0, epsilon = 1e-12);
        assert_relative_eq!(p.weights[1], 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_degenerate() {
        let tet = Tetrahedron::<f64>::new();
        assert!(tet.evaluate_position(&[0.1, 0.1, 0.1]).is_err());
    }

    #[test]
    fn test_intersect_with_line() {
        let hit = tetrahedron()
            .intersect_with_line(&[0.2, 0.2, -1.0], &[0.2, 0.2, 1.0], 1e-10)
            .unwrap()
            .unwrap();
        assert_relative_eq!(hit.t, 0.5, epsilon = 1e-12);
        assert_relative_eq!(hit.x[2], 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_triangulate() {
        let tri = tetrahedron().triangulate();
        assert_eq!(tri.verts_per_cell, 4);
        assert_eq!(tri.point_ids, vec![0, 1, 2, 3]);
    }
}
