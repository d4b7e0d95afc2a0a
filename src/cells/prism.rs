//! Higher-order prism

use crate::cells::{self, CellBase, HigherOrderCell};
use crate::linear::Prism;
use crate::types::{
    Attributes, LineIntersection, PositionEvaluation, RealScalar, ReferenceCellType, Result,
    TessellationOutput, Triangulation,
};

/// An arbitrary-order prism cell.
///
/// The triangular axes share one order; the axial order is independent.
/// The twenty-one point serendipity variant is also supported.
pub struct HigherOrderPrism<T: RealScalar> {
    base: CellBase<T>,
    scratch: Prism<T>,
}

impl<T: RealScalar> HigherOrderPrism<T> {
    /// Create an empty cell.
    pub fn new() -> Self {
        Self {
            base: CellBase::new(ReferenceCellType::Prism),
            scratch: Prism::new(),
        }
    }
}

impl<T: RealScalar> Default for HigherOrderPrism<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: RealScalar> HigherOrderCell<T> for HigherOrderPrism<T> {
    fn cell_type(&self) -> ReferenceCellType {
        self.base.cell
    }

    fn order(&self) -> [usize; 3] {
        self.base.order
    }

    fn num_points(&self) -> usize {
        self.base.points.len()
    }

    fn points(&self) -> &[[T; 3]] {
        &self.base.points
    }

    fn point_ids(&self) -> &[usize] {
        &self.base.ids
    }

    fn num_sub_cells(&self) -> usize {
        self.base.num_sub_cells()
    }

    fn parametric_coords(&self) -> &[[T; 3]] {
        &self.base.colloc
    }

    fn set_order(&mut self, order: [usize; 3]) -> Result<()> {
        self.base.set_order(order, None)
    }

    fn set_order_from_cell_data(
        &mut self,
        cell_data: &Attributes<T>,
        cell_id: usize,
    ) -> Result<()> {
        self.base.set_order_from_cell_data(cell_data, cell_id, None)
    }

    fn set_points(&mut self, points: &[[T; 3]], ids: &[usize]) -> Result<()> {
        self.base.set_points(points, ids, None)
    }

    fn evaluate_position(&mut self, x: &[T; 3]) -> Result<PositionEvaluation<T>> {
        cells::evaluate_position_impl(&self.base, &mut self.scratch, x)
    }

    fn evaluate_location(&self, pc: &[T; 3]) -> Result<([T; 3], Vec<T>)> {
        self.base.evaluate_location(pc)
    }

    fn derivatives(&self, pc: &[T; 3], values: &[T], width: usize) -> Result<Vec<T>> {
        self.base.derivatives(pc, values, width)
    }

    fn intersect_with_line(
        &mut self,
        p1: &[T; 3],
        p2: &[T; 3],
        tol: T,
    ) -> Result<Option<LineIntersection<T>>> {
        cells::intersect_with_line_impl(&self.base, &mut self.scratch, p1, p2, tol)
    }

    fn triangulate(&mut self) -> Result<Triangulation<T>> {
        cells::triangulate_impl(&self.base, &mut self.scratch)
    }

    fn contour(
        &mut self,
        value: T,
        scalars: &[T],
        point_data: &Attributes<T>,
        cell_data: &Attributes<T>,
        cell_id: usize,
        out: &mut TessellationOutput<T>,
    ) -> Result<()> {
        cells::contour_impl(
            &self.base,
            &mut self.scratch,
            value,
            scalars,
            point_data,
            cell_data,
            cell_id,
            out,
        )
    }

    fn clip(
        &mut self,
        value: T,
        scalars: &[T],
        inside_out: bool,
        point_data: &Attributes<T>,
        cell_data: &Attributes<T>,
        cell_id: usize,
        out: &mut TessellationOutput<T>,
    ) -> Result<()> {
        cells::clip_impl(
            &self.base,
            &mut self.scratch,
            value,
            scalars,
            inside_out,
            point_data,
            cell_data,
            cell_id,
            out,
        )
    }

    fn cell_boundary(&self, pc: &[T; 3]) -> Result<(Vec<usize>, bool)> {
        self.base.cell_boundary(pc)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::collocation;
    use crate::types::PositionStatus;
    use approx::assert_relative_eq;

    fn lattice_prism(rs: usize, t: usize) -> HigherOrderPrism<f64> {
        let mut prism = HigherOrderPrism::new();
        prism.set_order([rs, rs, t]).unwrap();
        let points =
            collocation::standard_points::<f64>(ReferenceCellType::Prism, &[rs, rs, t]).unwrap();
        let ids = (0..points.len()).collect::<Vec<_>>();
        prism.set_points(&points, &ids).unwrap();
        prism
    }

    #[test]
    fn test_lifecycle() {
        let prism = lattice_prism(2, 3);
        assert_eq!(prism.num_points(), 24);
        assert_eq!(prism.num_sub_cells(), 12);
    }

    #[test]
    fn test_evaluate_position_at_control_point() {
        let mut prism = lattice_prism(2, 2);
        let x = prism.points()[0];
        let p = prism.evaluate_position(&x).unwrap();
        assert_eq!(p.status, PositionStatus::Inside);
        assert_relative_eq!(p.dist2, 0.0, epsilon = 1e-12);
        for d in 0..3 {
            assert_relative_eq!(p.pcoords[d], 0.0, epsilon = 1e-8);
        }
        assert_relative_eq!(p.weights[0], 1.0, epsilon = 1e-8);
    }

    #[test]
    fn test_serendipity_point_count_accepted() {
        let mut prism = HigherOrderPrism::<f64>::new();
        let points = collocation::serendipity_points::<f64>(ReferenceCellType::Prism).unwrap();
        let ids = (0..21).collect::<Vec<_>>();
        prism.set_points(&points, &ids).unwrap();
        assert_eq!(prism.order(), [2, 2, 2]);
        assert_eq!(prism.num_sub_cells(), 12);
    }

    #[test]
    fn test_cell_boundary() {
        let prism = lattice_prism(2, 2);
        // Nearest to the bottom triangle, inside
        let (b, inside) = prism.cell_boundary(&[0.3, 0.3, 0.1]).unwrap();
        assert_eq!(b, vec![0, 1, 2]);
        assert!(inside);
        // Below the bottom triangle, outside
        let (b, inside) = prism.cell_boundary(&[0.3, 0.3, -0.1]).unwrap();
        assert_eq!(b, vec![0, 1, 2]);
        assert!(!inside);
    }

    #[test]
    fn test_intersect_with_line() {
        let mut prism = lattice_prism(2, 2);
        let hit = prism
            .intersect_with_line(&[0.2, 0.2, -1.0], &[0.2, 0.2, 2.0], 1e-10)
            .unwrap()
            .unwrap();
        assert_relative_eq!(hit.x[2], 0.0, epsilon = 1e-10);
        assert_relative_eq!(hit.pcoords[0], 0.2, epsilon = 1e-10);
    }

    #[test]
    fn test_contour_produces_triangles() {
        // An axial scalar contours to a triangular cross-section
        let mut prism = lattice_prism(1, 1);
        let scalars = vec![0.0, 0.0, 0.0, 1.0, 1.0, 1.0];
        let point_data = Attributes::new();
        let cell_data = Attributes::new();
        let mut out = TessellationOutput::new(&point_data, &cell_data);
        prism
            .contour(0.5, &scalars, &point_data, &cell_data, 0, &mut out)
            .unwrap();
        assert!(!out.polys.is_empty());
        for poly in &out.polys {
            for &p in poly {
                assert_relative_eq!(out.points[p][2], 0.5, epsilon = 1e-12);
            }
        }
    }
}
