//! Higher-order triangle

use crate::cells::{self, CellBase, HigherOrderCell, IndexCache};
use crate::linear::Triangle;
use crate::types::{
    Attributes, LineIntersection, PositionEvaluation, RealScalar, ReferenceCellType, Result,
    TessellationOutput, Triangulation,
};

/// An arbitrary-order triangle cell.
///
/// Supports the full barycentric lattice at any uniform order, plus the
/// seven-point serendipity variant.
pub struct HigherOrderTriangle<T: RealScalar> {
    base: CellBase<T>,
    scratch: Triangle<T>,
    cache: IndexCache,
}

impl<T: RealScalar> HigherOrderTriangle<T> {
    /// Create an empty cell.
    pub fn new() -> Self {
        Self {
            base: CellBase::new(ReferenceCellType::Triangle),
            scratch: Triangle::new(),
            cache: IndexCache::new(2),
        }
    }

    /// The number of times the barycentric index table has been rebuilt.
    pub fn generation(&self) -> u64 {
        self.cache.generation()
    }
}

impl<T: RealScalar> Default for HigherOrderTriangle<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: RealScalar> HigherOrderCell<T> for HigherOrderTriangle<T> {
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
        self.base.set_order(order, Some(&mut self.cache))
    }

    fn set_order_from_cell_data(
        &mut self,
        cell_data: &Attributes<T>,
        cell_id: usize,
    ) -> Result<()> {
        self.base
            .set_order_from_cell_data(cell_data, cell_id, Some(&mut self.cache))
    }

    fn set_points(&mut self, points: &[[T; 3]], ids: &[usize]) -> Result<()> {
        self.base.set_points(points, ids, Some(&mut self.cache))
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
