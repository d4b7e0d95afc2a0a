//! Higher-order curve

use crate::cells::{self, CellBase, HigherOrderCell};
use crate::linear::Line;
use crate::types::{
    Attributes, LineIntersection, PositionEvaluation, RealScalar, ReferenceCellType, Result,
    TessellationOutput, Triangulation,
};

/// An arbitrary-order curve cell.
pub struct HigherOrderCurve<T: RealScalar> {
    base: CellBase<T>,
    scratch: Line<T>,
}

impl<T: RealScalar> HigherOrderCurve<T> {
    /// Create an empty cell.
    pub fn new() -> Self {
        Self {
            base: CellBase::new(ReferenceCellType::Interval),
            scratch: Line::new(),
        }
    }
}

impl<T: RealScalar> Default for HigherOrderCurve<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: RealScalar> HigherOrderCell<T> for HigherOrderCurve<T> {
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
