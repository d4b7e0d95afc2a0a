//! Higher-order cell family
//!
//! Six cell types interpolating geometry and attributes to arbitrary
//! polynomial order: curves, triangles, quadrilaterals, tetrahedra,
//! hexahedra and prisms. Each cell stores a flat list of control points
//! and global point ids, and answers geometric queries by decomposing
//! itself into linear sub-cells.
//!
//! The lifecycle is two-phase. An order may be declared up front with
//! [`HigherOrderCell::set_order`] (or read from a cell-data attribute),
//! in which case [`HigherOrderCell::set_points`] validates the point
//! count against it; without a declared order a uniform order is inferred
//! from the point count. All derived tables are rebuilt at assignment
//! time, so the read-only getters never mutate.

pub mod cache;
pub mod curve;
pub mod hexahedron;
pub mod prism;
pub mod quadrilateral;
pub mod tetrahedron;
pub mod triangle;

pub use cache::IndexCache;
pub use curve::HigherOrderCurve;
pub use hexahedron::HigherOrderHexahedron;
pub use prism::HigherOrderPrism;
pub use quadrilateral::HigherOrderQuadrilateral;
pub use tetrahedron::HigherOrderTetrahedron;
pub use triangle::HigherOrderTriangle;

use crate::collocation;
use crate::indexing;
use crate::interpolation;
use crate::linear::{self, LinearCell};
use crate::reference_cell;
use crate::subdivision;
use crate::types::{
    Attributes, CellError, LineIntersection, PositionEvaluation, PositionStatus, RealScalar,
    ReferenceCellType, Result, TessellationOutput, Triangulation, DEGREES_ATTRIBUTE_NAME,
};
use itertools::izip;
use num::{Float, ToPrimitive};

/// The uniform contract of the higher-order cell family.
pub trait HigherOrderCell<T: RealScalar> {
    /// The reference cell type.
    fn cell_type(&self) -> ReferenceCellType;

    /// The per-axis polynomial order.
    fn order(&self) -> [usize; 3];

    /// The number of control points currently stored.
    fn num_points(&self) -> usize;

    /// The control point coordinates, in flat point order.
    fn points(&self) -> &[[T; 3]];

    /// The global ids of the control points.
    fn point_ids(&self) -> &[usize];

    /// The number of linear sub-cells the cell decomposes into.
    fn num_sub_cells(&self) -> usize;

    /// Parametric coordinates of the control points.
    fn parametric_coords(&self) -> &[[T; 3]];

    /// Declare the per-axis polynomial order.
    ///
    /// If control points are already stored their count must match the
    /// new order (or a serendipity variant of this cell type).
    fn set_order(&mut self, order: [usize; 3]) -> Result<()>;

    /// Read the per-axis order from the `HigherOrderDegrees` cell-data
    /// attribute of cell `cell_id`.
    fn set_order_from_cell_data(
        &mut self,
        cell_data: &Attributes<T>,
        cell_id: usize,
    ) -> Result<()>;

    /// Assign the control points and their global ids, in flat point
    /// order.
    ///
    /// With no declared order a uniform order is inferred from the point
    /// count.
    fn set_points(&mut self, points: &[[T; 3]], ids: &[usize]) -> Result<()>;

    /// Closest-point and containment query against the sub-cell
    /// decomposition.
    fn evaluate_position(&mut self, x: &[T; 3]) -> Result<PositionEvaluation<T>>;

    /// Map parametric coordinates to physical space, returning the
    /// interpolation weights over the full control-point grid.
    fn evaluate_location(&self, pc: &[T; 3]) -> Result<([T; 3], Vec<T>)>;

    /// Spatial derivatives of `width`-component point values at `pc`.
    ///
    /// `values` holds one `width`-tuple per control point; the output
    /// holds `[d/dx, d/dy, d/dz]` per component.
    fn derivatives(&self, pc: &[T; 3], values: &[T], width: usize) -> Result<Vec<T>>;

    /// Earliest intersection of the segment `[p1, p2]` with the cell.
    fn intersect_with_line(
        &mut self,
        p1: &[T; 3],
        p2: &[T; 3],
        tol: T,
    ) -> Result<Option<LineIntersection<T>>>;

    /// Simplicial triangulation of the full sub-cell decomposition.
    fn triangulate(&mut self) -> Result<Triangulation<T>>;

    /// Generate the iso-contour of the piecewise-linear interpolant of
    /// the control-point `scalars`.
    ///
    /// `point_data` is indexed by global point id; cell-centred
    /// attributes are duplicated across every emitted fragment.
    #[allow(clippy::too_many_arguments)]
    fn contour(
        &mut self,
        value: T,
        scalars: &[T],
        point_data: &Attributes<T>,
        cell_data: &Attributes<T>,
        cell_id: usize,
        out: &mut TessellationOutput<T>,
    ) -> Result<()>;

    /// Clip the cell against an iso-value of the control-point `scalars`.
    #[allow(clippy::too_many_arguments)]
    fn clip(
        &mut self,
        value: T,
        scalars: &[T],
        inside_out: bool,
        point_data: &Attributes<T>,
        cell_data: &Attributes<T>,
        cell_id: usize,
        out: &mut TessellationOutput<T>,
    ) -> Result<()>;

    /// Global ids of the corner vertices of the boundary entity closest
    /// to `pc` in parametric space, and whether `pc` lies inside the cell.
    fn cell_boundary(&self, pc: &[T; 3]) -> Result<(Vec<usize>, bool)>;
}

fn validate_order(cell: ReferenceCellType, order: &[usize; 3]) -> Result<()> {
    let check_axis = |d: usize| {
        if order[d] == 0 {
            Err(CellError::InvalidOrder(0))
        } else {
            Ok(())
        }
    };
    match cell {
        ReferenceCellType::Interval => check_axis(0),
        ReferenceCellType::Quadrilateral => {
            check_axis(0)?;
            check_axis(1)
        }
        ReferenceCellType::Hexahedron => {
            check_axis(0)?;
            check_axis(1)?;
            check_axis(2)
        }
        ReferenceCellType::Triangle => {
            check_axis(0)?;
            if order[1] != order[0] {
                return Err(CellError::InvalidOrder(order[1]));
            }
            Ok(())
        }
        ReferenceCellType::Tetrahedron => {
            check_axis(0)?;
            if order[1] != order[0] || order[2] != order[0] {
                return Err(CellError::InvalidOrder(order[1].max(order[2])));
            }
            Ok(())
        }
        ReferenceCellType::Prism => {
            check_axis(0)?;
            check_axis(2)?;
            if order[1] != order[0] {
                return Err(CellError::InvalidOrder(order[1]));
            }
            Ok(())
        }
    }
}

/// The order whose lattice a serendipity layout interpolates.
fn serendipity_order(cell: ReferenceCellType) -> [usize; 3] {
    match cell {
        ReferenceCellType::Triangle => [2, 2, 0],
        _ => [2, 2, 2],
    }
}

fn uniform_order_from_num_points(cell: ReferenceCellType, n: usize) -> Result<[usize; 3]> {
    for k in 1.. {
        let order = match cell {
            ReferenceCellType::Interval => [k, 0, 0],
            ReferenceCellType::Triangle | ReferenceCellType::Quadrilateral => [k, k, 0],
            _ => [k, k, k],
        };
        let count = indexing::point_count(cell, &order);
        if count == n {
            return Ok(order);
        }
        if count > n {
            break;
        }
    }
    if Some(n) == collocation::serendipity_point_count(cell) {
        return Ok(serendipity_order(cell));
    }
    Err(CellError::NonUniformPointCount(n))
}

/// Shared state of the six higher-order cell types.
pub(crate) struct CellBase<T: RealScalar> {
    pub(crate) cell: ReferenceCellType,
    pub(crate) order: [usize; 3],
    explicit_order: bool,
    pub(crate) points: Vec<[T; 3]>,
    pub(crate) ids: Vec<usize>,
    pub(crate) colloc: Vec<[T; 3]>,
}

impl<T: RealScalar> CellBase<T> {
    pub(crate) fn new(cell: ReferenceCellType) -> Self {
        let order = match cell {
            ReferenceCellType::Interval => [1, 0, 0],
            ReferenceCellType::Triangle | ReferenceCellType::Quadrilateral => [1, 1, 0],
            _ => [1, 1, 1],
        };
        Self {
            cell,
            order,
            explicit_order: false,
            points: vec![],
            ids: vec![],
            colloc: vec![],
        }
    }

    pub(crate) fn num_sub_cells(&self) -> usize {
        if self.points.is_empty() {
            0
        } else {
            subdivision::num_sub_cells(self.cell, &self.order, self.points.len())
        }
    }

    fn rebuild(&mut self, cache: Option<&mut cache::IndexCache>) -> Result<()> {
        let npoints = self.points.len();
        self.colloc = match cache {
            Some(c) if npoints == indexing::point_count(self.cell, &self.order) => {
                let h = T::one() / T::from(self.order[0]).unwrap();
                c.update(self.order[0])?
                    .iter()
                    .map(|b| {
                        [
                            T::from(b[1]).unwrap() * h,
                            T::from(b[2]).unwrap() * h,
                            T::from(b[3]).unwrap() * h,
                        ]
                    })
                    .collect()
            }
            _ => collocation::parametric_points(self.cell, &self.order, npoints)?,
        };
        Ok(())
    }

    fn check_point_count(&self, n: usize) -> Result<()> {
        let expected = indexing::point_count(self.cell, &self.order);
        // A serendipity point count is only valid against the quadratic
        // lattice it interpolates
        if n == expected
            || (Some(n) == collocation::serendipity_point_count(self.cell)
                && self.order == serendipity_order(self.cell))
        {
            Ok(())
        } else {
            Err(CellError::PointCountMismatch { expected, found: n })
        }
    }

    pub(crate) fn set_order(
        &mut self,
        order: [usize; 3],
        cache: Option<&mut cache::IndexCache>,
    ) -> Result<()> {
        validate_order(self.cell, &order)?;
        if !self.points.is_empty() {
            let expected = indexing::point_count(self.cell, &order);
            let found = self.points.len();
            if found != expected
                && !(Some(found) == collocation::serendipity_point_count(self.cell)
                    && order == serendipity_order(self.cell))
            {
                return Err(CellError::PointCountMismatch { expected, found });
            }
        }
        self.order = order;
        self.explicit_order = true;
        if self.points.is_empty() {
            return Ok(());
        }
        self.rebuild(cache)
    }

    pub(crate) fn set_order_from_cell_data(
        &mut self,
        cell_data: &Attributes<T>,
        cell_id: usize,
        cache: Option<&mut cache::IndexCache>,
    ) -> Result<()> {
        let degrees = cell_data.array(DEGREES_ATTRIBUTE_NAME).ok_or_else(|| {
            CellError::Attribute(format!("missing {DEGREES_ATTRIBUTE_NAME} array"))
        })?;
        if degrees.width < 3 || cell_id >= degrees.len() {
            return Err(CellError::Attribute(format!(
                "{DEGREES_ATTRIBUTE_NAME} has no 3-wide tuple for cell {cell_id}"
            )));
        }
        let tuple = degrees.tuple(cell_id);
        let mut order = [0; 3];
        for (o, v) in order.iter_mut().zip(tuple.iter()) {
            if v.fract() != T::zero() {
                return Err(CellError::Attribute(format!(
                    "non-integral degree in {DEGREES_ATTRIBUTE_NAME}"
                )));
            }
            *o = v.to_usize().ok_or_else(|| {
                CellError::Attribute(format!("negative degree in {DEGREES_ATTRIBUTE_NAME}"))
            })?;
        }
        self.set_order(order, cache)
    }

    pub(crate) fn set_points(
        &mut self,
        points: &[[T; 3]],
        ids: &[usize],
        cache: Option<&mut cache::IndexCache>,
    ) -> Result<()> {
        if points.len() != ids.len() {
            return Err(CellError::PointCountMismatch {
                expected: points.len(),
                found: ids.len(),
            });
        }
        if self.explicit_order {
            self.check_point_count(points.len())?;
        } else {
            let order = uniform_order_from_num_points(self.cell, points.len())?;
            log::warn!(
                "no order declared for a {:?} cell; inferring {:?} from {} points",
                self.cell,
                order,
                points.len()
            );
            self.order = order;
        }
        self.points = points.to_vec();
        self.ids = ids.to_vec();
        self.rebuild(cache)
    }

    pub(crate) fn evaluate_location(&self, pc: &[T; 3]) -> Result<([T; 3], Vec<T>)> {
        let weights =
            interpolation::shape_functions(self.cell, &self.order, self.points.len(), pc)?;
        let mut x = [T::zero(); 3];
        for (w, p) in izip!(weights.iter(), self.points.iter()) {
            for (xd, pd) in x.iter_mut().zip(p.iter()) {
                *xd = *xd + *w * *pd;
            }
        }
        Ok((x, weights))
    }

    pub(crate) fn derivatives(&self, pc: &[T; 3], values: &[T], width: usize) -> Result<Vec<T>> {
        let npoints = self.points.len();
        if values.len() != npoints * width {
            return Err(CellError::Attribute(format!(
                "expected {} values, got {}",
                npoints * width,
                values.len()
            )));
        }
        let grads = interpolation::shape_derivatives(self.cell, &self.order, npoints, pc)?;
        let dim = reference_cell::dim(self.cell);

        // Jacobian columns, padded to a full 3d frame for lower-dimensional
        // cells so the out-of-manifold derivative comes out zero
        let mut cols = [[T::zero(); 3]; 3];
        for (g, p) in izip!(grads.iter(), self.points.iter()) {
            for d in 0..dim {
                for (cd, pd) in cols[d].iter_mut().zip(p.iter()) {
                    *cd = *cd + g[d] * *pd;
                }
            }
        }
        if dim == 1 {
            let t = cols[0];
            let axis = if Float::abs(t[0]) <= Float::abs(t[1])
                && Float::abs(t[0]) <= Float::abs(t[2])
            {
                [T::one(), T::zero(), T::zero()]
            } else if Float::abs(t[1]) <= Float::abs(t[2]) {
                [T::zero(), T::one(), T::zero()]
            } else {
                [T::zero(), T::zero(), T::one()]
            };
            cols[1] = linear::cross3(&t, &axis);
            cols[2] = linear::cross3(&t, &cols[1]);
        } else if dim == 2 {
            cols[2] = linear::cross3(&cols[0], &cols[1]);
        }
        // Transpose, since the chain rule solves J^T (df/dx) = df/dr
        let tcols = [
            [cols[0][0], cols[1][0], cols[2][0]],
            [cols[0][1], cols[1][1], cols[2][1]],
            [cols[0][2], cols[1][2], cols[2][2]],
        ];

        let mut out = vec![T::zero(); 3 * width];
        for c in 0..width {
            let mut dfdr = [T::zero(); 3];
            for (g, tuple) in izip!(grads.iter(), values.chunks(width)) {
                for d in 0..dim {
                    dfdr[d] = dfdr[d] + g[d] * tuple[c];
                }
            }
            let dfdx = linear::solve3(&tcols, &dfdr)?;
            out[3 * c..3 * c + 3].copy_from_slice(&dfdx);
        }
        Ok(out)
    }

    pub(crate) fn cell_boundary(&self, pc: &[T; 3]) -> Result<(Vec<usize>, bool)> {
        if self.points.is_empty() {
            return Err(CellError::PointCountMismatch {
                expected: indexing::point_count(self.cell, &self.order),
                found: 0,
            });
        }
        // Corner vertices lead the flat point order, so entity vertex
        // numbers index the ids directly
        let ids = linear::nearest_boundary_vertices(self.cell, pc)
            .into_iter()
            .map(|v| self.ids[v])
            .collect();
        Ok((ids, linear::contains_parametric(self.cell, pc)))
    }
}

/// Load the corners of one linear sub-cell into `scratch`, returning the
/// flat point indices of the corners.
fn load_sub_cell<T: RealScalar, L: LinearCell<T>>(
    scratch: &mut L,
    base: &CellBase<T>,
    sub_id: usize,
) -> Result<Vec<usize>> {
    let corners =
        subdivision::sub_cell_corners(base.cell, &base.order, base.points.len(), sub_id)?;
    for (local, &flat) in corners.iter().enumerate() {
        scratch.set_corner(local, base.points[flat], base.ids[flat]);
    }
    Ok(corners)
}

pub(crate) fn evaluate_position_impl<T: RealScalar, L: LinearCell<T>>(
    base: &CellBase<T>,
    scratch: &mut L,
    x: &[T; 3],
) -> Result<PositionEvaluation<T>> {
    let nsub = base.num_sub_cells();
    let mut best: Option<PositionEvaluation<T>> = None;
    for sub_id in 0..nsub {
        load_sub_cell(scratch, base, sub_id)?;
        // A collapsed sub-cell cannot contain the point; the remaining
        // sub-cells still cover the query
        let mut eval = match scratch.evaluate_position(x) {
            Ok(eval) => eval,
            Err(CellError::DegenerateCell) => continue,
            Err(e) => return Err(e),
        };
        eval.sub_id = sub_id;
        let better = match &best {
            None => true,
            Some(b) => match (eval.status, b.status) {
                (PositionStatus::Inside, PositionStatus::Outside) => true,
                (PositionStatus::Outside, PositionStatus::Inside) => false,
                _ => eval.dist2 < b.dist2,
            },
        };
        if better {
            best = Some(eval);
        }
    }
    match best {
        Some(mut best) => {
            let pc = subdivision::transform_to_cell_params(
                base.cell,
                &base.order,
                base.points.len(),
                best.sub_id,
                &best.pcoords,
            )?;
            best.pcoords = pc;
            best.weights =
                interpolation::shape_functions(base.cell, &base.order, base.points.len(), &pc)?;
            Ok(best)
        }
        None => Ok(PositionEvaluation {
            status: PositionStatus::Outside,
            sub_id: 0,
            pcoords: [T::zero(); 3],
            closest_point: *x,
            dist2: Float::max_value(),
            weights: vec![],
        }),
    }
}

pub(crate) fn intersect_with_line_impl<T: RealScalar, L: LinearCell<T>>(
    base: &CellBase<T>,
    scratch: &mut L,
    p1: &[T; 3],
    p2: &[T; 3],
    tol: T,
) -> Result<Option<LineIntersection<T>>> {
    let mut best: Option<LineIntersection<T>> = None;
    for sub_id in 0..base.num_sub_cells() {
        load_sub_cell(scratch, base, sub_id)?;
        if let Some(hit) = scratch.intersect_with_line(p1, p2, tol)? {
            if best.as_ref().map(|b| hit.t < b.t).unwrap_or(true) {
                let pc = subdivision::transform_to_cell_params(
                    base.cell,
                    &base.order,
                    base.points.len(),
                    sub_id,
                    &hit.pcoords,
                )?;
                best = Some(LineIntersection {
                    t: hit.t,
                    x: hit.x,
                    pcoords: pc,
                    sub_id,
                });
            }
        }
    }
    Ok(best)
}

pub(crate) fn triangulate_impl<T: RealScalar, L: LinearCell<T>>(
    base: &CellBase<T>,
    scratch: &mut L,
) -> Result<Triangulation<T>> {
    let mut out = Triangulation::default();
    for sub_id in 0..base.num_sub_cells() {
        load_sub_cell(scratch, base, sub_id)?;
        let piece = scratch.triangulate();
        out.verts_per_cell = piece.verts_per_cell;
        out.point_ids.extend(piece.point_ids);
        out.points.extend(piece.points);
    }
    Ok(out)
}

fn check_scalars<T: RealScalar>(base: &CellBase<T>, scalars: &[T]) -> Result<()> {
    if scalars.len() != base.points.len() {
        return Err(CellError::Attribute(format!(
            "expected {} cell scalars, got {}",
            base.points.len(),
            scalars.len()
        )));
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
pub(crate) fn contour_impl<T: RealScalar, L: LinearCell<T>>(
    base: &CellBase<T>,
    scratch: &mut L,
    value: T,
    scalars: &[T],
    point_data: &Attributes<T>,
    cell_data: &Attributes<T>,
    cell_id: usize,
    out: &mut TessellationOutput<T>,
) -> Result<()> {
    check_scalars(base, scalars)?;
    for sub_id in 0..base.num_sub_cells() {
        let corners = load_sub_cell(scratch, base, sub_id)?;
        let sub_scalars = corners.iter().map(|&f| scalars[f]).collect::<Vec<_>>();
        scratch.contour(value, &sub_scalars, point_data, cell_data, cell_id, out)?;
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
pub(crate) fn clip_impl<T: RealScalar, L: LinearCell<T>>(
    base: &CellBase<T>,
    scratch: &mut L,
    value: T,
    scalars: &[T],
    inside_out: bool,
    point_data: &Attributes<T>,
    cell_data: &Attributes<T>,
    cell_id: usize,
    out: &mut TessellationOutput<T>,
) -> Result<()> {
    check_scalars(base, scalars)?;
    for sub_id in 0..base.num_sub_cells() {
        let corners = load_sub_cell(scratch, base, sub_id)?;
        let sub_scalars = corners.iter().map(|&f| scalars[f]).collect::<Vec<_>>();
        scratch.clip(
            value,
            &sub_scalars,
            inside_out,
            point_data,
            cell_data,
            cell_id,
            out,
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_uniform_order_inference() {
        assert_eq!(
            uniform_order_from_num_points(ReferenceCellType::Interval, 4).unwrap(),
            [3, 0, 0]
        );
        assert_eq!(
            uniform_order_from_num_points(ReferenceCellType::Triangle, 10).unwrap(),
            [3, 3, 0]
        );
        assert_eq!(
            uniform_order_from_num_points(ReferenceCellType::Tetrahedron, 20).unwrap(),
            [3, 3, 3]
        );
        assert_eq!(
            uniform_order_from_num_points(ReferenceCellType::Prism, 18).unwrap(),
            [2, 2, 2]
        );
    }

    #[test]
    fn test_serendipity_inference() {
        assert_eq!(
            uniform_order_from_num_points(ReferenceCellType::Triangle, 7).unwrap(),
            [2, 2, 0]
        );
        assert_eq!(
            uniform_order_from_num_points(ReferenceCellType::Tetrahedron, 15).unwrap(),
            [2, 2, 2]
        );
        assert_eq!(
            uniform_order_from_num_points(ReferenceCellType::Prism, 21).unwrap(),
            [2, 2, 2]
        );
    }

    #[test]
    fn test_inference_failure() {
        assert_eq!(
            uniform_order_from_num_points(ReferenceCellType::Triangle, 8),
            Err(CellError::NonUniformPointCount(8))
        );
        assert_eq!(
            uniform_order_from_num_points(ReferenceCellType::Interval, 1),
            Err(CellError::NonUniformPointCount(1))
        );
    }

    #[test]
    fn test_order_validation() {
        assert!(validate_order(ReferenceCellType::Triangle, &[2, 2, 0]).is_ok());
        assert!(validate_order(ReferenceCellType::Triangle, &[2, 3, 0]).is_err());
        assert!(validate_order(ReferenceCellType::Hexahedron, &[2, 3, 4]).is_ok());
        assert!(validate_order(ReferenceCellType::Hexahedron, &[2, 0, 4]).is_err());
        assert!(validate_order(ReferenceCellType::Prism, &[2, 2, 5]).is_ok());
        assert!(validate_order(ReferenceCellType::Prism, &[2, 3, 5]).is_err());
    }
}
