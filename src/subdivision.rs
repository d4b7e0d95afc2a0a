//! Decomposition of higher-order cells into linear sub-cells
//!
//! A degree `order` cell is tiled by degree-1 cells whose corners are
//! control points, addressed by a flat sub-cell index. Simplices are
//! decomposed barycentrically (tetrahedra via upright tetrahedra, octahedra
//! split into four tetrahedra each, and inverted tetrahedra); tensor cells
//! are axis-aligned grids; prisms extrude the triangle decomposition layer
//! by layer. The three serendipity layouts are tiled by literal tables that
//! fan each face about its centroid, so their boundaries stay watertight
//! against neighbouring serendipity cells.

use crate::collocation;
use crate::indexing;
use crate::indexing::simplex;
use crate::interpolation;
use crate::types::{CellError, RealScalar, ReferenceCellType, Result};

/// The four tetrahedra of an octahedron, as indices into its six vertices.
///
/// The vertices of the octahedron sitting over a barycentric base point `b`
/// are `b + e_i + e_j` for the ordered pairs (0,1), (0,2), (0,3), (1,2),
/// (1,3), (2,3); opposite pairs are (0,5), (1,4) and (2,3). All four
/// tetrahedra share the fixed 0-5 diagonal.
const OCTAHEDRON_TETRAHEDRA: [[usize; 4]; 4] =
    [[0, 1, 2, 5], [0, 2, 4, 5], [0, 4, 3, 5], [0, 3, 1, 5]];

/// Fan of the 7-point triangle about its centroid.
const SEVEN_POINT_TRIANGLE_SUBTRIANGLES: [[usize; 3]; 6] = [
    [0, 3, 6],
    [3, 1, 6],
    [1, 4, 6],
    [4, 2, 6],
    [2, 5, 6],
    [5, 0, 6],
];

/// Body-centred star of the 15-point tetrahedron: every face is fanned
/// about its centroid exactly like a 7-point triangle, and each fan
/// triangle is joined to the body centroid.
const FIFTEEN_POINT_TETRAHEDRON_SUBTETRAHEDRA: [[usize; 4]; 24] = [
    [0, 7, 10, 14],
    [7, 3, 10, 14],
    [3, 8, 10, 14],
    [8, 1, 10, 14],
    [1, 4, 10, 14],
    [4, 0, 10, 14],
    [1, 8, 11, 14],
    [8, 3, 11, 14],
    [3, 9, 11, 14],
    [9, 2, 11, 14],
    [2, 5, 11, 14],
    [5, 1, 11, 14],
    [2, 9, 12, 14],
    [9, 3, 12, 14],
    [3, 7, 12, 14],
    [7, 0, 12, 14],
    [0, 6, 12, 14],
    [6, 2, 12, 14],
    [0, 4, 13, 14],
    [4, 1, 13, 14],
    [1, 5, 13, 14],
    [5, 2, 13, 14],
    [2, 6, 13, 14],
    [6, 0, 13, 14],
];

/// The twelve sub-prisms of the 21-point prism: the 7-point-triangle fan
/// extruded over two layers through the mid-height points.
const TWENTY_ONE_POINT_PRISM_SUBPRISMS: [[usize; 6]; 12] = [
    [0, 6, 15, 12, 17, 20],
    [6, 1, 15, 17, 13, 20],
    [1, 7, 15, 13, 18, 20],
    [7, 2, 15, 18, 14, 20],
    [2, 8, 15, 14, 19, 20],
    [8, 0, 15, 19, 12, 20],
    [12, 17, 20, 3, 9, 16],
    [17, 13, 20, 9, 4, 16],
    [13, 18, 20, 4, 10, 16],
    [18, 14, 20, 10, 5, 16],
    [14, 19, 20, 5, 11, 16],
    [19, 12, 20, 11, 3, 16],
];

fn is_serendipity(cell: ReferenceCellType, order: &[usize; 3], npoints: usize) -> bool {
    npoints != indexing::point_count(cell, order)
        && Some(npoints) == collocation::serendipity_point_count(cell)
}

/// The type of the linear sub-cells (the parent type, except that a
/// tetrahedron's octahedra are emitted as tetrahedra).
pub fn sub_cell_type(cell: ReferenceCellType) -> ReferenceCellType {
    cell
}

/// The number of linear sub-cells tiling the cell.
pub fn num_sub_cells(cell: ReferenceCellType, order: &[usize; 3], npoints: usize) -> usize {
    if is_serendipity(cell, order, npoints) {
        return match cell {
            ReferenceCellType::Triangle => SEVEN_POINT_TRIANGLE_SUBTRIANGLES.len(),
            ReferenceCellType::Tetrahedron => FIFTEEN_POINT_TETRAHEDRON_SUBTETRAHEDRA.len(),
            ReferenceCellType::Prism => TWENTY_ONE_POINT_PRISM_SUBPRISMS.len(),
            _ => 0,
        };
    }
    match cell {
        ReferenceCellType::Interval => order[0],
        ReferenceCellType::Triangle => order[0] * order[0],
        ReferenceCellType::Quadrilateral => order[0] * order[1],
        ReferenceCellType::Tetrahedron => order[0] * order[0] * order[0],
        ReferenceCellType::Hexahedron => order[0] * order[1] * order[2],
        ReferenceCellType::Prism => order[0] * order[0] * order[2],
    }
}

fn add4(a: [usize; 4], b: [usize; 4]) -> [usize; 4] {
    [a[0] + b[0], a[1] + b[1], a[2] + b[2], a[3] + b[3]]
}

fn unit4(i: usize) -> [usize; 4] {
    let mut e = [0; 4];
    e[i] = 1;
    e
}

/// Corners of sub-triangle `s` of a full-lattice triangle, as flat indices.
///
/// Upright triangles come first, one per lattice point of degree
/// `order - 1`; inverted triangles follow, one per lattice point of degree
/// `order - 2`.
fn triangle_sub_corners(order: usize, s: usize) -> Result<Vec<usize>> {
    let upright = simplex::num_points(order - 1, 2);
    if s < upright {
        let b = simplex::barycentric_index(s, order - 1, 2)?;
        Ok(vec![
            simplex::index(&add4(b, unit4(0)), order, 2)?,
            simplex::index(&add4(b, unit4(1)), order, 2)?,
            simplex::index(&add4(b, unit4(2)), order, 2)?,
        ])
    } else {
        let b = simplex::barycentric_index(s - upright, order - 2, 2)?;
        Ok(vec![
            simplex::index(&add4(b, [0, 1, 1, 0]), order, 2)?,
            simplex::index(&add4(b, [1, 0, 1, 0]), order, 2)?,
            simplex::index(&add4(b, [1, 1, 0, 0]), order, 2)?,
        ])
    }
}

/// Corners of sub-tetrahedron `s` of a full-lattice tetrahedron.
///
/// Upright tetrahedra come first, then the four tetrahedra of each
/// octahedron, then the inverted tetrahedra.
fn tetrahedron_sub_corners(order: usize, s: usize) -> Result<Vec<usize>> {
    let upright = simplex::num_points(order - 1, 3);
    if s < upright {
        let b = simplex::barycentric_index(s, order - 1, 3)?;
        return (0..4)
            .map(|i| simplex::index(&add4(b, unit4(i)), order, 3))
            .collect();
    }
    let s = s - upright;
    let octahedra = if order >= 2 {
        simplex::num_points(order - 2, 3)
    } else {
        0
    };
    if s < 4 * octahedra {
        let b = simplex::barycentric_index(s / 4, order - 2, 3)?;
        let pairs = [[0, 1], [0, 2], [0, 3], [1, 2], [1, 3], [2, 3]];
        let mut verts = [0; 6];
        for (v, pair) in verts.iter_mut().zip(pairs.iter()) {
            *v = simplex::index(
                &add4(add4(b, unit4(pair[0])), unit4(pair[1])),
                order,
                3,
            )?;
        }
        return Ok(OCTAHEDRON_TETRAHEDRA[s % 4]
            .iter()
            .map(|&v| verts[v])
            .collect());
    }
    let b = simplex::barycentric_index(s - 4 * octahedra, order - 3, 3)?;
    Ok(vec![
        simplex::index(&add4(b, [1, 1, 1, 0]), order, 3)?,
        simplex::index(&add4(b, [1, 1, 0, 1]), order, 3)?,
        simplex::index(&add4(b, [0, 1, 1, 1]), order, 3)?,
        simplex::index(&add4(b, [1, 0, 1, 1]), order, 3)?,
    ])
}

/// The lattice positions of the corners of sub-triangle `t` of a degree
/// `order` triangle layer, in counterclockwise order.
fn triangle_layer_corners(order: usize, t: usize) -> Result<[[usize; 2]; 3]> {
    let upright = simplex::num_points(order - 1, 2);
    if t < upright {
        let b = simplex::barycentric_index(t, order - 1, 2)?;
        let (i, j) = (b[1], b[2]);
        Ok([[i, j], [i + 1, j], [i, j + 1]])
    } else {
        let b = simplex::barycentric_index(t - upright, order - 2, 2)?;
        let (i, j) = (b[1], b[2]);
        Ok([[i + 1, j + 1], [i, j + 1], [i + 1, j]])
    }
}

/// Does sub-prism `sub_id` have the parent's triangular handedness?
pub fn prism_sub_cell_is_upright(order: &[usize; 3], sub_id: usize) -> bool {
    let per_layer = order[0] * order[0];
    let t = sub_id % per_layer;
    t < simplex::num_points(order[0] - 1, 2)
}

/// The flat corner point indices of one linear sub-cell.
pub fn sub_cell_corners(
    cell: ReferenceCellType,
    order: &[usize; 3],
    npoints: usize,
    sub_id: usize,
) -> Result<Vec<usize>> {
    let nsubcells = num_sub_cells(cell, order, npoints);
    if sub_id >= nsubcells {
        return Err(CellError::SubCellOutOfRange {
            index: sub_id,
            nsubcells,
        });
    }
    if is_serendipity(cell, order, npoints) {
        return Ok(match cell {
            ReferenceCellType::Triangle => {
                SEVEN_POINT_TRIANGLE_SUBTRIANGLES[sub_id].to_vec()
            }
            ReferenceCellType::Tetrahedron => {
                FIFTEEN_POINT_TETRAHEDRON_SUBTETRAHEDRA[sub_id].to_vec()
            }
            ReferenceCellType::Prism => TWENTY_ONE_POINT_PRISM_SUBPRISMS[sub_id].to_vec(),
            _ => unreachable!(),
        });
    }
    match cell {
        ReferenceCellType::Interval => Ok(vec![
            indexing::interval_point_index(sub_id, order[0])?,
            indexing::interval_point_index(sub_id + 1, order[0])?,
        ]),
        ReferenceCellType::Triangle => triangle_sub_corners(order[0], sub_id),
        ReferenceCellType::Quadrilateral => {
            let i = sub_id % order[0];
            let j = sub_id / order[0];
            let o = [order[0], order[1]];
            Ok(vec![
                indexing::quad_point_index(i, j, &o)?,
                indexing::quad_point_index(i + 1, j, &o)?,
                indexing::quad_point_index(i + 1, j + 1, &o)?,
                indexing::quad_point_index(i, j + 1, &o)?,
            ])
        }
        ReferenceCellType::Tetrahedron => tetrahedron_sub_corners(order[0], sub_id),
        ReferenceCellType::Hexahedron => {
            let i = sub_id % order[0];
            let j = (sub_id / order[0]) % order[1];
            let k = sub_id / (order[0] * order[1]);
            let mut corners = Vec::with_capacity(8);
            for dk in 0..2 {
                for (di, dj) in [(0, 0), (1, 0), (1, 1), (0, 1)] {
                    corners.push(indexing::hex_point_index(i + di, j + dj, k + dk, order)?);
                }
            }
            Ok(corners)
        }
        ReferenceCellType::Prism => {
            let per_layer = order[0] * order[0];
            let k = sub_id / per_layer;
            let tri = triangle_layer_corners(order[0], sub_id % per_layer)?;
            let mut corners = Vec::with_capacity(6);
            for dk in 0..2 {
                for [i, j] in tri {
                    corners.push(indexing::prism_point_index(
                        i,
                        j,
                        k + dk,
                        order[0],
                        order[2],
                    )?);
                }
            }
            Ok(corners)
        }
    }
}

/// Map sub-cell parametric coordinates into the parent cell.
///
/// The sub-cell's linear shape functions are applied to the parent
/// collocation coordinates of its corners; for tensor-product cells this
/// reduces to `(pc + ijk) / order` per axis.
pub fn transform_to_cell_params<T: RealScalar>(
    cell: ReferenceCellType,
    order: &[usize; 3],
    npoints: usize,
    sub_id: usize,
    pc: &[T; 3],
) -> Result<[T; 3]> {
    let corners = sub_cell_corners(cell, order, npoints, sub_id)?;
    let colloc = collocation::parametric_points::<T>(cell, order, npoints)?;
    let weights = interpolation::linear_shape_functions(sub_cell_type(cell), pc);
    let mut out = [T::zero(); 3];
    for (w, c) in weights.iter().zip(corners.iter()) {
        for (o, x) in out.iter_mut().zip(colloc[*c].iter()) {
            *o = *o + *w * *x;
        }
    }
    Ok(out)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::reference_cell;
    use approx::assert_relative_eq;
    use paste::paste;

    fn sub_cell_volume(cell: ReferenceCellType, corners: &[[f64; 3]]) -> f64 {
        fn tet_volume(a: [f64; 3], b: [f64; 3], c: [f64; 3], d: [f64; 3]) -> f64 {
            let u = [b[0] - a[0], b[1] - a[1], b[2] - a[2]];
            let v = [c[0] - a[0], c[1] - a[1], c[2] - a[2]];
            let w = [d[0] - a[0], d[1] - a[1], d[2] - a[2]];
            (u[0] * (v[1] * w[2] - v[2] * w[1]) - u[1] * (v[0] * w[2] - v[2] * w[0])
                + u[2] * (v[0] * w[1] - v[1] * w[0]))
                / 6.0
        }
        fn tri_area(a: [f64; 3], b: [f64; 3], c: [f64; 3]) -> f64 {
            ((b[0] - a[0]) * (c[1] - a[1]) - (b[1] - a[1]) * (c[0] - a[0])) / 2.0
        }
        match cell {
            ReferenceCellType::Interval => corners[1][0] - corners[0][0],
            ReferenceCellType::Triangle => tri_area(corners[0], corners[1], corners[2]),
            ReferenceCellType::Quadrilateral => {
                tri_area(corners[0], corners[1], corners[2])
                    + tri_area(corners[0], corners[2], corners[3])
            }
            ReferenceCellType::Tetrahedron => {
                tet_volume(corners[0], corners[1], corners[2], corners[3])
            }
            ReferenceCellType::Hexahedron => {
                // Axis-aligned boxes only
                (corners[1][0] - corners[0][0])
                    * (corners[3][1] - corners[0][1])
                    * (corners[4][2] - corners[0][2])
            }
            ReferenceCellType::Prism => {
                // Right prisms only
                tri_area(corners[0], corners[1], corners[2])
                    * (corners[3][2] - corners[0][2])
            }
        }
    }

    fn reference_volume(cell: ReferenceCellType) -> f64 {
        match cell {
            ReferenceCellType::Interval => 1.0,
            ReferenceCellType::Triangle => 0.5,
            ReferenceCellType::Quadrilateral => 1.0,
            ReferenceCellType::Tetrahedron => 1.0 / 6.0,
            ReferenceCellType::Hexahedron => 1.0,
            ReferenceCellType::Prism => 0.5,
        }
    }

    fn check_tiling(cell: ReferenceCellType, order: [usize; 3], npoints: usize) {
        let colloc = collocation::parametric_points::<f64>(cell, &order, npoints).unwrap();
        let mut total = 0.0;
        for s in 0..num_sub_cells(cell, &order, npoints) {
            let corners = sub_cell_corners(cell, &order, npoints, s).unwrap();
            let coords = corners.iter().map(|c| colloc[*c]).collect::<Vec<_>>();
            let v = sub_cell_volume(cell, &coords);
            assert!(v > 0.0, "sub-cell {s} of {cell:?} has volume {v}");
            total += v;
        }
        assert_relative_eq!(total, reference_volume(cell), epsilon = 1e-12);
    }

    fn check_corner_consistency(cell: ReferenceCellType, order: [usize; 3], npoints: usize) {
        // Mapping a sub-cell corner through the parametric transform lands
        // exactly on that corner's collocation coordinate.
        let colloc = collocation::parametric_points::<f64>(cell, &order, npoints).unwrap();
        let verts = reference_cell::vertices::<f64>(sub_cell_type(cell));
        for s in 0..num_sub_cells(cell, &order, npoints) {
            let corners = sub_cell_corners(cell, &order, npoints, s).unwrap();
            for (local, flat) in corners.iter().enumerate() {
                let pc =
                    transform_to_cell_params(cell, &order, npoints, s, &verts[local]).unwrap();
                for d in 0..3 {
                    assert_relative_eq!(pc[d], colloc[*flat][d], epsilon = 1e-12);
                }
            }
        }
    }

    macro_rules! test_decomposition {
        ($($cell:ident, $order:expr),+) => {
        $(
            paste! {

                #[test]
                fn [<test_ $cell:lower _tiling>]() {
                    let cell = ReferenceCellType::[<$cell>];
                    for order in $order {
                        let npoints = indexing::point_count(cell, &order);
                        check_tiling(cell, order, npoints);
                        check_corner_consistency(cell, order, npoints);
                    }
                }

                #[test]
                fn [<test_ $cell:lower _order_one_identity>]() {
                    let cell = ReferenceCellType::[<$cell>];
                    let order = [1, 1, 1];
                    let npoints = indexing::point_count(cell, &order);
                    assert_eq!(num_sub_cells(cell, &order, npoints), 1);
                    let corners = sub_cell_corners(cell, &order, npoints, 0).unwrap();
                    let nverts = reference_cell::entity_counts(cell)[0];
                    assert_eq!(corners, (0..nverts).collect::<Vec<_>>());
                    for v in reference_cell::vertices::<f64>(cell) {
                        let pc = transform_to_cell_params(
                            cell, &order, npoints, 0, &v).unwrap();
                        for d in 0..3 {
                            assert_relative_eq!(pc[d], v[d], epsilon = 1e-14);
                        }
                    }
                }

            }
        )*
        };
    }

    test_decomposition!(
        Interval,
        [[2, 0, 0], [5, 0, 0]],
        Triangle,
        [[2, 2, 0], [3, 3, 0], [5, 5, 0]],
        Quadrilateral,
        [[2, 2, 0], [3, 2, 0]],
        Tetrahedron,
        [[2, 2, 2], [3, 3, 3], [4, 4, 4]],
        Hexahedron,
        [[2, 2, 2], [3, 2, 4]],
        Prism,
        [[2, 2, 2], [3, 3, 2]]
    );

    #[test]
    fn test_quadratic_triangle_first_subtriangle() {
        let corners =
            sub_cell_corners(ReferenceCellType::Triangle, &[2, 2, 0], 6, 0).unwrap();
        assert_eq!(corners, vec![0, 3, 5]);
    }

    #[test]
    fn test_quadratic_curve_intervals() {
        let cell = ReferenceCellType::Interval;
        assert_eq!(sub_cell_corners(cell, &[2, 0, 0], 3, 0).unwrap(), vec![0, 2]);
        assert_eq!(sub_cell_corners(cell, &[2, 0, 0], 3, 1).unwrap(), vec![2, 1]);
        let a = transform_to_cell_params(cell, &[2, 0, 0], 3, 0, &[0.0; 3]).unwrap();
        let b = transform_to_cell_params(cell, &[2, 0, 0], 3, 0, &[1.0, 0.0, 0.0]).unwrap();
        let c = transform_to_cell_params(cell, &[2, 0, 0], 3, 1, &[1.0, 0.0, 0.0]).unwrap();
        assert_relative_eq!(a[0], 0.0);
        assert_relative_eq!(b[0], 0.5);
        assert_relative_eq!(c[0], 1.0);
    }

    #[test]
    fn test_tetrahedron_sub_cell_count() {
        for order in 1..=5 {
            let o = [order, order, order];
            let npoints = indexing::point_count(ReferenceCellType::Tetrahedron, &o);
            assert_eq!(
                num_sub_cells(ReferenceCellType::Tetrahedron, &o, npoints),
                order * order * order
            );
        }
    }

    macro_rules! test_special_case {
        ($($cell:ident, $npoints:expr, $nsub:expr),+) => {
        $(
            paste! {

                #[test]
                fn [<test_ $cell:lower _special_case_table>]() {
                    let cell = ReferenceCellType::[<$cell>];
                    let order = [2, 2, 2];
                    assert_eq!(num_sub_cells(cell, &order, $npoints), $nsub);
                    // Every control point appears in some sub-cell
                    let mut used = vec![false; $npoints];
                    for s in 0..$nsub {
                        for c in sub_cell_corners(cell, &order, $npoints, s).unwrap() {
                            used[c] = true;
                        }
                    }
                    assert!(used.iter().all(|u| *u));
                    check_tiling(cell, order, $npoints);
                    check_corner_consistency(cell, order, $npoints);
                }

            }
        )*
        };
    }

    test_special_case!(Triangle, 7, 6, Tetrahedron, 15, 24, Prism, 21, 12);

    #[test]
    fn test_prism_orientation_flag() {
        let order = [2, 2, 2];
        // Three upright then one inverted sub-triangle per layer
        assert!(prism_sub_cell_is_upright(&order, 0));
        assert!(prism_sub_cell_is_upright(&order, 2));
        assert!(!prism_sub_cell_is_upright(&order, 3));
        assert!(prism_sub_cell_is_upright(&order, 4));
        assert!(!prism_sub_cell_is_upright(&order, 7));
    }

    #[test]
    fn test_out_of_range_sub_cell() {
        assert!(matches!(
            sub_cell_corners(ReferenceCellType::Triangle, &[2, 2, 0], 6, 4),
            Err(CellError::SubCellOutOfRange { .. })
        ));
    }
}
