//! Collocation point generation
//!
//! Parametric coordinates of the control points of a higher-order cell, in
//! the flat point order defined by the indexing bijections. Interval and
//! tensor-product cells use evenly spaced grids; simplices place points at
//! normalized integer barycentric coordinates. Three fixed-size serendipity
//! layouts (the 7-point triangle, 15-point tetrahedron and 21-point prism)
//! are literal tables rather than products of the general rules.

use crate::indexing;
use crate::types::{CellError, RealScalar, ReferenceCellType, Result};

/// The number of control points of the serendipity variant of a cell type,
/// if one exists.
pub fn serendipity_point_count(cell: ReferenceCellType) -> Option<usize> {
    match cell {
        ReferenceCellType::Triangle => Some(7),
        ReferenceCellType::Tetrahedron => Some(15),
        ReferenceCellType::Prism => Some(21),
        _ => None,
    }
}

/// Parametric collocation points of a standard (full lattice) cell.
pub fn standard_points<T: RealScalar>(
    cell: ReferenceCellType,
    order: &[usize; 3],
) -> Result<Vec<[T; 3]>> {
    let npoints = indexing::point_count(cell, order);
    let zero = T::zero();
    let mut points = vec![[zero; 3]; npoints];
    match cell {
        ReferenceCellType::Interval => {
            let h = T::one() / T::from(order[0]).unwrap();
            for i in 0..=order[0] {
                points[indexing::interval_point_index(i, order[0])?] =
                    [T::from(i).unwrap() * h, zero, zero];
            }
        }
        ReferenceCellType::Triangle => {
            let h = T::one() / T::from(order[0]).unwrap();
            for (q, p) in points.iter_mut().enumerate() {
                let b = indexing::simplex::barycentric_index(q, order[0], 2)?;
                *p = [
                    T::from(b[1]).unwrap() * h,
                    T::from(b[2]).unwrap() * h,
                    zero,
                ];
            }
        }
        ReferenceCellType::Tetrahedron => {
            let h = T::one() / T::from(order[0]).unwrap();
            for (q, p) in points.iter_mut().enumerate() {
                let b = indexing::simplex::barycentric_index(q, order[0], 3)?;
                *p = [
                    T::from(b[1]).unwrap() * h,
                    T::from(b[2]).unwrap() * h,
                    T::from(b[3]).unwrap() * h,
                ];
            }
        }
        ReferenceCellType::Quadrilateral => {
            let h = [
                T::one() / T::from(order[0]).unwrap(),
                T::one() / T::from(order[1]).unwrap(),
            ];
            for j in 0..=order[1] {
                for i in 0..=order[0] {
                    points[indexing::quad_point_index(i, j, &[order[0], order[1]])?] = [
                        T::from(i).unwrap() * h[0],
                        T::from(j).unwrap() * h[1],
                        zero,
                    ];
                }
            }
        }
        ReferenceCellType::Hexahedron => {
            let h = [
                T::one() / T::from(order[0]).unwrap(),
                T::one() / T::from(order[1]).unwrap(),
                T::one() / T::from(order[2]).unwrap(),
            ];
            for k in 0..=order[2] {
                for j in 0..=order[1] {
                    for i in 0..=order[0] {
                        points[indexing::hex_point_index(i, j, k, order)?] = [
                            T::from(i).unwrap() * h[0],
                            T::from(j).unwrap() * h[1],
                            T::from(k).unwrap() * h[2],
                        ];
                    }
                }
            }
        }
        ReferenceCellType::Prism => {
            let h = T::one() / T::from(order[0]).unwrap();
            let hk = T::one() / T::from(order[2]).unwrap();
            for k in 0..=order[2] {
                for j in 0..=order[0] {
                    for i in 0..=(order[0] - j) {
                        points[indexing::prism_point_index(i, j, k, order[0], order[2])?] = [
                            T::from(i).unwrap() * h,
                            T::from(j).unwrap() * h,
                            T::from(k).unwrap() * hk,
                        ];
                    }
                }
            }
        }
    }
    Ok(points)
}

/// Parametric collocation points of a serendipity cell.
pub fn serendipity_points<T: RealScalar>(cell: ReferenceCellType) -> Result<Vec<[T; 3]>> {
    let zero = T::zero();
    let one = T::one();
    let half = T::from(0.5).unwrap();
    let third = one / T::from(3.0).unwrap();
    match cell {
        ReferenceCellType::Triangle => Ok(vec![
            [zero, zero, zero],
            [one, zero, zero],
            [zero, one, zero],
            [half, zero, zero],
            [half, half, zero],
            [zero, half, zero],
            [third, third, zero],
        ]),
        ReferenceCellType::Tetrahedron => Ok(vec![
            [zero, zero, zero],
            [one, zero, zero],
            [zero, one, zero],
            [zero, zero, one],
            [half, zero, zero],
            [half, half, zero],
            [zero, half, zero],
            [zero, zero, half],
            [half, zero, half],
            [zero, half, half],
            // Face centroids in face order, then the body centroid
            [third, zero, third],
            [third, third, third],
            [zero, third, third],
            [third, third, zero],
            [T::from(0.25).unwrap(); 3],
        ]),
        ReferenceCellType::Prism => Ok(vec![
            [zero, zero, zero],
            [one, zero, zero],
            [zero, one, zero],
            [zero, zero, one],
            [one, zero, one],
            [zero, one, one],
            [half, zero, zero],
            [half, half, zero],
            [zero, half, zero],
            [half, zero, one],
            [half, half, one],
            [zero, half, one],
            [zero, zero, half],
            [one, zero, half],
            [zero, one, half],
            // Triangular face centroids, quadrilateral face centroids, body
            [third, third, zero],
            [third, third, one],
            [half, zero, half],
            [half, half, half],
            [zero, half, half],
            [third, third, half],
        ]),
        _ => Err(CellError::Unsupported(format!(
            "no serendipity variant for {cell:?}"
        ))),
    }
}

/// Parametric collocation points for a cell with `npoints` control points.
///
/// Dispatches to the serendipity table when `npoints` matches a serendipity
/// variant rather than the full lattice of the given order.
pub fn parametric_points<T: RealScalar>(
    cell: ReferenceCellType,
    order: &[usize; 3],
    npoints: usize,
) -> Result<Vec<[T; 3]>> {
    let standard = indexing::point_count(cell, order);
    if npoints == standard {
        standard_points(cell, order)
    } else if Some(npoints) == serendipity_point_count(cell) {
        serendipity_points(cell)
    } else {
        Err(CellError::PointCountMismatch {
            expected: standard,
            found: npoints,
        })
    }
}
