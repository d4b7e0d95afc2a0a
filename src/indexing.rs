//! Bijections between flat point indices and structured coordinates
//!
//! Every higher-order cell numbers its control points vertices-first, then
//! edge interiors (grouped by edge), then face interiors (grouped by face),
//! then body interiors. For simplices the structured coordinate is an integer
//! barycentric tuple summing to the order; for tensor-product cells it is an
//! `(i, j, k)` grid tuple.

pub mod simplex;

use crate::types::{CellError, Result};

/// The number of control points of a uniform-order cell.
pub fn point_count(cell: crate::types::ReferenceCellType, order: &[usize]) -> usize {
    use crate::types::ReferenceCellType;
    match cell {
        ReferenceCellType::Interval => order[0] + 1,
        ReferenceCellType::Triangle => (order[0] + 1) * (order[0] + 2) / 2,
        ReferenceCellType::Quadrilateral => (order[0] + 1) * (order[1] + 1),
        ReferenceCellType::Tetrahedron => (order[0] + 1) * (order[0] + 2) * (order[0] + 3) / 6,
        ReferenceCellType::Hexahedron => (order[0] + 1) * (order[1] + 1) * (order[2] + 1),
        ReferenceCellType::Prism => (order[0] + 1) * (order[0] + 2) / 2 * (order[2] + 1),
    }
}

/// Flat index of the interval point at grid position `i`.
///
/// The two end points come first, interior points follow in increasing order.
pub fn interval_point_index(i: usize, order: usize) -> Result<usize> {
    if order < 1 {
        return Err(CellError::InvalidOrder(order));
    }
    if i > order {
        return Err(CellError::IndexOutOfRange {
            index: i,
            npoints: order + 1,
        });
    }
    Ok(if i == 0 {
        0
    } else if i == order {
        1
    } else {
        i + 1
    })
}

/// Flat index of the quadrilateral point at grid position `(i, j)`.
pub fn quad_point_index(i: usize, j: usize, order: &[usize; 2]) -> Result<usize> {
    if order[0] < 1 || order[1] < 1 {
        return Err(CellError::InvalidOrder(order[0].min(order[1])));
    }
    if i > order[0] || j > order[1] {
        return Err(CellError::IndexOutOfRange {
            index: if i > order[0] { i } else { j },
            npoints: (order[0] + 1) * (order[1] + 1),
        });
    }
    let ibdy = i == 0 || i == order[0];
    let jbdy = j == 0 || j == order[1];
    let nbdy = ibdy as usize + jbdy as usize;

    if nbdy == 2 {
        // Vertex
        return Ok(if i != 0 {
            if j != 0 {
                2
            } else {
                1
            }
        } else if j != 0 {
            3
        } else {
            0
        });
    }

    let mut offset = 4;
    if nbdy == 1 {
        // Edge interior
        if !ibdy {
            return Ok((i - 1)
                + if j != 0 { order[0] - 1 + order[1] - 1 } else { 0 }
                + offset);
        }
        return Ok((j - 1)
            + if i != 0 {
                order[0] - 1
            } else {
                2 * (order[0] - 1) + order[1] - 1
            }
            + offset);
    }

    // Face interior, lexicographic in (i, j)
    offset += 2 * (order[0] - 1 + order[1] - 1);
    Ok(offset + (i - 1) + (order[0] - 1) * (j - 1))
}

/// Flat index of the hexahedron point at grid position `(i, j, k)`.
///
/// Vertices occupy 0..8 in the standard hexahedron corner order, followed by
/// the twelve edges, the six faces, then the body block in lexicographic
/// `(i, j, k)` order.
pub fn hex_point_index(i: usize, j: usize, k: usize, order: &[usize; 3]) -> Result<usize> {
    if order[0] < 1 || order[1] < 1 || order[2] < 1 {
        return Err(CellError::InvalidOrder(order[0].min(order[1]).min(order[2])));
    }
    if i > order[0] || j > order[1] || k > order[2] {
        return Err(CellError::IndexOutOfRange {
            index: i.max(j).max(k),
            npoints: (order[0] + 1) * (order[1] + 1) * (order[2] + 1),
        });
    }
    let ibdy = i == 0 || i == order[0];
    let jbdy = j == 0 || j == order[1];
    let kbdy = k == 0 || k == order[2];
    let nbdy = ibdy as usize + jbdy as usize + kbdy as usize;

    if nbdy == 3 {
        // Vertex
        let base = if i != 0 {
            if j != 0 {
                2
            } else {
                1
            }
        } else if j != 0 {
            3
        } else {
            0
        };
        return Ok(base + if k != 0 { 4 } else { 0 });
    }

    let mut offset = 8;
    if nbdy == 2 {
        // Edge interior
        if !ibdy {
            return Ok((i - 1)
                + if j != 0 { order[0] - 1 + order[1] - 1 } else { 0 }
                + if k != 0 { 2 * (order[0] - 1 + order[1] - 1) } else { 0 }
                + offset);
        }
        if !jbdy {
            return Ok((j - 1)
                + if i != 0 {
                    order[0] - 1
                } else {
                    2 * (order[0] - 1) + order[1] - 1
                }
                + if k != 0 { 2 * (order[0] - 1 + order[1] - 1) } else { 0 }
                + offset);
        }
        // k-axis edges, one per bottom-face corner
        offset += 4 * (order[0] - 1) + 4 * (order[1] - 1);
        let corner = if i != 0 {
            if j != 0 {
                2
            } else {
                1
            }
        } else if j != 0 {
            3
        } else {
            0
        };
        return Ok((k - 1) + (order[2] - 1) * corner + offset);
    }

    offset += 4 * (order[0] - 1 + order[1] - 1 + order[2] - 1);
    if nbdy == 1 {
        // Face interior
        if ibdy {
            return Ok((j - 1)
                + (order[1] - 1) * (k - 1)
                + if i != 0 { (order[1] - 1) * (order[2] - 1) } else { 0 }
                + offset);
        }
        offset += 2 * (order[1] - 1) * (order[2] - 1);
        if jbdy {
            return Ok((i - 1)
                + (order[0] - 1) * (k - 1)
                + if j != 0 { (order[2] - 1) * (order[0] - 1) } else { 0 }
                + offset);
        }
        offset += 2 * (order[2] - 1) * (order[0] - 1);
        return Ok((i - 1)
            + (order[0] - 1) * (j - 1)
            + if k != 0 { (order[0] - 1) * (order[1] - 1) } else { 0 }
            + offset);
    }

    // Body interior
    offset += 2
        * ((order[1] - 1) * (order[2] - 1)
            + (order[2] - 1) * (order[0] - 1)
            + (order[0] - 1) * (order[1] - 1));
    Ok(offset + (i - 1) + (order[0] - 1) * ((j - 1) + (order[1] - 1) * (k - 1)))
}

/// Flat index of the prism point at lattice position `(i, j, k)`.
///
/// `(i, j)` ranges over the triangular lattice of degree `rs_order`
/// (`i + j <= rs_order`) and `k` over `0..=t_order` layers. Numbering is the
/// usual vertices / edges / faces / body blocks: bottom triangle corners
/// 0..3, top corners 3..6; bottom triangle edges, top triangle edges, then
/// vertical edges; bottom triangle face, top triangle face, then the three
/// quadrilateral faces in bottom-edge order; body points layer by layer.
pub fn prism_point_index(
    i: usize,
    j: usize,
    k: usize,
    rs_order: usize,
    t_order: usize,
) -> Result<usize> {
    let n = rs_order;
    let m = t_order;
    if n < 1 || m < 1 {
        return Err(CellError::InvalidOrder(n.min(m)));
    }
    if i + j > n || k > m {
        return Err(CellError::IndexOutOfRange {
            index: i.max(j).max(k),
            npoints: (n + 1) * (n + 2) / 2 * (m + 1),
        });
    }

    // Classify (i, j) within the triangular lattice.
    let corner = if i == 0 && j == 0 {
        Some(0)
    } else if i == n && j == 0 {
        Some(1)
    } else if i == 0 && j == n {
        Some(2)
    } else {
        None
    };
    // (edge id, 1-based offset along the edge) when on a triangle edge.
    let tri_edge = if corner.is_some() {
        None
    } else if j == 0 {
        Some((0, i))
    } else if i + j == n {
        Some((1, j))
    } else if i == 0 {
        Some((2, n - j))
    } else {
        None
    };
    let kbot = k == 0;
    let ktop = k == m;
    let kbdy = kbot || ktop;

    if let Some(c) = corner {
        if kbdy {
            return Ok(c + if ktop { 3 } else { 0 });
        }
        // Vertical edge interior: edges 6, 7, 8
        let offset = 6 + 6 * (n - 1);
        return Ok(offset + (m - 1) * c + (k - 1));
    }

    if let Some((e, a)) = tri_edge {
        if kbdy {
            // Bottom (0..3) or top (3..6) triangle edge interior
            let offset = 6;
            let block = if ktop { 3 + e } else { e };
            return Ok(offset + block * (n - 1) + (a - 1));
        }
        // Quadrilateral face interior, one face per bottom edge;
        // lexicographic in (edge offset, layer).
        let mut offset = 6 + 6 * (n - 1) + 3 * (m - 1);
        let tri_interior = if n >= 3 { (n - 1) * (n - 2) / 2 } else { 0 };
        offset += 2 * tri_interior;
        return Ok(offset + e * (n - 1) * (m - 1) + (a - 1) + (n - 1) * (k - 1));
    }

    // (i, j) is interior to the triangle.
    let interior = simplex::index(&[n - i - j - 1, i - 1, j - 1, 0], n - 3, 2)?;
    let tri_interior = (n - 1) * (n - 2) / 2;
    if kbdy {
        // Bottom or top triangular face interior
        let offset = 6 + 6 * (n - 1) + 3 * (m - 1);
        return Ok(offset + if ktop { tri_interior } else { 0 } + interior);
    }

    // Body interior
    let offset =
        6 + 6 * (n - 1) + 3 * (m - 1) + 2 * tri_interior + 3 * (n - 1) * (m - 1);
    Ok(offset + interior + tri_interior * (k - 1))
}

/// Grid position of a flat interval index (brute-force inverse).
pub fn interval_ijk(index: usize, order: usize) -> Result<usize> {
    for i in 0..=order {
        if interval_point_index(i, order)? == index {
            return Ok(i);
        }
    }
    Err(CellError::IndexOutOfRange {
        index,
        npoints: order + 1,
    })
}

/// Grid position of a flat quadrilateral index (brute-force inverse).
pub fn quad_ijk(index: usize, order: &[usize; 2]) -> Result<[usize; 2]> {
    for j in 0..=order[1] {
        for i in 0..=order[0] {
            if quad_point_index(i, j, order)? == index {
                return Ok([i, j]);
            }
        }
    }
    Err(CellError::IndexOutOfRange {
        index,
        npoints: (order[0] + 1) * (order[1] + 1),
    })
}

/// Grid position of a flat hexahedron index (brute-force inverse).
pub fn hex_ijk(index: usize, order: &[usize; 3]) -> Result<[usize; 3]> {
    for k in 0..=order[2] {
        for j in 0..=order[1] {
            for i in 0..=order[0] {
                if hex_point_index(i, j, k, order)? == index {
                    return Ok([i, j, k]);
                }
            }
        }
    }
    Err(CellError::IndexOutOfRange {
        index,
        npoints: (order[0] + 1) * (order[1] + 1) * (order[2] + 1),
    })
}

/// Lattice position of a flat prism index (brute-force inverse).
pub fn prism_ijk(index: usize, rs_order: usize, t_order: usize) -> Result<[usize; 3]> {
    for k in 0..=t_order {
        for j in 0..=rs_order {
            for i in 0..=(rs_order - j) {
                if prism_point_index(i, j, k, rs_order, t_order)? == index {
                    return Ok([i, j, k]);
                }
            }
        }
    }
    Err(CellError::IndexOutOfRange {
        index,
        npoints: (rs_order + 1) * (rs_order + 2) / 2 * (t_order + 1),
    })
}
