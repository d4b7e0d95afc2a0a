//! Barycentric bijections for triangles and tetrahedra
//!
//! A point of a degree `order` simplex lattice is an integer barycentric
//! tuple summing to `order`. The flat numbering peels the lattice ring by
//! ring (shell by shell in 3D): each layer lists its corner points first,
//! then its edge interiors edge by edge, then (in 3D) its face interiors
//! face by face, and the remaining interior lattice is numbered recursively
//! as a smaller simplex of the same kind.

use crate::reference_cell;
use crate::types::{CellError, ReferenceCellType, Result};

fn cell_for_dim(dim: usize) -> Result<ReferenceCellType> {
    match dim {
        2 => Ok(ReferenceCellType::Triangle),
        3 => Ok(ReferenceCellType::Tetrahedron),
        _ => Err(CellError::Unsupported(format!(
            "no simplex bijection for dimension {dim}"
        ))),
    }
}

/// The number of lattice points in the outermost layer of a degree `n`
/// simplex.
fn layer_size(n: usize, dim: usize) -> usize {
    if n == 0 {
        1
    } else if dim == 2 {
        3 * n
    } else {
        2 * (n * n + 1)
    }
}

/// The number of lattice points of a degree `order` simplex.
pub fn num_points(order: usize, dim: usize) -> usize {
    if dim == 2 {
        (order + 1) * (order + 2) / 2
    } else {
        (order + 1) * (order + 2) * (order + 3) / 6
    }
}

/// Flat index of the barycentric tuple `bary`.
///
/// `bary[0..=dim]` must sum to `order`; trailing entries must be zero.
pub fn index(bary: &[usize; 4], order: usize, dim: usize) -> Result<usize> {
    let cell = cell_for_dim(dim)?;
    let nverts = dim + 1;
    let sum = bary[..nverts].iter().sum::<usize>();
    if sum != order || bary[nverts..].iter().any(|b| *b != 0) {
        return Err(CellError::BarycentricSumMismatch {
            sum: bary.iter().sum(),
            order,
        });
    }
    let edges = reference_cell::edges(cell);

    let mut offset = 0;
    let mut min = 0;
    let mut n = order;
    loop {
        if n == 0 {
            // Central point of the lattice
            return Ok(offset);
        }
        let above = (0..nverts)
            .filter(|&i| bary[i] > min)
            .collect::<Vec<_>>();
        match nverts - above.len() {
            0 => {
                // Interior of this layer; peel and recurse
                offset += layer_size(n, dim);
                min += 1;
                n -= nverts;
            }
            c if c == nverts - 1 => {
                // A corner of the layer
                return Ok(offset + above[0]);
            }
            c if c == nverts - 2 => {
                // Interior of a layer edge
                let e = edges
                    .iter()
                    .position(|ed| {
                        (ed[0] == above[0] && ed[1] == above[1])
                            || (ed[0] == above[1] && ed[1] == above[0])
                    })
                    .ok_or(CellError::BarycentricSumMismatch { sum, order })?;
                let j = bary[edges[e][1]] - min - 1;
                return Ok(offset + nverts + e * (n - 1) + j);
            }
            _ => {
                // Interior of a layer face (tetrahedra only)
                let excluded = 6 - above[0] - above[1] - above[2];
                let f = match excluded {
                    2 => 0,
                    0 => 1,
                    1 => 2,
                    _ => 3,
                };
                let face = &reference_cell::faces(cell)[f];
                let tri = [
                    bary[face[0]] - min - 1,
                    bary[face[1]] - min - 1,
                    bary[face[2]] - min - 1,
                    0,
                ];
                return Ok(offset
                    + nverts
                    + edges.len() * (n - 1)
                    + f * (n - 1) * (n - 2) / 2
                    + index(&tri, n - 3, 2)?);
            }
        }
    }
}

/// Barycentric tuple of a flat index (the inverse of [`index`]).
pub fn barycentric_index(index: usize, order: usize, dim: usize) -> Result<[usize; 4]> {
    let cell = cell_for_dim(dim)?;
    let nverts = dim + 1;
    let npoints = num_points(order, dim);
    if index >= npoints {
        return Err(CellError::IndexOutOfRange { index, npoints });
    }
    let edges = reference_cell::edges(cell);

    let mut index = index;
    let mut min = 0;
    let mut n = order;
    loop {
        let size = layer_size(n, dim);
        if index >= size {
            index -= size;
            min += 1;
            n -= nverts;
            continue;
        }
        let mut bary = [0; 4];
        bary[..nverts].fill(min);
        if n == 0 {
            return Ok(bary);
        }
        let max = min + n;
        if index < nverts {
            bary[index] = max;
            return Ok(bary);
        }
        index -= nverts;
        if index < edges.len() * (n - 1) {
            let e = index / (n - 1);
            let j = index % (n - 1);
            bary[edges[e][0]] = max - (j + 1);
            bary[edges[e][1]] = min + j + 1;
            return Ok(bary);
        }
        index -= edges.len() * (n - 1);
        let fsize = (n - 1) * (n - 2) / 2;
        let f = index / fsize;
        let tri = barycentric_index(index % fsize, n - 3, 2)?;
        for (t, v) in reference_cell::faces(cell)[f].iter().enumerate() {
            bary[*v] = min + 1 + tri[t];
        }
        return Ok(bary);
    }
}
