//! Cell definitions
//!
//! Vertex, edge and face orderings here are the file-order conventions that
//! the flat point numbering of the higher-order cells is built on: corner
//! vertices first, in the same order as the matching linear cell, then edges,
//! then faces.

use crate::types::{RealScalar, ReferenceCellType};

/// The topological dimension of the cell
pub fn dim(cell: ReferenceCellType) -> usize {
    match cell {
        ReferenceCellType::Interval => 1,
        ReferenceCellType::Triangle => 2,
        ReferenceCellType::Quadrilateral => 2,
        ReferenceCellType::Tetrahedron => 3,
        ReferenceCellType::Hexahedron => 3,
        ReferenceCellType::Prism => 3,
    }
}

/// Is the cell a simplex?
pub fn is_simplex(cell: ReferenceCellType) -> bool {
    match cell {
        ReferenceCellType::Interval => true,
        ReferenceCellType::Triangle => true,
        ReferenceCellType::Quadrilateral => false,
        ReferenceCellType::Tetrahedron => true,
        ReferenceCellType::Hexahedron => false,
        ReferenceCellType::Prism => false,
    }
}

/// The vertices of the reference cell
pub fn vertices<T: RealScalar>(cell: ReferenceCellType) -> Vec<[T; 3]> {
    let zero = T::zero();
    let one = T::one();
    match cell {
        ReferenceCellType::Interval => vec![[zero, zero, zero], [one, zero, zero]],
        ReferenceCellType::Triangle => vec![
            [zero, zero, zero],
            [one, zero, zero],
            [zero, one, zero],
        ],
        ReferenceCellType::Quadrilateral => vec![
            [zero, zero, zero],
            [one, zero, zero],
            [one, one, zero],
            [zero, one, zero],
        ],
        ReferenceCellType::Tetrahedron => vec![
            [zero, zero, zero],
            [one, zero, zero],
            [zero, one, zero],
            [zero, zero, one],
        ],
        ReferenceCellType::Hexahedron => vec![
            [zero, zero, zero],
            [one, zero, zero],
            [one, one, zero],
            [zero, one, zero],
            [zero, zero, one],
            [one, zero, one],
            [one, one, one],
            [zero, one, one],
        ],
        ReferenceCellType::Prism => vec![
            [zero, zero, zero],
            [one, zero, zero],
            [zero, one, zero],
            [zero, zero, one],
            [one, zero, one],
            [zero, one, one],
        ],
    }
}

/// The midpoint of the cell
pub fn midpoint<T: RealScalar>(cell: ReferenceCellType) -> [T; 3] {
    let zero = T::zero();
    let half = T::from(0.5).unwrap();
    let third = T::one() / T::from(3.0).unwrap();
    match cell {
        ReferenceCellType::Interval => [half, zero, zero],
        ReferenceCellType::Triangle => [third, third, zero],
        ReferenceCellType::Quadrilateral => [half, half, zero],
        ReferenceCellType::Tetrahedron => [T::from(0.25).unwrap(); 3],
        ReferenceCellType::Hexahedron => [half, half, half],
        ReferenceCellType::Prism => [third, third, half],
    }
}

/// The edges of the reference cell
pub fn edges(cell: ReferenceCellType) -> Vec<[usize; 2]> {
    match cell {
        ReferenceCellType::Interval => vec![[0, 1]],
        ReferenceCellType::Triangle => vec![[0, 1], [1, 2], [2, 0]],
        ReferenceCellType::Quadrilateral => vec![[0, 1], [1, 2], [3, 2], [0, 3]],
        ReferenceCellType::Tetrahedron => {
            vec![[0, 1], [1, 2], [2, 0], [0, 3], [1, 3], [2, 3]]
        }
        ReferenceCellType::Hexahedron => vec![
            [0, 1],
            [1, 2],
            [3, 2],
            [0, 3],
            [4, 5],
            [5, 6],
            [7, 6],
            [4, 7],
            [0, 4],
            [1, 5],
            [2, 6],
            [3, 7],
        ],
        ReferenceCellType::Prism => vec![
            [0, 1],
            [1, 2],
            [2, 0],
            [3, 4],
            [4, 5],
            [5, 3],
            [0, 3],
            [1, 4],
            [2, 5],
        ],
    }
}

/// The faces of the reference cell
pub fn faces(cell: ReferenceCellType) -> Vec<Vec<usize>> {
    match cell {
        ReferenceCellType::Interval => vec![],
        ReferenceCellType::Triangle => vec![vec![0, 1, 2]],
        ReferenceCellType::Quadrilateral => vec![vec![0, 1, 2, 3]],
        ReferenceCellType::Tetrahedron => vec![
            vec![0, 1, 3],
            vec![1, 2, 3],
            vec![2, 0, 3],
            vec![0, 1, 2],
        ],
        ReferenceCellType::Hexahedron => vec![
            vec![0, 3, 7, 4],
            vec![1, 2, 6, 5],
            vec![0, 1, 5, 4],
            vec![3, 2, 6, 7],
            vec![0, 1, 2, 3],
            vec![4, 5, 6, 7],
        ],
        ReferenceCellType::Prism => vec![
            vec![0, 1, 2],
            vec![3, 4, 5],
            vec![0, 1, 4, 3],
            vec![1, 2, 5, 4],
            vec![2, 0, 3, 5],
        ],
    }
}

/// The number of subentities of each dimension
pub fn entity_counts(cell: ReferenceCellType) -> [usize; 4] {
    match cell {
        ReferenceCellType::Interval => [2, 1, 0, 0],
        ReferenceCellType::Triangle => [3, 3, 1, 0],
        ReferenceCellType::Quadrilateral => [4, 4, 1, 0],
        ReferenceCellType::Tetrahedron => [4, 6, 4, 1],
        ReferenceCellType::Hexahedron => [8, 12, 6, 1],
        ReferenceCellType::Prism => [6, 9, 5, 1],
    }
}
