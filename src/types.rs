//! Types specific to hocell

use rlst::RlstScalar;

/// Real-valued scalar usable for cell geometry.
pub trait RealScalar: num::Float + RlstScalar<Real = Self> {}

impl<T: num::Float + RlstScalar<Real = T>> RealScalar for T {}

/// Reference cell types supported by the higher-order cell family.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum ReferenceCellType {
    /// A line interval
    Interval,
    /// A triangle
    Triangle,
    /// A quadrilateral
    Quadrilateral,
    /// A tetrahedron
    Tetrahedron,
    /// A hexahedron (cuboid)
    Hexahedron,
    /// A triangular prism (wedge)
    Prism,
}

/// Errors returned by cell operations.
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum CellError {
    /// A polynomial order below 1 (or otherwise unusable) was supplied
    #[error("Invalid polynomial order: {0}")]
    InvalidOrder(usize),
    /// A flat point index was outside the valid range
    #[error("Point index {index} out of range (cell has {npoints} points)")]
    IndexOutOfRange {
        /// The offending index
        index: usize,
        /// The number of points in the cell
        npoints: usize,
    },
    /// A sub-cell index was outside the valid range
    #[error("Sub-cell index {index} out of range ({nsubcells} sub-cells)")]
    SubCellOutOfRange {
        /// The offending sub-cell index
        index: usize,
        /// The number of sub-cells
        nsubcells: usize,
    },
    /// Barycentric coordinates did not sum to the order
    #[error("Barycentric coordinates sum to {sum}, expected {order}")]
    BarycentricSumMismatch {
        /// The coordinate sum
        sum: usize,
        /// The expected sum
        order: usize,
    },
    /// The declared order does not reproduce the stored point count
    #[error("Order implies {expected} points but cell has {found}")]
    PointCountMismatch {
        /// Point count implied by the order
        expected: usize,
        /// Point count actually stored
        found: usize,
    },
    /// No uniform order reproduces the stored point count
    #[error("No uniform order matches a {0}-point cell of this type")]
    NonUniformPointCount(usize),
    /// A geometric computation encountered a degenerate configuration
    #[error("Degenerate cell geometry")]
    DegenerateCell,
    /// The operation is not available for this cell type
    #[error("Unsupported operation: {0}")]
    Unsupported(String),
    /// A required attribute array was missing or malformed
    #[error("Attribute error: {0}")]
    Attribute(String),
}

/// Result type used throughout the crate.
pub type Result<T> = std::result::Result<T, CellError>;

/// Containment status reported by position queries.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum PositionStatus {
    /// The query point lies inside the cell
    Inside,
    /// The query point lies outside the cell
    Outside,
}

/// Result of a closest-point / containment query.
#[derive(Debug, Clone)]
pub struct PositionEvaluation<T: RealScalar> {
    /// Containment status
    pub status: PositionStatus,
    /// Index of the winning linear sub-cell
    pub sub_id: usize,
    /// Parametric coordinates in the parent cell
    pub pcoords: [T; 3],
    /// Closest point on the cell (meaningful when status is Outside)
    pub closest_point: [T; 3],
    /// Squared distance to the closest point (zero when inside)
    pub dist2: T,
    /// Interpolation weights over the full control-point grid
    pub weights: Vec<T>,
}

/// Result of a ray/line intersection query.
#[derive(Debug, Clone, Copy)]
pub struct LineIntersection<T: RealScalar> {
    /// Line parameter of the hit, in [0, 1] between the two query points
    pub t: T,
    /// The intersection point
    pub x: [T; 3],
    /// Parametric coordinates of the hit in the parent cell
    pub pcoords: [T; 3],
    /// Index of the sub-cell that was hit
    pub sub_id: usize,
}

/// A triangulation (or segmentation, for curves) of a cell.
///
/// Point ids shared between adjacent sub-cells are duplicated; no
/// deduplication is performed at this level.
#[derive(Debug, Clone, Default)]
pub struct Triangulation<T: RealScalar> {
    /// Point ids, `verts_per_cell` entries per output cell
    pub point_ids: Vec<usize>,
    /// Point coordinates, parallel to `point_ids`
    pub points: Vec<[T; 3]>,
    /// Number of corners per output cell (2, 3 or 4)
    pub verts_per_cell: usize,
}

impl<T: RealScalar> Triangulation<T> {
    /// The number of output cells.
    pub fn len(&self) -> usize {
        if self.verts_per_cell == 0 {
            0
        } else {
            self.point_ids.len() / self.verts_per_cell
        }
    }

    /// Is the triangulation empty?
    pub fn is_empty(&self) -> bool {
        self.point_ids.is_empty()
    }
}

/// A named fixed-width tuple array, addressable by 0-based flat index.
#[derive(Debug, Clone)]
pub struct AttributeArray<T: RealScalar> {
    /// Attribute name
    pub name: String,
    /// Number of components per tuple
    pub width: usize,
    /// Tuple values, `width` entries per tuple
    pub data: Vec<T>,
}

impl<T: RealScalar> AttributeArray<T> {
    /// Create an empty array with the given name and tuple width.
    pub fn new(name: &str, width: usize) -> Self {
        Self {
            name: name.to_string(),
            width,
            data: vec![],
        }
    }

    /// The number of tuples stored.
    pub fn len(&self) -> usize {
        self.data.len() / self.width
    }

    /// Is the array empty?
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// The tuple at `index`.
    pub fn tuple(&self, index: usize) -> &[T] {
        &self.data[index * self.width..(index + 1) * self.width]
    }

    /// Append a tuple.
    pub fn push_tuple(&mut self, tuple: &[T]) {
        debug_assert_eq!(tuple.len(), self.width);
        self.data.extend_from_slice(tuple);
    }
}

/// A collection of attribute arrays (point data or cell data).
#[derive(Debug, Clone, Default)]
pub struct Attributes<T: RealScalar> {
    /// The arrays in this collection
    pub arrays: Vec<AttributeArray<T>>,
}

impl<T: RealScalar> Attributes<T> {
    /// Create an empty collection.
    pub fn new() -> Self {
        Self { arrays: vec![] }
    }

    /// Look an array up by name.
    pub fn array(&self, name: &str) -> Option<&AttributeArray<T>> {
        self.arrays.iter().find(|a| a.name == name)
    }

    /// Append, for every array, the weighted combination of the tuples at
    /// `indices` with the given `weights`.
    pub fn interpolate_from(&mut self, source: &Attributes<T>, indices: &[usize], weights: &[T]) {
        for (dst, src) in self.arrays.iter_mut().zip(source.arrays.iter()) {
            let mut tuple = vec![T::zero(); src.width];
            for (&i, &w) in indices.iter().zip(weights.iter()) {
                for (t, v) in tuple.iter_mut().zip(src.tuple(i).iter()) {
                    *t = *t + w * *v;
                }
            }
            dst.push_tuple(&tuple);
        }
    }

    /// Append a verbatim copy of the tuple at `index` in every array.
    pub fn copy_from(&mut self, source: &Attributes<T>, index: usize) {
        for (dst, src) in self.arrays.iter_mut().zip(source.arrays.iter()) {
            dst.push_tuple(src.tuple(index));
        }
    }

    /// An empty collection with the same array names and widths as `self`.
    pub fn empty_like(&self) -> Self {
        Self {
            arrays: self
                .arrays
                .iter()
                .map(|a| AttributeArray::new(&a.name, a.width))
                .collect(),
        }
    }
}

/// Conventional name of the cell-data array carrying per-axis polynomial
/// degrees.
pub const DEGREES_ATTRIBUTE_NAME: &str = "HigherOrderDegrees";

/// Output containers for contouring, clipping and tessellation.
#[derive(Debug, Clone, Default)]
pub struct TessellationOutput<T: RealScalar> {
    /// Generated points
    pub points: Vec<[T; 3]>,
    /// Vertex cells (point-id singletons)
    pub verts: Vec<Vec<usize>>,
    /// Line cells
    pub lines: Vec<Vec<usize>>,
    /// Polygon cells (triangles)
    pub polys: Vec<Vec<usize>>,
    /// Tetrahedral cells (produced by clipping volumetric cells)
    pub tets: Vec<Vec<usize>>,
    /// Interpolated point data, parallel to `points`
    pub point_data: Attributes<T>,
    /// Copied cell data, one tuple per output cell and array
    pub cell_data: Attributes<T>,
}

impl<T: RealScalar> TessellationOutput<T> {
    /// Create empty output whose data collections mirror the given inputs.
    pub fn new(point_data: &Attributes<T>, cell_data: &Attributes<T>) -> Self {
        Self {
            points: vec![],
            verts: vec![],
            lines: vec![],
            polys: vec![],
            tets: vec![],
            point_data: point_data.empty_like(),
            cell_data: cell_data.empty_like(),
        }
    }

    /// Insert a point interpolated from `source` tuples, returning its index.
    pub fn insert_point(
        &mut self,
        x: [T; 3],
        source: &Attributes<T>,
        indices: &[usize],
        weights: &[T],
    ) -> usize {
        self.points.push(x);
        self.point_data.interpolate_from(source, indices, weights);
        self.points.len() - 1
    }
}
