//! Linear cell primitives
//!
//! Degree-1 cells backing the sub-cell queries of the higher-order family.
//! Each cell stores its corner coordinates and global point ids as scratch
//! space that callers overwrite between queries. Closest-point queries are
//! closed-form for simplices and Newton iterations for the tensor-product
//! cells; contouring and clipping run exact case analysis on simplices, with
//! quadrilaterals, hexahedra and prisms delegating through their simplicial
//! triangulation.

pub mod hexahedron;
pub mod line;
pub mod prism;
pub mod quadrilateral;
pub mod tetrahedron;
pub mod triangle;

pub use hexahedron::Hexahedron;
pub use line::Line;
pub use prism::Prism;
pub use quadrilateral::Quadrilateral;
pub use tetrahedron::Tetrahedron;
pub use triangle::Triangle;

use crate::interpolation;
use crate::reference_cell;
use crate::types::{
    Attributes, CellError, LineIntersection, PositionEvaluation, PositionStatus, RealScalar,
    ReferenceCellType, Result, TessellationOutput, Triangulation,
};
use num::Float;

/// Iteration cap for the tensor-product closest-point Newton solves.
pub const MAX_NEWTON_ITERATIONS: usize = 10;

/// Convergence threshold (on the parametric update norm) for Newton solves.
pub const NEWTON_TOLERANCE: f64 = 1e-10;

/// Parametric slack when classifying a point as inside a cell.
pub const PARAMETRIC_TOLERANCE: f64 = 1e-10;

pub(crate) fn sub3<T: RealScalar>(a: &[T; 3], b: &[T; 3]) -> [T; 3] {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

pub(crate) fn dot3<T: RealScalar>(a: &[T; 3], b: &[T; 3]) -> T {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

pub(crate) fn cross3<T: RealScalar>(a: &[T; 3], b: &[T; 3]) -> [T; 3] {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

pub(crate) fn norm2<T: RealScalar>(a: &[T; 3]) -> T {
    dot3(a, a)
}

pub(crate) fn axpy3<T: RealScalar>(a: &[T; 3], t: T, d: &[T; 3]) -> [T; 3] {
    [a[0] + t * d[0], a[1] + t * d[1], a[2] + t * d[2]]
}

/// Solve a 3x3 linear system given by its columns, by Cramer's rule.
pub(crate) fn solve3<T: RealScalar>(cols: &[[T; 3]; 3], rhs: &[T; 3]) -> Result<[T; 3]> {
    let det = dot3(&cols[0], &cross3(&cols[1], &cols[2]));
    let scale = Float::sqrt(norm2(&cols[0]) * norm2(&cols[1]) * norm2(&cols[2]));
    if Float::abs(det) <= T::epsilon() * (scale + T::epsilon()) {
        return Err(CellError::DegenerateCell);
    }
    Ok([
        dot3(rhs, &cross3(&cols[1], &cols[2])) / det,
        dot3(&cols[0], &cross3(rhs, &cols[2])) / det,
        dot3(&cols[0], &cross3(&cols[1], rhs)) / det,
    ])
}

/// Parameters of the closest points of the segments `[a1, b1]` and
/// `[a2, b2]`.
pub(crate) fn closest_segment_params<T: RealScalar>(
    a1: &[T; 3],
    b1: &[T; 3],
    a2: &[T; 3],
    b2: &[T; 3],
) -> (T, T) {
    let zero = T::zero();
    let one = T::one();
    let d1 = sub3(b1, a1);
    let d2 = sub3(b2, a2);
    let r = sub3(a1, a2);
    let a = norm2(&d1);
    let e = norm2(&d2);
    let f = dot3(&d2, &r);
    if a <= T::epsilon() && e <= T::epsilon() {
        return (zero, zero);
    }
    if a <= T::epsilon() {
        return (zero, num::clamp(f / e, zero, one));
    }
    let c = dot3(&d1, &r);
    if e <= T::epsilon() {
        return (num::clamp(-c / a, zero, one), zero);
    }
    let b = dot3(&d1, &d2);
    let denom = a * e - b * b;
    let mut s = if denom > T::epsilon() * a * e {
        num::clamp((b * f - c * e) / denom, zero, one)
    } else {
        zero
    };
    let mut t = (b * s + f) / e;
    if t < zero {
        t = zero;
        s = num::clamp(-c / a, zero, one);
    } else if t > one {
        t = one;
        s = num::clamp((b - c) / a, zero, one);
    }
    (s, t)
}

/// Closest point of the triangle `(a, b, c)` to `p`, with the barycentric
/// weights of `b` and `c` at the closest point.
pub(crate) fn closest_point_on_triangle<T: RealScalar>(
    p: &[T; 3],
    a: &[T; 3],
    b: &[T; 3],
    c: &[T; 3],
) -> ([T; 3], [T; 2]) {
    let zero = T::zero();
    let one = T::one();
    let ab = sub3(b, a);
    let ac = sub3(c, a);
    let ap = sub3(p, a);
    let d1 = dot3(&ab, &ap);
    let d2 = dot3(&ac, &ap);
    if d1 <= zero && d2 <= zero {
        return (*a, [zero, zero]);
    }
    let bp = sub3(p, b);
    let d3 = dot3(&ab, &bp);
    let d4 = dot3(&ac, &bp);
    if d3 >= zero && d4 <= d3 {
        return (*b, [one, zero]);
    }
    let vc = d1 * d4 - d3 * d2;
    if vc <= zero && d1 >= zero && d3 <= zero {
        let v = d1 / (d1 - d3);
        return (axpy3(a, v, &ab), [v, zero]);
    }
    let cp = sub3(p, c);
    let d5 = dot3(&ab, &cp);
    let d6 = dot3(&ac, &cp);
    if d6 >= zero && d5 <= d6 {
        return (*c, [zero, one]);
    }
    let vb = d5 * d2 - d1 * d6;
    if vb <= zero && d2 >= zero && d6 <= zero {
        let w = d2 / (d2 - d6);
        return (axpy3(a, w, &ac), [zero, w]);
    }
    let va = d3 * d6 - d5 * d4;
    if va <= zero && d4 - d3 >= zero && d5 - d6 >= zero {
        let w = (d4 - d3) / ((d4 - d3) + (d5 - d6));
        return (axpy3(b, w, &sub3(c, b)), [one - w, w]);
    }
    let denom = one / (va + vb + vc);
    let v = vb * denom;
    let w = vc * denom;
    let mut x = axpy3(a, v, &ab);
    x = axpy3(&x, w, &ac);
    (x, [v, w])
}

/// Segment/triangle intersection. Returns the segment parameter and the
/// barycentric weights of `b` and `c` at the hit.
pub(crate) fn intersect_segment_triangle<T: RealScalar>(
    p1: &[T; 3],
    p2: &[T; 3],
    a: &[T; 3],
    b: &[T; 3],
    c: &[T; 3],
    tol: T,
) -> Option<(T, [T; 2])> {
    let dir = sub3(p2, p1);
    let e1 = sub3(b, a);
    let e2 = sub3(c, a);
    let h = cross3(&dir, &e2);
    let det = dot3(&e1, &h);
    let scale = Float::sqrt(norm2(&dir) * norm2(&e1) * norm2(&e2));
    if Float::abs(det) <= T::epsilon() * (scale + T::epsilon()) {
        return None;
    }
    let inv = T::one() / det;
    let s = sub3(p1, a);
    let u = dot3(&s, &h) * inv;
    if u < -tol || u > T::one() + tol {
        return None;
    }
    let q = cross3(&s, &e1);
    let v = dot3(&dir, &q) * inv;
    if v < -tol || u + v > T::one() + tol {
        return None;
    }
    let t = dot3(&e2, &q) * inv;
    if t < -tol || t > T::one() + tol {
        return None;
    }
    Some((num::clamp(t, T::zero(), T::one()), [u, v]))
}

/// Gauss-Newton solve of the cell's multilinear map for the parametric
/// coordinates of `x`, starting from the cell midpoint.
pub(crate) fn newton_parametric<T: RealScalar>(
    cell: ReferenceCellType,
    points: &[[T; 3]],
    x: &[T; 3],
) -> Result<[T; 3]> {
    let mut pc = reference_cell::midpoint::<T>(cell);
    let tol2 = T::from(NEWTON_TOLERANCE * NEWTON_TOLERANCE).unwrap();
    for _ in 0..MAX_NEWTON_ITERATIONS {
        let weights = interpolation::linear_shape_functions(cell, &pc);
        let derivs = interpolation::linear_shape_derivatives(cell, &pc);
        let mut r = [-x[0], -x[1], -x[2]];
        let mut cols = [[T::zero(); 3]; 3];
        for (p, (w, g)) in points.iter().zip(weights.iter().zip(derivs.iter())) {
            for d in 0..3 {
                r[d] = r[d] + *w * p[d];
                for (col, gd) in cols.iter_mut().zip(g.iter()) {
                    col[d] = col[d] + *gd * p[d];
                }
            }
        }
        let update = if reference_cell::dim(cell) == 3 {
            solve3(&cols, &[-r[0], -r[1], -r[2]])?
        } else {
            // In-plane Gauss-Newton step for a surface cell
            let g00 = dot3(&cols[0], &cols[0]);
            let g01 = dot3(&cols[0], &cols[1]);
            let g11 = dot3(&cols[1], &cols[1]);
            let det = g00 * g11 - g01 * g01;
            if Float::abs(det) <= T::epsilon() * (g00 * g11 + T::epsilon()) {
                return Err(CellError::DegenerateCell);
            }
            let rhs = [-dot3(&cols[0], &r), -dot3(&cols[1], &r)];
            [
                (rhs[0] * g11 - rhs[1] * g01) / det,
                (rhs[1] * g00 - rhs[0] * g01) / det,
                T::zero(),
            ]
        };
        pc = [pc[0] + update[0], pc[1] + update[1], pc[2] + update[2]];
        if norm2(&update) < tol2 {
            return Ok(pc);
        }
    }
    Err(CellError::DegenerateCell)
}

/// Local corner lists of the simplicial triangulation of each cell type.
pub(crate) fn triangulation_table(cell: ReferenceCellType) -> (usize, Vec<Vec<usize>>) {
    match cell {
        ReferenceCellType::Interval => (2, vec![vec![0, 1]]),
        ReferenceCellType::Triangle => (3, vec![vec![0, 1, 2]]),
        ReferenceCellType::Quadrilateral => (3, vec![vec![0, 1, 2], vec![0, 2, 3]]),
        ReferenceCellType::Tetrahedron => (4, vec![vec![0, 1, 2, 3]]),
        // All six tetrahedra share the 0-6 diagonal, so the face diagonals
        // of adjacent axis-aligned hexahedra line up.
        ReferenceCellType::Hexahedron => (
            4,
            vec![
                vec![0, 1, 2, 6],
                vec![0, 2, 3, 6],
                vec![0, 3, 7, 6],
                vec![0, 7, 4, 6],
                vec![0, 4, 5, 6],
                vec![0, 5, 1, 6],
            ],
        ),
        ReferenceCellType::Prism => (
            4,
            vec![vec![0, 1, 2, 3], vec![1, 2, 3, 4], vec![2, 3, 4, 5]],
        ),
    }
}

fn signed_volume6<T: RealScalar>(a: &[T; 3], b: &[T; 3], c: &[T; 3], d: &[T; 3]) -> T {
    dot3(&sub3(b, a), &cross3(&sub3(c, a), &sub3(d, a)))
}

struct SimplexPiece<'a, T: RealScalar> {
    points: Vec<[T; 3]>,
    ids: Vec<usize>,
    scalars: Vec<T>,
    point_data: &'a Attributes<T>,
    cell_data: &'a Attributes<T>,
    cell_id: usize,
}

impl<T: RealScalar> SimplexPiece<'_, T> {
    fn above(&self, value: T, inside_out: bool) -> Vec<usize> {
        (0..self.scalars.len())
            .filter(|&i| (self.scalars[i] >= value) != inside_out)
            .collect()
    }

    fn crossing(&self, value: T, a: usize, b: usize, out: &mut TessellationOutput<T>) -> usize {
        let t = (value - self.scalars[a]) / (self.scalars[b] - self.scalars[a]);
        let x = axpy3(&self.points[a], t, &sub3(&self.points[b], &self.points[a]));
        out.insert_point(
            x,
            self.point_data,
            &[self.ids[a], self.ids[b]],
            &[T::one() - t, t],
        )
    }

    fn corner(&self, i: usize, out: &mut TessellationOutput<T>) -> usize {
        out.insert_point(self.points[i], self.point_data, &[self.ids[i]], &[T::one()])
    }

    fn emit(&self, out: &mut TessellationOutput<T>) {
        out.cell_data.copy_from(self.cell_data, self.cell_id);
    }

    fn contour_segment(&self, value: T, out: &mut TessellationOutput<T>) {
        let above = self.above(value, false);
        if above.len() == 1 {
            let v = self.crossing(value, above[0], 1 - above[0], out);
            out.verts.push(vec![v]);
            self.emit(out);
        }
    }

    fn contour_triangle(&self, value: T, out: &mut TessellationOutput<T>) {
        let above = self.above(value, false);
        let lone = match above.len() {
            1 => above[0],
            2 => 3 - above[0] - above[1],
            _ => return,
        };
        let a = self.crossing(value, lone, (lone + 1) % 3, out);
        let b = self.crossing(value, lone, (lone + 2) % 3, out);
        out.lines.push(vec![a, b]);
        self.emit(out);
    }

    fn contour_tetrahedron(&self, value: T, out: &mut TessellationOutput<T>) {
        let above = self.above(value, false);
        match above.len() {
            1 | 3 => {
                let lone = if above.len() == 1 {
                    above[0]
                } else {
                    6 - above[0] - above[1] - above[2]
                };
                let tri = (0..4)
                    .filter(|&i| i != lone)
                    .map(|o| self.crossing(value, lone, o, out))
                    .collect::<Vec<_>>();
                out.polys.push(tri);
                self.emit(out);
            }
            2 => {
                let below = (0..4).filter(|i| !above.contains(i)).collect::<Vec<_>>();
                // The four crossings form a cycle over the four side faces
                let q = [
                    self.crossing(value, above[0], below[0], out),
                    self.crossing(value, above[0], below[1], out),
                    self.crossing(value, above[1], below[1], out),
                    self.crossing(value, above[1], below[0], out),
                ];
                out.polys.push(vec![q[0], q[1], q[2]]);
                self.emit(out);
                out.polys.push(vec![q[0], q[2], q[3]]);
                self.emit(out);
            }
            _ => {}
        }
    }

    fn clip_segment(&self, value: T, inside_out: bool, out: &mut TessellationOutput<T>) {
        let above = self.above(value, inside_out);
        match above.len() {
            2 => {
                let a = self.corner(0, out);
                let b = self.corner(1, out);
                out.lines.push(vec![a, b]);
                self.emit(out);
            }
            1 => {
                let keep = above[0];
                let a = self.corner(keep, out);
                let b = self.crossing(value, keep, 1 - keep, out);
                out.lines.push(vec![a, b]);
                self.emit(out);
            }
            _ => {}
        }
    }

    fn clip_triangle(&self, value: T, inside_out: bool, out: &mut TessellationOutput<T>) {
        let above = self.above(value, inside_out);
        match above.len() {
            3 => {
                let t = (0..3).map(|i| self.corner(i, out)).collect::<Vec<_>>();
                out.polys.push(t);
                self.emit(out);
            }
            1 => {
                let keep = above[0];
                let k = self.corner(keep, out);
                let a = self.crossing(value, keep, (keep + 1) % 3, out);
                let b = self.crossing(value, keep, (keep + 2) % 3, out);
                out.polys.push(vec![k, a, b]);
                self.emit(out);
            }
            2 => {
                let lose = 3 - above[0] - above[1];
                let k0 = self.corner(above[0], out);
                let k1 = self.corner(above[1], out);
                let c1 = self.crossing(value, above[1], lose, out);
                let c0 = self.crossing(value, above[0], lose, out);
                out.polys.push(vec![k0, k1, c1]);
                self.emit(out);
                out.polys.push(vec![k0, c1, c0]);
                self.emit(out);
            }
            _ => {}
        }
    }

    fn clip_tetrahedron(&self, value: T, inside_out: bool, out: &mut TessellationOutput<T>) {
        let above = self.above(value, inside_out);
        match above.len() {
            4 => {
                let t = (0..4).map(|i| self.corner(i, out)).collect::<Vec<_>>();
                self.push_tet(t, out);
            }
            1 => {
                let keep = above[0];
                let k = self.corner(keep, out);
                let c = (0..4)
                    .filter(|&i| i != keep)
                    .map(|o| self.crossing(value, keep, o, out))
                    .collect::<Vec<_>>();
                self.push_tet(vec![k, c[0], c[1], c[2]], out);
            }
            3 => {
                let lose = 6 - above[0] - above[1] - above[2];
                let k = above
                    .iter()
                    .map(|&i| self.corner(i, out))
                    .collect::<Vec<_>>();
                let c = above
                    .iter()
                    .map(|&i| self.crossing(value, i, lose, out))
                    .collect::<Vec<_>>();
                self.push_wedge([k[0], k[1], k[2], c[0], c[1], c[2]], out);
            }
            2 => {
                let below = (0..4).filter(|i| !above.contains(i)).collect::<Vec<_>>();
                let k0 = self.corner(above[0], out);
                let k1 = self.corner(above[1], out);
                let c00 = self.crossing(value, above[0], below[0], out);
                let c01 = self.crossing(value, above[0], below[1], out);
                let c10 = self.crossing(value, above[1], below[0], out);
                let c11 = self.crossing(value, above[1], below[1], out);
                self.push_wedge([k0, c00, c01, k1, c10, c11], out);
            }
            _ => {}
        }
    }

    /// Emit a tetrahedron, flipping it if its volume comes out negative.
    fn push_tet(&self, mut t: Vec<usize>, out: &mut TessellationOutput<T>) {
        let v = signed_volume6(
            &out.points[t[0]],
            &out.points[t[1]],
            &out.points[t[2]],
            &out.points[t[3]],
        );
        if v < T::zero() {
            t.swap(2, 3);
        }
        out.tets.push(t);
        self.emit(out);
    }

    fn push_wedge(&self, v: [usize; 6], out: &mut TessellationOutput<T>) {
        for tet in [
            [v[0], v[1], v[2], v[3]],
            [v[1], v[2], v[3], v[4]],
            [v[2], v[3], v[4], v[5]],
        ] {
            self.push_tet(tet.to_vec(), out);
        }
    }
}

fn for_each_simplex<T: RealScalar>(
    cell: ReferenceCellType,
    points: &[[T; 3]],
    ids: &[usize],
    scalars: &[T],
    point_data: &Attributes<T>,
    cell_data: &Attributes<T>,
    cell_id: usize,
    out: &mut TessellationOutput<T>,
    f: impl Fn(&SimplexPiece<'_, T>, &mut TessellationOutput<T>),
) {
    let (_, table) = triangulation_table(cell);
    for local in table {
        let piece = SimplexPiece {
            points: local.iter().map(|&l| points[l]).collect(),
            ids: local.iter().map(|&l| ids[l]).collect(),
            scalars: local.iter().map(|&l| scalars[l]).collect(),
            point_data,
            cell_data,
            cell_id,
        };
        f(&piece, out);
    }
}

/// Uniform interface of the six linear cell types.
pub trait LinearCell<T: RealScalar> {
    /// The reference cell type.
    fn cell_type(&self) -> ReferenceCellType;

    /// Corner coordinates.
    fn points(&self) -> &[[T; 3]];

    /// Global point ids of the corners.
    fn ids(&self) -> &[usize];

    /// Overwrite one corner.
    fn set_corner(&mut self, local: usize, x: [T; 3], id: usize);

    /// Closest-point and containment query.
    fn evaluate_position(&self, x: &[T; 3]) -> Result<PositionEvaluation<T>>;

    /// Map parametric coordinates to physical space, returning the corner
    /// weights alongside the point.
    fn evaluate_location(&self, pc: &[T; 3]) -> ([T; 3], Vec<T>) {
        let weights = interpolation::linear_shape_functions(self.cell_type(), pc);
        let mut x = [T::zero(); 3];
        for (w, p) in weights.iter().zip(self.points().iter()) {
            for (xd, pd) in x.iter_mut().zip(p.iter()) {
                *xd = *xd + *w * *pd;
            }
        }
        (x, weights)
    }

    /// Earliest intersection of the segment `[p1, p2]` with the cell.
    fn intersect_with_line(
        &self,
        p1: &[T; 3],
        p2: &[T; 3],
        tol: T,
    ) -> Result<Option<LineIntersection<T>>> {
        let cell = self.cell_type();
        let points = self.points();
        let verts = reference_cell::vertices::<T>(cell);
        let mut best: Option<LineIntersection<T>> = None;

        if reference_cell::dim(cell) == 1 {
            let (s, t) = closest_segment_params(&points[0], &points[1], p1, p2);
            let on_cell = axpy3(&points[0], s, &sub3(&points[1], &points[0]));
            let on_line = axpy3(p1, t, &sub3(p2, p1));
            if norm2(&sub3(&on_cell, &on_line)) <= tol * tol {
                best = Some(LineIntersection {
                    t,
                    x: on_cell,
                    pcoords: [s, T::zero(), T::zero()],
                    sub_id: 0,
                });
            }
            return Ok(best);
        }

        let faces: Vec<Vec<usize>> = if reference_cell::dim(cell) == 2 {
            vec![(0..points.len()).collect()]
        } else {
            reference_cell::faces(cell)
        };
        for face in faces {
            let tris: Vec<[usize; 3]> = if face.len() == 3 {
                vec![[face[0], face[1], face[2]]]
            } else {
                vec![
                    [face[0], face[1], face[2]],
                    [face[0], face[2], face[3]],
                ]
            };
            for tri in tris {
                if let Some((t, bary)) = intersect_segment_triangle(
                    p1,
                    p2,
                    &points[tri[0]],
                    &points[tri[1]],
                    &points[tri[2]],
                    tol,
                ) {
                    if best.as_ref().map(|b| t < b.t).unwrap_or(true) {
                        // Parametric coordinates of the hit, through the
                        // reference coordinates of the face triangle
                        let w = [T::one() - bary[0] - bary[1], bary[0], bary[1]];
                        let mut pc = [T::zero(); 3];
                        for (wi, vi) in w.iter().zip(tri.iter()) {
                            for (pd, vd) in pc.iter_mut().zip(verts[*vi].iter()) {
                                *pd = *pd + *wi * *vd;
                            }
                        }
                        best = Some(LineIntersection {
                            t,
                            x: axpy3(p1, t, &sub3(p2, p1)),
                            pcoords: pc,
                            sub_id: 0,
                        });
                    }
                }
            }
        }
        Ok(best)
    }

    /// Simplicial triangulation of the cell, in global point ids.
    fn triangulate(&self) -> Triangulation<T> {
        let (verts_per_cell, table) = triangulation_table(self.cell_type());
        let mut tri = Triangulation {
            point_ids: vec![],
            points: vec![],
            verts_per_cell,
        };
        for piece in table {
            for local in piece {
                tri.point_ids.push(self.ids()[local]);
                tri.points.push(self.points()[local]);
            }
        }
        tri
    }

    /// Generate the iso-contour of the linear interpolant of `scalars`.
    fn contour(
        &self,
        value: T,
        scalars: &[T],
        point_data: &Attributes<T>,
        cell_data: &Attributes<T>,
        cell_id: usize,
        out: &mut TessellationOutput<T>,
    ) -> Result<()> {
        for_each_simplex(
            self.cell_type(),
            self.points(),
            self.ids(),
            scalars,
            point_data,
            cell_data,
            cell_id,
            out,
            |piece, out| match piece.points.len() {
                2 => piece.contour_segment(value, out),
                3 => piece.contour_triangle(value, out),
                _ => piece.contour_tetrahedron(value, out),
            },
        );
        Ok(())
    }

    /// Clip the cell against an iso-value, keeping the side where the
    /// interpolant is at least `value` (or the other side if `inside_out`).
    fn clip(
        &self,
        value: T,
        scalars: &[T],
        inside_out: bool,
        point_data: &Attributes<T>,
        cell_data: &Attributes<T>,
        cell_id: usize,
        out: &mut TessellationOutput<T>,
    ) -> Result<()> {
        for_each_simplex(
            self.cell_type(),
            self.points(),
            self.ids(),
            scalars,
            point_data,
            cell_data,
            cell_id,
            out,
            |piece, out| match piece.points.len() {
                2 => piece.clip_segment(value, inside_out, out),
                3 => piece.clip_triangle(value, inside_out, out),
                _ => piece.clip_tetrahedron(value, inside_out, out),
            },
        );
        Ok(())
    }

    /// The global ids of the boundary entity (face, edge or end point)
    /// closest to `pc` in parametric space, and whether `pc` lies inside
    /// the cell.
    fn cell_boundary(&self, pc: &[T; 3]) -> (Vec<usize>, bool) {
        let cell = self.cell_type();
        let ids = nearest_boundary_vertices(cell, pc)
            .into_iter()
            .map(|v| self.ids()[v])
            .collect();
        (ids, contains_parametric(cell, pc))
    }
}

/// Does `pc` lie in the reference cell, up to the parametric slack?
pub(crate) fn contains_parametric<T: RealScalar>(cell: ReferenceCellType, pc: &[T; 3]) -> bool {
    let tol = T::from(PARAMETRIC_TOLERANCE).unwrap();
    let lo = -tol;
    let hi = T::one() + tol;
    let in_box = |d: usize| pc[d] >= lo && pc[d] <= hi;
    match cell {
        ReferenceCellType::Interval => in_box(0),
        ReferenceCellType::Triangle => pc[0] >= lo && pc[1] >= lo && pc[0] + pc[1] <= hi,
        ReferenceCellType::Quadrilateral => in_box(0) && in_box(1),
        ReferenceCellType::Tetrahedron => {
            pc[0] >= lo && pc[1] >= lo && pc[2] >= lo && pc[0] + pc[1] + pc[2] <= hi
        }
        ReferenceCellType::Hexahedron => in_box(0) && in_box(1) && in_box(2),
        ReferenceCellType::Prism => {
            pc[0] >= lo && pc[1] >= lo && pc[0] + pc[1] <= hi && in_box(2)
        }
    }
}

/// Local vertex numbers of the boundary entity (face, edge or end point)
/// whose centroid is nearest to `pc` in parametric space.
pub(crate) fn nearest_boundary_vertices<T: RealScalar>(
    cell: ReferenceCellType,
    pc: &[T; 3],
) -> Vec<usize> {
    let verts = reference_cell::vertices::<T>(cell);
    let entities: Vec<Vec<usize>> = match reference_cell::dim(cell) {
        1 => vec![vec![0], vec![1]],
        2 => reference_cell::edges(cell)
            .iter()
            .map(|e| e.to_vec())
            .collect(),
        _ => reference_cell::faces(cell),
    };
    let mut best = 0;
    let mut best_d = Float::max_value();
    for (i, ent) in entities.iter().enumerate() {
        let mut centroid = [T::zero(); 3];
        for v in ent {
            for (cd, vd) in centroid.iter_mut().zip(verts[*v].iter()) {
                *cd = *cd + *vd / T::from(ent.len()).unwrap();
            }
        }
        let d = norm2(&sub3(pc, &centroid));
        if d < best_d {
            best_d = d;
            best = i;
        }
    }
    entities[best].clone()
}

/// Build the result of a containment query once the parametric coordinates
/// are known, falling back to the clamped coordinates when outside.
pub(crate) fn finish_evaluation<T: RealScalar, C: LinearCell<T> + ?Sized>(
    cell: &C,
    x: &[T; 3],
    pc: [T; 3],
    inside: bool,
    clamped: [T; 3],
) -> PositionEvaluation<T> {
    if inside {
        // For a curve or surface cell the query point may sit off the
        // manifold, so the distance is measured to the evaluated location
        let (closest, weights) = cell.evaluate_location(&pc);
        PositionEvaluation {
            status: PositionStatus::Inside,
            sub_id: 0,
            pcoords: pc,
            closest_point: closest,
            dist2: norm2(&sub3(x, &closest)),
            weights,
        }
    } else {
        let (closest, weights) = cell.evaluate_location(&clamped);
        PositionEvaluation {
            status: PositionStatus::Outside,
            sub_id: 0,
            pcoords: clamped,
            closest_point: closest,
            dist2: norm2(&sub3(x, &closest)),
            weights,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_solve3() {
        let cols = [[2.0, 0.0, 0.0], [0.0, 3.0, 0.0], [1.0, 0.0, 1.0]];
        let x = solve3(&cols, &[3.0, 6.0, 1.0]).unwrap();
        assert_relative_eq!(x[0], 1.0, epsilon = 1e-14);
        assert_relative_eq!(x[1], 2.0, epsilon = 1e-14);
        assert_relative_eq!(x[2], 1.0, epsilon = 1e-14);
    }

    #[test]
    fn test_solve3_degenerate() {
        let cols = [[1.0, 0.0, 0.0], [2.0, 0.0, 0.0], [0.0, 0.0, 1.0]];
        assert!(solve3(&cols, &[1.0, 1.0, 1.0]).is_err());
    }

    #[test]
    fn test_closest_point_on_triangle_regions() {
        let a = [0.0, 0.0, 0.0];
        let b = [1.0, 0.0, 0.0];
        let c = [0.0, 1.0, 0.0];
        // Interior point projects straight down
        let (x, bary) = closest_point_on_triangle(&[0.25, 0.25, 1.0], &a, &b, &c);
        assert_relative_eq!(x[0], 0.25);
        assert_relative_eq!(x[2], 0.0);
        assert_relative_eq!(bary[0], 0.25);
        // Beyond vertex b
        let (x, bary) = closest_point_on_triangle(&[2.0, -1.0, 0.0], &a, &b, &c);
        assert_relative_eq!(x[0], 1.0);
        assert_relative_eq!(bary[0], 1.0);
        // Closest to the diagonal edge
        let (x, _) = closest_point_on_triangle(&[1.0, 1.0, 0.0], &a, &b, &c);
        assert_relative_eq!(x[0], 0.5);
        assert_relative_eq!(x[1], 0.5);
    }

    #[test]
    fn test_segment_triangle_intersection() {
        let a = [0.0, 0.0, 0.0];
        let b = [1.0, 0.0, 0.0];
        let c = [0.0, 1.0, 0.0];
        let hit =
            intersect_segment_triangle(&[0.2, 0.2, -1.0], &[0.2, 0.2, 1.0], &a, &b, &c, 1e-12)
                .unwrap();
        assert_relative_eq!(hit.0, 0.5);
        assert_relative_eq!(hit.1[0], 0.2);
        assert!(intersect_segment_triangle(
            &[2.0, 2.0, -1.0],
            &[2.0, 2.0, 1.0],
            &a,
            &b,
            &c,
            1e-12
        )
        .is_none());
    }

    #[test]
    fn test_closest_segment_params() {
        let (s, t) = closest_segment_params(
            &[0.0, 0.0, 0.0],
            &[1.0, 0.0, 0.0],
            &[0.5, -1.0, 1.0],
            &[0.5, 1.0, 1.0],
        );
        assert_relative_eq!(s, 0.5, epsilon = 1e-14);
        assert_relative_eq!(t, 0.5, epsilon = 1e-14);
    }

    #[test]
    fn test_cell_boundary_flag() {
        let mut tri = Triangle::<f64>::new();
        tri.set_corner(0, [0.0, 0.0, 0.0], 4);
        tri.set_corner(1, [1.0, 0.0, 0.0], 5);
        tri.set_corner(2, [0.0, 1.0, 0.0], 6);
        let (ids, inside) = tri.cell_boundary(&[0.5, 0.05, 0.0]);
        assert_eq!(ids, vec![4, 5]);
        assert!(inside);
        let (ids, inside) = tri.cell_boundary(&[0.5, -0.05, 0.0]);
        assert_eq!(ids, vec![4, 5]);
        assert!(!inside);
    }

    #[test]
    fn test_contains_parametric() {
        let cell = ReferenceCellType::Tetrahedron;
        assert!(contains_parametric(cell, &[0.2, 0.2, 0.2]));
        assert!(!contains_parametric(cell, &[0.5, 0.5, 0.5]));
        assert!(!contains_parametric(cell, &[-0.1, 0.2, 0.2]));
    }

    #[test]
    fn test_triangulation_tables_cover() {
        // The hexahedron and prism splits tile the reference volume
        for cell in [ReferenceCellType::Hexahedron, ReferenceCellType::Prism] {
            let verts = reference_cell::vertices::<f64>(cell);
            let (_, tets) = triangulation_table(cell);
            let mut total = 0.0;
            for t in tets {
                let v =
                    signed_volume6(&verts[t[0]], &verts[t[1]], &verts[t[2]], &verts[t[3]]);
                assert!(v > 0.0);
                total += v / 6.0;
            }
            let expected = if cell == ReferenceCellType::Hexahedron {
                1.0
            } else {
                0.5
            };
            assert_relative_eq!(total, expected, epsilon = 1e-14);
        }
    }
}
