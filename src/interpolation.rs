//! Shape functions for higher-order cells
//!
//! Evaluates interpolation weights (and their parametric gradients) over the
//! control points of a cell, in the flat point order of the indexing
//! bijections. Interval, quadrilateral and hexahedron cells use products of
//! equispaced 1-D Lagrange polynomials; triangles and tetrahedra use the
//! integer-node barycentric product formula; prisms are the product of the
//! two. The three serendipity layouts get dedicated bases built from the
//! quadratic basis plus bubble corrections.

use crate::collocation;
use crate::indexing;
use crate::types::{CellError, RealScalar, ReferenceCellType, Result};
use rlst::{RandomAccessByRef, RandomAccessMut, Shape};

/// Parametric axis along which each hexahedron edge runs.
pub const HEX_EDGE_AXIS: [usize; 12] = [0, 1, 0, 1, 0, 1, 0, 1, 2, 2, 2, 2];

/// Fixed parametric axis and value (0 or 1) of each hexahedron face.
pub const HEX_FACE_AXIS: [(usize, usize); 6] =
    [(0, 0), (0, 1), (1, 0), (1, 1), (2, 0), (2, 1)];

/// Values and derivatives of the equispaced 1-D Lagrange basis of degree
/// `order` at `x`, in lattice node order.
///
/// Uses the product form `L_i(x) = prod_k (n x - k) / (i - k)` with a
/// running product-rule accumulation for the derivative, so no node
/// coincidence ever divides by zero.
fn lagrange_1d<T: RealScalar>(order: usize, x: T) -> (Vec<T>, Vec<T>) {
    let n = T::from(order).unwrap();
    let mut values = Vec::with_capacity(order + 1);
    let mut derivs = Vec::with_capacity(order + 1);
    for i in 0..=order {
        let mut v = T::one();
        let mut d = T::zero();
        for k in 0..=order {
            if k == i {
                continue;
            }
            let denom = T::from(i as f64 - k as f64).unwrap();
            let factor = (n * x - T::from(k).unwrap()) / denom;
            d = d * factor + v * n / denom;
            v = v * factor;
        }
        values.push(v);
        derivs.push(d);
    }
    (values, derivs)
}

/// Value and derivative of `prod_{k<b} (n lambda - k) / (b - k)` at `lambda`.
fn grid_product<T: RealScalar>(b: usize, n: T, lambda: T) -> (T, T) {
    let mut v = T::one();
    let mut d = T::zero();
    for k in 0..b {
        let denom = T::from(b - k).unwrap();
        let factor = (n * lambda - T::from(k).unwrap()) / denom;
        d = d * factor + v * n / denom;
        v = v * factor;
    }
    (v, d)
}

/// Weights and parametric gradients of a full-lattice simplex basis.
fn simplex_eval<T: RealScalar>(
    order: usize,
    dim: usize,
    pc: &[T; 3],
) -> Result<(Vec<T>, Vec<[T; 3]>)> {
    let nverts = dim + 1;
    let n = T::from(order).unwrap();
    let mut lambda = [T::zero(); 4];
    lambda[1] = pc[0];
    lambda[2] = pc[1];
    if dim == 3 {
        lambda[3] = pc[2];
    }
    lambda[0] = T::one() - lambda[1] - lambda[2] - lambda[3];

    let npoints = indexing::simplex::num_points(order, dim);
    let mut weights = Vec::with_capacity(npoints);
    let mut gradients = Vec::with_capacity(npoints);
    for q in 0..npoints {
        let b = indexing::simplex::barycentric_index(q, order, dim)?;
        let mut p = [T::one(); 4];
        let mut dp = [T::zero(); 4];
        for i in 0..nverts {
            let (v, d) = grid_product(b[i], n, lambda[i]);
            p[i] = v;
            dp[i] = d;
        }
        let mut value = T::one();
        for v in p.iter().take(nverts) {
            value = value * *v;
        }
        // Gradient with respect to each barycentric coordinate
        let mut glambda = [T::zero(); 4];
        for (i, g) in glambda.iter_mut().enumerate().take(nverts) {
            let mut others = T::one();
            for (j, v) in p.iter().enumerate().take(nverts) {
                if j != i {
                    others = others * *v;
                }
            }
            *g = dp[i] * others;
        }
        let mut grad = [T::zero(); 3];
        for (d, g) in grad.iter_mut().enumerate().take(dim) {
            *g = glambda[d + 1] - glambda[0];
        }
        weights.push(value);
        gradients.push(grad);
    }
    Ok((weights, gradients))
}

/// The 7-point triangle basis: quadratic plus cubic bubble corrections.
fn seven_point_triangle_eval<T: RealScalar>(pc: &[T; 3]) -> (Vec<T>, Vec<[T; 3]>) {
    let one = T::one();
    let two = T::from(2.0).unwrap();
    let l = [one - pc[0] - pc[1], pc[0], pc[1]];
    let dl = [[-one, -one], [one, T::zero()], [T::zero(), one]];
    let bubble = l[0] * l[1] * l[2];
    let dbubble = [
        dl[0][0] * l[1] * l[2] + l[0] * dl[1][0] * l[2] + l[0] * l[1] * dl[2][0],
        dl[0][1] * l[1] * l[2] + l[0] * dl[1][1] * l[2] + l[0] * l[1] * dl[2][1],
    ];

    let mut weights = vec![T::zero(); 7];
    let mut gradients = vec![[T::zero(); 3]; 7];
    let three = T::from(3.0).unwrap();
    let four = T::from(4.0).unwrap();
    let twelve = T::from(12.0).unwrap();
    for i in 0..3 {
        weights[i] = l[i] * (two * l[i] - one) + three * bubble;
        for d in 0..2 {
            gradients[i][d] =
                dl[i][d] * (four * l[i] - one) + three * dbubble[d];
        }
    }
    for e in 0..3 {
        let (u, v) = (e, (e + 1) % 3);
        weights[3 + e] = four * l[u] * l[v] - twelve * bubble;
        for d in 0..2 {
            gradients[3 + e][d] =
                four * (dl[u][d] * l[v] + l[u] * dl[v][d]) - twelve * dbubble[d];
        }
    }
    let tsn = T::from(27.0).unwrap();
    weights[6] = tsn * bubble;
    gradients[6][0] = tsn * dbubble[0];
    gradients[6][1] = tsn * dbubble[1];
    (weights, gradients)
}

/// The 15-point tetrahedron basis: quadratic plus face and body bubble
/// corrections. The face bubbles keep the partition of unity exact.
fn fifteen_point_tetrahedron_eval<T: RealScalar>(pc: &[T; 3]) -> (Vec<T>, Vec<[T; 3]>) {
    let one = T::one();
    let l = [one - pc[0] - pc[1] - pc[2], pc[0], pc[1], pc[2]];
    let dl = [
        [-one, -one, -one],
        [one, T::zero(), T::zero()],
        [T::zero(), one, T::zero()],
        [T::zero(), T::zero(), one],
    ];

    let quartic = l[0] * l[1] * l[2] * l[3];
    let mut dquartic = [T::zero(); 3];
    for (d, dq) in dquartic.iter_mut().enumerate() {
        for i in 0..4 {
            let mut term = dl[i][d];
            for (j, lj) in l.iter().enumerate() {
                if j != i {
                    term = term * *lj;
                }
            }
            *dq = *dq + term;
        }
    }

    let tsn = T::from(27.0).unwrap();
    let c108 = T::from(108.0).unwrap();
    let c256 = T::from(256.0).unwrap();

    // Face bubbles in face order, and the body bubble
    let face_verts = crate::reference_cell::faces(ReferenceCellType::Tetrahedron);
    let mut nf = [T::zero(); 4];
    let mut dnf = [[T::zero(); 3]; 4];
    for (f, verts) in face_verts.iter().enumerate() {
        let (a, b, c) = (verts[0], verts[1], verts[2]);
        nf[f] = tsn * l[a] * l[b] * l[c] - c108 * quartic;
        for d in 0..3 {
            dnf[f][d] = tsn
                * (dl[a][d] * l[b] * l[c] + l[a] * dl[b][d] * l[c] + l[a] * l[b] * dl[c][d])
                - c108 * dquartic[d];
        }
    }
    let nb = c256 * quartic;
    let dnb = [
        c256 * dquartic[0],
        c256 * dquartic[1],
        c256 * dquartic[2],
    ];

    // Faces containing each vertex, and the two faces flanking each edge
    let vertex_faces = [[0, 2, 3], [0, 1, 3], [1, 2, 3], [0, 1, 2]];
    let edge_faces = [[0, 3], [1, 3], [2, 3], [0, 2], [0, 1], [1, 2]];
    let edges = crate::reference_cell::edges(ReferenceCellType::Tetrahedron);

    let two = T::from(2.0).unwrap();
    let four = T::from(4.0).unwrap();
    let ninth = one / T::from(9.0).unwrap();
    let four_ninths = four * ninth;
    let quarter = T::from(0.25).unwrap();
    let eighth = T::from(0.125).unwrap();

    let mut weights = vec![T::zero(); 15];
    let mut gradients = vec![[T::zero(); 3]; 15];
    for i in 0..4 {
        weights[i] = l[i] * (two * l[i] - one)
            + ninth * (nf[vertex_faces[i][0]] + nf[vertex_faces[i][1]] + nf[vertex_faces[i][2]])
            + eighth * nb;
        for d in 0..3 {
            gradients[i][d] = dl[i][d] * (four * l[i] - one)
                + ninth
                    * (dnf[vertex_faces[i][0]][d]
                        + dnf[vertex_faces[i][1]][d]
                        + dnf[vertex_faces[i][2]][d])
                + eighth * dnb[d];
        }
    }
    for (e, everts) in edges.iter().enumerate() {
        let (u, v) = (everts[0], everts[1]);
        weights[4 + e] = four * l[u] * l[v]
            - four_ninths * (nf[edge_faces[e][0]] + nf[edge_faces[e][1]])
            - quarter * nb;
        for d in 0..3 {
            gradients[4 + e][d] = four * (dl[u][d] * l[v] + l[u] * dl[v][d])
                - four_ninths * (dnf[edge_faces[e][0]][d] + dnf[edge_faces[e][1]][d])
                - quarter * dnb[d];
        }
    }
    for f in 0..4 {
        weights[10 + f] = nf[f];
        gradients[10 + f] = dnf[f];
    }
    weights[14] = nb;
    gradients[14] = dnb;
    (weights, gradients)
}

/// Tensor-product index pair (triangle part, layer part) of each point of the
/// 21-point prism, where layer 0 is the bottom, 1 the top and 2 the middle.
const PRISM21_FACTORS: [(usize, usize); 21] = [
    (0, 0),
    (1, 0),
    (2, 0),
    (0, 1),
    (1, 1),
    (2, 1),
    (3, 0),
    (4, 0),
    (5, 0),
    (3, 1),
    (4, 1),
    (5, 1),
    (0, 2),
    (1, 2),
    (2, 2),
    (6, 0),
    (6, 1),
    (3, 2),
    (4, 2),
    (5, 2),
    (6, 2),
];

/// The 21-point prism basis: 7-point triangle times quadratic line.
fn twenty_one_point_prism_eval<T: RealScalar>(pc: &[T; 3]) -> (Vec<T>, Vec<[T; 3]>) {
    let (tw, tg) = seven_point_triangle_eval(pc);
    let (lv, ld) = lagrange_1d(2, pc[2]);
    // Lattice order is (0, 1/2, 1); layers are numbered (bottom, top, middle)
    let layer = [0, 2, 1];

    let mut weights = vec![T::zero(); 21];
    let mut gradients = vec![[T::zero(); 3]; 21];
    for (q, (a, c)) in PRISM21_FACTORS.iter().enumerate() {
        let k = layer[*c];
        weights[q] = tw[*a] * lv[k];
        gradients[q] = [
            tg[*a][0] * lv[k],
            tg[*a][1] * lv[k],
            tw[*a] * ld[k],
        ];
    }
    (weights, gradients)
}

/// Weights and gradients for the full lattice of the given cell and order.
fn standard_eval<T: RealScalar>(
    cell: ReferenceCellType,
    order: &[usize; 3],
    pc: &[T; 3],
) -> Result<(Vec<T>, Vec<[T; 3]>)> {
    let npoints = indexing::point_count(cell, order);
    match cell {
        ReferenceCellType::Interval => {
            let (v, d) = lagrange_1d(order[0], pc[0]);
            let mut weights = vec![T::zero(); npoints];
            let mut gradients = vec![[T::zero(); 3]; npoints];
            for i in 0..=order[0] {
                let q = indexing::interval_point_index(i, order[0])?;
                weights[q] = v[i];
                gradients[q][0] = d[i];
            }
            Ok((weights, gradients))
        }
        ReferenceCellType::Triangle => simplex_eval(order[0], 2, pc),
        ReferenceCellType::Tetrahedron => simplex_eval(order[0], 3, pc),
        ReferenceCellType::Quadrilateral => {
            let (vi, di) = lagrange_1d(order[0], pc[0]);
            let (vj, dj) = lagrange_1d(order[1], pc[1]);
            let mut weights = vec![T::zero(); npoints];
            let mut gradients = vec![[T::zero(); 3]; npoints];
            for j in 0..=order[1] {
                for i in 0..=order[0] {
                    let q = indexing::quad_point_index(i, j, &[order[0], order[1]])?;
                    weights[q] = vi[i] * vj[j];
                    gradients[q] = [di[i] * vj[j], vi[i] * dj[j], T::zero()];
                }
            }
            Ok((weights, gradients))
        }
        ReferenceCellType::Hexahedron => {
            let (vi, di) = lagrange_1d(order[0], pc[0]);
            let (vj, dj) = lagrange_1d(order[1], pc[1]);
            let (vk, dk) = lagrange_1d(order[2], pc[2]);
            let mut weights = vec![T::zero(); npoints];
            let mut gradients = vec![[T::zero(); 3]; npoints];
            for k in 0..=order[2] {
                for j in 0..=order[1] {
                    for i in 0..=order[0] {
                        let q = indexing::hex_point_index(i, j, k, order)?;
                        weights[q] = vi[i] * vj[j] * vk[k];
                        gradients[q] = [
                            di[i] * vj[j] * vk[k],
                            vi[i] * dj[j] * vk[k],
                            vi[i] * vj[j] * dk[k],
                        ];
                    }
                }
            }
            Ok((weights, gradients))
        }
        ReferenceCellType::Prism => {
            let n = order[0];
            let m = order[2];
            let nt = T::from(n).unwrap();
            let lambda = [T::one() - pc[0] - pc[1], pc[0], pc[1]];
            let dlambda = [[-T::one(), -T::one()], [T::one(), T::zero()], [T::zero(), T::one()]];
            let (vk, dk) = lagrange_1d(m, pc[2]);
            let mut weights = vec![T::zero(); npoints];
            let mut gradients = vec![[T::zero(); 3]; npoints];
            for k in 0..=m {
                for j in 0..=n {
                    for i in 0..=(n - j) {
                        let b = [n - i - j, i, j];
                        let mut p = [T::one(); 3];
                        let mut dp = [T::zero(); 3];
                        for c in 0..3 {
                            let (v, d) = grid_product(b[c], nt, lambda[c]);
                            p[c] = v;
                            dp[c] = d;
                        }
                        let tri = p[0] * p[1] * p[2];
                        let mut dtri = [T::zero(); 2];
                        for (d, g) in dtri.iter_mut().enumerate() {
                            for c in 0..3 {
                                let mut term = dp[c] * dlambda[c][d];
                                for (cc, v) in p.iter().enumerate() {
                                    if cc != c {
                                        term = term * *v;
                                    }
                                }
                                *g = *g + term;
                            }
                        }
                        let q = indexing::prism_point_index(i, j, k, n, m)?;
                        weights[q] = tri * vk[k];
                        gradients[q] =
                            [dtri[0] * vk[k], dtri[1] * vk[k], tri * dk[k]];
                    }
                }
            }
            Ok((weights, gradients))
        }
    }
}

/// Weights and parametric gradients of the interpolation basis at `pc`.
///
/// `npoints` selects between the full lattice of the given order and a
/// serendipity variant, exactly as in [`collocation::parametric_points`].
pub fn eval<T: RealScalar>(
    cell: ReferenceCellType,
    order: &[usize; 3],
    npoints: usize,
    pc: &[T; 3],
) -> Result<(Vec<T>, Vec<[T; 3]>)> {
    let standard = indexing::point_count(cell, order);
    if npoints == standard {
        standard_eval(cell, order, pc)
    } else if Some(npoints) == collocation::serendipity_point_count(cell) {
        Ok(match cell {
            ReferenceCellType::Triangle => seven_point_triangle_eval(pc),
            ReferenceCellType::Tetrahedron => fifteen_point_tetrahedron_eval(pc),
            ReferenceCellType::Prism => twenty_one_point_prism_eval(pc),
            _ => unreachable!(),
        })
    } else {
        Err(CellError::PointCountMismatch {
            expected: standard,
            found: npoints,
        })
    }
}

/// Interpolation weights at `pc`.
pub fn shape_functions<T: RealScalar>(
    cell: ReferenceCellType,
    order: &[usize; 3],
    npoints: usize,
    pc: &[T; 3],
) -> Result<Vec<T>> {
    Ok(eval(cell, order, npoints, pc)?.0)
}

/// Parametric gradients of the interpolation weights at `pc`.
pub fn shape_derivatives<T: RealScalar>(
    cell: ReferenceCellType,
    order: &[usize; 3],
    npoints: usize,
    pc: &[T; 3],
) -> Result<Vec<[T; 3]>> {
    Ok(eval(cell, order, npoints, pc)?.1)
}

/// Corner weights of the order-1 cell at `pc`.
pub fn linear_shape_functions<T: RealScalar>(
    cell: ReferenceCellType,
    pc: &[T; 3],
) -> Vec<T> {
    match standard_eval(cell, &[1, 1, 1], pc) {
        Ok((w, _)) => w,
        Err(_) => unreachable!(),
    }
}

/// Corner weight gradients of the order-1 cell at `pc`.
pub fn linear_shape_derivatives<T: RealScalar>(
    cell: ReferenceCellType,
    pc: &[T; 3],
) -> Vec<[T; 3]> {
    match standard_eval(cell, &[1, 1, 1], pc) {
        Ok((_, g)) => g,
        Err(_) => unreachable!(),
    }
}

/// Tabulate the interpolation basis at a batch of parametric points.
///
/// `points` has shape `[npts, 3]`; `data` has shape
/// `[1 + 3 * derivatives, basis size, npts]` with weights in row 0 followed
/// by the three parametric derivative rows when `derivatives` is 1.
pub fn tabulate<
    T: RealScalar,
    Array2: RandomAccessByRef<2, Item = T> + Shape<2>,
    Array3Mut: RandomAccessMut<3, Item = T> + Shape<3>,
>(
    cell: ReferenceCellType,
    order: &[usize; 3],
    npoints: usize,
    points: &Array2,
    derivatives: usize,
    data: &mut Array3Mut,
) -> Result<()> {
    if derivatives > 1 {
        return Err(CellError::Unsupported(
            "only first parametric derivatives are tabulated".to_string(),
        ));
    }
    assert_eq!(points.shape()[1], 3);
    assert_eq!(data.shape()[0], 1 + 3 * derivatives);
    assert_eq!(data.shape()[1], npoints);
    assert_eq!(data.shape()[2], points.shape()[0]);

    for p in 0..points.shape()[0] {
        let pc = [
            *points.get([p, 0]).ok_or(CellError::IndexOutOfRange {
                index: p,
                npoints: points.shape()[0],
            })?,
            *points.get([p, 1]).ok_or(CellError::IndexOutOfRange {
                index: p,
                npoints: points.shape()[0],
            })?,
            *points.get([p, 2]).ok_or(CellError::IndexOutOfRange {
                index: p,
                npoints: points.shape()[0],
            })?,
        ];
        let (weights, gradients) = eval(cell, order, npoints, &pc)?;
        for (b, w) in weights.iter().enumerate() {
            if let Some(entry) = data.get_mut([0, b, p]) {
                *entry = *w;
            }
        }
        if derivatives == 1 {
            for (b, g) in gradients.iter().enumerate() {
                for (d, gd) in g.iter().enumerate() {
                    if let Some(entry) = data.get_mut([1 + d, b, p]) {
                        *entry = *gd;
                    }
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_relative_eq;
    use paste::paste;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use rlst::{rlst_dynamic_array2, rlst_dynamic_array3, RawAccess};

    fn random_pc(cell: ReferenceCellType, rng: &mut StdRng) -> [f64; 3] {
        loop {
            let pc = [rng.gen::<f64>(), rng.gen::<f64>(), rng.gen::<f64>()];
            let inside = match cell {
                ReferenceCellType::Interval => true,
                ReferenceCellType::Triangle => pc[0] + pc[1] <= 1.0,
                ReferenceCellType::Quadrilateral => true,
                ReferenceCellType::Tetrahedron => pc[0] + pc[1] + pc[2] <= 1.0,
                ReferenceCellType::Hexahedron => true,
                ReferenceCellType::Prism => pc[0] + pc[1] <= 1.0,
            };
            if inside {
                let d = crate::reference_cell::dim(cell);
                let mut pc = pc;
                pc[d..].fill(0.0);
                return pc;
            }
        }
    }

    macro_rules! test_basis {
        ($($cell:ident, $order:expr),+) => {
        $(
            paste! {

                #[test]
                fn [<test_ $cell:lower _nodal_property>]() {
                    let cell = ReferenceCellType::[<$cell>];
                    let order = $order;
                    let npoints = indexing::point_count(cell, &order);
                    let colloc =
                        collocation::standard_points::<f64>(cell, &order).unwrap();
                    for (q, pt) in colloc.iter().enumerate() {
                        let w = shape_functions(cell, &order, npoints, pt).unwrap();
                        for (b, wb) in w.iter().enumerate() {
                            let expected = if b == q { 1.0 } else { 0.0 };
                            assert_relative_eq!(*wb, expected, epsilon = 1e-10);
                        }
                    }
                }

                #[test]
                fn [<test_ $cell:lower _partition_of_unity>]() {
                    let cell = ReferenceCellType::[<$cell>];
                    let order = $order;
                    let npoints = indexing::point_count(cell, &order);
                    let mut rng = StdRng::seed_from_u64(0);
                    for _ in 0..20 {
                        let pc = random_pc(cell, &mut rng);
                        let (w, g) = eval(cell, &order, npoints, &pc).unwrap();
                        assert_relative_eq!(
                            w.iter().sum::<f64>(), 1.0, epsilon = 1e-10);
                        for d in 0..3 {
                            assert_relative_eq!(
                                g.iter().map(|gg| gg[d]).sum::<f64>(),
                                0.0, epsilon = 1e-9);
                        }
                    }
                }

                #[test]
                fn [<test_ $cell:lower _gradients_match_differences>]() {
                    let cell = ReferenceCellType::[<$cell>];
                    let order = $order;
                    let npoints = indexing::point_count(cell, &order);
                    let mut rng = StdRng::seed_from_u64(1);
                    let h = 1e-6;
                    for _ in 0..5 {
                        let pc = random_pc(cell, &mut rng);
                        let (_, g) = eval(cell, &order, npoints, &pc).unwrap();
                        for d in 0..crate::reference_cell::dim(cell) {
                            let mut up = pc;
                            up[d] += h;
                            let mut down = pc;
                            down[d] -= h;
                            let wu = shape_functions(cell, &order, npoints, &up).unwrap();
                            let wd = shape_functions(cell, &order, npoints, &down).unwrap();
                            for b in 0..npoints {
                                assert_relative_eq!(
                                    g[b][d],
                                    (wu[b] - wd[b]) / (2.0 * h),
                                    epsilon = 1e-4,
                                    max_relative = 1e-4
                                );
                            }
                        }
                    }
                }

            }
        )*
        };
    }

    test_basis!(
        Interval,
        [4, 0, 0],
        Triangle,
        [3, 3, 0],
        Quadrilateral,
        [2, 3, 0],
        Tetrahedron,
        [3, 3, 3],
        Hexahedron,
        [2, 2, 3],
        Prism,
        [3, 3, 2]
    );

    macro_rules! test_serendipity_basis {
        ($($cell:ident),+) => {
        $(
            paste! {

                #[test]
                fn [<test_serendipity_ $cell:lower _basis>]() {
                    let cell = ReferenceCellType::[<$cell>];
                    let npoints =
                        collocation::serendipity_point_count(cell).unwrap();
                    let colloc =
                        collocation::serendipity_points::<f64>(cell).unwrap();
                    for (q, pt) in colloc.iter().enumerate() {
                        let w = shape_functions(
                            cell, &[2, 2, 2], npoints, pt).unwrap();
                        for (b, wb) in w.iter().enumerate() {
                            let expected = if b == q { 1.0 } else { 0.0 };
                            assert_relative_eq!(*wb, expected, epsilon = 1e-12);
                        }
                    }
                    let mut rng = StdRng::seed_from_u64(2);
                    for _ in 0..20 {
                        let pc = random_pc(cell, &mut rng);
                        let (w, g) = eval(cell, &[2, 2, 2], npoints, &pc).unwrap();
                        assert_relative_eq!(
                            w.iter().sum::<f64>(), 1.0, epsilon = 1e-12);
                        for d in 0..3 {
                            assert_relative_eq!(
                                g.iter().map(|gg| gg[d]).sum::<f64>(),
                                0.0, epsilon = 1e-11);
                        }
                    }
                }

            }
        )*
        };
    }

    test_serendipity_basis!(Triangle, Tetrahedron, Prism);

    #[test]
    fn test_hex_axis_tables() {
        let verts = crate::reference_cell::vertices::<f64>(ReferenceCellType::Hexahedron);
        for (e, edge) in crate::reference_cell::edges(ReferenceCellType::Hexahedron)
            .iter()
            .enumerate()
        {
            // The edge axis is the one coordinate that varies along it
            for d in 0..3 {
                let varies = verts[edge[0]][d] != verts[edge[1]][d];
                assert_eq!(varies, d == HEX_EDGE_AXIS[e]);
            }
        }
        for (f, face) in crate::reference_cell::faces(ReferenceCellType::Hexahedron)
            .iter()
            .enumerate()
        {
            let (axis, value) = HEX_FACE_AXIS[f];
            for v in face {
                assert_relative_eq!(verts[*v][axis], value as f64);
            }
        }
    }

    #[test]
    fn test_linear_shape_functions() {
        // Corner weights reproduce linear functions exactly
        let pc = [0.3, 0.2, 0.4];
        let w = linear_shape_functions(ReferenceCellType::Hexahedron, &pc);
        let v = crate::reference_cell::vertices::<f64>(ReferenceCellType::Hexahedron);
        for d in 0..3 {
            let interp = w.iter().zip(v.iter()).map(|(wi, vi)| wi * vi[d]).sum::<f64>();
            assert_relative_eq!(interp, pc[d], epsilon = 1e-14);
        }
    }

    #[test]
    fn test_tabulate_layout() {
        let cell = ReferenceCellType::Triangle;
        let order = [2, 2, 0];
        let npoints = 6;
        let mut points = rlst_dynamic_array2!(f64, [2, 3]);
        *points.get_mut([0, 0]).unwrap() = 0.2;
        *points.get_mut([0, 1]).unwrap() = 0.3;
        *points.get_mut([1, 0]).unwrap() = 0.5;
        *points.get_mut([1, 1]).unwrap() = 0.1;
        let mut data = rlst_dynamic_array3!(f64, [4, 6, 2]);
        tabulate(cell, &order, npoints, &points, 1, &mut data).unwrap();

        for p in 0..2 {
            let pc = [
                *points.get([p, 0]).unwrap(),
                *points.get([p, 1]).unwrap(),
                0.0,
            ];
            let (w, g) = eval(cell, &order, npoints, &pc).unwrap();
            for b in 0..6 {
                assert_relative_eq!(*data.get([0, b, p]).unwrap(), w[b]);
                assert_relative_eq!(*data.get([1, b, p]).unwrap(), g[b][0]);
                assert_relative_eq!(*data.get([2, b, p]).unwrap(), g[b][1]);
            }
        }
        assert!(!data.data().is_empty());
    }
}
