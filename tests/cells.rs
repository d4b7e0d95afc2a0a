//! End-to-end tests of the higher-order cell family.

use approx::assert_relative_eq;
use hocell::cells::{
    HigherOrderCell, HigherOrderCurve, HigherOrderHexahedron, HigherOrderTetrahedron,
    HigherOrderTriangle,
};
use hocell::collocation;
use hocell::indexing;
use hocell::types::{
    AttributeArray, Attributes, PositionStatus, ReferenceCellType, TessellationOutput,
    DEGREES_ATTRIBUTE_NAME,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn lattice_cell<C: HigherOrderCell<f64> + Default>(
    cell: ReferenceCellType,
    order: [usize; 3],
) -> C {
    let mut c = C::default();
    c.set_order(order).unwrap();
    let points = collocation::standard_points::<f64>(cell, &order).unwrap();
    let ids = (0..points.len()).collect::<Vec<_>>();
    c.set_points(&points, &ids).unwrap();
    c
}

#[test]
fn test_quadratic_triangle_decomposition() {
    // The corner sub-triangle at the origin uses points 0, 3 and 5
    let mut tri: HigherOrderTriangle<f64> =
        lattice_cell(ReferenceCellType::Triangle, [2, 2, 0]);
    assert_eq!(tri.num_sub_cells(), 4);
    let t = tri.triangulate().unwrap();
    assert_eq!(t.point_ids[..3], [0, 3, 5]);
}

#[test]
fn test_hexahedron_body_diagonal_index() {
    assert_eq!(
        indexing::hex_point_index(1, 1, 1, &[1, 1, 1]).unwrap(),
        6
    );
}

#[test]
fn test_quadratic_curve_intervals() {
    let mut curve: HigherOrderCurve<f64> = lattice_cell(ReferenceCellType::Interval, [2, 0, 0]);
    let t = curve.triangulate().unwrap();
    assert_eq!(t.verts_per_cell, 2);
    assert_relative_eq!(t.points[0][0], 0.0);
    assert_relative_eq!(t.points[1][0], 0.5);
    assert_relative_eq!(t.points[2][0], 0.5);
    assert_relative_eq!(t.points[3][0], 1.0);
}

#[test]
fn test_evaluate_position_at_first_control_point() {
    let mut tet: HigherOrderTetrahedron<f64> =
        lattice_cell(ReferenceCellType::Tetrahedron, [3, 3, 3]);
    let x = tet.points()[0];
    let expected = tet.parametric_coords()[0];
    let p = tet.evaluate_position(&x).unwrap();
    assert_eq!(p.status, PositionStatus::Inside);
    assert_relative_eq!(p.dist2, 0.0, epsilon = 1e-12);
    for d in 0..3 {
        assert_relative_eq!(p.pcoords[d], expected[d], epsilon = 1e-10);
    }
}

#[test]
fn test_order_idempotence() {
    let mut tri: HigherOrderTriangle<f64> = lattice_cell(ReferenceCellType::Triangle, [4, 4, 0]);
    let generation = tri.generation();
    for _ in 0..3 {
        tri.set_order([4, 4, 0]).unwrap();
    }
    assert_eq!(tri.generation(), generation);
    assert_eq!(tri.order(), [4, 4, 0]);
}

#[test]
fn test_random_location_round_trip() {
    // Points generated inside the cell come back Inside with matching
    // parametric coordinates
    let mut rng = StdRng::seed_from_u64(0);
    let mut hex: HigherOrderHexahedron<f64> =
        lattice_cell(ReferenceCellType::Hexahedron, [2, 2, 2]);
    for _ in 0..20 {
        let pc = [rng.gen::<f64>(), rng.gen::<f64>(), rng.gen::<f64>()];
        let (x, _) = hex.evaluate_location(&pc).unwrap();
        let p = hex.evaluate_position(&x).unwrap();
        assert_eq!(p.status, PositionStatus::Inside);
        for d in 0..3 {
            assert_relative_eq!(p.pcoords[d], pc[d], epsilon = 1e-8);
        }
    }
}

#[test]
fn test_curved_geometry() {
    // A quadratic curve bent into a parabola still reproduces its
    // control points
    let mut curve = HigherOrderCurve::<f64>::new();
    curve
        .set_points(
            &[[0.0, 0.0, 0.0], [2.0, 0.0, 0.0], [1.0, 1.0, 0.0]],
            &[0, 1, 2],
        )
        .unwrap();
    let (x, _) = curve.evaluate_location(&[0.5, 0.0, 0.0]).unwrap();
    assert_relative_eq!(x[0], 1.0, epsilon = 1e-12);
    assert_relative_eq!(x[1], 1.0, epsilon = 1e-12);
    let p = curve.evaluate_position(&[1.0, 1.0, 0.0]).unwrap();
    assert_eq!(p.status, PositionStatus::Inside);
    assert_relative_eq!(p.dist2, 0.0, epsilon = 1e-12);
}

#[test]
fn test_contour_interpolates_point_data() {
    // A linear attribute interpolates exactly at generated contour points
    let mut tet: HigherOrderTetrahedron<f64> =
        lattice_cell(ReferenceCellType::Tetrahedron, [2, 2, 2]);
    let colloc = tet.parametric_coords().to_vec();
    let scalars = colloc.iter().map(|p| p[2]).collect::<Vec<_>>();

    let mut point_data = Attributes::<f64>::new();
    let mut arr = AttributeArray::new("height", 1);
    for p in &colloc {
        arr.push_tuple(&[p[2]]);
    }
    point_data.arrays.push(arr);

    let mut cell_data = Attributes::<f64>::new();
    let mut material = AttributeArray::new("material", 1);
    material.push_tuple(&[7.0]);
    cell_data.arrays.push(material);

    let mut out = TessellationOutput::new(&point_data, &cell_data);
    tet.contour(0.25, &scalars, &point_data, &cell_data, 0, &mut out)
        .unwrap();

    assert!(!out.polys.is_empty());
    for (i, x) in out.points.iter().enumerate() {
        assert_relative_eq!(x[2], 0.25, epsilon = 1e-12);
        assert_relative_eq!(out.point_data.arrays[0].tuple(i)[0], 0.25, epsilon = 1e-12);
    }
    // Cell data is copied once per emitted fragment
    assert_eq!(out.cell_data.arrays[0].len(), out.polys.len());
    assert_relative_eq!(out.cell_data.arrays[0].tuple(0)[0], 7.0);
}

#[test]
fn test_order_from_cell_data_round_trip() {
    let mut cell_data = Attributes::<f64>::new();
    let mut degrees = AttributeArray::new(DEGREES_ATTRIBUTE_NAME, 3);
    degrees.push_tuple(&[2.0, 2.0, 2.0]);
    cell_data.arrays.push(degrees);

    let mut hex = HigherOrderHexahedron::<f64>::new();
    hex.set_order_from_cell_data(&cell_data, 0).unwrap();
    let points =
        collocation::standard_points::<f64>(ReferenceCellType::Hexahedron, &[2, 2, 2]).unwrap();
    let ids = (0..points.len()).collect::<Vec<_>>();
    hex.set_points(&points, &ids).unwrap();
    assert_eq!(hex.num_points(), 27);

    // A mismatched declared order is a hard error
    let mut other = HigherOrderHexahedron::<f64>::new();
    other.set_order([3, 3, 3]).unwrap();
    assert!(other.set_points(&points, &ids).is_err());
}
