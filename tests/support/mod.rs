//! Test support library
//! Provides various helper functions & utilities for tests.
#![allow(dead_code)]

use nalgebra::{Point3, Rotation3, Vector3};
use polycsg::{
    float_types::Real,
    mesh::{polygon::Polygon, shapes::cuboid, vertex::Vertex},
};

/// Axis-aligned box from `min` to `max` as six outward-facing quads.
pub fn cube(min: [Real; 3], max: [Real; 3]) -> Vec<Polygon<()>> {
    cuboid(
        Point3::new(min[0], min[1], min[2]),
        Point3::new(max[0], max[1], max[2]),
        None,
    )
}

/// Box of the given half extents, rotated by `angle` about +Z and moved to
/// `center`.
pub fn rotated_box(half: [Real; 3], center: [Real; 3], angle: Real) -> Vec<Polygon<()>> {
    let rotation = Rotation3::from_axis_angle(&Vector3::z_axis(), angle);
    let offset = Vector3::new(center[0], center[1], center[2]);
    cube([-half[0], -half[1], -half[2]], half)
        .into_iter()
        .map(|p| {
            let vertices = p
                .vertices
                .iter()
                .map(|v| {
                    let mut v = *v;
                    v.pos = rotation * v.pos + offset;
                    v.normal = rotation * v.normal;
                    v
                })
                .collect();
            Polygon::new(vertices, None)
        })
        .collect()
}

/// Returns the approximate bounding box `[min_x, min_y, min_z, max_x, max_y, max_z]`
/// for a set of polygons.
pub fn bounding_box<S: Clone>(polygons: &[Polygon<S>]) -> [Real; 6] {
    let mut bb = [Real::MAX, Real::MAX, Real::MAX, Real::MIN, Real::MIN, Real::MIN];
    for v in polygons.iter().flat_map(|p| p.vertices.iter()) {
        for axis in 0..3 {
            bb[axis] = bb[axis].min(v.pos[axis]);
            bb[axis + 3] = bb[axis + 3].max(v.pos[axis]);
        }
    }
    bb
}

/// Enclosed volume of a closed, outward-facing mesh (divergence theorem over
/// a triangle fan of every polygon).
pub fn volume<S: Clone>(polygons: &[Polygon<S>]) -> Real {
    polygons
        .iter()
        .map(|p| {
            let p0 = p.vertices[0].pos.coords;
            p.vertices
                .windows(2)
                .skip(1)
                .map(|w| p0.dot(&w[0].pos.coords.cross(&w[1].pos.coords)))
                .sum::<Real>()
        })
        .sum::<Real>()
        / 6.0
}

/// Total surface area.
pub fn area<S: Clone>(polygons: &[Polygon<S>]) -> Real {
    polygons.iter().map(|p| p.area()).sum()
}

/// Quick helper to compare floating-point results with an acceptable tolerance.
pub fn approx_eq(a: Real, b: Real, eps: Real) -> bool {
    (a - b).abs() < eps
}

/// Helper to make a simple Polygon in 3D with given vertices.
pub fn make_polygon_3d(points: &[[Real; 3]]) -> Polygon<()> {
    let verts = points
        .iter()
        .map(|p| Vertex::new(Point3::new(p[0], p[1], p[2]), Vector3::z()))
        .collect();
    Polygon::new(verts, None)
}

/// `true` if `ring` equals `expected` up to a cyclic rotation, comparing
/// positions within `eps`.
pub fn same_cycle(ring: &[Point3<Real>], expected: &[Point3<Real>], eps: Real) -> bool {
    ring.len() == expected.len()
        && (0..ring.len()).any(|shift| {
            expected
                .iter()
                .enumerate()
                .all(|(i, e)| (ring[(i + shift) % ring.len()] - e).norm() <= eps)
        })
}

/// Every polygon's normal agrees with its winding.
pub fn windings_match_planes<S: Clone>(polygons: &[Polygon<S>]) -> bool {
    polygons.iter().all(|p| {
        let v = &p.vertices;
        let newell = (0..v.len()).fold(Vector3::zeros(), |acc: Vector3<Real>, i| {
            acc + v[i].pos.coords.cross(&v[(i + 1) % v.len()].pos.coords)
        });
        newell.dot(&p.plane.normal()) > 0.0
    })
}
