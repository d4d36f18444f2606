//! Block-model primitives
//!
//! Faces get world-aligned texture coordinates: the UV of a vertex is its
//! position projected onto the two axes spanning the face. Fragments of
//! neighbouring boxes therefore carry matching UVs along shared edges and
//! recombine cleanly after a boolean operation.

use crate::float_types::Real;
use crate::mesh::polygon::Polygon;
use crate::mesh::vertex::Vertex;
use nalgebra::{Point3, Vector2, Vector3};

/// World-aligned UV for a point on a face with the given normal.
pub fn world_uv(pos: &Point3<Real>, normal: &Vector3<Real>) -> Vector2<Real> {
    let n = normal.abs();
    if n.x >= n.y && n.x >= n.z {
        Vector2::new(pos.z, pos.y)
    } else if n.y >= n.z {
        Vector2::new(pos.x, pos.z)
    } else {
        Vector2::new(pos.x, pos.y)
    }
}

/// A single planar face through `corners`, wound counter-clockwise seen
/// from the front. Every vertex gets the face normal and a world-aligned UV.
///
/// Returns `None` if the corners are degenerate.
pub fn quad<S: Clone>(corners: [Point3<Real>; 4], metadata: Option<S>) -> Option<Polygon<S>> {
    let mut polygon = Polygon::try_new(
        corners
            .iter()
            .map(|&p| Vertex::new(p, Vector3::zeros()))
            .collect(),
        metadata,
    )?;
    let normal = polygon.plane.normal;
    for v in &mut polygon.vertices {
        v.normal = normal;
        v.uv = world_uv(&v.pos, &normal);
    }
    Some(polygon)
}

/// An axis-aligned box spanning `min..max` as six outward-facing quads,
/// ordered -X, +X, -Y, +Y, -Z, +Z.
///
/// Returns an empty list if the box has no volume.
pub fn cuboid<S: Clone>(min: Point3<Real>, max: Point3<Real>, metadata: Option<S>) -> Vec<Polygon<S>> {
    let (x0, y0, z0) = (min.x.min(max.x), min.y.min(max.y), min.z.min(max.z));
    let (x1, y1, z1) = (min.x.max(max.x), min.y.max(max.y), min.z.max(max.z));
    let p = Point3::new;

    let faces = [
        [p(x0, y0, z0), p(x0, y0, z1), p(x0, y1, z1), p(x0, y1, z0)],
        [p(x1, y0, z0), p(x1, y1, z0), p(x1, y1, z1), p(x1, y0, z1)],
        [p(x0, y0, z0), p(x1, y0, z0), p(x1, y0, z1), p(x0, y0, z1)],
        [p(x0, y1, z0), p(x0, y1, z1), p(x1, y1, z1), p(x1, y1, z0)],
        [p(x0, y0, z0), p(x0, y1, z0), p(x1, y1, z0), p(x1, y0, z0)],
        [p(x0, y0, z1), p(x1, y0, z1), p(x1, y1, z1), p(x0, y1, z1)],
    ];

    let polygons: Vec<Polygon<S>> = faces
        .into_iter()
        .filter_map(|corners| quad(corners, metadata.clone()))
        .collect();

    if polygons.len() == faces.len() {
        polygons
    } else {
        Vec::new()
    }
}

/// A unit block at integer grid position `(x, y, z)`.
pub fn block<S: Clone>(x: i32, y: i32, z: i32, metadata: Option<S>) -> Vec<Polygon<S>> {
    let min = Point3::new(x as Real, y as Real, z as Real);
    cuboid(min, min + Vector3::repeat(1.0), metadata)
}
