//! Planes, point classification and polygon splitting
//!
//! A [`Plane`] is stored as a unit normal `n` and offset `w` so that the
//! signed distance of a point `p` is `n·p - w`. Positive distances are in
//! *front* of the plane, which is the outside of the solid the plane bounds.

use crate::float_types::{Real, tolerance};
use crate::mesh::polygon::Polygon;
use crate::mesh::vertex::Vertex;
use nalgebra::{Point3, Vector3};

// Classification bits. A polygon's type is the OR of its vertex types,
// so FRONT | BACK == SPANNING.
pub const COPLANAR: i8 = 0;
pub const FRONT: i8 = 1;
pub const BACK: i8 = 2;
pub const SPANNING: i8 = 3;

/// A plane in 3D space: `normal · p = w`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    /// Unit normal, pointing out of the solid
    pub normal: Vector3<Real>,
    /// Distance from the origin along `normal`
    pub w: Real,
}

/// Outcome of splitting one polygon against a plane.
///
/// Non-spanning polygons are handed back untouched; spanning polygons yield
/// at most one fragment per side. A fragment is `None` when it would have
/// been degenerate.
#[derive(Debug, Clone)]
pub enum Split<S: Clone> {
    CoplanarFront(Polygon<S>),
    CoplanarBack(Polygon<S>),
    Front(Polygon<S>),
    Back(Polygon<S>),
    Spanning {
        front: Option<Polygon<S>>,
        back: Option<Polygon<S>>,
    },
}

impl Plane {
    /// Create a plane from a (not necessarily unit) normal and offset.
    /// Both are rescaled so the stored normal has unit length.
    pub fn from_normal(normal: Vector3<Real>, w: Real) -> Self {
        let len = normal.norm();
        if len < Real::EPSILON {
            return Plane {
                normal: Vector3::z(),
                w: 0.0,
            };
        }
        Plane {
            normal: normal / len,
            w: w / len,
        }
    }

    /// Create a plane from three points.
    /// The normal direction follows the right-hand rule: (p2-p1) × (p3-p1)
    pub fn from_points(p1: Point3<Real>, p2: Point3<Real>, p3: Point3<Real>) -> Option<Self> {
        let normal = (p2 - p1).cross(&(p3 - p1));
        if normal.norm_squared() < Real::EPSILON * Real::EPSILON {
            return None;
        }
        let normal = normal.normalize();
        Some(Plane {
            normal,
            w: normal.dot(&p1.coords),
        })
    }

    /// Fit a plane to a ring of vertices with Newell's method.
    ///
    /// Returns the plane together with the ring's area, or `None` when the
    /// ring is too small or has no area at all. The normal agrees with the
    /// winding order (counter-clockwise seen from the front).
    pub fn from_vertices(vertices: &[Vertex]) -> Option<(Self, Real)> {
        if vertices.len() < 3 {
            return None;
        }
        let origin = vertices[0].pos;
        let newell = vertices
            .iter()
            .zip(vertices.iter().cycle().skip(1))
            .fold(Vector3::zeros(), |acc, (curr, next)| {
                acc + (curr.pos - origin).cross(&(next.pos - origin))
            });

        let twice_area = newell.norm();
        if twice_area <= Real::EPSILON {
            return None;
        }
        let normal = newell / twice_area;
        let w = vertices
            .iter()
            .map(|v| normal.dot(&v.pos.coords))
            .sum::<Real>()
            / vertices.len() as Real;

        Some((Plane { normal, w }, twice_area * 0.5))
    }

    pub const fn normal(&self) -> Vector3<Real> {
        self.normal
    }

    pub const fn offset(&self) -> Real {
        self.w
    }

    /// Flip the plane (reverse normal and offset). Applying it twice is exact.
    pub fn flip(&mut self) {
        self.normal = -self.normal;
        self.w = -self.w;
    }

    pub fn flipped(&self) -> Self {
        Plane {
            normal: -self.normal,
            w: -self.w,
        }
    }

    #[inline]
    pub fn signed_distance(&self, point: &Point3<Real>) -> Real {
        self.normal.dot(&point.coords) - self.w
    }

    /// Classify a point as FRONT, BACK or COPLANAR (within [`tolerance`]).
    #[inline]
    pub fn orient_point(&self, point: &Point3<Real>) -> i8 {
        let distance = self.signed_distance(point);
        let eps = tolerance();
        if distance > eps {
            FRONT
        } else if distance < -eps {
            BACK
        } else {
            COPLANAR
        }
    }

    /// Classify a polygon; the result is the OR of its vertex classifications.
    pub fn classify_polygon<S: Clone>(&self, polygon: &Polygon<S>) -> i8 {
        polygon
            .vertices
            .iter()
            .fold(COPLANAR, |acc, v| acc | self.orient_point(&v.pos))
    }

    /// `true` if both planes describe the same oriented plane within tolerance.
    pub fn coplanar_with(&self, other: &Plane) -> bool {
        let eps = tolerance();
        self.normal.dot(&other.normal) >= 1.0 - eps && (self.w - other.w).abs() <= eps
    }

    /// Split `polygon` by this plane.
    ///
    /// Coplanar polygons are resolved to front or back by comparing normals.
    /// Spanning polygons are cut along the plane: every edge that crosses it
    /// gets a new vertex whose attributes are interpolated from the edge's
    /// endpoints, and that vertex is shared by both fragments.
    pub fn split_polygon<S: Clone>(&self, polygon: Polygon<S>) -> Split<S> {
        let types: Vec<i8> = polygon
            .vertices
            .iter()
            .map(|v| self.orient_point(&v.pos))
            .collect();
        let polygon_type = types.iter().fold(COPLANAR, |acc, &t| acc | t);

        match polygon_type {
            COPLANAR => {
                if self.normal.dot(&polygon.plane.normal) > 0.0 {
                    Split::CoplanarFront(polygon)
                } else {
                    Split::CoplanarBack(polygon)
                }
            },
            FRONT => Split::Front(polygon),
            BACK => Split::Back(polygon),
            _ => {
                let n = polygon.vertices.len();
                let mut split_front = Vec::with_capacity(n + 1);
                let mut split_back = Vec::with_capacity(n + 1);

                for i in 0..n {
                    let j = (i + 1) % n;
                    let (type_i, type_j) = (types[i], types[j]);
                    let vertex_i = &polygon.vertices[i];
                    let vertex_j = &polygon.vertices[j];

                    if type_i != BACK {
                        split_front.push(*vertex_i);
                    }
                    if type_i != FRONT {
                        split_back.push(*vertex_i);
                    }

                    if (type_i | type_j) == SPANNING {
                        let denom = self.normal.dot(&(vertex_j.pos - vertex_i.pos));
                        if denom.abs() > Real::EPSILON {
                            let t = (self.w - self.normal.dot(&vertex_i.pos.coords)) / denom;
                            let vertex_new = vertex_i.interpolate(vertex_j, t);
                            split_front.push(vertex_new);
                            split_back.push(vertex_new);
                        }
                    }
                }

                Split::Spanning {
                    front: polygon.fragment(split_front),
                    back: polygon.fragment(split_back),
                }
            },
        }
    }
}
