//! Struct and functions for working with planar `Polygon`s without holes

use crate::errors::ValidationError;
use crate::float_types::{
    Real,
    parry3d::bounding_volume::Aabb,
    tolerance,
};
use crate::mesh::plane::Plane;
use crate::mesh::vertex::Vertex;
use nalgebra::{Point3, Vector3};
use std::sync::OnceLock;

/// Which input of a boolean operation a polygon was taken from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operand {
    A,
    B,
}

/// A polygon, defined by a ring of vertices in counter-clockwise order
/// (seen from the front / outside).
///
/// Polygons are values: splitting produces new polygons, and a polygon is
/// never reshaped in place once it has been appended to a stream. The only
/// in-place change is [`Polygon::flip`], which is its own inverse.
#[derive(Debug, Clone)]
pub struct Polygon<S: Clone> {
    /// Vertices defining the Polygon's shape
    pub vertices: Vec<Vertex>,

    /// The plane on which this Polygon lies, cached from `vertices`
    pub plane: Plane,

    /// Lazily‑computed axis‑aligned bounding box of the Polygon
    pub bounding_box: OnceLock<Aabb>,

    /// Material, texture or render layer; must match for fragments to recombine
    pub metadata: Option<S>,

    /// Input mesh this polygon originated from, inherited by its fragments
    pub source: Option<Operand>,
}

impl<S: Clone + PartialEq> PartialEq for Polygon<S> {
    fn eq(&self, other: &Self) -> bool {
        self.vertices == other.vertices
            && self.plane == other.plane
            && self.metadata == other.metadata
            && self.source == other.source
    }
}

impl<S: Clone> Polygon<S> {
    /// Create a polygon from vertices; the plane is fitted to the ring.
    ///
    /// # Panics
    /// Panics if fewer than 3 vertices are supplied. Use [`Polygon::try_new`]
    /// for input that may be degenerate.
    pub fn new(vertices: Vec<Vertex>, metadata: Option<S>) -> Self {
        assert!(vertices.len() >= 3, "degenerate polygon");

        let plane = match Plane::from_vertices(&vertices) {
            Some((plane, _)) => plane,
            None => Plane::from_points(vertices[0].pos, vertices[1].pos, vertices[2].pos)
                .unwrap_or_else(|| Plane::from_normal(Vector3::z(), vertices[0].pos.z)),
        };

        Polygon {
            vertices,
            plane,
            bounding_box: OnceLock::new(),
            metadata,
            source: None,
        }
    }

    /// Create a polygon, or `None` if the ring has fewer than 3 distinct
    /// vertices or encloses no area within the tolerance.
    pub fn try_new(vertices: Vec<Vertex>, metadata: Option<S>) -> Option<Self> {
        Self::build(vertices, metadata, None)
    }

    /// Builds a fragment of `self` from a new vertex ring: metadata and
    /// source are inherited, the plane is refitted, and degenerate rings
    /// are discarded.
    pub(crate) fn fragment(&self, vertices: Vec<Vertex>) -> Option<Self> {
        Self::build(vertices, self.metadata.clone(), self.source)
    }

    fn build(mut vertices: Vec<Vertex>, metadata: Option<S>, source: Option<Operand>) -> Option<Self> {
        let eps = tolerance();
        vertices.dedup_by(|b, a| a.coincident(b, eps));
        while vertices.len() > 1 && vertices[0].coincident(&vertices[vertices.len() - 1], eps) {
            vertices.pop();
        }
        if vertices.len() < 3 {
            return None;
        }

        let (plane, area) = Plane::from_vertices(&vertices)?;
        if area <= eps * eps {
            return None;
        }

        Some(Polygon {
            vertices,
            plane,
            bounding_box: OnceLock::new(),
            metadata,
            source,
        })
    }

    /// Tag this polygon with the input mesh it belongs to.
    pub fn with_source(mut self, source: Operand) -> Self {
        self.source = Some(source);
        self
    }

    /// Reverse winding order, flip vertex normals and flip the plane.
    /// Applying it twice restores the polygon exactly.
    pub fn flip(&mut self) {
        self.vertices.reverse();
        for v in &mut self.vertices {
            v.flip();
        }
        self.plane.flip();
    }

    /// Return an iterator over paired vertices each forming an edge of the polygon
    pub fn edges(&self) -> impl Iterator<Item = (&Vertex, &Vertex)> {
        self.vertices.iter().zip(self.vertices.iter().cycle().skip(1))
    }

    /// Returns a [`parry3d::bounding_volume::Aabb`] containing every vertex.
    pub fn bounding_box(&self) -> Aabb {
        *self.bounding_box.get_or_init(|| {
            let mut aabb = Aabb::new_invalid();
            for v in &self.vertices {
                aabb.take_point(v.pos);
            }
            aabb
        })
    }

    /// Area enclosed by the ring.
    pub fn area(&self) -> Real {
        Plane::from_vertices(&self.vertices)
            .map(|(_, area)| area)
            .unwrap_or(0.0)
    }

    /// Vertex positions, in winding order.
    pub fn positions(&self) -> impl Iterator<Item = Point3<Real>> + '_ {
        self.vertices.iter().map(|v| v.pos)
    }

    /// Check a caller-supplied polygon before handing it to a boolean operation.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let eps = tolerance();
        if self.vertices.len() < 3 {
            return Err(ValidationError::TooFewPoints(self.vertices.len()));
        }
        if let Some(v) = self
            .vertices
            .iter()
            .find(|v| v.pos.coords.iter().any(|c| !c.is_finite()))
        {
            return Err(ValidationError::InvalidCoordinate(v.pos));
        }
        if let Some((a, _)) = self.edges().find(|(a, b)| a.coincident(b, eps)) {
            return Err(ValidationError::RepeatedPoint(a.pos));
        }
        if self.area() <= eps * eps {
            return Err(ValidationError::ZeroArea);
        }
        for v in &self.vertices {
            let distance = self.plane.signed_distance(&v.pos);
            if distance.abs() > eps {
                return Err(ValidationError::NonPlanar {
                    point: v.pos,
                    distance,
                });
            }
        }
        Ok(())
    }
}
