//! Struct and functions for working with `Vertex`s from which `Polygon`s are composed.

use crate::float_types::{ATTRIBUTE_TOLERANCE, Real};
use nalgebra::{Point3, Vector2, Vector3, Vector4};

/// Number of per-vertex color layers: base tint and overlay tint.
pub const COLOR_LAYERS: usize = 2;

/// Linear RGBA color.
pub type Rgba = Vector4<Real>;

/// Opaque white, the neutral tint.
pub const WHITE: Rgba = Vector4::new(1.0, 1.0, 1.0, 1.0);

/// A vertex of a polygon, holding position, normal, texture coordinates and
/// one color per tint layer.
#[derive(Debug, Clone, PartialEq, Copy)]
pub struct Vertex {
    pub pos: Point3<Real>,
    pub normal: Vector3<Real>,
    pub uv: Vector2<Real>,
    pub colors: [Rgba; COLOR_LAYERS],
}

impl Vertex {
    /// Create a new [`Vertex`] with zero texture coordinates and white tints.
    ///
    /// * `pos`    – the position in model space
    /// * `normal` – (optionally non‑unit) normal; it will be **copied verbatim**, so make sure it is oriented the way you need it for lighting.
    ///
    /// Non-finite components are replaced with `0.0`.
    #[inline]
    pub fn new(mut pos: Point3<Real>, mut normal: Vector3<Real>) -> Self {
        for c in pos.coords.iter_mut() {
            if !c.is_finite() {
                *c = 0.0;
            }
        }
        for c in normal.iter_mut() {
            if !c.is_finite() {
                *c = 0.0;
            }
        }

        Vertex {
            pos,
            normal,
            uv: Vector2::zeros(),
            colors: [WHITE; COLOR_LAYERS],
        }
    }

    /// Returns this vertex with texture coordinates `uv`.
    #[inline]
    pub fn with_uv(mut self, uv: Vector2<Real>) -> Self {
        self.uv = uv;
        self
    }

    /// Returns this vertex with `color` on tint layer `layer`.
    ///
    /// # Panics
    /// Panics if `layer >= COLOR_LAYERS`.
    #[inline]
    pub fn with_color(mut self, layer: usize, color: Rgba) -> Self {
        self.colors[layer] = color;
        self
    }

    /// Flip vertex normal in place.
    ///
    /// # Example
    /// ```rust
    /// # use nalgebra::{Point3, Vector3};
    /// # use polycsg::mesh::vertex::Vertex;
    /// let mut v = Vertex::new(Point3::new(1.0, 2.0, 3.0), Vector3::x());
    /// v.flip();
    /// assert_eq!(v.pos, Point3::new(1.0, 2.0, 3.0), "position remains the same");
    /// assert_eq!(v.normal, -Vector3::x(), "the normal is negated");
    /// ```
    pub fn flip(&mut self) {
        self.normal = -self.normal;
    }

    /// **Mathematical Foundation: Linear Interpolation**
    ///
    /// Interpolate between `self` (`t = 0`) and `other` (`t = 1`):
    /// ```text
    /// a(t) = a₀ + t·(a₁ - a₀)
    /// ```
    /// applied to position, normal, texture coordinates and every color layer.
    /// Split vertices created on a cutting plane get their attributes this way,
    /// which is also what lets recombination recognise them as redundant later.
    ///
    /// Normals are not renormalised.
    pub fn interpolate(&self, other: &Vertex, t: Real) -> Vertex {
        let pos = self.pos + (other.pos - self.pos) * t;
        let normal = self.normal + (other.normal - self.normal) * t;
        let uv = self.uv + (other.uv - self.uv) * t;
        let mut colors = self.colors;
        for (c, o) in colors.iter_mut().zip(other.colors.iter()) {
            *c += (o - *c) * t;
        }
        Vertex {
            pos,
            normal,
            uv,
            colors,
        }
    }

    /// Squared Euclidean distance between vertex positions.
    pub fn distance_squared_to(&self, other: &Vertex) -> Real {
        (self.pos - other.pos).norm_squared()
    }

    /// `true` if the two positions are within `eps` of each other.
    #[inline]
    pub fn coincident(&self, other: &Vertex, eps: Real) -> bool {
        self.distance_squared_to(other) <= eps * eps
    }

    /// `true` if every non-positional attribute (normal, uv, colors) matches
    /// within [`ATTRIBUTE_TOLERANCE`].
    pub fn same_attributes(&self, other: &Vertex) -> bool {
        (self.normal - other.normal).amax() <= ATTRIBUTE_TOLERANCE
            && (self.uv - other.uv).amax() <= ATTRIBUTE_TOLERANCE
            && self
                .colors
                .iter()
                .zip(other.colors.iter())
                .all(|(a, b)| (a - b).amax() <= ATTRIBUTE_TOLERANCE)
    }
}
