//! Geometric primitives: vertices, planes and polygons

pub mod plane;
pub mod polygon;
pub mod shapes;
pub mod vertex;

pub use plane::{BACK, COPLANAR, FRONT, Plane, SPANNING, Split};
pub use polygon::{Operand, Polygon};
pub use vertex::{COLOR_LAYERS, Rgba, Vertex};
