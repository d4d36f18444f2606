//! Boolean operations (*union*, *difference*, *intersection*) on streams of
//! planar, convex polygons describing closed meshes, such as block-model
//! geometry.
//!
//! Inputs are read through [`ReadablePolyStream`](stream::ReadablePolyStream)
//! and results are appended to any [`WritablePolyStream`](stream::WritablePolyStream).
//! Internally every operation works on pooled [`CsgPolyStream`](stream::CsgPolyStream)s
//! that carry a [BSP](bsp) partition of their volume; polygons of the first
//! operand that are nowhere near the second pass straight through.
//! Fragments produced by clipping are recombined into larger polygons
//! before they are written.
//!
//! # Features
//! #### Default
//! - **f64**: use f64 as Real
//!
//! #### Optional
//! - **f32**: use f32 as Real, this conflicts with f64
//! - **parallel**: use rayon for multithreading

#![forbid(unsafe_code)]
#![warn(clippy::missing_const_for_fn, clippy::approx_constant, clippy::all)]

pub mod bsp;
pub mod csg;
pub mod errors;
pub mod float_types;
pub mod mesh;
pub mod stream;

#[cfg(any(all(feature = "f64", feature = "f32"), not(any(feature = "f64", feature = "f32"))))]
compile_error!("Either 'f64' or 'f32' feature must be specified, but not both");

pub use csg::Csg;
pub use errors::{StreamError, ValidationError};
pub use float_types::Real;
pub use mesh::{Operand, Plane, Polygon, Vertex};
pub use stream::{CsgPolyStream, PolyStream, ReadablePolyStream, StreamPool, WritablePolyStream};
