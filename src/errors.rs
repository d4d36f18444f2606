//! Stream misuse and polygon validation errors

use crate::float_types::Real;
use nalgebra::Point3;

/// Programming errors in how pooled streams are used.
///
/// None of these are recoverable conditions of the geometry itself; each one
/// means a caller broke the claim / append / seal / release discipline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum StreamError {
    /// A polygon was appended to a stream that is already sealed for reading or clipping
    #[error("(Sealed) append attempted on a sealed stream")]
    Sealed,
    /// A handle whose generation no longer matches its slot was used
    #[error("(StaleHandle) slot {index} generation {generation} has been recycled")]
    StaleHandle { index: u32, generation: u32 },
    /// A stream was handed back to the pool twice
    #[error("(DoubleRelease) slot {index} was already released")]
    DoubleRelease { index: u32 },
    /// A handle referenced a slot the pool never allocated
    #[error("(UnknownSlot) slot {index} does not belong to this pool")]
    UnknownSlot { index: u32 },
}

/// All the possible validation issues of a caller-supplied polygon
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    /// (TooFewPoints) A ring has fewer than 3 vertices
    #[error("(TooFewPoints) A ring has {0} vertices, at least 3 are required")]
    TooFewPoints(usize),
    /// (RepeatedPoint) Two consecutive vertices coincide
    #[error("(RepeatedPoint) Two consecutive vertices are identical at: {0}")]
    RepeatedPoint(Point3<Real>),
    /// (InvalidCoordinate) The coordinate has a NaN or infinite
    #[error("(InvalidCoordinate) The coordinate ({0}) has a NaN or infinite")]
    InvalidCoordinate(Point3<Real>),
    /// (NonPlanar) A vertex is off the polygon's plane by more than the tolerance
    #[error("(NonPlanar) Vertex at {point} is {distance} away from the polygon plane")]
    NonPlanar { point: Point3<Real>, distance: Real },
    /// (ZeroArea) The ring encloses no area
    #[error("(ZeroArea) The polygon encloses no area")]
    ZeroArea,
}
