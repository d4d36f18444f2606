// Re-export parry for the appropriate float size
#[cfg(feature = "f64")]
pub use parry3d_f64 as parry3d;

#[cfg(feature = "f32")]
pub use parry3d;

// Our Real scalar type:
#[cfg(feature = "f32")]
pub type Real = f32;
#[cfg(feature = "f64")]
pub type Real = f64;

use core::str::FromStr;
use std::sync::OnceLock;

/// Lazily-initialized tolerance used for every coplanarity and degeneracy test.
/// Defaults depend on precision (`f32` vs `f64`), but can be overridden:
///  1) **Build-time**: set env var `POLYCSG_TOLERANCE` (e.g. `POLYCSG_TOLERANCE=1e-5 cargo build`)
///  2) **Runtime**: call [`set_tolerance`] once before running any boolean operation
///
/// The value is an absolute distance in model units. Block models live on a
/// unit grid, so the defaults sit far below one texel.
static TOLERANCE_CELL: OnceLock<Real> = OnceLock::new();

#[inline]
fn default_tolerance() -> Real {
    #[cfg(feature = "f32")]
    {
        1e-4
    }
    #[cfg(feature = "f64")]
    {
        1e-6
    }
}

/// Returns the current tolerance.
/// If not set yet, it tries `POLYCSG_TOLERANCE` (parsed as the active `Real`) and
/// falls back to the precision default.
pub fn tolerance() -> Real {
    *TOLERANCE_CELL.get_or_init(|| {
        if let Some(environment_variable) = option_env!("POLYCSG_TOLERANCE") {
            if let Ok(value) = Real::from_str(environment_variable) {
                return value.max(Real::EPSILON);
            }
        }
        default_tolerance()
    })
}

/// Set the tolerance programmatically once (subsequent calls are ignored).
/// Returns `false` if a tolerance was already in effect.
pub fn set_tolerance(value: Real) -> bool {
    TOLERANCE_CELL.set(value.max(Real::EPSILON)).is_ok()
}

/// Tolerance for comparing non-positional vertex attributes (normals, UVs,
/// colors) when deciding whether two fragments may be recombined.
pub const ATTRIBUTE_TOLERANCE: Real = 1e-4;

/// Index of the tolerance-sized grid cell containing `value`. Two values
/// within tolerance of each other land in the same or adjacent cells.
#[inline]
pub fn quantize(value: Real) -> i64 {
    (value / tolerance()).floor() as i64
}
