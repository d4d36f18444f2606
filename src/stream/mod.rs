//! Polygon streams: append-only polygon buffers that are read through fresh
//! iterators or independent cursors rather than a shared mutable position.

use crate::errors::StreamError;
use crate::mesh::polygon::Polygon;

pub mod csg_stream;
pub mod pool;
pub mod recombine;

pub use csg_stream::{CsgPolyStream, StreamState};
pub use pool::{Arena, ArenaStats, Claimed, PoolConfig, PoolStats, Recycle, SlotKey, StreamPool};
pub use recombine::{output_recombined, recombine_polygons};

/// Read access to a sequence of polygons in insertion order.
pub trait ReadablePolyStream<S: Clone> {
    /// The stream's polygons as a slice
    fn as_slice(&self) -> &[Polygon<S>];

    /// A fresh, finite iterator over the polygons. Restarting means asking
    /// for a new iterator; two iterators never share a position.
    fn polygons(&self) -> std::slice::Iter<'_, Polygon<S>> {
        self.as_slice().iter()
    }

    /// An independent cursor with `origin` / `next` / `reader` semantics.
    fn cursor(&self) -> PolyCursor<'_, S> {
        PolyCursor::new(self.as_slice())
    }

    fn len(&self) -> usize {
        self.as_slice().len()
    }

    fn is_empty(&self) -> bool {
        self.as_slice().is_empty()
    }
}

/// Append access to a polygon stream. Writers only ever append: they never
/// clear or reorder what is already there, so several boolean operations may
/// accumulate into one output.
pub trait WritablePolyStream<S: Clone> {
    /// Append `polygon`, taking ownership of it
    fn append(&mut self, polygon: Polygon<S>) -> Result<(), StreamError>;

    /// Append a copy of `polygon`
    fn append_copy(&mut self, polygon: &Polygon<S>) -> Result<(), StreamError> {
        self.append(polygon.clone())
    }

    /// Append copies of every polygon of `stream`, in order
    fn append_all<R: ReadablePolyStream<S> + ?Sized>(&mut self, stream: &R) -> Result<(), StreamError> {
        for polygon in stream.polygons() {
            self.append_copy(polygon)?;
        }
        Ok(())
    }
}

/// A read position over a borrowed polygon slice.
///
/// ```
/// # use polycsg::mesh::shapes::cuboid;
/// # use polycsg::stream::ReadablePolyStream;
/// # use nalgebra::Point3;
/// let cube = cuboid::<()>(Point3::origin(), Point3::new(1.0, 1.0, 1.0), None);
/// let mut cursor = cube.cursor();
/// let mut count = 0;
/// if cursor.origin() {
///     loop {
///         assert!(cursor.reader().is_some());
///         count += 1;
///         if !cursor.next() {
///             break;
///         }
///     }
/// }
/// assert_eq!(count, 6);
/// ```
#[derive(Debug, Clone)]
pub struct PolyCursor<'a, S: Clone> {
    polygons: &'a [Polygon<S>],
    position: Option<usize>,
}

impl<'a, S: Clone> PolyCursor<'a, S> {
    pub const fn new(polygons: &'a [Polygon<S>]) -> Self {
        Self {
            polygons,
            position: None,
        }
    }

    /// Move to the first polygon. Returns `false` if there is none.
    pub fn origin(&mut self) -> bool {
        self.position = (!self.polygons.is_empty()).then_some(0);
        self.position.is_some()
    }

    /// Advance to the following polygon. Returns `false` at the end, after
    /// which the cursor has no current polygon until `origin` is called.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> bool {
        self.position = self
            .position
            .map(|p| p + 1)
            .filter(|&p| p < self.polygons.len());
        self.position.is_some()
    }

    /// The current polygon, if the cursor is positioned on one.
    pub fn reader(&self) -> Option<&'a Polygon<S>> {
        self.position.and_then(|p| self.polygons.get(p))
    }
}

/// A plain append-only polygon buffer.
///
/// Once [`sealed`](PolyStream::seal) for reading, appends fail with
/// [`StreamError::Sealed`] until the stream is cleared.
#[derive(Debug, Clone)]
pub struct PolyStream<S: Clone> {
    polygons: Vec<Polygon<S>>,
    sealed: bool,
}

impl<S: Clone> Default for PolyStream<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Clone> PolyStream<S> {
    pub const fn new() -> Self {
        Self {
            polygons: Vec::new(),
            sealed: false,
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            polygons: Vec::with_capacity(capacity),
            sealed: false,
        }
    }

    /// Finalize the stream for reading.
    pub fn seal(&mut self) {
        self.sealed = true;
    }

    pub const fn is_sealed(&self) -> bool {
        self.sealed
    }

    /// Drop every polygon and accept appends again. Capacity is kept.
    pub fn clear(&mut self) {
        self.polygons.clear();
        self.sealed = false;
    }

    pub fn into_polygons(self) -> Vec<Polygon<S>> {
        self.polygons
    }
}

impl<S: Clone> From<Vec<Polygon<S>>> for PolyStream<S> {
    fn from(polygons: Vec<Polygon<S>>) -> Self {
        Self {
            polygons,
            sealed: false,
        }
    }
}

impl<S: Clone> FromIterator<Polygon<S>> for PolyStream<S> {
    fn from_iter<I: IntoIterator<Item = Polygon<S>>>(iter: I) -> Self {
        Self::from(iter.into_iter().collect::<Vec<_>>())
    }
}

impl<S: Clone> ReadablePolyStream<S> for PolyStream<S> {
    fn as_slice(&self) -> &[Polygon<S>] {
        &self.polygons
    }
}

impl<S: Clone> WritablePolyStream<S> for PolyStream<S> {
    fn append(&mut self, polygon: Polygon<S>) -> Result<(), StreamError> {
        if self.sealed {
            return Err(StreamError::Sealed);
        }
        self.polygons.push(polygon);
        Ok(())
    }
}

impl<S: Clone> Recycle for PolyStream<S> {
    fn with_capacity(capacity: usize) -> Self {
        PolyStream::with_capacity(capacity)
    }

    fn recycle(&mut self) {
        self.clear();
    }
}

impl<S: Clone> ReadablePolyStream<S> for Vec<Polygon<S>> {
    fn as_slice(&self) -> &[Polygon<S>] {
        self
    }
}

impl<S: Clone> ReadablePolyStream<S> for [Polygon<S>] {
    fn as_slice(&self) -> &[Polygon<S>] {
        self
    }
}

impl<S: Clone> WritablePolyStream<S> for Vec<Polygon<S>> {
    fn append(&mut self, polygon: Polygon<S>) -> Result<(), StreamError> {
        self.push(polygon);
        Ok(())
    }
}
